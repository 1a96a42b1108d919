//! Authentication middleware for validating request credentials.

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::extract::AuthState;

/// Requires a valid authentication token to proceed with the request.
///
/// The request is rejected with `401` before it reaches the handler when the
/// token is missing, malformed, expired, or signed with another key. On a
/// WebSocket upgrade the token may also come from the `token` query parameter.
///
/// Applied as a route layer with `axum::middleware::from_fn_with_state`.
pub async fn require_authentication(
    AuthState(_): AuthState,
    request: Request,
    next: Next,
) -> Response {
    next.run(request).await
}
