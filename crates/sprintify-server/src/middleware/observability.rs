//! Observability middleware for request tracing and timing.
//!
//! Every request gets an `x-request-id` that is echoed on the response, a
//! tracing span from [`TraceLayer`], and credentials redacted from logs.

use std::time::Instant;

use axum::Router;
use axum::extract::Request;
use axum::http::{Uri, header};
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::TraceLayer;

/// Tracing target for request metrics.
const TRACING_TARGET_METRICS: &str = "sprintify_server::middleware::metrics";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Route classification for metrics grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteCategory {
    /// Project, member, board and issue routes (`/api/v1/{projectId}/*`, `/api/v1/projects`).
    Projects,
    /// Notification routes (`/api/v1/notifications*`).
    Notifications,
    /// The realtime socket (`/api/v1/ws`).
    Realtime,
    /// Liveness and readiness (`/health`).
    Health,
    /// API documentation (`/api/openapi.json`, `/api/scalar`).
    Docs,
    Unknown,
}

impl RouteCategory {
    /// Categorizes a route based on its URI path.
    pub fn from_uri(uri: &Uri) -> Self {
        let path = uri.path();

        if path == "/health" {
            Self::Health
        } else if let Some(rest) = path.strip_prefix("/api/v1/") {
            if rest.starts_with("notifications") {
                Self::Notifications
            } else if rest == "ws" {
                Self::Realtime
            } else {
                Self::Projects
            }
        } else if path.starts_with("/api/") {
            Self::Docs
        } else {
            Self::Unknown
        }
    }

    /// Returns the string representation for logging.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::Notifications => "notifications",
            Self::Realtime => "realtime",
            Self::Health => "health",
            Self::Docs => "docs",
            Self::Unknown => "unknown",
        }
    }
}

/// Extension trait for `axum::`[`Router`] to apply observability middleware.
pub trait RouterObservabilityExt<S> {
    /// Layers request ids, trace spans and sensitive header redaction.
    fn with_observability(self) -> Self;

    /// Layers per-request timing logs grouped by [`RouteCategory`].
    fn with_metrics(self) -> Self;
}

impl<S> RouterObservabilityExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_observability(self) -> Self {
        self.layer(PropagateRequestIdLayer::new(
            header::HeaderName::from_static(REQUEST_ID_HEADER),
        ))
        .layer(SetSensitiveRequestHeadersLayer::new([
            header::AUTHORIZATION,
            header::COOKIE,
        ]))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            header::HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ))
    }

    fn with_metrics(self) -> Self {
        self.layer(ServiceBuilder::new().layer(from_fn(track_categorized_metrics)))
    }
}

/// Request metrics middleware with categorization and timing.
pub async fn track_categorized_metrics(request: Request, next: Next) -> Response {
    let start_time = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let category = RouteCategory::from_uri(&uri);

    let response = next.run(request).await;
    let duration = start_time.elapsed();

    tracing::debug!(
        target: TRACING_TARGET_METRICS,
        method = %method,
        uri = %uri,
        category = category.as_str(),
        status = %response.status(),
        duration_ms = duration.as_millis() as u64,
        "request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_categorization() {
        let cases = [
            ("/health", RouteCategory::Health),
            ("/api/v1/projects", RouteCategory::Projects),
            ("/api/v1/0190c1d2-0000-7000-8000-000000000000/issues", RouteCategory::Projects),
            ("/api/v1/notifications/unread-count", RouteCategory::Notifications),
            ("/api/v1/ws", RouteCategory::Realtime),
            ("/api/scalar", RouteCategory::Docs),
            ("/favicon.ico", RouteCategory::Unknown),
        ];

        for (path, expected) in cases {
            let uri: Uri = path.parse().unwrap();
            assert_eq!(RouteCategory::from_uri(&uri), expected, "path: {path}");
        }
    }
}
