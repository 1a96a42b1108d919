//! Client contract version negotiation.
//!
//! Clients send [`CONTRACT_HEADER`] with the [`CONTRACT_VERSION`] they were
//! built against. A mismatch is logged and the request still proceeds, so
//! rolling deployments never lock out older clients. Every response carries
//! the server's version in the same header.

use axum::Router;
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::{Next, from_fn};
use axum::response::Response;
use sprintify_core::{CONTRACT_HEADER, CONTRACT_VERSION};

/// Tracing target for contract negotiation.
const TRACING_TARGET: &str = "sprintify_server::middleware::contract";

/// Outcome of comparing the client's contract header with ours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContractCheck {
    /// The header is absent; browsers and tools rarely send it.
    Absent,
    Matching,
    Mismatch(u32),
    Unparseable,
}

fn inspect(headers: &HeaderMap) -> ContractCheck {
    let Some(value) = headers.get(CONTRACT_HEADER) else {
        return ContractCheck::Absent;
    };

    match value.to_str().ok().and_then(|v| v.trim().parse::<u32>().ok()) {
        Some(CONTRACT_VERSION) => ContractCheck::Matching,
        Some(version) => ContractCheck::Mismatch(version),
        None => ContractCheck::Unparseable,
    }
}

/// Extension trait for `axum::`[`Router`] to apply contract negotiation.
pub trait RouterContractExt<S> {
    /// Warns on client contract mismatches and advertises the server's version.
    fn with_contract_check(self) -> Self;
}

impl<S> RouterContractExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_contract_check(self) -> Self {
        self.layer(from_fn(check_contract_version))
    }
}

/// Compares the request's contract header with [`CONTRACT_VERSION`].
pub async fn check_contract_version(request: Request, next: Next) -> Response {
    match inspect(request.headers()) {
        ContractCheck::Mismatch(version) => tracing::warn!(
            target: TRACING_TARGET,
            client_version = version,
            server_version = CONTRACT_VERSION,
            uri = %request.uri(),
            "client contract version mismatch"
        ),
        ContractCheck::Unparseable => tracing::warn!(
            target: TRACING_TARGET,
            uri = %request.uri(),
            "unparseable client contract header"
        ),
        ContractCheck::Absent | ContractCheck::Matching => {}
    }

    let mut response = next.run(request).await;
    response.headers_mut().insert(
        HeaderName::from_static(CONTRACT_HEADER),
        HeaderValue::from(CONTRACT_VERSION),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTRACT_HEADER, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn classify_contract_header() {
        assert_eq!(inspect(&HeaderMap::new()), ContractCheck::Absent);
        assert_eq!(inspect(&headers("1")), ContractCheck::Matching);
        assert_eq!(inspect(&headers("7")), ContractCheck::Mismatch(7));
        assert_eq!(inspect(&headers("v1")), ContractCheck::Unparseable);
    }
}
