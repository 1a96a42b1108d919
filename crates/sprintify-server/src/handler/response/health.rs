use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Service health snapshot.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Health {
    /// Whether the database pool could hand out a connection.
    pub is_healthy: bool,
    /// Connections currently held by the pool.
    pub pool_size: usize,
    /// Idle connections available in the pool.
    pub pool_available: usize,
    /// Accounts with at least one open socket.
    pub online_accounts: usize,
    /// Open socket connections.
    pub connections: usize,
    /// Role/permission/event contract version implemented by the server.
    pub contract_version: u32,
}
