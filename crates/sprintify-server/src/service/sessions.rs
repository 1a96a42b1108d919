//! Live registry of realtime connections.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sprintify_core::ServerEvent;
use tokio::sync::RwLock;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::mpsc::{self, Receiver, Sender};
use uuid::Uuid;

/// Tracing target for session registry operations.
const TRACING_TARGET: &str = "sprintify_server::service::sessions";

/// Default capacity of a connection's outbound queue.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Identifier of one realtime connection.
pub type ConnectionId = Uuid;

/// Maps online accounts to their connections and connections to project rooms.
///
/// Each connection owns a bounded outbound queue; delivery never waits for a
/// slow client and drops the event instead. An account may hold any number of
/// connections, and removing one never touches the others. Entries whose set
/// becomes empty are removed.
///
/// Cloning is cheap and clones share state.
#[derive(Clone)]
pub struct SessionRegistry {
    inner: Arc<RwLock<RegistryInner>>,
    channel_capacity: usize,
}

#[derive(Default)]
struct RegistryInner {
    connections: HashMap<ConnectionId, Connection>,
    accounts: HashMap<Uuid, HashSet<ConnectionId>>,
    rooms: HashMap<Uuid, HashSet<ConnectionId>>,
}

struct Connection {
    account_id: Uuid,
    sender: Sender<ServerEvent>,
    rooms: HashSet<Uuid>,
}

impl RegistryInner {
    fn remove(&mut self, connection_id: ConnectionId) -> Option<Connection> {
        let connection = self.connections.remove(&connection_id)?;

        if let Some(ids) = self.accounts.get_mut(&connection.account_id) {
            ids.remove(&connection_id);
            if ids.is_empty() {
                self.accounts.remove(&connection.account_id);
            }
        }

        for project_id in &connection.rooms {
            if let Some(ids) = self.rooms.get_mut(project_id) {
                ids.remove(&connection_id);
                if ids.is_empty() {
                    self.rooms.remove(project_id);
                }
            }
        }

        Some(connection)
    }

    fn leave(&mut self, connection_id: ConnectionId, project_id: Uuid) -> bool {
        let Some(connection) = self.connections.get_mut(&connection_id) else {
            return false;
        };

        if !connection.rooms.remove(&project_id) {
            return false;
        }

        if let Some(ids) = self.rooms.get_mut(&project_id) {
            ids.remove(&connection_id);
            if ids.is_empty() {
                self.rooms.remove(&project_id);
            }
        }
        true
    }

    fn deliver(&self, connection_id: ConnectionId, event: &ServerEvent) -> bool {
        let Some(connection) = self.connections.get(&connection_id) else {
            return false;
        };

        match connection.sender.try_send(event.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    connection_id = %connection_id,
                    account_id = %connection.account_id,
                    event = event.name(),
                    "outbound queue full, event dropped"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    connection_id = %connection_id,
                    event = event.name(),
                    "connection closing, event dropped"
                );
                false
            }
        }
    }
}

impl SessionRegistry {
    /// Creates an empty registry whose connections queue up to `channel_capacity` events.
    pub fn new(channel_capacity: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(RegistryInner::default())),
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// Registers a connection for an authenticated account.
    ///
    /// Returns the receiving end of the connection's outbound queue. A
    /// connection id registered twice replaces its previous registration.
    pub async fn register(
        &self,
        account_id: Uuid,
        connection_id: ConnectionId,
    ) -> Receiver<ServerEvent> {
        let (sender, receiver) = mpsc::channel(self.channel_capacity);
        let mut inner = self.inner.write().await;

        inner.remove(connection_id);
        inner.connections.insert(
            connection_id,
            Connection {
                account_id,
                sender,
                rooms: HashSet::new(),
            },
        );
        inner
            .accounts
            .entry(account_id)
            .or_default()
            .insert(connection_id);

        tracing::debug!(
            target: TRACING_TARGET,
            account_id = %account_id,
            connection_id = %connection_id,
            connections = inner.accounts.get(&account_id).map_or(0, HashSet::len),
            "connection registered"
        );

        receiver
    }

    /// Removes a connection and its room memberships.
    ///
    /// Returns `false` if the connection was not registered.
    pub async fn unregister(&self, connection_id: ConnectionId) -> bool {
        let removed = self.inner.write().await.remove(connection_id);

        if let Some(connection) = &removed {
            tracing::debug!(
                target: TRACING_TARGET,
                account_id = %connection.account_id,
                connection_id = %connection_id,
                "connection unregistered"
            );
        }

        removed.is_some()
    }

    /// Returns `true` if the account has at least one connection.
    pub async fn is_online(&self, account_id: Uuid) -> bool {
        self.inner.read().await.accounts.contains_key(&account_id)
    }

    /// Returns the ids of every connection held by an account.
    pub async fn connections_for(&self, account_id: Uuid) -> HashSet<ConnectionId> {
        self.inner
            .read()
            .await
            .accounts
            .get(&account_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Adds a connection to a project room.
    ///
    /// Returns `false` if the connection is not registered.
    pub async fn join_room(&self, connection_id: ConnectionId, project_id: Uuid) -> bool {
        let mut inner = self.inner.write().await;
        let Some(connection) = inner.connections.get_mut(&connection_id) else {
            return false;
        };

        connection.rooms.insert(project_id);
        inner
            .rooms
            .entry(project_id)
            .or_default()
            .insert(connection_id);
        true
    }

    /// Removes a connection from a project room, keeping the connection itself.
    ///
    /// Returns `false` if the connection was not in the room.
    pub async fn leave_room(&self, connection_id: ConnectionId, project_id: Uuid) -> bool {
        self.inner.write().await.leave(connection_id, project_id)
    }

    /// Removes every connection of an account from a project room.
    ///
    /// Used when the account loses its membership. Returns the number of
    /// connections that left.
    pub async fn evict_from_room(&self, account_id: Uuid, project_id: Uuid) -> usize {
        let mut inner = self.inner.write().await;
        let ids: Vec<ConnectionId> = inner
            .accounts
            .get(&account_id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default();

        let evicted = ids
            .into_iter()
            .filter(|connection_id| inner.leave(*connection_id, project_id))
            .count();

        if evicted > 0 {
            tracing::debug!(
                target: TRACING_TARGET,
                account_id = %account_id,
                project_id = %project_id,
                evicted,
                "account evicted from project room"
            );
        }
        evicted
    }

    /// Returns the project rooms a connection has joined.
    pub async fn rooms_for(&self, connection_id: ConnectionId) -> HashSet<Uuid> {
        self.inner
            .read()
            .await
            .connections
            .get(&connection_id)
            .map(|connection| connection.rooms.clone())
            .unwrap_or_default()
    }

    /// Queues an event on a single connection.
    pub async fn send_to_connection(&self, connection_id: ConnectionId, event: &ServerEvent) -> bool {
        self.inner.read().await.deliver(connection_id, event)
    }

    /// Queues an event on every connection of an account.
    ///
    /// Returns the number of connections the event was queued on.
    pub async fn send_to_account(&self, account_id: Uuid, event: &ServerEvent) -> usize {
        let inner = self.inner.read().await;
        let Some(ids) = inner.accounts.get(&account_id) else {
            return 0;
        };

        ids.iter()
            .filter(|connection_id| inner.deliver(**connection_id, event))
            .count()
    }

    /// Queues an event on every connection in a project room.
    ///
    /// Returns the number of connections the event was queued on.
    pub async fn broadcast_room(&self, project_id: Uuid, event: &ServerEvent) -> usize {
        let inner = self.inner.read().await;
        let Some(ids) = inner.rooms.get(&project_id) else {
            return 0;
        };

        ids.iter()
            .filter(|connection_id| inner.deliver(**connection_id, event))
            .count()
    }

    /// Returns the number of online accounts.
    pub async fn online_count(&self) -> usize {
        self.inner.read().await.accounts.len()
    }

    /// Returns the number of open connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.read().await.connections.len()
    }

    /// Drops every connection.
    ///
    /// Outbound queues close, so socket tasks drain and exit.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.write().await;
        let connections = inner.connections.len();

        inner.connections.clear();
        inner.accounts.clear();
        inner.rooms.clear();

        tracing::info!(
            target: TRACING_TARGET,
            connections = connections,
            "session registry shut down"
        );
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(count: i64) -> ServerEvent {
        ServerEvent::NotificationsAllRead {
            unread_count: count,
        }
    }

    #[tokio::test]
    async fn connections_are_independent() {
        let registry = SessionRegistry::default();
        let account = Uuid::now_v7();
        let (first, second) = (Uuid::now_v7(), Uuid::now_v7());

        let _rx1 = registry.register(account, first).await;
        let mut rx2 = registry.register(account, second).await;
        assert_eq!(registry.connections_for(account).await.len(), 2);

        assert!(registry.unregister(first).await);
        assert!(registry.is_online(account).await);
        assert_eq!(registry.send_to_account(account, &event(1)).await, 1);
        assert_eq!(rx2.recv().await, Some(event(1)));

        assert!(registry.unregister(second).await);
        assert!(!registry.is_online(account).await);
        assert!(!registry.unregister(second).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_connect_and_disconnect_leaves_nothing() {
        let registry = SessionRegistry::default();
        let account = Uuid::now_v7();

        let tasks = (0..64).map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move {
                let connection_id = Uuid::now_v7();
                let _receiver = registry.register(account, connection_id).await;
                registry.join_room(connection_id, Uuid::nil()).await;
                tokio::task::yield_now().await;
                registry.unregister(connection_id).await
            })
        });

        for task in tasks.collect::<Vec<_>>() {
            assert!(task.await.unwrap());
        }

        assert!(!registry.is_online(account).await);
        assert_eq!(registry.connection_count().await, 0);
        assert_eq!(registry.online_count().await, 0);
        assert_eq!(registry.broadcast_room(Uuid::nil(), &event(0)).await, 0);
    }

    #[tokio::test]
    async fn rooms_are_additive() {
        let registry = SessionRegistry::default();
        let (account, connection) = (Uuid::now_v7(), Uuid::now_v7());
        let (alpha, beta) = (Uuid::now_v7(), Uuid::now_v7());
        let mut rx = registry.register(account, connection).await;

        assert!(registry.join_room(connection, alpha).await);
        assert!(registry.join_room(connection, beta).await);
        assert!(registry.leave_room(connection, alpha).await);
        assert!(!registry.leave_room(connection, alpha).await);

        assert_eq!(registry.broadcast_room(alpha, &event(2)).await, 0);
        assert_eq!(registry.broadcast_room(beta, &event(3)).await, 1);
        assert_eq!(rx.recv().await, Some(event(3)));
        assert!(registry.is_online(account).await);
        assert_eq!(registry.rooms_for(connection).await, HashSet::from([beta]));
    }

    #[tokio::test]
    async fn eviction_covers_every_connection_of_the_account() {
        let registry = SessionRegistry::default();
        let (removed, other) = (Uuid::now_v7(), Uuid::now_v7());
        let (tab, phone, peer) = (Uuid::now_v7(), Uuid::now_v7(), Uuid::now_v7());
        let project = Uuid::now_v7();

        let _tab_rx = registry.register(removed, tab).await;
        let _phone_rx = registry.register(removed, phone).await;
        let mut peer_rx = registry.register(other, peer).await;
        for connection in [tab, phone, peer] {
            registry.join_room(connection, project).await;
        }

        assert_eq!(registry.evict_from_room(removed, project).await, 2);
        assert_eq!(registry.evict_from_room(removed, project).await, 0);

        assert_eq!(registry.broadcast_room(project, &event(4)).await, 1);
        assert_eq!(peer_rx.recv().await, Some(event(4)));
        assert!(registry.is_online(removed).await);
        assert!(registry.rooms_for(tab).await.is_empty());
    }

    #[tokio::test]
    async fn join_requires_registration() {
        let registry = SessionRegistry::default();
        assert!(!registry.join_room(Uuid::now_v7(), Uuid::now_v7()).await);
    }

    #[tokio::test]
    async fn full_queue_drops_instead_of_blocking() {
        let registry = SessionRegistry::new(1);
        let (account, connection) = (Uuid::now_v7(), Uuid::now_v7());
        let mut rx = registry.register(account, connection).await;

        assert_eq!(registry.send_to_account(account, &event(1)).await, 1);
        assert_eq!(registry.send_to_account(account, &event(2)).await, 0);
        assert_eq!(rx.recv().await, Some(event(1)));
    }

    #[tokio::test]
    async fn shutdown_closes_every_queue() {
        let registry = SessionRegistry::default();
        let mut rx = registry.register(Uuid::now_v7(), Uuid::now_v7()).await;

        registry.shutdown().await;
        assert_eq!(rx.recv().await, None);
        assert_eq!(registry.online_count().await, 0);
    }
}
