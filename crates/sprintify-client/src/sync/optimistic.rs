//! Snapshot-before-mutate store for optimistic updates.

use std::collections::HashMap;
use std::hash::Hash;

/// Identifies one in-flight optimistic mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MutationId(u64);

#[derive(Debug)]
struct Pending<K, V> {
    key: K,
    /// Value to restore on rollback: the value before this mutation, rebased
    /// onto the outcome of older mutations of the same key.
    previous: Option<V>,
}

/// Local entity values with optimistic mutations layered on top.
///
/// [`apply`] captures the current value before changing it, so a rejected
/// request restores exactly what was shown without a refetch. When several
/// mutations of one key overlap, settling an older one only rebases the
/// snapshot of the newer one and leaves the displayed value alone.
///
/// [`apply`]: OptimisticStore::apply
#[derive(Debug)]
pub struct OptimisticStore<K, V> {
    values: HashMap<K, V>,
    pending: HashMap<MutationId, Pending<K, V>>,
    next_id: u64,
}

impl<K, V> Default for OptimisticStore<K, V> {
    fn default() -> Self {
        Self {
            values: HashMap::new(),
            pending: HashMap::new(),
            next_id: 0,
        }
    }
}

impl<K, V> OptimisticStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the displayed value of `key`.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.values.get(key)
    }

    /// Returns every displayed value.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.values.values()
    }

    /// Returns whether a mutation of `key` awaits its response.
    pub fn is_pending(&self, key: &K) -> bool {
        self.pending.values().any(|pending| &pending.key == key)
    }

    /// Returns the number of mutations awaiting a response.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Stores a server value for `key` unless a mutation of it is in flight.
    ///
    /// Returns whether the value was stored. A skipped value is not lost: the
    /// in-flight response is authoritative for the entity it mutated.
    pub fn upsert(&mut self, key: K, value: V) -> bool {
        if self.is_pending(&key) {
            return false;
        }
        self.values.insert(key, value);
        true
    }

    /// Replaces every value from a fetch, keeping in-flight keys untouched.
    pub fn replace_all(&mut self, entries: impl IntoIterator<Item = (K, V)>) {
        let mut fresh: HashMap<K, V> = entries.into_iter().collect();
        for pending in self.pending.values() {
            if let Some(current) = self.values.get(&pending.key) {
                fresh.insert(pending.key.clone(), current.clone());
            }
        }
        self.values = fresh;
    }

    /// Applies `mutate` to the value of `key` and returns a handle to settle it.
    ///
    /// Returns `None` when `key` is unknown.
    pub fn apply(&mut self, key: K, mutate: impl FnOnce(&mut V)) -> Option<MutationId> {
        let value = self.values.get_mut(&key)?;
        let previous = Some(value.clone());
        mutate(value);

        let id = MutationId(self.next_id);
        self.next_id += 1;
        self.pending.insert(id, Pending { key, previous });
        Some(id)
    }

    /// Accepts the server's value for a mutation.
    ///
    /// Returns `false` when `id` is unknown or already settled.
    pub fn confirm(&mut self, id: MutationId, server_value: V) -> bool {
        let Some(pending) = self.pending.remove(&id) else {
            return false;
        };

        match self.newer_pending(&pending.key, id) {
            Some(newer) => newer.previous = Some(server_value),
            None => {
                self.values.insert(pending.key, server_value);
            }
        }
        true
    }

    /// Restores the value captured before a failed mutation.
    ///
    /// Returns `false` when `id` is unknown or already settled.
    pub fn rollback(&mut self, id: MutationId) -> bool {
        let Some(pending) = self.pending.remove(&id) else {
            return false;
        };

        match self.newer_pending(&pending.key, id) {
            Some(newer) => newer.previous = pending.previous,
            None => match pending.previous {
                Some(previous) => {
                    self.values.insert(pending.key, previous);
                }
                None => {
                    self.values.remove(&pending.key);
                }
            },
        }
        true
    }

    /// Returns the oldest mutation of `key` newer than `id`.
    fn newer_pending(&mut self, key: &K, id: MutationId) -> Option<&mut Pending<K, V>> {
        self.pending
            .iter_mut()
            .filter(|(other, pending)| **other > id && &pending.key == key)
            .min_by_key(|(other, _)| **other)
            .map(|(_, pending)| pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> OptimisticStore<&'static str, i32> {
        let mut store = OptimisticStore::new();
        store.upsert("a", 1);
        store
    }

    #[test]
    fn rollback_restores_the_snapshot() {
        let mut store = store();
        let id = store.apply("a", |v| *v = 5).unwrap();
        assert_eq!(store.get(&"a"), Some(&5));
        assert!(store.is_pending(&"a"));

        assert!(store.rollback(id));
        assert_eq!(store.get(&"a"), Some(&1));
        assert!(!store.rollback(id));
    }

    #[test]
    fn confirm_takes_the_server_value() {
        let mut store = store();
        let id = store.apply("a", |v| *v = 5).unwrap();
        assert!(store.confirm(id, 6));
        assert_eq!(store.get(&"a"), Some(&6));
        assert_eq!(store.pending_count(), 0);
    }

    #[test]
    fn unknown_keys_are_not_mutated() {
        let mut store = store();
        assert!(store.apply("b", |v| *v = 5).is_none());
    }

    #[test]
    fn pushes_do_not_overwrite_in_flight_values() {
        let mut store = store();
        let id = store.apply("a", |v| *v = 5).unwrap();

        assert!(!store.upsert("a", 9));
        store.replace_all([("a", 9), ("b", 2)]);
        assert_eq!(store.get(&"a"), Some(&5));
        assert_eq!(store.get(&"b"), Some(&2));

        store.rollback(id);
        assert_eq!(store.get(&"a"), Some(&1));
    }

    #[test]
    fn overlapping_mutations_rebase() {
        let mut store = store();
        let first = store.apply("a", |v| *v = 2).unwrap();
        let second = store.apply("a", |v| *v = 3).unwrap();

        // The older request fails while the newer one is still in flight.
        store.rollback(first);
        assert_eq!(store.get(&"a"), Some(&3));

        // The newer one fails too: back to the value before both.
        store.rollback(second);
        assert_eq!(store.get(&"a"), Some(&1));
    }

    #[test]
    fn older_confirmation_becomes_the_rollback_target() {
        let mut store = store();
        let first = store.apply("a", |v| *v = 2).unwrap();
        let second = store.apply("a", |v| *v = 3).unwrap();

        store.confirm(first, 2);
        assert_eq!(store.get(&"a"), Some(&3));

        store.rollback(second);
        assert_eq!(store.get(&"a"), Some(&2));
    }
}
