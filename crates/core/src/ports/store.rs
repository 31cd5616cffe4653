//! Port trait for the balance snapshot store.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::Balances;

/// Storage for balance snapshots, keyed by the `address_genesisHash`
/// string (see [`crate::models::balance_key`]).
///
/// Every write overwrites the previous snapshot; there is no expiry.
pub trait BalancesStore: Send + Sync {
    /// Get the snapshot for a key, if any.
    fn get(&self, key: &str) -> Option<Balances>;

    /// Store a snapshot, replacing any previous one.
    fn set(&self, key: &str, balances: Balances);

    /// Remove the snapshot for a key.
    fn remove(&self, key: &str);

    /// All stored snapshots.
    fn all(&self) -> Vec<(String, Balances)>;
}

/// In-memory implementation of [`BalancesStore`].
///
/// State is process-lifetime only and resets on restart.
#[derive(Debug, Default)]
pub struct MemoryBalancesStore {
    inner: RwLock<HashMap<String, Balances>>,
}

impl MemoryBalancesStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Balances>> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<String, Balances>> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl BalancesStore for MemoryBalancesStore {
    fn get(&self, key: &str) -> Option<Balances> {
        self.read().get(key).copied()
    }

    fn set(&self, key: &str, balances: Balances) {
        self.write().insert(key.to_string(), balances);
    }

    fn remove(&self, key: &str) {
        self.write().remove(key);
    }

    fn all(&self) -> Vec<(String, Balances)> {
        self.read()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryBalancesStore::new();
        let key = "addr_0xabc";

        assert_eq!(store.get(key), None);

        store.set(
            key,
            Balances {
                cennz: 1.5,
                cpay: 2.0,
            },
        );
        assert_eq!(store.get(key).map(|b| b.cennz), Some(1.5));

        // Dernière écriture gagne
        store.set(
            key,
            Balances {
                cennz: 3.0,
                cpay: 4.0,
            },
        );
        assert_eq!(store.get(key).map(|b| b.cennz), Some(3.0));

        store.remove(key);
        assert_eq!(store.get(key), None);
    }

    #[test]
    fn test_all_lists_every_entry() {
        let store = MemoryBalancesStore::new();
        store.set("a", Balances::default());
        store.set("b", Balances::default());

        let mut keys: Vec<String> = store.all().into_iter().map(|(k, _)| k).collect();
        keys.sort();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
