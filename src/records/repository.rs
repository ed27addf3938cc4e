//! In-memory keyed store for telemetry records.
//!
//! A `std::sync::RwLock` around a `BTreeMap`. Every method takes the lock
//! once and never awaits while holding it, so it can be used from the
//! synchronous update API and from the background jobs alike.
//!
//! Writers never leave a record half updated, so a poisoned lock is
//! recovered instead of propagated.
use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug)]
pub struct Repository<R> {
    records: RwLock<BTreeMap<String, R>>,
}

impl<R> Default for Repository<R> {
    fn default() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }
}

impl<R: Clone> Repository<R> {
    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, R>> {
        self.records.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, R>> {
        self.records.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies `mutate` to the record under `key`, creating it with `create`
    /// first if it does not exist. The whole upsert happens under one write
    /// lock.
    pub fn upsert<C, M>(&self, key: &str, create: C, mutate: M)
    where
        C: FnOnce() -> R,
        M: FnOnce(&mut R),
    {
        let mut records = self.write();

        let record = records.entry(key.to_owned()).or_insert_with(create);

        mutate(record);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<R> {
        self.read().get(key).cloned()
    }

    pub fn remove(&self, key: &str) -> Option<R> {
        self.write().remove(key)
    }

    /// Removes every record for which `keep` returns `false` and returns how
    /// many were removed.
    pub fn retain<F>(&self, mut keep: F) -> usize
    where
        F: FnMut(&R) -> bool,
    {
        let mut records = self.write();

        let before = records.len();

        records.retain(|_, record| keep(record));

        before - records.len()
    }

    /// Folds over the records without cloning them.
    pub fn fold<T, F>(&self, init: T, f: F) -> T
    where
        F: FnMut(T, &R) -> T,
    {
        self.read().values().fold(init, f)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}
