use std::{
    fmt::Debug,
    hash::{
        BuildHasher,
        Hash,
    },
    sync::Arc,
};

use parking_lot::{
    RwLock,
    RwLockReadGuard,
};

use crate::{
    map::{
        DefaultHashBuilder,
        DuoMap,
    },
    Error,
};

/// Thread-shared [`DuoMap`].
///
/// A cheap-to-clone handle; all clones operate on the same underlying index.
/// Every operation runs under one per-instance reader-writer lock: writers
/// are exclusive, so no thread ever observes a state where the pair mapping
/// and the buckets disagree. Readers clone values out, so no lock is held
/// after a call returns.
pub struct SharedDuoMap<I, N, V, H = DefaultHashBuilder> {
    inner: Arc<RwLock<DuoMap<I, N, V, H>>>,
}

impl<I, N, V> SharedDuoMap<I, N, V, DefaultHashBuilder> {
    pub fn new() -> Self {
        Self::from_map(DuoMap::new())
    }
}

impl<I, N, V> Default for SharedDuoMap<I, N, V, DefaultHashBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, N, V, H> Clone for SharedDuoMap<I, N, V, H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<I, N, V, H> SharedDuoMap<I, N, V, H> {
    pub fn from_map(map: DuoMap<I, N, V, H>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(map)),
        }
    }

    /// Locks the index for shared reading and returns the guard.
    ///
    /// Useful for iterating or making several lookups against one consistent
    /// state. Writers block until the guard is dropped.
    pub fn read(&self) -> RwLockReadGuard<'_, DuoMap<I, N, V, H>> {
        self.inner.read()
    }

    pub fn insert(&self, id: I, name: N, value: V) -> Result<(), Error>
    where
        I: Hash + Eq + Clone,
        N: Hash + Eq + Clone,
        V: Clone + PartialEq,
        H: BuildHasher,
    {
        let mut map = self.inner.write();
        map.insert(id, name, value)?;
        tracing::trace!(len = map.len(), "inserted pair");
        Ok(())
    }

    pub fn remove(&self, id: &I, name: &N) -> Result<V, Error>
    where
        I: Hash + Eq,
        N: Hash + Eq,
        V: PartialEq,
        H: BuildHasher,
    {
        let mut map = self.inner.write();
        let value = map.remove(id, name)?;
        tracing::trace!(len = map.len(), "removed pair");
        Ok(value)
    }

    pub fn set(&self, id: I, name: N, value: V) -> Option<V>
    where
        I: Hash + Eq + Clone,
        N: Hash + Eq + Clone,
        V: Clone + PartialEq,
        H: BuildHasher,
    {
        let mut map = self.inner.write();
        let previous = map.set(id, name, value);
        tracing::trace!(len = map.len(), replaced = previous.is_some(), "set pair");
        previous
    }

    pub fn clear(&self) {
        self.inner.write().clear();
        tracing::trace!("cleared index");
    }

    pub fn get(&self, id: &I, name: &N) -> Result<V, Error>
    where
        I: Hash + Eq,
        N: Hash + Eq,
        V: Clone,
        H: BuildHasher,
    {
        self.inner.read().get(id, name).map(|value| value.clone())
    }

    pub fn contains(&self, id: &I, name: &N) -> bool
    where
        I: Hash + Eq,
        N: Hash + Eq,
        H: BuildHasher,
    {
        self.inner.read().contains(id, name)
    }

    /// Snapshot of the values currently paired with `id`, in insertion order.
    ///
    /// The returned vector is a copy; later mutations of the index don't
    /// affect it.
    pub fn get_by_id(&self, id: &I) -> Result<Vec<V>, Error>
    where
        I: Hash + Eq,
        V: Clone,
        H: BuildHasher,
    {
        self.inner.read().get_by_id(id).map(<[V]>::to_vec)
    }

    /// Snapshot of the values currently paired with `name`.
    pub fn get_by_name(&self, name: &N) -> Result<Vec<V>, Error>
    where
        N: Hash + Eq,
        V: Clone,
        H: BuildHasher,
    {
        self.inner.read().get_by_name(name).map(<[V]>::to_vec)
    }

    /// Snapshot of all `(id, name, value)` entries in the pair mapping.
    pub fn entries(&self) -> Vec<(I, N, V)>
    where
        I: Clone,
        N: Clone,
        V: Clone,
    {
        self.inner
            .read()
            .iter()
            .map(|(id, name, value)| (id.clone(), name.clone(), value.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl<I: Debug, N: Debug, V: Debug, H> Debug for SharedDuoMap<I, N, V, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.read().fmt(f)
    }
}
