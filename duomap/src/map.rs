use std::{
    fmt::Debug,
    hash::{
        BuildHasher,
        BuildHasherDefault,
        Hash,
        Hasher,
    },
    iter::FusedIterator,
};

use hashbrown::{
    hash_map,
    Equivalent,
    HashMap,
};

use crate::Error;

pub type DefaultHashBuilder = BuildHasherDefault<ahash::AHasher>;

#[derive(Debug)]
pub struct Builder<H> {
    capacity: usize,
    build_hasher: H,
}

impl Default for Builder<DefaultHashBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder<DefaultHashBuilder> {
    pub fn new() -> Self {
        Self {
            capacity: 0,
            build_hasher: Default::default(),
        }
    }
}

impl<H> Builder<H> {
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_hasher<H2>(self, build_hasher: H2) -> Builder<H2> {
        Builder {
            capacity: self.capacity,
            build_hasher,
        }
    }

    pub fn build<I, N, V>(self) -> DuoMap<I, N, V, H>
    where
        H: Clone,
    {
        DuoMap {
            pairs: HashMap::with_capacity_and_hasher(self.capacity, self.build_hasher.clone()),
            by_id: HashMap::with_hasher(self.build_hasher.clone()),
            by_name: HashMap::with_hasher(self.build_hasher),
        }
    }
}

/// A collection indexed by an id, a name, and the pair of both.
///
/// The pair mapping `(I, N) -> V` is the source of truth. The two bucket
/// mappings are derived views: for each id (and symmetrically each name), an
/// insertion-ordered list of the values currently paired with it, with no
/// duplicate values by equality. Every mutation updates all three mappings
/// together, so the views never disagree with the pair mapping.
#[derive(Clone)]
pub struct DuoMap<I, N, V, H = DefaultHashBuilder> {
    pairs: HashMap<(I, N), V, H>,
    by_id: HashMap<I, Vec<V>, H>,
    by_name: HashMap<N, Vec<V>, H>,
}

impl<I, N, V> DuoMap<I, N, V, DefaultHashBuilder> {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::builder().with_capacity(capacity).build()
    }
}

impl<I, N, V> Default for DuoMap<I, N, V, DefaultHashBuilder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I, N, V, H> DuoMap<I, N, V, H> {
    pub fn builder() -> Builder<DefaultHashBuilder> {
        Builder::new()
    }

    /// Number of entries in the pair mapping.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn clear(&mut self) {
        self.pairs.clear();
        self.by_id.clear();
        self.by_name.clear();
    }

    /// Inserts a value under the pair key `(id, name)`.
    ///
    /// Fails with [`Error::DuplicateKey`] if the pair key is already present;
    /// nothing is modified in that case. On success the value is appended to
    /// the id bucket and the name bucket, unless an equal value is already
    /// there.
    pub fn insert(&mut self, id: I, name: N, value: V) -> Result<(), Error>
    where
        I: Hash + Eq + Clone,
        N: Hash + Eq + Clone,
        V: Clone + PartialEq,
        H: BuildHasher,
    {
        if self.pairs.contains_key(&PairKey(&id, &name)) {
            return Err(Error::DuplicateKey);
        }
        self.insert_pair(id, name, value);
        Ok(())
    }

    /// Removes the entry for the pair key `(id, name)` and returns its value.
    ///
    /// Fails with [`Error::NotFound`] if the pair key is absent. The value is
    /// dropped from each bucket unless another surviving pair in that
    /// dimension still maps an equal value; a bucket that becomes empty is
    /// deleted entirely.
    pub fn remove(&mut self, id: &I, name: &N) -> Result<V, Error>
    where
        I: Hash + Eq,
        N: Hash + Eq,
        V: PartialEq,
        H: BuildHasher,
    {
        let ((id, name), value) = self
            .pairs
            .remove_entry(&PairKey(id, name))
            .ok_or(Error::NotFound)?;

        if !self.id_maps_equal_value(&id, &value) {
            remove_from_bucket(&mut self.by_id, &id, &value);
        }
        if !self.name_maps_equal_value(&name, &value) {
            remove_from_bucket(&mut self.by_name, &name, &value);
        }

        Ok(value)
    }

    /// Replaces the value for the pair key `(id, name)`, inserting if absent.
    ///
    /// Returns the previous value for that pair key, if there was one. A
    /// replaced value is removed and re-appended, so it moves to the tail of
    /// buckets it was the sole occupant of.
    pub fn set(&mut self, id: I, name: N, value: V) -> Option<V>
    where
        I: Hash + Eq + Clone,
        N: Hash + Eq + Clone,
        V: Clone + PartialEq,
        H: BuildHasher,
    {
        let previous = self.remove(&id, &name).ok();
        self.insert_pair(id, name, value);
        previous
    }

    pub fn get(&self, id: &I, name: &N) -> Result<&V, Error>
    where
        I: Hash + Eq,
        N: Hash + Eq,
        H: BuildHasher,
    {
        self.pairs.get(&PairKey(id, name)).ok_or(Error::NotFound)
    }

    pub fn contains(&self, id: &I, name: &N) -> bool
    where
        I: Hash + Eq,
        N: Hash + Eq,
        H: BuildHasher,
    {
        self.pairs.contains_key(&PairKey(id, name))
    }

    /// All values currently paired with `id`, in insertion order.
    ///
    /// Fails with [`Error::NotFound`] if no pair with this id exists. The
    /// returned slice is a view into the index; it cannot be mutated from
    /// outside.
    pub fn get_by_id(&self, id: &I) -> Result<&[V], Error>
    where
        I: Hash + Eq,
        H: BuildHasher,
    {
        self.by_id.get(id).map(Vec::as_slice).ok_or(Error::NotFound)
    }

    /// All values currently paired with `name`, in insertion order.
    pub fn get_by_name(&self, name: &N) -> Result<&[V], Error>
    where
        N: Hash + Eq,
        H: BuildHasher,
    {
        self.by_name
            .get(name)
            .map(Vec::as_slice)
            .ok_or(Error::NotFound)
    }

    pub fn iter(&self) -> Iter<'_, I, N, V> {
        Iter {
            pairs: self.pairs.iter(),
        }
    }

    fn insert_pair(&mut self, id: I, name: N, value: V)
    where
        I: Hash + Eq + Clone,
        N: Hash + Eq + Clone,
        V: Clone + PartialEq,
        H: BuildHasher,
    {
        let bucket = self.by_id.entry(id.clone()).or_default();
        if !bucket.contains(&value) {
            bucket.push(value.clone());
        }

        let bucket = self.by_name.entry(name.clone()).or_default();
        if !bucket.contains(&value) {
            bucket.push(value.clone());
        }

        self.pairs.insert((id, name), value);
    }

    fn id_maps_equal_value(&self, id: &I, value: &V) -> bool
    where
        I: Eq,
        V: PartialEq,
    {
        self.pairs.iter().any(|((i, _), v)| i == id && v == value)
    }

    fn name_maps_equal_value(&self, name: &N, value: &V) -> bool
    where
        N: Eq,
        V: PartialEq,
    {
        self.pairs.iter().any(|((_, n), v)| n == name && v == value)
    }
}

fn remove_from_bucket<K, V, H>(buckets: &mut HashMap<K, Vec<V>, H>, key: &K, value: &V)
where
    K: Hash + Eq,
    V: PartialEq,
    H: BuildHasher,
{
    if let Some(bucket) = buckets.get_mut(key) {
        if let Some(index) = bucket.iter().position(|v| v == value) {
            bucket.remove(index);
        }
        if bucket.is_empty() {
            buckets.remove(key);
        }
    }
}

/// Borrowed pair key. Hashes like the owned `(I, N)` tuple so it can be used
/// for lookups without cloning the keys.
struct PairKey<'a, I, N>(&'a I, &'a N);

impl<'a, I: Hash, N: Hash> Hash for PairKey<'a, I, N> {
    fn hash<S: Hasher>(&self, state: &mut S) {
        self.0.hash(state);
        self.1.hash(state);
    }
}

impl<'a, I: Eq, N: Eq> Equivalent<(I, N)> for PairKey<'a, I, N> {
    fn equivalent(&self, key: &(I, N)) -> bool {
        *self.0 == key.0 && *self.1 == key.1
    }
}

impl<I, N, V, H> IntoIterator for DuoMap<I, N, V, H> {
    type Item = (I, N, V);
    type IntoIter = IntoIter<I, N, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            pairs: self.pairs.into_iter(),
        }
    }
}

impl<'a, I, N, V, H> IntoIterator for &'a DuoMap<I, N, V, H> {
    type Item = (&'a I, &'a N, &'a V);
    type IntoIter = Iter<'a, I, N, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<I, N, V> FromIterator<(I, N, V)> for DuoMap<I, N, V, DefaultHashBuilder>
where
    I: Hash + Eq + Clone,
    N: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    fn from_iter<T: IntoIterator<Item = (I, N, V)>>(iter: T) -> Self {
        let iter = iter.into_iter();

        let size_hint = iter.size_hint();
        let size_hint = size_hint.1.unwrap_or(size_hint.0);

        let mut map = DuoMap::with_capacity(size_hint);
        map.extend(iter);
        map
    }
}

// Last write wins: a pair key occurring more than once keeps its last value.
impl<I, N, V, H> Extend<(I, N, V)> for DuoMap<I, N, V, H>
where
    I: Hash + Eq + Clone,
    N: Hash + Eq + Clone,
    V: Clone + PartialEq,
    H: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (I, N, V)>>(&mut self, iter: T) {
        for (id, name, value) in iter {
            self.set(id, name, value);
        }
    }
}

impl<I: Debug, N: Debug, V: Debug, H> Debug for DuoMap<I, N, V, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.pairs.iter()).finish()
    }
}

impl<I, N, V, H> PartialEq for DuoMap<I, N, V, H>
where
    I: Hash + Eq,
    N: Hash + Eq,
    V: PartialEq,
    H: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.pairs.len() == other.pairs.len()
            && self
                .pairs
                .iter()
                .all(|(key, value)| other.pairs.get(key).is_some_and(|v| value == v))
    }
}

pub struct Iter<'a, I, N, V> {
    pairs: hash_map::Iter<'a, (I, N), V>,
}

impl<'a, I, N, V> Iterator for Iter<'a, I, N, V> {
    type Item = (&'a I, &'a N, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let ((id, name), value) = self.pairs.next()?;
        Some((id, name, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pairs.size_hint()
    }
}

impl<'a, I, N, V> FusedIterator for Iter<'a, I, N, V> {}
impl<'a, I, N, V> ExactSizeIterator for Iter<'a, I, N, V> {}

pub struct IntoIter<I, N, V> {
    pairs: hash_map::IntoIter<(I, N), V>,
}

impl<I, N, V> Iterator for IntoIter<I, N, V> {
    type Item = (I, N, V);

    fn next(&mut self) -> Option<Self::Item> {
        let ((id, name), value) = self.pairs.next()?;
        Some((id, name, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.pairs.size_hint()
    }
}

impl<I, N, V> FusedIterator for IntoIter<I, N, V> {}
impl<I, N, V> ExactSizeIterator for IntoIter<I, N, V> {}
