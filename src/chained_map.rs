//! ChainedMap: public table over `Chains`, plus its builder.
//!
//! This layer owns the hashing and equality capabilities and is the only
//! place that calls them. It resolves a key to `(code, bucket, link)` and
//! hands structural work to `Chains`.

use crate::chain::{Chains, Link, NodeKey};
use crate::cursor::Cursor;
use crate::dump::BucketDump;
use crate::hashing::{HashCode, KeyEq, StdEq, StdHash};
use crate::iter::{IntoIter, Iter, IterMut, LocalIter};
use crate::primes::{self, CapacityError, Sizer};
use core::borrow::Borrow;
use core::fmt;
use core::ops::Index;

/// Bucket count requested by `ChainedMap::new` and `Default`.
pub const DEFAULT_BUCKETS: usize = 13;

/// Hash map with separate chaining over a bucket array fixed at construction.
///
/// The bucket count never changes, so `bucket(k)` is stable for the life
/// of the map and the load factor may exceed 1. Keys are unique: inserting
/// an existing key leaves its value untouched.
pub struct ChainedMap<K, V, H = StdHash, E = StdEq> {
    pub(crate) chains: Chains<K, V>,
    hasher: H,
    key_eq: E,
}

/// Construction-time configuration for `ChainedMap`.
pub struct MapBuilder<H = StdHash, E = StdEq> {
    requested: usize,
    hasher: H,
    key_eq: E,
    sizer: Sizer,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: Default, E: Default> Default for MapBuilder<H, E> {
    fn default() -> Self {
        Self {
            requested: DEFAULT_BUCKETS,
            hasher: H::default(),
            key_eq: E::default(),
            sizer: primes::next_prime,
        }
    }
}

impl<H, E> MapBuilder<H, E> {
    /// Minimum number of buckets; the sizer picks the actual count.
    pub fn buckets(mut self, requested: usize) -> Self {
        self.requested = requested;
        self
    }

    pub fn hasher<H2>(self, hasher: H2) -> MapBuilder<H2, E> {
        MapBuilder {
            requested: self.requested,
            hasher,
            key_eq: self.key_eq,
            sizer: self.sizer,
        }
    }

    pub fn key_eq<E2>(self, key_eq: E2) -> MapBuilder<H, E2> {
        MapBuilder {
            requested: self.requested,
            hasher: self.hasher,
            key_eq,
            sizer: self.sizer,
        }
    }

    /// Replace the default prime sizing.
    pub fn sizer(mut self, sizer: Sizer) -> Self {
        self.sizer = sizer;
        self
    }

    pub fn build<K, V>(self) -> Result<ChainedMap<K, V, H, E>, CapacityError> {
        let requested = self.requested;
        let actual = match (self.sizer)(requested) {
            Ok(n) if n == 0 || n < requested => {
                let e = CapacityError::Undersized {
                    requested,
                    actual: n,
                };
                log::debug!("rejecting bucket count: {e}");
                return Err(e);
            }
            Ok(n) => n,
            Err(e) => {
                log::debug!("bucket sizing failed: {e}");
                return Err(e);
            }
        };
        log::debug!("chained map sized to {actual} buckets (requested {requested})");
        Ok(ChainedMap {
            chains: Chains::new(actual),
            hasher: self.hasher,
            key_eq: self.key_eq,
        })
    }
}

impl<K, V> ChainedMap<K, V> {
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// Panics if `requested` exceeds the largest supported bucket count.
    pub fn with_buckets(requested: usize) -> Self {
        Self::with_hasher_and_eq(requested, StdHash::default(), StdEq)
    }

    pub fn try_with_buckets(requested: usize) -> Result<Self, CapacityError> {
        MapBuilder::new().buckets(requested).build()
    }
}

impl<K, V, H> ChainedMap<K, V, H> {
    /// Panics if `requested` exceeds the largest supported bucket count.
    pub fn with_hasher(requested: usize, hasher: H) -> Self {
        Self::with_hasher_and_eq(requested, hasher, StdEq)
    }
}

impl<K, V, H, E> ChainedMap<K, V, H, E> {
    /// Panics if `requested` exceeds the largest supported bucket count.
    pub fn with_hasher_and_eq(requested: usize, hasher: H, key_eq: E) -> Self {
        let built = MapBuilder {
            requested,
            hasher,
            key_eq,
            sizer: primes::next_prime,
        }
        .build();
        match built {
            Ok(map) => map,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.len() == 0
    }

    pub fn bucket_count(&self) -> usize {
        self.chains.bucket_count()
    }

    /// Entries per bucket. Not used to trigger growth.
    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.bucket_count() as f64
    }

    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    pub fn key_eq(&self) -> &E {
        &self.key_eq
    }

    /// Number of entries in bucket `n`. Panics if `n >= bucket_count()`.
    pub fn bucket_size(&self, n: usize) -> usize {
        self.bucket_iter(n).count()
    }

    /// Entries of bucket `n`, newest first. Panics if `n >= bucket_count()`.
    pub fn bucket_iter(&self, n: usize) -> LocalIter<'_, K, V> {
        LocalIter::new(&self.chains, n)
    }

    /// Cursor at the first entry in traversal order, or `end()` when empty.
    pub fn begin(&self) -> Cursor {
        Cursor::at(self.chains.head())
    }

    pub fn end(&self) -> Cursor {
        Cursor::end()
    }

    /// The entry after `pos` in traversal order. Stale or end cursors
    /// advance to `end()`.
    pub fn advance(&self, pos: Cursor) -> Cursor {
        Cursor::at(pos.node().and_then(|k| self.chains.successor(k)))
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.chains)
    }

    /// Allocates O(len) up front to arrange the references; see `IterMut`.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut::new(&mut self.chains)
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Same up-front allocation as `iter_mut`.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.iter_mut().map(|(_, v)| v)
    }

    /// Erase the entry at `pos` and return the cursor of the entry that
    /// followed it, so a traversal can continue without skipping or
    /// revisiting anything. A stale or end cursor erases nothing and
    /// yields `end()`.
    pub fn erase_at(&mut self, pos: Cursor) -> Cursor {
        let Some(k) = pos.node() else {
            return Cursor::end();
        };
        // The successor has to be read while the node is still linked.
        let next = self.chains.successor(k);
        match self.chains.unlink_node(k) {
            Some(_) => Cursor::at(next),
            None => Cursor::end(),
        }
    }

    /// Keep only the entries for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut pos = self.begin();
        while let Some(k) = pos.node() {
            let Some(node) = self.chains.node_mut(k) else {
                break;
            };
            pos = if keep(&node.key, &mut node.value) {
                self.advance(pos)
            } else {
                self.erase_at(pos)
            };
        }
    }

    /// Drop every entry. The bucket count is unchanged.
    pub fn clear(&mut self) {
        log::trace!("clearing {} entries", self.len());
        self.chains.clear();
    }

    /// Move all entries out, leaving `self` empty with the same bucket count
    /// and a copy of its capabilities. See `take_with` for capabilities
    /// that are not `Clone`.
    pub fn take(&mut self) -> Self
    where
        H: Clone,
        E: Clone,
    {
        let (hasher, key_eq) = (self.hasher.clone(), self.key_eq.clone());
        self.take_with(hasher, key_eq)
    }

    /// Move all entries and the current capabilities out. `self` is left
    /// empty with the same bucket count, using `hasher` and `key_eq` from
    /// now on.
    pub fn take_with(&mut self, hasher: H, key_eq: E) -> Self {
        log::trace!("moving {} entries out of chained map", self.len());
        let empty = ChainedMap {
            chains: Chains::new(self.chains.bucket_count()),
            hasher,
            key_eq,
        };
        core::mem::replace(self, empty)
    }

    /// Per-bucket view for diagnostics; see `BucketDump`.
    pub fn dump(&self) -> BucketDump<'_, K, V> {
        BucketDump::new(&self.chains)
    }

    /// Resolve `q` to its code, its bucket and, if present, its node.
    fn probe<Q>(&self, q: &Q) -> (u64, usize, Option<(Link, NodeKey)>)
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashCode<Q>,
        E: KeyEq<Q>,
    {
        let code = self.hasher.code(q);
        let bucket = self.chains.bucket_for(code);
        // Codes filter first; equal codes may still be different keys.
        let found = self.chains.locate(bucket, |_, node| {
            let key: &Q = node.key.borrow();
            node.code == code && self.key_eq.equal(key, q)
        });
        (code, bucket, found)
    }

    /// Bucket index `q` maps to. Does not look the key up.
    pub fn bucket<Q>(&self, q: &Q) -> usize
    where
        Q: ?Sized,
        H: HashCode<Q>,
    {
        self.chains.bucket_for(self.hasher.code(q))
    }

    /// Cursor at the entry for `q`, or `end()` if absent.
    pub fn find<Q>(&self, q: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashCode<Q>,
        E: KeyEq<Q>,
    {
        Cursor::at(self.probe(q).2.map(|(_, k)| k))
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashCode<Q>,
        E: KeyEq<Q>,
    {
        self.probe(q).2.is_some()
    }

    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashCode<Q>,
        E: KeyEq<Q>,
    {
        self.get_key_value(q).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashCode<Q>,
        E: KeyEq<Q>,
    {
        let (_, k) = self.probe(q).2?;
        self.chains.node(k).map(|n| (&n.key, &n.value))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashCode<Q>,
        E: KeyEq<Q>,
    {
        let (_, k) = self.probe(q).2?;
        self.chains.node_mut(k).map(|n| &mut n.value)
    }

    /// Remove the entry for `q`, returning it.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashCode<Q>,
        E: KeyEq<Q>,
    {
        let (link, k) = self.probe(q).2?;
        self.chains.unlink(link, k).map(|n| (n.key, n.value))
    }

    /// Remove the entry for `q`; returns how many entries were removed (0 or 1).
    pub fn erase<Q>(&mut self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized,
        H: HashCode<Q>,
        E: KeyEq<Q>,
    {
        usize::from(self.remove_entry(q).is_some())
    }
}

impl<K, V, H, E> ChainedMap<K, V, H, E>
where
    H: HashCode<K>,
    E: KeyEq<K>,
{
    /// Insert `key -> value` unless `key` is present.
    ///
    /// Returns the cursor of the entry holding `key` and whether this call
    /// inserted it. On a duplicate the stored value is left as it was and
    /// `value` is dropped.
    pub fn insert(&mut self, key: K, value: V) -> (Cursor, bool) {
        let (code, bucket, found) = self.probe(&key);
        if let Some((_, k)) = found {
            return (Cursor::at(Some(k)), false);
        }
        let k = self.chains.push_front(bucket, code, key, value);
        (Cursor::at(Some(k)), true)
    }

    /// Like `insert`, cloning the entry only when it is actually inserted.
    pub fn insert_cloned(&mut self, key: &K, value: &V) -> (Cursor, bool)
    where
        K: Clone,
        V: Clone,
    {
        let (code, bucket, found) = self.probe(key);
        if let Some((_, k)) = found {
            return (Cursor::at(Some(k)), false);
        }
        let k = self
            .chains
            .push_front(bucket, code, key.clone(), value.clone());
        (Cursor::at(Some(k)), true)
    }

    /// Value for `key`, inserting `make()` first if absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, make: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let (code, bucket, found) = self.probe(&key);
        let k = match found {
            Some((_, k)) => k,
            None => self.chains.push_front(bucket, code, key, make()),
        };
        self.chains.value_at_mut(k)
    }

    /// Value for `key`, inserting `V::default()` first if absent.
    pub fn get_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }
}

impl<K, V, H: Default, E: Default> Default for ChainedMap<K, V, H, E> {
    fn default() -> Self {
        Self::with_hasher_and_eq(DEFAULT_BUCKETS, H::default(), E::default())
    }
}

/// Copies rebuild every node by inserting the source's entries in its
/// traversal order into a fresh bucket array of the same size. Within a
/// bucket the copy's order is therefore the reverse of the source's.
impl<K, V, H, E> Clone for ChainedMap<K, V, H, E>
where
    K: Clone,
    V: Clone,
    H: Clone,
    E: Clone,
{
    fn clone(&self) -> Self {
        let mut chains = Chains::new(self.chains.bucket_count());
        for k in self.chains.order() {
            if let Some(n) = self.chains.node(k) {
                let bucket = chains.bucket_for(n.code);
                chains.push_front(bucket, n.code, n.key.clone(), n.value.clone());
            }
        }
        ChainedMap {
            chains,
            hasher: self.hasher.clone(),
            key_eq: self.key_eq.clone(),
        }
    }
}

impl<K, V, H, E> fmt::Debug for ChainedMap<K, V, H, E>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, H, E> PartialEq for ChainedMap<K, V, H, E>
where
    V: PartialEq,
    H: HashCode<K>,
    E: KeyEq<K>,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, H, E> Eq for ChainedMap<K, V, H, E>
where
    V: Eq,
    H: HashCode<K>,
    E: KeyEq<K>,
{
}

/// Inserts each pair; pairs whose key is already present are dropped.
impl<K, V, H, E> Extend<(K, V)> for ChainedMap<K, V, H, E>
where
    H: HashCode<K>,
    E: KeyEq<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, Q, V, H, E> Index<&Q> for ChainedMap<K, V, H, E>
where
    K: Borrow<Q>,
    Q: ?Sized,
    H: HashCode<Q>,
    E: KeyEq<Q>,
{
    type Output = V;

    /// Panics if the key is not present.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("key not found in ChainedMap")
    }
}

impl<K, V, H, E> IntoIterator for ChainedMap<K, V, H, E> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter::new(self.chains)
    }
}

impl<'a, K, V, H, E> IntoIterator for &'a ChainedMap<K, V, H, E> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, H, E> IntoIterator for &'a mut ChainedMap<K, V, H, E> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}
