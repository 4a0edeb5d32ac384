//! Iterators over `ChainedMap`.
//!
//! All global iterators visit entries in traversal order: ascending bucket
//! index, and within a bucket from the most recently inserted entry to the
//! oldest. `LocalIter` walks a single bucket's chain.

use crate::chain::{Chains, NodeKey};
use core::iter::FusedIterator;
use slotmap::SecondaryMap;

/// Iterator over `(&K, &V)` in traversal order.
pub struct Iter<'a, K, V> {
    chains: &'a Chains<K, V>,
    cur: Option<NodeKey>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(chains: &'a Chains<K, V>) -> Self {
        Self {
            chains,
            cur: chains.head(),
            remaining: chains.len(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.cur?;
        let node = self.chains.node(k)?;
        self.cur = self.chains.successor(k);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            chains: self.chains,
            cur: self.cur,
            remaining: self.remaining,
        }
    }
}

/// Iterator over `(&K, &mut V)` in traversal order.
///
/// The arena hands out mutable references only in storage order, so the
/// traversal order is recorded first and the references are arranged to
/// match it up front. Creating one therefore allocates and walks every
/// entry, even if only a few are consumed; prefer `get_mut` or
/// `Cursor::value_mut` for a handful of updates in a hot loop.
pub struct IterMut<'a, K, V> {
    entries: std::vec::IntoIter<(&'a K, &'a mut V)>,
}

impl<'a, K, V> IterMut<'a, K, V> {
    pub(crate) fn new(chains: &'a mut Chains<K, V>) -> Self {
        let order: Vec<NodeKey> = chains.order().collect();
        let mut refs = SecondaryMap::with_capacity(order.len());
        for (k, node) in chains.nodes_mut() {
            refs.insert(k, (&node.key, &mut node.value));
        }
        let entries: Vec<_> = order.into_iter().filter_map(|k| refs.remove(k)).collect();
        Self {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Iterator over one bucket's chain, newest entry first.
pub struct LocalIter<'a, K, V> {
    chains: &'a Chains<K, V>,
    cur: Option<NodeKey>,
}

impl<'a, K, V> LocalIter<'a, K, V> {
    pub(crate) fn new(chains: &'a Chains<K, V>, bucket: usize) -> Self {
        Self {
            chains,
            cur: chains.bucket_front(bucket),
        }
    }
}

impl<'a, K, V> Iterator for LocalIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.chains.node(self.cur?)?;
        self.cur = node.next;
        Some((&node.key, &node.value))
    }
}

impl<K, V> FusedIterator for LocalIter<'_, K, V> {}

impl<K, V> Clone for LocalIter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            chains: self.chains,
            cur: self.cur,
        }
    }
}

/// Owning iterator; pops entries off the front of traversal order.
pub struct IntoIter<K, V> {
    chains: Chains<K, V>,
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(chains: Chains<K, V>) -> Self {
        Self { chains }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.chains.pop_head().map(|n| (n.key, n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.chains.len(), Some(self.chains.len()))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}
