//! Chains: structural layer holding the bucket array and its linked nodes.
//!
//! Nodes live in a generational arena; a bucket slot holds the key of its
//! chain's front node and each node links to the next one in the same
//! bucket. Every node records the hash code computed when it was inserted,
//! so this layer never calls back into user code: bucket resolution,
//! successor lookup and unlinking all work from stored codes and node
//! identities.
//!
//! Invariants maintained here:
//! - a node with code `c` is reachable from `buckets[c % bucket_count]`;
//! - `head` is `None` iff the arena is empty, and otherwise is the front
//!   node of the lowest-indexed non-empty bucket.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Arena index of a chained node.
    pub struct NodeKey;
}

#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) code: u64,
    pub(crate) next: Option<NodeKey>,
}

/// The slot that points at a node: a bucket head or a predecessor's `next`.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Link {
    Bucket(usize),
    After(NodeKey),
}

#[derive(Debug)]
pub(crate) struct Chains<K, V> {
    nodes: SlotMap<NodeKey, Node<K, V>>,
    buckets: Box<[Option<NodeKey>]>,
    head: Option<NodeKey>,
}

impl<K, V> Chains<K, V> {
    pub(crate) fn new(bucket_count: usize) -> Self {
        debug_assert!(bucket_count > 0);
        Self {
            nodes: SlotMap::with_key(),
            buckets: vec![None; bucket_count].into_boxed_slice(),
            head: None,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn bucket_for(&self, code: u64) -> usize {
        (code % self.buckets.len() as u64) as usize
    }

    #[inline]
    pub(crate) fn head(&self) -> Option<NodeKey> {
        self.head
    }

    /// Front node of bucket `bucket`. Panics if out of range.
    #[inline]
    pub(crate) fn bucket_front(&self, bucket: usize) -> Option<NodeKey> {
        self.buckets[bucket]
    }

    #[inline]
    pub(crate) fn node(&self, k: NodeKey) -> Option<&Node<K, V>> {
        self.nodes.get(k)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, k: NodeKey) -> Option<&mut Node<K, V>> {
        self.nodes.get_mut(k)
    }

    /// Value of a node known to be live.
    #[inline]
    pub(crate) fn value_at_mut(&mut self, k: NodeKey) -> &mut V {
        &mut self.nodes[k].value
    }

    /// Node keys in traversal order.
    pub(crate) fn order(&self) -> impl Iterator<Item = NodeKey> + '_ {
        core::iter::successors(self.head, move |&k| self.successor(k))
    }

    fn bucket_of(&self, k: NodeKey) -> usize {
        self.bucket_for(self.nodes[k].code)
    }

    /// Walk `bucket`'s chain and return the first node accepted by `hit`,
    /// together with the link slot that points at it.
    pub(crate) fn locate<F>(&self, bucket: usize, mut hit: F) -> Option<(Link, NodeKey)>
    where
        F: FnMut(NodeKey, &Node<K, V>) -> bool,
    {
        let mut link = Link::Bucket(bucket);
        let mut cur = self.buckets[bucket];
        while let Some(k) = cur {
            let node = &self.nodes[k];
            if hit(k, node) {
                return Some((link, k));
            }
            link = Link::After(k);
            cur = node.next;
        }
        None
    }

    /// First node of the first non-empty bucket at index `>= from`.
    pub(crate) fn first_from(&self, from: usize) -> Option<NodeKey> {
        self.buckets.get(from..)?.iter().find_map(|slot| *slot)
    }

    /// Next node in traversal order: the chain successor, else the front of
    /// the next non-empty bucket.
    pub(crate) fn successor(&self, k: NodeKey) -> Option<NodeKey> {
        let node = self.nodes.get(k)?;
        match node.next {
            Some(next) => Some(next),
            None => self.first_from(self.bucket_for(node.code) + 1),
        }
    }

    /// Prepend a new node to `bucket`. The caller has checked that the key
    /// is absent and that `bucket == bucket_for(code)`.
    pub(crate) fn push_front(&mut self, bucket: usize, code: u64, key: K, value: V) -> NodeKey {
        debug_assert_eq!(bucket, self.bucket_for(code));
        let next = self.buckets[bucket];
        let k = self.nodes.insert(Node {
            key,
            value,
            code,
            next,
        });
        self.buckets[bucket] = Some(k);
        // `<=`: a new front in the head's own bucket precedes the old head.
        let promote = match self.head {
            None => true,
            Some(h) => bucket <= self.bucket_of(h),
        };
        if promote {
            self.head = Some(k);
        }
        k
    }

    fn set_link(&mut self, link: Link, to: Option<NodeKey>) {
        match link {
            Link::Bucket(b) => self.buckets[b] = to,
            Link::After(prev) => self.nodes[prev].next = to,
        }
    }

    /// Unlink `k`, which `link` points at, and hand back its node.
    pub(crate) fn unlink(&mut self, link: Link, k: NodeKey) -> Option<Node<K, V>> {
        let next = self.nodes.get(k)?.next;
        if self.head == Some(k) {
            self.head = self.successor(k);
        }
        self.set_link(link, next);
        self.nodes.remove(k)
    }

    /// Unlink by identity. Returns `None` for a key that is not live.
    pub(crate) fn unlink_node(&mut self, k: NodeKey) -> Option<Node<K, V>> {
        let bucket = self.bucket_for(self.nodes.get(k)?.code);
        let (link, found) = self.locate(bucket, |nk, _| nk == k)?;
        self.unlink(link, found)
    }

    /// Remove the node at the front of traversal order.
    pub(crate) fn pop_head(&mut self) -> Option<Node<K, V>> {
        let h = self.head?;
        let bucket = self.bucket_of(h);
        debug_assert_eq!(self.buckets[bucket], Some(h), "head must front its bucket");
        self.unlink(Link::Bucket(bucket), h)
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.buckets.fill(None);
        self.head = None;
    }

    /// Mutable access to every live node in arena order (not traversal order).
    pub(crate) fn nodes_mut(&mut self) -> slotmap::basic::IterMut<'_, NodeKey, Node<K, V>> {
        self.nodes.iter_mut()
    }

    /// Panics if any structural invariant is broken.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut reachable = 0;
        let mut lowest_non_empty = None;
        for (b, slot) in self.buckets.iter().enumerate() {
            let mut cur = *slot;
            if cur.is_some() && lowest_non_empty.is_none() {
                lowest_non_empty = Some(b);
            }
            while let Some(k) = cur {
                let node = self.nodes.get(k).expect("chain links a live node");
                assert_eq!(self.bucket_for(node.code), b, "node chained in wrong bucket");
                reachable += 1;
                assert!(reachable <= self.nodes.len(), "cycle in chain");
                cur = node.next;
            }
        }
        assert_eq!(reachable, self.nodes.len(), "unreachable nodes in arena");
        match (self.head, lowest_non_empty) {
            (None, None) => {}
            (Some(h), Some(b)) => {
                assert_eq!(self.buckets[b], Some(h), "head must front the lowest bucket")
            }
            (h, b) => panic!("head {h:?} disagrees with lowest non-empty bucket {b:?}"),
        }
    }
}
