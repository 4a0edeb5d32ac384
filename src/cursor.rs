//! Cursor: a copyable position in a map's traversal order.

use crate::chain::NodeKey;
use crate::chained_map::ChainedMap;

/// Position of one entry, or the end marker.
///
/// A cursor does not borrow the map; it names a node, and accessors take
/// the map explicitly. Cursors compare equal when they name the same node
/// (all end cursors are equal). Once the entry is erased its cursor no
/// longer resolves, even if the storage is reused by a later insert.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Cursor(Option<NodeKey>);

impl Cursor {
    pub(crate) fn at(k: Option<NodeKey>) -> Self {
        Cursor(k)
    }

    pub(crate) fn node(&self) -> Option<NodeKey> {
        self.0
    }

    /// The end marker, one past the last entry.
    pub const fn end() -> Self {
        Cursor(None)
    }

    pub fn is_end(&self) -> bool {
        self.0.is_none()
    }

    pub fn key<'a, K, V, H, E>(&self, map: &'a ChainedMap<K, V, H, E>) -> Option<&'a K> {
        self.entry(map).map(|(k, _)| k)
    }

    pub fn value<'a, K, V, H, E>(&self, map: &'a ChainedMap<K, V, H, E>) -> Option<&'a V> {
        self.entry(map).map(|(_, v)| v)
    }

    pub fn entry<'a, K, V, H, E>(
        &self,
        map: &'a ChainedMap<K, V, H, E>,
    ) -> Option<(&'a K, &'a V)> {
        let node = map.chains.node(self.0?)?;
        Some((&node.key, &node.value))
    }

    /// Mutable access to the value; the key stays immutable.
    pub fn value_mut<'a, K, V, H, E>(
        &self,
        map: &'a mut ChainedMap<K, V, H, E>,
    ) -> Option<&'a mut V> {
        map.chains.node_mut(self.0?).map(|n| &mut n.value)
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Cursor::end()
    }
}
