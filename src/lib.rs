//! chained-map: a hash map with separate chaining over a bucket array whose
//! size is fixed at construction, with cursor-based traversal and bucket
//! introspection.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: an unordered map with unique keys, amortized O(1)
//!   lookup/insert/erase, a deterministic traversal order, and per-bucket
//!   visibility (`bucket`, `bucket_size`, `bucket_iter`).
//! - Layers:
//!   - `Chains<K, V>`: structural layer. A generational arena of nodes, the
//!     bucket array of chain fronts, and a cached `head`. Works purely on
//!     stored hash codes and node identities; never calls user code.
//!   - `ChainedMap<K, V, H, E>`: public layer. Owns the hashing (`H`) and
//!     key-equality (`E`) capabilities, resolves keys to buckets and link
//!     slots, and delegates structural edits to `Chains`.
//!
//! Constraints
//! - The bucket count is chosen once by a sizer (default: smallest
//!   supported prime >= the request) and never changes. No rehashing; the
//!   load factor may exceed 1.
//! - Keys are unique; inserting a present key is a no-op on its value and
//!   reports "not inserted".
//! - Single owner, no internal synchronization.
//!
//! Traversal order
//! - Ascending bucket index; within a bucket, newest entry first (inserts
//!   prepend to the chain). The order is an artifact of placement, not a
//!   sorted order, but the same operation sequence always reproduces it.
//! - `head` caches the first node of that order so `begin()` does not scan
//!   the bucket array. It always fronts the lowest non-empty bucket: an
//!   insert into a bucket at or below the head's becomes the new head, and
//!   erasing the head moves it to its successor before unlinking.
//!
//! Cursors
//! - `Cursor` is a copyable position (a generational node key or the end
//!   marker). It does not borrow the map, so `erase_at(cursor)` can return
//!   the next position and a traversal can erase as it goes. A cursor to an
//!   erased entry never resolves again, even if its slot is reused.
//!
//! Hash codes
//! - Each node stores the `u64` code computed at insertion. Lookups compare
//!   codes before calling `E`; iteration, erase-by-cursor and cloning use
//!   stored codes and never call `H`.
//! - The default `StdHash` is unseeded, so placement and traversal order
//!   depend only on the keys and the operation sequence, not on the
//!   process or the map instance.
//!
//! Notes and non-goals
//! - No resizing, no concurrent access.
//! - Copies rebuild the node graph by re-inserting in the source's
//!   traversal order; moves are Rust moves, and `take`/`take_with` leave
//!   the source empty with the same bucket count.

mod chain;
mod chained_map;
#[cfg(test)]
mod chained_map_proptest;
pub mod cursor;
pub mod dump;
pub mod hashing;
pub mod iter;
pub mod primes;

// Public surface
pub use chained_map::{ChainedMap, MapBuilder, DEFAULT_BUCKETS};
pub use cursor::Cursor;
pub use hashing::{
    FixedState, Fnv1aHash, HashCode, KeyEq, PolynomialRollingHash, StdEq, StdHash, StringHash,
};
pub use primes::{next_prime, CapacityError, MAX_BUCKETS};
