//! Hashing and key-equality capabilities injected into `ChainedMap`.
//!
//! The table only needs a key's `u64` code and an equality test, so both
//! are small traits rather than `Hash`/`Eq` bounds. That keeps the map
//! usable with string hashers that must be bit-exact (bucket placement in
//! fixtures depends on them), with closures, and with a strategy chosen at
//! runtime.
//!
//! Lookups accept borrowed forms of the key (`&str` for `String` keys), so
//! a capability implemented for `Q` must give the same answer for a key
//! and its borrowed form, exactly as `Borrow` requires for `Hash`/`Eq`.

use core::hash::{BuildHasher, BuildHasherDefault, Hash};
use std::collections::hash_map::DefaultHasher;

/// Maps a key to an unsigned hash code. Must be pure and deterministic.
pub trait HashCode<Q: ?Sized> {
    fn code(&self, key: &Q) -> u64;
}

/// Key equality used after a hash-code match.
pub trait KeyEq<Q: ?Sized> {
    fn equal(&self, a: &Q, b: &Q) -> bool;
}

/// Unseeded std SipHash: every instance produces the same codes.
pub type FixedState = BuildHasherDefault<DefaultHasher>;

/// Hashes through a std `BuildHasher`; the default capability.
///
/// The default state is fixed, so two maps fed the same operations place
/// and traverse entries identically. Pass `RandomState::new()` to
/// `StdHash::new` for per-map random seeding.
#[derive(Clone, Debug, Default)]
pub struct StdHash<S = FixedState>(S);

impl<S> StdHash<S> {
    pub fn new(build_hasher: S) -> Self {
        StdHash(build_hasher)
    }
}

impl<Q, S> HashCode<Q> for StdHash<S>
where
    Q: ?Sized + Hash,
    S: BuildHasher,
{
    #[inline]
    fn code(&self, key: &Q) -> u64 {
        self.0.hash_one(key)
    }
}

impl<Q, F> HashCode<Q> for F
where
    Q: ?Sized,
    F: Fn(&Q) -> u64,
{
    #[inline]
    fn code(&self, key: &Q) -> u64 {
        self(key)
    }
}

/// Equality through `Eq`; the default capability.
#[derive(Copy, Clone, Debug, Default)]
pub struct StdEq;

impl<Q: ?Sized + Eq> KeyEq<Q> for StdEq {
    #[inline]
    fn equal(&self, a: &Q, b: &Q) -> bool {
        a == b
    }
}

impl<Q, F> KeyEq<Q> for F
where
    Q: ?Sized,
    F: Fn(&Q, &Q) -> bool,
{
    #[inline]
    fn equal(&self, a: &Q, b: &Q) -> bool {
        self(a, b)
    }
}

// Byte-oriented hashers treat each byte as a signed char: bytes >= 0x80 are
// sign-extended before mixing. For ASCII input this is invisible.
#[inline]
fn signed(b: u8) -> i64 {
    b as i8 as i64
}

const POLY_BASE: i64 = 19;
const POLY_MODULUS: i64 = 3_298_534_883_309;

/// Polynomial rolling hash: `sum(byte_i * 19^i mod M)` with wrapping sum.
#[derive(Copy, Clone, Debug, Default)]
pub struct PolynomialRollingHash;

impl PolynomialRollingHash {
    pub fn hash_bytes(bytes: &[u8]) -> u64 {
        let mut hash = 0u64;
        let mut p: i64 = 1;
        for &b in bytes {
            hash = hash.wrapping_add(signed(b).wrapping_mul(p) as u64);
            p = (p * POLY_BASE) % POLY_MODULUS;
        }
        hash
    }
}

impl<Q: ?Sized + AsRef<[u8]>> HashCode<Q> for PolynomialRollingHash {
    #[inline]
    fn code(&self, key: &Q) -> u64 {
        Self::hash_bytes(key.as_ref())
    }
}

const FNV_OFFSET_BASIS: u64 = 0xCBF2_9CE4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

/// FNV-1a, 64-bit: xor the byte in, then multiply by the FNV prime.
#[derive(Copy, Clone, Debug, Default)]
pub struct Fnv1aHash;

impl Fnv1aHash {
    pub fn hash_bytes(bytes: &[u8]) -> u64 {
        bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
            (hash ^ signed(b) as u64).wrapping_mul(FNV_PRIME)
        })
    }
}

impl<Q: ?Sized + AsRef<[u8]>> HashCode<Q> for Fnv1aHash {
    #[inline]
    fn code(&self, key: &Q) -> u64 {
        Self::hash_bytes(key.as_ref())
    }
}

/// String hash strategy picked at runtime.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum StringHash {
    #[default]
    PolynomialRolling,
    Fnv1a,
}

impl<Q: ?Sized + AsRef<[u8]>> HashCode<Q> for StringHash {
    fn code(&self, key: &Q) -> u64 {
        match self {
            StringHash::PolynomialRolling => PolynomialRollingHash::hash_bytes(key.as_ref()),
            StringHash::Fnv1a => Fnv1aHash::hash_bytes(key.as_ref()),
        }
    }
}
