//! Bucket sizing: maps a requested bucket count to the prime actually used.
//!
//! Prime bucket counts spread `code mod bucket_count` more evenly than
//! powers of two when hash codes have structure in their low bits (the
//! polynomial rolling hash, for instance). Sizes are drawn from a fixed
//! ascending table; requests past its end are rejected, never wrapped.

use core::fmt;

/// Supported bucket counts, ascending. Grows by roughly 1/8 per step past 100.
static PRIMES: &[usize] = &[
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 113, 127, 149, 167, 191, 223, 251, 283, 331, 373, 419, 479, 541, 613, 691, 787,
    887, 997, 1123, 1277, 1439, 1619, 1823, 2053, 2309, 2609, 2939, 3307, 3727, 4201, 4729,
    5323, 6007, 6761, 7607, 8563, 9643, 10853, 12211, 13751, 15473, 17417, 19597, 22051, 24809,
    27917, 31469, 35407, 39839, 44819, 50423, 56731, 63823, 71807, 80783, 90887, 102251, 115057,
    129439, 145633, 163841, 184321, 207367, 233293, 262459, 295271, 332179, 373717, 420439,
    472993, 532141, 598669, 673513, 757709, 852427, 959009, 1078919, 1213801, 1365547, 1536251,
    1728317, 1944361, 2187421, 2460859, 2768483, 3114563, 3503891, 3941887, 4434629, 4988959,
    5612587, 6314183, 7103461, 7991407, 8990339, 10114141, 11378413, 12800729, 14400839,
    16200959, 18226079, 20504353, 23067409, 25950871, 29194741, 32844107, 36949621, 41568421,
    46764481, 52610057, 59186317, 66584647, 74907727, 84271199, 94805143, 106655789, 119987779,
    134986253, 151859551, 170842013, 192197287, 216221959, 243249733, 273655961, 307862987,
    346345877, 389639123, 438344017, 493137023, 554779151, 624126557, 702142387, 789910189,
    888649009, 999730141, 1124696413, 1265283571, 1423444049, 1601374591, 1801546459,
    2026739789, 2280082303, 2565092597, 2885729173, 3246445357, 3652251047, 4108782427,
    4294967291,
];

/// Largest bucket count `next_prime` can produce.
pub const MAX_BUCKETS: usize = 4294967291;

/// Signature of a bucket-sizing capability.
pub type Sizer = fn(usize) -> Result<usize, CapacityError>;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum CapacityError {
    /// The request exceeds the largest supported bucket count.
    TooManyBuckets { requested: usize, max: usize },
    /// A sizer returned fewer buckets than requested (or none at all).
    Undersized { requested: usize, actual: usize },
}

impl fmt::Display for CapacityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapacityError::TooManyBuckets { requested, max } => write!(
                f,
                "requested {requested} buckets, but at most {max} are supported"
            ),
            CapacityError::Undersized { requested, actual } => write!(
                f,
                "sizer produced {actual} buckets for a request of {requested}"
            ),
        }
    }
}

impl std::error::Error for CapacityError {}

/// Smallest supported prime `>= requested`.
pub fn next_prime(requested: usize) -> Result<usize, CapacityError> {
    let i = PRIMES.partition_point(|&p| p < requested);
    PRIMES
        .get(i)
        .copied()
        .ok_or(CapacityError::TooManyBuckets {
            requested,
            max: MAX_BUCKETS,
        })
}
