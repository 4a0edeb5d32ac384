//! Bucket-by-bucket dump of a map, for diagnostics.

use crate::chain::Chains;
use crate::iter::LocalIter;
use core::fmt::{self, Write};

/// Displays one line per bucket: `index: (key, value) (key, value) `,
/// entries in chain order. Empty buckets print as `index: `.
pub struct BucketDump<'a, K, V> {
    chains: &'a Chains<K, V>,
}

impl<'a, K, V> BucketDump<'a, K, V> {
    pub(crate) fn new(chains: &'a Chains<K, V>) -> Self {
        Self { chains }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> BucketDump<'_, K, V> {
    fn write_bucket<W: Write>(&self, out: &mut W, bucket: usize) -> fmt::Result {
        write!(out, "{bucket}: ")?;
        for (k, v) in LocalIter::new(self.chains, bucket) {
            write!(out, "({k:?}, {v:?}) ")?;
        }
        Ok(())
    }

    /// Emit the dump at `trace` level, one record per bucket.
    pub fn log(&self) {
        if !log::log_enabled!(log::Level::Trace) {
            return;
        }
        let mut line = String::new();
        for bucket in 0..self.chains.bucket_count() {
            line.clear();
            if self.write_bucket(&mut line, bucket).is_ok() {
                log::trace!("{line}");
            }
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Display for BucketDump<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bucket in 0..self.chains.bucket_count() {
            self.write_bucket(f, bucket)?;
            f.write_char('\n')?;
        }
        Ok(())
    }
}
