//! Key hashing and bucket indexing.
//!
//! The hash is a Horner polynomial over the key's bytes with multiplier 31,
//! accumulated in an `i64` with wrapping arithmetic. Long keys wrap around
//! and may produce negative hashes; that is expected. The function is cheap
//! and deterministic but not collision resistant: crafted keys can force
//! every record into one chain.

/// Horner multiplier.
pub const MULTIPLIER: i64 = 31;

/// Hash `key` as `h = 31 * h + byte` over its UTF-8 bytes, wrapping on overflow.
#[inline]
pub fn hash_key(key: &str) -> i64 {
    key.bytes().fold(0i64, |h, b| {
        h.wrapping_mul(MULTIPLIER).wrapping_add(i64::from(b))
    })
}

/// Bucket index of `key` in an array of `capacity` buckets.
///
/// The hash is reinterpreted as `u64` before the modulo, so a negative hash
/// still lands in `[0, capacity)`.
///
/// `capacity` must be non-zero; bucket arrays never have zero buckets.
#[inline]
pub fn bucket_index(key: &str, capacity: usize) -> usize {
    index_of_hash(hash_key(key), capacity)
}

#[inline]
pub(crate) fn index_of_hash(hash: i64, capacity: usize) -> usize {
    debug_assert!(capacity > 0, "bucket array must have at least one bucket");
    ((hash as u64) % (capacity as u64)) as usize
}
