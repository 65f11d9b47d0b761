//! chain-table: a single-threaded, string-keyed hash table with separate
//! chaining and load-factor driven rescaling.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a small associative container whose bucket layout, collision
//!   chains and rescale policy are explicit and observable.
//! - Layers:
//!   - `hash`: Horner hash (multiplier 31) and `hash mod capacity` indexing.
//!   - BucketArray<V>: a fixed number of buckets, each the head of a chain
//!     of records. Records live in a `SlotMap` arena and link to each other
//!     by arena key, so chains need no owning pointers.
//!   - LoadFactorPolicy: pure decision `(len, capacity) -> Keep | Grow | Shrink`.
//!   - HashTable<V>: public API. Owns exactly one BucketArray plus the live
//!     count, and swaps in a freshly rehashed array when the policy asks.
//!
//! Constraints
//! - Single-threaded: no locking; callers must not share a table across
//!   threads while mutating it.
//! - Keys are `String` and immutable once inserted; values are an opaque
//!   `V` (`PartialEq` for `contains_value`, `Clone` for cloning).
//! - Keys are unique. `add` never overwrites an existing key; `set` is the
//!   only way to change a stored value and is a no-op for absent keys.
//! - The live count always equals the number of records reachable through
//!   the chains.
//!
//! Rescaling
//! - Checked after every `add` that stored a record and every `remove` that
//!   took one out, and only when the table is non-empty.
//! - Load factor above 0.75: grow to `len * 2` buckets. Below 0.25: halve
//!   the bucket count, never below the configured floor (default 1).
//! - The rebuilt array records a `Diagnostic` (severity `Warning`) naming
//!   the rescale. It is informational and never affects behavior.
//! - Failing to allocate a larger array is the one terminal error; it is
//!   returned from `add` and the table keeps its previous array.
//!
//! Hashing
//! - The hash accumulates in an `i64` and wraps on overflow, so long keys
//!   can hash negative. Indexing reinterprets the hash as `u64` before the
//!   modulo. The hash is not collision resistant against crafted keys.
//!
//! Notes and non-goals
//! - No iteration order is promised beyond "bucket order, then chain order".
//! - No persistence and no concurrent variant.
//! - The library only emits `tracing` events; installing a subscriber is up
//!   to the application.

#[cfg(feature = "bench_internal")]
pub mod bucket_array;
#[cfg(not(feature = "bench_internal"))]
mod bucket_array;
pub mod config;
pub mod diagnostic;
mod error;
pub mod hash;
mod hash_table;
mod hash_table_proptest;
pub mod policy;

// Public surface
pub use bucket_array::{Iter, Record};
pub use config::TableConfig;
pub use diagnostic::{Diagnostic, Direction, ResizeEvent, Severity};
pub use error::{Result, TableError};
pub use hash_table::{HashTable, Keys, Values};
