//! HashTable: public surface over a single owned `BucketArray`.
//!
//! Every structural change (an `add` that stored a record, a `remove` that
//! took one out) is followed by a load-factor check. When the policy asks
//! for a rescale, a brand-new bucket array is built by moving every record
//! into it, and it replaces the old array wholesale.
//!
//! `add` never overwrites: adding a key that is already present leaves the
//! stored value alone and reports `Ok(false)`. `set` is the only way to
//! change the value of an existing key, and it does nothing for an absent
//! key. Both rules are deliberate and part of the contract.

use crate::bucket_array::{BucketArray, Iter, Record};
use crate::config::{TableConfig, DEFAULT_INITIAL_CAPACITY};
use crate::diagnostic::{Diagnostic, Direction, ResizeEvent};
use crate::error::Result;
use crate::hash::hash_key;
use crate::policy::{load_factor, LoadFactorPolicy, Rescale};
use core::fmt;
use tracing::{debug, trace, warn};

pub struct HashTable<V> {
    table: BucketArray<V>,
    len: usize,
    config: TableConfig,
    policy: LoadFactorPolicy,
}

impl<V> HashTable<V> {
    /// Empty table with 3 buckets and the default load-factor window.
    pub fn new() -> Self {
        let config = TableConfig::default();
        Self {
            table: BucketArray::new(DEFAULT_INITIAL_CAPACITY),
            len: 0,
            policy: LoadFactorPolicy::from_config(&config),
            config,
        }
    }

    /// Empty table sized by `config`.
    pub fn with_config(config: TableConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            table: BucketArray::with_capacity(config.initial_capacity)?,
            len: 0,
            policy: LoadFactorPolicy::from_config(&config),
            config,
        })
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Store `value` under `key` unless the key is already present.
    ///
    /// Returns `Ok(true)` if a record was added and `Ok(false)` if the key
    /// existed (the stored value is kept). An error means the table needed
    /// to grow and could not: the record is stored, the previous bucket
    /// array is kept, and the table stays consistent.
    pub fn add(&mut self, key: impl Into<String>, value: V) -> Result<bool> {
        if !self.table.insert(key.into(), value) {
            return Ok(false);
        }
        self.len += 1;
        self.rescale()?;
        Ok(true)
    }

    /// Add every pair from `entries`, one at a time, in the iterator's order.
    ///
    /// Each pair goes through `add`, so the load factor is re-evaluated after
    /// every stored record. Returns how many records were actually added.
    pub fn add_all<I, K>(&mut self, entries: I) -> Result<usize>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
    {
        let mut added = 0;
        for (key, value) in entries {
            if self.add(key, value)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Overwrite the value of an existing key. Returns `false`, and changes
    /// nothing, if `key` is absent.
    pub fn set(&mut self, key: &str, value: V) -> bool {
        self.table.update(key, value)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.table.get(key)
    }

    /// Remove `key`, returning the record that held it.
    ///
    /// Removing only ever shrinks the table. A growth still pending from an
    /// `add` whose rescale failed is left for the next `add`, which reports
    /// its error. A shrink that cannot be allocated is logged and skipped;
    /// the larger array remains valid.
    pub fn remove(&mut self, key: &str) -> Option<Record<V>> {
        let record = self.table.remove(key)?;
        self.len -= 1;
        self.shrink_if_sparse();
        Some(record)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.table.contains_key(key)
    }

    /// Number of live records.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of buckets in the current array.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        load_factor(self.len, self.table.capacity())
    }

    /// Raw Horner hash of `key`, for diagnostics.
    pub fn get_hash(&self, key: &str) -> i64 {
        hash_key(key)
    }

    /// The rescale that produced the current bucket array, if any.
    pub fn last_diagnostic(&self) -> Option<&Diagnostic> {
        self.table.diagnostic()
    }

    /// `(key, value)` pairs in bucket order, then chain order. No logical
    /// ordering is promised.
    pub fn iter(&self) -> Iter<'_, V> {
        self.table.iter()
    }

    pub fn keys(&self) -> Keys<'_, V> {
        Keys {
            inner: self.table.iter(),
        }
    }

    /// Values in the same order `keys` yields their keys.
    pub fn values(&self) -> Values<'_, V> {
        Values {
            inner: self.table.iter(),
        }
    }

    #[cfg(test)]
    pub(crate) fn reachable(&self) -> usize {
        self.table.reachable()
    }

    fn rescale(&mut self) -> Result<()> {
        let from = self.table.capacity();
        match self.policy.evaluate(self.len, from) {
            Ok(Rescale::Keep) => {
                trace!(len = self.len, capacity = from, "load factor within bounds");
                Ok(())
            }
            Ok(Rescale::Grow(to)) => self.rebuild(Direction::Grew, to),
            Ok(Rescale::Shrink(to)) => self.rebuild(Direction::Shrank, to),
            Err(e) => {
                warn!(len = self.len, capacity = from, "cannot size a larger table: {e}");
                Err(e)
            }
        }
    }

    fn shrink_if_sparse(&mut self) {
        let from = self.table.capacity();
        match self.policy.evaluate(self.len, from) {
            Ok(Rescale::Shrink(to)) => {
                // rebuild has already logged the failure
                let _ = self.rebuild(Direction::Shrank, to);
            }
            Ok(Rescale::Grow(_)) | Err(_) => {
                trace!(len = self.len, capacity = from, "growth deferred to the next add");
            }
            Ok(Rescale::Keep) => {
                trace!(len = self.len, capacity = from, "load factor within bounds");
            }
        }
    }

    fn rebuild(&mut self, direction: Direction, to: usize) -> Result<()> {
        let from = self.table.capacity();
        let mut fresh = match self.table.rehash_into(to) {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(from, to, len = self.len, %direction, "rescale failed: {e}");
                return Err(e);
            }
        };
        fresh.set_diagnostic(Diagnostic::resized(ResizeEvent {
            direction,
            from,
            to,
            len: self.len,
        }));
        self.table = fresh;
        debug!(from, to, len = self.len, %direction, "rescaled bucket array");
        Ok(())
    }
}

impl<V: PartialEq> HashTable<V> {
    /// Whether any record holds a value equal to `value`. Linear in `len`.
    pub fn contains_value(&self, value: &V) -> bool {
        self.values().any(|v| v == value)
    }
}

impl<V: Clone> HashTable<V> {
    /// Independent copy built by re-adding every pair into a fresh table
    /// with the same configuration.
    ///
    /// The copy rescales on its own as it fills, so its bucket count may
    /// differ from the source's.
    pub fn try_clone(&self) -> Result<Self> {
        let mut copy = HashTable::with_config(self.config)?;
        for (key, value) in self.iter() {
            copy.add(key, value.clone())?;
        }
        Ok(copy)
    }
}

impl<V: Clone> Clone for HashTable<V> {
    /// Panics if the copy cannot allocate its buckets, as `Vec::clone` does.
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(e) => panic!("cloning hash table: {e}"),
        }
    }
}

impl<V: fmt::Debug> HashTable<V> {
    /// Per-bucket dump of the chains, one line per bucket.
    pub fn layout(&self) -> String {
        self.table.layout()
    }
}

impl<V> Default for HashTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Debug rendering: `((key,{value}), key,{value}))` in traversal order.
impl<V: fmt::Debug> fmt::Display for HashTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("((")?;
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key},{{{value:?}}}")?;
        }
        f.write_str("))")
    }
}

impl<V: fmt::Debug> fmt::Debug for HashTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V> IntoIterator for &'a HashTable<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over keys of a `HashTable`.
pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a str;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Keys<'_, V> {}

/// Iterator over values of a `HashTable`.
pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for Values<'_, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::Severity;
    use crate::error::TableError;
    use std::collections::BTreeSet;

    /// Invariant: the live count equals the number of records reachable
    /// through the chains.
    fn assert_consistent<V>(t: &HashTable<V>) {
        assert_eq!(t.len(), t.reachable());
        assert!(t.capacity() > 0);
    }

    #[test]
    fn new_table_is_empty_with_three_buckets() {
        let t: HashTable<i32> = HashTable::new();
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
        assert_eq!(t.capacity(), 3);
        assert_eq!(t.load_factor(), 0.0);
        assert!(t.last_diagnostic().is_none());
        assert_eq!(t.keys().count(), 0);
    }

    /// Growth follows the policy: the third insert reaches 3/3 and grows to
    /// 3 * 2 buckets; the fourth stays at 4/6.
    #[test]
    fn grows_to_twice_the_live_count() {
        let mut t = HashTable::new();
        assert!(t.add("a", 1).unwrap());
        assert!(t.add("b", 2).unwrap());
        assert_eq!(t.capacity(), 3);
        assert!(t.last_diagnostic().is_none());

        assert!(t.add("c", 3).unwrap());
        assert_eq!(t.capacity(), 6);
        let d = t.last_diagnostic().expect("growth is recorded");
        assert_eq!(d.severity, Severity::Warning);
        assert_eq!(
            d.event,
            ResizeEvent {
                direction: Direction::Grew,
                from: 3,
                to: 6,
                len: 3
            }
        );

        assert!(t.add("d", 4).unwrap());
        assert_eq!(t.capacity(), 6);
        assert_eq!(t.len(), 4);
        assert_eq!(t.get("a"), Some(&1));
        assert_eq!(t.get("d"), Some(&4));
        assert_consistent(&t);
    }

    /// 8 records end up in 16 buckets; removing down to one record shrinks
    /// 16 -> 8 at 3 records and 8 -> 4 at the last one.
    #[test]
    fn shrinks_by_half_when_sparse() {
        let mut t = HashTable::new();
        let keys = ["a", "b", "c", "d", "e", "f", "g", "h"];
        for (i, k) in keys.iter().enumerate() {
            t.add(*k, i).unwrap();
        }
        assert_eq!(t.capacity(), 16);
        assert_eq!(t.len(), 8);

        for k in &keys[..4] {
            t.remove(k).unwrap();
        }
        assert_eq!(t.len(), 4);
        assert_eq!(t.capacity(), 16, "4/16 is exactly the lower bound");

        t.remove("e").unwrap();
        assert_eq!(t.capacity(), 8);
        t.remove("f").unwrap();
        assert_eq!(t.capacity(), 8);

        t.remove("g").unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.capacity(), 4);
        let d = t.last_diagnostic().unwrap();
        assert_eq!(d.event.direction, Direction::Shrank);
        assert_eq!((d.event.from, d.event.to, d.event.len), (8, 4, 1));
        assert_eq!(t.get("h"), Some(&7));
        assert_consistent(&t);
    }

    #[test]
    fn emptying_the_table_never_rescales() {
        let mut t = HashTable::new();
        t.add("only", 1).unwrap();
        let cap = t.capacity();
        let before = t.last_diagnostic().copied();
        assert!(t.remove("only").is_some());
        assert_eq!(t.len(), 0);
        assert_eq!(t.capacity(), cap);
        assert_eq!(t.last_diagnostic().copied(), before);
        assert_consistent(&t);
    }

    #[test]
    fn duplicate_add_is_a_no_op_and_set_overwrites() {
        let mut t = HashTable::new();
        assert!(t.add("x", 1).unwrap());
        assert!(!t.add("x", 2).unwrap());
        assert_eq!(t.get("x"), Some(&1));
        assert_eq!(t.len(), 1);

        assert!(t.set("x", 2));
        assert_eq!(t.get("x"), Some(&2));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn set_on_absent_key_changes_nothing() {
        let mut t = HashTable::new();
        t.add("a", 1).unwrap();
        let before = t.to_string();
        assert!(!t.set("b", 2));
        assert_eq!(t.to_string(), before);
        assert!(!t.contains_key("b"));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn add_then_remove_round_trips() {
        let mut t = HashTable::new();
        t.add("p", 10).unwrap();
        t.add("q", 20).unwrap();
        let size = t.len();

        t.add("k", 7).unwrap();
        let r = t.remove("k").expect("present");
        assert_eq!(r.key(), "k");
        assert_eq!(*r.value(), 7);
        assert_eq!(t.len(), size);
        assert!(!t.contains_key("k"));

        assert!(t.remove("k").is_none());
        assert_eq!(t.len(), size);
        assert_consistent(&t);
    }

    #[test]
    fn keys_and_values_are_parallel() {
        let mut t = HashTable::new();
        for i in 0..10 {
            t.add(format!("k{i}"), i * 100).unwrap();
        }
        let keys: Vec<&str> = t.keys().collect();
        let values: Vec<&i32> = t.values().collect();
        assert_eq!(keys.len(), 10);
        for (k, v) in keys.iter().zip(values) {
            assert_eq!(t.get(k), Some(v));
        }
        let set: BTreeSet<&str> = keys.into_iter().collect();
        assert_eq!(set.len(), 10);
        assert_eq!(t.iter().len(), 10);
        let mut ks = t.keys();
        assert_eq!(ks.len(), 10);
        ks.next();
        assert_eq!(ks.len(), 9);
        assert_eq!(t.values().len(), 10);
        assert_eq!((&t).into_iter().count(), 10);
    }

    #[test]
    fn contains_key_and_value() {
        let mut t = HashTable::new();
        t.add("one", 1).unwrap();
        t.add("two", 2).unwrap();
        assert!(t.contains_key("one"));
        assert!(!t.contains_key("three"));
        assert!(t.contains_value(&2));
        assert!(!t.contains_value(&3));
        t.set("two", 3);
        assert!(t.contains_value(&3));
        assert!(!t.contains_value(&2));
    }

    #[test]
    fn clone_is_independent() {
        let mut t = HashTable::new();
        for i in 0..5 {
            t.add(format!("k{i}"), vec![i]).unwrap();
        }
        let mut c = t.clone();
        assert_eq!(c.len(), t.len());
        for (k, v) in t.iter() {
            assert_eq!(c.get(k), Some(v));
        }

        c.set("k0", vec![99]);
        c.remove("k1");
        c.add("new", vec![]).unwrap();
        assert_eq!(t.get("k0"), Some(&vec![0]));
        assert!(t.contains_key("k1"));
        assert!(!t.contains_key("new"));
        assert_consistent(&t);
        assert_consistent(&c);
    }

    #[test]
    fn display_wraps_pairs() {
        let mut t: HashTable<i32> = HashTable::new();
        assert_eq!(t.to_string(), "(())");
        t.add("a", 1).unwrap();
        assert_eq!(t.to_string(), "((a,{1}))");
        t.add("b", 2).unwrap();
        let s = t.to_string();
        assert!(s == "((a,{1}, b,{2}))" || s == "((b,{2}, a,{1}))", "{s}");

        let mut strs = HashTable::new();
        strs.add("k", "v").unwrap();
        assert_eq!(strs.to_string(), r#"((k,{"v"}))"#);
        assert_eq!(format!("{strs:?}"), r#"{"k": "v"}"#);
    }

    #[test]
    fn layout_shows_every_bucket() {
        let mut t = HashTable::new();
        t.add("a", 1).unwrap();
        let layout = t.layout();
        assert_eq!(layout.lines().count(), t.capacity());
        assert!(layout.contains("[a, 1] -> nil"));
    }

    #[test]
    fn get_hash_exposes_horner_value() {
        let t: HashTable<()> = HashTable::new();
        assert_eq!(t.get_hash("ab"), 31 * 97 + 98);
        assert_eq!(t.get_hash(""), 0);
    }

    /// Keys long enough to wrap the hash into negative values still store and
    /// retrieve correctly.
    #[test]
    fn overflowing_keys_round_trip() {
        let mut t = HashTable::new();
        let keys: Vec<String> = (0..64)
            .map(|i| format!("{i}-{}", "overflowing-key-material".repeat(3)))
            .collect();
        assert!(keys.iter().any(|k| t.get_hash(k) < 0));
        for (i, k) in keys.iter().enumerate() {
            assert!(t.add(k.as_str(), i).unwrap());
        }
        for (i, k) in keys.iter().enumerate() {
            assert_eq!(t.get(k), Some(&i));
        }
        assert_consistent(&t);
    }

    #[test]
    fn add_all_reports_added_count() {
        let mut t = HashTable::new();
        let n = t
            .add_all([("a", 1), ("b", 2), ("a", 3), ("c", 4)])
            .unwrap();
        assert_eq!(n, 3);
        assert_eq!(t.get("a"), Some(&1));
        assert_eq!(t.len(), 3);
        assert_consistent(&t);

        let more: std::collections::HashMap<String, i32> =
            (0..20).map(|i| (format!("m{i}"), i)).collect();
        assert_eq!(t.add_all(more).unwrap(), 20);
        assert_eq!(t.len(), 23);
        assert_consistent(&t);
    }

    #[test]
    fn with_config_validates() {
        let bad = TableConfig::new().with_min_capacity(0);
        assert!(matches!(
            HashTable::<i32>::with_config(bad),
            Err(TableError::InvalidConfig(_))
        ));

        let t: HashTable<i32> =
            HashTable::with_config(TableConfig::new().with_initial_capacity(10)).unwrap();
        assert_eq!(t.capacity(), 10);
    }

    #[test]
    fn oversized_initial_capacity_is_an_allocation_error() {
        let cfg = TableConfig::new().with_initial_capacity(usize::MAX);
        assert!(matches!(
            HashTable::<u8>::with_config(cfg),
            Err(TableError::AllocationFailed { .. })
        ));
    }

    /// A one-bucket floor is honored: with an aggressive lower bound the
    /// table shrinks to, but never below, one bucket.
    #[test]
    fn shrink_stops_at_floor() {
        let cfg = TableConfig::new()
            .with_initial_capacity(8)
            .with_load_factors(0.9, 4.0);
        let mut t = HashTable::with_config(cfg).unwrap();
        t.add("a", 1).unwrap();
        // 1/8 -> 4 buckets (one rescale per operation)
        assert_eq!(t.capacity(), 4);
        t.add("b", 2).unwrap();
        // 2/4 -> 2
        assert_eq!(t.capacity(), 2);
        t.remove("b").unwrap();
        // 1/2 -> 1
        assert_eq!(t.capacity(), 1);
        t.add("b", 2).unwrap();
        t.remove("b").unwrap();
        // 1/1 is within the window; nothing below the floor
        assert_eq!(t.capacity(), 1);
        assert_eq!(t.get("a"), Some(&1));
        assert_consistent(&t);
    }

    /// Every recorded rescale moves in the direction it names, and the
    /// bucket count never drops below the configured floor, even with a
    /// load-factor ceiling under 0.5.
    #[test]
    fn low_ceiling_respects_floor_and_direction() {
        let cfg = TableConfig::new()
            .with_initial_capacity(40)
            .with_min_capacity(40)
            .with_load_factors(0.001, 0.01);
        let mut t = HashTable::with_config(cfg).unwrap();
        t.add("a", 1).unwrap();
        t.add("b", 2).unwrap();
        assert_eq!(t.capacity(), 40);
        t.remove("b").unwrap();
        assert_eq!(t.capacity(), 40);
        assert!(t.last_diagnostic().is_none());

        let cfg = TableConfig::new()
            .with_initial_capacity(1)
            .with_load_factors(0.01, 0.3);
        let mut t = HashTable::with_config(cfg).unwrap();
        let keys: Vec<String> = (0..12).map(|i| format!("k{i}")).collect();
        let mut ops: Vec<(bool, &str)> = keys.iter().map(|k| (true, k.as_str())).collect();
        ops.extend(keys.iter().rev().map(|k| (false, k.as_str())));
        for (adding, k) in ops {
            let before = t.last_diagnostic().copied();
            if adding {
                t.add(k, 0).unwrap();
            } else {
                t.remove(k).unwrap();
            }
            assert!(t.capacity() >= 1);
            if let Some(d) = t.last_diagnostic().copied().filter(|d| Some(*d) != before) {
                let e = d.event;
                match e.direction {
                    Direction::Grew => assert!(e.to > e.from, "{e:?}"),
                    Direction::Shrank => assert!(e.to < e.from, "{e:?}"),
                }
                assert_eq!(e.to, t.capacity());
            }
            assert_consistent(&t);
        }
    }

    /// A table left over its ceiling (as after an `add` whose growth failed)
    /// does not grow on `remove`; the next `add` performs the growth.
    #[test]
    fn remove_leaves_pending_growth_to_add() {
        let mut t: HashTable<i32> = HashTable::new();
        t.table = BucketArray::new(1);
        for (i, k) in ["a", "b", "c"].into_iter().enumerate() {
            assert!(t.table.insert(k.to_string(), i as i32));
        }
        t.len = 3;

        assert!(t.remove("c").is_some());
        assert_eq!(t.capacity(), 1);
        assert!(t.last_diagnostic().is_none());
        assert_consistent(&t);

        t.add("d", 3).unwrap();
        assert_eq!(t.capacity(), 6);
        assert_eq!(t.last_diagnostic().unwrap().event.direction, Direction::Grew);
        assert_eq!(t.get("a"), Some(&0));
        assert_consistent(&t);
    }

    #[test]
    fn clone_uses_source_config() {
        let cfg = TableConfig::new().with_initial_capacity(5);
        let mut t = HashTable::with_config(cfg).unwrap();
        t.add("a", 1).unwrap();
        t.add("b", 2).unwrap();
        let c = t.try_clone().unwrap();
        assert_eq!(c.config(), t.config());
        assert_eq!(c.get("b"), Some(&2));
    }
}
