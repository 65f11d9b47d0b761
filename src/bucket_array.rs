//! BucketArray: fixed-size chained bucket storage.
//!
//! Records live in a generational arena (`SlotMap`); each bucket holds the
//! key of its chain head and each record links to the next one by key.
//! Nothing here looks at load factors: the number of buckets never changes
//! for a given array, and `HashTable` replaces the whole array to rescale.
//!
//! Each record keeps the hash computed at insert time, and rehashing reuses
//! it instead of hashing the key again.

use crate::diagnostic::Diagnostic;
use crate::error::{Result, TableError};
use crate::hash::{bucket_index, hash_key, index_of_hash};
use core::fmt;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Arena key of one record.
    pub struct RecordKey;
}

#[derive(Debug)]
struct Node<V> {
    key: String,
    value: V,
    hash: i64,
    next: Option<RecordKey>,
}

/// A key-value pair taken out of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<V> {
    key: String,
    value: V,
}

impl<V> Record<V> {
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn into_parts(self) -> (String, V) {
        (self.key, self.value)
    }
}

impl<V> Node<V> {
    fn into_record(self) -> Record<V> {
        Record {
            key: self.key,
            value: self.value,
        }
    }
}

pub struct BucketArray<V> {
    heads: Vec<Option<RecordKey>>,
    nodes: SlotMap<RecordKey, Node<V>>,
    diagnostic: Option<Diagnostic>,
}

impl<V> BucketArray<V> {
    /// `capacity` empty buckets, aborting on allocation failure like `Vec`.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0, "bucket array must have at least one bucket");
        Self {
            heads: vec![None; capacity],
            nodes: SlotMap::with_key(),
            diagnostic: None,
        }
    }

    /// Allocate `capacity` empty buckets.
    ///
    /// The bucket vector is reserved fallibly so that an impossible size
    /// surfaces as `AllocationFailed` instead of aborting.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        debug_assert!(capacity > 0, "bucket array must have at least one bucket");
        let mut heads = Vec::new();
        heads
            .try_reserve_exact(capacity)
            .map_err(|_| TableError::AllocationFailed { capacity })?;
        heads.resize(capacity, None);
        Ok(Self {
            heads,
            nodes: SlotMap::with_key(),
            diagnostic: None,
        })
    }

    /// Number of buckets.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.heads.len()
    }

    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        self.diagnostic.as_ref()
    }

    pub(crate) fn set_diagnostic(&mut self, d: Diagnostic) {
        self.diagnostic = Some(d);
    }

    /// Append `(key, value)` to the tail of its chain.
    ///
    /// If the chain already holds `key` nothing changes, the stored value is
    /// kept, and `false` is returned. Returns `true` iff a record was added.
    pub fn insert(&mut self, key: String, value: V) -> bool {
        let hash = hash_key(&key);
        self.insert_hashed(hash, key, value)
    }

    fn insert_hashed(&mut self, hash: i64, key: String, value: V) -> bool {
        let idx = index_of_hash(hash, self.heads.len());
        let mut tail = None;
        let mut cur = self.heads[idx];
        while let Some(k) = cur {
            let node = &self.nodes[k];
            if node.key == key {
                return false;
            }
            tail = Some(k);
            cur = node.next;
        }

        let new = self.nodes.insert(Node {
            key,
            value,
            hash,
            next: None,
        });
        match tail {
            None => self.heads[idx] = Some(new),
            Some(t) => self.nodes[t].next = Some(new),
        }
        true
    }

    fn find(&self, key: &str) -> Option<RecordKey> {
        let idx = bucket_index(key, self.heads.len());
        let mut cur = self.heads[idx];
        while let Some(k) = cur {
            let node = &self.nodes[k];
            if node.key == key {
                return Some(k);
            }
            cur = node.next;
        }
        None
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.find(key).map(|k| &self.nodes[k].value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Overwrite the value stored under `key`. Absent keys are a no-op and
    /// return `false`.
    pub fn update(&mut self, key: &str, value: V) -> bool {
        match self.find(key) {
            Some(k) => {
                self.nodes[k].value = value;
                true
            }
            None => false,
        }
    }

    /// Unlink and return the record stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Record<V>> {
        let idx = bucket_index(key, self.heads.len());
        let head = self.heads[idx]?;

        if self.nodes[head].key == key {
            let node = self.nodes.remove(head)?;
            self.heads[idx] = node.next;
            return Some(node.into_record());
        }

        let mut prev = head;
        let mut cur = self.nodes[head].next;
        while let Some(k) = cur {
            if self.nodes[k].key == key {
                let node = self.nodes.remove(k)?;
                self.nodes[prev].next = node.next;
                return Some(node.into_record());
            }
            prev = k;
            cur = self.nodes[k].next;
        }
        None
    }

    /// Move every record into a new array of `capacity` buckets.
    ///
    /// Records are re-inserted in bucket order, then chain order. The new
    /// array is allocated before anything is moved, so on error `self` is
    /// left untouched. On success `self` is left with empty buckets.
    pub fn rehash_into(&mut self, capacity: usize) -> Result<BucketArray<V>> {
        let mut fresh = BucketArray::with_capacity(capacity)?;
        fresh.nodes.reserve(self.nodes.len());
        for idx in 0..self.heads.len() {
            let mut cur = self.heads[idx].take();
            while let Some(k) = cur {
                let Some(node) = self.nodes.remove(k) else {
                    break;
                };
                cur = node.next;
                let added = fresh.insert_hashed(node.hash, node.key, node.value);
                debug_assert!(added, "keys are unique before a rehash");
            }
        }
        Ok(fresh)
    }

    /// Count records by walking every chain.
    #[cfg(test)]
    pub(crate) fn reachable(&self) -> usize {
        self.heads
            .iter()
            .map(|&head| {
                let mut n = 0usize;
                let mut cur = head;
                while let Some(k) = cur {
                    n += 1;
                    cur = self.nodes[k].next;
                }
                n
            })
            .sum()
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            array: self,
            bucket: 0,
            cur: None,
            remaining: self.nodes.len(),
        }
    }
}

impl<V: fmt::Debug> BucketArray<V> {
    /// One line per bucket: `i: [key, value] -> ... -> nil`.
    pub fn layout(&self) -> String {
        let mut out = String::new();
        for (i, &head) in self.heads.iter().enumerate() {
            out.push_str(&format!("{i}: "));
            let mut cur = head;
            while let Some(k) = cur {
                let node = &self.nodes[k];
                out.push_str(&format!("[{}, {:?}] -> ", node.key, node.value));
                cur = node.next;
            }
            out.push_str("nil\n");
        }
        out
    }
}

/// Iterator over `(key, value)` in bucket order, then chain order.
pub struct Iter<'a, V> {
    array: &'a BucketArray<V>,
    bucket: usize,
    cur: Option<RecordKey>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let array = self.array;
        loop {
            if let Some(k) = self.cur {
                let node = &array.nodes[k];
                self.cur = node.next;
                self.remaining -= 1;
                return Some((node.key.as_str(), &node.value));
            }
            if self.bucket >= array.heads.len() {
                return None;
            }
            self.cur = array.heads[self.bucket];
            self.bucket += 1;
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}
