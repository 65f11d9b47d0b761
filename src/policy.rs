//! Load-factor rescaling policy.
//!
//! Pure decision logic: given the live count and the bucket count after a
//! structural change, say whether to keep, grow or shrink, and to what size.
//! The table owns the actual rebuild.

use crate::config::TableConfig;
use crate::error::{Result, TableError};

/// Outcome of evaluating the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rescale {
    Keep,
    Grow(usize),
    Shrink(usize),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadFactorPolicy {
    min_load_factor: f64,
    max_load_factor: f64,
    min_capacity: usize,
}

/// `len / capacity` as a float. `capacity` is never zero for a live table.
#[inline]
pub fn load_factor(len: usize, capacity: usize) -> f64 {
    len as f64 / capacity as f64
}

impl LoadFactorPolicy {
    pub fn from_config(cfg: &TableConfig) -> Self {
        Self {
            min_load_factor: cfg.min_load_factor,
            max_load_factor: cfg.max_load_factor,
            min_capacity: cfg.min_capacity,
        }
    }

    /// Decide how to rescale after a structural change.
    ///
    /// An empty table always keeps its size, so the load factor is never
    /// computed for it. Growth targets `len * 2` buckets; shrinking halves the
    /// bucket count. Both targets are clamped to the configured floor.
    ///
    /// `Grow(n)` always has `n > capacity` and `Shrink(n)` always has
    /// `n < capacity`; a target that would not move the bucket count in that
    /// direction is reported as `Keep`.
    pub fn evaluate(&self, len: usize, capacity: usize) -> Result<Rescale> {
        if len == 0 {
            return Ok(Rescale::Keep);
        }
        let lf = load_factor(len, capacity);
        if lf < self.min_load_factor {
            let target = (capacity / 2).max(self.min_capacity);
            if target >= capacity {
                return Ok(Rescale::Keep);
            }
            Ok(Rescale::Shrink(target))
        } else if lf > self.max_load_factor {
            let target = len
                .checked_mul(2)
                .ok_or(TableError::CapacityOverflow { len })?
                .max(self.min_capacity);
            // Below a 0.5 ceiling, twice the live count can be fewer buckets
            // than the table already has.
            if target <= capacity {
                return Ok(Rescale::Keep);
            }
            Ok(Rescale::Grow(target))
        } else {
            Ok(Rescale::Keep)
        }
    }
}

impl Default for LoadFactorPolicy {
    fn default() -> Self {
        Self::from_config(&TableConfig::default())
    }
}
