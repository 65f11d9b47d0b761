//! Table sizing configuration.

use crate::error::{Result, TableError};

/// Buckets in a freshly constructed table.
pub const DEFAULT_INITIAL_CAPACITY: usize = 3;
/// Below this load factor the table shrinks.
pub const DEFAULT_MIN_LOAD_FACTOR: f64 = 0.25;
/// Above this load factor the table grows.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;
/// The bucket count never drops below this, whichever way the table rescales.
pub const DEFAULT_MIN_CAPACITY: usize = 1;

/// Sizing knobs for a `HashTable`.
///
/// The defaults reproduce the classic policy: start with 3 buckets, grow to
/// `len * 2` above 0.75, halve below 0.25, never below 1 bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableConfig {
    pub initial_capacity: usize,
    pub min_load_factor: f64,
    pub max_load_factor: f64,
    pub min_capacity: usize,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            min_load_factor: DEFAULT_MIN_LOAD_FACTOR,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            min_capacity: DEFAULT_MIN_CAPACITY,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_load_factors(mut self, min: f64, max: f64) -> Self {
        self.min_load_factor = min;
        self.max_load_factor = max;
        self
    }

    pub fn with_min_capacity(mut self, floor: usize) -> Self {
        self.min_capacity = floor;
        self
    }

    /// Reject configurations that would allow a zero-bucket array or an
    /// inverted load-factor window.
    pub fn validate(&self) -> Result<()> {
        if self.min_capacity == 0 {
            return Err(TableError::InvalidConfig("min_capacity must be at least 1"));
        }
        if self.initial_capacity < self.min_capacity {
            return Err(TableError::InvalidConfig(
                "initial_capacity must not be below min_capacity",
            ));
        }
        if !self.min_load_factor.is_finite() || !self.max_load_factor.is_finite() {
            return Err(TableError::InvalidConfig("load factors must be finite"));
        }
        if self.min_load_factor < 0.0 {
            return Err(TableError::InvalidConfig("min_load_factor must not be negative"));
        }
        if self.min_load_factor >= self.max_load_factor {
            return Err(TableError::InvalidConfig(
                "min_load_factor must be below max_load_factor",
            ));
        }
        Ok(())
    }
}
