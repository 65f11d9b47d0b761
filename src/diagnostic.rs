//! Informational diagnostics attached to a bucket array.
//!
//! A diagnostic records the rescale that produced the current bucket array.
//! It is observational only and never changes how the table behaves.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Grew,
    Shrank,
}

/// One completed rescale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent {
    pub direction: Direction,
    pub from: usize,
    pub to: usize,
    /// Live records at the time of the rescale.
    pub len: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub event: ResizeEvent,
}

impl Diagnostic {
    pub fn resized(event: ResizeEvent) -> Self {
        Self {
            severity: Severity::Warning,
            event,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Grew => f.write_str("grew"),
            Direction::Shrank => f.write_str("shrank"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let e = &self.event;
        match e.direction {
            Direction::Grew => write!(
                f,
                "warning: load factor above limit, table grew from {} to {} buckets ({} records)",
                e.from, e.to, e.len
            ),
            Direction::Shrank => write!(
                f,
                "warning: load factor below limit, table shrank from {} to {} buckets ({} records)",
                e.from, e.to, e.len
            ),
        }
    }
}
