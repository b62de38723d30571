// Validated Types
// Strongly-typed wrappers that enforce their invariants at construction
// time, so the rest of the crate never sees invalid data.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The derived lookup key of a catalog record.
///
/// A key is derived deterministically from a record's display name: every
/// non-alphanumeric character is stripped and the remainder is lowercased.
/// Two different names can derive the same key; the engine stores both and
/// never deduplicates. A name with no alphanumeric characters derives the
/// empty key, which is stored like any other.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RecordKey {
    inner: String,
}

impl RecordKey {
    /// Derive a key from a display name.
    pub fn derive(name: &str) -> Self {
        let inner = name
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        Self { inner }
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Whether the key derived to nothing (name had no alphanumerics).
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl PartialEq<str> for RecordKey {
    fn eq(&self, other: &str) -> bool {
        self.inner == other
    }
}

/// The minimum degree `t` of a B-tree.
///
/// # Invariants
/// - `t >= 2`: every node holds at most `2t - 1` records, and every
///   non-root node at least `t - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinDegree {
    inner: usize,
}

impl MinDegree {
    /// Create a validated minimum degree.
    pub fn new(t: usize) -> Result<Self> {
        ensure!(t >= 2, "Minimum degree must be at least 2, got {}", t);
        Ok(Self { inner: t })
    }

    /// Get the inner value.
    pub fn get(&self) -> usize {
        self.inner
    }

    /// Maximum records a node of this degree may hold (`2t - 1`).
    pub fn max_records(&self) -> usize {
        2 * self.inner - 1
    }

    /// Minimum records a non-root node must hold (`t - 1`).
    pub fn min_records(&self) -> usize {
        self.inner - 1
    }
}

impl fmt::Display for MinDegree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}
