// Contract-First Design
// This module defines the catalog contract (preconditions, postconditions,
// invariants) that the B-tree engine implements and that collaborators
// (persistence, CLI) program against.

use crate::types::RecordKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A catalog record.
///
/// Immutable after construction: the derived key never changes. Editing a
/// record is modeled as remove-by-old-key followed by insert of a freshly
/// constructed record, never in-place mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    key: RecordKey,
    name: String,
    category: String,
    locations: Vec<String>,
}

impl Record {
    /// Construct a record, deriving its key from `name`.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        locations: Vec<String>,
    ) -> Self {
        let name = name.into();
        let key = RecordKey::derive(&name);
        Self {
            key,
            name,
            category: category.into(),
            locations,
        }
    }

    /// The derived lookup key.
    pub fn key(&self) -> &RecordKey {
        &self.key
    }

    /// The display name the key was derived from.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn locations(&self) -> &[String] {
        &self.locations
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Key: {}", self.key)?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Category: {}", self.category)?;
        write!(f, "Locations: {}", self.locations.join(", "))
    }
}

/// Outcome of a removal attempt.
///
/// Not-found conditions are ordinary values, never errors: the engine uses
/// no error propagation for control flow, and a failed removal performs no
/// mutation at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    /// Exactly one record with the key was removed.
    Removed,
    /// No record with the key exists; the tree is unchanged.
    NotFound,
    /// The tree holds no records at all; nothing to remove.
    EmptyTree,
}

impl RemoveOutcome {
    pub fn removed(self) -> bool {
        matches!(self, RemoveOutcome::Removed)
    }
}

impl fmt::Display for RemoveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoveOutcome::Removed => write!(f, "removed"),
            RemoveOutcome::NotFound => write!(f, "not found"),
            RemoveOutcome::EmptyTree => write!(f, "empty tree"),
        }
    }
}

/// Core trait for catalog operations with clear contracts.
///
/// The contract is synchronous and single-writer: every operation runs to
/// completion on the calling thread with no I/O. A concurrent host must
/// serialize all calls through one exclusive lock, since the structure is
/// transiently inconsistent between rebalancing steps.
pub trait Catalog {
    /// Insert a record.
    ///
    /// # Postconditions
    /// - The record is immediately searchable by its derived key
    /// - Records with an equal key are kept, ordered by arrival
    /// - All tree invariants hold on return
    fn insert(&mut self, record: Record);

    /// Look up a record by derived key.
    ///
    /// # Postconditions
    /// - Returns `Some` with a matching record if one exists
    /// - Returns `None` otherwise
    /// - Does not modify any state
    fn search(&self, key: &str) -> Option<&Record>;

    /// Remove one record by derived key.
    ///
    /// # Postconditions
    /// - `Removed`: exactly one matching record is gone
    /// - `NotFound` / `EmptyTree`: no structural change whatsoever
    /// - All tree invariants hold on return
    fn remove(&mut self, key: &str) -> RemoveOutcome;

    /// Replace the record at `old_key` with `record`.
    ///
    /// Performs `remove(old_key)` then `insert(record)`. The two steps are
    /// not atomic with respect to absence: when `old_key` does not exist
    /// the removal reports not-found and the insert happens anyway, so
    /// editing a missing key degrades to a plain insertion. The removal
    /// outcome is returned unchanged so callers can observe this.
    fn edit(&mut self, old_key: &str, record: Record) -> RemoveOutcome;

    /// All records in non-decreasing key order.
    fn traverse(&self) -> Vec<&Record>;

    /// Number of records currently held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
