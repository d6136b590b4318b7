//! Snapshot delta computation
//!
//! Compares two run snapshots by exact identity-key equality. A finding
//! whose line number shifted shows up as removed plus added, never as
//! "moved" - identity is exact, there is no fuzzy matching.

use crate::finding::RunSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Result of comparing a "from" snapshot against a "to" snapshot.
///
/// Both lists hold identity keys in ascending order, so output is
/// reproducible across runs. `removed` and `added` are disjoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    /// Keys present in "from" but absent in "to"
    pub removed: Vec<String>,
    /// Keys present in "to" but absent in "from"
    pub added: Vec<String>,
}

impl Delta {
    /// True when the two snapshots held the same finding set.
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Compute the symmetric delta between two snapshots.
pub fn compare(from: &RunSnapshot, to: &RunSnapshot) -> Delta {
    let from_keys: BTreeSet<String> = from.violations.iter().map(|v| v.key()).collect();
    let to_keys: BTreeSet<String> = to.violations.iter().map(|v| v.key()).collect();

    // BTreeSet iteration is ascending, so both lists come out sorted.
    Delta {
        removed: from_keys.difference(&to_keys).cloned().collect(),
        added: to_keys.difference(&from_keys).cloned().collect(),
    }
}
