//! Finding identity and run snapshots
//!
//! A `Finding` is one reported issue from a lint run. Identity is derived
//! from the four semantic fields only; any other metadata the tool attaches
//! is ignored when deciding whether two runs reported "the same finding".

use serde::{Deserialize, Serialize};

/// Field separator for identity keys. `|` does not occur in rule names or
/// in the file paths the lint tool emits.
const KEY_SEP: char = '|';

/// Placeholder for a missing line number inside an identity key.
const NO_LINE: &str = "-";

/// A single finding reported by the lint tool.
///
/// Unknown fields in the tool payload are ignored on deserialization, so the
/// tool is free to add metadata without breaking snapshot compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Rule identifier (e.g., "signal-naming")
    pub rule: String,
    /// Path of the offending file, as reported by the tool
    pub file: String,
    /// 1-based line number; absent for file-level findings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    /// Human-readable description
    pub message: String,
}

impl Finding {
    /// Create a finding from its four identity fields.
    pub fn new(
        rule: impl Into<String>,
        file: impl Into<String>,
        line: Option<u32>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// Stable identity key for this finding.
    ///
    /// Pure and deterministic: two findings with equal `(rule, file, line,
    /// message)` always produce equal keys, and the field delimiter keeps
    /// distinct findings apart without any hashing.
    pub fn key(&self) -> String {
        let line = match self.line {
            Some(n) => n.to_string(),
            None => NO_LINE.to_string(),
        };
        format!(
            "{rule}{sep}{file}{sep}{line}{sep}{message}",
            rule = self.rule,
            file = self.file,
            line = line,
            message = self.message,
            sep = KEY_SEP,
        )
    }
}

/// The complete output of one lint invocation against a target.
///
/// Ordering of `violations` carries no meaning; only set membership does.
/// Comparison and reporting sort at their own boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSnapshot {
    /// Unix seconds at capture time, for diagnostics only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<u64>,
    /// Findings reported by the run
    #[serde(default)]
    pub violations: Vec<Finding>,
}

impl RunSnapshot {
    /// Snapshot with the given findings and no capture timestamp.
    pub fn new(violations: Vec<Finding>) -> Self {
        Self {
            captured_at: None,
            violations,
        }
    }

    /// Number of findings in the snapshot.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// True when the snapshot has no findings.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Copy of this snapshot keeping only findings whose rule matches.
    pub fn filter_rules(&self, pattern: &regex::Regex) -> Self {
        Self {
            captured_at: self.captured_at,
            violations: self
                .violations
                .iter()
                .filter(|v| pattern.is_match(&v.rule))
                .cloned()
                .collect(),
        }
    }
}
