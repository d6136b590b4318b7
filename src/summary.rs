//! Per-rule aggregation of a snapshot
//!
//! Produces the total finding count plus per-rule counts ordered by
//! descending count, ties broken by ascending rule name, so textual
//! output stays stable and diffable between runs.

use crate::finding::RunSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Count of findings for one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCount {
    pub rule: String,
    pub count: usize,
}

/// Aggregated view of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    /// Total number of findings
    pub total: usize,
    /// Per-rule counts, descending by count then ascending by rule
    pub by_rule: Vec<RuleCount>,
}

/// Aggregate a snapshot into total and per-rule counts.
pub fn summarize(snapshot: &RunSnapshot) -> Summary {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in &snapshot.violations {
        *counts.entry(v.rule.as_str()).or_insert(0) += 1;
    }

    let mut by_rule: Vec<RuleCount> = counts
        .into_iter()
        .map(|(rule, count)| RuleCount {
            rule: rule.to_string(),
            count,
        })
        .collect();
    by_rule.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.rule.cmp(&b.rule)));

    Summary {
        total: snapshot.len(),
        by_rule,
    }
}
