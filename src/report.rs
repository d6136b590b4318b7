//! Report rendering for session outcomes
//!
//! Text output mirrors the shape engineers paste into review threads:
//! per-rule summaries followed by the removed/added key listings. JSON
//! output carries the full delta for machine consumers and is never
//! truncated.

use crate::diff::Delta;
use crate::session::{Mode, SessionOutcome};
use crate::summary::Summary;
use serde::Serialize;

/// Render a session outcome as human-readable text.
///
/// `max_list` caps how many keys are listed per direction; the remainder
/// is reported as a `... (N more)` trailer.
pub fn render_text(outcome: &SessionOutcome, max_list: usize) -> String {
    let mut out = String::new();
    match outcome {
        SessionOutcome::Baselined { summary, saved_to } => {
            push_summary(&mut out, "baseline", summary);
            out.push_str(&format!("baseline saved to {saved_to}\n"));
        }
        SessionOutcome::Compared {
            reference_label,
            reference_summary,
            current_summary,
            delta,
        } => {
            push_summary(&mut out, reference_label, reference_summary);
            push_summary(&mut out, "current", current_summary);
            push_listing(&mut out, "removed", '-', &delta.removed, max_list);
            push_listing(&mut out, "added", '+', &delta.added, max_list);
        }
    }
    out
}

fn push_summary(out: &mut String, label: &str, summary: &Summary) {
    out.push_str(&format!("{label}: {} total\n", summary.total));
    for rc in &summary.by_rule {
        out.push_str(&format!("  {}: {}\n", rc.rule, rc.count));
    }
}

fn push_listing(out: &mut String, label: &str, sign: char, keys: &[String], max_list: usize) {
    out.push_str(&format!("{label}: {}\n", keys.len()));
    for key in keys.iter().take(max_list) {
        out.push_str(&format!("  {sign} {key}\n"));
    }
    if keys.len() > max_list {
        out.push_str(&format!("  ... ({} more)\n", keys.len() - max_list));
    }
}

/// Reference snapshot block in the JSON report.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReference {
    pub label: String,
    #[serde(flatten)]
    pub summary: Summary,
}

/// Root JSON report structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    /// Invocation mode
    pub mode: String,
    /// Whether this run created (or replaced) the baseline
    pub baseline_created: bool,
    /// Reference snapshot summary, absent on baseline-creating runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<JsonReference>,
    /// Current run summary
    pub current: Summary,
    /// Keys that disappeared relative to the reference
    pub removed: Vec<String>,
    /// Keys that appeared relative to the reference
    pub added: Vec<String>,
}

impl JsonReport {
    pub fn from_outcome(outcome: &SessionOutcome, mode: Mode) -> Self {
        match outcome {
            SessionOutcome::Baselined { summary, .. } => Self {
                version: env!("CARGO_PKG_VERSION").to_string(),
                format: "lintwatch-json-v1".to_string(),
                mode: mode.as_str().to_string(),
                baseline_created: true,
                reference: None,
                current: summary.clone(),
                removed: Vec::new(),
                added: Vec::new(),
            },
            SessionOutcome::Compared {
                reference_label,
                reference_summary,
                current_summary,
                delta: Delta { removed, added },
            } => Self {
                version: env!("CARGO_PKG_VERSION").to_string(),
                format: "lintwatch-json-v1".to_string(),
                mode: mode.as_str().to_string(),
                baseline_created: false,
                reference: Some(JsonReference {
                    label: (*reference_label).to_string(),
                    summary: reference_summary.clone(),
                }),
                current: current_summary.clone(),
                removed: removed.clone(),
                added: added.clone(),
            },
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Render a session outcome as the machine-readable JSON report.
pub fn render_json(outcome: &SessionOutcome, mode: Mode) -> anyhow::Result<String> {
    let mut json = JsonReport::from_outcome(outcome, mode).to_json()?;
    json.push('\n');
    Ok(json)
}
