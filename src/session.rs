//! Session orchestration per invocation mode
//!
//! One invocation is one state transition: capture the current findings,
//! decide whether to bootstrap/re-baseline or to compare, and refresh the
//! `last` snapshot on the way out. The process exits afterwards; there is
//! no long-lived session.

use crate::diff::{compare, Delta};
use crate::finding::RunSnapshot;
use crate::invoker::LintInvoker;
use crate::state::{StateStore, BASELINE, LAST};
use crate::summary::{summarize, Summary};
use anyhow::{Context, Result};
use clap::ValueEnum;
use regex::Regex;
use std::path::Path;

/// Comparison mode for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Capture the current run as the accepted baseline (and as `last`)
    Baseline,
    /// Compare the current run against the accepted baseline
    Diff,
    /// Compare the current run against the previous run
    Last,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Baseline => "baseline",
            Mode::Diff => "diff",
            Mode::Last => "last",
        }
    }
}

/// What a session did, for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The current run became the new baseline (bootstrap or explicit)
    Baselined {
        summary: Summary,
        saved_to: String,
    },
    /// The current run was compared against a reference snapshot
    Compared {
        /// Which snapshot served as the reference ("baseline" or "last")
        reference_label: &'static str,
        reference_summary: Summary,
        current_summary: Summary,
        delta: Delta,
    },
}

/// Run one session: invoke the tool, transition the persisted state, and
/// return the structured outcome.
///
/// A missing baseline self-bootstraps regardless of mode. `rule_filter`
/// narrows what is summarized and compared; persisted snapshots always
/// keep the full finding set so a filtered run cannot thin out the
/// baseline or `last`.
pub fn run_session(
    mode: Mode,
    path: &Path,
    invoker: &dyn LintInvoker,
    store: &mut dyn StateStore,
    rule_filter: Option<&Regex>,
) -> Result<SessionOutcome> {
    let current = invoker
        .run(path)
        .with_context(|| format!("lint run against {} failed", path.display()))?;
    let current_view = apply_filter(&current, rule_filter);

    if mode == Mode::Baseline || !store.exists(BASELINE) {
        store
            .save(BASELINE, &current)
            .context("failed to persist baseline snapshot")?;
        store
            .save(LAST, &current)
            .context("failed to persist last snapshot")?;
        tracing::info!(findings = current.len(), "baseline captured");
        return Ok(SessionOutcome::Baselined {
            summary: summarize(&current_view),
            saved_to: store.describe(BASELINE),
        });
    }

    let (reference_label, reference) = match mode {
        Mode::Last if store.exists(LAST) => ("last", store.load(LAST)?),
        // `last` falls back to the baseline when no previous run exists.
        _ => ("baseline", store.load(BASELINE)?),
    };
    let reference_view = apply_filter(&reference, rule_filter);

    let delta = compare(&reference_view, &current_view);
    tracing::info!(
        reference = reference_label,
        removed = delta.removed.len(),
        added = delta.added.len(),
        "comparison complete"
    );

    let outcome = SessionOutcome::Compared {
        reference_label,
        reference_summary: summarize(&reference_view),
        current_summary: summarize(&current_view),
        delta,
    };

    // Every successful run becomes the new `last`, baseline untouched.
    store
        .save(LAST, &current)
        .context("failed to persist last snapshot")?;
    Ok(outcome)
}

fn apply_filter(snapshot: &RunSnapshot, rule_filter: Option<&Regex>) -> RunSnapshot {
    match rule_filter {
        Some(re) => snapshot.filter_rules(re),
        None => snapshot.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::{Finding, RunSnapshot};
    use crate::invoker::{InvokerError, Result as InvokerResult};
    use crate::state::MemoryStateStore;

    /// Invoker returning a canned snapshot, or a canned failure.
    struct StubInvoker {
        result: std::result::Result<RunSnapshot, String>,
    }

    impl StubInvoker {
        fn ok(findings: Vec<Finding>) -> Self {
            Self {
                result: Ok(RunSnapshot::new(findings)),
            }
        }

        fn failing(diag: &str) -> Self {
            Self {
                result: Err(diag.to_string()),
            }
        }
    }

    impl LintInvoker for StubInvoker {
        fn run(&self, _path: &Path) -> InvokerResult<RunSnapshot> {
            match &self.result {
                Ok(snapshot) => Ok(snapshot.clone()),
                Err(diag) => Err(InvokerError::ToolFailed(diag.clone())),
            }
        }
    }

    fn finding(rule: &str, line: u32) -> Finding {
        Finding::new(rule, "src/top.vhd", Some(line), format!("{rule} violated"))
    }

    fn run(
        mode: Mode,
        invoker: &StubInvoker,
        store: &mut MemoryStateStore,
    ) -> Result<SessionOutcome> {
        run_session(mode, Path::new("src"), invoker, store, None)
    }

    #[test]
    fn test_bootstrap_on_empty_state() {
        let invoker = StubInvoker::ok(vec![finding("a", 1), finding("b", 2), finding("c", 3)]);
        let mut store = MemoryStateStore::new();

        let outcome = run(Mode::Diff, &invoker, &mut store).unwrap();

        match outcome {
            SessionOutcome::Baselined { summary, .. } => assert_eq!(summary.total, 3),
            other => panic!("expected Baselined, got {other:?}"),
        }
        assert_eq!(store.load(BASELINE).unwrap().len(), 3);
        assert_eq!(store.load(LAST).unwrap().len(), 3);
    }

    #[test]
    fn test_bootstrap_happens_in_any_mode() {
        for mode in [Mode::Baseline, Mode::Diff, Mode::Last] {
            let invoker = StubInvoker::ok(vec![finding("a", 1)]);
            let mut store = MemoryStateStore::new();
            let outcome = run(mode, &invoker, &mut store).unwrap();
            assert!(matches!(outcome, SessionOutcome::Baselined { .. }));
            assert!(store.exists(BASELINE));
            assert!(store.exists(LAST));
        }
    }

    #[test]
    fn test_diff_reports_regression() {
        let mut store = MemoryStateStore::new();
        store
            .save(
                BASELINE,
                &RunSnapshot::new(vec![finding("a", 1), finding("b", 2), finding("c", 3)]),
            )
            .unwrap();

        let invoker = StubInvoker::ok(vec![finding("b", 2), finding("c", 3), finding("d", 4)]);
        let outcome = run(Mode::Diff, &invoker, &mut store).unwrap();

        match outcome {
            SessionOutcome::Compared {
                reference_label,
                delta,
                ..
            } => {
                assert_eq!(reference_label, "baseline");
                assert_eq!(delta.removed, vec![finding("a", 1).key()]);
                assert_eq!(delta.added, vec![finding("d", 4).key()]);
            }
            other => panic!("expected Compared, got {other:?}"),
        }
    }

    #[test]
    fn test_diff_leaves_baseline_untouched_and_updates_last() {
        let baseline = RunSnapshot::new(vec![finding("a", 1)]);
        let mut store = MemoryStateStore::new();
        store.save(BASELINE, &baseline).unwrap();

        let invoker = StubInvoker::ok(vec![finding("b", 2)]);
        run(Mode::Diff, &invoker, &mut store).unwrap();

        assert_eq!(store.load(BASELINE).unwrap(), baseline);
        assert_eq!(store.load(LAST).unwrap().violations, vec![finding("b", 2)]);
    }

    #[test]
    fn test_last_mode_compares_against_last() {
        let mut store = MemoryStateStore::new();
        store
            .save(BASELINE, &RunSnapshot::new(vec![finding("a", 1)]))
            .unwrap();
        store
            .save(LAST, &RunSnapshot::new(vec![finding("b", 2)]))
            .unwrap();

        let invoker = StubInvoker::ok(vec![finding("b", 2)]);
        let outcome = run(Mode::Last, &invoker, &mut store).unwrap();

        match outcome {
            SessionOutcome::Compared {
                reference_label,
                delta,
                ..
            } => {
                assert_eq!(reference_label, "last");
                assert!(delta.is_empty());
            }
            other => panic!("expected Compared, got {other:?}"),
        }
    }

    #[test]
    fn test_last_mode_falls_back_to_baseline() {
        let mut store = MemoryStateStore::new();
        store
            .save(BASELINE, &RunSnapshot::new(vec![finding("a", 1)]))
            .unwrap();
        // No `last` snapshot present.

        let invoker = StubInvoker::ok(vec![finding("a", 1), finding("b", 2)]);
        let outcome = run(Mode::Last, &invoker, &mut store).unwrap();

        match outcome {
            SessionOutcome::Compared {
                reference_label,
                delta,
                ..
            } => {
                assert_eq!(reference_label, "baseline");
                assert_eq!(delta.added, vec![finding("b", 2).key()]);
            }
            other => panic!("expected Compared, got {other:?}"),
        }
        assert_eq!(store.load(LAST).unwrap().len(), 2);
    }

    #[test]
    fn test_explicit_rebaseline_overwrites() {
        let mut store = MemoryStateStore::new();
        store
            .save(BASELINE, &RunSnapshot::new(vec![finding("a", 1)]))
            .unwrap();
        store
            .save(LAST, &RunSnapshot::new(vec![finding("a", 1)]))
            .unwrap();

        let invoker = StubInvoker::ok(vec![finding("b", 2), finding("c", 3)]);
        let outcome = run(Mode::Baseline, &invoker, &mut store).unwrap();

        assert!(matches!(outcome, SessionOutcome::Baselined { .. }));
        assert_eq!(store.load(BASELINE).unwrap().len(), 2);
        assert_eq!(store.load(LAST).unwrap().len(), 2);
    }

    #[test]
    fn test_tool_failure_leaves_state_untouched() {
        let baseline = RunSnapshot::new(vec![finding("a", 1)]);
        let mut store = MemoryStateStore::new();
        store.save(BASELINE, &baseline).unwrap();
        store.save(LAST, &baseline).unwrap();

        let invoker = StubInvoker::failing("tool exploded");
        let err = run(Mode::Diff, &invoker, &mut store).unwrap_err();

        assert!(err.to_string().contains("lint run against src failed"));
        assert_eq!(store.load(BASELINE).unwrap(), baseline);
        assert_eq!(store.load(LAST).unwrap(), baseline);
    }

    #[test]
    fn test_rule_filter_narrows_comparison_not_persistence() {
        let mut store = MemoryStateStore::new();
        store
            .save(
                BASELINE,
                &RunSnapshot::new(vec![finding("naming", 1), finding("width", 2)]),
            )
            .unwrap();

        let invoker = StubInvoker::ok(vec![finding("naming", 9), finding("width", 2)]);
        let re = Regex::new("^naming$").unwrap();
        let outcome = run_session(
            Mode::Diff,
            Path::new("src"),
            &invoker,
            &mut store,
            Some(&re),
        )
        .unwrap();

        match outcome {
            SessionOutcome::Compared {
                reference_summary,
                current_summary,
                delta,
                ..
            } => {
                // Only the naming findings are visible to the comparison.
                assert_eq!(reference_summary.total, 1);
                assert_eq!(current_summary.total, 1);
                assert_eq!(delta.removed, vec![finding("naming", 1).key()]);
                assert_eq!(delta.added, vec![finding("naming", 9).key()]);
            }
            other => panic!("expected Compared, got {other:?}"),
        }

        // The persisted `last` still carries the full set.
        assert_eq!(store.load(LAST).unwrap().len(), 2);
    }

    #[test]
    fn test_mode_as_str() {
        assert_eq!(Mode::Baseline.as_str(), "baseline");
        assert_eq!(Mode::Diff.as_str(), "diff");
        assert_eq!(Mode::Last.as_str(), "last");
    }
}
