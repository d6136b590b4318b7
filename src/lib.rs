//! Lintwatch - lint regression tracker
//!
//! This library provides the core functionality for tracking regressions in
//! the output of an external lint tool across repeated runs: stable finding
//! identity, persisted baseline/last snapshots, and the set-diff that turns
//! two runs into an added/removed delta with per-rule summaries.

pub mod cli;
pub mod diff;
pub mod finding;
pub mod invoker;
pub mod report;
pub mod session;
pub mod state;
pub mod summary;
