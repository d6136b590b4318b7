use anyhow::{Context, Result};
use clap::Parser;
use lintwatch::cli::{Cli, OutputFormat};
use lintwatch::invoker::CommandInvoker;
use lintwatch::report;
use lintwatch::session::run_session;
use lintwatch::state::FsStateStore;
use regex::Regex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let rule_filter = args
        .rule
        .as_deref()
        .map(Regex::new)
        .transpose()
        .context("invalid --rule regex")?;

    let invoker =
        CommandInvoker::new(&args.tool).with_timeout(args.timeout.map(Duration::from_secs));
    let mut store = FsStateStore::new(&args.state_dir);

    let outcome = run_session(
        args.mode,
        &args.path,
        &invoker,
        &mut store,
        rule_filter.as_ref(),
    )?;

    let rendered = match args.format {
        OutputFormat::Text => report::render_text(&outcome, args.max_list),
        OutputFormat::Json => report::render_json(&outcome, args.mode)?,
    };
    print!("{rendered}");
    Ok(())
}
