// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Turn them into validated, read-only scan settings
// 3. Build the work queue, start the worker pool and the reporter
// 4. Wait until the queue drains (or Ctrl-C), then print the summary
// 5. Exit with proper code (0 = scan finished, 2 = error)
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod logging; // src/logging.rs - tracing setup
mod mangle; // src/mangle.rs - backup-file name candidates
mod paths; // src/paths.rs - directory / extension checks on URLs
mod queue; // src/queue/ - deduplicating work queue
mod results; // src/results/ - result records and output
mod settings; // src/settings.rs - validated scan configuration
mod transport; // src/transport/ - HTTP fetching without following redirects
mod worker; // src/worker/ - the workers and the pool

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, ScanArgs};
use queue::{parse_wordlist, WorkQueue};
use results::{Reporter, Summary};
use settings::ScanSettings;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use transport::{HttpConfig, HttpTransportFactory};

// Results buffered per worker before workers wait on the reporter
const RESULTS_PER_WORKER: usize = 64;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> Result<Summary> {
    match cli.command {
        Commands::Scan(args) => handle_scan(&args).await,
    }
}

// Handles the 'scan' subcommand
async fn handle_scan(args: &ScanArgs) -> Result<Summary> {
    let settings = Arc::new(ScanSettings::try_from(args).context("invalid scan settings")?);
    let factory = HttpTransportFactory::new(HttpConfig::from(args));

    let words = match &args.wordlist {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("could not read wordlist {}", path.display()))?;
            parse_wordlist(&text)
        }
        None => Vec::new(),
    };

    info!(
        seeds = settings.seeds.len(),
        words = words.len(),
        extensions = ?settings.extensions,
        mangle = settings.mangle,
        "Starting scan"
    );

    let queue = WorkQueue::new(&settings.seeds, words);
    let (results_tx, results_rx) = mpsc::channel(settings.workers * RESULTS_PER_WORKER);

    let mut handles = worker::start_workers(
        Arc::clone(&settings),
        &factory,
        queue.source(),
        queue.adder(),
        queue.doner(),
        results_tx,
    )
    .context("could not start workers")?;

    // The reporter finishes once every worker (and so every sender) is gone
    let reporter = Reporter::new(std::io::stdout(), args.json, args.show_404);
    let report = tokio::spawn(reporter.run(results_rx));

    // A failed signal registration disables the Ctrl-C branch
    let interrupted = tokio::select! {
        Ok(()) = tokio::signal::ctrl_c() => true,
        _ = worker::wait_all(&mut handles) => false,
    };
    if interrupted {
        warn!("Interrupted, stopping workers after their current URL");
        worker::stop_all(&handles);
        worker::wait_all(&mut handles).await;
    }

    let (summary, _) = report
        .await
        .context("reporter task failed")?
        .context("could not write results")?;

    info!(
        found = summary.found,
        errors = summary.errors,
        total = summary.total,
        seen = queue.seen(),
        pending = queue.pending(),
        "Scan finished"
    );
    Ok(summary)
}
