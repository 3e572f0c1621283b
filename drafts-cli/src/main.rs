//! `draft-images`: record new `DraftImage` placeholders in the review sheet.
//!
//! Normally run from CI after a push, with every setting supplied through the
//! environment:
//!
//! ```text
//! BEFORE_SHA=<old> CURRENT_SHA=<new> \
//! SHEETS_SPREADSHEET_ID=... SHEETS_SERVICE_ACCOUNT_EMAIL=... SHEETS_SERVICE_ACCOUNT_KEY=... \
//!     draft-images [--dry-run]
//! ```

mod commands;

use anyhow::Result;
use clap::Parser;

use commands::sync::SyncArgs;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "draft-images",
    version,
    about = "Append DraftImage placeholders from changed JSX files to the review spreadsheet",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    sync: SyncArgs,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        // `--help` and `--version` are not failures.
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            std::process::exit(1);
        }
    };
    init_logging();
    cli.sync.run()
}

/// Log to stderr so stdout carries only the run summary.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
