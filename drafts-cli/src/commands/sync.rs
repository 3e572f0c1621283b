//! Sync changed `DraftImage` elements into the review sheet.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{builder::BoolishValueParser, Args};
use colored::Colorize;
use drafts_core::DraftImageId;
use drafts_sync::{
    auth::TOKEN_URL,
    changeset::DEFAULT_EXTENSION,
    sheets::{DEFAULT_SHEET_NAME, SHEETS_API_BASE},
    GoogleSheets, RunConfig, RunOutcome, SheetsSettings, SyncReport,
};

/// Run settings. Every flag falls back to its environment variable.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Revision the push ends at.
    #[arg(long, env = "CURRENT_SHA")]
    pub current_sha: Option<String>,

    /// Revision the push started from.
    #[arg(long, env = "BEFORE_SHA")]
    pub before_sha: Option<String>,

    /// Repository to diff; changed paths are read relative to it.
    #[arg(long, env = "DRAFT_IMAGES_REPO", default_value = ".")]
    pub repo: PathBuf,

    /// Only changed files ending in this suffix are scanned.
    #[arg(long, env = "DRAFT_IMAGES_EXTENSION", default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    #[arg(long, env = "SHEETS_SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Tab within the spreadsheet.
    #[arg(long, env = "SHEETS_SHEET_NAME", default_value = DEFAULT_SHEET_NAME)]
    pub sheet_name: String,

    #[arg(long, env = "SHEETS_SERVICE_ACCOUNT_EMAIL")]
    pub service_account_email: Option<String>,

    /// PEM private key; literal `\n` sequences are accepted.
    #[arg(long, env = "SHEETS_SERVICE_ACCOUNT_KEY", hide_env_values = true)]
    pub service_account_key: Option<String>,

    /// Per-request timeout for token and sheet calls.
    #[arg(long, default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Read everything and report what would be appended, without writing.
    ///
    /// `DRY_RUN` accepts `true`/`false`, `1`/`0`, `yes`/`no` and `on`/`off`.
    #[arg(long, env = "DRY_RUN", value_parser = BoolishValueParser::new())]
    pub dry_run: bool,

    #[arg(long, env = "SHEETS_API_BASE", default_value = SHEETS_API_BASE, hide = true)]
    pub api_base: String,

    #[arg(long, env = "SHEETS_TOKEN_URL", default_value = TOKEN_URL, hide = true)]
    pub token_url: String,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let current = self
            .current_sha
            .context("CURRENT_SHA is not set (or pass --current-sha)")?;
        let before = self
            .before_sha
            .context("BEFORE_SHA is not set (or pass --before-sha)")?;

        let mut config = RunConfig::new(self.repo, before, current);
        config.extension = self.extension;
        config.sheet_name = self.sheet_name;
        config.dry_run = self.dry_run;

        let settings = SheetsSettings {
            spreadsheet_id: self.spreadsheet_id,
            service_account_email: self.service_account_email,
            service_account_key: self.service_account_key,
            api_base: self.api_base,
            token_url: self.token_url,
            timeout: Duration::from_secs(self.http_timeout_secs),
        };

        let outcome = drafts_sync::run(&config, || GoogleSheets::connect(&settings))
            .with_context(|| {
                format!(
                    "draft image sync failed for {}..{}",
                    config.before, config.current
                )
            })?;

        for line in summary_lines(&outcome, &config.sheet_name) {
            println!("{line}");
        }
        Ok(())
    }
}

fn summary_lines(outcome: &RunOutcome, sheet: &str) -> Vec<String> {
    match outcome {
        RunOutcome::NothingToDo => vec![format!(
            "{} no changed draft image files; nothing to do",
            "✓".green().bold()
        )],
        RunOutcome::Synced(report) => report_lines(report, sheet),
    }
}

fn report_lines(report: &SyncReport, sheet: &str) -> Vec<String> {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let verb = if report.dry_run {
        "would append"
    } else {
        "appended"
    };

    let mut lines = vec![format!(
        "{prefix}{} {verb} {} row(s) to '{sheet}' ({} draft image(s) in {} file(s))",
        "✓".green().bold(),
        report.appended.len(),
        report.candidates,
        report.changed_files.len(),
    )];

    for record in &report.appended {
        let id = record
            .id
            .as_ref()
            .map(DraftImageId::as_str)
            .unwrap_or("<no id>");
        lines.push(format!("  +  {id}  {}", record.document_name));
    }

    if !report.orphaned.is_empty() {
        lines.push(format!(
            "{prefix}{} {} unactioned row(s) no longer referenced by the scanned files",
            "!".yellow().bold(),
            report.orphaned.len(),
        ));
        for id in &report.orphaned {
            lines.push(format!("  ?  {id}"));
        }
    }
    lines
}
