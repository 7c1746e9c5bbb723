// src/results/report.rs
// =============================================================================
// Prints scan results as they arrive, then a summary.
//
// Two output formats:
// - Table rows (default), easy to read in a terminal
// - JSON lines (--json), one object per result, easy to pipe into jq
//
// Results arrive in whatever order the workers finish, so the reporter
// prints them immediately instead of sorting.
// =============================================================================

use super::ScanResult;
use std::io::{self, Write};
use tokio::sync::mpsc::Receiver;

// Counts printed in the final summary
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Results with a status code other than 404
    pub found: usize,
    /// Results that failed at the transport level
    pub errors: usize,
    /// Every result received
    pub total: usize,
}

pub struct Reporter<W: Write> {
    out: W,
    json: bool,
    show_404: bool,
    summary: Summary,
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W, json: bool, show_404: bool) -> Self {
        Self {
            out,
            json,
            show_404,
            summary: Summary::default(),
        }
    }

    // Consumes results until every sender has been dropped
    //
    // Returns the summary counts and the writer.
    pub async fn run(mut self, mut results: Receiver<ScanResult>) -> io::Result<(Summary, W)> {
        if !self.json {
            writeln!(self.out, "{:<6} {:>10}  {}", "CODE", "LENGTH", "URL")?;
            writeln!(self.out, "{}", "=".repeat(60))?;
        }

        while let Some(result) = results.recv().await {
            self.record(&result)?;
        }

        if !self.json {
            self.print_summary()?;
        }
        self.out.flush()?;
        Ok((self.summary, self.out))
    }

    fn record(&mut self, result: &ScanResult) -> io::Result<()> {
        self.summary.total += 1;
        if result.is_error() {
            self.summary.errors += 1;
        } else if !result.is_not_found() {
            self.summary.found += 1;
        }

        if result.is_not_found() && !self.show_404 {
            return Ok(());
        }

        if self.json {
            let line = serde_json::to_string(result).map_err(io::Error::other)?;
            writeln!(self.out, "{}", line)
        } else {
            writeln!(self.out, "{}", format_row(result))
        }
    }

    fn print_summary(&mut self) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "Summary:")?;
        writeln!(self.out, "   Found:  {}", self.summary.found)?;
        writeln!(self.out, "   Errors: {}", self.summary.errors)?;
        writeln!(self.out, "   Total:  {}", self.summary.total)
    }
}

// Formats one result as a table row
//
// Examples:
//   "200          1234  http://x/admin"
//   "302             0  http://x/old -> http://x/new"
//   "ERR             -  http://x/slow (request timed out)"
fn format_row(result: &ScanResult) -> String {
    let code = match (result.code, result.is_error()) {
        (_, true) => "ERR".to_string(),
        (Some(code), false) => code.to_string(),
        (None, false) => "-".to_string(),
    };
    let length = result
        .length
        .map(|l| l.to_string())
        .unwrap_or_else(|| "-".to_string());

    let mut row = format!("{:<6} {:>10}  {}", code, length, result.url);
    if let Some(redirect) = &result.redirect {
        row.push_str(&format!(" -> {}", redirect));
    }
    if let Some(error) = &result.error {
        row.push_str(&format!(" ({})", error));
    }
    row
}
