// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use clap's "derive" API: the CLI structure is written as Rust structs
// and enums, and clap generates the parsing, --help and --version for us.
//
// The parsed ScanArgs are turned into validated ScanSettings in
// src/settings.rs; nothing else in the program reads ScanArgs directly.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "dirhound",
    version,
    about = "Content-discovery scanner: spiders directories and probes for backup files",
    long_about = "dirhound requests candidate URLs with a pool of workers, follows \
                  redirects and directory listings as new scan targets, and tries \
                  extension and backup-file variants (.swp, ~, .bak, .orig) of every file it finds."
)]
pub struct Cli {
    /// Print debug logs (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan one or more base URLs
    ///
    /// Example: dirhound scan https://example.com/ --wordlist words.txt -x php,html
    Scan(ScanArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Base URLs to start from (e.g., https://example.com/)
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Number of concurrent workers
    #[arg(short, long, default_value_t = 8)]
    pub workers: usize,

    /// Extensions to append to paths without one (comma separated, e.g. php,html)
    #[arg(short = 'x', long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Do not try backup-file variants (.swp, ~, .bak, .orig)
    #[arg(long)]
    pub no_mangle: bool,

    /// Status codes that mean "this exists, keep going" (comma separated)
    #[arg(long, value_delimiter = ',', default_value = "200")]
    pub spider_codes: Vec<u16>,

    /// Pause after every request, in milliseconds
    #[arg(long, default_value_t = 0)]
    pub sleep_ms: u64,

    /// Parse HTML responses and queue the links they contain
    #[arg(long)]
    pub parse_html: bool,

    /// Words to try inside every directory found (one per line)
    #[arg(long)]
    pub wordlist: Option<PathBuf>,

    /// Output one JSON object per result instead of a table
    #[arg(long)]
    pub json: bool,

    /// Also print 404 results
    #[arg(long = "show-404")]
    pub show_404: bool,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// User-Agent header to send
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scan_defaults() {
        let cli = Cli::parse_from(["dirhound", "scan", "http://example.com/"]);
        let Commands::Scan(args) = cli.command;

        assert_eq!(args.urls, vec!["http://example.com/"]);
        assert_eq!(args.workers, 8);
        assert!(args.extensions.is_empty());
        assert!(!args.no_mangle);
        assert_eq!(args.spider_codes, vec![200]);
        assert_eq!(args.sleep_ms, 0);
        assert!(!args.parse_html);
        assert!(!cli.verbose);
    }

    #[test]
    fn test_parse_scan_lists() {
        let cli = Cli::parse_from([
            "dirhound",
            "scan",
            "http://example.com/",
            "-x",
            "php,html",
            "--spider-codes",
            "200,301,403",
            "--parse-html",
            "-v",
        ]);
        let Commands::Scan(args) = cli.command;

        assert_eq!(args.extensions, vec!["php", "html"]);
        assert_eq!(args.spider_codes, vec![200, 301, 403]);
        assert!(args.parse_html);
        assert!(cli.verbose);
    }

    #[test]
    fn test_scan_requires_url() {
        assert!(Cli::try_parse_from(["dirhound", "scan"]).is_err());
    }
}
