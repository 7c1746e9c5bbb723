// src/settings.rs
// =============================================================================
// Scan settings: the read-only configuration every worker shares.
//
// ScanSettings is built once from the command line, validated, wrapped in
// an Arc and handed to the worker pool. Nothing mutates it after that, so
// workers can read it without any locking.
// =============================================================================

use crate::cli::ScanArgs;
use crate::transport::HttpConfig;
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("at least one worker is required")]
    NoWorkers,
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("empty extension in extension list")]
    EmptyExtension,
    #[error("no spider status codes given")]
    NoSpiderCodes,
}

#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Number of workers to start
    pub workers: usize,
    /// Extensions appended to extension-less paths (without the dot)
    pub extensions: Vec<String>,
    /// Whether backup-file variants are tried
    pub mangle: bool,
    /// Status codes that allow spidering and mangling to continue
    pub spider_codes: BTreeSet<u16>,
    /// Pause after each fetch attempt
    pub sleep: Duration,
    /// Whether HTML responses are parsed for more links
    pub parse_html: bool,
    /// Starting URLs
    pub seeds: Vec<Url>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            workers: 8,
            extensions: Vec::new(),
            mangle: true,
            spider_codes: BTreeSet::from([200]),
            sleep: Duration::ZERO,
            parse_html: false,
            seeds: Vec::new(),
        }
    }
}

impl ScanSettings {
    /// Should we keep spidering from this code?
    pub fn keep_spidering(&self, code: u16) -> bool {
        self.spider_codes.contains(&code)
    }
}

impl TryFrom<&ScanArgs> for ScanSettings {
    type Error = SettingsError;

    fn try_from(args: &ScanArgs) -> Result<Self, Self::Error> {
        if args.workers == 0 {
            return Err(SettingsError::NoWorkers);
        }
        if args.timeout == 0 {
            return Err(SettingsError::ZeroTimeout);
        }
        if args.spider_codes.is_empty() {
            return Err(SettingsError::NoSpiderCodes);
        }

        // Accept both "php" and ".php"
        let mut extensions = Vec::with_capacity(args.extensions.len());
        for ext in &args.extensions {
            let ext = ext.trim().trim_start_matches('.');
            if ext.is_empty() {
                return Err(SettingsError::EmptyExtension);
            }
            extensions.push(ext.to_string());
        }

        let seeds = args
            .urls
            .iter()
            .map(|raw| parse_seed(raw))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            workers: args.workers,
            extensions,
            mangle: !args.no_mangle,
            spider_codes: args.spider_codes.iter().copied().collect(),
            sleep: Duration::from_millis(args.sleep_ms),
            parse_html: args.parse_html,
            seeds,
        })
    }
}

// Transport settings come from the same command line
impl From<&ScanArgs> for HttpConfig {
    fn from(args: &ScanArgs) -> Self {
        let mut config = HttpConfig {
            request_timeout: Duration::from_secs(args.timeout),
            accept_invalid_certs: args.insecure,
            ..HttpConfig::default()
        };
        if let Some(ua) = &args.user_agent {
            config.user_agent = ua.clone();
        }
        config
    }
}

fn parse_seed(raw: &str) -> Result<Url, SettingsError> {
    let invalid = |reason: String| SettingsError::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(format!("unsupported scheme '{}'", other))),
    }
}
