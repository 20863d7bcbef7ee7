//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and configuration.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_BASE_URL, DEFAULT_CONCURRENT_REQUESTS, DEFAULT_REQUEST_LIMIT, DEFAULT_USER_AGENT,
    DEFAULT_WINDOW_SECS, REQUEST_TIMEOUT,
};
use crate::error_handling::ConfigurationError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// Controls how log messages are formatted:
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Client configuration.
///
/// Can be constructed programmatically (starting from `Default`) or parsed
/// from the command line.
///
/// # Examples
///
/// ```no_run
/// use crpt_client::Config;
///
/// let config = Config {
///     request_limit: 10,
///     window_seconds: 60,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Parser)]
#[command(
    name = "crpt_client",
    about = "Registers documents with the CRPT API without exceeding a request rate."
)]
pub struct Config {
    /// JSON document to register (a sample document is used when omitted)
    #[arg(value_parser)]
    pub document: Option<PathBuf>,

    /// Detached signature sent with every document
    #[arg(long, default_value = "")]
    pub signature: String,

    /// Base URL of the registration API
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Maximum calls per window
    #[arg(long, default_value_t = DEFAULT_REQUEST_LIMIT)]
    pub request_limit: u32,

    /// Window length in seconds
    #[arg(long, default_value_t = DEFAULT_WINDOW_SECS)]
    pub window_seconds: u64,

    /// Number of concurrent submissions to issue
    #[arg(long, default_value_t = DEFAULT_CONCURRENT_REQUESTS)]
    pub requests: usize,

    /// Per-call timeout in seconds (permit wait plus transport)
    #[arg(long, default_value_t = REQUEST_TIMEOUT.as_secs())]
    pub timeout_seconds: u64,

    /// HTTP User-Agent header value
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            document: None,
            signature: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_limit: DEFAULT_REQUEST_LIMIT,
            window_seconds: DEFAULT_WINDOW_SECS,
            requests: DEFAULT_CONCURRENT_REQUESTS,
            timeout_seconds: REQUEST_TIMEOUT.as_secs(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl Config {
    /// Length of one throttle window.
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_seconds)
    }

    /// Overall bound on a single call.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Parses and checks the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidBaseUrl` if the URL does not parse or
    /// is not `http`/`https`.
    pub fn parsed_base_url(&self) -> Result<url::Url, ConfigurationError> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| {
            ConfigurationError::InvalidBaseUrl(format!("{}: {e}", self.base_url))
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            other => Err(ConfigurationError::InvalidBaseUrl(format!(
                "{}: unsupported scheme '{other}'",
                self.base_url
            ))),
        }
    }

    /// Checks every setting that would otherwise fail later at construction time.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigurationError` found.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.request_limit == 0 {
            return Err(ConfigurationError::ZeroCapacity);
        }
        if self.window_seconds == 0 {
            return Err(ConfigurationError::ZeroWindow);
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigurationError::ZeroTimeout);
        }
        let now = Instant::now();
        if now.checked_add(self.window()).is_none() {
            return Err(ConfigurationError::WindowOutOfRange(self.window()));
        }
        if now.checked_add(self.request_timeout()).is_none() {
            return Err(ConfigurationError::TimeoutOutOfRange(self.request_timeout()));
        }
        self.parsed_base_url()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(
            log::LevelFilter::from(LogLevel::Error),
            log::LevelFilter::Error
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Warn),
            log::LevelFilter::Warn
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Info),
            log::LevelFilter::Info
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Debug),
            log::LevelFilter::Debug
        );
        assert_eq!(
            log::LevelFilter::from(LogLevel::Trace),
            log::LevelFilter::Trace
        );
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.request_limit, 1);
        assert_eq!(config.window(), Duration::from_secs(1));
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(config.requests, 5);
        assert_eq!(config.base_url, "https://ismp.crpt.ru/api/v3");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let config = Config {
            request_limit: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::ZeroCapacity)
        ));
    }

    #[test]
    fn test_validate_rejects_zero_window() {
        let config = Config {
            window_seconds: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::ZeroWindow)
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = Config {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::ZeroTimeout)
        ));
    }

    #[test]
    fn test_validate_rejects_unrepresentable_durations() {
        let config = Config {
            window_seconds: u64::MAX,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::WindowOutOfRange(Duration::from_secs(
                u64::MAX
            )))
        );

        let config = Config {
            timeout_seconds: u64::MAX,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::TimeoutOutOfRange(Duration::from_secs(
                u64::MAX
            )))
        );
    }

    #[test]
    fn test_validate_rejects_bad_base_url() {
        let config = Config {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidBaseUrl(_))
        ));

        let config = Config {
            base_url: "ftp://example.com/api".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigurationError::InvalidBaseUrl(_))
        ));
    }

    #[test]
    fn test_parse_from_args() {
        let config = Config::parse_from([
            "crpt_client",
            "doc.json",
            "--request-limit",
            "3",
            "--window-seconds",
            "60",
            "--signature",
            "c2ln",
            "--log-format",
            "json",
        ]);
        assert_eq!(config.document, Some(PathBuf::from("doc.json")));
        assert_eq!(config.request_limit, 3);
        assert_eq!(config.window(), Duration::from_secs(60));
        assert_eq!(config.signature, "c2ln");
        assert!(matches!(config.log_format, LogFormat::Json));
    }
}
