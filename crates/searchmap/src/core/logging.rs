//! Logging setup for hosts of the map engine
//!
//! The library itself only emits `tracing` events. A host that wants them
//! printed builds a [`LogSettings`], lets the environment override it and
//! installs the subscriber with [`init_logging`].
//!
//! ```rust,no_run
//! use searchmap::core::logging::{init_logging, LogFormat, LogLevel, LogSettings};
//!
//! let settings = LogSettings::new(LogLevel::Warn, LogFormat::Compact)
//!     .with_env_overrides()
//!     .unwrap();
//! init_logging(&settings).unwrap();
//! ```
//!
//! What each level carries:
//!
//! - `trace`: geometry and placement internals (grid scans, displacements)
//! - `debug`: every graph mutation with its node ids
//! - `info`: document load/save, undo and redo
//! - `warn`: recovered conditions (id collisions, invalid snapshots, empty stacks)
//! - `error`: reverts that had to be abandoned
//!
//! Environment overrides, strongest first: `SEARCHMAP_LOG_LEVEL`, then
//! `RUST_LOG` for the filter, and `SEARCHMAP_LOG_FORMAT` for the format.
//! Filters accept per-target directives:
//!
//! ```bash
//! RUST_LOG="warn,searchmap::graph::placement=trace" searchmap add --map map.json --parent 1 idea
//! ```

use std::fmt;
use std::str::FromStr;

use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
    Registry,
};

pub const LEVEL_VAR: &str = "SEARCHMAP_LOG_LEVEL";
pub const FORMAT_VAR: &str = "SEARCHMAP_LOG_FORMAT";

/// Verbosity threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const ALL: [LogLevel; 6] = [
        LogLevel::Off,
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LogLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == wanted)
            .ok_or_else(|| format!("unknown log level '{}'", s))
    }
}

/// Output layout of log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One line per event, no targets
    #[default]
    Compact,
    /// Multi-line with source locations and span activity
    Pretty,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    pub const ALL: [LogFormat; 3] = [LogFormat::Compact, LogFormat::Pretty, LogFormat::Json];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        LogFormat::ALL
            .into_iter()
            .find(|format| format.as_str() == wanted)
            .ok_or_else(|| format!("unknown log format '{}'", s))
    }
}

/// Filter directive and format of the installed subscriber
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    /// `EnvFilter` directive: a bare level or a per-target list
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self::new(LogLevel::default(), LogFormat::default())
    }
}

impl LogSettings {
    pub fn new(level: LogLevel, format: LogFormat) -> Self {
        Self {
            filter: level.as_str().to_string(),
            format,
        }
    }

    /// Apply the logging environment variables on top of these settings
    pub fn with_env_overrides(self) -> Result<Self, String> {
        self.overridden_by(
            std::env::var(LEVEL_VAR).ok(),
            std::env::var("RUST_LOG").ok(),
            std::env::var(FORMAT_VAR).ok(),
        )
    }

    fn overridden_by(
        mut self,
        level: Option<String>,
        rust_log: Option<String>,
        format: Option<String>,
    ) -> Result<Self, String> {
        if let Some(filter) = level.or(rust_log).filter(|f| !f.trim().is_empty()) {
            self.filter = filter;
        }
        if let Some(format) = format {
            self.format = format.parse()?;
        }
        Ok(self)
    }
}

/// Install a global subscriber; fails on a bad filter or when one is already set
pub fn init_logging(settings: &LogSettings) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_new(&settings.filter)
        .map_err(|e| format!("invalid log filter '{}': {}", settings.filter, e))?;

    let base = tracing_subscriber::fmt::layer().with_level(true);
    let layer: Box<dyn Layer<Registry> + Send + Sync> = match settings.format {
        LogFormat::Compact => base.compact().with_target(false).boxed(),
        LogFormat::Pretty => base
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::ACTIVE)
            .boxed(),
        LogFormat::Json => base
            .json()
            .with_file(true)
            .with_line_number(true)
            .with_span_events(FmtSpan::ACTIVE)
            .boxed(),
    };

    Registry::default().with(layer.with_filter(filter)).try_init()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for level in LogLevel::ALL {
            assert_eq!(level.to_string().parse::<LogLevel>(), Ok(level));
        }
        for format in LogFormat::ALL {
            assert_eq!(format.to_string().parse::<LogFormat>(), Ok(format));
        }
        assert_eq!(" JSON ".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_level_variable_beats_rust_log() {
        let settings = LogSettings::new(LogLevel::Warn, LogFormat::Compact)
            .overridden_by(Some("debug".into()), Some("trace".into()), None)
            .unwrap();
        assert_eq!(settings.filter, "debug");

        let settings = LogSettings::default()
            .overridden_by(None, Some("warn,searchmap::undo=debug".into()), Some("json".into()))
            .unwrap();
        assert_eq!(settings.filter, "warn,searchmap::undo=debug");
        assert_eq!(settings.format, LogFormat::Json);
    }

    #[test]
    fn test_no_environment_keeps_settings() {
        let settings = LogSettings::new(LogLevel::Error, LogFormat::Pretty)
            .overridden_by(None, Some("  ".into()), None)
            .unwrap();
        assert_eq!(settings, LogSettings::new(LogLevel::Error, LogFormat::Pretty));
    }

    #[test]
    fn test_bad_format_variable_is_reported() {
        let err = LogSettings::default()
            .overridden_by(None, None, Some("xml".into()))
            .unwrap_err();
        assert!(err.contains("unknown log format"));
    }
}
