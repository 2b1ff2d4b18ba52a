//! Log subscriber setup.
//!
//! Only the `calfetch` binary installs a subscriber; the library crates just
//! emit events. Output always goes to stderr so stdout stays parseable.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Target prefix shared by every calfetch crate.
const TARGET_PREFIX: &str = "calfetch";

/// HTTP stack crates, kept quiet unless `RUST_LOG` asks otherwise.
const QUIET_DEPENDENCIES: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls"];

#[derive(Debug, Error)]
pub enum TracingError {
    #[error("a global tracing subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
}

/// How log lines are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// Multi-line, with source locations.
    Pretty,
    /// One line per event, no timestamp.
    #[default]
    Compact,
    /// JSON lines.
    Json,
}

/// Subscriber settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for calfetch targets when `RUST_LOG` is unset.
    pub level: Level,
    pub format: TracingOutputFormat,
    /// Explicit filter; wins over both `level` and `RUST_LOG`.
    pub directive: Option<String>,
    /// Colored output.
    pub ansi: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: TracingOutputFormat::Compact,
            directive: None,
            ansi: true,
        }
    }
}

impl TracingConfig {
    /// Settings for `--debug`.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            level: Level::DEBUG,
            ..Self::default()
        }
    }

    /// Settings derived from the CLI flags. `--json` switches the log
    /// stream to JSON lines as well, without colors.
    #[must_use]
    pub fn for_cli(debug: bool, json: bool) -> Self {
        let config = if debug { Self::cli_debug() } else { Self::default() };
        if json {
            config.with_format(TracingOutputFormat::Json)
        } else {
            config
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        if format == TracingOutputFormat::Json {
            self.ansi = false;
        }
        self
    }

    #[must_use]
    pub fn with_env_filter(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }

    /// Filter used when neither `directive` nor `RUST_LOG` is set.
    pub fn default_directive(&self) -> String {
        let mut directive = format!("warn,{}={}", TARGET_PREFIX, self.level);
        for dependency in QUIET_DEPENDENCIES {
            directive.push_str(&format!(",{}=warn", dependency));
        }
        directive
    }

    fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        if let Some(ref directive) = self.directive {
            return Ok(EnvFilter::try_new(directive)?);
        }
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => Ok(EnvFilter::try_new(self.default_directive())?),
        }
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Fails if a subscriber is already installed or the filter is invalid.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.env_filter()?;

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi);
    let layer = match config.format {
        TracingOutputFormat::Pretty => base
            .pretty()
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        TracingOutputFormat::Compact => base.compact().without_time().with_target(false).boxed(),
        TracingOutputFormat::Json => base.json().with_current_span(false).boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
