//! Logging configuration.
//!
//! The level comes from `SNC_LOG` (default `info`) and is then moved by the
//! CLI: each `-v` raises it one step, `-q` caps it at `error`. The stderr
//! format comes from `--log-format`, then `SNC_LOG_FORMAT`, then `human`.
//! `RUST_LOG` directives, when set, replace the level filter entirely (see
//! [`init_logging`](super::init_logging)).

use clap::ValueEnum;
use tracing_subscriber::filter::LevelFilter;

/// Log output format on stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable console format.
    #[default]
    Human,
    /// One JSON object per line.
    #[value(alias = "json")]
    Jsonl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    pub level: LevelFilter,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            format: LogFormat::Human,
            level: LevelFilter::INFO,
        }
    }
}

impl LogConfig {
    /// Build the configuration for one CLI invocation.
    pub fn from_env(verbose: u8, quiet: bool, format: Option<LogFormat>) -> Self {
        Self::resolve(
            std::env::var("SNC_LOG").ok().as_deref(),
            std::env::var("SNC_LOG_FORMAT").ok().as_deref(),
            verbose,
            quiet,
            format,
        )
    }

    fn resolve(
        env_level: Option<&str>,
        env_format: Option<&str>,
        verbose: u8,
        quiet: bool,
        cli_format: Option<LogFormat>,
    ) -> Self {
        let base = env_level
            .and_then(|v| v.trim().parse::<LevelFilter>().ok())
            .unwrap_or(LevelFilter::INFO);

        let level = if quiet {
            base.min(LevelFilter::ERROR)
        } else {
            match verbose {
                0 => base,
                1 => base.max(LevelFilter::DEBUG),
                _ => LevelFilter::TRACE,
            }
        };

        let format = cli_format
            .or_else(|| env_format.and_then(|v| LogFormat::from_str(v.trim(), true).ok()))
            .unwrap_or_default();

        LogConfig { format, level }
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }
}
