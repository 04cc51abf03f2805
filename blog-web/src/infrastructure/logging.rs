//! Tracing setup for the server binary.
//!
//! `RUST_LOG` selects what is logged and `LOG_FORMAT` (`full` or `compact`)
//! how each event is printed.

use anyhow::{bail, Context, Result};
use std::env;
use std::str::FromStr;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_DIRECTIVES: &str = "info,blog_web=debug,sqlx=warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Target, source file and line on every event.
    #[default]
    Full,
    Compact,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "full" => Ok(LogFormat::Full),
            "compact" => Ok(LogFormat::Compact),
            other => bail!("LOG_FORMAT must be `full` or `compact`, got {:?}", other),
        }
    }
}

/// A malformed `RUST_LOG` is an error rather than a silent fallback.
fn filter_from(directives: Option<&str>) -> Result<EnvFilter> {
    let directives = directives
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(DEFAULT_DIRECTIVES);

    EnvFilter::try_new(directives)
        .with_context(|| format!("RUST_LOG has an invalid value: {:?}", directives))
}

pub fn init_logging() -> Result<()> {
    let filter = filter_from(env::var("RUST_LOG").ok().as_deref())?;
    let format = match env::var("LOG_FORMAT") {
        Ok(value) => value.parse()?,
        Err(_) => LogFormat::default(),
    };

    let fmt_layer = match format {
        LogFormat::Full => fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Compact => fmt::layer().compact().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    tracing::info!(?format, "Logging initialized");
    Ok(())
}
