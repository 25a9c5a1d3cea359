//! Tracing subscriber setup.

use crate::config::LogSettings;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use weft_core::{Result, WeftError};

const WEFT_TARGETS: &[&str] = &["weft_core", "weft_infrastructure"];

/// Installs the global subscriber.
///
/// `RUST_LOG` takes precedence over `settings.level`. Returns `false` when a
/// global subscriber was already installed, which leaves that one in place.
pub fn init_tracing(settings: &LogSettings) -> Result<bool> {
    let level = LevelFilter::from_str(settings.level.trim())
        .map_err(|e| WeftError::config(format!("Invalid log level '{}': {}", settings.level, e)))?;

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directives = WEFT_TARGETS
                .iter()
                .map(|target| format!("{target}={level}"))
                .chain(std::iter::once("warn".to_string()))
                .collect::<Vec<_>>()
                .join(",");
            EnvFilter::try_new(directives)
                .map_err(|e| WeftError::config(format!("Invalid log filter: {}", e)))?
        }
    };

    let installed = if settings.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .try_init()
    };

    Ok(installed.is_ok())
}
