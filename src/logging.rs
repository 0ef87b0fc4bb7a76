//! Global logger for the viewer.
//!
//! The library only talks to the `log` facade; the binary installs
//! `env_logger` here before the display is created.

use std::sync::OnceLock;

/// Directives used when neither the caller nor `RUST_LOG` names any.
/// wgpu and naga log every adapter probe and shader translation at info.
pub const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn,naga=warn";

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `env_logger` directives, e.g. "frame_viewer=debug". Wins over `RUST_LOG`.
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Millisecond timestamps, useful when correlating frame timing
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            timestamps: true,
        }
    }
}

impl LoggingConfig {
    /// Directives that will actually be applied
    pub fn filter(&self) -> String {
        let from_env = std::env::var("RUST_LOG").ok();
        resolve_filter(self.env_filter.as_deref(), from_env.as_deref()).to_string()
    }
}

/// First non-blank source wins: explicit, environment, [`DEFAULT_FILTER`]
fn resolve_filter<'a>(explicit: Option<&'a str>, from_env: Option<&'a str>) -> &'a str {
    [explicit, from_env]
        .into_iter()
        .flatten()
        .find(|f| !f.trim().is_empty())
        .unwrap_or(DEFAULT_FILTER)
}

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Install `env_logger` as the global logger.
///
/// Only the first call does anything. Returns whether this crate's logger is
/// the one in place (false if another logger was set first).
pub fn init_logging(config: LoggingConfig) -> bool {
    *INSTALLED.get_or_init(|| {
        let filter = config.filter();

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter).write_style(config.write_style);
        if config.timestamps {
            builder.format_timestamp_millis();
        } else {
            builder.format_timestamp(None);
        }

        let installed = builder.try_init().is_ok();
        if installed {
            log::debug!("logging initialized with '{filter}'");
        }
        installed
    })
}
