//! Logger initialization.
//!
//! Everything in the crate logs through the `log` facade. Batch-level messages
//! (`emitted ... batch`) are `trace`, GPU setup is `info`, and misuse of the
//! begin/vertex/end protocol is `warn`. [`run_with_config`](crate::run_with_config)
//! calls [`init_logging`] for you; embedders that drive [`BatchRenderer`](crate::BatchRenderer)
//! themselves may install their own logger instead.

use std::sync::Once;

/// Filter used when neither the config nor `RUST_LOG` names one.
const DEFAULT_FILTER: &str = "warn,immgl=info";

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax, e.g.
/// `"immgl=trace"` to see every emitted batch.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// The filter actually applied: config, then `rust_log`, then the default.
    fn resolve_filter(&self, rust_log: Option<String>) -> String {
        self.env_filter
            .clone()
            .or(rust_log)
            .unwrap_or_else(|| DEFAULT_FILTER.to_string())
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` as the global logger; later calls are ignored.
///
/// If the host process already set a logger, that one stays in place.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.resolve_filter(std::env::var("RUST_LOG").ok());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);

        if builder.try_init().is_ok() {
            log::debug!("logging initialized with filter '{filter}'");
        }
    });
}
