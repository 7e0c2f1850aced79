//! Logger initialisation over the `log` facade.
//!
//! `fern` formats and writes to stderr; `env_filter` decides what gets
//! through, with the same directive grammar as `env_logger`.

use std::sync::Once;

use env_filter::{Filter, FilteredLog};
use log::LevelFilter;

/// Environment variable read when no filter is configured.
pub const LOG_ENV: &str = "MIRRORBOX_LOG";

/// Logger configuration.
///
/// `filter` follows the `env_logger` syntax: comma-separated
/// `[target][=level]` directives with an optional `/regex` message filter,
/// e.g. `"info,mirrorbox_renderer=debug"`.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    pub filter: Option<String>,
}

/// Builds the record filter for `spec`.
///
/// Starts from `info`, with `wgpu` and `naga` capped at `warn`; directives
/// in `spec` override either default.
pub fn build_filter(spec: &str) -> Filter {
    let mut builder = env_filter::Builder::new();
    builder
        .filter_level(LevelFilter::Info)
        .filter_module("wgpu", LevelFilter::Warn)
        .filter_module("naga", LevelFilter::Warn)
        .parse(spec);
    builder.build()
}

static INIT: Once = Once::new();

/// Initialises the global logger once; later calls are ignored.
///
/// Filter precedence: `config.filter`, then `MIRRORBOX_LOG`, then the
/// defaults of [`build_filter`].
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let spec = config.filter.or_else(|| std::env::var(LOG_ENV).ok()).unwrap_or_default();
        let filter = build_filter(&spec);
        let max_level = filter.filter();

        let (_, sink) = fern::Dispatch::new()
            .format(|out, message, record| {
                out.finish(format_args!("[{:<5} {}] {}", record.level(), record.target(), message))
            })
            .level(max_level)
            .chain(std::io::stderr())
            .into_log();

        if let Err(e) = log::set_boxed_logger(Box::new(FilteredLog::new(sink, filter))) {
            eprintln!("logger already set: {e}");
            return;
        }
        log::set_max_level(max_level);
        log::debug!("logging initialized");
    });
}
