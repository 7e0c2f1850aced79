use std::path::Path;
use std::process::ExitCode;

use mirrorbox_app::{init_logging, App, AppConfig, LoggingConfig, CONFIG_FILE};

fn main() -> ExitCode {
    let config = match AppConfig::load(Path::new(CONFIG_FILE)) {
        Ok(config) => config,
        Err(e) => {
            // the logger is configured from this file, so it is not up yet
            eprintln!("mirrorbox: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    init_logging(LoggingConfig { filter: config.log_filter.clone() });
    log::info!("starting {} ({}x{})", config.title, config.width, config.height);

    match App::from_config(config).run() {
        Ok(()) => ExitCode::SUCCESS,
        // already logged where it was raised
        Err(_) => ExitCode::FAILURE,
    }
}
