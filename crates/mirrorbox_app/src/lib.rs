//! Window, event loop and configuration for the mirror scene.
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use mirrorbox_app::{App, AppConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     App::from_config(AppConfig::default())
//!         .with_title("Mirrorbox")
//!         .with_size(800, 600)
//!         .run()
//! }
//! ```

pub mod builder;
pub mod governor;
mod graphics;
pub mod input;
pub mod logging;
mod runner;

pub use builder::{App, AppConfig, ConfigError, CONFIG_FILE};
pub use governor::FrameGovernor;
pub use input::InputBridge;
pub use logging::{init_logging, LoggingConfig};
