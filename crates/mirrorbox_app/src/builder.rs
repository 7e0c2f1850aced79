use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Default location of the optional configuration file.
pub const CONFIG_FILE: &str = "mirrorbox.toml";

/// Initial window, asset and loop settings.
///
/// Every field has a default, so a `mirrorbox.toml` only needs the keys it
/// changes:
///
/// ```toml
/// title = "Mirror test"
/// vsync = false
/// frame_cap = 60
/// log_filter = "info,mirrorbox_renderer=debug"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub texture: PathBuf,
    /// Directive prepended to both shader sources.
    pub shader_version: String,
    pub log_filter: Option<String>,
    /// Frames per second; `None` runs as fast as presentation allows.
    pub frame_cap: Option<u32>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Mirrorbox".to_string(),
            width: 800,
            height: 600,
            vsync: true,
            vertex_shader: PathBuf::from("assets/shaders/scene.vert"),
            fragment_shader: PathBuf::from("assets/shaders/scene.frag"),
            texture: PathBuf::from("assets/textures/crate.png"),
            shader_version: mirrorbox_renderer::DEFAULT_VERSION_PREFIX.to_string(),
            log_filter: None,
            frame_cap: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Read { path: path.to_path_buf(), source }),
        };
        let config: Self =
            toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!("window size {}x{} has a zero side", self.width, self.height)));
        }
        if self.frame_cap == Some(0) {
            return Err(ConfigError::Invalid("frame_cap must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Entry point.  Uses the builder pattern on top of an [`AppConfig`].
pub struct App {
    config: AppConfig,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    pub fn new() -> Self {
        Self::from_config(AppConfig::default())
    }

    pub fn from_config(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.config.title = title.to_string();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.config.width = width;
        self.config.height = height;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.config.vsync = vsync;
        self
    }

    pub fn with_frame_cap(mut self, fps: Option<u32>) -> Self {
        self.config.frame_cap = fps;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Runs the main loop until the window is closed.
    pub fn run(self) -> anyhow::Result<()> {
        self.config.validate()?;
        crate::runner::run_internal(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_authored_scene() {
        let config = AppConfig::default();
        assert_eq!((config.width, config.height), (800, 600));
        assert_eq!(config.title, "Mirrorbox");
        assert!(config.vsync);
        assert_eq!(config.shader_version, "#version 450\n");
        assert_eq!(config.frame_cap, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let config: AppConfig = toml::from_str("vsync = false\nframe_cap = 30\n").unwrap();
        assert!(!config.vsync);
        assert_eq!(config.frame_cap, Some(30));
        assert_eq!(config.width, 800);
        assert_eq!(config.texture, PathBuf::from("assets/textures/crate.png"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<AppConfig>("fullscreen = true\n").is_err());
    }

    #[test]
    fn zero_sizes_and_caps_are_invalid() {
        let config = AppConfig { height: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        let config = AppConfig { frame_cap: Some(0), ..Default::default() };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = AppConfig::load(Path::new("does/not/exist/mirrorbox.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn builder_overrides_config() {
        let app = App::new().with_title("Test").with_size(640, 480).with_vsync(false).with_frame_cap(Some(60));
        let config = app.config();
        assert_eq!(config.title, "Test");
        assert_eq!((config.width, config.height), (640, 480));
        assert!(!config.vsync);
        assert_eq!(config.frame_cap, Some(60));
    }
}
