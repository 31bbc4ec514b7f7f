use crate::error::ConfigError;
use crate::render::ColorMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// User configuration loaded from config file.
/// All fields are optional: CLI flags override config, config overrides defaults.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Default theme name
    pub theme: Option<String>,
    /// Use the light palette
    pub light: Option<bool>,
    /// Global opacity (0-100, 50 = neutral)
    pub opacity: Option<f64>,
    /// Default color mode
    pub color: Option<ColorModeConfig>,
    /// Target FPS (1-120)
    pub fps: Option<u32>,
    /// Entity density scale factor (0.5-2.0)
    pub scale: Option<f64>,
    /// Hide status bar
    pub clean: Option<bool>,
    /// Auto-cycle interval in seconds (0 = disabled)
    pub cycle: Option<u32>,
    /// Color quantization step (0 = off, 4/8/16 = coarser colors for less output)
    pub color_quant: Option<u8>,
    /// Fixed RNG seed for reproducible scenes
    pub seed: Option<u64>,
    /// Write logs to this file
    pub log_file: Option<PathBuf>,
    /// Log level: error, warn, info, debug, trace
    pub log_level: Option<String>,
}

/// Color mode names for config file (kebab-case friendly)
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ColorModeConfig {
    Mono,
    Ansi16,
    Ansi256,
    TrueColor,
}

impl From<ColorModeConfig> for ColorMode {
    fn from(c: ColorModeConfig) -> Self {
        match c {
            ColorModeConfig::Mono => ColorMode::Mono,
            ColorModeConfig::Ansi16 => ColorMode::Ansi16,
            ColorModeConfig::Ansi256 => ColorMode::Ansi256,
            ColorModeConfig::TrueColor => ColorMode::TrueColor,
        }
    }
}

/// Get the config file path: ~/.config/backdrop/config.toml
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("backdrop").join("config.toml"))
}

/// Parse the config at `path`. A missing file is an empty config.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => return Err(ConfigError::Io { path: path.to_path_buf(), source }),
    };
    toml::from_str(&contents).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

/// Load config from the default location. No config directory means an empty config.
pub fn load_config() -> Result<Config, ConfigError> {
    match config_path() {
        Some(path) => read_config(&path),
        None => Ok(Config::default()),
    }
}

/// Write the commented template to the default location, refusing to overwrite.
pub fn init_config() -> Result<PathBuf, ConfigError> {
    let path = config_path().ok_or(ConfigError::NoConfigDir)?;
    let io_err = |source| ConfigError::Io { path: path.clone(), source };
    if path.exists() {
        return Err(io_err(std::io::Error::new(std::io::ErrorKind::AlreadyExists, "config already exists")));
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(io_err)?;
    }
    std::fs::write(&path, default_config_string()).map_err(io_err)?;
    Ok(path)
}

/// Generate a default config file with all options commented out
pub fn default_config_string() -> String {
    r#"# backdrop configuration
# Use --show-config to see the active config file path.
# CLI flags override these settings.

# Default theme (use --list to see all)
# theme = "snowfall"

# Use the light palette instead of the dark one
# light = false

# Global opacity, 0-100 (50 = as designed, higher brightens, lower dims)
# opacity = 50

# Color mode: mono, ansi16, ansi256, true-color
# color = "true-color"

# Target FPS (1-120)
# fps = 30

# Entity density scale factor (0.5-2.0)
# scale = 1.0

# Hide status bar
# clean = false

# Auto-cycle interval in seconds (0 = disabled)
# cycle = 0

# Color quantization step (0 = off, 4/8/16 = coarser colors, less output)
# Useful for slow terminals or tmux
# color_quant = 0

# Fixed random seed for reproducible scenes
# seed = 42

# Log to a file (the terminal is busy drawing)
# log_file = "/tmp/backdrop.log"
# log_level = "info"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_parses_to_defaults() {
        let config: Config = toml::from_str(&default_config_string()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_fields_parse() {
        let config: Config = toml::from_str(
            r#"
            theme = "koi"
            light = true
            opacity = 80
            color = "ansi256"
            seed = 7
            "#,
        )
        .unwrap();
        assert_eq!(config.theme.as_deref(), Some("koi"));
        assert_eq!(config.light, Some(true));
        assert_eq!(config.opacity, Some(80.0));
        assert_eq!(config.color, Some(ColorModeConfig::Ansi256));
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let path = std::env::temp_dir().join("backdrop-test-missing").join("config.toml");
        assert_eq!(read_config(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let path = std::env::temp_dir().join(format!("backdrop-test-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "opacity = \"loud\"").unwrap();
        let err = read_config(&path).unwrap_err();
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
