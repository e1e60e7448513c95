use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Rgb;

/// Tunable constants for the gradient engine.
///
/// All of these are visual tuning knobs; the defaults are the hand-tuned
/// values the engine ships with. `bottom_hue_pull` and
/// `bottom_saturation_scale` have no derivation, they just look right.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackdropSettings {
    // Base gradient colors (hex, `#rrggbb` or `#rgb`)
    pub top_color: String,
    pub end_color: String,

    // Step table: discrete color keyframes spread across the scroll range
    pub steps: u32,
    pub hue_spread: f64,
    pub saturation: f64,
    pub lightness_min: f64,
    pub lightness_max: f64,

    // Bottom blend: pull back toward a darkened top color near page end
    pub bottom_blend_start: f64,
    pub top_darken_at_bottom: f64,
    pub bottom_hue_pull: f64,
    pub bottom_saturation_scale: f64,

    // Animation
    pub tween_speed: f64,
    pub end_crossfade_max: f64,
    pub target_fps: u32,
}

impl Default for BackdropSettings {
    fn default() -> Self {
        Self {
            top_color: "#071025".to_string(),
            end_color: "#02121b".to_string(),
            steps: 30,
            hue_spread: 360.0,
            saturation: 36.0,
            lightness_min: 6.0,
            lightness_max: 12.0,
            bottom_blend_start: 0.92,
            top_darken_at_bottom: 8.0,
            bottom_hue_pull: 0.85,
            bottom_saturation_scale: 0.92,
            tween_speed: 0.22,
            end_crossfade_max: 0.30,
            target_fps: 60,
        }
    }
}

/// Persisted configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub settings: BackdropSettings,
    pub created_at: String,
    pub modified_at: String,
}

/// Loads and persists [`BackdropSettings`] as JSON.
/// Defaults to `config.json` in the current working directory.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: BackdropSettings,
}

impl ConfigManager {
    pub fn new(config_path: Option<PathBuf>) -> Self {
        let config_path = config_path.unwrap_or_else(|| PathBuf::from("config.json"));

        Self {
            config_path,
            settings: BackdropSettings::default(),
        }
    }

    /// Load settings from the configuration file.
    /// Creates the file with defaults if it doesn't exist.
    pub fn load(&mut self) -> Result<BackdropSettings, ConfigError> {
        if !self.config_path.exists() {
            self.save()?;
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config_file: ConfigFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config_file.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "config file version {} doesn't match crate version {}, new settings fall back to defaults",
                config_file.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        Self::validate_settings(&config_file.settings)?;

        self.settings = config_file.settings;
        Ok(self.settings.clone())
    }

    /// Save current settings to the configuration file.
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.config_path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
            }
        }

        let config_file = ConfigFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: self.settings.clone(),
            created_at: chrono::Utc::now().to_rfc3339(),
            modified_at: chrono::Utc::now().to_rfc3339(),
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Update settings and save to file
    pub fn update_settings(&mut self, settings: BackdropSettings) -> Result<(), ConfigError> {
        Self::validate_settings(&settings)?;
        self.settings = settings;
        self.save()
    }

    pub fn settings(&self) -> &BackdropSettings {
        &self.settings
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Validate settings, collecting every violation rather than stopping at
    /// the first.
    pub fn validate_settings(settings: &BackdropSettings) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if Rgb::from_hex(&settings.top_color).is_none() {
            errors.push(format!("top_color is not a valid hex color: {:?}", settings.top_color));
        }
        if Rgb::from_hex(&settings.end_color).is_none() {
            errors.push(format!("end_color is not a valid hex color: {:?}", settings.end_color));
        }
        if settings.steps < 2 {
            errors.push(format!("steps must be at least 2 (got {})", settings.steps));
        }
        if settings.hue_spread < 0.0 {
            errors.push(format!(
                "hue_spread must be non-negative (got {})",
                settings.hue_spread
            ));
        }
        if !(settings.tween_speed > 0.0 && settings.tween_speed <= 1.0) {
            errors.push(format!(
                "tween_speed must be in (0, 1] (got {})",
                settings.tween_speed
            ));
        }
        if !(0.0..1.0).contains(&settings.bottom_blend_start) {
            errors.push(format!(
                "bottom_blend_start must be in [0, 1) (got {})",
                settings.bottom_blend_start
            ));
        }
        if !(0.0..=1.0).contains(&settings.end_crossfade_max) {
            errors.push(format!(
                "end_crossfade_max must be in [0, 1] (got {})",
                settings.end_crossfade_max
            ));
        }
        if !(0.0..=100.0).contains(&settings.saturation) {
            errors.push(format!(
                "saturation must be a percentage (got {})",
                settings.saturation
            ));
        }
        if settings.lightness_min > settings.lightness_max {
            errors.push(format!(
                "lightness_min {} exceeds lightness_max {}",
                settings.lightness_min, settings.lightness_max
            ));
        }
        if !(0.0..=1.0).contains(&settings.bottom_hue_pull) {
            errors.push(format!(
                "bottom_hue_pull must be in [0, 1] (got {})",
                settings.bottom_hue_pull
            ));
        }
        if !(0.0..=1.0).contains(&settings.bottom_saturation_scale) {
            errors.push(format!(
                "bottom_saturation_scale must be in [0, 1] (got {})",
                settings.bottom_saturation_scale
            ));
        }
        if settings.target_fps == 0 {
            errors.push("target_fps must be non-zero".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::ValidationError(errors))
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(String),
    WriteError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(Vec<String>),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadError(e) => write!(f, "Failed to read config: {}", e),
            ConfigError::WriteError(e) => write!(f, "Failed to write config: {}", e),
            ConfigError::ParseError(e) => write!(f, "Failed to parse config: {}", e),
            ConfigError::SerializeError(e) => write!(f, "Failed to serialize config: {}", e),
            ConfigError::ValidationError(errors) => {
                write!(f, "Config validation errors: {}", errors.join(", "))
            }
        }
    }
}

impl std::error::Error for ConfigError {}
