//! Configuration system
//!
//! Option records for windows, textures and the camera, loadable from TOML or
//! RON files so demos can be tuned without recompiling.

mod options;

pub use options::{
    CameraSettings, MagFilter, MinFilter, TextureOptions, TextureWrap, WindowOptions,
};
pub use serde::{Deserialize, Serialize};

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    ///
    /// # Errors
    /// Fails when the file cannot be read, does not parse, or has an
    /// extension other than `.toml` or `.ron`.
    fn load_from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        // Try different formats
        if path.ends_with(".toml") {
            toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else if path.ends_with(".ron") {
            ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
        } else {
            Err(ConfigError::UnsupportedFormat(path.to_string()))
        }
    }

    /// Load configuration from file, falling back to defaults on any error
    fn load_or_default(path: &str) -> Self {
        Self::load_from_file(path).unwrap_or_else(|e| {
            log::warn!("Using default configuration, could not load '{}': {}", path, e);
            Self::default()
        })
    }

    /// Save configuration to file
    ///
    /// # Errors
    /// Fails when serialization fails, the extension is unsupported, or the
    /// file cannot be written.
    fn save_to_file(&self, path: &str) -> Result<(), ConfigError> {
        let contents = if path.ends_with(".toml") {
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else if path.ends_with(".ron") {
            ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?
        } else {
            return Err(ConfigError::UnsupportedFormat(path.to_string()));
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

impl Config for WindowOptions {}
impl Config for TextureOptions {}
impl Config for CameraSettings {}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> String {
        std::env::temp_dir()
            .join(format!("glkit_{}_{}", std::process::id(), name))
            .to_string_lossy()
            .into_owned()
    }

    #[test]
    fn test_toml_round_trip() {
        let path = temp_path("window.toml");
        let options = WindowOptions {
            vsync: false,
            show_fps: true,
            target_fps: 144,
            ..WindowOptions::default()
        };

        options.save_to_file(&path).unwrap();
        let loaded = WindowOptions::load_from_file(&path).unwrap();
        assert_eq!(loaded, options);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_ron_round_trip() {
        let path = temp_path("texture.ron");
        let options = TextureOptions {
            wrap_s: TextureWrap::ClampToEdge,
            min_filter: MinFilter::Nearest,
            srgb: true,
            ..TextureOptions::default()
        };

        options.save_to_file(&path).unwrap();
        let loaded = TextureOptions::load_from_file(&path).unwrap();
        assert_eq!(loaded, options);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_unsupported_extension() {
        let err = CameraSettings::default().save_to_file("camera.json").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let path = temp_path("partial.toml");
        std::fs::write(&path, "fov_degrees = 60.0\n").unwrap();

        let loaded = CameraSettings::load_from_file(&path).unwrap();
        assert_eq!(loaded.fov_degrees, 60.0);
        assert_eq!(loaded.sensitivity, CameraSettings::default().sensitivity);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let loaded = WindowOptions::load_or_default("no/such/window.toml");
        assert_eq!(loaded, WindowOptions::default());
    }
}
