use std::path::{Path, PathBuf};

use color_quant::{
    parse_color_list, DitherKernel, DitherOptions, PaletteOptions, Rgb, DEFAULT_CACHE_CAPACITY,
};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "palettize.yaml";

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "PALETTIZE_CONFIG";

/// Application configuration loaded from palettize.yaml
///
/// Every key is optional; missing keys take their defaults.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Number of colors to extract
    pub table_length: usize,

    /// Colors that must appear first in every table, as hex strings
    pub force_colors: Vec<String>,

    /// Build the grid accelerator for nearest-color search
    pub optimize: bool,

    /// Dither instead of plain nearest-color mapping
    pub dither: bool,

    /// Diffusion kernel name (floyd-steinberg, atkinson, sierra-lite, jarvis-judice-ninke)
    pub kernel: String,

    /// Fraction of quantization error passed on while dithering
    pub attenuation: f32,

    /// Lookup cache entries per palette (0 disables)
    pub cache_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            table_length: 16,
            force_colors: Vec::new(),
            optimize: true,
            dither: false,
            kernel: DitherKernel::default().name().to_string(),
            attenuation: 1.0,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Where to look for the config: explicit path, then `$PALETTIZE_CONFIG`,
    /// then `./palettize.yaml` if it exists.
    pub fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.exists().then_some(local)
    }

    /// Load configuration, falling back to defaults when the file is
    /// missing or invalid.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            tracing::debug!("No config file, using defaults");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        table_length = config.table_length,
                        forced = config.force_colors.len(),
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    /// Parse and validate a YAML document.
    pub fn from_yaml(content: &str) -> Result<Self, AppError> {
        // An empty document deserializes as unit, not as a map.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| AppError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, AppError> {
        serde_yaml::to_string(self).map_err(|e| AppError::Config(e.to_string()))
    }

    /// Check the fields that serde cannot.
    pub fn validate(&self) -> Result<(), AppError> {
        self.forced_colors()?;
        self.dither_kernel()?;
        if !(0.0..=1.0).contains(&self.attenuation) {
            return Err(AppError::Config(format!(
                "attenuation must be between 0 and 1, got {}",
                self.attenuation
            )));
        }
        Ok(())
    }

    pub fn forced_colors(&self) -> Result<Vec<Rgb>, AppError> {
        let joined = self.force_colors.join(",");
        Ok(parse_color_list(&joined)?)
    }

    /// Forced colors as packed pixels, ready for the extractor.
    pub fn forced_packed(&self) -> Result<Vec<u32>, AppError> {
        Ok(self
            .forced_colors()?
            .into_iter()
            .map(Rgb::to_packed)
            .collect())
    }

    pub fn dither_kernel(&self) -> Result<DitherKernel, AppError> {
        self.kernel
            .parse()
            .map_err(|e: color_quant::dither::UnknownKernel| AppError::Config(e.to_string()))
    }

    pub fn palette_options(&self) -> Result<PaletteOptions, AppError> {
        let dither = DitherOptions::new()
            .kernel(self.dither_kernel()?)
            .attenuation(self.attenuation);
        Ok(PaletteOptions::new()
            .optimize(self.optimize)
            .cache_capacity(self.cache_capacity)
            .dither(dither))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.table_length, 16);
        assert!(config.force_colors.is_empty());
        assert!(config.optimize);
        assert!(!config.dither);
        assert_eq!(config.kernel, "floyd-steinberg");
        assert_eq!(config.attenuation, 1.0);
        assert_eq!(config.cache_capacity, 4096);
    }

    #[test]
    fn test_deserialize_config() {
        let yaml = r##"
table_length: 8
force_colors: ["#000000", "#fff"]
dither: true
kernel: atkinson
attenuation: 0.75
"##;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.table_length, 8);
        assert_eq!(
            config.forced_packed().unwrap(),
            vec![0x000000, 0xffffff]
        );
        assert!(config.dither);
        assert!(config.optimize, "unset keys keep defaults");
        assert_eq!(config.dither_kernel().unwrap(), DitherKernel::Atkinson);
        assert_eq!(config.palette_options().unwrap().dither.attenuation, 0.75);
    }

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(AppConfig::from_yaml("").unwrap(), AppConfig::default());
        assert_eq!(AppConfig::from_yaml("  \n").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_rejects_unknown_keys() {
        let err = AppConfig::from_yaml("colours: 8\n").unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(
            AppConfig::from_yaml("kernel: bayer\n"),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            AppConfig::from_yaml("force_colors: [\"#12\"]\n"),
            Err(AppError::Color(_))
        ));
        assert!(matches!(
            AppConfig::from_yaml("attenuation: 2.5\n"),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = AppConfig {
            table_length: 32,
            force_colors: vec!["#ff00ff".to_string()],
            kernel: "sierra-lite".to_string(),
            ..Default::default()
        };
        let yaml = config.to_yaml().unwrap();
        assert_eq!(AppConfig::from_yaml(&yaml).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = AppConfig::load(Some(Path::new("/nonexistent/palettize.yaml")));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_explicit_path_wins() {
        let path = Path::new("custom.yaml");
        assert_eq!(
            AppConfig::resolve_path(Some(path)),
            Some(PathBuf::from("custom.yaml"))
        );
    }
}
