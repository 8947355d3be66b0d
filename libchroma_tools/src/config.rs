use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::constants::{
    DEFAULT_CHANNEL_COUNT, DEFAULT_CUBE_HALF_LENGTH_MM, DEFAULT_CYLINDER_RADIUS_MM,
    DEFAULT_LIGHT_MAP_BINS, DEFAULT_LIGHT_MAP_EXTENT_MM, DEFAULT_SPHERE_RADIUS_MM,
};
use super::error::ConfigError;
use super::flags::SPECULAR_DETECT_FLAG;

/// Structure representing the tool configuration. Contains detector dimensions and paths
/// to the YAML cards used by the geometry-aware tools.
/// Configs are seralizable and deserializable to YAML using serde and serde_yaml
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub cylinder_radius: f64,
    pub cube_half_length: f64,
    pub light_map_extent: f64,
    pub light_map_bins: usize,
    pub sphere_radius: f64,
    pub reflected_flag: u32,
    pub channel_count: usize,
    pub hidden_components: Vec<String>,
    pub geometry_card: Option<PathBuf>,
    pub reflectivity_card: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl Default for Config {
    /// Generate a new Config object holding the nEXO/LoLX defaults
    fn default() -> Self {
        Self {
            cylinder_radius: DEFAULT_CYLINDER_RADIUS_MM,
            cube_half_length: DEFAULT_CUBE_HALF_LENGTH_MM,
            light_map_extent: DEFAULT_LIGHT_MAP_EXTENT_MM,
            light_map_bins: DEFAULT_LIGHT_MAP_BINS,
            sphere_radius: DEFAULT_SPHERE_RADIUS_MM,
            reflected_flag: SPECULAR_DETECT_FLAG,
            channel_count: DEFAULT_CHANNEL_COUNT,
            hidden_components: vec![String::from("Tube"), String::from("Cage")],
            geometry_card: None,
            reflectivity_card: None,
            output_dir: PathBuf::from("."),
        }
    }
}

impl Config {
    /// Read the configuration in a YAML file
    /// Returns a Config if successful
    pub fn read_config_file(config_path: &Path) -> Result<Self, ConfigError> {
        if !config_path.exists() {
            return Err(ConfigError::BadFilePath(config_path.to_path_buf()));
        }

        let yaml_str = std::fs::read_to_string(config_path)?;

        Ok(serde_yaml::from_str::<Self>(&yaml_str)?)
    }

    /// Write the configuration to a YAML file
    pub fn write_config_file(&self, config_path: &Path) -> Result<(), ConfigError> {
        let yaml_str = serde_yaml::to_string(self)?;
        std::fs::write(config_path, yaml_str)?;
        Ok(())
    }

    /// Get the path of an output image, placed in the output directory
    pub fn get_output_path(&self, file_name: &str) -> PathBuf {
        self.output_dir.join(file_name)
    }

    pub fn is_component_hidden(&self, component: &str) -> bool {
        self.hidden_components.iter().any(|c| c == component)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let yaml = "cylinder_radius: 500.0\ngeometry_card: /tmp/LoLX.yaml\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.cylinder_radius, 500.0);
        assert_eq!(config.geometry_card, Some(PathBuf::from("/tmp/LoLX.yaml")));
        assert_eq!(config.channel_count, DEFAULT_CHANNEL_COUNT);
        assert!(config.is_component_hidden("Cage"));
        assert!(!config.is_component_hidden("Sheet"));
    }

    #[test]
    fn test_config_file_round_trip() {
        let path = std::env::temp_dir().join("chroma_tools_config_test.yml");
        let mut config = Config::default();
        config.light_map_bins = 100;
        config.write_config_file(&path).unwrap();
        let loaded = Config::read_config_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_missing_config_file() {
        let path = std::env::temp_dir().join("chroma_tools_no_such_config.yml");
        assert!(matches!(
            Config::read_config_file(&path),
            Err(ConfigError::BadFilePath(_))
        ));
    }
}
