use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::constants::CHROMA_PATH_PLACEHOLDER;
use super::error::GeometryError;

/// Which side of a component surface a material sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaterialSide {
    Surface,
    Outside,
}

impl MaterialSide {
    fn name(&self) -> &'static str {
        match self {
            Self::Surface => "Surface",
            Self::Outside => "Outside",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct DetectorCard {
    pub path_to_detector: String,
    pub optical_properties: Option<String>,
}

/// A detector component. Only the material lists are used here; every other field of the
/// card is ignored.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
pub struct ComponentCard {
    pub surface: Vec<Value>,
    pub outside: Vec<Value>,
}

/// A chroma geometry/material card
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GeometryCard {
    #[serde(default)]
    pub chroma_path: Option<String>,
    pub detector: DetectorCard,
    #[serde(default)]
    pub components: BTreeMap<String, Option<ComponentCard>>,
}

impl GeometryCard {
    pub fn read_file(path: &Path) -> Result<Self, GeometryError> {
        if !path.exists() {
            return Err(GeometryError::BadFilePath(path.to_path_buf()));
        }
        let yaml_str = std::fs::read_to_string(path)?;
        Self::parse(&yaml_str)
    }

    pub fn parse(yaml_str: &str) -> Result<Self, GeometryError> {
        Ok(serde_yaml::from_str::<Self>(yaml_str)?)
    }

    /// Substitute the [ChromaPath] placeholder, if the card defines ChromaPath
    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        match &self.chroma_path {
            Some(chroma_path) => PathBuf::from(raw.replace(CHROMA_PATH_PLACEHOLDER, chroma_path)),
            None => PathBuf::from(raw),
        }
    }

    /// Directory holding the component meshes
    pub fn detector_directory(&self) -> PathBuf {
        self.resolve_path(&self.detector.path_to_detector)
    }

    pub fn optical_properties_path(&self) -> Result<PathBuf, GeometryError> {
        self.detector
            .optical_properties
            .as_deref()
            .map(|p| self.resolve_path(p))
            .ok_or(GeometryError::MissingOpticalProperties)
    }

    pub fn has_component(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// The first material listed on one side of a component
    pub fn material(&self, component: &str, side: MaterialSide) -> Result<String, GeometryError> {
        let card = self
            .components
            .get(component)
            .ok_or_else(|| GeometryError::MissingComponent(component.to_string()))?;
        let materials = match (card, side) {
            (Some(card), MaterialSide::Surface) => &card.surface,
            (Some(card), MaterialSide::Outside) => &card.outside,
            (None, _) => {
                return Err(GeometryError::MissingMaterial(
                    component.to_string(),
                    side.name().to_string(),
                ))
            }
        };
        materials
            .first()
            .and_then(|m| m.as_str())
            .map(String::from)
            .ok_or_else(|| {
                GeometryError::MissingMaterial(component.to_string(), side.name().to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = r#"
ChromaPath: /home/user/chroma-simulation/
Detector:
  PathToDetector: "[ChromaPath]Geometry/ReflectivityStudy/"
  OpticalProperties: "[ChromaPath]Yaml/OpticalProperties.yaml"
  Name: ReflectivityStudy
Components:
  Sheet:
    Surface: [Silicon, 0]
    Outside: [LXe]
    Color: 0xA09E00
  Sphere:
  Tiles:
    Surface: []
"#;

    #[test]
    fn test_parse_card() {
        let card = GeometryCard::parse(CARD).unwrap();
        assert_eq!(
            card.detector_directory(),
            PathBuf::from("/home/user/chroma-simulation/Geometry/ReflectivityStudy/")
        );
        assert_eq!(
            card.optical_properties_path().unwrap(),
            PathBuf::from("/home/user/chroma-simulation/Yaml/OpticalProperties.yaml")
        );
        assert!(card.has_component("Sphere"));
        assert_eq!(card.material("Sheet", MaterialSide::Surface).unwrap(), "Silicon");
        assert_eq!(card.material("Sheet", MaterialSide::Outside).unwrap(), "LXe");
    }

    #[test]
    fn test_missing_materials() {
        let card = GeometryCard::parse(CARD).unwrap();
        assert!(matches!(
            card.material("Cage", MaterialSide::Surface),
            Err(GeometryError::MissingComponent(_))
        ));
        assert!(matches!(
            card.material("Sphere", MaterialSide::Surface),
            Err(GeometryError::MissingMaterial(_, _))
        ));
        assert!(matches!(
            card.material("Tiles", MaterialSide::Surface),
            Err(GeometryError::MissingMaterial(_, _))
        ));
    }

    #[test]
    fn test_card_without_chroma_path() {
        let card = GeometryCard::parse("Detector:\n  PathToDetector: /data/meshes\n").unwrap();
        assert_eq!(card.detector_directory(), PathBuf::from("/data/meshes"));
        assert!(matches!(
            card.optical_properties_path(),
            Err(GeometryError::MissingOpticalProperties)
        ));
    }
}
