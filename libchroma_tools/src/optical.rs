//! Reading of chroma optical-property tables.
//!
//! A table maps material -> property -> data, where the data is either a single number
//! or an ordered mapping of `index: !!python/tuple [wavelength, value]` entries.
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::path::Path;

use super::constants::{INDEX_IMAGINARY_PROPERTY, INDEX_REAL_PROPERTY};
use super::error::OpticalTableError;
use super::fresnel::RefractiveIndex;

/// A single optical property of a material
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyData {
    /// The same value at every wavelength
    Constant(f64),
    /// (wavelength in nm, value) pairs in file order
    Table(Vec<(f64, f64)>),
}

impl PropertyData {
    /// Value at a wavelength. An exact wavelength match wins; otherwise the value is
    /// linearly interpolated between the neighbouring table entries.
    pub fn value_at(&self, name: &str, wavelength: f64) -> Result<f64, OpticalTableError> {
        let table = match self {
            Self::Constant(value) => return Ok(*value),
            Self::Table(table) => table,
        };
        if let Some((_, value)) = table.iter().find(|(wl, _)| *wl == wavelength) {
            return Ok(*value);
        }

        let mut sorted = table.clone();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        sorted
            .windows(2)
            .find(|pair| pair[0].0 <= wavelength && wavelength <= pair[1].0)
            .map(|pair| {
                let (wl0, v0) = pair[0];
                let (wl1, v1) = pair[1];
                v0 + (v1 - v0) * (wavelength - wl0) / (wl1 - wl0)
            })
            .ok_or_else(|| OpticalTableError::OutOfRange(name.to_string(), wavelength))
    }
}

/// All materials of an optical-property file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OpticalTable {
    materials: BTreeMap<String, BTreeMap<String, PropertyData>>,
}

impl OpticalTable {
    pub fn read_file(path: &Path) -> Result<Self, OpticalTableError> {
        if !path.exists() {
            return Err(OpticalTableError::BadFilePath(path.to_path_buf()));
        }
        let yaml_str = std::fs::read_to_string(path)?;
        Self::parse(&yaml_str)
    }

    pub fn parse(yaml_str: &str) -> Result<Self, OpticalTableError> {
        let root: Value = serde_yaml::from_str(yaml_str)?;
        let mut table = Self::default();
        let Some(materials) = untag(&root).as_mapping() else {
            return Ok(table);
        };
        for (material, properties) in materials {
            let Some(material) = material.as_str() else {
                continue;
            };
            let Some(properties) = untag(properties).as_mapping() else {
                continue;
            };
            table
                .materials
                .insert(material.to_string(), parse_properties(properties)?);
        }
        Ok(table)
    }

    pub fn materials(&self) -> impl Iterator<Item = &String> {
        self.materials.keys()
    }

    pub fn property(
        &self,
        material: &str,
        property: &str,
    ) -> Result<&PropertyData, OpticalTableError> {
        self.materials
            .get(material)
            .ok_or_else(|| OpticalTableError::MissingMaterial(material.to_string()))?
            .get(property)
            .ok_or_else(|| {
                OpticalTableError::MissingProperty(material.to_string(), property.to_string())
            })
    }

    /// Complex refractive index of a material at a wavelength. A material without an
    /// imaginary part is treated as non-absorbing.
    pub fn refractive_index(
        &self,
        material: &str,
        wavelength: f64,
    ) -> Result<RefractiveIndex, OpticalTableError> {
        let n = self
            .property(material, INDEX_REAL_PROPERTY)?
            .value_at(INDEX_REAL_PROPERTY, wavelength)?;
        let k = match self.property(material, INDEX_IMAGINARY_PROPERTY) {
            Ok(data) => data.value_at(INDEX_IMAGINARY_PROPERTY, wavelength)?,
            Err(OpticalTableError::MissingProperty(_, _)) => 0.0,
            Err(e) => return Err(e),
        };
        Ok(RefractiveIndex::new(n, k))
    }
}

fn parse_properties(
    properties: &Mapping,
) -> Result<BTreeMap<String, PropertyData>, OpticalTableError> {
    let mut parsed = BTreeMap::new();
    for (name, data) in properties {
        let Some(name) = name.as_str() else {
            continue;
        };
        let data = untag(data);
        if let Some(value) = data.as_f64() {
            parsed.insert(name.to_string(), PropertyData::Constant(value));
        } else if let Some(entries) = data.as_mapping() {
            let mut table = Vec::with_capacity(entries.len());
            for entry in entries.values() {
                table.push(parse_pair(name, entry)?);
            }
            parsed.insert(name.to_string(), PropertyData::Table(table));
        } else {
            log::debug!("Skipping non-numeric optical property {name}");
        }
    }
    Ok(parsed)
}

fn parse_pair(name: &str, entry: &Value) -> Result<(f64, f64), OpticalTableError> {
    let bad_entry = || OpticalTableError::BadEntry(name.to_string(), format!("{entry:?}"));
    let pair = untag(entry).as_sequence().ok_or_else(bad_entry)?;
    match pair.as_slice() {
        [wavelength, value] => Ok((
            wavelength.as_f64().ok_or_else(bad_entry)?,
            value.as_f64().ok_or_else(bad_entry)?,
        )),
        _ => Err(bad_entry()),
    }
}

/// Strip YAML tags such as !!python/tuple
fn untag(value: &Value) -> &Value {
    match value {
        Value::Tagged(tagged) => untag(&tagged.value),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"
# source: refractiveindex.info
Silicon:
  IndexOfRefractionRe:
    0: !!python/tuple [1.750000e+02, 6.500000e-01]
    1: !!python/tuple [2.000000e+02, 9.000000e-01]
    2: !!python/tuple [2.500000e+02, 1.600000e+00]
  IndexOfRefractionIm:
    0: !!python/tuple [1.750000e+02, 2.000000e+00]
    1: !!python/tuple [2.000000e+02, 2.800000e+00]
    2: !!python/tuple [2.500000e+02, 3.600000e+00]
LXe:
  IndexOfRefractionRe: 1.69
  AbsorptionLength: 1e6
  Comment: liquid xenon
"#;

    #[test]
    fn test_parse_table() {
        let table = OpticalTable::parse(TABLE).unwrap();
        assert_eq!(table.materials().count(), 2);
        match table.property("Silicon", "IndexOfRefractionRe").unwrap() {
            PropertyData::Table(entries) => {
                assert_eq!(entries.len(), 3);
                assert_eq!(entries[1], (200.0, 0.9));
            }
            other => panic!("Expected table, got {other:?}"),
        }
        assert_eq!(
            table.property("LXe", "AbsorptionLength").unwrap(),
            &PropertyData::Constant(1e6)
        );
        assert!(matches!(
            table.property("LXe", "Comment"),
            Err(OpticalTableError::MissingProperty(_, _))
        ));
        assert!(matches!(
            table.property("Gold", "IndexOfRefractionRe"),
            Err(OpticalTableError::MissingMaterial(_))
        ));
    }

    #[test]
    fn test_refractive_index_lookup() {
        let table = OpticalTable::parse(TABLE).unwrap();
        let exact = table.refractive_index("Silicon", 200.0).unwrap();
        assert_eq!(exact, RefractiveIndex::new(0.9, 2.8));
        let interpolated = table.refractive_index("Silicon", 225.0).unwrap();
        assert!((interpolated.n - 1.25).abs() < 1e-12);
        assert!((interpolated.k - 3.2).abs() < 1e-12);
        let constant = table.refractive_index("LXe", 450.0).unwrap();
        assert_eq!(constant, RefractiveIndex::new(1.69, 0.0));
        assert!(matches!(
            table.refractive_index("Silicon", 300.0),
            Err(OpticalTableError::OutOfRange(_, _))
        ));
    }

    #[test]
    fn test_malformed_entry() {
        let yaml = "Bad:\n  IndexOfRefractionRe:\n    0: [1.0, 2.0, 3.0]\n";
        assert!(matches!(
            OpticalTable::parse(yaml),
            Err(OpticalTableError::BadEntry(_, _))
        ));
    }
}
