use hdf5::types::{FixedAscii, FixedUnicode, TypeDescriptor, VarLenAscii, VarLenUnicode};
use hdf5::{Dataset, File, H5Type};
use ndarray::{Array1, Array2, ArrayD};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use super::error::SimFileError;

/// The element type of a dataset, reduced to the kinds the tools know how to print
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Int(usize),
    UInt(usize),
    Float(usize),
    Bool,
    Text,
    Other(String),
}

impl Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(bits) => write!(f, "int{bits}"),
            Self::UInt(bits) => write!(f, "uint{bits}"),
            Self::Float(bits) => write!(f, "float{bits}"),
            Self::Bool => write!(f, "bool"),
            Self::Text => write!(f, "str"),
            Self::Other(desc) => write!(f, "{desc}"),
        }
    }
}

impl From<&TypeDescriptor> for ElementKind {
    fn from(value: &TypeDescriptor) -> Self {
        match value {
            TypeDescriptor::Integer(size) => Self::Int(*size as usize * 8),
            TypeDescriptor::Unsigned(size) => Self::UInt(*size as usize * 8),
            TypeDescriptor::Float(size) => Self::Float(*size as usize * 8),
            TypeDescriptor::Boolean => Self::Bool,
            TypeDescriptor::FixedAscii(_)
            | TypeDescriptor::FixedUnicode(_)
            | TypeDescriptor::VarLenAscii
            | TypeDescriptor::VarLenUnicode => Self::Text,
            other => Self::Other(format!("{other:?}")),
        }
    }
}

/// Type and shape of a stored dataset
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetInfo {
    pub kind: ElementKind,
    pub shape: Vec<usize>,
}

impl DatasetInfo {
    /// Shape written the way numpy prints it, e.g. (100, 3) or (5,)
    pub fn shape_string(&self) -> String {
        match self.shape.len() {
            0 => String::from("()"),
            1 => format!("({},)", self.shape[0]),
            _ => format!(
                "({})",
                self.shape
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<String>>()
                    .join(", ")
            ),
        }
    }
}

/// The values of a dataset, read in the widest type of their kind
#[derive(Debug, Clone)]
pub enum DatasetValues {
    Int(ArrayD<i64>),
    UInt(ArrayD<u64>),
    Float(ArrayD<f64>),
    Bool(ArrayD<bool>),
    Text(ArrayD<String>),
    Unsupported(String),
}

/// A root attribute of the simulation file
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Text(String),
    Other(String),
}

impl MetaValue {
    /// Interpret the value as a count, if it is numeric and non-negative
    pub fn as_count(&self) -> Option<u64> {
        match self {
            Self::Int(v) if *v >= 0 => Some(*v as u64),
            Self::UInt(v) => Some(*v),
            Self::Float(v) if *v >= 0.0 && v.fract() == 0.0 => Some(*v as u64),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl Display for MetaValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => write!(f, "{v}"),
            Self::Other(v) => write!(f, "{v}"),
        }
    }
}

/// A read-only wrapper around a chroma HDF5 output file.
///
/// Chroma stores every key as a group holding a dataset of the same name
/// (`/Flags/Flags`); older files store the dataset directly at the root. Both layouts are
/// resolved by key.
#[derive(Debug)]
pub struct SimulationFile {
    file_handle: File,
    path: PathBuf,
}

impl SimulationFile {
    /// Open a simulation file for reading
    pub fn open(path: &Path) -> Result<Self, SimFileError> {
        if !path.exists() {
            return Err(SimFileError::BadFilePath(path.to_path_buf()));
        }
        let file_handle = File::open(path)?;
        log::info!("Opened simulation file {}", path.to_string_lossy());
        Ok(Self {
            file_handle,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the file on disk in bytes
    pub fn size_bytes(&self) -> u64 {
        self.path.metadata().map(|m| m.len()).unwrap_or(0)
    }

    /// Top-level keys, sorted by name
    pub fn keys(&self) -> Result<Vec<String>, SimFileError> {
        let mut keys = self.file_handle.member_names()?;
        keys.sort();
        Ok(keys)
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.file_handle.link_exists(key)
    }

    /// Find the dataset behind a key, handling both the grouped and flat layouts
    fn dataset(&self, key: &str) -> Result<Dataset, SimFileError> {
        if !self.file_handle.link_exists(key) {
            return Err(SimFileError::MissingKey(key.to_string()));
        }
        if let Ok(group) = self.file_handle.group(key) {
            return match group.dataset(key) {
                Ok(dset) => Ok(dset),
                Err(_) => Err(SimFileError::MissingKey(format!("{key}/{key}"))),
            };
        }
        Ok(self.file_handle.dataset(key)?)
    }

    pub fn dataset_info(&self, key: &str) -> Result<DatasetInfo, SimFileError> {
        let dset = self.dataset(key)?;
        let descriptor = dset.dtype()?.to_descriptor()?;
        Ok(DatasetInfo {
            kind: ElementKind::from(&descriptor),
            shape: dset.shape(),
        })
    }

    pub fn read_1d<T: H5Type>(&self, key: &str) -> Result<Array1<T>, SimFileError> {
        let dset = self.dataset(key)?;
        let shape = dset.shape();
        if shape.len() != 1 {
            return Err(SimFileError::BadShape {
                key: key.to_string(),
                shape,
                expected: String::from("a 1D array"),
            });
        }
        Ok(dset.read_1d::<T>()?)
    }

    pub fn read_2d<T: H5Type>(&self, key: &str) -> Result<Array2<T>, SimFileError> {
        let dset = self.dataset(key)?;
        let shape = dset.shape();
        if shape.len() != 2 {
            return Err(SimFileError::BadShape {
                key: key.to_string(),
                shape,
                expected: String::from("a 2D array"),
            });
        }
        Ok(dset.read_2d::<T>()?)
    }

    /// Read an N x 3 dataset of positions
    pub fn read_points(&self, key: &str) -> Result<Vec<[f64; 3]>, SimFileError> {
        let array = self.read_2d::<f64>(key)?;
        if array.ncols() != 3 {
            return Err(SimFileError::BadShape {
                key: key.to_string(),
                shape: array.shape().to_vec(),
                expected: String::from("N x 3 positions"),
            });
        }
        Ok(array
            .rows()
            .into_iter()
            .map(|row| [row[0], row[1], row[2]])
            .collect())
    }

    /// Read a dataset of any supported element kind and dimensionality
    pub fn read_values(&self, key: &str) -> Result<DatasetValues, SimFileError> {
        let dset = self.dataset(key)?;
        let descriptor = dset.dtype()?.to_descriptor()?;
        let values = match ElementKind::from(&descriptor) {
            ElementKind::Int(_) => DatasetValues::Int(dset.read_dyn::<i64>()?),
            ElementKind::UInt(_) => DatasetValues::UInt(dset.read_dyn::<u64>()?),
            ElementKind::Float(_) => DatasetValues::Float(dset.read_dyn::<f64>()?),
            ElementKind::Bool => DatasetValues::Bool(dset.read_dyn::<bool>()?),
            ElementKind::Text => match dset.read_dyn::<VarLenUnicode>() {
                Ok(text) => DatasetValues::Text(text.mapv(|s| s.as_str().to_string())),
                Err(_) => DatasetValues::Text(
                    dset.read_dyn::<VarLenAscii>()?
                        .mapv(|s| s.as_str().to_string()),
                ),
            },
            ElementKind::Other(desc) => DatasetValues::Unsupported(desc),
        };
        Ok(values)
    }

    /// All root attributes (the run metadata), keyed by name
    pub fn metadata(&self) -> Result<BTreeMap<String, MetaValue>, SimFileError> {
        let mut meta = BTreeMap::new();
        for name in self.file_handle.attr_names()? {
            let attr = self.file_handle.attr(&name)?;
            meta.insert(name, read_attribute(&attr)?);
        }
        Ok(meta)
    }
}

fn read_attribute(attr: &hdf5::Attribute) -> Result<MetaValue, SimFileError> {
    if !attr.is_scalar() {
        return Ok(MetaValue::Other(format!("array of shape {:?}", attr.shape())));
    }
    let descriptor = attr.dtype()?.to_descriptor()?;
    // Byte strings and unicode strings are both decoded to text
    let value = match &descriptor {
        TypeDescriptor::VarLenUnicode => {
            MetaValue::Text(attr.read_scalar::<VarLenUnicode>()?.as_str().to_string())
        }
        TypeDescriptor::VarLenAscii => {
            MetaValue::Text(attr.read_scalar::<VarLenAscii>()?.as_str().to_string())
        }
        TypeDescriptor::FixedAscii(_) => {
            MetaValue::Text(attr.read_scalar::<FixedAscii<256>>()?.as_str().to_string())
        }
        TypeDescriptor::FixedUnicode(_) => {
            MetaValue::Text(attr.read_scalar::<FixedUnicode<256>>()?.as_str().to_string())
        }
        other => match ElementKind::from(other) {
            ElementKind::Int(_) => MetaValue::Int(attr.read_scalar::<i64>()?),
            ElementKind::UInt(_) => MetaValue::UInt(attr.read_scalar::<u64>()?),
            ElementKind::Float(_) => MetaValue::Float(attr.read_scalar::<f64>()?),
            ElementKind::Bool => MetaValue::Bool(attr.read_scalar::<bool>()?),
            kind => MetaValue::Other(kind.to_string()),
        },
    };
    Ok(value)
}
