//! Conversion of wavelength-dependent optical property CSVs into chroma's YAML dialect.
//!
//! Two header styles are understood:
//!
//! ```text
//! wl,property,,"source"
//! wl,n,k,"source"
//! ```
//!
//! The first column is the wavelength in nm, the second the property value (or the real
//! part of the refractive index), the optional third the imaginary part of the refractive
//! index. A trailing source column is optional. The material name is the file stem.
use csv::{ReaderBuilder, Trim};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::constants::{INDEX_IMAGINARY_PROPERTY, INDEX_REAL_PROPERTY};
use super::error::CsvConvertError;

/// Which of the two converters' rules a YAML file is written with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum YamlDialect {
    /// Any property named by the second header, numbers like 4.500000e+02, a
    /// `# source:` comment when the CSV carries one. The imaginary index is only written
    /// when the third column is complete.
    #[default]
    Properties,
    /// Refractive index only: the second column is always the real index, numbers are
    /// written in their shortest form (450.0), no source comment, and any third column
    /// becomes the imaginary index even where values are missing.
    IndexTuple,
}

impl YamlDialect {
    pub fn format(&self, value: f64) -> String {
        match self {
            Self::Properties => format_scientific(value),
            Self::IndexTuple if value.is_nan() => String::from(".nan"),
            Self::IndexTuple => format!("{value:?}"),
        }
    }
}

/// Scientific notation with a signed, two-digit exponent
fn format_scientific(value: f64) -> String {
    if value.is_nan() {
        return String::from("nan");
    } else if value.is_infinite() {
        return String::from(if value > 0.0 { "inf" } else { "-inf" });
    }
    let formatted = format!("{value:.6e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or(0);
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => formatted,
    }
}

/// Keep only ASCII alphanumerics so a free-form column header becomes a valid YAML key
pub fn sanitize_key(key: &str) -> String {
    key.chars().filter(|c| c.is_ascii_alphanumeric()).collect()
}

/// The contents of one optical property CSV
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyCsv {
    pub material: String,
    /// YAML key derived from the second header
    pub property: String,
    pub source: Option<String>,
    pub wavelengths: Vec<f64>,
    pub values: Vec<f64>,
    /// Third column, when the header has one. Empty cells read as NaN.
    pub third: Option<Vec<f64>>,
}

impl PropertyCsv {
    pub fn read(path: &Path) -> Result<Self, CsvConvertError> {
        let material = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .ok_or_else(|| CsvConvertError::BadFileName(path.to_path_buf()))?;

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)?;
        let header: Vec<String> = reader.headers()?.iter().map(String::from).collect();
        if header.len() < 2 {
            return Err(CsvConvertError::TooFewColumns(path.to_path_buf()));
        }

        let source = if header.len() > 3 {
            header.last().cloned()
        } else {
            None
        };

        let mut wavelengths = Vec::new();
        let mut values = Vec::new();
        let mut third = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let parse = |column: usize| parse_field(path, record.get(column), row);
            wavelengths.push(parse(0)?);
            values.push(parse(1)?);
            if header.len() > 2 {
                third.push(parse(2)?);
            }
        }

        Ok(Self {
            material,
            property: property_name(&header[1]),
            source,
            wavelengths,
            values,
            third: (header.len() > 2).then_some(third),
        })
    }

    /// Imaginary index written under a dialect. A header with a source column but an
    /// empty third column has no imaginary part in the properties dialect.
    pub fn imaginary(&self, dialect: YamlDialect) -> Option<&[f64]> {
        let third = self.third.as_deref()?;
        match dialect {
            YamlDialect::IndexTuple => Some(third),
            YamlDialect::Properties if third.iter().all(|v| !v.is_nan()) => Some(third),
            YamlDialect::Properties => None,
        }
    }

    /// Write this material as a YAML block
    pub fn write_yaml<W: Write>(&self, out: &mut W, dialect: YamlDialect) -> std::io::Result<()> {
        let property = match dialect {
            YamlDialect::Properties => {
                if let Some(source) = &self.source {
                    writeln!(out, "# source: {source}")?;
                }
                self.property.as_str()
            }
            YamlDialect::IndexTuple => INDEX_REAL_PROPERTY,
        };
        writeln!(out, "{}:", self.material)?;
        write_table(out, property, &self.wavelengths, &self.values, dialect)?;
        if let Some(imaginary) = self.imaginary(dialect) {
            write_table(out, INDEX_IMAGINARY_PROPERTY, &self.wavelengths, imaginary, dialect)?;
        }
        Ok(())
    }
}

fn parse_field(path: &Path, field: Option<&str>, row: usize) -> Result<f64, CsvConvertError> {
    match field {
        None | Some("") => Ok(f64::NAN),
        Some(text) => text
            .parse()
            .map_err(|_| CsvConvertError::BadNumber(path.to_path_buf(), text.to_string(), row)),
    }
}

/// The YAML key for the second column. Both `n` and any casing of the real index name map
/// to chroma's real index property.
fn property_name(header: &str) -> String {
    let key = sanitize_key(header);
    let lower = key.to_lowercase();
    if lower == "n" || lower == INDEX_REAL_PROPERTY.to_lowercase() {
        String::from(INDEX_REAL_PROPERTY)
    } else {
        key
    }
}

fn write_table<W: Write>(
    out: &mut W,
    name: &str,
    wavelengths: &[f64],
    values: &[f64],
    dialect: YamlDialect,
) -> std::io::Result<()> {
    writeln!(out, "  {name}:")?;
    for (idx, (wl, value)) in wavelengths.iter().zip(values.iter()).enumerate() {
        writeln!(
            out,
            "    {idx}: !!python/tuple [{}, {}]",
            dialect.format(*wl),
            dialect.format(*value)
        )?;
    }
    Ok(())
}

/// All .csv files in a directory, sorted by name
pub fn find_csv_files(directory: &Path) -> Result<Vec<PathBuf>, CsvConvertError> {
    if !directory.is_dir() {
        return Err(CsvConvertError::BadDirectory(directory.to_path_buf()));
    }
    let mut files = Vec::new();
    for item in directory.read_dir()? {
        let item_path = item?.path();
        if item_path.is_file() && item_path.extension().is_some_and(|ext| ext == "csv") {
            files.push(item_path);
        }
    }
    files.sort();
    Ok(files)
}

/// Convert every CSV in a directory into one YAML file. Returns the number of materials
/// written. Nothing is written unless every CSV converts.
pub fn convert_directory(
    directory: &Path,
    output: &Path,
    dialect: YamlDialect,
) -> Result<usize, CsvConvertError> {
    let files = find_csv_files(directory)?;
    let mut document = Vec::new();
    for path in files.iter() {
        let csv = PropertyCsv::read(path)?;
        log::info!(
            "Converted {} ({} entries of {})",
            csv.material,
            csv.wavelengths.len(),
            csv.property
        );
        csv.write_yaml(&mut document, dialect)?;
    }
    std::fs::write(output, document)?;
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optical::{OpticalTable, PropertyData};

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(name);
        if dir.exists() {
            std::fs::remove_dir_all(&dir).unwrap();
        }
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_format_scientific() {
        assert_eq!(format_scientific(450.0), "4.500000e+02");
        assert_eq!(format_scientific(0.00123), "1.230000e-03");
        assert_eq!(format_scientific(-2.5), "-2.500000e+00");
        assert_eq!(format_scientific(1e120), "1.000000e+120");
        assert_eq!(format_scientific(f64::NAN), "nan");
        assert_eq!(YamlDialect::IndexTuple.format(450.0), "450.0");
        assert_eq!(YamlDialect::IndexTuple.format(f64::NAN), ".nan");
    }

    #[test]
    fn test_sanitize_key() {
        assert_eq!(sanitize_key("Scattering Length (mm)"), "ScatteringLengthmm");
        assert_eq!(property_name("n"), "IndexOfRefractionRe");
        assert_eq!(property_name("indexofrefractionre"), "IndexOfRefractionRe");
        assert_eq!(property_name("Absorption-Length"), "AbsorptionLength");
    }

    #[test]
    fn test_read_property_with_source() {
        let dir = temp_dir("chroma_tools_csv_source");
        let path = dir.join("Teflon.csv");
        std::fs::write(
            &path,
            "wl,SpecularReflectivity,,\"Ghosh 1999\"\n175,0.5,,\n200,0.6,,\n",
        )
        .unwrap();
        let csv = PropertyCsv::read(&path).unwrap();
        assert_eq!(csv.material, "Teflon");
        assert_eq!(csv.property, "SpecularReflectivity");
        assert_eq!(csv.source.as_deref(), Some("Ghosh 1999"));
        assert_eq!(csv.values, vec![0.5, 0.6]);
        assert!(csv.imaginary(YamlDialect::Properties).is_none());

        let mut out = Vec::new();
        csv.write_yaml(&mut out, YamlDialect::Properties).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("# source: Ghosh 1999\nTeflon:\n  SpecularReflectivity:\n"));
        assert!(text.contains("    1: !!python/tuple [2.000000e+02, 6.000000e-01]"));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_convert_directory_round_trip() {
        let dir = temp_dir("chroma_tools_csv_dir");
        std::fs::write(dir.join("Silicon.csv"), "wl,n,k\n175,0.65,2.0\n200,0.9,2.8\n").unwrap();
        std::fs::write(dir.join("Quartz.csv"), "wl,n\n175,1.6\n200,1.55\n").unwrap();
        std::fs::write(dir.join("notes.txt"), "not a table").unwrap();
        let output = dir.join("optics.yaml");

        assert_eq!(convert_directory(&dir, &output, YamlDialect::IndexTuple).unwrap(), 2);

        let table = OpticalTable::read_file(&output).unwrap();
        assert_eq!(
            table.property("Silicon", "IndexOfRefractionIm").unwrap(),
            &PropertyData::Table(vec![(175.0, 2.0), (200.0, 2.8)])
        );
        assert_eq!(
            table.property("Quartz", "IndexOfRefractionRe").unwrap(),
            &PropertyData::Table(vec![(175.0, 1.6), (200.0, 1.55)])
        );
        assert!(table.property("Quartz", "IndexOfRefractionIm").is_err());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_bad_inputs() {
        let dir = temp_dir("chroma_tools_csv_bad");
        let path = dir.join("Broken.csv");
        std::fs::write(&path, "wl,n\n175,abc\n").unwrap();
        assert!(matches!(
            PropertyCsv::read(&path),
            Err(CsvConvertError::BadNumber(_, _, 0))
        ));
        assert!(matches!(
            convert_directory(&dir.join("missing"), &dir.join("out.yaml"), YamlDialect::IndexTuple),
            Err(CsvConvertError::BadDirectory(_))
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_failed_conversion_writes_nothing() {
        let dir = temp_dir("chroma_tools_csv_partial");
        std::fs::write(dir.join("Aluminium.csv"), "wl,n,k\n175,0.1,2.0\n").unwrap();
        std::fs::write(dir.join("Broken.csv"), "wl,n\n175,abc\n").unwrap();
        let output = dir.join("optics.yaml");
        assert!(convert_directory(&dir, &output, YamlDialect::Properties).is_err());
        assert!(!output.exists());
        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_imaginary_by_dialect() {
        let dir = temp_dir("chroma_tools_csv_dialects");
        let path = dir.join("Copper.csv");
        std::fs::write(&path, "wl,Absorption Length,k,\"Palik\"\n175,1.5,,\n200,1.25,0.5,\n").unwrap();
        let csv = PropertyCsv::read(&path).unwrap();
        assert_eq!(csv.third.as_ref().map(|t| t.len()), Some(2));
        assert!(csv.third.as_ref().unwrap()[0].is_nan());

        let mut out = Vec::new();
        csv.write_yaml(&mut out, YamlDialect::Properties).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "# source: Palik\nCopper:\n  AbsorptionLength:\n    \
             0: !!python/tuple [1.750000e+02, 1.500000e+00]\n    \
             1: !!python/tuple [2.000000e+02, 1.250000e+00]\n"
        );

        let mut out = Vec::new();
        csv.write_yaml(&mut out, YamlDialect::IndexTuple).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "Copper:\n  IndexOfRefractionRe:\n    \
             0: !!python/tuple [175.0, 1.5]\n    \
             1: !!python/tuple [200.0, 1.25]\n  \
             IndexOfRefractionIm:\n    \
             0: !!python/tuple [175.0, .nan]\n    \
             1: !!python/tuple [200.0, 0.5]\n"
        );
        let table = OpticalTable::parse(&text).unwrap();
        assert_eq!(
            table
                .property("Copper", "IndexOfRefractionIm")
                .unwrap()
                .value_at("IndexOfRefractionIm", 200.0)
                .unwrap(),
            0.5
        );
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
