use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum SimFileError {
    #[error("Could not open simulation file because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Simulation file failed due to HDF5 error: {0}")]
    HDF5Error(#[from] hdf5::Error),
    #[error("Simulation file does not contain the key {0}")]
    MissingKey(String),
    #[error("Dataset {key} has shape {shape:?}; expected {expected}")]
    BadShape {
        key: String,
        shape: Vec<usize>,
        expected: String,
    },
}

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("Run summary failed due to simulation file error: {0}")]
    FileError(#[from] SimFileError),
    #[error("Run summary found no sources; cannot infer photons per source")]
    NoSources,
    #[error("Run summary found an empty NumPhotons dataset")]
    NoEvents,
}

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Prompt failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Prompt failed due to terminal error: {0}")]
    DialogError(#[from] dialoguer::Error),
    #[error("Prompt reached the end of input before receiving an answer")]
    EndOfInput,
    #[error("Prompt rejected the answer: {0}")]
    Rejected(&'static str),
}

#[derive(Debug, Error)]
pub enum InspectError {
    #[error("Inspector failed due to prompt error: {0}")]
    PromptError(#[from] PromptError),
    #[error("Inspector failed due to simulation file error: {0}")]
    FileError(#[from] SimFileError),
    #[error("Inspector failed due to run summary error: {0}")]
    SummaryError(#[from] SummaryError),
    #[error("Inspector failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("Statistic requested on an empty sample")]
    EmptySample,
    #[error("Percentile {0} is outside of [0, 100]")]
    BadPercentile(f64),
}

#[derive(Debug, Error)]
pub enum HistogramError {
    #[error("Histogram requires at least one bin")]
    NoBins,
    #[error("Histogram range [{0}, {1}] is invalid")]
    BadRange(f64, f64),
    #[error("Histogram axes have mismatched lengths {0} and {1}")]
    MismatchedAxes(usize, usize),
    #[error("Histogram failed due to statistics error: {0}")]
    StatsError(#[from] StatsError),
}

#[derive(Debug, Error)]
pub enum OpticalTableError {
    #[error("Could not open optical property table because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Optical property table failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Optical property table failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Optical property table has no material {0}")]
    MissingMaterial(String),
    #[error("Material {0} has no property {1}")]
    MissingProperty(String, String),
    #[error("Property {0} has a malformed entry: {1}")]
    BadEntry(String, String),
    #[error("Property {0} has no data covering wavelength {1} nm")]
    OutOfRange(String, f64),
}

#[derive(Debug, Error)]
pub enum CsvConvertError {
    #[error("CSV converter could not find directory {0:?}")]
    BadDirectory(PathBuf),
    #[error("CSV converter failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("CSV converter failed to read CSV: {0}")]
    CsvError(#[from] csv::Error),
    #[error("CSV file {0:?} needs at least two columns")]
    TooFewColumns(PathBuf),
    #[error("CSV file {0:?} has an unparsable number {1:?} on row {2}")]
    BadNumber(PathBuf, String, usize),
    #[error("CSV file {0:?} has no usable file stem")]
    BadFileName(PathBuf),
}

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("Could not open geometry card because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Geometry card failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Geometry card failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Geometry card has no component {0}")]
    MissingComponent(String),
    #[error("Component {0} does not list a {1} material")]
    MissingMaterial(String, String),
    #[error("Geometry card has no OpticalProperties path")]
    MissingOpticalProperties,
}

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("Could not open mesh because file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Mesh failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Binary STL declares {0} triangles but holds {1} bytes of triangle data")]
    TruncatedBinary(u32, usize),
    #[error("ASCII STL has a malformed vertex line: {0}")]
    BadVertex(String),
}

#[derive(Debug, Error)]
pub enum ReflectivityError {
    #[error("Reflectivity failed due to simulation file error: {0}")]
    FileError(#[from] SimFileError),
    #[error("Reflectivity failed due to geometry card error: {0}")]
    GeometryError(#[from] GeometryError),
    #[error("Reflectivity failed due to optical table error: {0}")]
    OpticalError(#[from] OpticalTableError),
    #[error("Reflectivity needs at least one source")]
    NoSources,
    #[error("Flags of length {0} cannot be split evenly across {1} sources")]
    UnevenSplit(usize, usize),
    #[error("Origin has {0} entries but there are {1} sources")]
    MismatchedOrigins(usize, usize),
    #[error("Source at x = {x} mm lies outside the sphere of radius {radius} mm")]
    OriginOutsideSphere { x: f64, radius: f64 },
    #[error("Simulation file holds no photon wavelengths")]
    NoWavelength,
}

#[derive(Debug, Error)]
pub enum ChannelCountError {
    #[error("Channel charges ({0}) and channel IDs ({1}) have different lengths")]
    MismatchedLengths(usize, usize),
    #[error("Channel ID {0} is outside of the {1} available channels")]
    BadChannel(i64, usize),
}

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("Plot failed while drawing: {0}")]
    Drawing(String),
    #[error("Plot received no data to draw")]
    NoData,
    #[error("Unknown light map style {0:?}, expected histogram or contour")]
    UnknownStyle(String),
}

impl<E: std::error::Error + Send + Sync> From<plotters::drawing::DrawingAreaErrorKind<E>>
    for PlotError
{
    fn from(value: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        Self::Drawing(value.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Process failed due to simulation file error: {0}")]
    FileError(#[from] SimFileError),
    #[error("Process failed due to histogram error: {0}")]
    HistogramError(#[from] HistogramError),
    #[error("Process failed due to statistics error: {0}")]
    StatsError(#[from] StatsError),
    #[error("Process failed due to plot error: {0}")]
    PlotError(#[from] PlotError),
    #[error("Process failed due to channel count error: {0}")]
    ChannelError(#[from] ChannelCountError),
    #[error("Process failed due to geometry card error: {0}")]
    GeometryError(#[from] GeometryError),
    #[error("Process failed due to mesh error: {0}")]
    MeshError(#[from] MeshError),
    #[error("Process failed due to reflectivity error: {0}")]
    ReflectivityError(#[from] ReflectivityError),
    #[error("Process failed due to CSV conversion error: {0}")]
    CsvError(#[from] CsvConvertError),
    #[error("Process failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Process requires a geometry card but none was given")]
    NoGeometryCard,
}
