// Detector dimensions used by the LoLX and nEXO geometries. All lengths in mm.

/// Radius of the nEXO cylindrical detector surface
pub const DEFAULT_CYLINDER_RADIUS_MM: f64 = 760.0;
/// Half side length of the LoLX packaged cube
pub const DEFAULT_CUBE_HALF_LENGTH_MM: f64 = 20.9;
/// Half extent of each light map face
pub const DEFAULT_LIGHT_MAP_EXTENT_MM: f64 = 25.0;
pub const DEFAULT_LIGHT_MAP_BINS: usize = 350;
/// Radius of the sphere the mounted laser travels along in the reflectivity study geometry
pub const DEFAULT_SPHERE_RADIUS_MM: f64 = 152.6;
/// Number of readout channels of the nEXO detector
pub const DEFAULT_CHANNEL_COUNT: usize = 720;

pub const VACUUM_PERMITTIVITY: f64 = 8.854e-12;
pub const VACUUM_PERMEABILITY: f64 = 4.0 * std::f64::consts::PI * 1e-7;

// Dataset keys written by chroma
pub const FLAGS_KEY: &str = "Flags";
pub const NUM_DETECTED_KEY: &str = "NumDetected";
pub const NUM_PHOTONS_KEY: &str = "NumPhotons";
pub const DETECTED_POS_KEY: &str = "DetectedPos";
pub const FINAL_POSITION_KEY: &str = "FinalPosition";
pub const ORIGIN_KEY: &str = "Origin";
pub const PHOTON_WAVELENGTH_KEY: &str = "PhotonWavelength";
pub const CHANNEL_CHARGES_KEY: &str = "ChannelCharges";
pub const CHANNEL_IDS_KEY: &str = "ChannelIDs";

// Root attributes written by chroma
pub const GENERATOR_ATTR: &str = "Generator";
pub const PHOTON_LOCATION_ATTR: &str = "PhotonLocation";
pub const NUMBER_OF_SOURCES_ATTR: &str = "NumberOfSources";
pub const NUMBER_OF_RUNS_ATTR: &str = "NumberOfRuns";

// Optical property names understood by chroma
pub const INDEX_REAL_PROPERTY: &str = "IndexOfRefractionRe";
pub const INDEX_IMAGINARY_PROPERTY: &str = "IndexOfRefractionIm";

/// Placeholder substituted by the ChromaPath entry of a geometry card
pub const CHROMA_PATH_PLACEHOLDER: &str = "[ChromaPath]";
