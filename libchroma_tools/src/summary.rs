use std::fmt::Display;

use super::constants::{
    FLAGS_KEY, GENERATOR_ATTR, NUMBER_OF_RUNS_ATTR, NUMBER_OF_SOURCES_ATTR, NUM_DETECTED_KEY,
    NUM_PHOTONS_KEY, PHOTON_LOCATION_ATTR,
};
use super::error::SummaryError;
use super::sim_file::SimulationFile;

/// Photons emitted per event. Most generators emit the same number every event; some
/// (NEST) do not, in which case only the mean is meaningful.
#[derive(Debug, Clone, PartialEq)]
pub enum PhotonsPerEvent {
    Uniform(u64),
    Mean(f64),
}

/// The simulation input parameters, recovered from a result file
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub generator: Option<String>,
    pub photon_location: Option<String>,
    pub n_sources: u64,
    pub n_runs: u64,
    pub photons: PhotonsPerEvent,
    pub total_photons: u64,
}

impl RunSummary {
    /// Build the summary from the run metadata, falling back to inference from the
    /// NumDetected and Flags lengths for files written without metadata
    pub fn from_file(sim: &SimulationFile) -> Result<Self, SummaryError> {
        let meta = sim.metadata()?;
        let n_sources = meta.get(NUMBER_OF_SOURCES_ATTR).and_then(|v| v.as_count());
        let n_runs = meta.get(NUMBER_OF_RUNS_ATTR).and_then(|v| v.as_count());

        let mut summary = match (n_sources, n_runs) {
            (Some(n_sources), Some(n_runs)) if sim.has_key(NUM_PHOTONS_KEY) => {
                let num_photons = sim.read_1d::<u64>(NUM_PHOTONS_KEY)?;
                Self::from_photon_counts(&num_photons.to_vec(), n_sources, n_runs)?
            }
            _ => {
                log::warn!(
                    "Run metadata is incomplete; inferring parameters from NumDetected and Flags"
                );
                let n_sources = leading_length(sim, NUM_DETECTED_KEY)?;
                let n_flags = leading_length(sim, FLAGS_KEY)?;
                Self::infer(n_sources as u64, n_flags as u64)?
            }
        };
        summary.generator = meta.get(GENERATOR_ATTR).map(|v| v.to_string());
        summary.photon_location = meta.get(PHOTON_LOCATION_ATTR).map(|v| v.to_string());
        Ok(summary)
    }

    /// Summary from per-event photon counts and the metadata counts
    pub fn from_photon_counts(
        num_photons: &[u64],
        n_sources: u64,
        n_runs: u64,
    ) -> Result<Self, SummaryError> {
        let sample = *num_photons.first().ok_or(SummaryError::NoEvents)?;
        let (photons, total_photons) = if num_photons.iter().all(|n| *n == sample) {
            (PhotonsPerEvent::Uniform(sample), n_sources * sample * n_runs)
        } else {
            let total: u64 = num_photons.iter().sum();
            (
                PhotonsPerEvent::Mean(total as f64 / num_photons.len() as f64),
                total,
            )
        };
        Ok(Self {
            generator: None,
            photon_location: None,
            n_sources,
            n_runs,
            photons,
            total_photons,
        })
    }

    /// Summary inferred from the number of sources and the number of flags (one per photon)
    pub fn infer(n_sources: u64, n_flags: u64) -> Result<Self, SummaryError> {
        if n_sources == 0 {
            return Err(SummaryError::NoSources);
        }
        Ok(Self {
            generator: None,
            photon_location: None,
            n_sources,
            n_runs: 1,
            photons: PhotonsPerEvent::Uniform(n_flags / n_sources),
            total_photons: n_flags,
        })
    }
}

fn leading_length(sim: &SimulationFile, key: &str) -> Result<usize, SummaryError> {
    Ok(sim.dataset_info(key)?.shape.first().copied().unwrap_or(0))
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.photons {
            PhotonsPerEvent::Uniform(n) => writeln!(f, "Number of photons: {n}")?,
            PhotonsPerEvent::Mean(n) => writeln!(f, "Number of photons (on average): {n}")?,
        }
        if let Some(generator) = &self.generator {
            writeln!(f, "Generator: {generator}")?;
        }
        writeln!(f, "Number of sources: {}", self.n_sources)?;
        writeln!(f, "Number of runs: {}", self.n_runs)?;
        write!(f, "Total number of photons simulated: {}", self.total_photons)?;
        if let Some(location) = &self.photon_location {
            write!(f, "\nPhotonLocation: {location}")?;
        }
        Ok(())
    }
}
