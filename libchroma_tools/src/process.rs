//! One entry point per plotting tool.
//!
//! Each tool is split in two: a `load_*` step that opens the simulation file, reads what it
//! needs and closes it again before doing the numerics, and a `process_*` step that renders
//! the result to a PNG and returns where it was written.
use std::path::{Path, PathBuf};
use time::OffsetDateTime;

use super::channel_counts::sum_channel_charges;
use super::config::Config;
use super::constants::{
    CHANNEL_CHARGES_KEY, CHANNEL_IDS_KEY, DETECTED_POS_KEY, FINAL_POSITION_KEY, FLAGS_KEY,
    NUM_DETECTED_KEY, ORIGIN_KEY, PHOTON_WAVELENGTH_KEY,
};
use super::csv_convert::{convert_directory, YamlDialect};
use super::error::{ProcessError, ReflectivityError};
use super::fresnel::RefractiveIndex;
use super::geometry::GeometryCard;
use super::histogram::{BinAxis, Histogram1D, Histogram2D};
use super::plot::{
    draw_channel_counts, draw_count_histogram, draw_heatmap, draw_light_map, draw_reflectivity,
    draw_scene, ChartLabels, DetectionFooter, LightMapStyle, LinearColormap, MeshLayer, Scene3D,
};
use super::projection::{project_cylinder, separate_by_face, CubeFace};
use super::reflectivity::{load_indices, ReflectivityStudy};
use super::sim_file::SimulationFile;
use super::stats::{freedman_diaconis_bins, mean, std_dev};
use super::stl_mesh::Mesh;

fn open_logged(input: &Path) -> Result<SimulationFile, ProcessError> {
    let sim = SimulationFile::open(input)?;
    log::info!(
        "Reading {} ({})",
        input.to_string_lossy(),
        human_bytes::human_bytes(sim.size_bytes() as f64)
    );
    Ok(sim)
}

fn resolve_output(config: &Config, output: Option<&Path>, default_name: &str) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => config.get_output_path(default_name),
    }
}

/// File name of a light map rendered at the given time
pub fn light_map_file_name(at: OffsetDateTime) -> String {
    format!(
        "heatmap_{:04}-{:02}-{:02}_{:02}-{:02}-{:02}.png",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

/// Channel charges summed per channel id
pub fn load_channel_counts(config: &Config, input: &Path) -> Result<Vec<f64>, ProcessError> {
    let (charges, ids) = {
        let sim = open_logged(input)?;
        (
            sim.read_1d::<f64>(CHANNEL_CHARGES_KEY)?.to_vec(),
            sim.read_1d::<i64>(CHANNEL_IDS_KEY)?.to_vec(),
        )
    };
    Ok(sum_channel_charges(&charges, &ids, config.channel_count)?)
}

pub fn process_channel_counts(
    config: &Config,
    input: &Path,
    output: Option<&Path>,
) -> Result<PathBuf, ProcessError> {
    let counts = load_channel_counts(config, input)?;
    let output = resolve_output(config, output, "channel_counts.png");
    draw_channel_counts(&output, &counts)?;
    Ok(output)
}

/// Detected positions projected onto the unrolled detector cylinder
pub fn load_detected_photons(
    config: &Config,
    input: &Path,
    bins: usize,
) -> Result<Histogram2D, ProcessError> {
    let points = open_logged(input)?.read_points(DETECTED_POS_KEY)?;
    log::info!("Projecting {} detected photons", points.len());
    let (s, z) = project_cylinder(&points, config.cylinder_radius);
    Ok(Histogram2D::from_data(&s, &z, bins)?)
}

pub fn process_detected_photons(
    config: &Config,
    input: &Path,
    bins: usize,
    output: Option<&Path>,
) -> Result<PathBuf, ProcessError> {
    let hist = load_detected_photons(config, input, bins)?;
    let output = resolve_output(config, output, "detected_photons.png");
    draw_heatmap(
        &output,
        &hist,
        &LinearColormap::detected_photons(),
        ChartLabels {
            title: "Detector Position on Cylindrical Projection",
            x_desc: "rθ (mm)",
            y_desc: "Z-coordinate",
        },
        "Photon Count",
    )?;
    Ok(output)
}

/// Density histogram of NumDetected with its mean and standard deviation
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionCounts {
    pub histogram: Histogram1D,
    pub mean: f64,
    pub std_dev: f64,
}

/// Bin the detection counts with the Freedman-Diaconis rule unless a bin count is given
pub fn load_detection_counts(
    input: &Path,
    bins: Option<usize>,
) -> Result<DetectionCounts, ProcessError> {
    let counts = open_logged(input)?
        .read_1d::<f64>(NUM_DETECTED_KEY)?
        .to_vec();
    let bins = match bins {
        Some(bins) => bins,
        None => {
            let bins = freedman_diaconis_bins(&counts)?;
            log::info!("Freedman-Diaconis rule gives {bins} bins");
            bins
        }
    };
    let histogram = Histogram1D::fill(&counts, BinAxis::from_data(&counts, bins)?).into_density();
    Ok(DetectionCounts {
        histogram,
        mean: mean(&counts)?,
        std_dev: std_dev(&counts)?,
    })
}

pub fn process_histogram(
    config: &Config,
    input: &Path,
    bins: Option<usize>,
    output: Option<&Path>,
) -> Result<PathBuf, ProcessError> {
    let counts = load_detection_counts(input, bins)?;
    let output = resolve_output(config, output, "histogram.png");
    draw_count_histogram(&output, &counts.histogram, counts.mean, counts.std_dev)?;
    Ok(output)
}

/// Per-face histograms of the detected positions on the sensor cube
pub fn load_light_map(
    config: &Config,
    input: &Path,
) -> Result<(Vec<(CubeFace, Histogram2D)>, DetectionFooter), ProcessError> {
    let (simulated, points) = {
        let sim = open_logged(input)?;
        let simulated = sim
            .dataset_info(FLAGS_KEY)?
            .shape
            .first()
            .copied()
            .unwrap_or(0);
        (simulated as u64, sim.read_points(DETECTED_POS_KEY)?)
    };
    let footer = DetectionFooter {
        simulated,
        detected: points.len() as u64,
    };

    let axis = BinAxis::new(
        -config.light_map_extent,
        config.light_map_extent,
        config.light_map_bins,
    )?;
    let mut faces = Vec::with_capacity(CubeFace::ALL.len());
    for face in separate_by_face(&points, config.cube_half_length) {
        log::info!("{} face: {} photons", face.face.name(), face.u.len());
        faces.push((
            face.face,
            Histogram2D::fill(&face.u, &face.v, axis, axis)?,
        ));
    }
    Ok((faces, footer))
}

pub fn process_light_map(
    config: &Config,
    input: &Path,
    style: LightMapStyle,
    output: Option<&Path>,
) -> Result<PathBuf, ProcessError> {
    let (faces, footer) = load_light_map(config, input)?;
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    let output = resolve_output(config, output, &light_map_file_name(now));
    draw_light_map(&output, &faces, style, &footer)?;
    log::info!("Fraction detected: {:.2}", footer.fraction());
    Ok(output)
}

/// Component meshes to draw: files in the detector directory named after a component of the
/// card, minus the hidden ones, in file name order
pub fn load_meshes(config: &Config, card: &GeometryCard) -> Result<Vec<MeshLayer>, ProcessError> {
    let directory = card.detector_directory();
    let mut paths = Vec::new();
    for item in directory.read_dir()? {
        let path = item?.path();
        let is_stl = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("stl"));
        if path.is_file() && is_stl {
            paths.push(path);
        }
    }
    paths.sort();

    let mut layers = Vec::new();
    for path in paths {
        let Some(name) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
            continue;
        };
        if !card.has_component(&name) || config.is_component_hidden(&name) {
            continue;
        }
        let mesh = Mesh::read_file(&path)?;
        log::info!("Loaded {name} with {} triangles", mesh.triangles.len());
        layers.push(MeshLayer { name, mesh });
    }
    Ok(layers)
}

fn geometry_card_path<'a>(
    card: Option<&'a Path>,
    fallback: Option<&'a Path>,
) -> Result<&'a Path, ProcessError> {
    card.or(fallback).ok_or(ProcessError::NoGeometryCard)
}

pub fn load_scene(
    config: &Config,
    input: &Path,
    card: Option<&Path>,
    final_positions: bool,
) -> Result<Scene3D, ProcessError> {
    let (origins, finals) = {
        let sim = open_logged(input)?;
        let origins = sim.read_points(ORIGIN_KEY)?;
        let finals = if final_positions {
            Some(sim.read_points(FINAL_POSITION_KEY)?)
        } else {
            None
        };
        (origins, finals)
    };
    let card_path = geometry_card_path(card, config.geometry_card.as_deref())?;
    let card = GeometryCard::read_file(card_path)?;
    Ok(Scene3D {
        origins,
        final_positions: finals,
        meshes: load_meshes(config, &card)?,
    })
}

pub fn process_plot3d(
    config: &Config,
    input: &Path,
    card: Option<&Path>,
    final_positions: bool,
    output: Option<&Path>,
) -> Result<PathBuf, ProcessError> {
    let scene = load_scene(config, input, card, final_positions)?;
    let output = resolve_output(config, output, "geometry.png");
    draw_scene(&output, &scene)?;
    Ok(output)
}

/// Simulated reflectivity of a mountedLaser run compared with the Fresnel prediction
pub fn load_reflectivity(
    config: &Config,
    input: &Path,
    card: Option<&Path>,
    component: &str,
    surface_override: Option<RefractiveIndex>,
) -> Result<ReflectivityStudy, ProcessError> {
    let (flags, n_sources, origins, wavelength) = {
        let sim = open_logged(input)?;
        let flags = sim.read_1d::<u32>(FLAGS_KEY)?.to_vec();
        let n_sources = sim
            .dataset_info(NUM_DETECTED_KEY)?
            .shape
            .first()
            .copied()
            .unwrap_or(0);
        let origins = sim.read_points(ORIGIN_KEY)?;
        // Every photon of a run shares one wavelength
        let wavelength = sim
            .read_1d::<f64>(PHOTON_WAVELENGTH_KEY)?
            .iter()
            .next()
            .copied()
            .ok_or(ReflectivityError::NoWavelength)?;
        (flags, n_sources, origins, wavelength)
    };

    let card_path = geometry_card_path(
        card,
        config
            .reflectivity_card
            .as_deref()
            .or(config.geometry_card.as_deref()),
    )?;
    let card = GeometryCard::read_file(card_path)?;
    let (incident, surface) = load_indices(&card, component, wavelength, surface_override)?;

    let origins_x: Vec<f64> = origins.iter().map(|o| o[0]).collect();
    Ok(ReflectivityStudy::compute(
        &origins_x,
        n_sources,
        &flags,
        config.sphere_radius,
        config.reflected_flag,
        incident,
        surface,
        wavelength,
    )?)
}

pub fn process_reflectivity(
    config: &Config,
    input: &Path,
    card: Option<&Path>,
    component: &str,
    surface_override: Option<RefractiveIndex>,
    output: Option<&Path>,
) -> Result<PathBuf, ProcessError> {
    let study = load_reflectivity(config, input, card, component, surface_override)?;
    let output = resolve_output(config, output, "reflectivity.png");
    draw_reflectivity(&output, &study)?;
    Ok(output)
}

/// Convert a directory of optical property CSVs and report the size of the result
pub fn process_csv_to_yaml(
    directory: &Path,
    output: &Path,
    dialect: YamlDialect,
) -> Result<usize, ProcessError> {
    let n_materials = convert_directory(directory, output, dialect)?;
    let size = output.metadata().map(|m| m.len()).unwrap_or(0);
    log::info!(
        "Wrote {n_materials} materials to {} ({})",
        output.to_string_lossy(),
        human_bytes::human_bytes(size as f64)
    );
    Ok(n_materials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim_file::tests::write_test_file;
    use hdf5::File;
    use ndarray::{arr1, arr2};

    /// Write a file holding only detector-level keys
    fn write_detector_file(name: &str) -> PathBuf {
        let path = std::env::temp_dir().join(name);
        let file = File::create(&path).unwrap();
        file.create_group("Flags")
            .unwrap()
            .new_dataset_builder()
            .with_data(&arr1(&[4u32, 4, 4, 4, 4, 4, 4, 4]))
            .create("Flags")
            .unwrap();
        file.create_group("DetectedPos")
            .unwrap()
            .new_dataset_builder()
            .with_data(&arr2(&[
                [-22.0, 1.0, 2.0],
                [22.0, 1.0, 2.0],
                [0.0, 0.0, 23.0],
                [-22.0, 0.0, 23.0],
            ]))
            .create("DetectedPos")
            .unwrap();
        file.create_group("ChannelCharges")
            .unwrap()
            .new_dataset_builder()
            .with_data(&arr1(&[1.0f64, 2.0, 0.5]))
            .create("ChannelCharges")
            .unwrap();
        file.create_group("ChannelIDs")
            .unwrap()
            .new_dataset_builder()
            .with_data(&arr1(&[3i64, 3, 719]))
            .create("ChannelIDs")
            .unwrap();
        path
    }

    #[test]
    fn test_light_map_file_name() {
        let at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        assert_eq!(light_map_file_name(at), "heatmap_2023-11-14_22-13-20.png");
    }

    #[test]
    fn test_resolve_output() {
        let config = Config {
            output_dir: PathBuf::from("/tmp/plots"),
            ..Default::default()
        };
        assert_eq!(
            resolve_output(&config, None, "a.png"),
            PathBuf::from("/tmp/plots/a.png")
        );
        assert_eq!(
            resolve_output(&config, Some(Path::new("b.png")), "a.png"),
            PathBuf::from("b.png")
        );
    }

    #[test]
    fn test_load_channel_counts() {
        let path = write_detector_file("chroma_tools_process_channels.h5");
        let counts = load_channel_counts(&Config::default(), &path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(counts.len(), 720);
        assert_eq!(counts[3], 3.0);
        assert_eq!(counts[719], 0.5);
        assert_eq!(counts.iter().sum::<f64>(), 3.5);
    }

    #[test]
    fn test_load_light_map() {
        let path = write_detector_file("chroma_tools_process_light_map.h5");
        let config = Config {
            light_map_bins: 10,
            ..Default::default()
        };
        let (faces, footer) = load_light_map(&config, &path).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(footer.simulated, 8);
        assert_eq!(footer.detected, 4);
        assert_eq!(footer.fraction(), 0.5);

        let total = |face: CubeFace| {
            faces
                .iter()
                .find(|(f, _)| *f == face)
                .map(|(_, hist)| hist.total())
                .unwrap()
        };
        // the corner point lands on both West and Top
        assert_eq!(total(CubeFace::West), 2.0);
        assert_eq!(total(CubeFace::East), 1.0);
        assert_eq!(total(CubeFace::Top), 2.0);
        assert_eq!(total(CubeFace::North), 0.0);
    }

    #[test]
    fn test_load_detected_photons() {
        let path = write_detector_file("chroma_tools_process_detected.h5");
        let hist = load_detected_photons(&Config::default(), &path, 4).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(hist.counts.shape(), &[4, 4]);
        assert_eq!(hist.total(), 4.0);
    }

    #[test]
    fn test_load_detection_counts() {
        let path = write_test_file("chroma_tools_process_counts.h5");
        let counts = load_detection_counts(&path, Some(2)).unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(counts.mean, 1.5);
        assert_eq!(counts.std_dev, 0.5);
        assert_eq!(counts.histogram.counts.len(), 2);
        // density integrates to one
        let area: f64 = counts.histogram.counts.iter().sum::<f64>() * counts.histogram.axis.width();
        assert!((area - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_missing_cards() {
        let path = write_test_file("chroma_tools_process_cards.h5");
        let result = load_reflectivity(&Config::default(), &path, None, "Sheet", None);
        let scene = load_scene(&Config::default(), &path, None, false);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ProcessError::NoGeometryCard)));
        assert!(matches!(scene, Err(ProcessError::NoGeometryCard)));
    }

    #[test]
    fn test_load_reflectivity() {
        let dir = std::env::temp_dir().join("chroma_tools_process_reflectivity");
        std::fs::create_dir_all(&dir).unwrap();
        let optics = dir.join("optics.yaml");
        std::fs::write(&optics, "LXe:\n  IndexOfRefractionRe: 1.69\n").unwrap();
        let card = dir.join("card.yaml");
        std::fs::write(
            &card,
            format!(
                "Detector:\n  PathToDetector: {0}\n  OpticalProperties: {1}\nComponents:\n  Sheet:\n    Surface: [Silicon]\n    Outside: [LXe]\n",
                dir.to_string_lossy(),
                optics.to_string_lossy()
            ),
        )
        .unwrap();
        let sim_path = write_test_file("chroma_tools_process_reflectivity.h5");

        let study = load_reflectivity(
            &Config::default(),
            &sim_path,
            Some(&card),
            "Sheet",
            Some(RefractiveIndex::new(1.05, 1.5)),
        )
        .unwrap();
        std::fs::remove_file(&sim_path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(study.wavelength, 450.0);
        assert_eq!(study.incident, RefractiveIndex::new(1.69, 0.0));
        // flags [68, 1, 68] then [4, 68, 2]; the second source sits at 30 degrees
        assert_eq!(study.angles.len(), 2);
        assert!((study.angles[1] - 30.0).abs() < 1e-9);
        assert!((study.simulated[0] - 2.0 / 3.0).abs() < 1e-12);
        assert!((study.simulated[1] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_load_scene() {
        let dir = std::env::temp_dir().join("chroma_tools_process_scene");
        if dir.exists() {
            std::fs::remove_dir_all(&dir).unwrap();
        }
        std::fs::create_dir_all(&dir).unwrap();
        let facet = "solid s\nfacet normal 0 0 1\nouter loop\nvertex 0 0 0\nvertex 9 0 0\nvertex 0 9 0\nendloop\nendfacet\nendsolid s\n";
        for name in ["Sheet.stl", "Cage.stl", "Unlisted.stl"] {
            std::fs::write(dir.join(name), facet).unwrap();
        }
        std::fs::write(dir.join("Sheet.txt"), "not a mesh").unwrap();
        let card = dir.join("card.yaml");
        std::fs::write(
            &card,
            format!(
                "Detector:\n  PathToDetector: {}\nComponents:\n  Sheet:\n  Cage:\n",
                dir.to_string_lossy()
            ),
        )
        .unwrap();
        let sim_path = write_test_file("chroma_tools_process_scene.h5");

        let scene = load_scene(&Config::default(), &sim_path, Some(&card), false).unwrap();
        std::fs::remove_file(&sim_path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(scene.origins.len(), 2);
        assert!(scene.final_positions.is_none());
        // Cage is hidden by default and Unlisted is not a component
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.meshes[0].name, "Sheet");
        assert_eq!(scene.axis_range(), 9.0);
    }

    #[test]
    fn test_process_csv_to_yaml() {
        let dir = std::env::temp_dir().join("chroma_tools_process_csv");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("Quartz.csv"), "wl,n\n175,1.6\n").unwrap();
        let output = dir.join("out.yaml");
        let written = process_csv_to_yaml(&dir, &output, YamlDialect::Properties).unwrap();
        let text = std::fs::read_to_string(&output).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();
        assert_eq!(written, 1);
        assert!(text.contains("    0: !!python/tuple [1.750000e+02, 1.600000e+00]"));
    }
}
