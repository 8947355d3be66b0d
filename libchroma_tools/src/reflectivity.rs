//! Comparison of simulated reflectivity against the Fresnel prediction.
//!
//! Intended for the reflectivity study geometry with the mountedLaser generator: a laser
//! moves along the inside of a sphere, pointing at the origin, so every source hits the
//! sheet at a different angle of incidence.
use super::error::ReflectivityError;
use super::flags::count_matching_per_source;
use super::fresnel::{reflectance_p, reflectance_s, RefractiveIndex};
use super::geometry::{GeometryCard, MaterialSide};
use super::optical::OpticalTable;

/// Angle of incidence in degrees of a source at height x on a sphere of the given radius
pub fn angle_of_incidence(x: f64, sphere_radius: f64) -> f64 {
    (x / sphere_radius).asin().to_degrees()
}

/// Fraction of photons of each source whose flag matches reflected_flag.
/// Flags are ordered by source, with the same number of photons per source.
pub fn simulated_reflectivity(
    flags: &[u32],
    n_sources: usize,
    reflected_flag: u32,
) -> Result<Vec<f64>, ReflectivityError> {
    if n_sources == 0 {
        return Err(ReflectivityError::NoSources);
    }
    if flags.len() % n_sources != 0 {
        return Err(ReflectivityError::UnevenSplit(flags.len(), n_sources));
    }
    let photons_per_source = flags.len() / n_sources;
    Ok(
        count_matching_per_source(flags, photons_per_source, reflected_flag)
            .into_iter()
            .map(|count| count as f64 / photons_per_source as f64)
            .collect(),
    )
}

/// Refractive indices of the medium the light arrives through (the Outside material of the
/// component) and of the reflecting surface, at one wavelength. A given surface index
/// replaces the tabulated one.
pub fn load_indices(
    card: &GeometryCard,
    component: &str,
    wavelength: f64,
    surface_override: Option<RefractiveIndex>,
) -> Result<(RefractiveIndex, RefractiveIndex), ReflectivityError> {
    let outside = card.material(component, MaterialSide::Outside)?;
    let table = OpticalTable::read_file(&card.optical_properties_path()?)?;
    let incident = table.refractive_index(&outside, wavelength)?;
    log::info!("{outside}: n = {incident} at {wavelength} nm");

    let surface = match surface_override {
        Some(index) => {
            log::info!("Surface index overridden to {index}");
            index
        }
        None => {
            let material = card.material(component, MaterialSide::Surface)?;
            let index = table.refractive_index(&material, wavelength)?;
            log::info!("{material}: n = {index} at {wavelength} nm");
            index
        }
    };
    Ok((incident, surface))
}

/// Simulated and predicted reflectivity per source, sorted by angle of incidence
#[derive(Debug, Clone, PartialEq)]
pub struct ReflectivityStudy {
    pub wavelength: f64,
    pub incident: RefractiveIndex,
    pub surface: RefractiveIndex,
    pub angles: Vec<f64>,
    pub simulated: Vec<f64>,
    pub theory_s: Vec<f64>,
    pub theory_p: Vec<f64>,
    pub average: Vec<f64>,
    pub residuals: Vec<f64>,
}

impl ReflectivityStudy {
    /// There is one entry in origins_x per source, and the flags of all sources laid end to end
    pub fn compute(
        origins_x: &[f64],
        n_sources: usize,
        flags: &[u32],
        sphere_radius: f64,
        reflected_flag: u32,
        incident: RefractiveIndex,
        surface: RefractiveIndex,
        wavelength: f64,
    ) -> Result<Self, ReflectivityError> {
        if origins_x.len() != n_sources {
            return Err(ReflectivityError::MismatchedOrigins(origins_x.len(), n_sources));
        }
        if let Some(x) = origins_x.iter().find(|x| x.abs() > sphere_radius) {
            return Err(ReflectivityError::OriginOutsideSphere {
                x: *x,
                radius: sphere_radius,
            });
        }
        let simulated = simulated_reflectivity(flags, n_sources, reflected_flag)?;

        let mut rows: Vec<(f64, f64)> = origins_x
            .iter()
            .map(|x| angle_of_incidence(*x, sphere_radius))
            .zip(simulated)
            .collect();
        rows.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut study = Self {
            wavelength,
            incident,
            surface,
            angles: Vec::with_capacity(n_sources),
            simulated: Vec::with_capacity(n_sources),
            theory_s: Vec::with_capacity(n_sources),
            theory_p: Vec::with_capacity(n_sources),
            average: Vec::with_capacity(n_sources),
            residuals: Vec::with_capacity(n_sources),
        };
        for (angle, simulated) in rows {
            let rs = reflectance_s(angle, &incident, &surface);
            let rp = reflectance_p(angle, &incident, &surface);
            let average = 0.5 * (rs + rp);
            study.angles.push(angle);
            study.simulated.push(simulated);
            study.theory_s.push(rs);
            study.theory_p.push(rp);
            study.average.push(average);
            study.residuals.push(simulated - average);
        }
        Ok(study)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_of_incidence() {
        assert_eq!(angle_of_incidence(0.0, 152.6), 0.0);
        assert!((angle_of_incidence(76.3, 152.6) - 30.0).abs() < 1e-9);
        assert!((angle_of_incidence(152.6, 152.6) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_simulated_reflectivity() {
        let flags = [68, 68, 1, 4, 68, 2, 2, 2];
        assert_eq!(
            simulated_reflectivity(&flags, 2, 68).unwrap(),
            vec![0.5, 0.25]
        );
        assert!(matches!(
            simulated_reflectivity(&flags, 3, 68),
            Err(ReflectivityError::UnevenSplit(8, 3))
        ));
        assert!(matches!(
            simulated_reflectivity(&flags, 0, 68),
            Err(ReflectivityError::NoSources)
        ));
    }

    #[test]
    fn test_study_sorted_by_angle() {
        let xenon = RefractiveIndex::new(1.69, 0.0);
        let silicon = RefractiveIndex::new(1.05, 1.5);
        let flags = [68, 68, 68, 68, 1, 1, 68, 1];
        let study =
            ReflectivityStudy::compute(&[76.3, 0.0], 2, &flags, 152.6, 68, xenon, silicon, 175.0)
                .unwrap();
        assert_eq!(study.angles[0], 0.0);
        assert_eq!(study.simulated, vec![0.25, 1.0]);
        for i in 0..2 {
            assert!(
                (study.average[i] - 0.5 * (study.theory_s[i] + study.theory_p[i])).abs() < 1e-12
            );
            assert!((study.residuals[i] - (study.simulated[i] - study.average[i])).abs() < 1e-12);
        }
        // s and p agree at normal incidence
        assert!((study.theory_s[0] - study.theory_p[0]).abs() < 1e-12);

        assert!(matches!(
            ReflectivityStudy::compute(&[0.0], 2, &flags, 152.6, 68, xenon, silicon, 175.0),
            Err(ReflectivityError::MismatchedOrigins(1, 2))
        ));
    }

    #[test]
    fn test_origin_outside_sphere() {
        let xenon = RefractiveIndex::new(1.69, 0.0);
        let silicon = RefractiveIndex::new(1.05, 1.5);
        let flags = [68, 1, 68, 1];
        let result =
            ReflectivityStudy::compute(&[0.0, -200.0], 2, &flags, 152.6, 68, xenon, silicon, 175.0);
        match result {
            Err(ReflectivityError::OriginOutsideSphere { x, radius }) => {
                assert_eq!(x, -200.0);
                assert_eq!(radius, 152.6);
            }
            other => panic!("expected OriginOutsideSphere, got {other:?}"),
        }
        // the rim itself is grazing incidence, not an error
        let study =
            ReflectivityStudy::compute(&[0.0, 152.6], 2, &flags, 152.6, 68, xenon, silicon, 175.0)
                .unwrap();
        assert!(study.angles.iter().all(|angle| angle.is_finite()));
    }

    #[test]
    fn test_load_indices() {
        let dir = std::env::temp_dir().join("chroma_tools_reflectivity_card");
        std::fs::create_dir_all(&dir).unwrap();
        let optics = dir.join("optics.yaml");
        std::fs::write(
            &optics,
            "LXe:\n  IndexOfRefractionRe: 1.69\nSilicon:\n  IndexOfRefractionRe:\n    0: !!python/tuple [175.0, 1.05]\n  IndexOfRefractionIm:\n    0: !!python/tuple [175.0, 1.5]\n",
        )
        .unwrap();
        let card = GeometryCard::parse(&format!(
            "Detector:\n  PathToDetector: {0}\n  OpticalProperties: {1}\nComponents:\n  Sheet:\n    Surface: [Silicon]\n    Outside: [LXe]\n",
            dir.to_string_lossy(),
            optics.to_string_lossy()
        ))
        .unwrap();
        let (incident, surface) = load_indices(&card, "Sheet", 175.0, None).unwrap();
        assert_eq!(incident, RefractiveIndex::new(1.69, 0.0));
        assert_eq!(surface, RefractiveIndex::new(1.05, 1.5));

        // the override skips the surface lookup, which would fail at this wavelength
        let gold = RefractiveIndex::new(1.4, 1.9);
        let (incident, surface) = load_indices(&card, "Sheet", 300.0, Some(gold)).unwrap();
        assert_eq!(incident, RefractiveIndex::new(1.69, 0.0));
        assert_eq!(surface, gold);
        assert!(matches!(
            load_indices(&card, "Sheet", 300.0, None),
            Err(ReflectivityError::OpticalError(_))
        ));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
