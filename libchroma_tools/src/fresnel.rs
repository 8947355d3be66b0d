//! Fresnel reflectance at the interface of two (possibly absorbing) media, written in
//! terms of the characteristic impedance of each medium.
use nalgebra::{Complex, ComplexField};

use super::constants::{VACUUM_PERMEABILITY, VACUUM_PERMITTIVITY};

/// A complex refractive index n + ik
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefractiveIndex {
    pub n: f64,
    pub k: f64,
}

impl RefractiveIndex {
    pub fn new(n: f64, k: f64) -> Self {
        Self { n, k }
    }

    pub fn as_complex(&self) -> Complex<f64> {
        Complex::new(self.n, self.k)
    }

    /// Relative permittivity, the square of the index
    pub fn permittivity(&self) -> Complex<f64> {
        let index = self.as_complex();
        index * index
    }

    /// Characteristic impedance of the medium
    pub fn impedance(&self) -> Complex<f64> {
        let vacuum = (VACUUM_PERMEABILITY / VACUUM_PERMITTIVITY).sqrt();
        Complex::new(vacuum, 0.0) / self.permittivity().sqrt()
    }
}

impl std::fmt::Display for RefractiveIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} + {}i", self.n, self.k)
    }
}

/// The quantities shared by both polarizations at one angle of incidence
struct Interface {
    z1: Complex<f64>,
    z2: Complex<f64>,
    cos_incident: Complex<f64>,
    cos_transmitted: Complex<f64>,
}

impl Interface {
    fn new(incident_deg: f64, incident: &RefractiveIndex, surface: &RefractiveIndex) -> Self {
        let theta = incident_deg.to_radians();
        let ratio = incident.permittivity() / surface.permittivity();
        let sin2 = theta.sin().powi(2);
        let cos_transmitted = (Complex::new(1.0, 0.0) - ratio * sin2).sqrt();
        Self {
            z1: incident.impedance(),
            z2: surface.impedance(),
            cos_incident: Complex::new(theta.cos(), 0.0),
            cos_transmitted,
        }
    }
}

/// Reflectance of s-polarized light arriving at incident_deg degrees from the normal
pub fn reflectance_s(
    incident_deg: f64,
    incident: &RefractiveIndex,
    surface: &RefractiveIndex,
) -> f64 {
    let i = Interface::new(incident_deg, incident, surface);
    let numerator = i.z2 * i.cos_incident - i.z1 * i.cos_transmitted;
    let denominator = i.z2 * i.cos_incident + i.z1 * i.cos_transmitted;
    (numerator / denominator).norm_sqr()
}

/// Reflectance of p-polarized light arriving at incident_deg degrees from the normal
pub fn reflectance_p(
    incident_deg: f64,
    incident: &RefractiveIndex,
    surface: &RefractiveIndex,
) -> f64 {
    let i = Interface::new(incident_deg, incident, surface);
    let numerator = i.z2 * i.cos_transmitted - i.z1 * i.cos_incident;
    let denominator = i.z2 * i.cos_transmitted + i.z1 * i.cos_incident;
    (numerator / denominator).norm_sqr()
}

/// Reflectance of randomly polarized light: the mean of the s and p reflectances
pub fn reflectance_unpolarized(
    incident_deg: f64,
    incident: &RefractiveIndex,
    surface: &RefractiveIndex,
) -> f64 {
    0.5 * (reflectance_s(incident_deg, incident, surface)
        + reflectance_p(incident_deg, incident, surface))
}
