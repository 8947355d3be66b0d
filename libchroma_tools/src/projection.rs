//! Flattening of detected positions onto 2D detector surfaces.
use std::f64::consts::TAU;

/// Unroll a point on a cylinder of the given radius (axis along z) into
/// (arc length, z). The arc length runs from 0 to 2 pi r, starting at the +x axis.
pub fn cylindrical_projection(point: &[f64; 3], radius: f64) -> (f64, f64) {
    let theta = point[1].atan2(point[0]).rem_euclid(TAU);
    (radius * theta, point[2])
}

/// Project every point, returning the arc lengths and the z coordinates separately
pub fn project_cylinder(points: &[[f64; 3]], radius: f64) -> (Vec<f64>, Vec<f64>) {
    points
        .iter()
        .map(|p| cylindrical_projection(p, radius))
        .unzip()
}

/// The six faces of the LoLX packaged cube
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeFace {
    West,
    Bottom,
    East,
    North,
    South,
    Top,
}

impl CubeFace {
    /// Faces in the order they are laid out in the light map (two rows of three)
    pub const ALL: [CubeFace; 6] = [
        CubeFace::West,
        CubeFace::Bottom,
        CubeFace::East,
        CubeFace::North,
        CubeFace::South,
        CubeFace::Top,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::West => "West",
            Self::Bottom => "Bottom",
            Self::East => "East",
            Self::North => "North",
            Self::South => "South",
            Self::Top => "Top",
        }
    }

    /// Whether a point lies beyond this face of a cube of half side length half_length
    pub fn contains(&self, point: &[f64; 3], half_length: f64) -> bool {
        let [x, y, z] = *point;
        match self {
            Self::West => x < -half_length,
            Self::Bottom => z < -half_length,
            Self::East => x > half_length,
            Self::North => y < -half_length,
            Self::South => y > half_length,
            Self::Top => z > half_length,
        }
    }

    /// In-plane coordinates of a point on this face, oriented so the faces unfold
    /// into a consistent net
    pub fn unfold(&self, point: &[f64; 3]) -> (f64, f64) {
        let [x, y, z] = *point;
        match self {
            Self::West => (y, z),
            Self::Bottom => (y, -x),
            Self::East => (-y, z),
            Self::North => (-x, z),
            Self::South => (z, x),
            Self::Top => (x, y),
        }
    }
}

/// The in-plane coordinates of the points falling on one face
#[derive(Debug, Clone, PartialEq)]
pub struct FacePoints {
    pub face: CubeFace,
    pub u: Vec<f64>,
    pub v: Vec<f64>,
}

/// Sort points onto the six cube faces. A point near an edge or corner can lie beyond
/// more than one face and is then counted on each of them.
pub fn separate_by_face(points: &[[f64; 3]], half_length: f64) -> Vec<FacePoints> {
    CubeFace::ALL
        .iter()
        .map(|face| {
            let (u, v) = points
                .iter()
                .filter(|p| face.contains(p, half_length))
                .map(|p| face.unfold(p))
                .unzip();
            FacePoints { face: *face, u, v }
        })
        .collect()
}
