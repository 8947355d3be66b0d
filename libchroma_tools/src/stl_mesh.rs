use byteorder::{LittleEndian, ReadBytesExt};
use std::io::Cursor;
use std::path::Path;

use super::error::MeshError;

const BINARY_HEADER_SIZE: usize = 80;
const BINARY_TRIANGLE_SIZE: usize = 50;

pub type Vertex = [f64; 3];
pub type Triangle = [Vertex; 3];

/// A triangulated surface read from an STL file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    /// Read a binary or ASCII STL file
    pub fn read_file(path: &Path) -> Result<Self, MeshError> {
        if !path.exists() {
            return Err(MeshError::BadFilePath(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        Self::parse(&bytes)
    }

    pub fn parse(bytes: &[u8]) -> Result<Self, MeshError> {
        // Binary files may also start with "solid", so the size check decides
        if let Some(n_triangles) = binary_triangle_count(bytes) {
            if bytes.len() == BINARY_HEADER_SIZE + 4 + n_triangles as usize * BINARY_TRIANGLE_SIZE {
                return Self::parse_binary(bytes);
            }
        }
        if bytes.starts_with(b"solid") {
            Self::parse_ascii(&String::from_utf8_lossy(bytes))
        } else {
            Self::parse_binary(bytes)
        }
    }

    fn parse_binary(bytes: &[u8]) -> Result<Self, MeshError> {
        let n_triangles = binary_triangle_count(bytes).unwrap_or(0);
        let body = bytes.get(BINARY_HEADER_SIZE + 4..).unwrap_or(&[]);
        if bytes.len() < BINARY_HEADER_SIZE + 4
            || body.len() < n_triangles as usize * BINARY_TRIANGLE_SIZE
        {
            return Err(MeshError::TruncatedBinary(n_triangles, body.len()));
        }

        let mut cursor = Cursor::new(body);
        let mut triangles = Vec::with_capacity(n_triangles as usize);
        for _ in 0..n_triangles {
            // Normal is recomputed by anyone who needs it
            for _ in 0..3 {
                cursor.read_f32::<LittleEndian>()?;
            }
            let mut triangle = [[0.0; 3]; 3];
            for vertex in triangle.iter_mut() {
                for coord in vertex.iter_mut() {
                    *coord = cursor.read_f32::<LittleEndian>()? as f64;
                }
            }
            cursor.read_u16::<LittleEndian>()?; // attribute byte count
            triangles.push(triangle);
        }
        Ok(Self { triangles })
    }

    fn parse_ascii(text: &str) -> Result<Self, MeshError> {
        let mut triangles = Vec::new();
        let mut current: Vec<Vertex> = Vec::with_capacity(3);
        for line in text.lines() {
            let line = line.trim();
            let Some(coords) = line.strip_prefix("vertex") else {
                continue;
            };
            let parsed: Vec<f64> = coords
                .split_whitespace()
                .map(|c| c.parse::<f64>())
                .collect::<Result<_, _>>()
                .map_err(|_| MeshError::BadVertex(line.to_string()))?;
            if parsed.len() != 3 {
                return Err(MeshError::BadVertex(line.to_string()));
            }
            current.push([parsed[0], parsed[1], parsed[2]]);
            if current.len() == 3 {
                triangles.push([current[0], current[1], current[2]]);
                current.clear();
            }
        }
        Ok(Self { triangles })
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.triangles.iter().flat_map(|t| t.iter())
    }

    /// Smallest and largest corner of the axis-aligned bounding box
    pub fn bounding_box(&self) -> Option<(Vertex, Vertex)> {
        let mut vertices = self.vertices();
        let first = *vertices.next()?;
        Some(vertices.fold((first, first), |(mut lo, mut hi), v| {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(v[axis]);
                hi[axis] = hi[axis].max(v[axis]);
            }
            (lo, hi)
        }))
    }
}

fn binary_triangle_count(bytes: &[u8]) -> Option<u32> {
    let mut count = bytes.get(BINARY_HEADER_SIZE..BINARY_HEADER_SIZE + 4)?;
    count.read_u32::<LittleEndian>().ok()
}

/// The 12 triangles covering the faces of an axis-aligned box
pub fn box_triangles(lo: Vertex, hi: Vertex) -> Vec<Triangle> {
    let corners = [
        [lo[0], lo[1], lo[2]],
        [hi[0], lo[1], lo[2]],
        [hi[0], hi[1], lo[2]],
        [lo[0], hi[1], lo[2]],
        [lo[0], lo[1], hi[2]],
        [hi[0], lo[1], hi[2]],
        [hi[0], hi[1], hi[2]],
        [lo[0], hi[1], hi[2]],
    ];
    const FACES: [[usize; 3]; 12] = [
        [0, 3, 7],
        [0, 4, 7],
        [0, 4, 5],
        [0, 1, 5],
        [1, 5, 6],
        [1, 2, 6],
        [3, 7, 6],
        [3, 2, 6],
        [0, 3, 2],
        [0, 1, 2],
        [4, 7, 6],
        [4, 5, 6],
    ];
    FACES
        .iter()
        .map(|[a, b, c]| [corners[*a], corners[*b], corners[*c]])
        .collect()
}
