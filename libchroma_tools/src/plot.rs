//! Rendering of every chart as a PNG through the plotters bitmap backend.
//!
//! The functions here only draw: all binning and physics happen upstream and arrive as
//! histograms, studies or scenes.
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use std::str::FromStr;

use super::error::PlotError;
use super::fresnel::{reflectance_p, reflectance_s};
use super::histogram::{Histogram1D, Histogram2D};
use super::projection::CubeFace;
use super::reflectivity::ReflectivityStudy;
use super::stl_mesh::{box_triangles, Mesh, Vertex};

const FONT: &str = "sans-serif";
const COLOUR_BAR_STEPS: usize = 128;
const CONTOUR_LEVELS: usize = 10;
const THEORY_STEPS: usize = 180;

pub const DETECTION_PURPLE: RGBColor = RGBColor(0x97, 0x2A, 0xA8);
const SHEET_BOX_COLOR: RGBColor = RGBColor(0xA0, 0x9E, 0x00);
const ORIGIN_COLOR: RGBColor = RGBColor(0x00, 0xFF, 0x00);
const S_POLARIZATION_COLOR: RGBColor = RGBColor(0x39, 0x00, 0xBF);
const P_POLARIZATION_COLOR: RGBColor = RGBColor(0x00, 0xA3, 0xBF);

/// Meshes of light sensors and their packaging, drawn nearly transparent
const SENSOR_MESHES: [&str; 6] = [
    "FBK_Packages",
    "HPK_Packages",
    "Photocathode",
    "PMT_Body",
    "PMT_Support",
    "Tiles",
];

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

/// Maps a value in [0, 1] to a colour
pub trait ColorScale {
    fn color_at(&self, u: f64) -> RGBColor;
}

impl ColorScale for colorous::Gradient {
    fn color_at(&self, u: f64) -> RGBColor {
        let (r, g, b) = self.eval_continuous(clamp_unit(u)).as_tuple();
        RGBColor(r, g, b)
    }
}

fn clamp_unit(u: f64) -> f64 {
    if u.is_nan() {
        0.0
    } else {
        u.clamp(0.0, 1.0)
    }
}

/// Piecewise-linear colormap through evenly spaced colour stops
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinearColormap {
    stops: Vec<(u8, u8, u8)>,
}

impl LinearColormap {
    pub fn new(stops: Vec<(u8, u8, u8)>) -> Self {
        Self { stops }
    }

    /// black -> purple -> white
    pub fn detected_photons() -> Self {
        Self::new(vec![(0, 0, 0), (0x97, 0x2A, 0xA8), (255, 255, 255)])
    }

    /// white -> red -> black
    pub fn emission_order() -> Self {
        Self::new(vec![(255, 255, 255), (255, 0, 0), (0, 0, 0)])
    }
}

impl ColorScale for LinearColormap {
    fn color_at(&self, u: f64) -> RGBColor {
        match self.stops.as_slice() {
            [] => BLACK,
            [only] => RGBColor(only.0, only.1, only.2),
            stops => {
                let scaled = clamp_unit(u) * (stops.len() - 1) as f64;
                let idx = (scaled.floor() as usize).min(stops.len() - 2);
                let t = scaled - idx as f64;
                let (lo, hi) = (stops[idx], stops[idx + 1]);
                let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
                RGBColor(lerp(lo.0, hi.0), lerp(lo.1, hi.1), lerp(lo.2, hi.2))
            }
        }
    }
}

/// How the cube-face light map is drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LightMapStyle {
    /// One cell per bin
    #[default]
    Histogram,
    /// Cells quantized into filled contour levels
    Contour,
}

impl FromStr for LightMapStyle {
    type Err = PlotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "histogram" => Ok(Self::Histogram),
            "contour" => Ok(Self::Contour),
            _ => Err(PlotError::UnknownStyle(s.to_string())),
        }
    }
}

impl LightMapStyle {
    fn levels(&self) -> Option<usize> {
        match self {
            Self::Histogram => None,
            Self::Contour => Some(CONTOUR_LEVELS),
        }
    }
}

/// Snap a normalized value onto one of `levels` evenly spaced levels
fn quantize(u: f64, levels: Option<usize>) -> f64 {
    match levels {
        Some(levels) if levels > 1 => {
            let level = ((clamp_unit(u) * levels as f64).floor() as usize).min(levels - 1);
            level as f64 / (levels - 1) as f64
        }
        _ => clamp_unit(u),
    }
}

/// Integer with comma thousands separators
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, digit) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Legend of the detection-count histogram: mean and standard deviation rounded to integers
pub fn summary_label(mean: f64, std_dev: f64) -> String {
    format!("μ = {}, σ = {}", mean.round() as i64, std_dev.round() as i64)
}

/// Nonzero cells of a 2D histogram as filled rectangles
fn heatmap_cells<'a>(
    hist: &'a Histogram2D,
    scale: &'a dyn ColorScale,
    norm: f64,
    levels: Option<usize>,
) -> impl Iterator<Item = Rectangle<(f64, f64)>> + 'a {
    let x_edges = hist.x_axis.edges();
    let y_edges = hist.y_axis.edges();
    hist.counts
        .indexed_iter()
        .filter(|(_, count)| **count > 0.0)
        .map(move |((i, j), count)| {
            let color = scale.color_at(quantize(count / norm, levels));
            Rectangle::new(
                [(x_edges[i], y_edges[j]), (x_edges[i + 1], y_edges[j + 1])],
                color.filled(),
            )
        })
}

fn draw_colour_bar(
    area: &Area,
    scale: &dyn ColorScale,
    max: f64,
    label: &str,
) -> Result<(), PlotError> {
    let mut bar = ChartBuilder::on(area)
        .margin_top(50)
        .margin_bottom(50)
        .margin_right(10)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..1.0, 0.0..max)?;
    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc(label)
        .draw()?;
    bar.draw_series((0..COLOUR_BAR_STEPS).map(|step| {
        let lo = step as f64 / COLOUR_BAR_STEPS as f64;
        let hi = (step + 1) as f64 / COLOUR_BAR_STEPS as f64;
        Rectangle::new(
            [(0.0, lo * max), (1.0, hi * max)],
            scale.color_at(lo).filled(),
        )
    }))?;
    Ok(())
}

/// Axis titles of a single-panel chart
#[derive(Debug, Clone, Copy)]
pub struct ChartLabels<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
}

/// Heatmap of a 2D histogram with a colour bar of raw counts
pub fn draw_heatmap(
    path: &Path,
    hist: &Histogram2D,
    scale: &dyn ColorScale,
    labels: ChartLabels,
    bar_label: &str,
) -> Result<(), PlotError> {
    let max = hist.max_count();
    if max <= 0.0 {
        return Err(PlotError::NoData);
    }
    let root = BitMapBackend::new(path, (1200, 800)).into_drawing_area();
    root.fill(&WHITE)?;
    let (main, bar) = root.split_horizontally(1060);

    let mut chart = ChartBuilder::on(&main)
        .caption(labels.title, (FONT, 28))
        .margin(15)
        .x_label_area_size(45)
        .y_label_area_size(65)
        .build_cartesian_2d(
            hist.x_axis.min..hist.x_axis.max,
            hist.y_axis.min..hist.y_axis.max,
        )?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(labels.x_desc)
        .y_desc(labels.y_desc)
        .draw()?;
    chart.plotting_area().fill(&scale.color_at(0.0))?;
    chart.draw_series(heatmap_cells(hist, scale, max, None))?;

    draw_colour_bar(&bar, scale, max, bar_label)?;
    root.present()?;
    Ok(())
}

/// One solid bar per channel
pub fn draw_channel_counts(path: &Path, counts: &[f64]) -> Result<(), PlotError> {
    if counts.is_empty() {
        return Err(PlotError::NoData);
    }
    let max = counts.iter().cloned().fold(0.0, f64::max).max(1.0);
    let root = BitMapBackend::new(path, (1200, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Bar Chart of Photon Count Over Channel IDs", (FONT, 28))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..counts.len() as f64, 0.0..max * 1.05)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Channel ID")
        .y_desc("Photon Count")
        .draw()?;
    chart.draw_series(counts.iter().enumerate().map(|(channel, count)| {
        Rectangle::new(
            [(channel as f64, 0.0), (channel as f64 + 1.0, *count)],
            BLACK.filled(),
        )
    }))?;
    root.present()?;
    Ok(())
}

/// Density histogram of detection counts with a mean/sigma legend
pub fn draw_count_histogram(
    path: &Path,
    hist: &Histogram1D,
    mean: f64,
    std_dev: f64,
) -> Result<(), PlotError> {
    let max = hist.max_count();
    if max <= 0.0 {
        return Err(PlotError::NoData);
    }
    let root = BitMapBackend::new(path, (1000, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Photon detection count histogram", (FONT, 28))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(80)
        .build_cartesian_2d(hist.axis.min..hist.axis.max, 0.0..max * 1.1)?;
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Number of photons detected")
        .y_desc("Proportion of occurences")
        .draw()?;

    let edges = hist.axis.edges();
    chart
        .draw_series(hist.counts.iter().enumerate().map(|(bin, density)| {
            Rectangle::new(
                [(edges[bin], 0.0), (edges[bin + 1], *density)],
                DETECTION_PURPLE.filled(),
            )
        }))?
        .label(summary_label(mean, std_dev))
        .legend(|(x, y)| {
            Rectangle::new([(x, y - 5), (x + 15, y + 5)], DETECTION_PURPLE.filled())
        });
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

/// Counts shown under a light map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionFooter {
    pub simulated: u64,
    pub detected: u64,
}

impl DetectionFooter {
    pub fn fraction(&self) -> f64 {
        if self.simulated == 0 {
            0.0
        } else {
            self.detected as f64 / self.simulated as f64
        }
    }

    pub fn lines(&self) -> [String; 3] {
        [
            format!("Photons Simulated: {}", group_thousands(self.simulated)),
            format!("Photons Detected: {}", group_thousands(self.detected)),
            format!("Fraction Detected: {:.2}", self.fraction()),
        ]
    }
}

/// The six unfolded cube faces on a 2x3 grid, normalised to the brightest bin of any face
pub fn draw_light_map(
    path: &Path,
    faces: &[(CubeFace, Histogram2D)],
    style: LightMapStyle,
    footer: &DetectionFooter,
) -> Result<(), PlotError> {
    let max = faces
        .iter()
        .map(|(_, hist)| hist.max_count())
        .fold(0.0, f64::max);
    if max <= 0.0 {
        return Err(PlotError::NoData);
    }
    let scale = colorous::PLASMA;

    let root = BitMapBackend::new(path, (1200, 900)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("LoLX Detected Photon Heatmap", (FONT, 30))?;
    let (height, width) = (root.dim_in_pixel().1 as i32, root.dim_in_pixel().0 as i32);
    let (main, footer_area) = root.split_vertically(height - 90);
    let (grid, bar) = main.split_horizontally(width - 130);

    for (panel, (face, hist)) in grid.split_evenly((2, 3)).iter().zip(faces.iter()) {
        let mut chart = ChartBuilder::on(panel)
            .caption(face.name(), (FONT, 20))
            .margin(8)
            .x_label_area_size(35)
            .y_label_area_size(45)
            .build_cartesian_2d(
                hist.x_axis.min..hist.x_axis.max,
                hist.y_axis.min..hist.y_axis.max,
            )?;
        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh();
        match face {
            CubeFace::West => {
                mesh.x_labels(2).y_desc("Location (mm)");
            }
            CubeFace::North => {
                mesh.y_labels(2).x_desc("Location (mm)");
            }
            _ => {
                mesh.x_labels(0).y_labels(0);
            }
        }
        mesh.draw()?;
        chart.plotting_area().fill(&scale.color_at(0.0))?;
        chart.draw_series(heatmap_cells(hist, &scale, max, style.levels()))?;
    }

    draw_colour_bar(&bar, &scale, 1.0, "Light Intensity (Normalized)")?;

    let text_style = (FONT, 18)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    for (row, line) in footer.lines().iter().enumerate() {
        footer_area.draw_text(line, &text_style, (width / 2, 5 + 26 * row as i32))?;
    }
    root.present()?;
    Ok(())
}

/// How a component mesh is painted in the 3D view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshRole {
    /// The enclosing sphere, barely visible
    Envelope,
    /// Sensors and packaging, nearly transparent
    Sensor,
    /// Everything else, solid red
    Solid,
}

impl MeshRole {
    pub fn of(name: &str) -> Self {
        if name == "Sphere" {
            Self::Envelope
        } else if SENSOR_MESHES.contains(&name) {
            Self::Sensor
        } else {
            Self::Solid
        }
    }
}

/// A component mesh named after its file stem
#[derive(Debug, Clone, PartialEq)]
pub struct MeshLayer {
    pub name: String,
    pub mesh: Mesh,
}

/// Everything drawn in the 3D geometry view
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene3D {
    pub origins: Vec<Vertex>,
    pub final_positions: Option<Vec<Vertex>>,
    pub meshes: Vec<MeshLayer>,
}

impl Scene3D {
    /// Half-width of the cubic view: the largest x, y or z over all mesh vertices. Falls
    /// back to the origins when no mesh is drawn.
    pub fn axis_range(&self) -> f64 {
        let mut range = self
            .meshes
            .iter()
            .flat_map(|layer| layer.mesh.vertices())
            .fold(0.0_f64, |acc, v| acc.max(v[0]).max(v[1]).max(v[2]));
        if range <= 0.0 {
            range = self
                .origins
                .iter()
                .flat_map(|v| v.iter())
                .fold(0.0_f64, |acc, c| acc.max(c.abs()));
        }
        if range > 0.0 {
            range
        } else {
            1.0
        }
    }
}

/// Plotters' 3D charts are y-up, the detector is z-up
fn to_chart(v: &Vertex) -> (f64, f64, f64) {
    (v[0], v[2], v[1])
}

pub fn draw_scene(path: &Path, scene: &Scene3D) -> Result<(), PlotError> {
    let range = scene.axis_range();
    let root = BitMapBackend::new(path, (1000, 1000)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("STL Files Reconstruction", (FONT, 28))
        .margin(20)
        .build_cartesian_3d(-range..range, -range..range, -range..range)?;
    chart.with_projection(|mut pb| {
        pb.yaw = 0.6;
        pb.pitch = 0.4;
        pb.scale = 0.8;
        pb.into_matrix()
    });
    chart.configure_axes().draw()?;

    let mut sensor_colors = colorous::TABLEAU10.iter().cycle();
    for layer in scene.meshes.iter() {
        let style = match MeshRole::of(&layer.name) {
            MeshRole::Envelope => BLUE.mix(0.05).filled(),
            MeshRole::Sensor => {
                let (r, g, b) = sensor_colors
                    .next()
                    .map(|c| c.as_tuple())
                    .unwrap_or((0, 0, 0));
                RGBColor(r, g, b).mix(0.02).filled()
            }
            MeshRole::Solid => RED.filled(),
        };
        chart.draw_series(
            layer
                .mesh
                .vertices()
                .map(|v| Circle::new(to_chart(v), 1, style)),
        )?;

        if layer.name == "Sheet" {
            if let Some((lo, hi)) = layer.mesh.bounding_box() {
                chart.draw_series(box_triangles(lo, hi).iter().map(|triangle| {
                    Polygon::new(
                        triangle.iter().map(to_chart).collect::<Vec<_>>(),
                        SHEET_BOX_COLOR.mix(0.1).filled(),
                    )
                }))?;
            }
        }
    }

    if let Some(finals) = &scene.final_positions {
        let order = LinearColormap::emission_order();
        let last = finals.len().saturating_sub(1).max(1) as f64;
        chart
            .draw_series(finals.iter().enumerate().map(|(idx, v)| {
                Circle::new(to_chart(v), 2, order.color_at(idx as f64 / last).filled())
            }))?
            .label("FinalPosition")
            .legend(|(x, y)| Circle::new((x, y), 3, RED.filled()));
    }

    chart
        .draw_series(
            scene
                .origins
                .iter()
                .map(|v| Cross::new(to_chart(v), 4, ORIGIN_COLOR.stroke_width(2))),
        )?
        .label("Origin")
        .legend(|(x, y)| Cross::new((x, y), 4, ORIGIN_COLOR.stroke_width(2)));
    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;
    root.present()?;
    Ok(())
}

fn padded_range(values: &[f64], pad_fraction: f64) -> (f64, f64) {
    let (lo, hi) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    if !lo.is_finite() || !hi.is_finite() {
        return (-1.0, 1.0);
    }
    let pad = ((hi - lo) * pad_fraction).max(1e-3);
    (lo - pad, hi + pad)
}

/// Simulated reflectivity against the Fresnel curves, with a residual panel underneath
pub fn draw_reflectivity(path: &Path, study: &ReflectivityStudy) -> Result<(), PlotError> {
    if study.angles.is_empty() {
        return Err(PlotError::NoData);
    }
    let root = BitMapBackend::new(path, (1200, 1000)).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled("Reflectivity Comparison Plot", (FONT, 30))?;
    let (upper, lower) = root.split_vertically(620);

    let mut comparison = ChartBuilder::on(&upper)
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..90.0, 0.0..1.05)?;
    comparison
        .configure_mesh()
        .x_desc("Angle of Incidence (Degrees)")
        .y_desc("Reflectivity")
        .draw()?;

    comparison
        .draw_series(
            study
                .angles
                .iter()
                .zip(study.simulated.iter())
                .map(|(angle, r)| Circle::new((*angle, *r), 3, BLUE.filled())),
        )?
        .label(format!(
            "Simulated Reflectivity (n2 = {}, λ = {} nm)",
            study.surface, study.wavelength
        ))
        .legend(|(x, y)| Circle::new((x + 7, y), 3, BLUE.filled()));

    let curve: Vec<(f64, f64, f64)> = (0..=THEORY_STEPS)
        .map(|step| {
            let angle = 90.0 * step as f64 / THEORY_STEPS as f64;
            (
                angle,
                reflectance_s(angle, &study.incident, &study.surface),
                reflectance_p(angle, &study.incident, &study.surface),
            )
        })
        .collect();
    comparison
        .draw_series(LineSeries::new(
            curve.iter().map(|(a, rs, _)| (*a, *rs)),
            S_POLARIZATION_COLOR.stroke_width(2),
        ))?
        .label("Theoretical Reflectivity (S-Polarization)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &S_POLARIZATION_COLOR));
    comparison
        .draw_series(LineSeries::new(
            curve.iter().map(|(a, _, rp)| (*a, *rp)),
            P_POLARIZATION_COLOR.stroke_width(2),
        ))?
        .label("Theoretical Reflectivity (P-Polarization)")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &P_POLARIZATION_COLOR));
    comparison
        .draw_series(LineSeries::new(
            curve.iter().map(|(a, rs, rp)| (*a, 0.5 * (rs + rp))),
            RED.stroke_width(2),
        ))?
        .label("Average")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
    comparison
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    let (lo, hi) = padded_range(&study.residuals, 0.1);
    let mut residuals = ChartBuilder::on(&lower)
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..90.0, lo..hi)?;
    residuals
        .configure_mesh()
        .x_desc("Angle of Incidence (Degrees)")
        .y_desc("Residuals (Simulation - Average)")
        .draw()?;
    residuals
        .draw_series(
            study
                .angles
                .iter()
                .zip(study.residuals.iter())
                .map(|(angle, r)| Circle::new((*angle, *r), 3, BLUE.filled())),
        )?
        .label("Residuals")
        .legend(|(x, y)| Circle::new((x + 7, y), 3, BLUE.filled()));
    residuals
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_colormap() {
        let cmap = LinearColormap::detected_photons();
        assert_eq!(cmap.color_at(0.0), RGBColor(0, 0, 0));
        assert_eq!(cmap.color_at(0.5), DETECTION_PURPLE);
        assert_eq!(cmap.color_at(1.0), RGBColor(255, 255, 255));
        assert_eq!(cmap.color_at(0.25), RGBColor(0x4C, 0x15, 0x54));
        // out of range values clamp
        assert_eq!(cmap.color_at(-3.0), cmap.color_at(0.0));
        assert_eq!(cmap.color_at(f64::NAN), cmap.color_at(0.0));
        assert_eq!(cmap.color_at(7.0), cmap.color_at(1.0));
    }

    #[test]
    fn test_origin_marker_is_pure_green() {
        assert_eq!(ORIGIN_COLOR, GREEN);
    }

    #[test]
    fn test_degenerate_colormaps() {
        assert_eq!(LinearColormap::new(vec![]).color_at(0.3), BLACK);
        assert_eq!(
            LinearColormap::new(vec![(1, 2, 3)]).color_at(0.9),
            RGBColor(1, 2, 3)
        );
    }

    #[test]
    fn test_quantize() {
        assert_eq!(quantize(0.37, None), 0.37);
        assert_eq!(quantize(0.0, Some(5)), 0.0);
        assert_eq!(quantize(0.39, Some(5)), 0.25);
        assert_eq!(quantize(1.0, Some(5)), 1.0);
    }

    #[test]
    fn test_light_map_style() {
        assert_eq!("contour".parse::<LightMapStyle>().unwrap(), LightMapStyle::Contour);
        assert_eq!("Histogram".parse::<LightMapStyle>().unwrap(), LightMapStyle::Histogram);
        assert!(matches!(
            "surface".parse::<LightMapStyle>(),
            Err(PlotError::UnknownStyle(_))
        ));
    }

    #[test]
    fn test_labels() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(500000000), "500,000,000");
        assert_eq!(summary_label(41.6, 6.4), "μ = 42, σ = 6");

        let footer = DetectionFooter {
            simulated: 12000,
            detected: 3000,
        };
        assert_eq!(
            footer.lines(),
            [
                String::from("Photons Simulated: 12,000"),
                String::from("Photons Detected: 3,000"),
                String::from("Fraction Detected: 0.25"),
            ]
        );
        let empty = DetectionFooter {
            simulated: 0,
            detected: 0,
        };
        assert_eq!(empty.fraction(), 0.0);
    }

    #[test]
    fn test_mesh_roles() {
        assert_eq!(MeshRole::of("Sphere"), MeshRole::Envelope);
        assert_eq!(MeshRole::of("Tiles"), MeshRole::Sensor);
        assert_eq!(MeshRole::of("Sheet"), MeshRole::Solid);
    }

    #[test]
    fn test_axis_range() {
        let mut scene = Scene3D {
            origins: vec![[0.0, 0.0, -40.0]],
            ..Default::default()
        };
        assert_eq!(scene.axis_range(), 40.0);
        scene.meshes.push(MeshLayer {
            name: String::from("Sheet"),
            mesh: Mesh {
                triangles: box_triangles([-5.0, -2.0, -80.0], [5.0, 12.0, 1.0]),
            },
        });
        assert_eq!(scene.axis_range(), 12.0);
        assert_eq!(Scene3D::default().axis_range(), 1.0);
    }

    #[test]
    fn test_padded_range() {
        assert_eq!(padded_range(&[], 0.1), (-1.0, 1.0));
        let (lo, hi) = padded_range(&[0.0, 1.0], 0.1);
        assert!((lo + 0.1).abs() < 1e-12 && (hi - 1.1).abs() < 1e-12);
        let (lo, hi) = padded_range(&[0.5, 0.5], 0.1);
        assert!(lo < 0.5 && hi > 0.5);
    }
}
