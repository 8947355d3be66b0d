use ndarray::Array2;

use super::error::HistogramError;
use super::stats::min_max;

/// An inclusive axis range split into uniform bins. The last bin includes its right edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BinAxis {
    pub min: f64,
    pub max: f64,
    pub bins: usize,
}

impl BinAxis {
    pub fn new(min: f64, max: f64, bins: usize) -> Result<Self, HistogramError> {
        if bins == 0 {
            return Err(HistogramError::NoBins);
        }
        if !(min.is_finite() && max.is_finite()) || max <= min {
            return Err(HistogramError::BadRange(min, max));
        }
        Ok(Self { min, max, bins })
    }

    /// Axis spanning the data. A degenerate range is widened by 0.5 on each side.
    pub fn from_data(values: &[f64], bins: usize) -> Result<Self, HistogramError> {
        let (mut min, mut max) = min_max(values)?;
        if min == max {
            min -= 0.5;
            max += 0.5;
        }
        Self::new(min, max, bins)
    }

    pub fn width(&self) -> f64 {
        (self.max - self.min) / self.bins as f64
    }

    pub fn edges(&self) -> Vec<f64> {
        (0..=self.bins)
            .map(|i| self.min + i as f64 * self.width())
            .collect()
    }

    /// Bin of a value, or None if it falls outside the axis
    pub fn bin_of(&self, value: f64) -> Option<usize> {
        if !(self.min..=self.max).contains(&value) {
            return None;
        }
        let idx = ((value - self.min) / (self.max - self.min) * self.bins as f64) as usize;
        Some(idx.min(self.bins - 1))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram1D {
    pub axis: BinAxis,
    pub counts: Vec<f64>,
}

impl Histogram1D {
    pub fn fill(values: &[f64], axis: BinAxis) -> Self {
        let mut counts = vec![0.0; axis.bins];
        for bin in values.iter().filter_map(|v| axis.bin_of(*v)) {
            counts[bin] += 1.0;
        }
        Self { axis, counts }
    }

    /// Scale the counts so that the histogram integrates to one
    pub fn into_density(mut self) -> Self {
        let total: f64 = self.counts.iter().sum();
        if total > 0.0 {
            let norm = total * self.axis.width();
            self.counts.iter_mut().for_each(|c| *c /= norm);
        }
        self
    }

    pub fn max_count(&self) -> f64 {
        self.counts.iter().cloned().fold(0.0, f64::max)
    }
}

/// Counts indexed [x bin, y bin]
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram2D {
    pub x_axis: BinAxis,
    pub y_axis: BinAxis,
    pub counts: Array2<f64>,
}

impl Histogram2D {
    pub fn fill(
        xs: &[f64],
        ys: &[f64],
        x_axis: BinAxis,
        y_axis: BinAxis,
    ) -> Result<Self, HistogramError> {
        if xs.len() != ys.len() {
            return Err(HistogramError::MismatchedAxes(xs.len(), ys.len()));
        }
        let mut counts = Array2::<f64>::zeros([x_axis.bins, y_axis.bins]);
        for (x, y) in xs.iter().zip(ys.iter()) {
            if let (Some(i), Some(j)) = (x_axis.bin_of(*x), y_axis.bin_of(*y)) {
                counts[[i, j]] += 1.0;
            }
        }
        Ok(Self {
            x_axis,
            y_axis,
            counts,
        })
    }

    /// Histogram with the same number of bins on both axes, each spanning its data
    pub fn from_data(xs: &[f64], ys: &[f64], bins: usize) -> Result<Self, HistogramError> {
        let x_axis = BinAxis::from_data(xs, bins)?;
        let y_axis = BinAxis::from_data(ys, bins)?;
        Self::fill(xs, ys, x_axis, y_axis)
    }

    pub fn max_count(&self) -> f64 {
        self.counts.iter().cloned().fold(0.0, f64::max)
    }

    pub fn total(&self) -> f64 {
        self.counts.sum()
    }
}
