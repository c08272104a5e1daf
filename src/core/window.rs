//! Neighborhood windows and boundary handling.
//!
//! A [`Window`] is a radius-parameterized neighborhood shape with a
//! precomputed table of relative offsets. Gathering a neighborhood combines
//! the offset table with a [`BoundaryPolicy`] that decides what happens when
//! an offset falls outside the raster's region.

use crate::raster::Raster;
use crate::types::{Pixel, SampleValue};
use serde::{Deserialize, Serialize};

/// Behavior for neighborhood offsets that fall outside the raster region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BoundaryPolicy {
    /// Exclude the sample; the reduction denominator shrinks.
    #[default]
    Skip,
    /// Substitute the nearest in-bounds pixel.
    Clamp,
    /// Substitute zero; the padded sample still counts.
    ZeroPad,
}

/// One gathered neighborhood sample: relative offset plus widened value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub offset: (isize, isize),
    pub value: SampleValue,
}

impl Sample {
    /// Euclidean distance of this sample's offset from the window center.
    pub fn distance(&self) -> f64 {
        let (dr, dc) = self.offset;
        ((dr * dr + dc * dc) as f64).sqrt()
    }
}

/// Radius-parameterized rectangular neighborhood shape.
#[derive(Debug, Clone)]
pub struct Window {
    radius: (usize, usize),
    offsets: Vec<(isize, isize)>,
}

impl Window {
    /// Window with independent radii along the row and column axes.
    pub fn new(radius_rows: usize, radius_cols: usize) -> Self {
        let rr = radius_rows as isize;
        let rc = radius_cols as isize;
        let mut offsets = Vec::with_capacity((2 * radius_rows + 1) * (2 * radius_cols + 1));
        for dr in -rr..=rr {
            for dc in -rc..=rc {
                offsets.push((dr, dc));
            }
        }
        Self {
            radius: (radius_rows, radius_cols),
            offsets,
        }
    }

    /// Square window with the same radius on both axes.
    pub fn uniform(radius: usize) -> Self {
        Self::new(radius, radius)
    }

    pub fn radius(&self) -> (usize, usize) {
        self.radius
    }

    /// Full neighborhood size, `(2*r_rows + 1) * (2*r_cols + 1)`.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    pub fn offsets(&self) -> &[(isize, isize)] {
        &self.offsets
    }

    /// Gather the neighborhood of the pixel at absolute index `(row, col)`
    /// into `out`, which is cleared first and may be reused across calls.
    ///
    /// `(row, col)` must lie inside the raster's region; out-of-bounds
    /// neighbor offsets are resolved by `policy`.
    pub fn gather<T: Pixel>(
        &self,
        raster: &Raster<T>,
        row: usize,
        col: usize,
        policy: BoundaryPolicy,
        out: &mut Vec<Sample>,
    ) {
        out.clear();
        let region = raster.region();
        let row_lo = region.row as isize;
        let col_lo = region.col as isize;
        let row_hi = row_lo + region.rows as isize - 1;
        let col_hi = col_lo + region.cols as isize - 1;

        for &(dr, dc) in &self.offsets {
            let r = row as isize + dr;
            let c = col as isize + dc;
            let inside = r >= row_lo && r <= row_hi && c >= col_lo && c <= col_hi;
            let value = if inside {
                raster.sample(r as usize, c as usize)
            } else {
                match policy {
                    BoundaryPolicy::Skip => continue,
                    BoundaryPolicy::Clamp => {
                        raster.sample(r.clamp(row_lo, row_hi) as usize, c.clamp(col_lo, col_hi) as usize)
                    }
                    BoundaryPolicy::ZeroPad => 0.0,
                }
            };
            out.push(Sample {
                offset: (dr, dc),
                value,
            });
        }
    }
}

/// View over one gathered neighborhood with the shared statistics helpers.
#[derive(Debug, Clone, Copy)]
pub struct Neighborhood<'a> {
    samples: &'a [Sample],
}

impl<'a> Neighborhood<'a> {
    pub fn new(samples: &'a [Sample]) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        self.samples
    }

    /// Value at the window center (offset `(0, 0)`), when present.
    pub fn center(&self) -> Option<SampleValue> {
        self.samples
            .iter()
            .find(|s| s.offset == (0, 0))
            .map(|s| s.value)
    }

    /// Arithmetic mean over the gathered samples; 0 for an empty set.
    pub fn mean(&self) -> SampleValue {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.samples.iter().map(|s| s.value).sum();
        sum / self.samples.len() as f64
    }

    /// Two-pass population mean and variance over the gathered samples.
    pub fn mean_variance(&self) -> (SampleValue, SampleValue) {
        if self.samples.is_empty() {
            return (0.0, 0.0);
        }
        let mean = self.mean();
        let ss: f64 = self
            .samples
            .iter()
            .map(|s| (s.value - mean) * (s.value - mean))
            .sum();
        (mean, ss / self.samples.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{Geometry, Raster, Region};
    use ndarray::array;

    fn raster_3x3() -> Raster<f32> {
        let data = array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        Raster::from_array(data, Geometry::default())
    }

    #[test]
    fn test_window_size() {
        assert_eq!(Window::uniform(1).len(), 9);
        assert_eq!(Window::new(2, 1).len(), 15);
        assert_eq!(Window::uniform(0).len(), 1);
    }

    #[test]
    fn test_skip_shrinks_corner_neighborhood() {
        let raster = raster_3x3();
        let window = Window::uniform(1);
        let mut buf = Vec::new();
        window.gather(&raster, 0, 0, BoundaryPolicy::Skip, &mut buf);
        // Corner pixel keeps only the in-bounds quadrant of the 3x3 window
        assert_eq!(buf.len(), 4);
        let n = Neighborhood::new(&buf);
        assert_eq!(n.center(), Some(1.0));
    }

    #[test]
    fn test_zero_pad_keeps_full_count() {
        let raster = raster_3x3();
        let window = Window::uniform(1);
        let mut buf = Vec::new();
        window.gather(&raster, 0, 0, BoundaryPolicy::ZeroPad, &mut buf);
        assert_eq!(buf.len(), 9);
        let sum: f64 = buf.iter().map(|s| s.value).sum();
        assert_eq!(sum, 1.0 + 2.0 + 4.0 + 5.0);
    }

    #[test]
    fn test_clamp_repeats_border_pixels() {
        let raster = raster_3x3();
        let window = Window::uniform(1);
        let mut buf = Vec::new();
        window.gather(&raster, 0, 0, BoundaryPolicy::Clamp, &mut buf);
        assert_eq!(buf.len(), 9);
        // Offset (-1, -1) clamps to the corner pixel itself
        assert_eq!(buf[0].value, 1.0);
    }

    #[test]
    fn test_gather_respects_region_offset() {
        let raster = raster_3x3();
        let roi = raster.extract(Region::new(1, 1, 2, 2)).unwrap();
        let window = Window::uniform(1);
        let mut buf = Vec::new();
        window.gather(&roi, 1, 1, BoundaryPolicy::Skip, &mut buf);
        // (1, 1) is the ROI corner, so only the 2x2 in-bounds block remains
        assert_eq!(buf.len(), 4);
        let values: Vec<f64> = buf.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![5.0, 6.0, 8.0, 9.0]);
    }

    #[test]
    fn test_neighborhood_statistics() {
        let samples = vec![
            Sample { offset: (0, -1), value: 2.0 },
            Sample { offset: (0, 0), value: 4.0 },
            Sample { offset: (0, 1), value: 6.0 },
        ];
        let n = Neighborhood::new(&samples);
        let (mean, var) = n.mean_variance();
        assert_eq!(mean, 4.0);
        assert_eq!(var, 8.0 / 3.0);
        assert_eq!(n.center(), Some(4.0));
    }
}
