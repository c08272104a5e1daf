//! Raster buffers and index-space regions.
//!
//! A [`Raster`] owns one band of pixel data plus the geometric metadata
//! (origin, spacing) needed to place it on the ground. A
//! [`MultibandRaster`] stacks several equally-sized bands.

use crate::types::{sample_of, pixel_of, Pixel, RasterError, RasterResult, SampleValue};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Geometric metadata for a raster: world origin and per-axis pixel spacing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// World coordinates of the first pixel (row axis, column axis)
    pub origin: [f64; 2],
    /// Pixel spacing along (row axis, column axis)
    pub spacing: [f64; 2],
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            origin: [0.0, 0.0],
            spacing: [1.0, 1.0],
        }
    }
}

/// Rectangular sub-extent of a raster's index space: origin index plus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub row: usize,
    pub col: usize,
    pub rows: usize,
    pub cols: usize,
}

impl Region {
    pub fn new(row: usize, col: usize, rows: usize, cols: usize) -> Self {
        Self { row, col, rows, cols }
    }

    /// Region anchored at the index-space origin.
    pub fn with_size(rows: usize, cols: usize) -> Self {
        Self::new(0, 0, rows, cols)
    }

    pub fn num_pixels(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Whether the absolute index `(row, col)` falls inside this region.
    pub fn contains(&self, row: isize, col: isize) -> bool {
        row >= self.row as isize
            && col >= self.col as isize
            && row < (self.row + self.rows) as isize
            && col < (self.col + self.cols) as isize
    }

    /// Whether `other` lies fully inside (or equals) this region.
    pub fn contains_region(&self, other: &Region) -> bool {
        other.is_empty()
            || (other.row >= self.row
                && other.col >= self.col
                && other.row + other.rows <= self.row + self.rows
                && other.col + other.cols <= self.col + self.cols)
    }

    /// Intersection of two regions, `None` when they do not overlap.
    pub fn intersect(&self, other: &Region) -> Option<Region> {
        let row = self.row.max(other.row);
        let col = self.col.max(other.col);
        let row_end = (self.row + self.rows).min(other.row + other.rows);
        let col_end = (self.col + self.cols).min(other.col + other.cols);
        if row < row_end && col < col_end {
            Some(Region::new(row, col, row_end - row, col_end - col))
        } else {
            None
        }
    }
}

/// Single-band raster: an owned 2D pixel buffer with geometry and a region
/// anchoring it in index space.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    data: Array2<T>,
    region: Region,
    geometry: Geometry,
}

impl<T: Pixel> Raster<T> {
    /// Wrap an existing buffer; the region is anchored at the origin.
    pub fn from_array(data: Array2<T>, geometry: Geometry) -> Self {
        let (rows, cols) = data.dim();
        Self {
            data,
            region: Region::with_size(rows, cols),
            geometry,
        }
    }

    /// Allocate a zero-filled raster covering `region`.
    pub fn zeros(region: Region, geometry: Geometry) -> Self {
        Self {
            data: Array2::zeros((region.rows, region.cols)),
            region,
            geometry,
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Re-anchor the region at a new index-space origin, keeping the size.
    pub fn anchored_at(mut self, row: usize, col: usize) -> Self {
        self.region.row = row;
        self.region.col = col;
        self
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// (rows, cols) of the backing buffer.
    pub fn dim(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn array(&self) -> &Array2<T> {
        &self.data
    }

    /// Bounds-checked read at an absolute index.
    pub fn get(&self, row: isize, col: isize) -> Option<T> {
        if self.region.contains(row, col) {
            let i = row as usize - self.region.row;
            let j = col as usize - self.region.col;
            Some(self.data[[i, j]])
        } else {
            None
        }
    }

    /// Read at an absolute index known to be inside the region, widened to
    /// the sample type.
    pub(crate) fn sample(&self, row: usize, col: usize) -> SampleValue {
        let i = row - self.region.row;
        let j = col - self.region.col;
        sample_of(self.data[[i, j]])
    }

    /// Bounds-checked write at an absolute index.
    pub fn set(&mut self, row: usize, col: usize, value: T) -> RasterResult<()> {
        if !self.region.contains(row as isize, col as isize) {
            return Err(RasterError::Region(format!(
                "index ({}, {}) outside region {:?}",
                row, col, self.region
            )));
        }
        let i = row - self.region.row;
        let j = col - self.region.col;
        self.data[[i, j]] = value;
        Ok(())
    }

    /// Geometry of a sub-region, with the origin advanced by the index
    /// offset times the spacing.
    pub fn geometry_for(&self, region: &Region) -> Geometry {
        let dr = region.row as f64 - self.region.row as f64;
        let dc = region.col as f64 - self.region.col as f64;
        Geometry {
            origin: [
                self.geometry.origin[0] + dr * self.geometry.spacing[0],
                self.geometry.origin[1] + dc * self.geometry.spacing[1],
            ],
            spacing: self.geometry.spacing,
        }
    }

    /// Extract a copy of `region` (ROI) as a stand-alone raster.
    pub fn extract(&self, region: Region) -> RasterResult<Raster<T>> {
        if !self.region.contains_region(&region) {
            return Err(RasterError::Region(format!(
                "extraction region {:?} not contained in raster region {:?}",
                region, self.region
            )));
        }
        let mut out = Raster::zeros(region, self.geometry_for(&region));
        for i in 0..region.rows {
            for j in 0..region.cols {
                let r = region.row + i;
                let c = region.col + j;
                out.data[[i, j]] = self.data[[r - self.region.row, c - self.region.col]];
            }
        }
        Ok(out)
    }

    /// Convert every pixel to another element type, clamping to its range.
    pub fn cast<U: Pixel>(&self) -> Raster<U> {
        Raster {
            data: self.data.mapv(|v| pixel_of::<U>(sample_of(v))),
            region: self.region,
            geometry: self.geometry,
        }
    }

    /// Minimum and maximum pixel values, `None` for an empty raster.
    pub fn value_range(&self) -> Option<(SampleValue, SampleValue)> {
        let mut it = self.data.iter().map(|&v| sample_of(v));
        let first = it.next()?;
        let mut lo = first;
        let mut hi = first;
        for v in it {
            if v < lo {
                lo = v;
            }
            if v > hi {
                hi = v;
            }
        }
        Some((lo, hi))
    }
}

/// Multi-band raster: `B >= 1` single-band rasters sharing region and
/// geometry, in band order.
#[derive(Debug, Clone, PartialEq)]
pub struct MultibandRaster<T> {
    bands: Vec<Raster<T>>,
}

impl<T: Pixel> MultibandRaster<T> {
    /// Assemble from bands; all bands must share the same region.
    pub fn from_bands(bands: Vec<Raster<T>>) -> RasterResult<Self> {
        let first = bands.first().ok_or_else(|| {
            RasterError::Region("multi-band raster requires at least one band".to_string())
        })?;
        let region = first.region();
        for (b, band) in bands.iter().enumerate() {
            if band.region() != region {
                return Err(RasterError::Region(format!(
                    "band {} region {:?} does not match band 0 region {:?}",
                    b,
                    band.region(),
                    region
                )));
            }
        }
        Ok(Self { bands })
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn region(&self) -> Region {
        self.bands[0].region()
    }

    pub fn geometry(&self) -> Geometry {
        self.bands[0].geometry()
    }

    pub fn bands(&self) -> &[Raster<T>] {
        &self.bands
    }

    /// Extract one band by 0-based index.
    pub fn band(&self, index: usize) -> RasterResult<&Raster<T>> {
        self.bands.get(index).ok_or_else(|| {
            RasterError::Configuration(format!(
                "band index {} out of range for {} bands",
                index,
                self.bands.len()
            ))
        })
    }

    pub fn into_bands(self) -> Vec<Raster<T>> {
        self.bands
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_region_containment() {
        let outer = Region::new(0, 0, 10, 10);
        assert!(outer.contains_region(&Region::new(2, 3, 4, 5)));
        assert!(!outer.contains_region(&Region::new(8, 8, 4, 4)));
        assert!(outer.contains(9, 9));
        assert!(!outer.contains(10, 0));
        assert!(!outer.contains(-1, 0));
    }

    #[test]
    fn test_region_intersection() {
        let a = Region::new(0, 0, 5, 5);
        let b = Region::new(3, 3, 5, 5);
        assert_eq!(a.intersect(&b), Some(Region::new(3, 3, 2, 2)));
        assert_eq!(a.intersect(&Region::new(5, 5, 2, 2)), None);
    }

    #[test]
    fn test_extract_roi() {
        let data = array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]];
        let raster = Raster::from_array(data, Geometry::default());
        let roi = raster.extract(Region::new(1, 1, 2, 2)).unwrap();
        assert_eq!(roi.dim(), (2, 2));
        assert_eq!(roi.get(1, 1), Some(5.0));
        assert_eq!(roi.get(2, 2), Some(9.0));
        assert_eq!(roi.get(0, 0), None);
        assert_eq!(roi.geometry().origin, [1.0, 1.0]);
    }

    #[test]
    fn test_extract_outside_region_fails() {
        let raster = Raster::<f32>::zeros(Region::with_size(3, 3), Geometry::default());
        assert!(raster.extract(Region::new(2, 2, 3, 3)).is_err());
    }

    #[test]
    fn test_multiband_requires_matching_bands() {
        let a = Raster::<f32>::zeros(Region::with_size(3, 3), Geometry::default());
        let b = Raster::<f32>::zeros(Region::with_size(2, 3), Geometry::default());
        assert!(MultibandRaster::from_bands(vec![a.clone(), a.clone()]).is_ok());
        assert!(MultibandRaster::from_bands(vec![a, b]).is_err());
    }

    #[test]
    fn test_cast_clamps_to_target_range() {
        let data = array![[-10.0f32, 0.5], [300.0, 42.0]];
        let raster = Raster::from_array(data, Geometry::default());
        let bytes: Raster<u8> = raster.cast();
        assert_eq!(bytes.get(0, 0), Some(0));
        assert_eq!(bytes.get(1, 0), Some(255));
        assert_eq!(bytes.get(1, 1), Some(42));
    }
}
