//! Windowed reducers: pure functions from a gathered neighborhood to one
//! output value.
//!
//! The closed set of variants replaces a virtual-dispatch filter hierarchy;
//! new reducers plug in through the [`WindowReducer`] capability trait.
//! All reducers accumulate in `f64` regardless of the input pixel type and
//! use the population denominator. A degenerate neighborhood (every sample
//! excluded by the boundary policy) reduces to `0.0`.

use crate::core::window::Neighborhood;
use crate::types::{RasterError, RasterResult, SampleValue};
use serde::{Deserialize, Serialize};

/// Capability interface for neighborhood reductions.
pub trait WindowReducer: Send + Sync {
    fn reduce(&self, neighborhood: &Neighborhood<'_>) -> SampleValue;

    fn name(&self) -> &'static str;
}

/// Boxcar mean over the gathered samples.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean;

impl WindowReducer for Mean {
    fn reduce(&self, neighborhood: &Neighborhood<'_>) -> SampleValue {
        neighborhood.mean()
    }

    fn name(&self) -> &'static str {
        "mean"
    }
}

/// Local population variance.
#[derive(Debug, Clone, Copy, Default)]
pub struct Variance;

impl WindowReducer for Variance {
    fn reduce(&self, neighborhood: &Neighborhood<'_>) -> SampleValue {
        neighborhood.mean_variance().1
    }

    fn name(&self) -> &'static str {
        "variance"
    }
}

/// Local population standard deviation.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdDev;

impl WindowReducer for StdDev {
    fn reduce(&self, neighborhood: &Neighborhood<'_>) -> SampleValue {
        neighborhood.mean_variance().1.sqrt()
    }

    fn name(&self) -> &'static str {
        "stddev"
    }
}

/// Lee adaptive speckle filter.
///
/// Weighting coefficient `k = v / (v + m^2 / L)` blends the local mean with
/// the center pixel: homogeneous areas degrade to the mean, strong texture
/// passes the center through.
#[derive(Debug, Clone, Copy)]
pub struct Lee {
    looks: f64,
}

impl Lee {
    /// `looks` is the number of looks of the input image; must be positive.
    pub fn new(looks: f64) -> RasterResult<Self> {
        if !(looks > 0.0) {
            return Err(RasterError::Configuration(format!(
                "number of looks must be positive, got {}",
                looks
            )));
        }
        Ok(Self { looks })
    }

    pub fn looks(&self) -> f64 {
        self.looks
    }
}

impl WindowReducer for Lee {
    fn reduce(&self, neighborhood: &Neighborhood<'_>) -> SampleValue {
        if neighborhood.is_empty() {
            return 0.0;
        }
        let (mean, variance) = neighborhood.mean_variance();
        if variance <= f64::EPSILON {
            // Homogeneous area
            return mean;
        }
        let center = match neighborhood.center() {
            Some(c) => c,
            None => return mean,
        };
        let k = variance / (variance + mean * mean / self.looks);
        mean + k * (center - mean)
    }

    fn name(&self) -> &'static str {
        "lee"
    }
}

/// Frost adaptive speckle filter.
///
/// Each neighbor is weighted by `exp(-a * d)` with
/// `a = damping * variance / mean^2` and `d` the Euclidean offset distance;
/// the output is the weighted average over the window.
#[derive(Debug, Clone, Copy)]
pub struct Frost {
    damping: f64,
}

impl Frost {
    /// `damping` is the deramp coefficient; must be positive.
    pub fn new(damping: f64) -> RasterResult<Self> {
        if !(damping > 0.0) {
            return Err(RasterError::Configuration(format!(
                "damping factor must be positive, got {}",
                damping
            )));
        }
        Ok(Self { damping })
    }

    pub fn damping(&self) -> f64 {
        self.damping
    }
}

impl WindowReducer for Frost {
    fn reduce(&self, neighborhood: &Neighborhood<'_>) -> SampleValue {
        if neighborhood.is_empty() {
            return 0.0;
        }
        let (mean, variance) = neighborhood.mean_variance();
        if mean.abs() <= f64::EPSILON {
            return 0.0;
        }
        let a = self.damping * variance / (mean * mean);
        let mut weighted_sum = 0.0;
        let mut weight_sum = 0.0;
        for sample in neighborhood.samples() {
            let weight = (-a * sample.distance()).exp();
            weighted_sum += weight * sample.value;
            weight_sum += weight;
        }
        if weight_sum > 0.0 {
            weighted_sum / weight_sum
        } else {
            mean
        }
    }

    fn name(&self) -> &'static str {
        "frost"
    }
}

/// Gradient direction for the Sobel kernels, by image axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradientDirection {
    /// Along rows (vertical derivative)
    Row,
    /// Along columns (horizontal derivative)
    Col,
}

fn sobel_weight(direction: GradientDirection, dr: isize, dc: isize) -> f64 {
    // Separable 3x3 kernel: difference [-1, 0, 1] along the gradient axis,
    // smoothing [1, 2, 1] along the other
    let diff = |d: isize| d as f64;
    let smooth = |d: isize| if d == 0 { 2.0 } else { 1.0 };
    match direction {
        GradientDirection::Row => diff(dr) * smooth(dc),
        GradientDirection::Col => diff(dc) * smooth(dr),
    }
}

/// Directional Sobel gradient: inner product of the fixed 3x3 kernel with
/// the neighborhood. Requires a radius-1 window; samples excluded by the
/// boundary policy simply contribute nothing.
#[derive(Debug, Clone, Copy)]
pub struct Sobel {
    direction: GradientDirection,
}

impl Sobel {
    pub fn new(direction: GradientDirection) -> Self {
        Self { direction }
    }

    pub fn direction(&self) -> GradientDirection {
        self.direction
    }
}

impl WindowReducer for Sobel {
    fn reduce(&self, neighborhood: &Neighborhood<'_>) -> SampleValue {
        neighborhood
            .samples()
            .iter()
            .map(|s| sobel_weight(self.direction, s.offset.0, s.offset.1) * s.value)
            .sum()
    }

    fn name(&self) -> &'static str {
        "sobel"
    }
}

/// Gradient magnitude: root of the summed squares of both directional
/// Sobel responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientMagnitude;

impl WindowReducer for GradientMagnitude {
    fn reduce(&self, neighborhood: &Neighborhood<'_>) -> SampleValue {
        let mut g_row = 0.0;
        let mut g_col = 0.0;
        for s in neighborhood.samples() {
            g_row += sobel_weight(GradientDirection::Row, s.offset.0, s.offset.1) * s.value;
            g_col += sobel_weight(GradientDirection::Col, s.offset.0, s.offset.1) * s.value;
        }
        (g_row * g_row + g_col * g_col).sqrt()
    }

    fn name(&self) -> &'static str {
        "gradient_magnitude"
    }
}
