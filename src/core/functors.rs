//! Per-pixel functors: pure functions from one input sample to one output
//! value, for stages that need no neighborhood.

use crate::raster::Raster;
use crate::types::{Pixel, RasterError, RasterResult, SampleValue};

/// Capability interface for per-pixel transforms.
pub trait PixelFunctor: Send + Sync {
    fn apply(&self, value: SampleValue) -> SampleValue;

    fn name(&self) -> &'static str;
}

/// Pass-through functor.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl PixelFunctor for Identity {
    fn apply(&self, value: SampleValue) -> SampleValue {
        value
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Logarithmic transform `ln(1 + scale * x)`.
///
/// The `1 +` offset keeps the argument positive for non-negative input; the
/// scale must be positive so the offset is not defeated.
#[derive(Debug, Clone, Copy)]
pub struct LogTransform {
    scale: f64,
}

impl LogTransform {
    pub fn new(scale: f64) -> RasterResult<Self> {
        if !(scale > 0.0) {
            return Err(RasterError::Configuration(format!(
                "log transform scale must be positive, got {}",
                scale
            )));
        }
        Ok(Self { scale })
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}

impl PixelFunctor for LogTransform {
    fn apply(&self, value: SampleValue) -> SampleValue {
        (1.0 + self.scale * value).ln()
    }

    fn name(&self) -> &'static str {
        "log_transform"
    }
}

/// Linear rescale from a declared input range to `[out_min, out_max]`.
///
/// Inputs outside the declared range clamp to the output bounds; a
/// degenerate input range (`in_max == in_min`) maps everything to `out_min`.
#[derive(Debug, Clone, Copy)]
pub struct LinearRescale {
    in_min: f64,
    in_max: f64,
    out_min: f64,
    out_max: f64,
}

impl LinearRescale {
    pub fn new(in_min: f64, in_max: f64, out_min: f64, out_max: f64) -> RasterResult<Self> {
        if in_min > in_max {
            return Err(RasterError::Configuration(format!(
                "input range is inverted: {} > {}",
                in_min, in_max
            )));
        }
        if out_min > out_max {
            return Err(RasterError::Configuration(format!(
                "output range is inverted: {} > {}",
                out_min, out_max
            )));
        }
        Ok(Self {
            in_min,
            in_max,
            out_min,
            out_max,
        })
    }

    /// Rescale using the raster's own value range as the input range.
    pub fn for_raster<T: Pixel>(
        raster: &Raster<T>,
        out_min: f64,
        out_max: f64,
    ) -> RasterResult<Self> {
        let (lo, hi) = raster.value_range().unwrap_or((0.0, 0.0));
        Self::new(lo, hi, out_min, out_max)
    }
}

impl PixelFunctor for LinearRescale {
    fn apply(&self, value: SampleValue) -> SampleValue {
        let span = self.in_max - self.in_min;
        if span <= 0.0 {
            return self.out_min;
        }
        let t = ((value - self.in_min) / span).clamp(0.0, 1.0);
        self.out_min + t * (self.out_max - self.out_min)
    }

    fn name(&self) -> &'static str {
        "rescale"
    }
}

/// Below-cutoff threshold: pixels under `cutoff` are forced to `floor`.
#[derive(Debug, Clone, Copy)]
pub struct Threshold {
    cutoff: f64,
    floor: f64,
}

impl Threshold {
    pub fn new(cutoff: f64, floor: f64) -> Self {
        Self { cutoff, floor }
    }

    /// Threshold that zeroes everything below the cutoff.
    pub fn below(cutoff: f64) -> Self {
        Self::new(cutoff, 0.0)
    }
}

impl PixelFunctor for Threshold {
    fn apply(&self, value: SampleValue) -> SampleValue {
        if value < self.cutoff {
            self.floor
        } else {
            value
        }
    }

    fn name(&self) -> &'static str {
        "threshold"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_log_transform_reference_values() {
        let log = LogTransform::new(1.0).unwrap();
        assert_eq!(log.apply(0.0), 0.0);
        assert_relative_eq!(log.apply(std::f64::consts::E - 1.0), 1.0);
    }

    #[test]
    fn test_log_transform_rejects_non_positive_scale() {
        assert!(LogTransform::new(0.0).is_err());
        assert!(LogTransform::new(-2.0).is_err());
    }

    #[test]
    fn test_rescale_maps_and_clamps() {
        let rescale = LinearRescale::new(0.0, 10.0, 0.0, 255.0).unwrap();
        assert_eq!(rescale.apply(0.0), 0.0);
        assert_eq!(rescale.apply(10.0), 255.0);
        assert_relative_eq!(rescale.apply(5.0), 127.5);
        assert_eq!(rescale.apply(-1.0), 0.0);
        assert_eq!(rescale.apply(11.0), 255.0);
    }

    #[test]
    fn test_rescale_degenerate_range_maps_to_out_min() {
        let rescale = LinearRescale::new(4.0, 4.0, 10.0, 20.0).unwrap();
        assert_eq!(rescale.apply(4.0), 10.0);
        assert_eq!(rescale.apply(100.0), 10.0);
    }

    #[test]
    fn test_rescale_rejects_inverted_output_range() {
        assert!(LinearRescale::new(0.0, 1.0, 5.0, 4.0).is_err());
    }

    #[test]
    fn test_threshold_below() {
        let t = Threshold::below(20.0);
        assert_eq!(t.apply(19.9), 0.0);
        assert_eq!(t.apply(20.0), 20.0);
        assert_eq!(t.apply(50.0), 50.0);
    }
}
