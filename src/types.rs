use num_traits::{Bounded, NumCast, Zero};
use std::fmt::Debug;

/// Scalar sample type used for all reductions, regardless of pixel type
pub type SampleValue = f64;

/// Pixel element type stored in a raster band.
///
/// Covers the integer and floating-point scalar types; all arithmetic is
/// carried out in `f64` and cast back through this bound.
pub trait Pixel:
    Copy + PartialOrd + NumCast + Bounded + Zero + Debug + Send + Sync + 'static
{
}

impl<T> Pixel for T where
    T: Copy + PartialOrd + NumCast + Bounded + Zero + Debug + Send + Sync + 'static
{
}

/// Widen a pixel to the common sample type.
pub fn sample_of<T: Pixel>(value: T) -> SampleValue {
    // Every supported pixel type is exactly representable in f64
    NumCast::from(value).unwrap_or(0.0)
}

/// Narrow a sample back to a pixel type, clamping to the target's range.
///
/// Integer targets truncate toward zero, matching a plain numeric cast.
pub fn pixel_of<T: Pixel>(value: SampleValue) -> T {
    let lo: SampleValue = NumCast::from(T::min_value()).unwrap_or(SampleValue::MIN);
    let hi: SampleValue = NumCast::from(T::max_value()).unwrap_or(SampleValue::MAX);
    let clamped = if value.is_nan() {
        0.0
    } else {
        value.clamp(lo, hi)
    };
    NumCast::from(clamped).unwrap_or_else(T::zero)
}

/// Error types for raster filtering
#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("region error: {0}")]
    Region(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),
}

/// Result type for raster operations
pub type RasterResult<T> = Result<T, RasterError>;
