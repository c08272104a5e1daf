//! Core windowed raster processing modules

pub mod config;
pub mod filter;
pub mod functors;
pub mod per_band;
pub mod pipeline;
pub mod reducers;
pub mod window;

// Re-export main types
pub use config::{build_filter, FilterKind, FilterParams};
pub use filter::{FunctorFilter, RasterFilter, WindowedFilter};
pub use functors::{Identity, LinearRescale, LogTransform, PixelFunctor, Threshold};
pub use per_band::PerBandAdapter;
pub use pipeline::{EdgeDetectionPipeline, Pipeline};
pub use reducers::{
    Frost, GradientDirection, GradientMagnitude, Lee, Mean, Sobel, StdDev, Variance, WindowReducer,
};
pub use window::{BoundaryPolicy, Neighborhood, Sample, Window};
