//! rasterfilt: windowed raster filtering
//!
//! For every pixel of a (possibly multi-band) raster, gather a neighborhood
//! of configurable radius, reduce it to a derived value (local mean,
//! variance, adaptive speckle estimate, directional gradient), and write
//! the result to an output raster. Image borders are handled by pluggable
//! boundary policies, multi-band rasters are processed band by band, and
//! filters can be chained into composite pipelines.

pub mod core;
pub mod io;
pub mod raster;
pub mod types;

// Re-export main types and functions for easier access
pub use crate::core::{
    build_filter, BoundaryPolicy, EdgeDetectionPipeline, FilterKind, FilterParams, FunctorFilter,
    PerBandAdapter, Pipeline, PixelFunctor, RasterFilter, Window, WindowReducer, WindowedFilter,
};
pub use raster::{Geometry, MultibandRaster, Raster, Region};
pub use types::{Pixel, RasterError, RasterResult};
