//! Named filter configuration: a validated parameter set plus a closed
//! enum of filter kinds, dispatched into concrete filters.
//!
//! Validation happens here, at configuration time, before any pixel is
//! touched; a rejected parameter set is never partially applied.

use crate::core::filter::{FunctorFilter, RasterFilter, WindowedFilter};
use crate::core::functors::{LinearRescale, LogTransform, Threshold};
use crate::core::reducers::{
    Frost, GradientDirection, GradientMagnitude, Lee, Mean, Sobel, StdDev, Variance,
};
use crate::core::window::{BoundaryPolicy, Window};
use crate::raster::{MultibandRaster, Raster};
use crate::types::{RasterError, RasterResult};
use serde::{Deserialize, Serialize};

/// Scalar parameters shared by the filter family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterParams {
    /// Neighborhood radius along (row axis, column axis)
    pub radius: (usize, usize),
    /// Number of looks for the Lee filter
    pub num_looks: f64,
    /// Damping (deramp) factor for the Frost filter
    pub damping: f64,
    /// Scale factor for the logarithmic transform
    pub scale: f64,
    /// Below-threshold cutoff
    pub threshold: f64,
    /// Output range for the linear rescale
    pub output_min: f64,
    pub output_max: f64,
    /// Input range for the linear rescale
    pub input_min: f64,
    pub input_max: f64,
    /// 0-based band selection for multi-band inputs
    pub band_index: usize,
    /// Boundary handling for windowed filters
    pub boundary: BoundaryPolicy,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            radius: (1, 1),
            num_looks: 1.0,
            damping: 1.0,
            scale: 1.0,
            threshold: 0.0,
            output_min: 0.0,
            output_max: 255.0,
            input_min: 0.0,
            input_max: 255.0,
            band_index: 0,
            boundary: BoundaryPolicy::Skip,
        }
    }
}

impl FilterParams {
    /// Uniform radius on both axes.
    pub fn with_radius(mut self, radius: usize) -> Self {
        self.radius = (radius, radius);
        self
    }

    /// Select the configured band from a multi-band input.
    pub fn select_band<'a>(
        &self,
        input: &'a MultibandRaster<f32>,
    ) -> RasterResult<&'a Raster<f32>> {
        input.band(self.band_index)
    }

    fn window(&self) -> Window {
        Window::new(self.radius.0, self.radius.1)
    }
}

/// The closed set of filters constructible from a parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKind {
    Mean,
    Variance,
    StdDev,
    Lee,
    Frost,
    GradientRow,
    GradientCol,
    GradientMagnitude,
    Log,
    Rescale,
    Threshold,
}

/// The Sobel kernels are fixed 3x3; reject any other window size.
fn require_unit_radius(kind: FilterKind, params: &FilterParams) -> RasterResult<()> {
    if params.radius != (1, 1) {
        return Err(RasterError::Configuration(format!(
            "{:?} uses a fixed 3x3 kernel and requires radius (1, 1), got {:?}",
            kind, params.radius
        )));
    }
    Ok(())
}

/// Validate `params` for `kind` and build the corresponding filter.
pub fn build_filter(kind: FilterKind, params: &FilterParams) -> RasterResult<Box<dyn RasterFilter>> {
    log::debug!("Building {:?} filter: {:?}", kind, params);
    let filter: Box<dyn RasterFilter> = match kind {
        FilterKind::Mean => Box::new(WindowedFilter::new(params.window(), params.boundary, Mean)),
        FilterKind::Variance => Box::new(WindowedFilter::new(
            params.window(),
            params.boundary,
            Variance,
        )),
        FilterKind::StdDev => Box::new(WindowedFilter::new(
            params.window(),
            params.boundary,
            StdDev,
        )),
        FilterKind::Lee => Box::new(WindowedFilter::new(
            params.window(),
            params.boundary,
            Lee::new(params.num_looks)?,
        )),
        FilterKind::Frost => Box::new(WindowedFilter::new(
            params.window(),
            params.boundary,
            Frost::new(params.damping)?,
        )),
        FilterKind::GradientRow => {
            require_unit_radius(kind, params)?;
            Box::new(WindowedFilter::new(
                params.window(),
                params.boundary,
                Sobel::new(GradientDirection::Row),
            ))
        }
        FilterKind::GradientCol => {
            require_unit_radius(kind, params)?;
            Box::new(WindowedFilter::new(
                params.window(),
                params.boundary,
                Sobel::new(GradientDirection::Col),
            ))
        }
        FilterKind::GradientMagnitude => {
            require_unit_radius(kind, params)?;
            Box::new(WindowedFilter::new(
                params.window(),
                params.boundary,
                GradientMagnitude,
            ))
        }
        FilterKind::Log => Box::new(FunctorFilter::new(LogTransform::new(params.scale)?)),
        FilterKind::Rescale => Box::new(FunctorFilter::new(LinearRescale::new(
            params.input_min,
            params.input_max,
            params.output_min,
            params.output_max,
        )?)),
        FilterKind::Threshold => {
            Box::new(FunctorFilter::new(Threshold::below(params.threshold)))
        }
    };
    Ok(filter)
}
