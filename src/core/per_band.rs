//! Per-band adapter: lifts a scalar filter to each band of a multi-band
//! raster, reassembling results in band order.

use crate::core::filter::RasterFilter;
use crate::raster::MultibandRaster;
use crate::types::RasterResult;

/// Runs the wrapped scalar filter independently over every band with the
/// same configuration. Band order is preserved; mismatched band shapes are
/// rejected when the output is reassembled.
pub struct PerBandAdapter<S: RasterFilter> {
    filter: S,
}

impl<S: RasterFilter> PerBandAdapter<S> {
    pub fn new(filter: S) -> Self {
        Self { filter }
    }

    pub fn filter(&self) -> &S {
        &self.filter
    }

    pub fn apply(&self, input: &MultibandRaster<f32>) -> RasterResult<MultibandRaster<f32>> {
        log::info!(
            "Applying {} filter per band over {} bands",
            self.filter.name(),
            input.band_count()
        );
        let mut outputs = Vec::with_capacity(input.band_count());
        for band in input.bands() {
            outputs.push(self.filter.run(band)?);
        }
        MultibandRaster::from_bands(outputs)
    }
}
