//! Filter orchestration: iterate the requested region, gather neighborhoods
//! (or single pixels), reduce, and write the output raster.
//!
//! Filters never mutate their input; each run allocates a fresh output
//! raster covering the requested region. Independent output rows are
//! data-parallel and large runs are row-partitioned under the `parallel`
//! feature, with results identical to the serial path.

use crate::core::functors::PixelFunctor;
use crate::core::reducers::WindowReducer;
use crate::core::window::{BoundaryPolicy, Neighborhood, Sample, Window};
use crate::raster::{Raster, Region};
use crate::types::{pixel_of, Pixel, RasterError, RasterResult, SampleValue};
use ndarray::Array2;

/// Pixel count above which the row-parallel path is used.
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 65_536;

/// Object-safe filter interface used for per-band and pipeline composition.
///
/// Composed stages run on the common `f32` raster type; the generic
/// `apply` methods on the concrete filters remain available for cross-type
/// output.
pub trait RasterFilter: Send + Sync {
    fn run(&self, input: &Raster<f32>) -> RasterResult<Raster<f32>>;

    fn name(&self) -> &'static str;
}

impl std::fmt::Debug for dyn RasterFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterFilter").field("name", &self.name()).finish()
    }
}

fn check_requested(input_region: &Region, requested: &Region) -> RasterResult<()> {
    if !input_region.contains_region(requested) {
        return Err(RasterError::Region(format!(
            "requested region {:?} not contained in input region {:?}",
            requested, input_region
        )));
    }
    Ok(())
}

/// Generic windowed operator: one reducer applied over every neighborhood
/// of the requested region.
#[derive(Debug, Clone)]
pub struct WindowedFilter<R: WindowReducer> {
    window: Window,
    policy: BoundaryPolicy,
    reducer: R,
}

impl<R: WindowReducer> WindowedFilter<R> {
    pub fn new(window: Window, policy: BoundaryPolicy, reducer: R) -> Self {
        Self {
            window,
            policy,
            reducer,
        }
    }

    /// Square window with the default `Skip` boundary policy.
    pub fn with_radius(radius: usize, reducer: R) -> Self {
        Self::new(Window::uniform(radius), BoundaryPolicy::Skip, reducer)
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    /// Run the reducer over `requested` and return the output raster.
    pub fn apply<Tin: Pixel, Tout: Pixel>(
        &self,
        input: &Raster<Tin>,
        requested: Region,
    ) -> RasterResult<Raster<Tout>> {
        check_requested(&input.region(), &requested)?;
        log::debug!(
            "{} filter: radius {:?}, policy {:?}, region {:?}",
            self.reducer.name(),
            self.window.radius(),
            self.policy,
            requested
        );

        let values = self.compute(input, &requested);
        let data = Array2::from_shape_vec(
            (requested.rows, requested.cols),
            values.into_iter().map(pixel_of::<Tout>).collect(),
        )
        .map_err(|e| RasterError::Region(format!("output shape mismatch: {}", e)))?;

        Ok(Raster::from_array(data, input.geometry_for(&requested))
            .anchored_at(requested.row, requested.col))
    }

    /// Run over the input's entire region.
    pub fn apply_full<Tin: Pixel, Tout: Pixel>(
        &self,
        input: &Raster<Tin>,
    ) -> RasterResult<Raster<Tout>> {
        self.apply(input, input.region())
    }

    fn reduce_row<Tin: Pixel>(
        &self,
        input: &Raster<Tin>,
        requested: &Region,
        i: usize,
        buf: &mut Vec<Sample>,
        out: &mut Vec<SampleValue>,
    ) {
        let row = requested.row + i;
        for j in 0..requested.cols {
            let col = requested.col + j;
            self.window.gather(input, row, col, self.policy, buf);
            out.push(self.reducer.reduce(&Neighborhood::new(buf)));
        }
    }

    #[cfg(feature = "parallel")]
    fn compute<Tin: Pixel>(&self, input: &Raster<Tin>, requested: &Region) -> Vec<SampleValue> {
        use rayon::prelude::*;

        if requested.num_pixels() < PARALLEL_THRESHOLD {
            return self.compute_serial(input, requested);
        }
        // Rows are independent; collecting in row order keeps the output
        // bit-identical to the serial path
        let rows: Vec<Vec<SampleValue>> = (0..requested.rows)
            .into_par_iter()
            .map(|i| {
                let mut buf = Vec::with_capacity(self.window.len());
                let mut row_out = Vec::with_capacity(requested.cols);
                self.reduce_row(input, requested, i, &mut buf, &mut row_out);
                row_out
            })
            .collect();
        rows.into_iter().flatten().collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn compute<Tin: Pixel>(&self, input: &Raster<Tin>, requested: &Region) -> Vec<SampleValue> {
        self.compute_serial(input, requested)
    }

    fn compute_serial<Tin: Pixel>(
        &self,
        input: &Raster<Tin>,
        requested: &Region,
    ) -> Vec<SampleValue> {
        let mut buf = Vec::with_capacity(self.window.len());
        let mut out = Vec::with_capacity(requested.num_pixels());
        for i in 0..requested.rows {
            self.reduce_row(input, requested, i, &mut buf, &mut out);
        }
        out
    }
}

impl<R: WindowReducer> RasterFilter for WindowedFilter<R> {
    fn run(&self, input: &Raster<f32>) -> RasterResult<Raster<f32>> {
        self.apply_full(input)
    }

    fn name(&self) -> &'static str {
        self.reducer.name()
    }
}

/// Per-pixel operator: one functor applied to every pixel of the requested
/// region, no neighborhood involved.
#[derive(Debug, Clone)]
pub struct FunctorFilter<F: PixelFunctor> {
    functor: F,
}

impl<F: PixelFunctor> FunctorFilter<F> {
    pub fn new(functor: F) -> Self {
        Self { functor }
    }

    pub fn functor(&self) -> &F {
        &self.functor
    }

    pub fn apply<Tin: Pixel, Tout: Pixel>(
        &self,
        input: &Raster<Tin>,
        requested: Region,
    ) -> RasterResult<Raster<Tout>> {
        check_requested(&input.region(), &requested)?;
        log::debug!("{} functor over region {:?}", self.functor.name(), requested);

        let mut values = Vec::with_capacity(requested.num_pixels());
        for i in 0..requested.rows {
            for j in 0..requested.cols {
                let v = input.sample(requested.row + i, requested.col + j);
                values.push(pixel_of::<Tout>(self.functor.apply(v)));
            }
        }
        let data = Array2::from_shape_vec((requested.rows, requested.cols), values)
            .map_err(|e| RasterError::Region(format!("output shape mismatch: {}", e)))?;

        Ok(Raster::from_array(data, input.geometry_for(&requested))
            .anchored_at(requested.row, requested.col))
    }

    pub fn apply_full<Tin: Pixel, Tout: Pixel>(
        &self,
        input: &Raster<Tin>,
    ) -> RasterResult<Raster<Tout>> {
        self.apply(input, input.region())
    }
}

impl<F: PixelFunctor> RasterFilter for FunctorFilter<F> {
    fn run(&self, input: &Raster<f32>) -> RasterResult<Raster<f32>> {
        self.apply_full(input)
    }

    fn name(&self) -> &'static str {
        self.functor.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::functors::{Identity, LogTransform};
    use crate::core::reducers::{Lee, Mean, Variance};
    use crate::raster::Geometry;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    fn constant_raster(rows: usize, cols: usize, value: f32) -> Raster<f32> {
        Raster::from_array(Array2::from_elem((rows, cols), value), Geometry::default())
    }

    #[test]
    fn test_mean_on_constant_input_is_identity() {
        let input = constant_raster(5, 5, 10.0);
        let filter = WindowedFilter::with_radius(1, Mean);
        let out: Raster<f32> = filter.apply_full(&input).unwrap();
        assert_eq!(out.dim(), (5, 5));
        assert!(out.array().iter().all(|&v| v == 10.0));
    }

    #[test]
    fn test_variance_on_constant_input_is_zero() {
        let input = constant_raster(5, 5, 10.0);
        let filter = WindowedFilter::with_radius(1, Variance);
        let out: Raster<f32> = filter.apply_full(&input).unwrap();
        assert!(out.array().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_mean_single_hot_pixel_interior() {
        let mut data = Array2::<f32>::zeros((4, 4));
        data[[2, 2]] = 100.0;
        let input = Raster::from_array(data, Geometry::default());
        let filter = WindowedFilter::with_radius(1, Mean);
        let out: Raster<f32> = filter.apply_full(&input).unwrap();
        // Interior pixel sees the full 3x3 window, center included
        assert_relative_eq!(out.get(2, 2).unwrap(), 100.0 / 9.0);
    }

    #[test]
    fn test_requested_region_outside_input_fails() {
        let input = constant_raster(4, 4, 1.0);
        let filter = WindowedFilter::with_radius(1, Mean);
        let err = filter
            .apply::<f32, f32>(&input, Region::new(2, 2, 4, 4))
            .unwrap_err();
        assert!(matches!(err, RasterError::Region(_)));
    }

    #[test]
    fn test_output_mirrors_requested_region() {
        let input = constant_raster(8, 6, 2.0);
        let requested = Region::new(2, 1, 4, 3);
        let filter = WindowedFilter::with_radius(1, Mean);
        let out: Raster<f32> = filter.apply(&input, requested).unwrap();
        assert_eq!(out.region(), requested);
        assert_eq!(out.dim(), (4, 3));
        assert_eq!(out.geometry().origin, [2.0, 1.0]);
    }

    #[test]
    fn test_input_not_mutated() {
        let input = constant_raster(4, 4, 3.0);
        let before = input.clone();
        let filter = WindowedFilter::with_radius(1, Mean);
        let _out: Raster<f32> = filter.apply_full(&input).unwrap();
        assert_eq!(input, before);
    }

    #[test]
    fn test_functor_filter_cross_type_output() {
        let input = constant_raster(2, 2, (std::f64::consts::E - 1.0) as f32);
        let filter = FunctorFilter::new(LogTransform::new(1.0).unwrap());
        let out: Raster<f64> = filter.apply_full(&input).unwrap();
        assert_relative_eq!(out.get(0, 0).unwrap(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_identity_functor_round_trip() {
        let mut data = Array2::<f32>::zeros((3, 3));
        data[[1, 2]] = 7.5;
        let input = Raster::from_array(data, Geometry::default());
        let filter = FunctorFilter::new(Identity);
        let out = filter.run(&input).unwrap();
        assert_eq!(out, input);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_rows_match_serial() {
        // 256x256 = 65,536 pixels reaches the row-parallel path
        let mut data = Array2::<f32>::zeros((256, 256));
        let mut state = 0x9e37_79b9u32;
        for v in data.iter_mut() {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            *v = 10.0 + (state >> 24) as f32 / 8.0;
        }
        let input = Raster::from_array(data, Geometry::default());
        let filter = WindowedFilter::with_radius(2, Lee::new(2.0).unwrap());

        let region = input.region();
        assert!(region.num_pixels() >= PARALLEL_THRESHOLD);

        let serial = filter.compute_serial(&input, &region);
        let out: Raster<f32> = filter.apply_full(&input).unwrap();
        for (expected, &got) in serial.iter().zip(out.array().iter()) {
            assert_eq!(pixel_of::<f32>(*expected), got);
        }
    }

    #[test]
    fn test_determinism_repeated_runs() {
        let mut data = Array2::<f32>::zeros((16, 16));
        for i in 0..16 {
            for j in 0..16 {
                data[[i, j]] = ((i * 31 + j * 17) % 97) as f32;
            }
        }
        let input = Raster::from_array(data, Geometry::default());
        let filter = WindowedFilter::with_radius(2, Mean);
        let a: Raster<f32> = filter.apply_full(&input).unwrap();
        let b: Raster<f32> = filter.apply_full(&input).unwrap();
        assert_eq!(a, b);
    }
}
