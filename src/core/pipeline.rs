//! Composite pipelines: chains of filters behind one exposed interface.
//!
//! Evaluation is demand-driven: asking the pipeline for its result pulls
//! recursively through the stage chain, and the last stage's raster is
//! returned by ownership transfer. A run aborts on the first stage failure
//! with an error naming the failing stage; no partial output survives.

use crate::core::filter::{FunctorFilter, RasterFilter, WindowedFilter};
use crate::core::functors::{LinearRescale, Threshold};
use crate::core::reducers::GradientMagnitude;
use crate::core::window::{BoundaryPolicy, Window};
use crate::raster::Raster;
use crate::types::{RasterError, RasterResult};

/// Ordered chain of filters with one free input and one free output.
#[derive(Default)]
pub struct Pipeline {
    stages: Vec<Box<dyn RasterFilter>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Append a stage; its input is the previous stage's output.
    pub fn push(mut self, stage: Box<dyn RasterFilter>) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Evaluate the chain on `input` and return the last stage's output.
    pub fn run(&self, input: &Raster<f32>) -> RasterResult<Raster<f32>> {
        if self.stages.is_empty() {
            return Err(RasterError::Configuration(
                "pipeline has no stages".to_string(),
            ));
        }
        log::info!("Running pipeline with {} stages", self.stages.len());
        self.pull(self.stages.len() - 1, input)
    }

    /// Pull the result of stage `index`, recursively evaluating its
    /// predecessor first.
    fn pull(&self, index: usize, input: &Raster<f32>) -> RasterResult<Raster<f32>> {
        let stage = &self.stages[index];
        let upstream;
        let stage_input = if index == 0 {
            input
        } else {
            upstream = self.pull(index - 1, input)?;
            &upstream
        };
        log::debug!("Pipeline stage {} ({})", index, stage.name());
        stage
            .run(stage_input)
            .map_err(|e| stage_error(index, stage.name(), e))
    }
}

/// Prefix a stage failure with its position and name, keeping the variant.
fn stage_error(index: usize, name: &str, err: RasterError) -> RasterError {
    let msg = format!("stage {} ({}): {}", index, name, err);
    match err {
        RasterError::Configuration(_) => RasterError::Configuration(msg),
        RasterError::Region(_) => RasterError::Region(msg),
        RasterError::Decode(_) => RasterError::Decode(msg),
        RasterError::Encode(_) => RasterError::Encode(msg),
    }
}

/// Composite edge-detection operator: gradient magnitude, below-threshold
/// suppression, then rescale into a fixed output range.
///
/// Only the threshold and the output range are exposed; the internal
/// wiring stays private and the threshold is routed to the suppression
/// stage alone.
pub struct EdgeDetectionPipeline {
    threshold: f64,
    output_min: f64,
    output_max: f64,
}

impl EdgeDetectionPipeline {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            output_min: 0.0,
            output_max: 255.0,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn set_threshold(&mut self, threshold: f64) {
        self.threshold = threshold;
    }

    pub fn with_output_range(mut self, min: f64, max: f64) -> RasterResult<Self> {
        if min > max {
            return Err(RasterError::Configuration(format!(
                "output range is inverted: {} > {}",
                min, max
            )));
        }
        self.output_min = min;
        self.output_max = max;
        Ok(self)
    }

    pub fn run(&self, input: &Raster<f32>) -> RasterResult<Raster<f32>> {
        log::info!(
            "Edge detection pipeline: threshold {}, output range [{}, {}]",
            self.threshold,
            self.output_min,
            self.output_max
        );
        // Replicated borders keep flat areas gradient-free at the image edge
        let gradient = WindowedFilter::new(
            Window::uniform(1),
            BoundaryPolicy::Clamp,
            GradientMagnitude,
        )
        .run(input)?;
        let suppressed =
            FunctorFilter::new(Threshold::below(self.threshold)).run(&gradient)?;
        // The rescale input range depends on the suppressed raster, so the
        // final stage is configured at pull time
        let rescale = LinearRescale::for_raster(&suppressed, self.output_min, self.output_max)?;
        FunctorFilter::new(rescale).run(&suppressed)
    }
}
