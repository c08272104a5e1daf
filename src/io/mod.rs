//! Raster source/sink contracts.
//!
//! The filtering core never opens files itself; decoding and encoding are
//! external collaborators behind these two traits. Their failures surface
//! unchanged as `Decode`/`Encode` errors. An in-memory store implements
//! both for wiring pipelines in tests.

use crate::raster::MultibandRaster;
use crate::types::{RasterError, RasterResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Decodes a path into an in-memory raster.
pub trait RasterSource {
    fn load(&self, path: &Path) -> RasterResult<MultibandRaster<f32>>;
}

/// Encodes an in-memory raster to a path.
pub trait RasterSink {
    fn save(&mut self, raster: &MultibandRaster<f32>, path: &Path) -> RasterResult<()>;
}

/// Path-keyed in-memory raster store.
#[derive(Default)]
pub struct MemoryStore {
    rasters: HashMap<PathBuf, MultibandRaster<f32>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, raster: MultibandRaster<f32>) {
        self.rasters.insert(path.into(), raster);
    }

    pub fn len(&self) -> usize {
        self.rasters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rasters.is_empty()
    }
}

impl RasterSource for MemoryStore {
    fn load(&self, path: &Path) -> RasterResult<MultibandRaster<f32>> {
        self.rasters.get(path).cloned().ok_or_else(|| {
            RasterError::Decode(format!("no raster stored at {}", path.display()))
        })
    }
}

impl RasterSink for MemoryStore {
    fn save(&mut self, raster: &MultibandRaster<f32>, path: &Path) -> RasterResult<()> {
        self.rasters.insert(path.to_path_buf(), raster.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{Geometry, Raster, Region};

    fn one_band() -> MultibandRaster<f32> {
        let band = Raster::zeros(Region::with_size(2, 2), Geometry::default());
        MultibandRaster::from_bands(vec![band]).unwrap()
    }

    #[test]
    fn test_memory_store_round_trip() {
        let mut store = MemoryStore::new();
        let raster = one_band();
        store.save(&raster, Path::new("a.img")).unwrap();
        let loaded = store.load(Path::new("a.img")).unwrap();
        assert_eq!(loaded, raster);
    }

    #[test]
    fn test_missing_path_is_decode_error() {
        let store = MemoryStore::new();
        let err = store.load(Path::new("missing.img")).unwrap_err();
        assert!(matches!(err, RasterError::Decode(_)));
    }
}
