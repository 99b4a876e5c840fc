// src/engine.rs

use crate::config::PixelFormat;
use crate::error::Result;
use crate::frame::PlanarBuffer;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine-side log verbosity, set once when the context is opened.
/// Sessions run the engine at `Error` so its own logging stays quiet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineLogLevel {
    None,
    Error,
    Warning,
    Info,
    Debug,
}

/// Aggregation applied to a metric's per-frame score stream over a range.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PoolMethod {
    Mean,
    HarmonicMean,
    Min,
    Max,
}

/// Contract with the external metric-scoring engine.
///
/// This crate never computes metric math itself; its entire job is
/// translating configuration and raw pixel buffers into this call sequence
/// and shaping the responses. Implementations wrap the real engine FFI;
/// tests use a scripted stand-in.
///
/// Lifecycle order: `open` -> `load_model` -> `bind_model_features` ->
/// `register_feature`* -> (`allocate_picture` + `submit_pair`)* ->
/// `finish` -> queries -> `close`.
pub trait ScoringEngine {
    /// Create the engine context. The thread count is advisory and consumed
    /// entirely by the engine's internal per-frame parallelism.
    fn open(&mut self, threads: u32, log_level: EngineLogLevel) -> Result<()>;

    /// Load the scoring model from an opaque reference. The reference's
    /// format (path, handle, ...) is owned by the engine.
    fn load_model(&mut self, model: &Path) -> Result<()>;

    /// Bind the loaded model's embedded default feature extractors to the
    /// context.
    fn bind_model_features(&mut self) -> Result<()>;

    /// Register one named feature extractor on top of the model's defaults.
    fn register_feature(&mut self, name: &str) -> Result<()>;

    /// Allocate an engine-owned planar buffer for one frame. The engine may
    /// pad per-plane strides beyond the packed row width.
    fn allocate_picture(
        &mut self,
        format: PixelFormat,
        bit_depth: u32,
        width: u32,
        height: u32,
    ) -> Result<PlanarBuffer>;

    /// Submit one packed reference/distorted pair tagged with its frame
    /// index. Ownership of both buffers passes to the engine.
    fn submit_pair(
        &mut self,
        reference: PlanarBuffer,
        distorted: PlanarBuffer,
        index: u64,
    ) -> Result<()>;

    /// Signal end-of-stream. Scores are only queryable afterwards.
    fn finish(&mut self) -> Result<()>;

    /// Pooled primary (model) score over the closed frame range
    /// `[first, last]`.
    fn pooled_score(&mut self, method: PoolMethod, first: u64, last: u64) -> Result<f64>;

    /// Primary (model) score of one frame.
    fn score_at(&mut self, index: u64) -> Result<f64>;

    /// Pooled score of a registered feature over the closed frame range.
    fn pooled_feature_score(
        &mut self,
        name: &str,
        method: PoolMethod,
        first: u64,
        last: u64,
    ) -> Result<f64>;

    /// Score of a registered feature at one frame.
    fn feature_score_at(&mut self, name: &str, index: u64) -> Result<f64>;

    /// Release model and context resources. Must be idempotent; the session
    /// calls this on every exit path, including drop.
    fn close(&mut self);
}
