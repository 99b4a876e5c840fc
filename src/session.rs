// src/session.rs

use crate::config::SessionConfig;
use crate::engine::{EngineLogLevel, PoolMethod, ScoringEngine};
use crate::error::{Result, VqError};
use crate::features::FeatureRegistry;
use crate::frame::{self, PlanarBuffer};
use crate::results::MetricScores;
use log::{debug, error, info, warn};

/// Name of the always-on model score, first in every result list. It has
/// no bit in the selection mask.
pub const PRIMARY_METRIC: &str = "vmaf";

/// Why a frame slot was consumed without a submission.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DropReason {
    #[error("source buffer too small: need {need} bytes, have {have}")]
    SourceTooSmall { need: usize, have: usize },
    #[error("picture allocation failed: {0}")]
    Allocation(String),
    #[error("submission failed: {0}")]
    Submission(String),
}

/// Outcome of one ingestion call. The frame index is consumed either way:
/// a dropped frame leaves a hole, it never shifts later frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameStatus {
    Submitted { index: u64 },
    Dropped { index: u64, reason: DropReason },
}

impl FrameStatus {
    pub fn index(&self) -> u64 {
        match self {
            FrameStatus::Submitted { index } => *index,
            FrameStatus::Dropped { index, .. } => *index,
        }
    }

    pub fn is_submitted(&self) -> bool {
        matches!(self, FrameStatus::Submitted { .. })
    }
}

/// One scoring session: owns the engine context and model for its lifetime,
/// ingests frame pairs in strictly increasing index order, and aggregates
/// results once the stream ends.
///
/// Single-threaded and synchronous throughout; every call runs to
/// completion or fails synchronously. The engine releases its resources on
/// every exit path via [`Session::close`] / `Drop`.
#[derive(Debug)]
pub struct Session<E: ScoringEngine> {
    engine: E,
    config: SessionConfig,
    registry: FeatureRegistry,
    frame_index: u64,
    flushed: bool,
    closed: bool,
}

impl<E: ScoringEngine> Session<E> {
    /// Opens the engine context, loads the model, binds its default feature
    /// extractors, and registers the selected metrics.
    ///
    /// Context, model, and binding failures are fatal and leave no usable
    /// session. Individual metric registrations are not: a failed one is
    /// recorded as skipped in the registry and construction proceeds with
    /// degraded capability.
    pub fn new(config: SessionConfig, mut engine: E) -> Result<Session<E>> {
        config.validate()?;

        info!(
            "Opening scoring session: {}x{} {:?} {}-bit, {} engine threads, metrics mask 0x{:02x}",
            config.width,
            config.height,
            config.pixel_format,
            config.bit_depth,
            config.threads,
            config.metrics.bits()
        );

        if let Err(e) = engine.open(config.threads, EngineLogLevel::Error) {
            engine.close();
            return Err(VqError::Init(e.to_string()));
        }

        if let Err(e) = engine.load_model(&config.model_path) {
            engine.close();
            return Err(VqError::ModelLoad {
                path: config.model_path.display().to_string(),
                reason: e.to_string(),
            });
        }

        if let Err(e) = engine.bind_model_features() {
            engine.close();
            return Err(VqError::Init(format!(
                "failed to bind model feature extractors: {e}"
            )));
        }

        let registry = FeatureRegistry::build(config.metrics, &mut engine);
        let skipped = registry
            .outcomes()
            .iter()
            .filter(|o| !matches!(o.status, crate::features::RegistrationStatus::Registered))
            .count();
        if skipped > 0 {
            warn!("{skipped} requested metric(s) could not be registered and will be omitted");
        }
        info!(
            "Session ready: primary metric plus {} registered feature name(s)",
            registry.len()
        );

        Ok(Session {
            engine,
            config,
            registry,
            frame_index: 0,
            flushed: false,
            closed: false,
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Registry of metric names registered at construction, including
    /// per-entry outcomes for metrics that were requested but skipped.
    pub fn registry(&self) -> &FeatureRegistry {
        &self.registry
    }

    /// Frames ingested so far, dropped slots included.
    pub fn frame_count(&self) -> u64 {
        self.frame_index
    }

    /// Packs and submits one reference/distorted pair.
    ///
    /// Both buffers are borrowed only for the duration of this call and
    /// must be tightly packed (row stride = plane width x bytes-per-sample,
    /// no padding). The frame index advances exactly once per call, whether
    /// or not the submission succeeds; a failed frame is a dropped slot,
    /// never retried.
    pub fn put_frame(&mut self, reference: &[u8], distorted: &[u8]) -> FrameStatus {
        let index = self.frame_index;
        self.frame_index += 1;

        let mut ref_pic = match self.allocate_picture() {
            Ok(pic) => pic,
            Err(e) => {
                warn!("Frame {index}: reference picture allocation failed: {e}");
                return FrameStatus::Dropped {
                    index,
                    reason: DropReason::Allocation(e.to_string()),
                };
            }
        };
        let mut dist_pic = match self.allocate_picture() {
            Ok(pic) => pic,
            Err(e) => {
                warn!("Frame {index}: distorted picture allocation failed: {e}");
                return FrameStatus::Dropped {
                    index,
                    reason: DropReason::Allocation(e.to_string()),
                };
            }
        };

        if let Err(e) = frame::pack_frame(&mut ref_pic, reference) {
            warn!("Frame {index}: reference buffer rejected: {e}");
            return FrameStatus::Dropped {
                index,
                reason: pack_drop_reason(e),
            };
        }
        if let Err(e) = frame::pack_frame(&mut dist_pic, distorted) {
            warn!("Frame {index}: distorted buffer rejected: {e}");
            return FrameStatus::Dropped {
                index,
                reason: pack_drop_reason(e),
            };
        }

        match self.engine.submit_pair(ref_pic, dist_pic, index) {
            Ok(()) => {
                debug!("Submitted frame pair {index}");
                FrameStatus::Submitted { index }
            }
            Err(e) => {
                error!("Frame {index}: submission failed, dropping slot: {e}");
                FrameStatus::Dropped {
                    index,
                    reason: DropReason::Submission(e.to_string()),
                }
            }
        }
    }

    /// Signals end-of-stream to the engine. Harmless to call repeatedly;
    /// only the first call reaches the engine. [`Session::get_result`]
    /// calls this itself.
    pub fn flush(&mut self) {
        if self.flushed {
            return;
        }
        self.flushed = true;
        debug!("Flushing scoring session after {} frame(s)", self.frame_index);
        if let Err(e) = self.engine.finish() {
            error!("End-of-stream signal failed: {e}");
        }
    }

    /// Flushes, then queries pooled and per-frame scores for the primary
    /// metric and every registered feature name, in registry order.
    ///
    /// Individual query failures degrade that statistic to `None` and never
    /// abort extraction of the remaining metrics. With zero ingested frames
    /// no engine query is issued at all: every record comes back with an
    /// empty score sequence and undefined pooled stats.
    pub fn get_result(&mut self) -> Vec<MetricScores> {
        self.flush();

        let total = self.frame_index;
        let names: Vec<String> = self.registry.names().to_vec();
        let mut records = Vec::with_capacity(1 + names.len());

        records.push(self.collect_record(None, total));
        for name in &names {
            records.push(self.collect_record(Some(name), total));
        }

        info!(
            "Aggregated {} metric record(s) over {} frame(s)",
            records.len(),
            total
        );
        records
    }

    /// Releases engine resources. Idempotent; also runs on drop.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.engine.close();
        debug!("Scoring session closed");
    }

    fn allocate_picture(&mut self) -> Result<PlanarBuffer> {
        self.engine.allocate_picture(
            self.config.pixel_format,
            self.config.bit_depth,
            self.config.width,
            self.config.height,
        )
    }

    fn collect_record(&mut self, feature: Option<&str>, total: u64) -> MetricScores {
        let name = feature.unwrap_or(PRIMARY_METRIC);
        let mut record = MetricScores::empty(name);
        if total == 0 {
            return record;
        }
        let last = total - 1;

        record.mean = self.pooled(feature, PoolMethod::Mean, last);
        record.harmonic_mean = self.pooled(feature, PoolMethod::HarmonicMean, last);
        record.min = self.pooled(feature, PoolMethod::Min, last);
        record.max = self.pooled(feature, PoolMethod::Max, last);
        record.frame_scores = (0..total).map(|i| self.score_at(feature, i)).collect();

        debug!(
            "Collected '{}': {}/{} frame scores present",
            name,
            record.scored_frames(),
            total
        );
        record
    }

    fn pooled(&mut self, feature: Option<&str>, method: PoolMethod, last: u64) -> Option<f64> {
        let outcome = match feature {
            None => self.engine.pooled_score(method, 0, last),
            Some(name) => self.engine.pooled_feature_score(name, method, 0, last),
        };
        match outcome {
            Ok(score) => Some(score),
            Err(e) => {
                warn!(
                    "Pooled {:?} query for '{}' failed, leaving it undefined: {}",
                    method,
                    feature.unwrap_or(PRIMARY_METRIC),
                    e
                );
                None
            }
        }
    }

    fn score_at(&mut self, feature: Option<&str>, index: u64) -> Option<f64> {
        let outcome = match feature {
            None => self.engine.score_at(index),
            Some(name) => self.engine.feature_score_at(name, index),
        };
        match outcome {
            Ok(score) => Some(score),
            Err(e) => {
                warn!(
                    "Per-frame query for '{}' at index {} failed, leaving it undefined: {}",
                    feature.unwrap_or(PRIMARY_METRIC),
                    index,
                    e
                );
                None
            }
        }
    }
}

impl<E: ScoringEngine> Drop for Session<E> {
    fn drop(&mut self) {
        self.close();
    }
}

fn pack_drop_reason(e: VqError) -> DropReason {
    match e {
        VqError::SourceTooSmall { need, have } => DropReason::SourceTooSmall { need, have },
        other => DropReason::Allocation(other.to_string()),
    }
}
