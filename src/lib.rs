// src/lib.rs

//! Orchestration core for per-frame video quality scoring.
//!
//! `vqcore` accepts paired reference/distorted picture buffers, packs them
//! into the planar layout an external metric-scoring engine expects, drives
//! frame-by-frame scoring, and aggregates per-frame and pooled statistics
//! once the stream ends. The metric math itself lives behind the
//! [`ScoringEngine`] trait; this crate only shapes calls and responses.
//!
//! Typical flow:
//!
//! ```text
//! SessionConfig -> Session::new (engine context + model + feature registry)
//!   -> Session::put_frame per pair -> Session::get_result (flushes first)
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod features;
pub mod frame;
pub mod results;
pub mod session;

pub use config::{MetricSelection, PixelFormat, SessionConfig};
pub use engine::{EngineLogLevel, PoolMethod, ScoringEngine};
pub use error::{Result, VqError};
pub use features::{
    FeatureOutcome, FeatureRegistry, METRIC_CATALOG, MetricDescriptor, RegistrationStatus,
};
pub use frame::{PlanarBuffer, pack_frame, packed_frame_size};
pub use results::MetricScores;
pub use session::{DropReason, FrameStatus, PRIMARY_METRIC, Session};
