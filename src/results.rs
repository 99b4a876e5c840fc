// src/results.rs

use serde::{Deserialize, Serialize};

/// Scores for one metric (or one channel of a channel-split metric) over
/// the whole ingested stream.
///
/// `frame_scores` always has one slot per ingested frame, in ingestion
/// order; a slot is `None` when that frame was dropped or its query failed.
/// Pooled stats are likewise `None` when their query failed or when zero
/// frames were ingested; degraded values are explicit, never a fake 0.0.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MetricScores {
    pub name: String,
    #[serde(rename = "frameScores")]
    pub frame_scores: Vec<Option<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(rename = "harmonic_mean", skip_serializing_if = "Option::is_none")]
    pub harmonic_mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl MetricScores {
    /// Record with no scores and all pooled stats undefined.
    pub fn empty(name: impl Into<String>) -> MetricScores {
        MetricScores {
            name: name.into(),
            ..MetricScores::default()
        }
    }

    /// Number of frames that actually carry a score.
    pub fn scored_frames(&self) -> usize {
        self.frame_scores.iter().filter(|s| s.is_some()).count()
    }
}
