// src/features.rs

use crate::config::MetricSelection;
use crate::engine::ScoringEngine;
use log::{debug, warn};
use serde::Serialize;

/// One optional metric the engine can register on top of the model.
#[derive(Debug, Clone, Copy)]
pub struct MetricDescriptor {
    /// Position in the selection bitmask.
    pub bit: u32,
    /// Canonical extractor name the engine registers.
    pub name: &'static str,
    /// Whether this metric reports three per-channel streams instead of one
    /// aggregate stream.
    pub channel_split: bool,
}

/// The fixed metric catalog, in bitmask order. The order is load-bearing:
/// result records are emitted in this order, after the primary metric.
pub const METRIC_CATALOG: [MetricDescriptor; 6] = [
    MetricDescriptor {
        bit: 1 << 0,
        name: "psnr",
        channel_split: true,
    },
    MetricDescriptor {
        bit: 1 << 1,
        name: "psnr_hvs",
        channel_split: false,
    },
    MetricDescriptor {
        bit: 1 << 2,
        name: "float_ssim",
        channel_split: false,
    },
    MetricDescriptor {
        bit: 1 << 3,
        name: "float_ms_ssim",
        channel_split: false,
    },
    MetricDescriptor {
        bit: 1 << 4,
        name: "ciede",
        channel_split: false,
    },
    MetricDescriptor {
        bit: 1 << 5,
        name: "cambi",
        channel_split: false,
    },
];

/// Per-channel name suffixes, in plane order (luma, chroma-b, chroma-r).
const CHANNEL_SUFFIXES: [&str; 3] = ["_y", "_cb", "_cr"];

impl MetricDescriptor {
    /// Names this metric contributes to the registry once registered:
    /// either the canonical name or the three channel-split expansions.
    pub fn registered_names(&self) -> Vec<String> {
        if self.channel_split {
            CHANNEL_SUFFIXES
                .iter()
                .map(|suffix| format!("{}{}", self.name, suffix))
                .collect()
        } else {
            vec![self.name.to_string()]
        }
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Registered,
    Skipped { reason: String },
}

/// Outcome of one attempted feature registration, kept so callers can tell
/// a deliberately omitted metric from one that never existed.
#[derive(Serialize, Debug, Clone)]
pub struct FeatureOutcome {
    pub metric: &'static str,
    pub status: RegistrationStatus,
}

/// Ordered bookkeeping of which requested metrics actually registered.
///
/// Built exactly once during session construction and immutable afterwards;
/// the result aggregator walks `names()` in order to shape its output.
#[derive(Debug, Default)]
pub struct FeatureRegistry {
    names: Vec<String>,
    outcomes: Vec<FeatureOutcome>,
}

impl FeatureRegistry {
    /// Walks the catalog in bit order and registers every selected metric.
    /// A registration failure is non-fatal: the metric is recorded as
    /// skipped and simply omitted from the output, while the session as a
    /// whole proceeds.
    pub fn build<E: ScoringEngine>(selection: MetricSelection, engine: &mut E) -> FeatureRegistry {
        let mut registry = FeatureRegistry::default();

        for desc in &METRIC_CATALOG {
            if !selection.contains_bit(desc.bit) {
                continue;
            }
            match engine.register_feature(desc.name) {
                Ok(()) => {
                    debug!("Registered feature extractor '{}'", desc.name);
                    registry.names.extend(desc.registered_names());
                    registry.outcomes.push(FeatureOutcome {
                        metric: desc.name,
                        status: RegistrationStatus::Registered,
                    });
                }
                Err(e) => {
                    warn!(
                        "Feature extractor '{}' failed to register, omitting it: {}",
                        desc.name, e
                    );
                    registry.outcomes.push(FeatureOutcome {
                        metric: desc.name,
                        status: RegistrationStatus::Skipped {
                            reason: e.to_string(),
                        },
                    });
                }
            }
        }
        registry
    }

    /// Registered metric/channel names, in catalog order with channel-split
    /// expansion applied.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// One outcome per selected catalog entry, registered or not.
    pub fn outcomes(&self) -> &[FeatureOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
