// src/config.rs

use crate::error::{Result, VqError};
use serde::{Deserialize, Serialize};
use std::ops::{BitOr, BitOrAssign};
use std::path::PathBuf;

/// Planar YUV chroma subsampling layout of the caller's frame buffers.
///
/// `Unknown` exists so probed/foreign formats have somewhere to land; it is
/// rejected by [`SessionConfig::validate`] before any packing can happen
/// (its chroma planes would degenerate to 0x0).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PixelFormat {
    Yuv420p,
    Yuv422p,
    Yuv444p,
    Unknown,
}

impl PixelFormat {
    pub fn is_supported(self) -> bool {
        !matches!(self, PixelFormat::Unknown)
    }
}

/// Bitmask of optional metrics to register on top of the primary score.
///
/// Bit positions follow the fixed catalog order in [`crate::features`];
/// the primary metric has no bit and is always computed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct MetricSelection(u32);

impl MetricSelection {
    pub const NONE: MetricSelection = MetricSelection(0);
    pub const PSNR: MetricSelection = MetricSelection(1 << 0);
    pub const PSNR_HVS: MetricSelection = MetricSelection(1 << 1);
    pub const FLOAT_SSIM: MetricSelection = MetricSelection(1 << 2);
    pub const FLOAT_MS_SSIM: MetricSelection = MetricSelection(1 << 3);
    /// Computationally expensive; upstream policy usually leaves this off.
    pub const CIEDE: MetricSelection = MetricSelection(1 << 4);
    pub const CAMBI: MetricSelection = MetricSelection(1 << 5);

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn contains_bit(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for MetricSelection {
    type Output = MetricSelection;

    fn bitor(self, rhs: MetricSelection) -> MetricSelection {
        MetricSelection(self.0 | rhs.0)
    }
}

impl BitOrAssign for MetricSelection {
    fn bitor_assign(&mut self, rhs: MetricSelection) {
        self.0 |= rhs.0;
    }
}

/// Immutable parameters for one scoring session.
///
/// The model path is opaque to this crate; its format is owned by the
/// scoring engine. The thread count is advisory and consumed entirely by
/// the engine's internal parallelism.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionConfig {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u32,
    pub pixel_format: PixelFormat,
    pub threads: u32,
    pub model_path: PathBuf,
    pub metrics: MetricSelection,
}

impl SessionConfig {
    /// Config with 8-bit depth, all logical cores, and no extra metrics.
    pub fn new(
        width: u32,
        height: u32,
        pixel_format: PixelFormat,
        model_path: impl Into<PathBuf>,
    ) -> Self {
        SessionConfig {
            width,
            height,
            bit_depth: 8,
            pixel_format,
            threads: num_cpus::get() as u32,
            model_path: model_path.into(),
            metrics: MetricSelection::NONE,
        }
    }

    /// Rejects degenerate geometry and unsupported formats up front, before
    /// any engine resource is acquired or any plane geometry is derived.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(VqError::Config(format!(
                "picture dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.pixel_format.is_supported() {
            return Err(VqError::Config(
                "unsupported pixel format (chroma planes would be 0x0)".to_string(),
            ));
        }
        if !(8..=16).contains(&self.bit_depth) {
            return Err(VqError::Config(format!(
                "bit depth must be in 8..=16, got {}",
                self.bit_depth
            )));
        }
        if self.threads == 0 {
            return Err(VqError::Config("thread count must be >= 1".to_string()));
        }
        Ok(())
    }
}
