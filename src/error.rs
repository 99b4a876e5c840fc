// src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VqError {
    #[error("Invalid session configuration: {0}")]
    Config(String),

    #[error("Scoring engine initialization failed: {0}")]
    Init(String),

    #[error("Failed to load model '{path}': {reason}")]
    ModelLoad { path: String, reason: String },

    #[error("Scoring engine call failed: {0}")]
    Engine(String),

    #[error("Planar buffer allocation failed: {0}")]
    Allocation(String),

    #[error("Source frame buffer too small: need {need} bytes, have {have}")]
    SourceTooSmall { need: usize, have: usize },
}

// Define a standard Result type for the crate
pub type Result<T> = std::result::Result<T, VqError>;
