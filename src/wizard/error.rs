//! Error types for the wizard core

use std::path::PathBuf;

use thiserror::Error;

use super::step::StepId;

/// Failures of the persisted flow store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to read flow state at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write flow state at {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("flow state at {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize flow state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Errors surfaced by the wizard controller
#[derive(Error, Debug)]
pub enum WizardError {
    #[error("unknown wizard step '{0}'")]
    UnknownStep(String),

    #[error("step {to} is not part of this wizard (from {from})")]
    StepNotInRegistry { from: StepId, to: StepId },

    #[error("feed identifier '{0}' is not valid percent-encoded UTF-8")]
    InvalidFeed(String),

    #[error("wizard controller has already been disposed")]
    Disposed,

    #[error(transparent)]
    Store(#[from] StoreError),
}
