use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("tensor backend: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("frame of {len} bytes does not match {width}x{height} RGB")]
    FrameGeometry { width: u32, height: u32, len: usize },

    #[error("checkpoint {}: {reason}", path.display())]
    Checkpoint { path: PathBuf, reason: String },

    #[error("parameter `{0}` missing from parameter set")]
    MissingParameter(String),

    #[error("action index {index} outside action space of {actions}")]
    ActionOutOfRange { index: usize, actions: usize },

    #[error("parameter store lock poisoned")]
    LockPoisoned,

    #[error("report: {0}")]
    Report(#[from] polars::error::PolarsError),

    #[cfg(feature = "gym")]
    #[error("python: {0}")]
    Python(#[from] pyo3::PyErr),
}

pub type Result<T> = std::result::Result<T, Error>;
