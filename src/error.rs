use thiserror::Error;

/// Errors raised while building, training or tuning a network
#[derive(Error, Debug)]
pub enum NetError {
    #[error("invalid dimension: {name} must be positive, got {value}")]
    InvalidDimension { name: &'static str, value: usize },

    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    #[error("invalid hyperparameter: {0}")]
    InvalidHyperparameter(String),

    #[error("empty dataset: {0}")]
    EmptyDataset(&'static str),

    #[error("results log: {0}")]
    Io(#[from] std::io::Error),

    #[error("config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NetError>;
