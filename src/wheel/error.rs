use thiserror::Error;

/// Rejected engine configuration. Raised by `configure` before any state changes.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("catalog is empty; a spin needs at least one item")]
    EmptyCatalog,
    #[error("{field} must be a finite number (got {value})")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be in ({min}, {max}) (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Operation invoked in a phase that forbids it.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum InvalidStateError {
    #[error("a spin is already in progress")]
    AlreadySpinning,
    #[error("no spin is in progress")]
    NotSpinning,
}
