use thiserror::Error;

/// Top-level error type for centerline splitting and bifurcation analysis.
#[derive(Debug, Error)]
pub enum BranchingError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Configuration errors: a required named array or parameter is unavailable.
///
/// These abort the current invocation and are never retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("parameter {0} is not set")]
    UnsetParameter(&'static str),

    #[error("point array `{0}` does not exist")]
    MissingPointArray(String),

    #[error("cell array `{0}` does not exist")]
    MissingCellArray(String),

    #[error("array `{name}` has {actual} tuples, expected {expected}")]
    ArrayLength {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Errors related to the input geometry itself.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    #[error("empty input: {0}")]
    EmptyInput(&'static str),

    #[error("point id {point_id} referenced by cell {cell_id} is out of range")]
    PointOutOfRange { cell_id: usize, point_id: usize },
}

/// Convenience type alias for results using [`BranchingError`].
pub type Result<T> = std::result::Result<T, BranchingError>;
