use thiserror::Error;

/// Input problems caught before anything is written.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields.")]
    MissingRequired,
    #[error("{0}")]
    InvalidCoordinates(String),
    #[error("unknown {field} '{value}'")]
    UnknownValue { field: &'static str, value: String },
    #[error("{0}")]
    Rejected(String),
}

/// Failure on the live snapshot channel. Consumers treat it as an empty set.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("live feed unavailable: {0}")]
    Unavailable(String),
    #[error("malformed snapshot: {0}")]
    Malformed(String),
}
