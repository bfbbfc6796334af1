use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Problems caught locally before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a starting point.")]
    EmptyStartingPoint,
    #[error("No places selected.")]
    NoPlaces,
    #[error("Missing coordinates for: {}", .0.join(", "))]
    MissingCoordinates(Vec<String>),
}

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("an optimization request is already in flight")]
    InFlight,
    #[error("the planning screen has been closed")]
    Closed,
    #[error("response belongs to a superseded request")]
    Stale,
    #[error(transparent)]
    Api(#[from] ApiError),
}
