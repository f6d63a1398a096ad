use shared::error::ServiceError;
use thiserror::Error;

/// Failure of one call to the generative service. Providers and the advisory
/// requestor collapse every variant to fallback data or an absent result.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generative service credentials are not configured")]
    MissingCredentials,
    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("service rejected request: {0}")]
    Status(#[from] ServiceError),
    #[error("service returned an empty response")]
    EmptyResponse,
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("menu database is not loaded yet")]
    MenuNotLoaded,
    #[error("a spin is already running")]
    AlreadySpinning,
    #[error("an advisory request is already in flight")]
    AnalysisInFlight,
    #[error("every category must settle before the meal can be analyzed")]
    SelectionIncomplete,
}
