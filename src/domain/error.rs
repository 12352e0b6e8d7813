// Error taxonomy for the charting pipeline
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between a token list and a chart on disk.
///
/// `InvalidToken`, `DegenerateSlice` and `RenderWrite` are scoped to a single
/// token or job; the rest end the whole invocation.
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("invalid timescale token '{token}': {reason}")]
    InvalidToken { token: String, reason: String },

    #[error("no valid timescale tokens supplied")]
    NoTokens,

    #[error("series store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("store returned no rows between {start} and {end}")]
    EmptyResult { start: String, end: String },

    #[error("{token} slice holds {samples} sample(s), nothing to draw")]
    DegenerateSlice { token: String, samples: usize },

    #[error("failed to write {}: {}", .path.display(), .reason)]
    RenderWrite { path: PathBuf, reason: String },

    #[error("render job {job} did not finish: {reason}")]
    JobAborted { job: String, reason: String },

    #[error("rejected reading: {0}")]
    InvalidReading(String),
}

impl GraphError {
    pub fn invalid_token(token: &str, reason: impl Into<String>) -> Self {
        GraphError::InvalidToken {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}
