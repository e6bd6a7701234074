use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// No contestants, or an event config that cannot describe a bracket.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A later-round result already depends on this match.
    #[error("match {match_number} cannot be modified because a result for match {parent} has already been entered")]
    Conflict { match_number: u32, parent: u32 },

    /// An antecedent match has not been decided yet.
    #[error("match {match_number} cannot be entered until match {antecedent} has a result")]
    Precondition { match_number: u32, antecedent: u32 },

    /// Malformed score or disqualification input.
    #[error("invalid result: {0}")]
    Validation(String),

    /// The event is in the wrong lifecycle phase for the request.
    #[error("invalid event state: expected {expected}, got {actual}")]
    InvalidState {
        expected: &'static str,
        actual: String,
    },

    /// Reading a config or env file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A config file did not parse.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
