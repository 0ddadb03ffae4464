/// Errors produced by the `match-core` crate.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A head count was zero or negative.
    #[error("invalid head count {value}: must be at least 1")]
    InvalidHeadCount { value: i64 },

    /// A row identifier could not be parsed.
    #[error("invalid {resource} id '{value}'")]
    InvalidId { resource: &'static str, value: String },
}
