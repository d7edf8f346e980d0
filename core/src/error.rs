//! Error types for the pure, I/O-free parts of the pipeline.

/// Something that should never happen if the chain snapshot is internally
/// consistent, but which we guard against rather than panic on.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// An active validator had no exposure data attached. The caller is expected to
    /// log this and skip the validator rather than abort the run.
    #[error("validator {stash} is active but carries no exposure data")]
    MissingExposure { stash: String },
}
