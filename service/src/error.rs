//! Layered error types for everything that touches the outside world.

use thiserror::Error;

/// Failure loading or validating the on-disk configuration. Fatal: the process
/// exits before the scheduler ever starts.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure talking to the chain over JSON-RPC.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ChainError {
    #[error("rpc error: {0}")]
    Rpc(#[from] jsonrpsee::core::ClientError),
    #[error("failed to decode rpc response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("chain returned no best block")]
    NoBestBlock,
}

/// Failure talking to Postgres.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SqlError {
    #[error("database error: {0}")]
    Query(#[from] sqlx::Error),
}

/// Failure talking to an external HTTP endpoint (the thousand-validator program).
/// Callers treat this as non-fatal per the pipeline's error design; it's still a
/// distinct type so the log message is specific about which leg failed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HttpError {
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),
}

/// The umbrella error a single pipeline run can fail with. The scheduler catches
/// this, logs it, and re-arms rather than propagating it out of the process.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Chain(#[from] ChainError),
    #[error(transparent)]
    Sql(#[from] SqlError),
    #[error(transparent)]
    Http(#[from] HttpError),
}
