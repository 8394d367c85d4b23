use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShardlineError {
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    #[error("Invalid snowflake: {0}")]
    InvalidSnowflake(String),

    #[error("Malformed {kind}: {source}")]
    Malformed {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Shard pipeline closed")]
    PipelineClosed,
}

pub type Result<T> = std::result::Result<T, ShardlineError>;
