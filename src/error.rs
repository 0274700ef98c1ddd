// ⚠️ Error types - one enum per concern
// Library code returns these; the binary wraps them with anyhow

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("\"{}\" is not a file", .0.display())]
    MissingInput(PathBuf),
    #[error("failed to read CSV from \"{}\": {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("failed to read id pool from \"{}\": {source}", path.display())]
    IdPool {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("io error on \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to extract configuration: {0}")]
    Extract(#[from] Box<figment::Error>),
    #[error("{field} is not a valid timestamp ({value:?}): {source}")]
    Timestamp {
        field: String,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("region id {0:?} is defined more than once")]
    DuplicateRegion(String),
    #[error("region id {0:?} is the same as the country id")]
    RegionIsCountry(String),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        ConfigError::Extract(Box::new(err))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write \"{}\": {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, thiserror::Error)]
#[error("validation failed: {issues} row issue(s), {conflicts} conflicting duplicate(s)")]
pub struct ValidationFailed {
    pub issues: usize,
    pub conflicts: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error(transparent)]
    Validation(#[from] ValidationFailed),
}
