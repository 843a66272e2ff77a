use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetAnalysisError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("{sets} input sets exceed the configured maximum of {max}")]
    CombinatorialLimit { sets: usize, max: usize },

    #[error("Set storage unavailable: {message}")]
    StorageUnavailable { message: String },

    #[error("Region count query failed: {message}")]
    RegionQueryFailure { message: String },

    #[error("Invalid state transition: {from} cannot accept '{event}'")]
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },

    #[error("Search backend request failed: {0}")]
    SearchRequest(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid value for {field}: {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing configuration field: {field}")]
    MissingConfig { field: String },
}

pub type Result<T> = std::result::Result<T, SetAnalysisError>;
