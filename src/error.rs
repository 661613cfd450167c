use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightsError {
    #[error("Source not available: {location}")]
    SourceUnavailable { location: String },

    #[error("Schema error in source '{source_name}': {details}")]
    Schema { source_name: String, details: String },

    #[error("Could not parse value '{value}' in column '{column}'")]
    Parse { column: String, value: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InsightsError>;
