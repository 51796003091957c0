use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid service port: {0:?}")]
    InvalidPort(String),

    #[error("Invalid manifest document: {0}")]
    InvalidManifest(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
