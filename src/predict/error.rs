use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("TLE directory not found: {0}")]
    DirectoryNotFound(String),
    #[error("TLE file read error: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Invalid TLE format in {file}: {message}")]
    InvalidTle { file: String, message: String },
    #[error("Invalid observer: {0}")]
    InvalidObserver(String),
    #[error("Propagation error: {0}")]
    Propagation(String),
}

impl From<sgp4::ElementsError> for PredictError {
    fn from(err: sgp4::ElementsError) -> Self {
        PredictError::Propagation(err.to_string())
    }
}
