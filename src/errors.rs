use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Json parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}
