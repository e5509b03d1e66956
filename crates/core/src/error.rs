use thiserror::Error;

#[derive(Error, Debug)]
pub enum AthenaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Module not initialized: {0}")]
    NotInitialized(String),
}
