//! Error types for the crop advisor

use thiserror::Error;

/// Result type alias for crop advisor operations
pub type Result<T> = std::result::Result<T, CropBuddyError>;

#[derive(Error, Debug)]
pub enum CropBuddyError {

    // =============================
    // Dialogue Errors
    // =============================

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Knowledge base error: {0}")]
    KnowledgeBase(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Session error: {0}")]
    Session(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
