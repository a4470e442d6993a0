//! Error handling for the study-variable engine.

/// Specialized error type for the study-variable engine
#[derive(Debug, thiserror::Error)]
pub enum StudyvarError {
    /// A supplied document has the wrong overall structure
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Error in a cohort filter definition
    #[error("Filter error: {0}")]
    FilterError(String),
}

impl StudyvarError {
    /// Create an invalid-document error with a message
    pub fn invalid_document(message: impl Into<String>) -> Self {
        Self::InvalidDocument(message.into())
    }

    /// Create a filter error with a message
    pub fn filter_error(message: impl Into<String>) -> Self {
        Self::FilterError(message.into())
    }
}

/// Result type for study-variable engine operations
pub type Result<T> = std::result::Result<T, StudyvarError>;
