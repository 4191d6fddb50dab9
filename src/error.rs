//! Error types for the annotation engine.

use thiserror::Error;

/// Errors raised while configuring, editing or submitting an annotation session.
///
/// Every variant is recoverable by the operator. An operation that returns one of
/// these leaves the annotation store exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnnotationError {
    /// Process descriptor could not be turned into a grid
    #[error("Invalid process configuration: {message}")]
    InvalidConfig {
        /// Description of what is wrong with the descriptor
        message: String,
    },

    /// Class is unknown or is the default (unlabeled) class
    #[error("Invalid class '{class}': not an assignable class")]
    InvalidClass {
        /// The rejected class name
        class: String,
    },

    /// Cell lies outside the rendered grid
    #[error("Cell ({col}, {row}) is outside the annotation grid")]
    OutOfBounds {
        /// Column the pointer mapped to
        col: i64,
        /// Row the pointer mapped to
        row: i64,
    },

    /// Filename is not part of the session's image sequence
    #[error("Unknown image: {filename}")]
    UnknownImage {
        /// The missing filename
        filename: String,
    },

    /// Images or process descriptor could not be obtained
    #[error("Fetch failed: {message}")]
    FetchFailed {
        /// Description of the failure
        message: String,
    },

    /// Submission sink rejected the payload or could not be reached
    #[error("Submission failed: {message}")]
    SubmissionFailed {
        /// Description of the failure
        message: String,
    },

    /// A submission is already awaiting its response
    #[error("A submission is already in flight")]
    SubmissionInFlight,
}

impl AnnotationError {
    /// Create an invalid configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an invalid class error.
    pub fn invalid_class(class: impl Into<String>) -> Self {
        Self::InvalidClass {
            class: class.into(),
        }
    }

    /// Create an unknown image error.
    pub fn unknown_image(filename: impl Into<String>) -> Self {
        Self::UnknownImage {
            filename: filename.into(),
        }
    }

    /// Create a fetch failure.
    pub fn fetch_failed(message: impl Into<String>) -> Self {
        Self::FetchFailed {
            message: message.into(),
        }
    }

    /// Create a submission failure.
    pub fn submission_failed(message: impl Into<String>) -> Self {
        Self::SubmissionFailed {
            message: message.into(),
        }
    }
}
