//! Dataset providers and submission sinks.
//!
//! The annotation core only sees [`DatasetProvider`] and
//! [`SubmissionSink`](crate::submission::SubmissionSink). Native builds get a
//! directory-backed provider and a file-backed sink.

#[cfg(not(target_arch = "wasm32"))]
mod directory;
#[cfg(not(target_arch = "wasm32"))]
mod file_sink;

#[cfg(not(target_arch = "wasm32"))]
pub use directory::DirectoryProvider;
#[cfg(not(target_arch = "wasm32"))]
pub use file_sink::FileSink;

use crate::error::AnnotationError;
use crate::model::{ImageRecord, ProcessDescriptor};

/// Source of a dataset's images and process descriptor.
///
/// Failures are reported as [`AnnotationError::FetchFailed`].
pub trait DatasetProvider {
    /// Ordered image sequence of `dataset`.
    fn fetch_images(&self, dataset: &str) -> Result<Vec<ImageRecord>, AnnotationError>;

    /// Process descriptor of `dataset`.
    fn fetch_process(&self, dataset: &str) -> Result<ProcessDescriptor, AnnotationError>;
}
