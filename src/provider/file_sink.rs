//! Sink writing submissions as JSON files.

use std::path::{Path, PathBuf};

use crate::error::AnnotationError;
use crate::submission::{SubmissionPayload, SubmissionReceipt, SubmissionSink};

/// Writes each accepted payload to `<output_dir>/<dataset>_annotations.json`.
///
/// A later submission for the same dataset replaces the earlier file.
#[derive(Debug, Clone)]
pub struct FileSink {
    output_dir: PathBuf,
}

impl FileSink {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Path the payload of `dataset` is written to.
    pub fn path_for(&self, dataset: &str) -> PathBuf {
        self.output_dir.join(format!("{}_annotations.json", dataset))
    }

    fn write(&self, path: &Path, payload: &SubmissionPayload) -> Result<(), AnnotationError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|e| {
            AnnotationError::submission_failed(format!("cannot create {:?}: {}", self.output_dir, e))
        })?;
        let json = payload
            .to_json()
            .map_err(|e| AnnotationError::submission_failed(format!("cannot encode payload: {}", e)))?;
        std::fs::write(path, json)
            .map_err(|e| AnnotationError::submission_failed(format!("cannot write {:?}: {}", path, e)))
    }
}

impl SubmissionSink for FileSink {
    fn submit(&mut self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, AnnotationError> {
        let path = self.path_for(&payload.dataset_name);
        self.write(&path, payload)?;
        Ok(SubmissionReceipt {
            message: format!(
                "Saved {} labeled cells for '{}' to {}",
                payload.cell_count(),
                payload.dataset_name,
                path.display()
            ),
        })
    }
}
