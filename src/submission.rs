//! Submission payload and sink contract.
//!
//! # Wire format
//!
//! ```json
//! {
//!   "datasetName": "fabric01",
//!   "coordinatesData": {
//!     "img_001.png": { "hole": [[2, 3], [4, 1]], "stain": [] }
//!   }
//! }
//! ```
//!
//! The sink answers `{ "message": "..." }` on success or `{ "error": "..." }` on
//! failure.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::error::AnnotationError;
use crate::model::CellCoord;

/// Final annotation record sent to the submission sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub dataset_name: String,
    /// `filename → assignable class → ordered [col, row] pairs`
    pub coordinates_data: BTreeMap<String, BTreeMap<String, Vec<CellCoord>>>,
}

impl SubmissionPayload {
    /// Number of labeled cells across all images.
    pub fn cell_count(&self) -> usize {
        self.coordinates_data
            .values()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Response body returned by a submission sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmissionResponse {
    /// Payload was stored
    Accepted {
        /// Human-readable confirmation
        message: String,
    },
    /// Payload was refused
    Rejected {
        /// Human-readable reason
        error: String,
    },
}

impl SubmissionResponse {
    /// Parse a response body. Unknown shapes count as a failed submission.
    pub fn from_json(json: &str) -> Result<Self, AnnotationError> {
        serde_json::from_str(json).map_err(|e| {
            AnnotationError::submission_failed(format!("unrecognized sink response: {}", e))
        })
    }

    pub fn into_result(self) -> Result<SubmissionReceipt, AnnotationError> {
        match self {
            Self::Accepted { message } => Ok(SubmissionReceipt { message }),
            Self::Rejected { error } => Err(AnnotationError::submission_failed(error)),
        }
    }
}

/// Confirmation of an accepted submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Message to show the operator
    pub message: String,
}

/// Destination for finished annotation records.
///
/// Implementations report any transport failure, timeout or refusal as
/// [`AnnotationError::SubmissionFailed`]. They must not retry on their own.
pub trait SubmissionSink {
    fn submit(&mut self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, AnnotationError>;
}

/// A submission that has been issued and awaits its response.
///
/// Handed back to the session that minted it once the sink answers.
#[derive(Debug)]
pub struct PendingSubmission {
    pub(crate) session_id: u64,
    pub(crate) revision: u64,
    pub(crate) payload: SubmissionPayload,
    pub(crate) started: Instant,
}

impl PendingSubmission {
    /// Snapshot of the annotations being submitted.
    pub fn payload(&self) -> &SubmissionPayload {
        &self.payload
    }
}

/// What happened to a pending submission once its response was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionStatus {
    /// Sink accepted the payload.
    Accepted(SubmissionReceipt),
    /// The session that issued the submission is gone; the response was dropped.
    Discarded,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_wire_shape() {
        let mut per_class = BTreeMap::new();
        per_class.insert("hole".to_string(), vec![CellCoord::new(2, 3)]);
        per_class.insert("stain".to_string(), Vec::new());
        let mut coordinates_data = BTreeMap::new();
        coordinates_data.insert("img_001.png".to_string(), per_class);

        let payload = SubmissionPayload {
            dataset_name: "fabric01".to_string(),
            coordinates_data,
        };

        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "datasetName": "fabric01",
                "coordinatesData": {
                    "img_001.png": { "hole": [[2, 3]], "stain": [] }
                }
            })
        );
        assert_eq!(payload.cell_count(), 1);
    }

    #[test]
    fn test_response_success() {
        let response = SubmissionResponse::from_json(r#"{"message": "Saved"}"#).unwrap();
        assert_eq!(
            response.into_result(),
            Ok(SubmissionReceipt {
                message: "Saved".to_string()
            })
        );
    }

    #[test]
    fn test_response_error() {
        let response = SubmissionResponse::from_json(r#"{"error": "Dataset locked"}"#).unwrap();
        assert_eq!(
            response.into_result(),
            Err(AnnotationError::submission_failed("Dataset locked"))
        );
    }

    #[test]
    fn test_response_unknown_shape() {
        assert!(matches!(
            SubmissionResponse::from_json(r#"{"status": 200}"#),
            Err(AnnotationError::SubmissionFailed { .. })
        ));
    }
}
