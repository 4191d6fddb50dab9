//! Patchgrid - grid patch annotation engine
//!
//! Renders an image divided into a fixed-size grid, lets an operator toggle grid
//! cells into one of several mutually exclusive defect classes, and produces a
//! per-image annotation record for submission.

pub mod annotation;
pub mod color_utils;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod input;
pub mod message;
pub mod model;
pub mod overlay;
pub mod provider;
pub mod renderer;
pub mod session;
pub mod submission;

pub use annotation::{AnnotationStore, ImageAnnotations, ToggleOutcome};
pub use error::AnnotationError;
pub use model::{CellCoord, GridConfig, GridLimits, ImageRecord, ProcessDescriptor};
pub use session::{AnnotationSession, ClickOutcome, SessionLoader};
pub use submission::{SubmissionPayload, SubmissionReceipt, SubmissionSink};
