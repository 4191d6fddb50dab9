//! Session-level scenarios: loading, clicking, navigation and submission.

use image::{Rgba, RgbaImage};

use crate::annotation::ToggleOutcome;
use crate::color_utils::color_for;
use crate::error::AnnotationError;
use crate::model::{CellCoord, GridLimits, ImageRecord, ProcessDescriptor};
use crate::provider::DatasetProvider;
use crate::session::{AnnotationSession, ClickOutcome, SessionLoader};
use crate::submission::{SubmissionPayload, SubmissionReceipt, SubmissionSink, SubmissionStatus};

/// Sink that records payloads and answers with a canned result.
struct RecordingSink {
    fail_with: Option<String>,
    received: Vec<SubmissionPayload>,
}

impl RecordingSink {
    fn accepting() -> Self {
        Self {
            fail_with: None,
            received: Vec::new(),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            received: Vec::new(),
        }
    }
}

impl SubmissionSink for RecordingSink {
    fn submit(&mut self, payload: &SubmissionPayload) -> Result<SubmissionReceipt, AnnotationError> {
        self.received.push(payload.clone());
        match &self.fail_with {
            Some(message) => Err(AnnotationError::submission_failed(message.clone())),
            None => Ok(SubmissionReceipt {
                message: "Annotations saved".to_string(),
            }),
        }
    }
}

/// In-memory provider for loader tests.
struct StaticProvider {
    images: Vec<ImageRecord>,
    descriptor: Option<ProcessDescriptor>,
}

impl DatasetProvider for StaticProvider {
    fn fetch_images(&self, _dataset: &str) -> Result<Vec<ImageRecord>, AnnotationError> {
        Ok(self.images.clone())
    }

    fn fetch_process(&self, dataset: &str) -> Result<ProcessDescriptor, AnnotationError> {
        self.descriptor
            .clone()
            .ok_or_else(|| AnnotationError::fetch_failed(format!("no process for '{}'", dataset)))
    }
}

fn fabric_images() -> Vec<ImageRecord> {
    vec![
        ImageRecord::new("img_001.png", RgbaImage::from_pixel(320, 320, Rgba([180, 180, 180, 255]))),
        ImageRecord::new("img_002.png", RgbaImage::from_pixel(320, 320, Rgba([90, 90, 90, 255]))),
    ]
}

fn fabric_descriptor() -> ProcessDescriptor {
    ProcessDescriptor::new(320, 320, 32, "ok,hole,stain")
}

/// Dataset "fabric01": 2 images, classes ok/hole/stain, 10x10 grid.
fn fabric_session() -> AnnotationSession {
    let mut loader = SessionLoader::new("fabric01");
    loader.receive_images(fabric_images()).unwrap();
    loader.receive_process(&fabric_descriptor()).unwrap();
    loader.build().unwrap()
}

/// Pointer position at the center of `coord` on a surface at the origin.
fn center_of(coord: CellCoord) -> (f32, f32) {
    ((coord.col * 32 + 16) as f32, (coord.row * 32 + 16) as f32)
}

// ============================================================================
// Loading
// ============================================================================

#[test]
fn test_fabric_session_layout() {
    let session = fabric_session();

    assert_eq!(session.dataset_name(), "fabric01");
    assert_eq!(session.image_count(), 2);
    assert_eq!(session.config().grid_width(), 10);
    assert_eq!(session.config().grid_height(), 10);
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.current_filename(), "img_001.png");
    assert_eq!(session.selected_class(), "ok");
    assert_eq!(session.store().image_count(), 2);
    assert_eq!(session.renderer().frames_rendered(), 1);
    assert_eq!(session.frame().dimensions(), (320, 320));
}

#[test]
fn test_loader_is_order_independent() {
    let mut loader = SessionLoader::new("fabric01");
    loader.receive_process(&fabric_descriptor()).unwrap();
    assert!(!loader.is_ready());
    loader.receive_images(fabric_images()).unwrap();
    assert!(loader.is_ready());

    let session = loader.build().unwrap();
    assert_eq!(session.image_count(), 2);
}

#[test]
fn test_loader_requires_both_inputs() {
    let mut loader = SessionLoader::new("fabric01");
    loader.receive_images(fabric_images()).unwrap();
    assert!(matches!(loader.build(), Err(AnnotationError::FetchFailed { .. })));

    let mut loader = SessionLoader::new("fabric01");
    loader.receive_process(&fabric_descriptor()).unwrap();
    assert!(matches!(loader.build(), Err(AnnotationError::FetchFailed { .. })));
}

#[test]
fn test_loader_rejects_bad_inputs() {
    let mut loader = SessionLoader::new("fabric01");
    assert!(matches!(
        loader.receive_images(Vec::new()),
        Err(AnnotationError::FetchFailed { .. })
    ));

    let mut duplicated = fabric_images();
    duplicated.push(duplicated[0].clone());
    assert!(matches!(
        loader.receive_images(duplicated),
        Err(AnnotationError::FetchFailed { .. })
    ));

    assert!(matches!(
        loader.receive_process(&ProcessDescriptor::new(300, 320, 32, "ok,hole")),
        Err(AnnotationError::InvalidConfig { .. })
    ));
    assert!(!loader.is_ready());
}

#[test]
fn test_loader_with_limits() {
    let images = vec![ImageRecord::new("tiny.png", RgbaImage::new(64, 64))];
    let mut loader = SessionLoader::new("tiny").with_limits(GridLimits {
        min_patch_size: 8,
        min_resize: 64,
    });
    loader.receive_images(images).unwrap();
    loader.receive_process(&ProcessDescriptor::new(64, 64, 16, "bg,crack")).unwrap();

    let session = loader.build().unwrap();
    assert_eq!(session.config().grid_width(), 4);
}

#[test]
fn test_load_from_provider() {
    let provider = StaticProvider {
        images: fabric_images(),
        descriptor: Some(fabric_descriptor()),
    };
    let session = SessionLoader::new("fabric01").load(&provider).unwrap();
    assert_eq!(session.image_count(), 2);

    let broken = StaticProvider {
        images: fabric_images(),
        descriptor: None,
    };
    assert!(matches!(
        SessionLoader::new("fabric01").load(&broken),
        Err(AnnotationError::FetchFailed { .. })
    ));
}

// ============================================================================
// Clicking and class selection
// ============================================================================

#[test]
fn test_click_same_cell_twice_clears_it() {
    let mut session = fabric_session();
    session.set_selected_class("hole").unwrap();
    let cell = CellCoord::new(2, 3);

    let first = session.handle_click(center_of(cell), (0.0, 0.0)).unwrap();
    assert_eq!(
        first,
        ClickOutcome::Toggled {
            coord: cell,
            outcome: ToggleOutcome::Assigned
        }
    );
    session.handle_click(center_of(cell), (0.0, 0.0)).unwrap();

    let entry = session.store().annotations("img_001.png").unwrap();
    assert!(entry.cells(0).unwrap().is_empty());
    assert!(entry.is_empty());
}

#[test]
fn test_reselecting_class_steals_cell() {
    let mut session = fabric_session();
    let cell = CellCoord::new(2, 3);

    session.set_selected_class("hole").unwrap();
    session.handle_click(center_of(cell), (0.0, 0.0)).unwrap();
    session.set_selected_class("stain").unwrap();
    let outcome = session.handle_click(center_of(cell), (0.0, 0.0)).unwrap();

    assert_eq!(
        outcome,
        ClickOutcome::Toggled {
            coord: cell,
            outcome: ToggleOutcome::Reassigned {
                from: "hole".to_string()
            }
        }
    );
    let payload = session.to_payload();
    assert_eq!(payload.coordinates_data["img_001.png"]["stain"], vec![cell]);
    assert!(payload.coordinates_data["img_001.png"]["hole"].is_empty());
}

#[test]
fn test_click_with_default_class_is_noop() {
    let mut session = fabric_session();

    let outcome = session.handle_click((10.0, 10.0), (0.0, 0.0)).unwrap();

    assert_eq!(outcome, ClickOutcome::NoClassSelected);
    assert_eq!(session.store().labeled_cell_count(), 0);
    assert!(session.can_deactivate());
}

#[test]
fn test_click_outside_grid_is_ignored() {
    let mut session = fabric_session();
    session.set_selected_class("hole").unwrap();
    let frames = session.renderer().frames_rendered();

    assert_eq!(
        session.handle_click((320.0, 0.0), (0.0, 0.0)).unwrap(),
        ClickOutcome::OutOfBounds
    );
    assert_eq!(
        session.handle_click((5.0, 5.0), (10.0, 10.0)).unwrap(),
        ClickOutcome::OutOfBounds
    );
    assert_eq!(session.store().revision(), 0);
    assert_eq!(session.renderer().frames_rendered(), frames);
    assert!(session.can_deactivate());
}

#[test]
fn test_click_respects_canvas_origin() {
    let mut session = fabric_session();
    session.set_selected_class("stain").unwrap();

    session.handle_click((100.0 + 5.0, 40.0 + 70.0), (100.0, 40.0)).unwrap();

    assert_eq!(
        session.store().class_of("img_001.png", CellCoord::new(0, 2)),
        Some("stain")
    );
}

#[test]
fn test_set_selected_class_validates() {
    let mut session = fabric_session();

    assert_eq!(
        session.set_selected_class("ok"),
        Err(AnnotationError::invalid_class("ok"))
    );
    assert!(session.set_selected_class("scratch").is_err());
    assert_eq!(session.selected_class(), "ok");

    session.set_selected_class("stain").unwrap();
    assert!(session.set_selected_class("ok").is_err());
    assert_eq!(session.selected_class(), "stain");
}

#[test]
fn test_toggle_redraws_current_frame() {
    let mut session = fabric_session();
    session.set_selected_class("hole").unwrap();
    let frames = session.renderer().frames_rendered();

    session.toggle_cell(CellCoord::new(0, 0)).unwrap();

    assert_eq!(session.renderer().frames_rendered(), frames + 1);
    assert_eq!(*session.frame().get_pixel(10, 1), color_for(0));

    // Editing an image that isn't shown doesn't redraw
    session
        .toggle("img_002.png", CellCoord::new(1, 1), "stain")
        .unwrap();
    assert_eq!(session.renderer().frames_rendered(), frames + 1);
}

// ============================================================================
// Navigation
// ============================================================================

#[test]
fn test_navigation_is_clamped() {
    let mut session = fabric_session();

    assert!(!session.prev());
    assert_eq!(session.current_index(), 0);

    assert!(session.next());
    assert_eq!(session.current_filename(), "img_002.png");
    assert!(!session.next());
    assert_eq!(session.current_index(), 1);

    assert!(session.prev());
    assert_eq!(session.current_index(), 0);

    assert!(session.go_to(99));
    assert_eq!(session.current_index(), 1);
}

#[test]
fn test_navigation_redraws_and_keeps_annotations() {
    let mut session = fabric_session();
    session.set_selected_class("hole").unwrap();
    session.toggle_cell(CellCoord::new(0, 0)).unwrap();
    let frames = session.renderer().frames_rendered();

    session.next();
    assert_eq!(session.renderer().frames_rendered(), frames + 1);
    assert_eq!(*session.frame().get_pixel(40, 40), Rgba([90, 90, 90, 255]));
    assert_ne!(*session.frame().get_pixel(10, 1), color_for(0));

    session.prev();
    assert_eq!(*session.frame().get_pixel(10, 1), color_for(0));
    assert_eq!(
        session.store().class_of("img_001.png", CellCoord::new(0, 0)),
        Some("hole")
    );
}

#[test]
fn test_clicks_apply_to_current_image() {
    let mut session = fabric_session();
    session.set_selected_class("hole").unwrap();
    session.next();

    session.handle_click(center_of(CellCoord::new(5, 5)), (0.0, 0.0)).unwrap();

    assert_eq!(
        session.store().class_of("img_002.png", CellCoord::new(5, 5)),
        Some("hole")
    );
    assert_eq!(session.store().class_of("img_001.png", CellCoord::new(5, 5)), None);
}

// ============================================================================
// Unsaved work and submission
// ============================================================================

#[test]
fn test_unsaved_work_gate() {
    let mut session = fabric_session();
    let mut sink = RecordingSink::accepting();
    assert!(session.can_deactivate());

    session.set_selected_class("hole").unwrap();
    session.toggle_cell(CellCoord::new(2, 3)).unwrap();
    assert!(!session.can_deactivate());

    let receipt = session.submit(&mut sink).unwrap();
    assert_eq!(receipt.message, "Annotations saved");
    assert!(session.can_deactivate());
    assert_eq!(sink.received.len(), 1);
    assert_eq!(sink.received[0].dataset_name, "fabric01");
    assert_eq!(sink.received[0].cell_count(), 1);
}

#[test]
fn test_failed_submission_keeps_work() {
    let mut session = fabric_session();
    session.set_selected_class("stain").unwrap();
    session.toggle_cell(CellCoord::new(1, 1)).unwrap();

    let mut sink = RecordingSink::failing("backend unavailable");
    assert_eq!(
        session.submit(&mut sink),
        Err(AnnotationError::submission_failed("backend unavailable"))
    );
    assert!(!session.can_deactivate());
    assert!(!session.is_submitting());
    assert_eq!(session.store().labeled_cell_count(), 1);

    // Operator retries
    let mut sink = RecordingSink::accepting();
    session.submit(&mut sink).unwrap();
    assert!(session.can_deactivate());
}

#[test]
fn test_second_submission_blocked_while_in_flight() {
    let mut session = fabric_session();
    let pending = session.begin_submission().unwrap();
    assert!(session.is_submitting());

    assert_eq!(
        session.begin_submission().unwrap_err(),
        AnnotationError::SubmissionInFlight
    );

    let status = session
        .finish_submission(
            pending,
            Ok(SubmissionReceipt {
                message: "ok".to_string(),
            }),
        )
        .unwrap();
    assert!(matches!(status, SubmissionStatus::Accepted(_)));
    assert!(session.begin_submission().is_ok());
}

#[test]
fn test_edits_during_flight_stay_unsaved() {
    let mut session = fabric_session();
    session.set_selected_class("hole").unwrap();
    session.toggle_cell(CellCoord::new(0, 0)).unwrap();

    let pending = session.begin_submission().unwrap();
    assert_eq!(pending.payload().cell_count(), 1);
    session.toggle_cell(CellCoord::new(1, 0)).unwrap();

    session
        .finish_submission(
            pending,
            Ok(SubmissionReceipt {
                message: "ok".to_string(),
            }),
        )
        .unwrap();

    assert!(session.has_unsaved_work());
    assert!(!session.can_deactivate());
}

#[test]
fn test_non_submission_errors_are_reported_as_submission_failures() {
    let mut session = fabric_session();
    let pending = session.begin_submission().unwrap();

    let result = session.finish_submission(pending, Err(AnnotationError::fetch_failed("timeout")));

    assert!(matches!(result, Err(AnnotationError::SubmissionFailed { .. })));
    assert!(!session.is_submitting());
}

#[test]
fn test_response_after_leaving_is_discarded() {
    let mut old_session = fabric_session();
    old_session.set_selected_class("hole").unwrap();
    old_session.toggle_cell(CellCoord::new(3, 3)).unwrap();
    let pending = old_session.begin_submission().unwrap();

    // Operator navigates away; a fresh session takes over
    drop(old_session);
    let mut session = fabric_session();
    session.set_selected_class("stain").unwrap();
    session.toggle_cell(CellCoord::new(4, 4)).unwrap();

    let status = session
        .finish_submission(
            pending,
            Ok(SubmissionReceipt {
                message: "late".to_string(),
            }),
        )
        .unwrap();

    assert_eq!(status, SubmissionStatus::Discarded);
    assert!(session.has_unsaved_work());
    assert!(!session.is_submitting());
}

#[test]
fn test_payload_covers_every_image_and_class() {
    let mut session = fabric_session();
    session.set_selected_class("hole").unwrap();
    session.toggle_cell(CellCoord::new(2, 3)).unwrap();

    let json = serde_json::to_value(session.to_payload()).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "datasetName": "fabric01",
            "coordinatesData": {
                "img_001.png": { "hole": [[2, 3]], "stain": [] },
                "img_002.png": { "hole": [], "stain": [] }
            }
        })
    );
}
