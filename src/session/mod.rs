//! Annotation session: one operator working through one dataset.
//!
//! The session wires the store, renderer and input mapper together. All calls are
//! synchronous; the only asynchronous boundary is the submission sink, modelled as
//! [`AnnotationSession::begin_submission`] / [`AnnotationSession::finish_submission`].

mod loader;
#[cfg(test)]
mod tests;

pub use loader::SessionLoader;

use std::sync::atomic::{AtomicU64, Ordering};

use image::RgbaImage;

use crate::annotation::{AnnotationStore, ToggleOutcome};
use crate::error::AnnotationError;
use crate::input::InputMapper;
use crate::model::{CellCoord, GridConfig, ImageRecord};
use crate::renderer::Renderer;
use crate::submission::{
    PendingSubmission, SubmissionPayload, SubmissionReceipt, SubmissionSink, SubmissionStatus,
};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Result of a pointer click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The cell under the pointer was toggled.
    Toggled {
        /// Cell that changed
        coord: CellCoord,
        /// How it changed
        outcome: ToggleOutcome,
    },
    /// The default class is selected; clicks do nothing.
    NoClassSelected,
    /// The pointer was outside the grid.
    OutOfBounds,
}

/// Live annotation state for one dataset.
#[derive(Debug)]
pub struct AnnotationSession {
    id: u64,
    dataset_name: String,
    images: Vec<ImageRecord>,
    store: AnnotationStore,
    input: InputMapper,
    renderer: Renderer,
    current_index: usize,
    selected_class: String,
    in_flight: bool,
}

impl AnnotationSession {
    pub(crate) fn new(
        dataset_name: String,
        images: Vec<ImageRecord>,
        config: GridConfig,
    ) -> Result<Self, AnnotationError> {
        loader::validate_images(&images)?;

        let mut store = AnnotationStore::new(config.clone());
        store.initialize(&images);

        let mut session = Self {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            dataset_name,
            images,
            input: InputMapper::new(&config),
            renderer: Renderer::for_grid(&config),
            selected_class: config.default_class().to_string(),
            store,
            current_index: 0,
            in_flight: false,
        };
        session.render();

        log::info!(
            "Session {} opened for '{}': {} images, {}x{} grid",
            session.id,
            session.dataset_name,
            session.images.len(),
            config.grid_width(),
            config.grid_height()
        );
        Ok(session)
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn dataset_name(&self) -> &str {
        &self.dataset_name
    }

    pub fn config(&self) -> &GridConfig {
        self.store.config()
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_image(&self) -> &ImageRecord {
        &self.images[self.current_index]
    }

    pub fn current_filename(&self) -> &str {
        self.current_image().filename()
    }

    pub fn selected_class(&self) -> &str {
        &self.selected_class
    }

    /// The most recently rendered frame.
    pub fn frame(&self) -> &RgbaImage {
        self.renderer.surface().image()
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// Redraw the current image with its overlay.
    fn render(&mut self) {
        let image = &self.images[self.current_index];
        if let Some(annotations) = self.store.annotations(image.filename()) {
            self.renderer
                .render(image.pixels(), self.store.config(), annotations);
        }
    }

    // ------------------------------------------------------------------
    // Class selection
    // ------------------------------------------------------------------

    /// Select the class subsequent clicks assign.
    ///
    /// Only assignable classes are accepted; the selection is unchanged on error.
    pub fn set_selected_class(&mut self, class: &str) -> Result<(), AnnotationError> {
        if self.config().assignable_index(class).is_none() {
            return Err(AnnotationError::invalid_class(class));
        }
        log::debug!("🏷️  Selected class '{}'", class);
        self.selected_class = class.to_string();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Editing
    // ------------------------------------------------------------------

    /// Handle a click at `pointer` on a surface whose top-left corner is `origin`.
    ///
    /// Clicks outside the grid, or while the default class is selected, are
    /// ignored without touching the store.
    pub fn handle_click(
        &mut self,
        pointer: (f32, f32),
        origin: (f32, f32),
    ) -> Result<ClickOutcome, AnnotationError> {
        if self.config().assignable_index(&self.selected_class).is_none() {
            log::debug!("Click ignored: no assignable class selected");
            return Ok(ClickOutcome::NoClassSelected);
        }

        let coord = match self.input.map_click_to_cell(pointer, origin) {
            Ok(coord) => coord,
            Err(e) => {
                log::trace!("Click ignored: {}", e);
                return Ok(ClickOutcome::OutOfBounds);
            }
        };

        let outcome = self.toggle_cell(coord)?;
        Ok(ClickOutcome::Toggled { coord, outcome })
    }

    /// Toggle `coord` of the current image with the selected class.
    pub fn toggle_cell(&mut self, coord: CellCoord) -> Result<ToggleOutcome, AnnotationError> {
        let filename = self.images[self.current_index].filename().to_string();
        let class = self.selected_class.clone();
        self.toggle(&filename, coord, &class)
    }

    /// Toggle `coord` of `filename` for `class`, redrawing if that image is shown.
    pub fn toggle(
        &mut self,
        filename: &str,
        coord: CellCoord,
        class: &str,
    ) -> Result<ToggleOutcome, AnnotationError> {
        let outcome = self.store.toggle(filename, coord, class)?;
        if filename == self.current_filename() {
            self.render();
        }
        Ok(outcome)
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    /// Move to the next image. Returns `false` at the last image.
    pub fn next(&mut self) -> bool {
        self.go_to(self.current_index + 1)
    }

    /// Move to the previous image. Returns `false` at the first image.
    pub fn prev(&mut self) -> bool {
        match self.current_index.checked_sub(1) {
            Some(index) => self.go_to(index),
            None => false,
        }
    }

    /// Jump to `index`, clamped to the image range. Returns whether the index changed.
    pub fn go_to(&mut self, index: usize) -> bool {
        let target = index.min(self.images.len() - 1);
        if target == self.current_index {
            return false;
        }
        self.current_index = target;
        log::debug!(
            "🖼️  Image {}/{}: {}",
            target + 1,
            self.images.len(),
            self.current_filename()
        );
        self.render();
        true
    }

    // ------------------------------------------------------------------
    // Unsaved work
    // ------------------------------------------------------------------

    /// Whether edits exist that no successful submission has covered.
    pub fn has_unsaved_work(&self) -> bool {
        self.store.has_unsaved_work()
    }

    /// Whether the host may leave the session without asking the operator.
    pub fn can_deactivate(&self) -> bool {
        !self.has_unsaved_work()
    }

    // ------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------

    /// Current annotations in wire form.
    pub fn to_payload(&self) -> SubmissionPayload {
        SubmissionPayload {
            dataset_name: self.dataset_name.clone(),
            coordinates_data: self.store.coordinates_data(),
        }
    }

    /// Whether a submission awaits its response.
    pub fn is_submitting(&self) -> bool {
        self.in_flight
    }

    /// Snapshot the annotations for submission.
    ///
    /// Fails with [`AnnotationError::SubmissionInFlight`] until the previous
    /// submission has been finished.
    pub fn begin_submission(&mut self) -> Result<PendingSubmission, AnnotationError> {
        if self.in_flight {
            return Err(AnnotationError::SubmissionInFlight);
        }
        self.in_flight = true;

        let payload = self.to_payload();
        log::info!(
            "📤 Submitting {} labeled cells for '{}'",
            payload.cell_count(),
            self.dataset_name
        );
        Ok(PendingSubmission {
            session_id: self.id,
            revision: self.store.revision(),
            payload,
            started: web_time::Instant::now(),
        })
    }

    /// Apply the sink's answer to a pending submission.
    ///
    /// A submission issued by a different session is discarded untouched. On
    /// failure the session stays dirty and the error is returned as
    /// [`AnnotationError::SubmissionFailed`].
    pub fn finish_submission(
        &mut self,
        pending: PendingSubmission,
        result: Result<SubmissionReceipt, AnnotationError>,
    ) -> Result<SubmissionStatus, AnnotationError> {
        if pending.session_id != self.id {
            log::warn!(
                "Discarding response for session {} (current session is {})",
                pending.session_id,
                self.id
            );
            return Ok(SubmissionStatus::Discarded);
        }

        self.in_flight = false;
        let elapsed = pending.started.elapsed();

        match result {
            Ok(receipt) => {
                self.store.mark_submitted(pending.revision);
                log::info!(
                    "✅ Submission accepted in {:.1?}: {}",
                    elapsed,
                    receipt.message
                );
                Ok(SubmissionStatus::Accepted(receipt))
            }
            Err(e) => {
                let error = if matches!(e, AnnotationError::SubmissionFailed { .. }) {
                    e
                } else {
                    AnnotationError::submission_failed(e.to_string())
                };
                log::warn!("Submission failed after {:.1?}: {}", elapsed, error);
                Err(error)
            }
        }
    }

    /// Submit through `sink` and wait for its answer.
    pub fn submit<S: SubmissionSink + ?Sized>(
        &mut self,
        sink: &mut S,
    ) -> Result<SubmissionReceipt, AnnotationError> {
        let pending = self.begin_submission()?;
        let result = sink.submit(pending.payload());
        match self.finish_submission(pending, result)? {
            SubmissionStatus::Accepted(receipt) => Ok(receipt),
            SubmissionStatus::Discarded => Err(AnnotationError::submission_failed(
                "response was discarded",
            )),
        }
    }
}
