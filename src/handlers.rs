//! Message handlers for the native front end.
//!
//! Each handler applies one [`Message`] to the session and produces the text shown
//! to the operator. Errors are reported, never fatal.

use std::path::Path;

use crate::annotation::ToggleOutcome;
use crate::message::{HELP, Message};
use crate::session::{AnnotationSession, ClickOutcome};
use crate::submission::SubmissionSink;

/// What the front end should do after a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Show the text and keep reading commands
    Continue(String),
    /// Show the text and leave the session
    Exit(String),
}

/// Apply `msg` to `session`.
pub fn handle_message<S: SubmissionSink + ?Sized>(
    msg: Message,
    session: &mut AnnotationSession,
    sink: &mut S,
) -> Reply {
    match msg {
        Message::SelectClass(class) => Reply::Continue(handle_select_class(session, &class)),
        Message::Click { x, y } => Reply::Continue(handle_click(session, x, y)),
        Message::NextImage => Reply::Continue(handle_navigation(session, |s| s.next())),
        Message::PrevImage => Reply::Continue(handle_navigation(session, |s| s.prev())),
        Message::GoTo(index) => Reply::Continue(handle_navigation(session, |s| s.go_to(index))),
        Message::Render(path) => Reply::Continue(handle_render(session, &path)),
        Message::Status => Reply::Continue(status_line(session)),
        Message::Submit => Reply::Continue(handle_submit(session, sink)),
        Message::Quit => handle_quit(session),
        Message::ForceQuit => {
            if session.has_unsaved_work() {
                log::warn!("Discarding unsaved annotations for '{}'", session.dataset_name());
            }
            Reply::Exit("Session closed".to_string())
        }
        Message::Help => Reply::Continue(HELP.to_string()),
    }
}

fn handle_select_class(session: &mut AnnotationSession, class: &str) -> String {
    match session.set_selected_class(class) {
        Ok(()) => format!("Selected class '{}'", class),
        Err(e) => format!(
            "Error: {} (choose one of: {})",
            e,
            session.config().assignable_classes().join(", ")
        ),
    }
}

fn handle_click(session: &mut AnnotationSession, x: f32, y: f32) -> String {
    match session.handle_click((x, y), (0.0, 0.0)) {
        Ok(ClickOutcome::Toggled { coord, outcome }) => match outcome {
            ToggleOutcome::Assigned => {
                format!("Cell {} labeled '{}'", coord, session.selected_class())
            }
            ToggleOutcome::Cleared => format!("Cell {} cleared", coord),
            ToggleOutcome::Reassigned { from } => format!(
                "Cell {} moved from '{}' to '{}'",
                coord,
                from,
                session.selected_class()
            ),
        },
        Ok(ClickOutcome::NoClassSelected) => {
            "No class selected; use 'class <name>' first".to_string()
        }
        Ok(ClickOutcome::OutOfBounds) => "Click outside the grid ignored".to_string(),
        Err(e) => format!("Error: {}", e),
    }
}

fn handle_navigation(
    session: &mut AnnotationSession,
    navigate: impl FnOnce(&mut AnnotationSession) -> bool,
) -> String {
    let moved = navigate(session);
    let position = format!(
        "Image {}/{}: {}",
        session.current_index() + 1,
        session.image_count(),
        session.current_filename()
    );
    if moved {
        position
    } else {
        format!("{} (no change)", position)
    }
}

fn handle_render(session: &AnnotationSession, path: &Path) -> String {
    match session.renderer().surface().save_png(path) {
        Ok(()) => format!("Frame written to {}", path.display()),
        Err(e) => format!("Error: failed to write {}: {}", path.display(), e),
    }
}

fn handle_submit<S: SubmissionSink + ?Sized>(session: &mut AnnotationSession, sink: &mut S) -> String {
    match session.submit(sink) {
        Ok(receipt) => receipt.message,
        Err(e) => format!("Error: {}", e),
    }
}

fn handle_quit(session: &AnnotationSession) -> Reply {
    if session.can_deactivate() {
        Reply::Exit("Session closed".to_string())
    } else {
        Reply::Continue(
            "You have unsaved changes! Submit them or use 'quit!' to discard.".to_string(),
        )
    }
}

/// One-line session summary.
pub fn status_line(session: &AnnotationSession) -> String {
    format!(
        "{} | image {}/{} ({}) | class '{}' | {} labeled cells | {}",
        session.dataset_name(),
        session.current_index() + 1,
        session.image_count(),
        session.current_filename(),
        session.selected_class(),
        session.store().labeled_cell_count(),
        if session.has_unsaved_work() {
            "unsaved changes"
        } else {
            "saved"
        }
    )
}
