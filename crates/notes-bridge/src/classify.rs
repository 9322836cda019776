//! Maps a failed bridge run onto [`NotesError`].
//!
//! Matching is ordered: deadline, app state, permissions, then lookups.
//! Anything else keeps its raw diagnostics.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::NotesError;
use crate::executor::ScriptFailure;

static NOTE_NOT_FOUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)note.*?\bnot\s+found\b").expect("valid regex"));
static FOLDER_NOT_FOUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)folder.*?\bnot\s+found\b").expect("valid regex"));

pub fn classify(failure: ScriptFailure) -> NotesError {
    let ScriptFailure { diagnostics, error } = failure;
    if error.is_deadline() {
        return NotesError::ScriptTimeout;
    }

    let diagnostics = diagnostics.trim();
    if diagnostics.is_empty() {
        return NotesError::Execution(error);
    }

    let lower = diagnostics.to_lowercase();
    if lower.contains("-1728") || lower.contains("event not handled") {
        return NotesError::AppNotRunning;
    }
    if lower.contains("not allowed") || lower.contains("-1743") {
        return NotesError::PermissionDenied;
    }
    if NOTE_NOT_FOUND.is_match(diagnostics) {
        return NotesError::NoteNotFound;
    }
    if FOLDER_NOT_FOUND.is_match(diagnostics) {
        return NotesError::FolderNotFound;
    }

    tracing::warn!("unclassified bridge failure: {}", diagnostics);
    NotesError::Unclassified {
        diagnostics: diagnostics.to_string(),
        source: error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExecutionError;

    fn failed(diagnostics: &str) -> NotesError {
        classify(ScriptFailure::new(
            diagnostics,
            ExecutionError::Exit { code: Some(1) },
        ))
    }

    #[test]
    fn deadline_wins_over_diagnostics() {
        let err = classify(ScriptFailure::new(
            "Note not found",
            ExecutionError::DeadlineExceeded,
        ));
        assert!(matches!(err, NotesError::ScriptTimeout));
        assert!(matches!(
            classify(ExecutionError::Cancelled.into()),
            NotesError::ScriptTimeout
        ));
    }

    #[test]
    fn app_not_running() {
        assert!(matches!(
            failed("execution error: Notes got an error: Can't get account. (-1728)"),
            NotesError::AppNotRunning
        ));
        assert!(matches!(
            failed("AppleEvent handler failed: Event not handled"),
            NotesError::AppNotRunning
        ));
    }

    #[test]
    fn permission_denied() {
        assert!(matches!(
            failed("Not authorized to send Apple events to Notes. (-1743)"),
            NotesError::PermissionDenied
        ));
        assert!(matches!(
            failed("osascript is not allowed assistive access"),
            NotesError::PermissionDenied
        ));
    }

    #[test]
    fn lookups_by_phrase() {
        assert!(matches!(
            failed("execution error: note \"Groceries\" not found"),
            NotesError::NoteNotFound
        ));
        assert!(matches!(
            failed("Folder 'Archive' was NOT FOUND"),
            NotesError::FolderNotFound
        ));
    }

    #[test]
    fn unknown_text_is_preserved() {
        let err = failed("  execution error: something odd (-2700)\n");
        match err {
            NotesError::Unclassified { diagnostics, source } => {
                assert_eq!(diagnostics, "execution error: something odd (-2700)");
                assert!(matches!(source, ExecutionError::Exit { code: Some(1) }));
            }
            other => panic!("expected unclassified, got {other:?}"),
        }
    }

    #[test]
    fn silent_failure_keeps_execution_error() {
        let err = classify(ScriptFailure::new("", ExecutionError::Exit { code: Some(2) }));
        assert!(matches!(
            err,
            NotesError::Execution(ExecutionError::Exit { code: Some(2) })
        ));
    }
}
