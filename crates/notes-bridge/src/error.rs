use std::path::PathBuf;

/// Failure of the bridge process itself, before any diagnostic text is
/// interpreted.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("script deadline exceeded")]
    DeadlineExceeded,

    #[error("script cancelled")]
    Cancelled,

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to collect script output: {0}")]
    Wait(#[source] std::io::Error),

    #[error("script exited with status {}", display_code(.code))]
    Exit { code: Option<i32> },
}

impl ExecutionError {
    /// True for the deadline and cancellation signals.
    pub fn is_deadline(&self) -> bool {
        matches!(self, ExecutionError::DeadlineExceeded | ExecutionError::Cancelled)
    }
}

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

/// Structural failure while reading bridge output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid date {input:?}")]
    InvalidDate { input: String },

    #[error("missing field `{field}` in {record:?}")]
    MissingField { field: String, record: String },

    #[error("invalid value {value:?} for field `{field}`")]
    InvalidField { field: String, value: String },

    #[error("malformed record at offset {offset}: {reason}")]
    Malformed { offset: usize, reason: String },
}

/// Unified error type for the notes bridge.
#[derive(Debug, thiserror::Error)]
pub enum NotesError {
    #[error("note not found")]
    NoteNotFound,

    #[error("folder not found")]
    FolderNotFound,

    #[error("Apple Notes app not running")]
    AppNotRunning,

    #[error("permission denied to access Notes")]
    PermissionDenied,

    #[error("AppleScript execution timeout")]
    ScriptTimeout,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("AppleScript failed: {diagnostics}")]
    Unclassified {
        diagnostics: String,
        #[source]
        source: ExecutionError,
    },

    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("attachment {} is {size} bytes, exceeds maximum of {max} bytes", .path.display())]
    AttachmentTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl NotesError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        NotesError::InvalidInput(msg.into())
    }

    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, NotesError::ScriptTimeout)
    }

    /// Sentence suitable for showing to a person.
    pub fn user_message(&self) -> String {
        match self {
            NotesError::NoteNotFound => {
                "Note not found in Apple Notes. Please check the title and try again.".to_string()
            }
            NotesError::FolderNotFound => {
                "Folder not found in Apple Notes. Please check the folder name and try again."
                    .to_string()
            }
            NotesError::AppNotRunning => {
                "Apple Notes app is not running. Please open the Notes app and try again."
                    .to_string()
            }
            NotesError::PermissionDenied => "Permission denied to access Notes. Please grant access in System Settings > Privacy & Security > Automation.".to_string(),
            NotesError::ScriptTimeout => {
                "Apple Notes is not responding (timeout). Please try again.".to_string()
            }
            NotesError::InvalidInput(msg) => format!("Invalid input: {msg}"),
            other => format!("An error occurred: {other}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, NotesError>;
