use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{Attachment, FolderNode, Listing, Note, SearchOptions};

/// One operation with its arguments, as accepted by
/// [`NotesService::call`](super::NotesService::call).
///
/// ```json
/// {"operation": "move_note", "title": "Plan", "folder": "Archive"}
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Request {
    CreateNote {
        title: String,
        #[serde(default)]
        content: String,
        #[serde(default)]
        tags: Vec<String>,
    },
    SearchNotes {
        query: String,
    },
    SearchNotesAdvanced {
        options: SearchOptions,
    },
    GetNoteContent {
        title: String,
    },
    GetNoteMetadata {
        title: String,
    },
    UpdateNote {
        title: String,
        content: String,
    },
    DeleteNote {
        title: String,
    },
    ListFolders,
    GetRecentNotes {
        #[serde(default)]
        limit: usize,
    },
    GetNotesInFolder {
        folder: String,
    },
    CreateFolder {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<String>,
    },
    MoveNote {
        title: String,
        folder: String,
    },
    GetFolderHierarchy,
    GetNoteAttachments {
        title: String,
    },
    GetAttachmentContent {
        path: PathBuf,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_bytes: Option<u64>,
    },
    ExportNoteMarkdown {
        title: String,
    },
    ExportNoteText {
        title: String,
    },
}

impl Request {
    pub fn operation(&self) -> &'static str {
        match self {
            Request::CreateNote { .. } => "create_note",
            Request::SearchNotes { .. } => "search_notes",
            Request::SearchNotesAdvanced { .. } => "search_notes_advanced",
            Request::GetNoteContent { .. } => "get_note_content",
            Request::GetNoteMetadata { .. } => "get_note_metadata",
            Request::UpdateNote { .. } => "update_note",
            Request::DeleteNote { .. } => "delete_note",
            Request::ListFolders => "list_folders",
            Request::GetRecentNotes { .. } => "get_recent_notes",
            Request::GetNotesInFolder { .. } => "get_notes_in_folder",
            Request::CreateFolder { .. } => "create_folder",
            Request::MoveNote { .. } => "move_note",
            Request::GetFolderHierarchy => "get_folder_hierarchy",
            Request::GetNoteAttachments { .. } => "get_note_attachments",
            Request::GetAttachmentContent { .. } => "get_attachment_content",
            Request::ExportNoteMarkdown { .. } => "export_note_markdown",
            Request::ExportNoteText { .. } => "export_note_text",
        }
    }
}

/// Result of a [`Request`]. Byte payloads travel as standard base64.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Response {
    Done,
    Note(Note),
    Notes(Listing<Note>),
    Folders(Listing<String>),
    Text(String),
    Hierarchy(FolderNode),
    Attachments(Vec<Attachment>),
    Bytes(#[serde(with = "base64_bytes")] Vec<u8>),
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
