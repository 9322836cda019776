use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::NotesError;

/// A note as reported by the bridge.
///
/// Listing operations only fill in `title`; the remaining optional fields
/// stay `None` until metadata or content has actually been fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Echoed back to the caller; Notes has no tag concept.
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, alias = "creation_date", skip_serializing_if = "Option::is_none")]
    pub created: Option<NaiveDateTime>,
    #[serde(default, alias = "modification_date", skip_serializing_if = "Option::is_none")]
    pub modified: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default)]
    pub shared: bool,
    #[serde(default)]
    pub password_protected: bool,
}

impl Note {
    /// A note known only by its title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            content: None,
            tags: Vec::new(),
            created: None,
            modified: None,
            folder: None,
            shared: false,
            password_protected: false,
        }
    }
}

/// A file attached to a note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub name: String,
    pub file_path: String,
    /// Same value as `id`; kept for consumers that address attachments by
    /// content identifier.
    pub content_identifier: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modification_date: Option<NaiveDateTime>,
}

/// One folder in the account's folder tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderNode {
    pub name: String,
    pub shared: bool,
    pub note_count: u64,
    #[serde(default)]
    pub children: Vec<FolderNode>,
}

impl FolderNode {
    /// Number of levels in the tree rooted here, counting this node.
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(FolderNode::depth).max().unwrap_or(0)
    }

    /// Sum of note counts over this node and all descendants.
    pub fn total_notes(&self) -> u64 {
        self.note_count + self.children.iter().map(FolderNode::total_notes).sum::<u64>()
    }
}

/// Where a search query is matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    #[default]
    Title,
    Body,
    Both,
}

impl SearchScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchScope::Title => "title",
            SearchScope::Body => "body",
            SearchScope::Both => "both",
        }
    }

    /// Whether the scope requires reading note bodies.
    pub fn reads_body(&self) -> bool {
        matches!(self, SearchScope::Body | SearchScope::Both)
    }
}

impl fmt::Display for SearchScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchScope {
    type Err = NotesError;

    /// An empty string selects the default scope.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "" | "title" => Ok(SearchScope::Title),
            "body" => Ok(SearchScope::Body),
            "both" => Ok(SearchScope::Both),
            other => Err(NotesError::invalid_input(format!(
                "invalid search scope {other:?} (must be 'title', 'body', or 'both')"
            ))),
        }
    }
}

/// Parameters for an advanced search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    pub query: String,
    #[serde(default)]
    pub scope: SearchScope,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_from: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_to: Option<NaiveDateTime>,
}

impl SearchOptions {
    /// Builds options from a caller-supplied scope string, rejecting
    /// anything other than `title`, `body`, `both` or empty.
    pub fn new(query: impl Into<String>, scope: &str) -> Result<Self, NotesError> {
        Ok(Self {
            query: query.into(),
            scope: scope.parse()?,
            ..Self::default()
        })
    }

    pub fn in_folder(mut self, folder: impl Into<String>) -> Self {
        let folder = folder.into();
        self.folder = (!folder.is_empty()).then_some(folder);
        self
    }

    pub fn modified_between(
        mut self,
        from: Option<NaiveDateTime>,
        to: Option<NaiveDateTime>,
    ) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    /// Folder filter with empty names treated as absent.
    pub fn folder_filter(&self) -> Option<&str> {
        self.folder.as_deref().filter(|folder| !folder.is_empty())
    }

    /// Whether any folder or date narrowing was requested.
    pub fn has_filters(&self) -> bool {
        self.folder_filter().is_some() || self.date_from.is_some() || self.date_to.is_some()
    }
}

/// A capped list result together with the uncapped total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Listing<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }

    pub fn is_truncated(&self) -> bool {
        self.total > self.items.len()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Listing<U> {
        Listing {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
        }
    }

    /// "Showing first N of M <noun>" when the listing was capped.
    pub fn notice(&self, noun: &str) -> Option<String> {
        self.is_truncated().then(|| {
            format!(
                "Showing first {} of {} {noun}",
                self.items.len(),
                self.total
            )
        })
    }
}
