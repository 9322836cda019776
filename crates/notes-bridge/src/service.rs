//! Typed entry point over the script builder, executor, classifier and
//! parsers.
//!
//! Every operation is one script and one bridge round trip. Callers never
//! see script text or raw bridge output.

mod request;
#[cfg(test)]
mod tests;

use std::path::Path;
use std::sync::Arc;

pub use request::{Request, Response};

use crate::classify::classify;
use crate::config::BridgeConfig;
use crate::context::CallContext;
use crate::error::{NotesError, Result};
use crate::executor::{OsascriptExecutor, ScriptExecutor};
use crate::markdown::html_to_markdown;
use crate::parse::{
    parse_attachments, parse_folder_hierarchy, parse_list, parse_note_metadata,
};
use crate::script::ScriptBuilder;
use crate::types::{Attachment, FolderNode, Listing, Note, SearchOptions};

pub struct NotesService {
    executor: Arc<dyn ScriptExecutor>,
    scripts: ScriptBuilder,
    config: BridgeConfig,
}

impl NotesService {
    /// Service backed by the configured bridge program.
    pub fn new(config: BridgeConfig) -> Self {
        let executor = Arc::new(OsascriptExecutor::from_config(&config));
        Self::with_executor(config, executor)
    }

    pub fn with_executor(config: BridgeConfig, executor: Arc<dyn ScriptExecutor>) -> Self {
        Self {
            executor,
            scripts: ScriptBuilder::new(&config.account),
            config,
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Run one request. Dispatches to the typed methods below.
    pub async fn call(&self, ctx: &CallContext, request: Request) -> Result<Response> {
        tracing::debug!("dispatching {}", request.operation());
        let response = match request {
            Request::CreateNote {
                title,
                content,
                tags,
            } => Response::Note(self.create_note(ctx, &title, &content, tags).await?),
            Request::SearchNotes { query } => Response::Notes(self.search_notes(ctx, &query).await?),
            Request::SearchNotesAdvanced { options } => {
                Response::Notes(self.search_notes_advanced(ctx, &options).await?)
            }
            Request::GetNoteContent { title } => {
                Response::Text(self.get_note_content(ctx, &title).await?)
            }
            Request::GetNoteMetadata { title } => {
                Response::Note(self.get_note_metadata(ctx, &title).await?)
            }
            Request::UpdateNote { title, content } => {
                self.update_note(ctx, &title, &content).await?;
                Response::Done
            }
            Request::DeleteNote { title } => {
                self.delete_note(ctx, &title).await?;
                Response::Done
            }
            Request::ListFolders => Response::Folders(self.list_folders(ctx).await?),
            Request::GetRecentNotes { limit } => {
                let notes = self.get_recent_notes(ctx, limit).await?;
                Response::Notes(Listing {
                    total: notes.len(),
                    items: notes,
                })
            }
            Request::GetNotesInFolder { folder } => {
                Response::Notes(self.get_notes_in_folder(ctx, &folder).await?)
            }
            Request::CreateFolder { name, parent } => {
                self.create_folder(ctx, &name, parent.as_deref()).await?;
                Response::Done
            }
            Request::MoveNote { title, folder } => {
                self.move_note(ctx, &title, &folder).await?;
                Response::Done
            }
            Request::GetFolderHierarchy => {
                Response::Hierarchy(self.get_folder_hierarchy(ctx).await?)
            }
            Request::GetNoteAttachments { title } => {
                Response::Attachments(self.get_note_attachments(ctx, &title).await?)
            }
            Request::GetAttachmentContent { path, max_bytes } => {
                Response::Bytes(self.get_attachment_content(&path, max_bytes).await?)
            }
            Request::ExportNoteMarkdown { title } => {
                Response::Text(self.export_note_markdown(ctx, &title).await?)
            }
            Request::ExportNoteText { title } => {
                Response::Text(self.export_note_text(ctx, &title).await?)
            }
        };
        Ok(response)
    }

    /// Create a note. The returned note carries the bridge-assigned id, the
    /// caller's tags and local "now" timestamps.
    pub async fn create_note(
        &self,
        ctx: &CallContext,
        title: &str,
        content: &str,
        tags: Vec<String>,
    ) -> Result<Note> {
        require("title", title)?;
        let output = self
            .run(ctx, "create_note", self.scripts.create_note(title, content))
            .await?;

        let now = chrono::Local::now().naive_local();
        let id = output.trim();
        let mut note = Note::titled(title);
        note.id = (!id.is_empty()).then(|| id.to_string());
        note.content = Some(content.to_string());
        note.tags = tags;
        note.created = Some(now);
        note.modified = Some(now);
        Ok(note)
    }

    pub async fn search_notes(&self, ctx: &CallContext, query: &str) -> Result<Listing<Note>> {
        let output = self
            .run(ctx, "search_notes", self.scripts.search_titles(query))
            .await?;
        Ok(self.note_listing(&output))
    }

    pub async fn search_notes_advanced(
        &self,
        ctx: &CallContext,
        options: &SearchOptions,
    ) -> Result<Listing<Note>> {
        if let (Some(from), Some(to)) = (options.date_from, options.date_to) {
            if from > to {
                return Err(NotesError::invalid_input(format!(
                    "date_from {from} is after date_to {to}"
                )));
            }
        }

        let (strategy, script) = self.scripts.search(options);
        tracing::debug!("advanced search for scope {} using {:?}", options.scope, strategy);
        let output = self.run(ctx, "search_notes_advanced", script).await?;
        Ok(self.note_listing(&output))
    }

    /// HTML body of the note.
    pub async fn get_note_content(&self, ctx: &CallContext, title: &str) -> Result<String> {
        require("title", title)?;
        let output = self
            .run(ctx, "get_note_content", self.scripts.note_body(title))
            .await?;
        Ok(strip_result_newline(output))
    }

    pub async fn get_note_metadata(&self, ctx: &CallContext, title: &str) -> Result<Note> {
        require("title", title)?;
        let output = self
            .run(ctx, "get_note_metadata", self.scripts.note_metadata(title))
            .await?;
        Ok(parse_note_metadata(&output, title)?)
    }

    pub async fn update_note(&self, ctx: &CallContext, title: &str, content: &str) -> Result<()> {
        require("title", title)?;
        self.run(ctx, "update_note", self.scripts.update_note(title, content))
            .await?;
        Ok(())
    }

    pub async fn delete_note(&self, ctx: &CallContext, title: &str) -> Result<()> {
        require("title", title)?;
        self.run(ctx, "delete_note", self.scripts.delete_note(title))
            .await?;
        Ok(())
    }

    pub async fn list_folders(&self, ctx: &CallContext) -> Result<Listing<String>> {
        let output = self
            .run(ctx, "list_folders", self.scripts.list_folders())
            .await?;
        Ok(parse_list(&output, self.config.max_results))
    }

    /// Most recent note titles. A `limit` of zero means the configured
    /// maximum; larger limits are clamped to it.
    pub async fn get_recent_notes(&self, ctx: &CallContext, limit: usize) -> Result<Vec<Note>> {
        let limit = match limit {
            0 => self.config.max_results,
            n => n.min(self.config.max_results),
        };
        let output = self
            .run(ctx, "get_recent_notes", self.scripts.recent_notes(limit))
            .await?;
        Ok(parse_list(&output, limit).map(Note::titled).items)
    }

    pub async fn get_notes_in_folder(
        &self,
        ctx: &CallContext,
        folder: &str,
    ) -> Result<Listing<Note>> {
        require("folder", folder)?;
        let output = self
            .run(ctx, "get_notes_in_folder", self.scripts.notes_in_folder(folder))
            .await?;
        Ok(self.note_listing(&output))
    }

    /// Create a folder at the account root, or under `parent` when it is
    /// given and non-empty.
    pub async fn create_folder(
        &self,
        ctx: &CallContext,
        name: &str,
        parent: Option<&str>,
    ) -> Result<()> {
        require("folder name", name)?;
        self.run(ctx, "create_folder", self.scripts.create_folder(name, parent))
            .await?;
        Ok(())
    }

    pub async fn move_note(&self, ctx: &CallContext, title: &str, folder: &str) -> Result<()> {
        require("title", title)?;
        require("folder", folder)?;
        self.run(ctx, "move_note", self.scripts.move_note(title, folder))
            .await?;
        Ok(())
    }

    pub async fn get_folder_hierarchy(&self, ctx: &CallContext) -> Result<FolderNode> {
        let output = self
            .run(ctx, "get_folder_hierarchy", self.scripts.folder_hierarchy())
            .await?;
        Ok(parse_folder_hierarchy(&output)?)
    }

    pub async fn get_note_attachments(
        &self,
        ctx: &CallContext,
        title: &str,
    ) -> Result<Vec<Attachment>> {
        require("title", title)?;
        let output = self
            .run(ctx, "get_note_attachments", self.scripts.note_attachments(title))
            .await?;
        Ok(parse_attachments(&output)?)
    }

    /// Read an attachment file from local disk. The size is checked against
    /// `max_bytes` (or the configured maximum) before any bytes are read.
    pub async fn get_attachment_content(
        &self,
        path: &Path,
        max_bytes: Option<u64>,
    ) -> Result<Vec<u8>> {
        if path.as_os_str().is_empty() {
            return Err(NotesError::invalid_input("attachment path must not be empty"));
        }
        let max = max_bytes
            .filter(|max| *max > 0)
            .unwrap_or(self.config.max_attachment_bytes);

        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(NotesError::invalid_input(format!(
                "{} is not a file",
                path.display()
            )));
        }
        if metadata.len() > max {
            return Err(NotesError::AttachmentTooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                max,
            });
        }
        Ok(tokio::fs::read(path).await?)
    }

    pub async fn export_note_markdown(&self, ctx: &CallContext, title: &str) -> Result<String> {
        let html = self.get_note_content(ctx, title).await?;
        Ok(html_to_markdown(&html))
    }

    pub async fn export_note_text(&self, ctx: &CallContext, title: &str) -> Result<String> {
        require("title", title)?;
        let output = self
            .run(ctx, "export_note_text", self.scripts.note_plaintext(title))
            .await?;
        Ok(strip_result_newline(output))
    }

    async fn run(&self, ctx: &CallContext, operation: &str, script: String) -> Result<String> {
        let ctx = ctx.clone().with_timeout(self.config.request_timeout);
        tracing::debug!(
            "{operation}: running {} byte script, budget {:?}",
            script.len(),
            ctx.budget(self.config.script_timeout)
        );
        match self.executor.execute(&ctx, &script).await {
            Ok(output) => Ok(output.stdout),
            Err(failure) => {
                let err = classify(failure);
                tracing::debug!("{operation} failed: {err}");
                Err(err)
            }
        }
    }

    fn note_listing(&self, output: &str) -> Listing<Note> {
        parse_list(output, self.config.max_results).map(Note::titled)
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(NotesError::invalid_input(format!("{field} must not be empty")));
    }
    Ok(())
}

/// The bridge terminates its result with one newline.
fn strip_result_newline(mut output: String) -> String {
    if output.ends_with('\n') {
        output.pop();
    }
    output
}
