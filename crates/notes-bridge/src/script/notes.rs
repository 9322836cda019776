//! Scripts addressing individual notes.

use super::{date_field, quoted_field, Literal, ScriptBuilder, ScriptWriter};
use super::{ESCAPE_TEXT_HANDLER, JOIN_LIST_HANDLER};

impl ScriptBuilder {
    /// Create a note and return its identifier. Tags are not sent; Notes has
    /// no tag concept.
    pub fn create_note(&self, title: &str, content: &str) -> String {
        let title = Literal::text(title);
        let body = Literal::body(content);
        self.in_account(|w| {
            w.line(format!(
                "set newNote to make new note with properties {{name:{title}, body:{body}}}"
            ))
            .line("return id of newNote");
        })
    }

    pub fn note_body(&self, title: &str) -> String {
        let title = Literal::text(title);
        self.in_account(|w| {
            w.line(format!("return body of note {title}"));
        })
    }

    pub fn note_plaintext(&self, title: &str) -> String {
        let title = Literal::text(title);
        self.in_account(|w| {
            w.line(format!("return plaintext of note {title}"));
        })
    }

    pub fn update_note(&self, title: &str, content: &str) -> String {
        let title = Literal::text(title);
        let body = Literal::body(content);
        self.in_account(|w| {
            w.line(format!("set body of note {title} to {body}"));
        })
    }

    pub fn delete_note(&self, title: &str) -> String {
        let title = Literal::text(title);
        self.in_account(|w| {
            w.line(format!("delete note {title}"));
        })
    }

    /// One field record with id, name, dates, container and flags.
    pub fn note_metadata(&self, title: &str) -> String {
        let title = Literal::text(title);
        let mut w = ScriptWriter::new();
        w.raw(ESCAPE_TEXT_HANDLER);
        self.write_in_account(&mut w, |w| {
            w.line(format!("set theNote to note {title}"))
                .line(format!(
                    "return \"{{\" & {} & \", \" & {} & \", \" & {} & \", \" & {} & \", \" & {} & \", shared:\" & (shared of theNote as text) & \", password protected:\" & (password protected of theNote as text) & \"}}\"",
                    quoted_field("id", "id of theNote"),
                    quoted_field("name", "name of theNote"),
                    date_field("creation date", "creation date of theNote"),
                    date_field("modification date", "modification date of theNote"),
                    quoted_field("container", "name of container of theNote"),
                ));
        });
        w.finish()
    }

    /// One field record per attachment, newline separated.
    pub fn note_attachments(&self, title: &str) -> String {
        let title = Literal::text(title);
        let mut w = ScriptWriter::new();
        w.raw(ESCAPE_TEXT_HANDLER).raw(JOIN_LIST_HANDLER);
        self.write_in_account(&mut w, |w| {
            w.line(format!("set theNote to note {title}"))
                .line("set attLines to {}");
            w.each("att", "(attachments of theNote)", |w| {
                w.attempt(
                    |w| {
                        w.line("set attPath to (contents of att) as text");
                    },
                    |w| {
                        w.line("set attPath to \"\"");
                    },
                )
                .line(format!(
                    "set end of attLines to \"{{\" & {} & \", \" & {} & \", \" & {} & \", \" & {} & \", \" & {} & \"}}\"",
                    quoted_field("id", "id of att"),
                    quoted_field("name", "name of att"),
                    quoted_field("contents", "attPath"),
                    date_field("creation date", "creation date of att"),
                    date_field("modification date", "modification date of att"),
                ));
            });
            w.line("return my joinList(attLines, linefeed)");
        });
        w.finish()
    }

    /// Titles of all notes in the account, most recent first, capped at
    /// `limit`.
    pub fn recent_notes(&self, limit: usize) -> String {
        let limit = Literal::number(limit as u64);
        self.in_account(|w| {
            w.line("set noteNames to name of notes")
                .when(format!("(count of noteNames) > {limit}"), |w| {
                    w.line(format!("set noteNames to items 1 thru {limit} of noteNames"));
                })
                .return_joined("noteNames");
        })
    }

    pub fn notes_in_folder(&self, folder: &str) -> String {
        let folder = Literal::text(folder);
        self.in_account(|w| {
            w.line(format!("set noteNames to name of notes of folder {folder}"))
                .return_joined("noteNames");
        })
    }
}
