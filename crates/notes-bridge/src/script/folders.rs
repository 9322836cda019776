//! Folder listing, creation, moves and the hierarchy walk.

use super::{Literal, ScriptBuilder, ScriptWriter};
use super::{ESCAPE_TEXT_HANDLER, JOIN_LIST_HANDLER};

/// Recursive walk executed inside the bridge. Each folder becomes
/// `{name:"..", shared:bool, noteCount:n, children:{...}}`.
const FOLDER_RECORD_HANDLER: &str = r#"
on folderRecord(theFolder)
	tell application "Notes"
		set childRecords to {}
		repeat with childFolder in (folders of theFolder)
			set end of childRecords to my folderRecord(childFolder)
		end repeat
		set folderName to name of theFolder
		set folderShared to shared of theFolder
		set folderCount to count of notes of theFolder
	end tell
	return "{name:\"" & my escapeText(folderName) & "\", shared:" & (folderShared as text) & ", noteCount:" & (folderCount as text) & ", children:{" & my joinList(childRecords, ", ") & "}}"
end folderRecord
"#;

impl ScriptBuilder {
    pub fn list_folders(&self) -> String {
        self.in_account(|w| {
            w.line("set folderNames to {}");
            w.each("f", "folders", |w| {
                w.line("set end of folderNames to name of f");
            });
            w.return_joined("folderNames");
        })
    }

    /// Create `name` at the account root, or inside `parent` when given.
    pub fn create_folder(&self, name: &str, parent: Option<&str>) -> String {
        let name = Literal::text(name);
        match parent.filter(|parent| !parent.is_empty()) {
            None => self.in_account(|w| {
                w.line(format!("make new folder with properties {{name:{name}}}"));
            }),
            Some(parent) => {
                let parent = Literal::text(parent);
                self.in_account(|w| {
                    w.line(format!("set parentFolder to folder {parent}"))
                        .line(format!("make new folder at parentFolder with properties {{name:{name}}}"));
                })
            }
        }
    }

    /// Resolve both the folder and the note before moving.
    pub fn move_note(&self, title: &str, folder: &str) -> String {
        let title = Literal::text(title);
        let folder = Literal::text(folder);
        self.in_account(|w| {
            w.line(format!("set targetFolder to folder {folder}"))
                .line(format!("set theNote to note {title}"))
                .line("move theNote to targetFolder");
        })
    }

    /// Nested folder record rooted at the account. Only top-level folders
    /// are walked from the root; the handler descends into the rest.
    pub fn folder_hierarchy(&self) -> String {
        let account = Literal::text(self.account());
        let mut w = ScriptWriter::new();
        w.raw(ESCAPE_TEXT_HANDLER)
            .raw(JOIN_LIST_HANDLER)
            .raw(FOLDER_RECORD_HANDLER);
        w.line("set topRecords to {}");
        self.write_in_account(&mut w, |w| {
            w.each("f", "folders", |w| {
                w.when("class of (container of f) is not folder", |w| {
                    w.line("set end of topRecords to my folderRecord(f)");
                });
            });
        });
        w.line(format!(
            "return \"{{name:\\\"\" & my escapeText({account}) & \"\\\", shared:false, noteCount:0, children:{{\" & my joinList(topRecords, \", \") & \"}}}}\""
        ));
        w.finish()
    }
}
