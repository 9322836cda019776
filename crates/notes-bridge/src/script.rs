//! AppleScript generation for every bridge operation.
//!
//! Scripts produce output in one of two shapes:
//! - a `|||`-joined list of names (searches, folder and note listings)
//! - brace-delimited field records, one per line (metadata, attachments,
//!   folder hierarchy)
//!
//! Every caller-supplied value enters the script through [`Literal`].

mod folders;
mod notes;
mod search;
mod writer;

pub use search::SearchStrategy;
pub use writer::{Literal, ScriptWriter};

/// Separator for list output. Titles may contain commas, so the bridge's
/// default `, ` joining is ambiguous.
pub const LIST_DELIMITER: &str = "|||";

/// Replaces `\` and `"` in a text value so it can be emitted inside a
/// quoted record field. Mirrors [`crate::escape::escape`] on the bridge side.
const ESCAPE_TEXT_HANDLER: &str = r#"
on escapeText(theText)
	set theText to theText as text
	set oldDelimiters to AppleScript's text item delimiters
	set AppleScript's text item delimiters to "\\"
	set textParts to text items of theText
	set AppleScript's text item delimiters to "\\\\"
	set theText to textParts as text
	set AppleScript's text item delimiters to "\""
	set textParts to text items of theText
	set AppleScript's text item delimiters to "\\\""
	set theText to textParts as text
	set AppleScript's text item delimiters to oldDelimiters
	return theText
end escapeText
"#;

const JOIN_LIST_HANDLER: &str = r#"
on joinList(theItems, theSeparator)
	set oldDelimiters to AppleScript's text item delimiters
	set AppleScript's text item delimiters to theSeparator
	set joinedText to theItems as text
	set AppleScript's text item delimiters to oldDelimiters
	return joinedText
end joinList
"#;

/// Builds account-scoped scripts.
#[derive(Debug, Clone)]
pub struct ScriptBuilder {
    account: String,
}

impl ScriptBuilder {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    /// `tell application "Notes" / tell account ...` around `body`.
    fn in_account(&self, body: impl FnOnce(&mut ScriptWriter)) -> String {
        let mut w = ScriptWriter::new();
        self.write_in_account(&mut w, body);
        w.finish()
    }

    fn write_in_account(&self, w: &mut ScriptWriter, body: impl FnOnce(&mut ScriptWriter)) {
        let account = Literal::text(&self.account);
        w.tell("application \"Notes\"", |w| {
            w.tell(format!("account {account}"), body);
        });
    }
}

/// Emits `"field:\"" & my escapeText(expr) & "\""` as an AppleScript
/// text expression.
fn quoted_field(label: &str, expr: &str) -> String {
    format!(r#""{label}:\"" & my escapeText({expr}) & "\"""#)
}

/// Emits a `field:date "..."` text expression.
fn date_field(label: &str, expr: &str) -> String {
    format!(r#""{label}:date \"" & my escapeText(({expr}) as text) & "\"""#)
}
