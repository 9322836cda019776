use std::fmt;

use chrono::NaiveDateTime;

use crate::escape::{escape, format_body};
use crate::parse::format_date;

/// A value that is safe to splice into script text.
///
/// The only ways to build one go through [`escape`], so raw caller input
/// never reaches the generated source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal(String);

impl Literal {
    /// Quoted string literal.
    pub fn text(raw: &str) -> Self {
        Self(format!("\"{}\"", escape(raw)))
    }

    /// Quoted note body with line breaks turned into `<br>`.
    pub fn body(raw: &str) -> Self {
        Self(format!("\"{}\"", format_body(raw)))
    }

    /// `date "..."` literal in the bridge's date layout.
    pub fn date(value: NaiveDateTime) -> Self {
        Self(format!("date \"{}\"", escape(&format_date(value))))
    }

    /// Integer literal.
    pub fn number(value: u64) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Line-oriented AppleScript builder that tracks block indentation.
#[derive(Debug, Default)]
pub struct ScriptWriter {
    buf: String,
    depth: usize,
}

impl ScriptWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one statement at the current depth.
    pub fn line(&mut self, statement: impl AsRef<str>) -> &mut Self {
        for _ in 0..self.depth {
            self.buf.push('\t');
        }
        self.buf.push_str(statement.as_ref());
        self.buf.push('\n');
        self
    }

    /// Append a verbatim chunk (handler definitions), ignoring depth.
    pub fn raw(&mut self, chunk: &str) -> &mut Self {
        self.buf.push_str(chunk.trim_start_matches('\n'));
        if !chunk.ends_with('\n') {
            self.buf.push('\n');
        }
        self
    }

    /// Append a block header and indent what follows.
    pub fn open(&mut self, header: impl AsRef<str>) -> &mut Self {
        self.line(header);
        self.depth += 1;
        self
    }

    /// Dedent and append the block footer.
    pub fn close(&mut self, footer: impl AsRef<str>) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(footer)
    }

    /// `tell` block around `body`.
    pub fn tell(&mut self, target: impl AsRef<str>, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.open(format!("tell {}", target.as_ref()));
        body(self);
        self.close("end tell")
    }

    /// `if` block around `body`.
    pub fn when(&mut self, condition: impl AsRef<str>, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.open(format!("if {} then", condition.as_ref()));
        body(self);
        self.close("end if")
    }

    /// `try ... on error ... end try`.
    pub fn attempt(
        &mut self,
        body: impl FnOnce(&mut Self),
        on_error: impl FnOnce(&mut Self),
    ) -> &mut Self {
        self.open("try");
        body(self);
        self.depth = self.depth.saturating_sub(1);
        self.open("on error");
        on_error(self);
        self.close("end try")
    }

    /// `repeat with` block around `body`.
    pub fn each(
        &mut self,
        var: &str,
        collection: impl AsRef<str>,
        body: impl FnOnce(&mut Self),
    ) -> &mut Self {
        self.open(format!("repeat with {var} in {}", collection.as_ref()));
        body(self);
        self.close("end repeat")
    }

    /// Join `list_var` with the list delimiter and return it.
    pub fn return_joined(&mut self, list_var: &str) -> &mut Self {
        self.line("set oldDelimiters to AppleScript's text item delimiters")
            .line(format!(
                "set AppleScript's text item delimiters to {}",
                Literal::text(super::LIST_DELIMITER)
            ))
            .line(format!("set joined to {list_var} as string"))
            .line("set AppleScript's text item delimiters to oldDelimiters")
            .line("return joined")
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
