//! Recursive descent over the bridge's record notation.
//!
//! ```text
//! value  := text | '{' [ entries ] '}' | bare
//! text   := '"' ( '\' any | [^"\\] )* '"'
//! record := label ':' value ( ',' label ':' value )*
//! list   := value ( ',' value )*
//! bare   := anything up to ',' or '}' outside quotes, e.g. true, 42, date "..."
//! ```

use std::fmt;

use crate::error::ParseError;
use crate::escape::escape;
use crate::types::FolderNode;

/// A parsed value in the bridge's record notation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordValue {
    Text(String),
    Bare(String),
    List(Vec<RecordValue>),
    Record(Vec<(String, RecordValue)>),
}

impl RecordValue {
    /// Field lookup on a record. Labels compare case-insensitively since the
    /// bridge is not consistent about `noteCount` versus `notecount`.
    pub fn get(&self, label: &str) -> Option<&RecordValue> {
        match self {
            RecordValue::Record(fields) => fields
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(label))
                .map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            RecordValue::Text(text) | RecordValue::Bare(text) => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordValue::Text(text) => write!(f, "\"{}\"", escape(text)),
            RecordValue::Bare(text) => f.write_str(text),
            RecordValue::List(items) => {
                f.write_str("{")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("}")
            }
            RecordValue::Record(fields) => {
                f.write_str("{")?;
                for (i, (key, value)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}:{value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Parse one complete value. Trailing input other than whitespace is an
/// error.
pub fn parse_record_value(input: &str) -> Result<RecordValue, ParseError> {
    let mut parser = Parser { input, pos: 0 };
    let value = parser.value()?;
    parser.skip_ws();
    if parser.pos < input.len() {
        return Err(parser.malformed("unexpected trailing input"));
    }
    Ok(value)
}

/// Rebuild the folder tree from the hierarchy walk's nested record.
pub fn parse_folder_hierarchy(output: &str) -> Result<FolderNode, ParseError> {
    let value = parse_record_value(output.trim())?;
    folder_node(&value)
}

fn folder_node(value: &RecordValue) -> Result<FolderNode, ParseError> {
    if !matches!(value, RecordValue::Record(_)) {
        return Err(ParseError::InvalidField {
            field: "folder".to_string(),
            value: value.to_string(),
        });
    }

    let name = value
        .get("name")
        .and_then(RecordValue::as_text)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ParseError::MissingField {
            field: "name".to_string(),
            record: value.to_string(),
        })?
        .to_string();

    let shared = match value.get("shared") {
        None => false,
        Some(flag) => match flag.as_text() {
            Some("true") => true,
            Some("false") => false,
            _ => return Err(invalid("shared", flag)),
        },
    };

    let note_count = match value.get("noteCount") {
        None => 0,
        Some(count) => count
            .as_text()
            .and_then(|text| text.trim().parse::<u64>().ok())
            .ok_or_else(|| invalid("noteCount", count))?,
    };

    let children = match value.get("children") {
        None => Vec::new(),
        Some(RecordValue::List(items)) => items
            .iter()
            .map(folder_node)
            .collect::<Result<Vec<_>, ParseError>>()?,
        // A lone child record without list braces.
        Some(child @ RecordValue::Record(_)) => vec![folder_node(child)?],
        Some(other) => return Err(invalid("children", other)),
    };

    Ok(FolderNode {
        name,
        shared,
        note_count,
        children,
    })
}

fn invalid(field: &str, value: &RecordValue) -> ParseError {
    ParseError::InvalidField {
        field: field.to_string(),
        value: value.to_string(),
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> ParseError {
        ParseError::Malformed {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn expect(&mut self, want: char) -> Result<(), ParseError> {
        match self.bump() {
            Some(c) if c == want => Ok(()),
            Some(c) => Err(self.malformed(format!("expected '{want}', found '{c}'"))),
            None => Err(self.malformed(format!("expected '{want}', found end of input"))),
        }
    }

    fn value(&mut self) -> Result<RecordValue, ParseError> {
        self.skip_ws();
        match self.peek() {
            Some('"') => self.text().map(RecordValue::Text),
            Some('{') => self.braced(),
            Some(_) => self.bare(),
            None => Err(self.malformed("expected value, found end of input")),
        }
    }

    fn text(&mut self) -> Result<String, ParseError> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some(c @ ('"' | '\\')) => out.push(c),
                    Some(c) => {
                        out.push('\\');
                        out.push(c);
                    }
                    None => return Err(self.malformed("unterminated escape")),
                },
                Some(c) => out.push(c),
                None => return Err(self.malformed("unterminated string")),
            }
        }
    }

    fn bare(&mut self) -> Result<RecordValue, ParseError> {
        let start = self.pos;
        let mut in_quotes = false;
        while let Some(c) = self.peek() {
            match c {
                '"' => in_quotes = !in_quotes,
                '\\' if in_quotes => {
                    self.bump();
                }
                ',' | '}' if !in_quotes => break,
                _ => {}
            }
            self.bump();
        }
        if in_quotes {
            return Err(self.malformed("unterminated string"));
        }
        let text = self.input[start..self.pos].trim();
        if text.is_empty() {
            return Err(self.malformed("expected value"));
        }
        Ok(RecordValue::Bare(text.to_string()))
    }

    /// `{}` is an empty list; a leading `label:` makes it a record.
    fn braced(&mut self) -> Result<RecordValue, ParseError> {
        self.expect('{')?;
        self.skip_ws();
        if self.peek() == Some('}') {
            self.bump();
            return Ok(RecordValue::List(Vec::new()));
        }

        if self.label_ahead().is_some() {
            let mut fields = Vec::new();
            loop {
                self.skip_ws();
                let label = self
                    .label_ahead()
                    .ok_or_else(|| self.malformed("expected field label"))?;
                self.pos += label.len();
                self.skip_ws();
                self.expect(':')?;
                let value = self.value()?;
                fields.push((label.trim().to_string(), value));
                if !self.separator()? {
                    return Ok(RecordValue::Record(fields));
                }
            }
        }

        let mut items = Vec::new();
        loop {
            items.push(self.value()?);
            if !self.separator()? {
                return Ok(RecordValue::List(items));
            }
        }
    }

    /// Label text up to (not including) the next `:`, if the input at the
    /// cursor is a label. Labels may contain spaces (`creation date`).
    fn label_ahead(&self) -> Option<&'a str> {
        let rest = self.rest();
        let end = rest.find(|c: char| !(c.is_alphanumeric() || c == '_' || c == ' '))?;
        let label = &rest[..end];
        (rest[end..].starts_with(':') && !label.trim().is_empty()).then_some(label)
    }

    /// Consumes `,` (returns true) or `}` (returns false).
    fn separator(&mut self) -> Result<bool, ParseError> {
        self.skip_ws();
        match self.bump() {
            Some(',') => Ok(true),
            Some('}') => Ok(false),
            Some(c) => Err(self.malformed(format!("expected ',' or '}}', found '{c}'"))),
            None => Err(self.malformed("unterminated braces")),
        }
    }
}
