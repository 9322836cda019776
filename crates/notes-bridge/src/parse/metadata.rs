use chrono::NaiveDateTime;

use super::date::parse_date;
use super::record::{extract_date_field, extract_field};
use crate::error::ParseError;
use crate::types::Note;

/// Build a [`Note`] from the metadata record of the note titled `title`.
///
/// `id` is required. Dates are optional, but a date that is present and
/// does not parse is an error.
pub fn parse_note_metadata(output: &str, title: &str) -> Result<Note, ParseError> {
    let record = output.trim();
    let id = extract_field(record, "id").ok_or_else(|| ParseError::MissingField {
        field: "id".to_string(),
        record: record.to_string(),
    })?;

    let mut note = Note::titled(extract_field(record, "name").unwrap_or_else(|| title.to_string()));
    note.id = Some(id);
    note.folder = extract_field(record, "container");
    note.shared = parse_flag(record, "shared")?;
    note.password_protected = parse_flag(record, "password protected")?;
    note.created = optional_date(record, "creation date")?;
    note.modified = optional_date(record, "modification date")?;
    Ok(note)
}

pub(super) fn optional_date(record: &str, field: &str) -> Result<Option<NaiveDateTime>, ParseError> {
    extract_date_field(record, field)
        .map(|value| parse_date(&value))
        .transpose()
}

fn parse_flag(record: &str, field: &str) -> Result<bool, ParseError> {
    match extract_field(record, field).as_deref() {
        None | Some("false") => Ok(false),
        Some("true") => Ok(true),
        Some(other) => Err(ParseError::InvalidField {
            field: field.to_string(),
            value: other.to_string(),
        }),
    }
}
