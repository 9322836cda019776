use super::metadata::optional_date;
use super::record::extract_field;
use crate::error::ParseError;
use crate::types::Attachment;

/// Parse the attachment listing, one field record per line.
pub fn parse_attachments(output: &str) -> Result<Vec<Attachment>, ParseError> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_attachment)
        .collect()
}

fn parse_attachment(record: &str) -> Result<Attachment, ParseError> {
    let id = extract_field(record, "id").ok_or_else(|| ParseError::MissingField {
        field: "id".to_string(),
        record: record.to_string(),
    })?;
    let file_path = extract_field(record, "contents")
        .map(|contents| decode_file_url(&contents))
        .unwrap_or_default();

    Ok(Attachment {
        content_identifier: id.clone(),
        id,
        name: extract_field(record, "name").unwrap_or_default(),
        file_path,
        creation_date: optional_date(record, "creation date")?,
        modification_date: optional_date(record, "modification date")?,
    })
}

/// `file:///Users/a/My%20File.png` -> `/Users/a/My File.png`. Values that
/// are not valid percent-encoding are kept as they are.
fn decode_file_url(contents: &str) -> String {
    let path = contents.strip_prefix("file://").unwrap_or(contents);
    match urlencoding::decode(path) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => path.to_string(),
    }
}
