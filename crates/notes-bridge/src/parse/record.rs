use crate::escape::unescape;

/// Text following `field:` when `field` labels a top-level entry of the
/// record. Quoted spans and nested braces are stepped over, so a label
/// spelled out inside another field's value never matches.
fn field_value<'a>(record: &'a str, field: &str) -> Option<&'a str> {
    let label_at = |offset: usize| {
        let rest = record[offset..].trim_start().strip_prefix(field)?;
        rest.trim_start().strip_prefix(':')
    };
    if let Some(value) = label_at(0) {
        return Some(value);
    }

    let mut depth = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in record.char_indices() {
        if in_quotes {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_quotes = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        let starts_entry = match c {
            '{' => depth == 1,
            ',' => depth <= 1,
            _ => false,
        };
        if starts_entry {
            if let Some(value) = label_at(i + 1) {
                return Some(value);
            }
        }
    }
    None
}

/// Body of a leading `"..."`, still escaped, or `None` if it never closes.
fn quoted(value: &str) -> Option<&str> {
    let body = value.strip_prefix('"')?;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(&body[..i]),
            _ => {}
        }
    }
    None
}

/// Value of `field` in a `{field:"value", other:value}` record line.
///
/// Quoted values are unescaped; bare values run to the next `,` or `}`.
/// Returns `None` when the field is absent or empty.
pub fn extract_field(record: &str, field: &str) -> Option<String> {
    let raw = field_value(record, field)?.trim_start();
    let value = if raw.starts_with('"') {
        unescape(quoted(raw)?)
    } else {
        let end = raw.find([',', '}']).unwrap_or(raw.len());
        raw[..end].trim().to_string()
    };
    (!value.is_empty()).then_some(value)
}

/// Contents of a `field:date "..."` entry.
pub fn extract_date_field(record: &str, field: &str) -> Option<String> {
    let raw = field_value(record, field)?.trim_start();
    let value = quoted(raw.strip_prefix("date")?.trim_start())?.trim();
    (!value.is_empty()).then_some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"{id:"x-coredata://ABC/ICNote/p12", name:"Plan, v2", creation date:date "Monday, January 1, 2024 at 10:00:00 AM", container:"Work", shared:false, password protected:true}"#;

    #[test]
    fn quoted_values() {
        assert_eq!(
            extract_field(RECORD, "id").as_deref(),
            Some("x-coredata://ABC/ICNote/p12")
        );
        assert_eq!(extract_field(RECORD, "name").as_deref(), Some("Plan, v2"));
        assert_eq!(extract_field(RECORD, "container").as_deref(), Some("Work"));
    }

    #[test]
    fn bare_values() {
        assert_eq!(extract_field(RECORD, "shared").as_deref(), Some("false"));
        assert_eq!(
            extract_field(RECORD, "password protected").as_deref(),
            Some("true")
        );
    }

    #[test]
    fn absent_field_is_none() {
        assert_eq!(extract_field(RECORD, "modification date"), None);
        assert_eq!(extract_date_field(RECORD, "modification date"), None);
    }

    #[test]
    fn field_order_does_not_matter() {
        let record = r#"{shared:true, id:"42"}"#;
        assert_eq!(extract_field(record, "id").as_deref(), Some("42"));
        assert_eq!(extract_field(record, "shared").as_deref(), Some("true"));
    }

    #[test]
    fn field_names_match_whole_labels() {
        let record = r#"{paid:"no", id:"7"}"#;
        assert_eq!(extract_field(record, "id").as_deref(), Some("7"));
    }

    #[test]
    fn escaped_quotes_inside_values() {
        let record = r#"{name:"She said \"hi\"", id:"1"}"#;
        assert_eq!(
            extract_field(record, "name").as_deref(),
            Some("She said \"hi\"")
        );
    }

    #[test]
    fn date_fields() {
        assert_eq!(
            extract_date_field(RECORD, "creation date").as_deref(),
            Some("Monday, January 1, 2024 at 10:00:00 AM")
        );
    }

    #[test]
    fn labels_inside_quoted_values_are_skipped() {
        let record = r#"{id:"p1", name:"Ideas, shared:yes, container:Fake", container:"Work", shared:false}"#;
        assert_eq!(
            extract_field(record, "name").as_deref(),
            Some("Ideas, shared:yes, container:Fake")
        );
        assert_eq!(extract_field(record, "container").as_deref(), Some("Work"));
        assert_eq!(extract_field(record, "shared").as_deref(), Some("false"));
    }

    #[test]
    fn labels_inside_nested_braces_are_skipped() {
        let record = r#"{extra:{id:"inner"}, id:"outer"}"#;
        assert_eq!(extract_field(record, "id").as_deref(), Some("outer"));
    }

    #[test]
    fn unterminated_quote_is_none() {
        assert_eq!(extract_field(r#"{name:"open"#, "name"), None);
    }
}
