use crate::script::LIST_DELIMITER;
use crate::types::Listing;

/// Split delimiter-joined bridge output, dropping empty segments and
/// keeping at most `cap` items. `total` counts every non-empty segment.
pub fn parse_list(output: &str, cap: usize) -> Listing<String> {
    let output = output.trim();
    if output.is_empty() {
        return Listing::empty();
    }

    let mut items = Vec::new();
    let mut total = 0;
    for segment in output.split(LIST_DELIMITER) {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }
        total += 1;
        if items.len() < cap {
            items.push(segment.to_string());
        }
    }

    if total > items.len() {
        tracing::debug!("list output capped at {} of {} entries", items.len(), total);
    }
    Listing { items, total }
}
