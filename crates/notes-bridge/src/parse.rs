//! Parsing of bridge output into typed values.
//!
//! This module provides:
//! - `|||`-delimited list parsing with a result cap
//! - single-line field record extraction
//! - the bridge's natural-language date layout
//! - attachment and note metadata records
//! - recursive parsing of the nested folder hierarchy record

mod attachments;
mod date;
mod hierarchy;
mod list;
mod metadata;
mod record;

pub use attachments::parse_attachments;
pub use date::{format_date, parse_date};
pub use hierarchy::{parse_folder_hierarchy, parse_record_value, RecordValue};
pub use list::parse_list;
pub use metadata::parse_note_metadata;
pub use record::{extract_date_field, extract_field};
