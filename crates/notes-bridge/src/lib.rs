//! Apple Notes bridge: builds AppleScript for each notes operation, runs it
//! through `osascript` under a deadline, classifies failures and parses the
//! output into typed values.

pub mod classify;
pub mod config;
pub mod context;
pub mod error;
pub mod escape;
pub mod executor;
pub mod markdown;
pub mod parse;
pub mod script;
pub mod service;
pub mod types;

pub use crate::config::BridgeConfig;
pub use crate::context::CallContext;
pub use crate::error::{ExecutionError, NotesError, ParseError, Result};
pub use crate::executor::{OsascriptExecutor, ScriptExecutor, ScriptFailure, ScriptOutput};
pub use crate::service::{NotesService, Request, Response};
pub use crate::types::{Attachment, FolderNode, Listing, Note, SearchOptions, SearchScope};
