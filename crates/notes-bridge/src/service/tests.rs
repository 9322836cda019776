use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{NotesService, Request, Response};
use crate::config::BridgeConfig;
use crate::context::CallContext;
use crate::error::{ExecutionError, NotesError};
use crate::executor::{ScriptExecutor, ScriptFailure, ScriptOutput};
use crate::types::SearchOptions;

/// Replays canned results in order and records every script it is given.
#[derive(Default)]
struct MockExecutor {
    replies: Mutex<VecDeque<Result<ScriptOutput, ScriptFailure>>>,
    scripts: Mutex<Vec<String>>,
    deadlines: Mutex<Vec<bool>>,
}

impl MockExecutor {
    fn replying(stdout: &str) -> Arc<Self> {
        let mock = Self::default();
        mock.push_ok(stdout);
        Arc::new(mock)
    }

    fn failing(diagnostics: &str, error: ExecutionError) -> Arc<Self> {
        let mock = Self::default();
        mock.replies
            .lock()
            .unwrap()
            .push_back(Err(ScriptFailure::new(diagnostics, error)));
        Arc::new(mock)
    }

    fn push_ok(&self, stdout: &str) {
        self.replies.lock().unwrap().push_back(Ok(ScriptOutput {
            stdout: stdout.to_string(),
            stderr: String::new(),
        }));
    }

    fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }

    fn last_script(&self) -> String {
        self.scripts().last().cloned().expect("no script was executed")
    }
}

#[async_trait]
impl ScriptExecutor for MockExecutor {
    async fn execute(&self, ctx: &CallContext, script: &str) -> Result<ScriptOutput, ScriptFailure> {
        self.scripts.lock().unwrap().push(script.to_string());
        self.deadlines.lock().unwrap().push(ctx.deadline().is_some());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ScriptOutput::default()))
    }
}

fn service(mock: &Arc<MockExecutor>) -> NotesService {
    NotesService::with_executor(BridgeConfig::default(), mock.clone())
}

fn service_with(config: BridgeConfig, mock: &Arc<MockExecutor>) -> NotesService {
    NotesService::with_executor(config, mock.clone())
}

fn ctx() -> CallContext {
    CallContext::new()
}

#[tokio::test]
async fn create_note_returns_bridge_id_and_echoes_tags() {
    let mock = MockExecutor::replying("x-coredata://ABC/ICNote/p42\n");
    let note = service(&mock)
        .create_note(&ctx(), "Groceries", "milk\neggs", vec!["home".into()])
        .await
        .expect("create");

    assert_eq!(note.id.as_deref(), Some("x-coredata://ABC/ICNote/p42"));
    assert_eq!(note.title, "Groceries");
    assert_eq!(note.content.as_deref(), Some("milk\neggs"));
    assert_eq!(note.tags, vec!["home".to_string()]);
    assert!(note.created.is_some());
    assert_eq!(note.created, note.modified);

    let script = mock.last_script();
    assert!(script.contains("body:\"milk<br>eggs\""));
    assert!(script.contains("tell account \"iCloud\""));
}

#[tokio::test]
async fn empty_title_is_rejected_before_any_script() {
    let mock = Arc::new(MockExecutor::default());
    let svc = service(&mock);

    let err = svc.create_note(&ctx(), "", "body", vec![]).await.unwrap_err();
    assert!(matches!(err, NotesError::InvalidInput(_)));
    assert!(matches!(
        svc.delete_note(&ctx(), "   ").await.unwrap_err(),
        NotesError::InvalidInput(_)
    ));
    assert!(matches!(
        svc.move_note(&ctx(), "Plan", "").await.unwrap_err(),
        NotesError::InvalidInput(_)
    ));
    assert!(matches!(
        svc.create_folder(&ctx(), "", Some("Work")).await.unwrap_err(),
        NotesError::InvalidInput(_)
    ));
    assert!(matches!(
        svc.get_notes_in_folder(&ctx(), "").await.unwrap_err(),
        NotesError::InvalidInput(_)
    ));
    assert!(mock.scripts().is_empty());
}

#[tokio::test]
async fn search_keeps_titles_with_commas() {
    let mock = MockExecutor::replying("Plan, v2|||Budget|||\n");
    let listing = service(&mock)
        .search_notes(&ctx(), "a")
        .await
        .expect("search");
    let titles: Vec<_> = listing.items.iter().map(|n| n.title.as_str()).collect();
    assert_eq!(titles, vec!["Plan, v2", "Budget"]);
    assert!(!listing.is_truncated());
    assert!(mock.last_script().contains("notes where name contains \"a\""));
}

#[tokio::test]
async fn search_results_are_capped_with_true_total() {
    let mock = MockExecutor::replying("a|||b|||c|||d");
    let config = BridgeConfig {
        max_results: 2,
        ..BridgeConfig::default()
    };
    let listing = service_with(config, &mock)
        .search_notes(&ctx(), "x")
        .await
        .expect("search");
    assert_eq!(listing.len(), 2);
    assert_eq!(listing.total, 4);
    assert_eq!(
        listing.notice("matching notes").as_deref(),
        Some("Showing first 2 of 4 matching notes")
    );
}

#[tokio::test]
async fn advanced_search_narrows_by_folder_before_body_match() {
    let mock = MockExecutor::replying("Q1 plan");
    let options = SearchOptions::new("budget", "body").unwrap().in_folder("Work");
    let listing = service(&mock)
        .search_notes_advanced(&ctx(), &options)
        .await
        .expect("search");
    assert_eq!(listing.items[0].title, "Q1 plan");

    let script = mock.last_script();
    let folder_at = script.find("set targetFolder to folder \"Work\"").unwrap();
    let body_at = script.find("body of n contains \"budget\"").unwrap();
    assert!(folder_at < body_at);
}

#[tokio::test]
async fn advanced_search_rejects_inverted_dates() {
    let mock = Arc::new(MockExecutor::default());
    let day = |d| {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    };
    let options = SearchOptions::new("q", "title")
        .unwrap()
        .modified_between(Some(day(10)), Some(day(1)));
    let err = service(&mock)
        .search_notes_advanced(&ctx(), &options)
        .await
        .unwrap_err();
    assert!(matches!(err, NotesError::InvalidInput(_)));
    assert!(mock.scripts().is_empty());
}

#[tokio::test]
async fn bridge_failures_are_classified() {
    let mock = MockExecutor::failing(
        "execution error: Notes got an error: Can't get note \"Nope\". (-1728)",
        ExecutionError::Exit { code: Some(1) },
    );
    let err = service(&mock)
        .get_note_content(&ctx(), "Nope")
        .await
        .unwrap_err();
    assert!(matches!(err, NotesError::AppNotRunning));

    let mock = MockExecutor::failing("", ExecutionError::DeadlineExceeded);
    let err = service(&mock).list_folders(&ctx()).await.unwrap_err();
    assert!(matches!(err, NotesError::ScriptTimeout));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn request_timeout_becomes_the_call_deadline() {
    let mock = MockExecutor::replying("");
    service(&mock).list_folders(&ctx()).await.expect("list");
    assert_eq!(*mock.deadlines.lock().unwrap(), vec![true]);
}

#[tokio::test]
async fn content_drops_only_the_result_newline() {
    let mock = MockExecutor::replying("<div>a</div>\n\n");
    let body = service(&mock)
        .get_note_content(&ctx(), "A")
        .await
        .expect("content");
    assert_eq!(body, "<div>a</div>\n");
}

#[tokio::test]
async fn metadata_is_parsed() {
    let mock = MockExecutor::replying(
        "{id:\"p1\", name:\"Plan\", creation date:date \"Monday, January 1, 2024 at 10:00:00 AM\", modification date:date \"Monday, January 1, 2024 at 10:05:00 AM\", container:\"Work\", shared:false, password protected:true}\n",
    );
    let note = service(&mock)
        .get_note_metadata(&ctx(), "Plan")
        .await
        .expect("metadata");
    assert_eq!(note.id.as_deref(), Some("p1"));
    assert_eq!(note.folder.as_deref(), Some("Work"));
    assert!(note.password_protected);
}

#[tokio::test]
async fn malformed_metadata_is_a_parse_error() {
    let mock = MockExecutor::replying("{name:\"Plan\"}");
    let err = service(&mock)
        .get_note_metadata(&ctx(), "Plan")
        .await
        .unwrap_err();
    assert!(matches!(err, NotesError::Parse(_)));
}

#[tokio::test]
async fn recent_notes_limit_defaults_and_clamps() {
    let mock = Arc::new(MockExecutor::default());
    let config = BridgeConfig {
        max_results: 50,
        ..BridgeConfig::default()
    };
    let svc = service_with(config, &mock);

    svc.get_recent_notes(&ctx(), 0).await.expect("recent");
    assert!(mock.last_script().contains("> 50 then"));

    svc.get_recent_notes(&ctx(), 500).await.expect("recent");
    assert!(mock.last_script().contains("> 50 then"));

    mock.push_ok("one|||two|||three");
    let notes = svc.get_recent_notes(&ctx(), 2).await.expect("recent");
    assert!(mock.last_script().contains("> 2 then"));
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[1].title, "two");
}

#[tokio::test]
async fn folder_operations_build_expected_scripts() {
    let mock = Arc::new(MockExecutor::default());
    let svc = service(&mock);

    svc.create_folder(&ctx(), "Q1", Some("Work")).await.expect("create");
    assert!(mock.last_script().contains("set parentFolder to folder \"Work\""));

    svc.move_note(&ctx(), "Plan", "Archive").await.expect("move");
    assert!(mock.last_script().contains("move theNote to targetFolder"));

    mock.push_ok("Work|||Personal, Misc");
    let folders = svc.list_folders(&ctx()).await.expect("folders");
    assert_eq!(folders.items, vec!["Work", "Personal, Misc"]);
}

#[tokio::test]
async fn hierarchy_is_rebuilt() {
    let mock = MockExecutor::replying(
        "{name:\"iCloud\", shared:false, noteCount:0, children:{{name:\"Work\", shared:true, noteCount:3, children:{}}}}\n",
    );
    let root = service(&mock)
        .get_folder_hierarchy(&ctx())
        .await
        .expect("hierarchy");
    assert_eq!(root.name, "iCloud");
    assert_eq!(root.children[0].name, "Work");
    assert!(root.children[0].shared);
    assert_eq!(root.total_notes(), 3);
}

#[tokio::test]
async fn attachments_are_listed() {
    let mock = MockExecutor::replying(
        "{id:\"a1\", name:\"x.png\", contents:\"file:///tmp/x%20y.png\"}\n",
    );
    let attachments = service(&mock)
        .get_note_attachments(&ctx(), "Trip")
        .await
        .expect("attachments");
    assert_eq!(attachments.len(), 1);
    assert_eq!(attachments[0].file_path, "/tmp/x y.png");
}

#[tokio::test]
async fn attachment_content_is_size_checked() {
    let mock = Arc::new(MockExecutor::default());
    let svc = service(&mock);
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(b"0123456789").expect("write");

    let bytes = svc
        .get_attachment_content(file.path(), None)
        .await
        .expect("read");
    assert_eq!(bytes, b"0123456789");

    let err = svc
        .get_attachment_content(file.path(), Some(4))
        .await
        .unwrap_err();
    match err {
        NotesError::AttachmentTooLarge { size, max, .. } => {
            assert_eq!(size, 10);
            assert_eq!(max, 4);
        }
        other => panic!("expected too large, got {other:?}"),
    }

    let err = svc
        .get_attachment_content(std::path::Path::new(""), None)
        .await
        .unwrap_err();
    assert!(matches!(err, NotesError::InvalidInput(_)));

    let missing = file.path().with_extension("missing");
    let err = svc.get_attachment_content(&missing, None).await.unwrap_err();
    assert!(matches!(err, NotesError::Io(_)));
    assert!(mock.scripts().is_empty());
}

#[tokio::test]
async fn exports() {
    let mock = MockExecutor::replying("<div><h1>Trip</h1></div><div>Pack <b>light</b></div>\n");
    mock.push_ok("Trip\nPack light\n");
    let svc = service(&mock);

    let markdown = svc.export_note_markdown(&ctx(), "Trip").await.expect("md");
    assert_eq!(markdown, "# Trip\nPack **light**");
    assert!(mock.last_script().contains("return body of note \"Trip\""));

    let text = svc.export_note_text(&ctx(), "Trip").await.expect("text");
    assert_eq!(text, "Trip\nPack light");
    assert!(mock.last_script().contains("return plaintext of note \"Trip\""));
}

#[tokio::test]
async fn call_dispatches_json_requests() {
    let mock = MockExecutor::replying("Work|||Home");
    let svc = service(&mock);

    let request: Request = serde_json::from_str(r#"{"operation":"list_folders"}"#).unwrap();
    let response = svc.call(&ctx(), request).await.expect("call");
    match &response {
        Response::Folders(listing) => assert_eq!(listing.items, vec!["Work", "Home"]),
        other => panic!("unexpected response {other:?}"),
    }
    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["kind"], "folders");
    assert_eq!(json["value"]["total"], 2);

    let request: Request =
        serde_json::from_str(r#"{"operation":"move_note","title":"Plan","folder":"Archive"}"#)
            .unwrap();
    assert_eq!(request.operation(), "move_note");
    let response = svc.call(&ctx(), request).await.expect("call");
    assert_eq!(response, Response::Done);
}

#[test]
fn invalid_scope_in_requests_is_rejected() {
    let err = SearchOptions::new("q", "invalid").unwrap_err();
    assert!(matches!(err, NotesError::InvalidInput(_)));

    let parsed = serde_json::from_str::<Request>(
        r#"{"operation":"search_notes_advanced","options":{"query":"q","scope":"invalid"}}"#,
    );
    assert!(parsed.is_err());
}

#[test]
fn byte_responses_travel_as_base64() {
    let response = Response::Bytes(b"hi".to_vec());
    let json = serde_json::to_string(&response).unwrap();
    assert_eq!(json, r#"{"kind":"bytes","value":"aGk="}"#);
    let back: Response = serde_json::from_str(&json).unwrap();
    assert_eq!(back, response);
}

#[tokio::test]
async fn caller_cancellation_maps_to_timeout() {
    let mock = MockExecutor::failing("", ExecutionError::Cancelled);
    let ctx = CallContext::new().with_timeout(Duration::from_secs(1));
    let err = service(&mock).delete_note(&ctx, "Plan").await.unwrap_err();
    assert!(matches!(err, NotesError::ScriptTimeout));
}
