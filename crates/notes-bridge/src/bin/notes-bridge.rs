use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Parser, Subcommand};
use notes_bridge::{
    BridgeConfig, CallContext, FolderNode, Listing, Note, NotesError, NotesService, Request,
    Response, SearchOptions,
};

#[derive(Parser)]
#[command(name = "notes-bridge", about = "Drive Apple Notes from the command line", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Notes account to operate on
    #[arg(long, global = true)]
    account: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Create a note
    Create {
        title: String,
        #[arg(default_value = "")]
        content: String,
        /// Tags (comma-separated), echoed back only
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
    },
    /// Search note titles
    Search { query: String },
    /// Search titles and/or bodies with folder and date filters
    SearchAdvanced {
        query: String,
        /// title, body or both
        #[arg(long, default_value = "title")]
        search_in: String,
        #[arg(long)]
        folder: Option<String>,
        /// Modified on or after (YYYY-MM-DD)
        #[arg(long, value_parser = parse_day)]
        date_from: Option<NaiveDate>,
        /// Modified on or before (YYYY-MM-DD, whole day)
        #[arg(long, value_parser = parse_day)]
        date_to: Option<NaiveDate>,
    },
    /// Print a note's HTML body
    Get { title: String },
    /// Print a note's metadata as JSON
    Metadata { title: String },
    /// Replace a note's body
    Update { title: String, content: String },
    /// Delete a note
    Delete { title: String },
    /// List folders
    Folders,
    /// List the most recent notes
    Recent {
        #[arg(long, short, default_value = "0")]
        limit: usize,
    },
    /// List notes in a folder
    FolderNotes { folder: String },
    /// Create a folder
    CreateFolder {
        name: String,
        #[arg(long)]
        parent: Option<String>,
    },
    /// Move a note into a folder
    Move { title: String, folder: String },
    /// Print the folder tree
    Hierarchy,
    /// List a note's attachments
    Attachments { title: String },
    /// Read an attachment file; base64 to stdout unless --output is given
    GetAttachment {
        path: PathBuf,
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Maximum size in bytes
        #[arg(long)]
        max_size: Option<u64>,
    },
    /// Print a note as Markdown
    ExportMarkdown { title: String },
    /// Print a note as plain text
    ExportText { title: String },
    /// Read one JSON request from stdin and print the JSON response
    Call,
}

fn parse_day(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("invalid date {value:?}, expected YYYY-MM-DD"))
}

fn start_of(day: NaiveDate) -> NaiveDateTime {
    day.and_time(chrono::NaiveTime::MIN)
}

fn end_of(day: NaiveDate) -> Option<NaiveDateTime> {
    day.and_hms_opt(23, 59, 59)
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), NotesError> {
    let mut config = BridgeConfig::resolve(cli.config.as_deref())?;
    if let Some(account) = cli.account {
        config.account = account;
    }
    let service = NotesService::new(config);

    let ctx = CallContext::new();
    let cancel = ctx.cancel_token().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let (request, output) = match cli.command {
        Command::Call => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            let request: Request = serde_json::from_str(&raw)
                .map_err(|err| NotesError::invalid_input(format!("invalid request: {err}")))?;
            let response = service.call(&ctx, request).await?;
            let json = serde_json::to_string_pretty(&response)
                .map_err(|err| NotesError::invalid_input(format!("unencodable response: {err}")))?;
            println!("{json}");
            return Ok(());
        }
        Command::GetAttachment {
            path,
            output,
            max_size,
        } => (
            Request::GetAttachmentContent {
                path,
                max_bytes: max_size,
            },
            output,
        ),
        command => (to_request(command)?, None),
    };

    let operation = request.operation();
    let title = request_title(&request);
    let response = service.call(&ctx, request).await?;
    print_response(operation, title.as_deref(), response, output)
}

fn to_request(command: Command) -> Result<Request, NotesError> {
    let request = match command {
        Command::Create {
            title,
            content,
            tags,
        } => Request::CreateNote {
            title,
            content,
            tags,
        },
        Command::Search { query } => Request::SearchNotes { query },
        Command::SearchAdvanced {
            query,
            search_in,
            folder,
            date_from,
            date_to,
        } => {
            let options = SearchOptions::new(query, &search_in)?
                .in_folder(folder.unwrap_or_default())
                .modified_between(date_from.map(start_of), date_to.and_then(end_of));
            Request::SearchNotesAdvanced { options }
        }
        Command::Get { title } => Request::GetNoteContent { title },
        Command::Metadata { title } => Request::GetNoteMetadata { title },
        Command::Update { title, content } => Request::UpdateNote { title, content },
        Command::Delete { title } => Request::DeleteNote { title },
        Command::Folders => Request::ListFolders,
        Command::Recent { limit } => Request::GetRecentNotes { limit },
        Command::FolderNotes { folder } => Request::GetNotesInFolder { folder },
        Command::CreateFolder { name, parent } => Request::CreateFolder { name, parent },
        Command::Move { title, folder } => Request::MoveNote { title, folder },
        Command::Hierarchy => Request::GetFolderHierarchy,
        Command::Attachments { title } => Request::GetNoteAttachments { title },
        Command::ExportMarkdown { title } => Request::ExportNoteMarkdown { title },
        Command::ExportText { title } => Request::ExportNoteText { title },
        Command::GetAttachment { .. } | Command::Call => {
            return Err(NotesError::invalid_input("command is handled separately"))
        }
    };
    Ok(request)
}

fn request_title(request: &Request) -> Option<String> {
    match request {
        Request::UpdateNote { title, .. }
        | Request::DeleteNote { title }
        | Request::MoveNote { title, .. } => Some(title.clone()),
        Request::CreateFolder { name, .. } => Some(name.clone()),
        _ => None,
    }
}

fn print_response(
    operation: &str,
    subject: Option<&str>,
    response: Response,
    output: Option<PathBuf>,
) -> Result<(), NotesError> {
    match response {
        Response::Done => {
            let subject = subject.unwrap_or_default();
            match operation {
                "update_note" => println!("Note updated: {subject}"),
                "delete_note" => println!("Note deleted: {subject}"),
                "move_note" => println!("Note moved: {subject}"),
                "create_folder" => println!("Folder created: {subject}"),
                _ => println!("Done"),
            }
        }
        Response::Note(note) if operation == "create_note" => match &note.id {
            Some(id) => println!("Note created: {} ({id})", note.title),
            None => println!("Note created: {}", note.title),
        },
        Response::Note(note) => {
            let json = serde_json::to_string_pretty(&note)
                .map_err(|err| NotesError::invalid_input(format!("unencodable note: {err}")))?;
            println!("{json}");
        }
        Response::Notes(listing) => print_notes(&listing),
        Response::Folders(listing) => {
            for name in &listing.items {
                println!("{name}");
            }
            if let Some(notice) = listing.notice("folders") {
                eprintln!("({notice})");
            }
        }
        Response::Text(text) => println!("{text}"),
        Response::Hierarchy(root) => print_tree(&root, 0),
        Response::Attachments(attachments) => {
            if attachments.is_empty() {
                println!("No attachments");
            }
            for attachment in attachments {
                println!("{}\t{}", attachment.name, attachment.file_path);
            }
        }
        Response::Bytes(bytes) => match output {
            Some(path) => {
                std::fs::write(&path, &bytes)?;
                println!("Wrote {} bytes to {}", bytes.len(), path.display());
            }
            None => println!("{}", STANDARD.encode(&bytes)),
        },
    }
    Ok(())
}

fn print_notes(listing: &Listing<Note>) {
    if listing.is_empty() {
        println!("No notes found");
        return;
    }
    for note in &listing.items {
        println!("{}", note.title);
    }
    if let Some(notice) = listing.notice("notes") {
        eprintln!("({notice})");
    }
}

fn print_tree(node: &FolderNode, depth: usize) {
    let shared = if node.shared { " [shared]" } else { "" };
    println!(
        "{}{} ({} notes){shared}",
        "  ".repeat(depth),
        node.name,
        node.note_count
    );
    for child in &node.children {
        print_tree(child, depth + 1);
    }
}
