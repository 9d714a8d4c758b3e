//! Terminal front-end for the note store.
//!
//! # Responsibility
//! - Parse commands and drive `NoteStore` operations.
//! - Render the derived view as text or JSON.
//!
//! Credentials come from `NOTEBOARD_BASE_URL` / `NOTEBOARD_API_KEY`.

use clap::{Parser, Subcommand};
use log::info;
use noteboard_core::{
    default_log_level, init_logging, ClientConfig, ConfigError, LoggingError, Note, NoteStore,
    RestNotesClient, SortMode, StoreError,
};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "noteboard", version, about = "Browse and edit notes in a REST data store")]
#[command(after_help = concat!(
    "Environment:\n",
    "  NOTEBOARD_BASE_URL       REST root, e.g. https://<project>.supabase.co/rest/v1\n",
    "  NOTEBOARD_API_KEY        Static API key\n",
    "  NOTEBOARD_TIMEOUT_SECS   Optional request timeout\n",
    "  NOTEBOARD_LOG_DIR        Enables rolling file logs",
))]
struct Cli {
    /// Directory for rolling log files; logging is off when unset.
    #[arg(long, global = true, env = "NOTEBOARD_LOG_DIR")]
    log_dir: Option<PathBuf>,
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Print notes as JSON.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List notes, optionally filtered by title.
    List {
        #[arg(long)]
        search: Option<String>,
        /// `created` (newest first) or `title` (A-Z).
        #[arg(long, default_value_t = SortMode::ByCreationDescending)]
        sort: SortMode,
    },
    /// Create a note.
    Add { title: String },
    /// Change the title of a note.
    Rename { id: String, title: String },
    /// Delete a note.
    Rm { id: String },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("note not found: {0}")]
    NoteNotFound(String),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("failed to resolve log directory: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("noteboard: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    if let Some(dir) = &cli.log_dir {
        let dir = if dir.is_absolute() {
            dir.clone()
        } else {
            std::env::current_dir()?.join(dir)
        };
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &dir)?;
    }

    let config = ClientConfig::from_env()?;
    let mut store = NoteStore::new(RestNotesClient::new(&config)?);
    let json = cli.json;

    match cli.command {
        Command::List { search, sort } => {
            info!("event=cli_list module=cli status=start sort={}", sort);
            store.refresh().await?;
            store.set_sort_mode(sort);
            if let Some(search) = search {
                store.set_search_text(search);
            }
            let view = store.visible_notes();
            if view.is_empty() && !json {
                if store.state().search_text.is_empty() {
                    println!("No notes yet. Create one with `noteboard add <TITLE>`.");
                } else {
                    println!("No notes match `{}`.", store.state().search_text);
                }
                return Ok(());
            }
            print_notes(&view, json)?;
        }
        Command::Add { title } => {
            info!("event=cli_add module=cli status=start");
            store.begin_create();
            let created = store.create_note(&title).await?;
            print_notes(std::slice::from_ref(&created), json)?;
        }
        Command::Rename { id, title } => {
            info!("event=cli_rename module=cli status=start id={}", id);
            store.refresh().await?;
            let existing = store
                .notes()
                .iter()
                .find(|note| note.id == id)
                .cloned()
                .ok_or_else(|| CliError::NoteNotFound(id.clone()))?;
            store.select_note_for_edit(&existing);
            let updated = store.rename_note(&existing, &title).await?;
            print_notes(std::slice::from_ref(&updated), json)?;
        }
        Command::Rm { id } => {
            info!("event=cli_rm module=cli status=start id={}", id);
            store.remove_note_by_id(&id).await?;
            if json {
                println!("{}", serde_json::json!({ "deleted": id }));
            } else {
                println!("Deleted {id}");
            }
        }
    }
    Ok(())
}

fn print_notes(notes: &[Note], json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(notes)?);
        return Ok(());
    }
    for note in notes {
        println!("{}\t{}\t{}", note.id, note.created_at, note.title);
    }
    Ok(())
}
