//! Command-line front end for the notes core.
//!
//! # Responsibility
//! - Drive `NoteBoard` and the import/export bridge against the SQLite store.
//! - Keep output plain and line-oriented for scripting.

use clap::{Parser, Subcommand};
use log::error;
use notecase_core::db::open_db;
use notecase_core::{
    core_version, encode_image_data_url, guess_image_mime, import_file, init_logging_from_config,
    write_export, AppConfig, NoteBoard, Persistence, RecordId, SqliteKvStore,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "notecase", version, about = "Categorized notes kept in a local store")]
struct Cli {
    /// Overrides NOTECASE_DATA_DIR.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Board(BoardCommand),
    Version,
}

/// Commands that open the notes store.
#[derive(Debug, Subcommand)]
enum BoardCommand {
    /// Lists categories, marking the selected one.
    Categories,
    /// Lists notes of the selected category, or of `--category` without
    /// changing the selection.
    Notes {
        #[arg(long)]
        category: Option<String>,
    },
    /// Selects the category used for listing and new notes.
    Select { id: String },
    AddCategory { name: String },
    /// Creates a note in the selected category.
    AddNote {
        title: String,
        content: String,
        #[arg(long)]
        image: Option<PathBuf>,
    },
    DeleteNote { id: String },
    /// Deletes a category that holds no notes.
    DeleteCategory { id: String },
    /// Writes a dated backup document.
    Export {
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Restores a backup document.
    Import { file: PathBuf },
    /// Removes all stored notes data.
    Clear,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Command::Version => {
            println!("notecase_core version={}", core_version());
            Ok(())
        }
        Command::Board(command) => run_board(cli.data_dir, command).await,
    }
}

async fn run_board(data_dir: Option<PathBuf>, command: BoardCommand) -> Result<(), String> {
    let config = match data_dir {
        Some(dir) if dir.is_relative() => {
            let cwd = std::env::current_dir().map_err(|err| err.to_string())?;
            AppConfig::with_data_dir(cwd.join(dir))
        }
        Some(dir) => AppConfig::with_data_dir(dir),
        None => AppConfig::from_env().map_err(|err| err.to_string())?,
    };
    config.ensure_dirs().map_err(|err| err.to_string())?;
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("warning: logging disabled: {err}");
    }

    let conn = open_db(config.database_path()).map_err(|err| err.to_string())?;
    let store = SqliteKvStore::try_new(&conn)
        .map_err(|err| err.to_string())?
        .with_quota(config.storage_quota_bytes);
    let mut board = NoteBoard::open(Persistence::new(store));

    match command {
        BoardCommand::Categories => {
            for category in board.categories() {
                let marker = if board.selected_category() == Some(&category.id) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {}\t{}", category.id, category.name);
            }
        }
        BoardCommand::Notes { category } => {
            let category_id = match category {
                Some(id) => Some(parse_id(&id)?),
                None => board.selected_category().cloned(),
            };
            let listed = board
                .notes()
                .iter()
                .filter(|note| Some(&note.category_id) == category_id.as_ref());
            for note in listed {
                let image = if note.image.is_some() { " [image]" } else { "" };
                println!("{}\t{}{image}", note.id, note.title);
            }
        }
        BoardCommand::Select { id } => board.select_category(parse_id(&id)?),
        BoardCommand::AddCategory { name } => {
            let category = board
                .add_category(&name)
                .ok_or("category name cannot be blank")?;
            println!("{}", category.id);
        }
        BoardCommand::AddNote {
            title,
            content,
            image,
        } => {
            let image = match image {
                Some(path) => Some(load_image(&path)?),
                None => None,
            };
            let note = board
                .create_note(&title, &content, image)
                .ok_or("note title and content cannot be blank")?;
            println!("{}", note.id);
        }
        BoardCommand::DeleteNote { id } => {
            if !board.delete_note(&parse_id(&id)?) {
                return Err(format!("note not found: {id}"));
            }
        }
        BoardCommand::DeleteCategory { id } => {
            board
                .delete_category(&parse_id(&id)?)
                .map_err(|err| err.to_string())?;
        }
        BoardCommand::Export { dir } => {
            let dir = dir.unwrap_or_else(|| config.data_dir.clone());
            let path = write_export(board.persistence(), &dir).map_err(|err| err.to_string())?;
            println!("{}", path.display());
        }
        BoardCommand::Import { file } => {
            let document = import_file(board.persistence(), &file)
                .await
                .map_err(|err| {
                    error!(
                        "event=cli_import module=cli status=error error_code={}",
                        err.code()
                    );
                    err.to_string()
                })?;
            board.reload();
            println!(
                "imported {} categories, {} notes",
                document.categories.len(),
                document.notes.len()
            );
        }
        BoardCommand::Clear => {
            if !board.persistence().clear_all() {
                return Err("failed to clear stored data".to_string());
            }
        }
    }

    Ok(())
}

fn parse_id(value: &str) -> Result<RecordId, String> {
    RecordId::parse(value).ok_or_else(|| "id cannot be blank".to_string())
}

fn load_image(path: &Path) -> Result<String, String> {
    let mime = guess_image_mime(path)
        .ok_or_else(|| format!("unsupported image file `{}`", path.display()))?;
    let bytes = std::fs::read(path)
        .map_err(|err| format!("failed to read image `{}`: {err}", path.display()))?;
    encode_image_data_url(mime, &bytes).map_err(|err| err.to_string())
}
