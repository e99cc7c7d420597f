//! Command-line front end for the memory panel.
//!
//! # Responsibility
//! - Drive `MemoryController` over the local SQLite store from a terminal.
//! - Keep output line-oriented and deterministic for scripting.
//!
//! # Invariants
//! - Every subcommand goes through the same controller operations as the
//!   Flutter panel; nothing talks to the store directly.
//! - A failed command exits non-zero with the reason on stderr.

use clap::{Parser, Subcommand};
use log::info;
use memdesk_core::{
    default_log_level, init_logging, resolve_db_path, BatchDeleteReport, MemoryController,
    QueryResolution, SqliteMemoryGateway,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "memdesk", version, about = "Browse and edit stored agent memories")]
struct Args {
    /// Database file; defaults to `MEMDESK_DB_PATH` or the temp directory.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Write rolling logs into this directory.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,
    /// Defaults to `debug` in debug builds and `info` in release builds.
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List memories, newest first.
    List {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Print the categories of all stored memories.
    Categories,
    /// Store a new memory.
    Add {
        key: String,
        content: String,
        #[arg(long, default_value = "")]
        category: String,
    },
    /// Delete one or more memories by key; stops at the first failure.
    Rm {
        #[arg(required = true)]
        keys: Vec<String>,
    },
}

type Controller = MemoryController<SqliteMemoryGateway>;

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), String> {
    if let Some(log_dir) = &args.log_dir {
        let level = args.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, &log_dir.to_string_lossy())?;
    }

    let db_path = args.db.clone().unwrap_or_else(resolve_db_path);
    let gateway = SqliteMemoryGateway::open(&db_path)
        .map_err(|err| format!("cannot open {}: {err}", db_path.display()))?;
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        db_path.display()
    );
    let mut controller = MemoryController::new(Arc::new(gateway));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|err| format!("runtime init failed: {err}"))?;
    runtime.block_on(execute(&mut controller, args.command))
}

async fn execute(controller: &mut Controller, command: Command) -> Result<(), String> {
    match command {
        Command::List { search, category } => {
            controller.set_search_text(search);
            controller.set_category_filter(category);
            expect_loaded(controller.commit_filters().await)?;
            for row in controller.snapshot().rows {
                println!(
                    "{}\t{}\t{}\t{}",
                    row.key, row.category, row.timestamp, row.preview
                );
            }
            Ok(())
        }
        Command::Categories => {
            expect_loaded(controller.start().await)?;
            for category in controller.categories() {
                println!("{category}");
            }
            Ok(())
        }
        Command::Add {
            key,
            content,
            category,
        } => {
            controller.open_create_form();
            controller.set_draft_key(key);
            controller.set_draft_content(content);
            controller.set_draft_category(category);
            let entry = controller
                .submit_create()
                .await
                .map_err(|err| err.to_string())?;
            println!("created {} ({})", entry.key, entry.category);
            Ok(())
        }
        Command::Rm { keys } => remove(controller, keys).await,
    }
}

async fn remove(controller: &mut Controller, keys: Vec<String>) -> Result<(), String> {
    expect_loaded(controller.start().await)?;
    if let Some(missing) = keys
        .iter()
        .find(|key| !controller.entries().contains_key(key.as_str()))
    {
        return Err(format!("memory `{missing}` not found"));
    }

    if let [key] = keys.as_slice() {
        controller.request_delete(key);
        controller
            .confirm_delete(key)
            .await
            .map_err(|err| err.to_string())?;
        println!("deleted {key}");
        return Ok(());
    }

    for key in &keys {
        if !controller.selection().contains(key) {
            controller.toggle_selection(key);
        }
    }
    controller.request_batch_delete();
    let report = controller
        .confirm_batch_delete()
        .await
        .map_err(|err| err.to_string())?;
    print_batch(&report)
}

fn print_batch(report: &BatchDeleteReport) -> Result<(), String> {
    for key in &report.completed {
        println!("deleted {key}");
    }
    match &report.failed_at {
        None => Ok(()),
        Some(err) => Err(format!("batch delete stopped: {err}")),
    }
}

fn expect_loaded(resolution: QueryResolution) -> Result<(), String> {
    match resolution {
        QueryResolution::Applied | QueryResolution::Stale => Ok(()),
        QueryResolution::Failed(message) => Err(message),
    }
}

