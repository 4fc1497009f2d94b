#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]
//! ** Tessera Inspect **
//! Prints conversation, event and lock save documents for content authors.

use tessera_engine::conversation::{ConversationEntry, EntryKind, INITIATING_THING_ID};
use tessera_engine::data_paths::data_path;
use tessera_engine::save_files::{self, DocumentKind, SaveDocument, SaveFileEntry, SaveFileStatus};
use tessera_engine::{TESSERA_VERSION, load_conversation, load_event, load_lock};

use anyhow::{Result, bail};
use clap::Parser;
use colored::Colorize;
use log::info;
use tessera_data::validate_records;

use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about = "Inspect Tessera conversation, event and lock documents.")]
struct Cli {
    /// Save document to print. Relative paths that do not exist are looked up in the data directory.
    file: Option<PathBuf>,
    /// Only report structural problems in the document's records.
    #[arg(long)]
    validate: bool,
    /// List save slots instead of printing a document.
    #[arg(long)]
    list: bool,
    /// Restrict the listing to one project's save folder.
    #[arg(long, value_name = "NAME")]
    project: Option<String>,
    /// Save directory to list from.
    #[arg(long, value_name = "DIR")]
    dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    if let Some(dir) = cli.dir {
        save_files::set_active_save_dir(dir);
    }

    if cli.list {
        return list_slots(cli.project.as_deref());
    }
    let Some(file) = cli.file else {
        bail!("nothing to inspect: pass a save document or --list");
    };

    let path = resolve_path(&file);
    info!("Inspecting {}", path.display());
    let document = save_files::load_save_document(&path)?;
    if document.version != TESSERA_VERSION {
        println!(
            "{}",
            format!("document was saved by version {} (running {TESSERA_VERSION})", document.version).yellow()
        );
    }

    if cli.validate {
        report_validation(&document);
        return Ok(());
    }
    print_document(document)
}

fn resolve_path(file: &Path) -> PathBuf {
    if file.is_absolute() || file.exists() {
        file.to_path_buf()
    } else {
        data_path(file)
    }
}

fn report_validation(document: &SaveDocument) {
    let problems = validate_records(&document.records);
    if problems.is_empty() {
        println!("{} records, {}", document.records.len(), "no problems found".green());
        return;
    }
    for problem in &problems {
        println!("{} {problem}", "warning:".yellow().bold());
    }
    println!("{} problems in {} records", problems.len(), document.records.len());
}

fn print_document(document: SaveDocument) -> Result<()> {
    match document.kind {
        DocumentKind::Conversation => {
            let (conversation, report) = load_conversation(document.records)?;
            println!("{}", "Conversation".bright_yellow().underline());
            for (index, entry) in conversation.entries() {
                let indent = "  ".repeat(index.group_count() - 1);
                println!("{indent}{} {}", index.to_string().bright_blue(), describe_entry(entry));
            }
            if report.skipped > 0 {
                println!("{}", format!("{} records could not be loaded", report.skipped).red());
            }
        },
        DocumentKind::Event => {
            let (event, _) = load_event(document.records)?;
            println!("{}", format!("{:?} event", event.event_type()).bright_yellow().underline());
            println!("{event:#?}");
        },
        DocumentKind::Lock => {
            let (lock, _) = load_lock(document.records)?;
            println!("{}", format!("{:?} lock", lock.lock_type()).bright_yellow().underline());
            println!("{lock:#?}");
        },
    }
    Ok(())
}

fn describe_entry(entry: &ConversationEntry) -> String {
    match &entry.kind {
        EntryKind::None => "(empty)".dimmed().to_string(),
        EntryKind::Text(text) => {
            let mut line = format!("\"{}\"", text.message);
            if text.speaker_id != INITIATING_THING_ID {
                line.push_str(&format!(" [thing {}]", text.speaker_id).cyan().to_string());
            }
            if text.delay_ms > 0 {
                line.push_str(&format!(" ({}ms)", text.delay_ms).dimmed().to_string());
            }
            if !text.event.is_none() {
                line.push_str(&format!(" -> {:?}", text.event.event_type()).magenta().to_string());
            }
            line
        },
    }
}

fn list_slots(project: Option<&str>) -> Result<()> {
    let entries = match project {
        Some(name) => save_files::build_save_entries(&save_files::save_dir_for_slug(name))?,
        None => save_files::build_save_entries_recursive(&save_files::active_save_dir())?,
    };
    if entries.is_empty() {
        println!("{}", "no saved documents found".dimmed());
        return Ok(());
    }
    for entry in &entries {
        println!("{}", describe_slot(entry));
    }
    Ok(())
}

fn describe_slot(entry: &SaveFileEntry) -> String {
    let modified = entry.modified.map(save_files::format_modified).unwrap_or_default();
    let contents = entry
        .summary
        .map(|summary| format!("{:?}, {} records", summary.kind, summary.record_count))
        .unwrap_or_default();
    let status = match &entry.status {
        SaveFileStatus::Ready => "ready".green(),
        SaveFileStatus::VersionMismatch { save_version, .. } => format!("saved by {save_version}").yellow(),
        SaveFileStatus::Corrupted { message } => message.as_str().red(),
    };
    format!(
        "{:<24} {:<10} {:<28} {:<10} {status}",
        entry.slot.bold(),
        entry.version,
        contents,
        modified
    )
}
