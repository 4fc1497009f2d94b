//! Save document discovery and serialization helpers.
//!
//! A save document is a version-stamped record stream for one conversation,
//! event or lock, written as RON. Documents live in slot files named
//! `<slot>-tessera-<version>.ron`, grouped per project under [`SAVE_DIR`].

use crate::TESSERA_VERSION;
use crate::conversation::Conversation;
use crate::event::Event;
use crate::lock::Lock;
use crate::loader::{conversation_records, event_records, lock_records};
use crate::slug::sanitize_slug;
use anyhow::{Context, Result};
use log::{info, warn};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, RwLock};
use std::time::{Duration, SystemTime};
use tessera_data::Record;

pub const SAVE_DIR: &str = "saved_conversations";
const SLOT_TAG: &str = "-tessera-";

static ACTIVE_SAVE_DIR: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| RwLock::new(PathBuf::from(SAVE_DIR)));

/// What a save document's records describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Conversation,
    Event,
    Lock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveDocument {
    pub version: String,
    pub kind: DocumentKind,
    pub records: Vec<Record>,
}

impl SaveDocument {
    /// Wrap `records` in a document stamped with the running engine version.
    pub fn new(kind: DocumentKind, records: Vec<Record>) -> Self {
        Self {
            version: TESSERA_VERSION.to_string(),
            kind,
            records,
        }
    }

    /// # Errors
    /// Fails if a nested event cannot be written.
    pub fn from_conversation(conversation: &Conversation) -> Result<Self> {
        Ok(Self::new(DocumentKind::Conversation, conversation_records(conversation)?))
    }

    /// # Errors
    /// Fails if the event or one of its nested events cannot be written.
    pub fn from_event(event: &Event) -> Result<Self> {
        Ok(Self::new(DocumentKind::Event, event_records(event)?))
    }

    /// # Errors
    /// Fails if the lock type has no persisted name.
    pub fn from_lock(lock: &Lock) -> Result<Self> {
        Ok(Self::new(DocumentKind::Lock, lock_records(lock)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSlot {
    pub slot: String,
    pub version: String,
    pub path: PathBuf,
    pub file_name: String,
    pub modified: Option<SystemTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveSummary {
    pub kind: DocumentKind,
    pub record_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFileStatus {
    Ready,
    VersionMismatch { save_version: String, current_version: String },
    Corrupted { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveFileEntry {
    pub slot: String,
    pub version: String,
    pub path: PathBuf,
    pub file_name: String,
    pub modified: Option<SystemTime>,
    pub summary: Option<SaveSummary>,
    pub status: SaveFileStatus,
}

/// Return the active save directory used for listing and writing documents.
pub fn active_save_dir() -> PathBuf {
    ACTIVE_SAVE_DIR
        .read()
        .map(|guard| guard.clone())
        .unwrap_or_else(|_| PathBuf::from(SAVE_DIR))
}

/// Set the active save directory.
pub fn set_active_save_dir(path: PathBuf) {
    if let Ok(mut guard) = ACTIVE_SAVE_DIR.write() {
        *guard = path;
    }
}

/// Compute a project-specific save directory under the active save directory.
pub fn save_dir_for_slug(raw: &str) -> PathBuf {
    active_save_dir().join(sanitize_slug(raw))
}

/// File name for `slot` at `version`.
pub fn slot_file_name(slot: &str, version: &str) -> String {
    format!("{}{SLOT_TAG}{version}.ron", sanitize_slug(slot))
}

/// Write `document` into `dir` as slot `slot`, creating the directory if needed.
///
/// # Errors
/// Returns an error if the directory cannot be created, the document cannot be
/// serialized, or the file cannot be written.
pub fn write_save_document(dir: &Path, slot: &str, document: &SaveDocument) -> Result<PathBuf> {
    fs::create_dir_all(dir).with_context(|| format!("creating save directory {}", dir.display()))?;
    let path = dir.join(slot_file_name(slot, &document.version));
    let raw = ron::ser::to_string_pretty(document, PrettyConfig::default())
        .with_context(|| format!("serializing {:?} document", document.kind))?;
    fs::write(&path, raw).with_context(|| format!("writing save file {}", path.display()))?;
    info!(
        "saved {:?} document with {} records to {}",
        document.kind,
        document.records.len(),
        path.display()
    );
    Ok(path)
}

/// Load a save document from disk.
///
/// # Errors
/// Returns an error if the file cannot be read or deserialized.
pub fn load_save_document(path: &Path) -> Result<SaveDocument> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading save file {}", path.display()))?;
    ron::from_str::<SaveDocument>(&raw).with_context(|| format!("parsing save file {}", path.display()))
}

/// Discover save slot files stored in `dir`.
///
/// # Errors
/// Returns an error if the directory contents cannot be read or enumerated.
pub fn collect_save_slots(dir: &Path) -> Result<Vec<SaveSlot>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut slots = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry.with_context(|| format!("enumerating {}", dir.display()))?;
        if let Some(slot) = slot_from_entry(&entry) {
            slots.push(slot);
        }
    }
    slots.sort_by(|a, b| a.slot.cmp(&b.slot).then(a.version.cmp(&b.version)));
    Ok(slots)
}

/// Discover save slots across a root directory and its per-project subdirectories.
///
/// # Errors
/// Returns an error if a directory cannot be read or enumerated.
pub fn collect_save_slots_recursive(root: &Path) -> Result<Vec<SaveSlot>> {
    if !root.exists() {
        return Ok(Vec::new());
    }

    let mut slots = Vec::new();
    for entry in fs::read_dir(root).with_context(|| format!("reading {}", root.display()))? {
        let entry = entry.with_context(|| format!("enumerating {}", root.display()))?;
        let path = entry.path();
        if path.is_dir() {
            slots.extend(collect_save_slots(&path)?);
        } else if let Some(slot) = slot_from_entry(&entry) {
            slots.push(slot);
        }
    }

    slots.sort_by(|a, b| a.slot.cmp(&b.slot).then(a.version.cmp(&b.version)));
    Ok(slots)
}

/// Build descriptive entries for save files located in `dir`, newest first.
///
/// # Errors
/// Returns an error if reading the directory fails.
pub fn build_save_entries(dir: &Path) -> Result<Vec<SaveFileEntry>> {
    Ok(sorted_entries(collect_save_slots(dir)?))
}

/// Build descriptive entries for save files in a root directory and its subfolders.
///
/// # Errors
/// Returns an error if reading a directory fails.
pub fn build_save_entries_recursive(root: &Path) -> Result<Vec<SaveFileEntry>> {
    Ok(sorted_entries(collect_save_slots_recursive(root)?))
}

/// Format a human-friendly modified time relative to now.
pub fn format_modified(modified: SystemTime) -> String {
    match SystemTime::now().duration_since(modified) {
        Ok(delta) => format_duration(delta),
        Err(_) => "in the future".to_string(),
    }
}

fn sorted_entries(slots: Vec<SaveSlot>) -> Vec<SaveFileEntry> {
    let mut entries: Vec<_> = slots.into_iter().map(entry_for_slot).collect();
    entries.sort_by(|a, b| b.modified.cmp(&a.modified).then(a.slot.cmp(&b.slot)));
    entries
}

/// Build a full [`SaveFileEntry`] from a discovered save slot.
fn entry_for_slot(slot: SaveSlot) -> SaveFileEntry {
    let mut version = slot.version.clone();
    let (summary, status) = match load_save_document(&slot.path) {
        Ok(document) => {
            version.clone_from(&document.version);
            let status = if document.version == TESSERA_VERSION {
                SaveFileStatus::Ready
            } else {
                SaveFileStatus::VersionMismatch {
                    save_version: document.version.clone(),
                    current_version: TESSERA_VERSION.to_string(),
                }
            };
            let summary = SaveSummary {
                kind: document.kind,
                record_count: document.records.len(),
            };
            (Some(summary), status)
        },
        Err(err) => {
            warn!("failed to load save '{}' ({}): {err:#}", slot.slot, slot.path.display());
            (
                None,
                SaveFileStatus::Corrupted {
                    message: trim_error(&format!("{err:#}")),
                },
            )
        },
    };

    SaveFileEntry {
        slot: slot.slot,
        version,
        path: slot.path,
        file_name: slot.file_name,
        modified: slot.modified,
        summary,
        status,
    }
}

fn slot_from_entry(entry: &fs::DirEntry) -> Option<SaveSlot> {
    let path = entry.path();
    if !path.is_file() {
        return None;
    }
    if path.extension().and_then(|ext| ext.to_str()) != Some("ron") {
        return None;
    }
    let file_name = path.file_name().and_then(|name| name.to_str())?.to_string();
    let stem = path.file_stem().and_then(|stem| stem.to_str())?;
    let (slot, version) = stem.rsplit_once(SLOT_TAG)?;
    if slot.is_empty() {
        return None;
    }
    let modified = entry.metadata().ok().and_then(|meta| meta.modified().ok());
    Some(SaveSlot {
        slot: slot.to_string(),
        version: version.to_string(),
        path,
        file_name,
        modified,
    })
}

/// Convert a duration into a compact "time ago" string.
fn format_duration(duration: Duration) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = MINUTE * 60;
    const DAY: u64 = HOUR * 24;
    const WEEK: u64 = DAY * 7;

    let secs = duration.as_secs();
    if secs < 30 {
        "just now".to_string()
    } else if secs < MINUTE {
        format!("{secs}s ago")
    } else if secs < HOUR {
        format!("{}m ago", secs / MINUTE)
    } else if secs < DAY {
        format!("{}h ago", secs / HOUR)
    } else if secs < WEEK {
        format!("{}d ago", secs / DAY)
    } else {
        format!("{}w ago", secs / WEEK)
    }
}

/// Clamp verbose error messages to a readable length.
fn trim_error(message: &str) -> String {
    if message.chars().count() <= 120 {
        return message.to_string();
    }
    let mut trimmed: String = message.chars().take(117).collect();
    trimmed.push_str("...");
    trimmed
}
