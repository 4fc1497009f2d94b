//! Building conversations, events and locks from record streams.
//!
//! Loading is tolerant: a record that fails to load is logged and skipped so a
//! partly damaged save still yields everything that could be read. An unmapped
//! type string aborts the load instead, since it means the type tables and the
//! data disagree about which kinds exist.

use anyhow::{Result, bail};
use log::{debug, info, warn};
use tessera_data::{MemoryWriter, Record, RecordReader, validate_records};

use crate::conversation::Conversation;
use crate::event::Event;
use crate::lock::Lock;
use crate::persist::{self, PersistError};

/// Counts from one pass over a record stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// Build a conversation from `entry[id=...]` records.
///
/// # Errors
/// Fails only if a record names an event or lock type that has no mapping.
pub fn load_conversation(records: Vec<Record>) -> Result<(Conversation, LoadReport)> {
    let mut conversation = Conversation::new();
    let report = apply_records("conversation", records, |record| conversation.load(record, 0))?;
    info!(
        "conversation loaded with {} entries ({} records, {} skipped)",
        conversation.entries().len(),
        report.loaded,
        report.skipped
    );
    Ok((conversation, report))
}

/// Build an event from records whose first element is the event type.
///
/// # Errors
/// Fails if a record names an event type that has no mapping.
pub fn load_event(records: Vec<Record>) -> Result<(Event, LoadReport)> {
    let mut event = Event::default();
    let report = apply_records("event", records, |record| persist::load(&mut event, record, 0))?;
    info!("{:?} event loaded ({} records, {} skipped)", event.event_type(), report.loaded, report.skipped);
    Ok((event, report))
}

/// Build a lock from records whose first element is the lock type.
///
/// # Errors
/// Fails if a record names a lock type that has no mapping.
pub fn load_lock(records: Vec<Record>) -> Result<(Lock, LoadReport)> {
    let mut lock = Lock::default();
    let report = apply_records("lock", records, |record| persist::load(&mut lock, record, 0))?;
    info!("{:?} lock loaded ({} records, {} skipped)", lock.lock_type(), report.loaded, report.skipped);
    Ok((lock, report))
}

/// Flatten a conversation into records.
///
/// # Errors
/// Errors bubble up from nested event saving.
pub fn conversation_records(conversation: &Conversation) -> Result<Vec<Record>> {
    let mut writer = MemoryWriter::new();
    conversation.save(&mut writer)?;
    Ok(writer.into_records())
}

/// Flatten an event into records. An empty event produces none.
///
/// # Errors
/// Errors bubble up from type lookups and nested saving.
pub fn event_records(event: &Event) -> Result<Vec<Record>> {
    let mut writer = MemoryWriter::new();
    persist::save(event, &mut writer, false)?;
    Ok(writer.into_records())
}

/// Flatten a lock into records. An empty lock produces none.
///
/// # Errors
/// Errors bubble up from type lookups.
pub fn lock_records(lock: &Lock) -> Result<Vec<Record>> {
    let mut writer = MemoryWriter::new();
    persist::save(lock, &mut writer, false)?;
    Ok(writer.into_records())
}

/// Feed records to `apply` in order, logging structural problems first.
fn apply_records<F>(what: &str, records: Vec<Record>, mut apply: F) -> Result<LoadReport>
where
    F: FnMut(&Record) -> Result<(), PersistError>,
{
    for problem in validate_records(&records) {
        warn!("{what} data: {problem}");
    }

    let mut reader = RecordReader::new(records);
    debug!("loading {what} from {} records", reader.total_count());
    let mut report = LoadReport::default();
    while let Some(record) = reader.next_record() {
        match apply(&record) {
            Ok(()) => report.loaded += 1,
            Err(err @ PersistError::UnmappedType { .. }) => {
                bail!("while loading {what} record '{}': {err}", record.path_string());
            },
            Err(err) => {
                warn!("skipping {what} record '{}': {err}", record.path_string());
                report.skipped += 1;
            },
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{ConversationEntry, EntryIndex};
    use crate::event::{EventKind, EventType, MapSwitch};
    use tessera_data::Element;

    #[test]
    fn bad_records_are_skipped() {
        let records = vec![
            Record::new(vec![Element::keyed("entry", "id", "1.1"), Element::new("text")], "kept"),
            Record::new(vec![Element::keyed("entry", "id", "1.x"), Element::new("text")], "bad id"),
            Record::new(vec![Element::keyed("entry", "id", "1.2"), Element::new("delay")], "soon"),
            Record::new(vec![Element::keyed("entry", "id", "1.3000000"), Element::new("text")], "far away"),
        ];
        let (conversation, report) = load_conversation(records).unwrap();
        assert_eq!(report, LoadReport { loaded: 1, skipped: 3 });
        let first = conversation.entry(&EntryIndex::parse("1.1").unwrap()).unwrap();
        assert_eq!(first.as_text().unwrap().message, "kept");
        assert!(!conversation.has_entry(&EntryIndex::parse("1.2").unwrap()));
        assert_eq!(conversation.first_entry().child_count(), 1);
    }

    #[test]
    fn unmapped_type_aborts() {
        let records = vec![Record::new(vec![Element::new("fireworks"), Element::new("id")], 1)];
        let err = load_event(records).unwrap_err();
        assert!(err.to_string().contains("fireworks"));
    }

    #[test]
    fn records_round_trip() {
        let mut conversation = Conversation::new();
        let mut entry = ConversationEntry::text("Take this.");
        entry.as_text_mut().unwrap().event = Event::new(EventKind::MapSwitch(MapSwitch { map_id: 8 }));
        conversation.set_entry(&EntryIndex::root(), entry).unwrap();
        conversation
            .set_entry(&EntryIndex::parse("1.2").unwrap(), ConversationEntry::text("Or not."))
            .unwrap();

        let records = conversation_records(&conversation).unwrap();
        let (loaded, report) = load_conversation(records).unwrap();
        assert_eq!(report.skipped, 0);
        assert_eq!(loaded, conversation);

        let event = Event::of_type(EventType::Sound).unwrap();
        assert!(event_records(&event).unwrap().is_empty());
        assert!(lock_records(&Lock::default()).unwrap().is_empty());
    }
}
