use std::path::Path;

use anyhow::Result;
use tempfile::tempdir;
use tessera_data::{DataValue, Element, Record, RecordReader, validate_records};
use tessera_engine::conversation::{EntryKind, TextEntry};
use tessera_engine::event::{BattleStart, EventMultiple, ItemGive, Notification, Teleport};
use tessera_engine::lock::ItemLock;
use tessera_engine::loader::{conversation_records, event_records, lock_records};
use tessera_engine::save_files::{self, DocumentKind, SaveDocument};
use tessera_engine::{
    Conversation, EntryIndex, Event, EventKind, EventType, Lock, LockKind, LockType, PersistError, load_conversation,
    load_event, load_lock, persist,
};

fn record(path: &[&str], data: impl Into<DataValue>) -> Record {
    Record::new(path.iter().map(|name| Element::new(*name)).collect(), data)
}

fn guard_conversation() -> Conversation {
    let mut conversation = Conversation::new();
    let mut greeting = TextEntry::new("Halt!");
    greeting.speaker_id = 12;
    greeting.delay_ms = 500;
    conversation.set_entry(&EntryIndex::root(), greeting.into()).unwrap();

    let mut give = ItemGive::default();
    give.item_id = 40;
    give.count = 2;
    give.set_chance(75);
    let mut friend = TextEntry::new("A friend.");
    friend.event = Event::new(EventKind::ItemGive(give));
    friend.event.one_shot = true;
    conversation
        .set_entry(&EntryIndex::parse("1.1").unwrap(), friend.into())
        .unwrap();

    let battle = BattleStart {
        event_lose: Box::new(Event::new(EventKind::Notification(Notification {
            text: "Ouch.".into(),
        }))),
        game_over_on_loss: true,
        ..BattleStart::default()
    };
    let mut rude = TextEntry::new("Go away.");
    rude.event = Event::new(EventKind::BattleStart(battle));
    conversation
        .set_entry(&EntryIndex::parse("1.3.1").unwrap(), rude.into())
        .unwrap();
    conversation
}

#[test]
fn test_conversation_round_trip_through_records() -> Result<()> {
    let conversation = guard_conversation();
    let records = conversation_records(&conversation)?;
    assert!(validate_records(&records).is_empty());
    let (loaded, report) = load_conversation(records)?;
    assert_eq!(report.skipped, 0);
    assert_eq!(loaded, conversation);
    Ok(())
}

#[test]
fn test_conversation_round_trip_through_ron_file() -> Result<()> {
    let dir = tempdir()?;
    let document = SaveDocument::from_conversation(&guard_conversation())?;
    let path = save_files::write_save_document(dir.path(), "guard", &document)?;

    let reloaded = save_files::load_save_document(&path)?;
    assert_eq!(reloaded.kind, DocumentKind::Conversation);
    let (conversation, _) = load_conversation(reloaded.records)?;
    assert_eq!(conversation, guard_conversation());
    Ok(())
}

#[test]
fn test_conversation_event_nests_a_whole_tree() -> Result<()> {
    let event = Event::new(EventKind::Conversation(Box::new(guard_conversation())));
    let records = event_records(&event)?;
    assert!(records.iter().all(|rec| rec.element(0) == "conversation"));
    let (loaded, _) = load_event(records)?;
    assert_eq!(loaded, event);
    Ok(())
}

#[test]
fn test_multiple_event_round_trip_keeps_gaps() -> Result<()> {
    let mut multiple = EventMultiple::default();
    multiple.set_event(
        2,
        Event::new(EventKind::Teleport(Teleport {
            tile_x: 4,
            tile_y: 9,
            ..Teleport::default()
        })),
    );
    let event = Event::new(EventKind::Multiple(multiple));
    let (loaded, _) = load_event(event_records(&event)?)?;
    assert_eq!(loaded, event);
    let EventKind::Multiple(loaded) = &loaded.kind else {
        panic!("expected a multiple event");
    };
    assert_eq!(loaded.event_count(), 3);
    assert!(loaded.event(0).unwrap().is_none());
    Ok(())
}

#[test]
fn test_lock_round_trip_through_ron_file() -> Result<()> {
    let dir = tempdir()?;
    let mut lock = Lock::new(LockKind::Item(ItemLock {
        item_id: 7,
        count: 3,
        consume: false,
    }));
    lock.permanent = false;
    let path = save_files::write_save_document(dir.path(), "cellar door", &SaveDocument::from_lock(&lock)?)?;
    let (loaded, _) = load_lock(save_files::load_save_document(&path)?.records)?;
    assert_eq!(loaded, lock);
    assert_eq!(lock_records(&loaded)?.len(), 4);
    Ok(())
}

#[test]
fn test_dispatch_reuses_same_kind_and_replaces_other_kind() {
    let mut event = Event::of_type(EventType::ItemGive).unwrap();
    persist::load(&mut event, &record(&["giveitem", "id"], 5), 0).unwrap();
    persist::load(&mut event, &record(&["giveitem", "count"], 2), 0).unwrap();
    let EventKind::ItemGive(give) = &event.kind else {
        panic!("expected an item event");
    };
    // both fields landed on the same instance
    assert_eq!((give.item_id, give.count), (5, 2));

    persist::load(&mut event, &record(&["takeitem", "id"], 6), 0).unwrap();
    assert_eq!(event.event_type(), EventType::ItemTake);
    let EventKind::ItemTake(take) = &event.kind else {
        panic!("expected a take event");
    };
    assert_eq!(take.count, 0);

    let mut lock = Lock::default();
    persist::load(&mut lock, &record(&["trigger", "permanent"], false), 0).unwrap();
    assert_eq!(lock.lock_type(), LockType::Trigger);
    assert!(!lock.permanent);
}

#[test]
fn test_unknown_type_string_fails() {
    let mut event = Event::default();
    let err = persist::load(&mut event, &record(&["warp", "id"], 1), 0).unwrap_err();
    assert!(matches!(err, PersistError::UnmappedType { .. }));
    assert!(event.is_none());
}

#[test]
fn test_legacy_conversation_event_records() -> Result<()> {
    let records = vec![
        Record::new(
            vec![Element::keyed("conversation", "id", "1"), Element::new("text")],
            "Old style.",
        ),
        Record::new(
            vec![Element::keyed("conversation", "id", "1.1"), Element::new("delay")],
            DataValue::Integer(300),
        ),
    ];
    let (event, report) = load_event(records)?;
    assert_eq!(report.skipped, 0);
    let EventKind::Conversation(conversation) = &event.kind else {
        panic!("expected a conversation event");
    };
    assert_eq!(conversation.first_entry().as_text().unwrap().message, "Old style.");
    let reply = conversation.entry(&EntryIndex::parse("1.1")?)?;
    assert_eq!(reply.as_text().unwrap().delay_ms, 300);
    Ok(())
}

#[test]
fn test_bundled_sample_loads() -> Result<()> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join("gate_guard.ron");
    let document = save_files::load_save_document(&path)?;
    assert!(validate_records(&document.records).is_empty());
    let mut reader = RecordReader::new(document.records.clone());
    assert_eq!(reader.total_count(), 8);
    assert!(reader.next_record().is_some());

    let (conversation, report) = load_conversation(document.records)?;
    assert_eq!(report.skipped, 0);
    let greeting = conversation.first_entry();
    assert!(matches!(&greeting.kind, EntryKind::Text(text) if text.speaker_id == 12));
    assert_eq!(greeting.child_count(), 2);
    let battle = conversation.entry(&EntryIndex::parse("1.2")?)?;
    let event = &battle.as_text().unwrap().event;
    assert_eq!(event.event_type(), EventType::BattleStart);
    assert!(conversation.has_entry(&EntryIndex::parse("1.1.1")?));
    assert!(!conversation.has_entry(&EntryIndex::parse("1.3")?));
    Ok(())
}
