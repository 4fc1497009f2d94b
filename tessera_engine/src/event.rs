//! Triggerable game actions.
//!
//! Every event shares a one-shot flag and an optional sound; what else it
//! carries depends on its [`EventKind`]. Events are persisted through the
//! [`persist`](crate::persist) dispatch, so a slot holding one kind of event can
//! be turned into another by the type string found in the save data.

pub mod battle;
pub mod item;
pub mod map;
pub mod multiple;
pub mod notify;
pub mod property;
pub mod unlock;

use std::sync::LazyLock;

use tessera_data::{Record, RecordWriter};
use variantly::Variantly;

use crate::conversation::Conversation;
use crate::persist::{PersistError, PersistFamily, Persistable, TypeRegistry, read_int};

pub use battle::BattleStart;
pub use item::{ItemGive, ItemTake};
pub use map::{MapSwitch, Teleport};
pub use multiple::EventMultiple;
pub use notify::Notification;
pub use property::{PropertyChange, TimedState, Tracking};
pub use unlock::{TriggerIo, UnlockIo, UnlockThing, UnlockTile, UnlockView};

const KEY_ONE_SHOT: &str = "one_shot";
const KEY_SOUND_ID: &str = "sound_id";

/// Sound id meaning "no sound".
pub const UNSET_SOUND_ID: i32 = -1;

static EVENT_TYPES: LazyLock<TypeRegistry<Event>> = LazyLock::new(|| {
    TypeRegistry::new("event")
        .with(EventType::BattleStart, "startbattle", || EventKind::BattleStart(BattleStart::default()).into())
        .with(EventType::Conversation, "conversation", || {
            EventKind::Conversation(Box::default()).into()
        })
        .with(EventType::ItemGive, "giveitem", || EventKind::ItemGive(ItemGive::default()).into())
        .with(EventType::ItemTake, "takeitem", || EventKind::ItemTake(ItemTake::default()).into())
        .with(EventType::MapSwitch, "startmap", || EventKind::MapSwitch(MapSwitch::default()).into())
        .with(EventType::Multiple, "multiple", || EventKind::Multiple(EventMultiple::default()).into())
        .with(EventType::None, "none", Event::default)
        .with(EventType::Notification, "notification", || {
            EventKind::Notification(Notification::default()).into()
        })
        .with(EventType::Property, "propertymod", || EventKind::Property(PropertyChange::default()).into())
        .with(EventType::Sound, "justsound", || EventKind::Sound.into())
        .with(EventType::Teleport, "teleportthing", || EventKind::Teleport(Teleport::default()).into())
        .with(EventType::TriggerIo, "triggerio", || EventKind::TriggerIo(TriggerIo::default()).into())
        .with(EventType::UnlockIo, "unlockio", || EventKind::UnlockIo(UnlockIo::default()).into())
        .with(EventType::UnlockThing, "unlockthing", || EventKind::UnlockThing(UnlockThing::default()).into())
        .with(EventType::UnlockTile, "unlocktile", || EventKind::UnlockTile(UnlockTile::default()).into())
});

/// Classification tag for an event's concrete kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Variantly)]
pub enum EventType {
    None,
    BattleStart,
    Conversation,
    ItemGive,
    ItemTake,
    MapSwitch,
    Multiple,
    Notification,
    Property,
    Sound,
    Teleport,
    TriggerIo,
    UnlockIo,
    UnlockThing,
    UnlockTile,
}

/// Kind-specific payload of an [`Event`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EventKind {
    /// Does nothing; never saved.
    #[default]
    None,
    BattleStart(BattleStart),
    Conversation(Box<Conversation>),
    ItemGive(ItemGive),
    ItemTake(ItemTake),
    MapSwitch(MapSwitch),
    Multiple(EventMultiple),
    Notification(Notification),
    Property(PropertyChange),
    /// Plays the event's sound and nothing else.
    Sound,
    Teleport(Teleport),
    TriggerIo(TriggerIo),
    UnlockIo(UnlockIo),
    UnlockThing(UnlockThing),
    UnlockTile(UnlockTile),
}

impl EventKind {
    pub fn event_type(&self) -> EventType {
        match self {
            EventKind::None => EventType::None,
            EventKind::BattleStart(_) => EventType::BattleStart,
            EventKind::Conversation(_) => EventType::Conversation,
            EventKind::ItemGive(_) => EventType::ItemGive,
            EventKind::ItemTake(_) => EventType::ItemTake,
            EventKind::MapSwitch(_) => EventType::MapSwitch,
            EventKind::Multiple(_) => EventType::Multiple,
            EventKind::Notification(_) => EventType::Notification,
            EventKind::Property(_) => EventType::Property,
            EventKind::Sound => EventType::Sound,
            EventKind::Teleport(_) => EventType::Teleport,
            EventKind::TriggerIo(_) => EventType::TriggerIo,
            EventKind::UnlockIo(_) => EventType::UnlockIo,
            EventKind::UnlockThing(_) => EventType::UnlockThing,
            EventKind::UnlockTile(_) => EventType::UnlockTile,
        }
    }

    fn fields(&self) -> Option<&dyn EventFields> {
        let fields: &dyn EventFields = match self {
            EventKind::None | EventKind::Sound => return None,
            EventKind::BattleStart(fields) => fields,
            EventKind::Conversation(fields) => fields.as_ref(),
            EventKind::ItemGive(fields) => fields,
            EventKind::ItemTake(fields) => fields,
            EventKind::MapSwitch(fields) => fields,
            EventKind::Multiple(fields) => fields,
            EventKind::Notification(fields) => fields,
            EventKind::Property(fields) => fields,
            EventKind::Teleport(fields) => fields,
            EventKind::TriggerIo(fields) => fields,
            EventKind::UnlockIo(fields) => fields,
            EventKind::UnlockThing(fields) => fields,
            EventKind::UnlockTile(fields) => fields,
        };
        Some(fields)
    }

    fn fields_mut(&mut self) -> Option<&mut dyn EventFields> {
        let fields: &mut dyn EventFields = match self {
            EventKind::None | EventKind::Sound => return None,
            EventKind::BattleStart(fields) => fields,
            EventKind::Conversation(fields) => fields.as_mut(),
            EventKind::ItemGive(fields) => fields,
            EventKind::ItemTake(fields) => fields,
            EventKind::MapSwitch(fields) => fields,
            EventKind::Multiple(fields) => fields,
            EventKind::Notification(fields) => fields,
            EventKind::Property(fields) => fields,
            EventKind::Teleport(fields) => fields,
            EventKind::TriggerIo(fields) => fields,
            EventKind::UnlockIo(fields) => fields,
            EventKind::UnlockThing(fields) => fields,
            EventKind::UnlockTile(fields) => fields,
        };
        Some(fields)
    }
}

/// Field persistence for one event payload.
///
/// `element` is the record element at `index`, the field the record addresses.
/// Unknown elements are ignored so the shared event fields can be read afterwards.
pub trait EventFields {
    /// # Errors
    /// Returns a [`PersistError`] if the leaf data does not fit the field.
    fn load_field(&mut self, element: &str, record: &Record, index: usize) -> Result<(), PersistError>;

    /// # Errors
    /// Returns a [`PersistError`] if a nested value cannot be written.
    fn save_fields(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError>;
}

impl EventFields for Conversation {
    fn load_field(&mut self, _element: &str, record: &Record, index: usize) -> Result<(), PersistError> {
        self.load(record, index)
    }

    fn save_fields(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        self.save(writer)
    }
}

/// A triggerable game action.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Only fire the first time the event is triggered.
    pub one_shot: bool,
    /// Sound to play on trigger, or [`UNSET_SOUND_ID`].
    pub sound_id: i32,
    pub kind: EventKind,
}

impl Default for Event {
    fn default() -> Self {
        Self::new(EventKind::None)
    }
}

impl From<EventKind> for Event {
    fn from(kind: EventKind) -> Self {
        Self::new(kind)
    }
}

impl Event {
    pub fn new(kind: EventKind) -> Self {
        Self {
            one_shot: false,
            sound_id: UNSET_SOUND_ID,
            kind,
        }
    }

    /// Fresh event of `event_type` with default fields.
    ///
    /// # Errors
    /// Returns [`PersistError::UnmappedType`] if the type has no registered factory.
    pub fn of_type(event_type: EventType) -> Result<Self, PersistError> {
        EVENT_TYPES.create(event_type)
    }

    pub fn event_type(&self) -> EventType {
        self.kind.event_type()
    }

    pub fn is_none(&self) -> bool {
        self.event_type().is_none()
    }
}

impl Persistable for Event {
    type Kind = EventType;

    fn kind(&self) -> EventType {
        self.event_type()
    }

    fn is_saveable(&self) -> bool {
        !self.is_none()
    }

    fn load(&mut self, record: &Record, index: usize) -> Result<(), PersistError> {
        if self.is_none() {
            return Ok(());
        }
        let element = record.element(index);
        match self.kind.fields_mut() {
            Some(fields) => fields.load_field(element, record, index)?,
            // sound events keep their id directly in the type element
            None if index == record.element_count() => self.sound_id = read_int(record, KEY_SOUND_ID)?,
            None => {},
        }
        match element {
            KEY_ONE_SHOT => self.one_shot = record.data_bool()?,
            KEY_SOUND_ID => self.sound_id = read_int(record, KEY_SOUND_ID)?,
            _ => {},
        }
        Ok(())
    }

    fn save(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        if self.is_none() {
            return Ok(());
        }
        if let Some(fields) = self.kind.fields() {
            fields.save_fields(writer)?;
        }
        if self.one_shot {
            writer.write_data(KEY_ONE_SHOT, true.into());
        }
        if self.sound_id >= 0 {
            writer.write_data(KEY_SOUND_ID, self.sound_id.into());
        }
        Ok(())
    }
}

impl PersistFamily for Event {
    fn registry() -> &'static TypeRegistry<Self> {
        &EVENT_TYPES
    }
}

/// Write `event` under a plain `name` element, skipping it entirely when it has no content.
pub(crate) fn save_nested(name: &str, event: &Event, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
    if !event.is_saveable() {
        return Ok(());
    }
    writer.write_element(name);
    let result = crate::persist::save(event, writer, false);
    writer.jump_to_parent();
    result
}
