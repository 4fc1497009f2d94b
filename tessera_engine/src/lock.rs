//! Locks guarding interactive objects and things.
//!
//! Like events, a lock slot changes kind through the [`persist`](crate::persist)
//! dispatch. The empty [`LockKind::None`] is never written and has no type string,
//! so it can only come from [`Lock::default`].

use std::sync::LazyLock;

use tessera_data::{Record, RecordWriter};
use variantly::Variantly;

use crate::persist::{PersistError, PersistFamily, Persistable, TypeRegistry, read_int};

const KEY_PERMANENT: &str = "permanent";
const KEY_CONSUME_TO_UNLOCK: &str = "consume";
const KEY_ITEM_COUNT: &str = "count";
const KEY_ITEM_ID: &str = "id";

pub const DEFAULT_ITEM_COUNT: u16 = 1;
pub const UNSET_ITEM_ID: i32 = -1;

static LOCK_TYPES: LazyLock<TypeRegistry<Lock>> = LazyLock::new(|| {
    TypeRegistry::new("lock")
        .with(LockType::Item, "item", || Lock::new(LockKind::Item(ItemLock::default())))
        .with(LockType::Trigger, "trigger", || Lock::new(LockKind::Trigger))
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Variantly)]
pub enum LockType {
    None,
    Item,
    Trigger,
}

/// Opens when the player holds enough of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemLock {
    pub item_id: i32,
    pub count: u16,
    /// Remove the items from the inventory when unlocking.
    pub consume: bool,
}

impl Default for ItemLock {
    fn default() -> Self {
        Self {
            item_id: UNSET_ITEM_ID,
            count: DEFAULT_ITEM_COUNT,
            consume: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LockKind {
    #[default]
    None,
    Item(ItemLock),
    /// Opens only when triggered by an event.
    Trigger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lock {
    /// Stay unlocked once opened.
    pub permanent: bool,
    pub kind: LockKind,
}

impl Default for Lock {
    fn default() -> Self {
        Self::new(LockKind::None)
    }
}

impl Lock {
    pub fn new(kind: LockKind) -> Self {
        Self { permanent: true, kind }
    }

    pub fn lock_type(&self) -> LockType {
        match self.kind {
            LockKind::None => LockType::None,
            LockKind::Item(_) => LockType::Item,
            LockKind::Trigger => LockType::Trigger,
        }
    }
}

impl Persistable for Lock {
    type Kind = LockType;

    fn kind(&self) -> LockType {
        self.lock_type()
    }

    fn is_saveable(&self) -> bool {
        !self.lock_type().is_none()
    }

    fn load(&mut self, record: &Record, index: usize) -> Result<(), PersistError> {
        let element = record.element(index);
        match &mut self.kind {
            LockKind::None => return Ok(()),
            LockKind::Item(item) => match element {
                KEY_CONSUME_TO_UNLOCK => item.consume = record.data_bool()?,
                KEY_ITEM_ID => item.item_id = read_int(record, KEY_ITEM_ID)?,
                KEY_ITEM_COUNT => item.count = read_int(record, KEY_ITEM_COUNT)?,
                _ => {},
            },
            LockKind::Trigger => {},
        }
        if element == KEY_PERMANENT {
            self.permanent = record.data_bool()?;
        }
        Ok(())
    }

    fn save(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        match self.kind {
            LockKind::None => return Ok(()),
            LockKind::Item(item) => {
                writer.write_data(KEY_ITEM_ID, item.item_id.into());
                if item.count != DEFAULT_ITEM_COUNT {
                    writer.write_data(KEY_ITEM_COUNT, item.count.into());
                }
                if !item.consume {
                    writer.write_data(KEY_CONSUME_TO_UNLOCK, false.into());
                }
            },
            LockKind::Trigger => {
                // the only leaf a trigger lock has, so its type survives the save
                writer.write_data(KEY_PERMANENT, self.permanent.into());
                return Ok(());
            },
        }
        if !self.permanent {
            writer.write_data(KEY_PERMANENT, false.into());
        }
        Ok(())
    }
}

impl PersistFamily for Lock {
    fn registry() -> &'static TypeRegistry<Self> {
        &LOCK_TYPES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist;
    use tessera_data::{DataValue, Element, MemoryWriter};

    fn record(path: &[&str], data: impl Into<DataValue>) -> Record {
        Record::new(path.iter().map(|name| Element::new(*name)).collect(), data)
    }

    #[test]
    fn item_lock_defaults_are_omitted() {
        let lock = Lock::new(LockKind::Item(ItemLock {
            item_id: 30,
            ..ItemLock::default()
        }));
        let mut writer = MemoryWriter::new();
        persist::save(&lock, &mut writer, false).unwrap();
        let paths: Vec<_> = writer.records().iter().map(Record::path_string).collect();
        assert_eq!(paths, vec!["item/id"]);
    }

    #[test]
    fn loads_switch_kind_and_keep_permanent_flag_per_kind() {
        let mut lock = Lock::default();
        persist::load(&mut lock, &record(&["item", "count"], 3), 0).unwrap();
        persist::load(&mut lock, &record(&["item", "permanent"], false), 0).unwrap();
        assert_eq!(
            lock,
            Lock {
                permanent: false,
                kind: LockKind::Item(ItemLock {
                    count: 3,
                    ..ItemLock::default()
                })
            }
        );

        persist::load(&mut lock, &record(&["trigger", "permanent"], true), 0).unwrap();
        assert_eq!(lock, Lock::new(LockKind::Trigger));
    }

    #[test]
    fn none_is_not_a_loadable_type() {
        let mut lock = Lock::default();
        let err = persist::load(&mut lock, &record(&["none", "permanent"], true), 0).unwrap_err();
        assert!(matches!(err, PersistError::UnmappedType { .. }));
    }

    #[test]
    fn permanent_trigger_lock_still_writes_a_leaf() {
        let mut writer = MemoryWriter::new();
        persist::save(&Lock::new(LockKind::Trigger), &mut writer, false).unwrap();
        let paths: Vec<_> = writer.records().iter().map(Record::path_string).collect();
        assert_eq!(paths, vec!["trigger/permanent"]);
    }

    #[test]
    fn trigger_lock_round_trips_impermanence() {
        let mut lock = Lock::new(LockKind::Trigger);
        lock.permanent = false;
        let mut writer = MemoryWriter::new();
        persist::save(&lock, &mut writer, false).unwrap();
        let mut loaded = Lock::default();
        for rec in writer.records() {
            persist::load(&mut loaded, rec, 0).unwrap();
        }
        assert_eq!(loaded, lock);
    }
}
