//! Inventory events: giving and taking items.

use tessera_data::{Record, RecordWriter};

use super::EventFields;
use crate::persist::{PersistError, read_int};

const KEY_CHANCE: &str = "chance";
const KEY_DROP_IF_NO_ROOM: &str = "autodrop";
const KEY_ITEM_ID: &str = "id";
const KEY_ITEM_COUNT: &str = "count";

/// Upper bound (and default) of [`ItemGive::chance`].
pub const MAX_CHANCE: u8 = 100;
/// Item id meaning "no item chosen".
pub const UNSET_ITEM_ID: i32 = -1;

/// Gives the player a stack of items, optionally by chance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemGive {
    pub item_id: i32,
    pub count: u16,
    /// Drop the items on the map when the inventory is full.
    pub drop_if_no_room: bool,
    chance: u8,
}

impl Default for ItemGive {
    fn default() -> Self {
        Self {
            item_id: UNSET_ITEM_ID,
            count: 0,
            drop_if_no_room: false,
            chance: MAX_CHANCE,
        }
    }
}

impl ItemGive {
    /// Percent chance the items are given, `0..=MAX_CHANCE`.
    pub fn chance(&self) -> u8 {
        self.chance
    }

    /// Set the percent chance, clamped to [`MAX_CHANCE`].
    pub fn set_chance(&mut self, chance: u8) {
        self.chance = chance.min(MAX_CHANCE);
    }
}

impl EventFields for ItemGive {
    fn load_field(&mut self, element: &str, record: &Record, _index: usize) -> Result<(), PersistError> {
        match element {
            KEY_CHANCE => {
                let raw = record.data_int()?.clamp(0, i64::from(MAX_CHANCE));
                self.set_chance(u8::try_from(raw).unwrap_or(MAX_CHANCE));
            },
            KEY_DROP_IF_NO_ROOM => self.drop_if_no_room = record.data_bool()?,
            KEY_ITEM_ID => self.item_id = read_int(record, KEY_ITEM_ID)?,
            KEY_ITEM_COUNT => self.count = read_int(record, KEY_ITEM_COUNT)?,
            _ => {},
        }
        Ok(())
    }

    fn save_fields(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        writer.write_data(KEY_ITEM_ID, self.item_id.into());
        writer.write_data(KEY_ITEM_COUNT, self.count.into());
        if self.drop_if_no_room {
            writer.write_data(KEY_DROP_IF_NO_ROOM, true.into());
        }
        if self.chance < MAX_CHANCE {
            writer.write_data(KEY_CHANCE, self.chance.into());
        }
        Ok(())
    }
}

/// Takes a stack of items from the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemTake {
    pub item_id: i32,
    pub count: u16,
}

impl Default for ItemTake {
    fn default() -> Self {
        Self {
            item_id: UNSET_ITEM_ID,
            count: 0,
        }
    }
}

impl EventFields for ItemTake {
    fn load_field(&mut self, element: &str, record: &Record, _index: usize) -> Result<(), PersistError> {
        match element {
            KEY_ITEM_ID => self.item_id = read_int(record, KEY_ITEM_ID)?,
            KEY_ITEM_COUNT => self.count = read_int(record, KEY_ITEM_COUNT)?,
            _ => {},
        }
        Ok(())
    }

    fn save_fields(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        writer.write_data(KEY_ITEM_ID, self.item_id.into());
        writer.write_data(KEY_ITEM_COUNT, self.count.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_data::{DataValue, Element, MemoryWriter};

    fn leaf(name: &str, data: impl Into<DataValue>) -> Record {
        Record::new(vec![Element::new(name)], data)
    }

    #[test]
    fn chance_is_clamped() {
        let mut give = ItemGive::default();
        give.set_chance(250);
        assert_eq!(give.chance(), MAX_CHANCE);
        give.load_field("chance", &leaf("chance", 400), 0).unwrap();
        assert_eq!(give.chance(), MAX_CHANCE);
        give.load_field("chance", &leaf("chance", -3), 0).unwrap();
        assert_eq!(give.chance(), 0);
    }

    #[test]
    fn give_writes_optional_fields_only_when_changed() {
        let mut give = ItemGive {
            item_id: 4,
            count: 2,
            ..ItemGive::default()
        };
        let mut writer = MemoryWriter::new();
        give.save_fields(&mut writer).unwrap();
        assert_eq!(writer.records().len(), 2);

        give.drop_if_no_room = true;
        give.set_chance(40);
        let mut writer = MemoryWriter::new();
        give.save_fields(&mut writer).unwrap();
        let leaves: Vec<_> = writer.records().iter().map(|rec| rec.last_element().to_string()).collect();
        assert_eq!(leaves, vec!["id", "count", "autodrop", "chance"]);
    }

    #[test]
    fn take_rejects_negative_count() {
        let mut take = ItemTake::default();
        let err = take.load_field("count", &leaf("count", -1), 0).unwrap_err();
        assert!(matches!(err, PersistError::IntegerRange { value: -1, .. }));
    }
}
