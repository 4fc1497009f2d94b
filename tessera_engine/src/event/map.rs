//! Map level events: switching maps and teleporting things.

use tessera_data::{Record, RecordWriter};

use super::EventFields;
use crate::persist::{PersistError, read_int};

const KEY_MAP_ID: &str = "id";
const KEY_SECTION_ID: &str = "section";
const KEY_THING_ID: &str = "id";
const KEY_TILE_HORIZONTAL: &str = "x";
const KEY_TILE_VERTICAL: &str = "y";

/// Section id meaning "whichever section is active".
pub const ACTIVE_SECTION_ID: i16 = -1;
/// Teleport target meaning "the thing that triggered the event".
pub const INITIATING_THING_ID: u32 = 0;

/// Moves the player to another map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MapSwitch {
    pub map_id: u16,
}

impl EventFields for MapSwitch {
    fn load_field(&mut self, element: &str, record: &Record, _index: usize) -> Result<(), PersistError> {
        if element == KEY_MAP_ID {
            self.map_id = read_int(record, KEY_MAP_ID)?;
        }
        Ok(())
    }

    fn save_fields(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        writer.write_data(KEY_MAP_ID, self.map_id.into());
        Ok(())
    }
}

/// Moves a thing to a tile, optionally in another map section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Teleport {
    pub tile_x: u16,
    pub tile_y: u16,
    pub section_id: i16,
    pub thing_id: u32,
}

impl Default for Teleport {
    fn default() -> Self {
        Self {
            tile_x: 0,
            tile_y: 0,
            section_id: ACTIVE_SECTION_ID,
            thing_id: INITIATING_THING_ID,
        }
    }
}

impl EventFields for Teleport {
    fn load_field(&mut self, element: &str, record: &Record, _index: usize) -> Result<(), PersistError> {
        match element {
            KEY_SECTION_ID => self.section_id = read_int(record, KEY_SECTION_ID)?,
            KEY_THING_ID => self.thing_id = read_int(record, KEY_THING_ID)?,
            KEY_TILE_HORIZONTAL => self.tile_x = read_int(record, KEY_TILE_HORIZONTAL)?,
            KEY_TILE_VERTICAL => self.tile_y = read_int(record, KEY_TILE_VERTICAL)?,
            _ => {},
        }
        Ok(())
    }

    fn save_fields(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        writer.write_data(KEY_TILE_HORIZONTAL, self.tile_x.into());
        writer.write_data(KEY_TILE_VERTICAL, self.tile_y.into());
        if self.section_id != ACTIVE_SECTION_ID {
            writer.write_data(KEY_SECTION_ID, self.section_id.into());
        }
        if self.thing_id != INITIATING_THING_ID {
            writer.write_data(KEY_THING_ID, self.thing_id.into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_data::{Element, MemoryWriter};

    #[test]
    fn teleport_omits_default_section_and_thing() {
        let mut writer = MemoryWriter::new();
        Teleport {
            tile_x: 7,
            tile_y: 9,
            ..Teleport::default()
        }
        .save_fields(&mut writer)
        .unwrap();
        let leaves: Vec<_> = writer.records().iter().map(Record::path_string).collect();
        assert_eq!(leaves, vec!["x", "y"]);
    }

    #[test]
    fn teleport_loads_each_field() {
        let mut teleport = Teleport::default();
        for (name, value) in [("x", 3), ("y", 4), ("section", 2), ("id", 11)] {
            let rec = Record::new(vec![Element::new(name)], value);
            teleport.load_field(name, &rec, 0).unwrap();
        }
        assert_eq!(
            teleport,
            Teleport {
                tile_x: 3,
                tile_y: 4,
                section_id: 2,
                thing_id: 11
            }
        );
    }
}
