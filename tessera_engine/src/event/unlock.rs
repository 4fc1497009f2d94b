//! Interactive object triggers and the unlock family of events.
//!
//! The three unlock events share an [`UnlockView`]: whether the camera should
//! travel to the unlocked target so the player sees what changed.

use tessera_data::{Record, RecordWriter};

use super::EventFields;
use crate::persist::{PersistError, read_int};

const KEY_ID: &str = "id";
const KEY_VIEW_SCROLL: &str = "viewscroll";
const KEY_VIEW_TARGET: &str = "view";
const KEY_VIEW_TIME: &str = "viewtime";
const KEY_STATE_ID: &str = "state";
const KEY_UNLOCK_EVENT_ALL: &str = "eventall";
const KEY_UNLOCK_EVENT_ENTER: &str = "evententer";
const KEY_UNLOCK_EVENT_EXIT: &str = "eventexit";
const KEY_UNLOCK_EVENT_USE: &str = "eventuse";
const KEY_UNLOCK_EVENT_WALKOVER: &str = "eventwalkover";
const KEY_UNLOCK_INTERACTION: &str = "modelock";
const KEY_SECTION_ID: &str = "sectionid";
const KEY_TILE_HORIZONTAL: &str = "x";
const KEY_TILE_VERTICAL: &str = "y";

/// Interactive object id meaning "the object that triggered the event".
pub const INITIATING_IO_ID: i32 = -1;
/// Thing id meaning "the thing that triggered the event".
pub const INITIATING_THING_ID: i32 = -1;
/// Interactive object state id meaning "every state".
pub const ALL_STATES_ID: i16 = -1;
/// Section id meaning "whichever section is active".
pub const ACTIVE_SECTION_ID: i16 = -1;
pub const DEFAULT_VIEW_TIME_MS: u32 = 1000;

/// Triggers an interactive object as if the player had used it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerIo {
    pub io_id: i32,
}

impl Default for TriggerIo {
    fn default() -> Self {
        Self { io_id: INITIATING_IO_ID }
    }
}

impl EventFields for TriggerIo {
    fn load_field(&mut self, element: &str, record: &Record, _index: usize) -> Result<(), PersistError> {
        if element == KEY_ID {
            self.io_id = read_int(record, KEY_ID)?;
        }
        Ok(())
    }

    fn save_fields(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        writer.write_data(KEY_ID, self.io_id.into());
        Ok(())
    }
}

/// Camera behaviour after an unlock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockView {
    /// Move the view to the unlocked target.
    pub target: bool,
    /// Scroll to the target instead of jumping.
    pub scroll: bool,
    /// How long the view stays on the target.
    pub time_ms: u32,
}

impl Default for UnlockView {
    fn default() -> Self {
        Self {
            target: false,
            scroll: false,
            time_ms: DEFAULT_VIEW_TIME_MS,
        }
    }
}

impl UnlockView {
    fn load_field(&mut self, element: &str, record: &Record) -> Result<(), PersistError> {
        match element {
            KEY_VIEW_SCROLL => self.scroll = record.data_bool()?,
            KEY_VIEW_TARGET => self.target = record.data_bool()?,
            KEY_VIEW_TIME => self.time_ms = read_int(record, KEY_VIEW_TIME)?,
            _ => {},
        }
        Ok(())
    }

    fn save_fields(&self, writer: &mut dyn RecordWriter) {
        if !self.target {
            return;
        }
        writer.write_data(KEY_VIEW_TARGET, true.into());
        if self.scroll {
            writer.write_data(KEY_VIEW_SCROLL, true.into());
        }
        if self.time_ms != DEFAULT_VIEW_TIME_MS {
            writer.write_data(KEY_VIEW_TIME, self.time_ms.into());
        }
    }
}

/// Unlocks interaction modes and/or state events of an interactive object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockIo {
    pub io_id: i32,
    pub state_id: i16,
    /// Unlock the object's interaction lock.
    pub unlock_interaction: bool,
    pub event_enter: bool,
    pub event_exit: bool,
    pub event_use: bool,
    pub event_walkover: bool,
    pub view: UnlockView,
}

impl Default for UnlockIo {
    fn default() -> Self {
        Self {
            io_id: INITIATING_IO_ID,
            state_id: ALL_STATES_ID,
            unlock_interaction: false,
            event_enter: false,
            event_exit: false,
            event_use: false,
            event_walkover: false,
            view: UnlockView::default(),
        }
    }
}

impl UnlockIo {
    fn state_events(&self) -> [(&'static str, bool); 4] {
        [
            (KEY_UNLOCK_EVENT_ENTER, self.event_enter),
            (KEY_UNLOCK_EVENT_EXIT, self.event_exit),
            (KEY_UNLOCK_EVENT_USE, self.event_use),
            (KEY_UNLOCK_EVENT_WALKOVER, self.event_walkover),
        ]
    }
}

impl EventFields for UnlockIo {
    fn load_field(&mut self, element: &str, record: &Record, _index: usize) -> Result<(), PersistError> {
        match element {
            KEY_ID => self.io_id = read_int(record, KEY_ID)?,
            KEY_STATE_ID => self.state_id = read_int(record, KEY_STATE_ID)?,
            KEY_UNLOCK_EVENT_ALL => {
                let unlock = record.data_bool()?;
                self.event_enter = unlock;
                self.event_exit = unlock;
                self.event_use = unlock;
                self.event_walkover = unlock;
            },
            KEY_UNLOCK_EVENT_ENTER => self.event_enter = record.data_bool()?,
            KEY_UNLOCK_EVENT_EXIT => self.event_exit = record.data_bool()?,
            KEY_UNLOCK_EVENT_USE => self.event_use = record.data_bool()?,
            KEY_UNLOCK_EVENT_WALKOVER => self.event_walkover = record.data_bool()?,
            KEY_UNLOCK_INTERACTION => self.unlock_interaction = record.data_bool()?,
            _ => self.view.load_field(element, record)?,
        }
        Ok(())
    }

    fn save_fields(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        writer.write_data(KEY_ID, self.io_id.into());
        if self.unlock_interaction {
            writer.write_data(KEY_UNLOCK_INTERACTION, true.into());
        }
        let events = self.state_events();
        if events.iter().any(|(_, set)| *set) {
            if self.state_id != ALL_STATES_ID {
                writer.write_data(KEY_STATE_ID, self.state_id.into());
            }
            if events.iter().all(|(_, set)| *set) {
                writer.write_data(KEY_UNLOCK_EVENT_ALL, true.into());
            } else {
                for (key, _) in events.iter().filter(|(_, set)| *set) {
                    writer.write_data(key, true.into());
                }
            }
        }
        self.view.save_fields(writer);
        Ok(())
    }
}

/// Unlocks a locked map thing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockThing {
    pub thing_id: i32,
    pub view: UnlockView,
}

impl Default for UnlockThing {
    fn default() -> Self {
        Self {
            thing_id: INITIATING_THING_ID,
            view: UnlockView::default(),
        }
    }
}

impl EventFields for UnlockThing {
    fn load_field(&mut self, element: &str, record: &Record, _index: usize) -> Result<(), PersistError> {
        if element == KEY_ID {
            self.thing_id = read_int(record, KEY_ID)?;
            return Ok(());
        }
        self.view.load_field(element, record)
    }

    fn save_fields(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        writer.write_data(KEY_ID, self.thing_id.into());
        self.view.save_fields(writer);
        Ok(())
    }
}

/// Unlocks the enter and/or exit events of a map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockTile {
    pub tile_x: u16,
    pub tile_y: u16,
    pub section_id: i16,
    pub event_enter: bool,
    pub event_exit: bool,
    pub view: UnlockView,
}

impl Default for UnlockTile {
    fn default() -> Self {
        Self {
            tile_x: 0,
            tile_y: 0,
            section_id: ACTIVE_SECTION_ID,
            event_enter: false,
            event_exit: false,
            view: UnlockView::default(),
        }
    }
}

impl EventFields for UnlockTile {
    fn load_field(&mut self, element: &str, record: &Record, _index: usize) -> Result<(), PersistError> {
        match element {
            KEY_SECTION_ID => self.section_id = read_int(record, KEY_SECTION_ID)?,
            KEY_TILE_HORIZONTAL => self.tile_x = read_int(record, KEY_TILE_HORIZONTAL)?,
            KEY_TILE_VERTICAL => self.tile_y = read_int(record, KEY_TILE_VERTICAL)?,
            KEY_UNLOCK_EVENT_ALL => {
                let unlock = record.data_bool()?;
                self.event_enter = unlock;
                self.event_exit = unlock;
            },
            KEY_UNLOCK_EVENT_ENTER => self.event_enter = record.data_bool()?,
            KEY_UNLOCK_EVENT_EXIT => self.event_exit = record.data_bool()?,
            _ => self.view.load_field(element, record)?,
        }
        Ok(())
    }

    fn save_fields(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        writer.write_data(KEY_TILE_HORIZONTAL, self.tile_x.into());
        writer.write_data(KEY_TILE_VERTICAL, self.tile_y.into());
        if self.section_id != ACTIVE_SECTION_ID {
            writer.write_data(KEY_SECTION_ID, self.section_id.into());
        }
        if self.event_enter && self.event_exit {
            writer.write_data(KEY_UNLOCK_EVENT_ALL, true.into());
        } else {
            if self.event_enter {
                writer.write_data(KEY_UNLOCK_EVENT_ENTER, true.into());
            }
            if self.event_exit {
                writer.write_data(KEY_UNLOCK_EVENT_EXIT, true.into());
            }
        }
        self.view.save_fields(writer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_data::{DataValue, Element, MemoryWriter};

    fn leaves(fields: &dyn EventFields) -> Vec<String> {
        let mut writer = MemoryWriter::new();
        fields.save_fields(&mut writer).unwrap();
        writer.records().iter().map(Record::path_string).collect()
    }

    fn leaf(name: &str, data: impl Into<DataValue>) -> Record {
        Record::new(vec![Element::new(name)], data)
    }

    #[test]
    fn io_collapses_all_state_events() {
        let mut unlock = UnlockIo {
            io_id: 4,
            state_id: 2,
            ..UnlockIo::default()
        };
        assert_eq!(leaves(&unlock), vec!["id"]);

        unlock.load_field("eventall", &leaf("eventall", true), 0).unwrap();
        assert_eq!(leaves(&unlock), vec!["id", "state", "eventall"]);

        unlock.event_use = false;
        assert_eq!(leaves(&unlock), vec!["id", "state", "evententer", "eventexit", "eventwalkover"]);
    }

    #[test]
    fn view_details_need_a_view_target() {
        let mut thing = UnlockThing::default();
        thing.view.scroll = true;
        thing.view.time_ms = 2500;
        assert_eq!(leaves(&thing), vec!["id"]);

        thing.view.target = true;
        assert_eq!(leaves(&thing), vec!["id", "view", "viewscroll", "viewtime"]);
    }

    #[test]
    fn tile_loads_view_fields_through_shared_view() {
        let mut tile = UnlockTile::default();
        tile.load_field("view", &leaf("view", true), 0).unwrap();
        tile.load_field("viewtime", &leaf("viewtime", 300), 0).unwrap();
        tile.load_field("evententer", &leaf("evententer", true), 0).unwrap();
        assert!(tile.view.target);
        assert_eq!(tile.view.time_ms, 300);
        assert_eq!(leaves(&tile), vec!["x", "y", "evententer", "view", "viewtime"]);
    }
}
