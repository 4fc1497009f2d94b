//! Property modification of map things, persons, NPCs and interactive objects.
//!
//! Every property is optional: only the ones that were set are applied to the
//! target, and only those are saved.

use std::fmt;
use std::str::FromStr;

use tessera_data::{Record, RecordWriter};

use super::EventFields;
use crate::persist::{PersistError, read_int};

const KEY_IO_INACTIVE: &str = "inactive";
const KEY_IO_INACTIVE_DISABLED: &str = "inactive_disable";
const KEY_NPC_INTERACTION_FORCED: &str = "forceinteract";
const KEY_NPC_TRACKING: &str = "tracking";
const KEY_PERSON_LOCATION_RESET: &str = "resetlocation";
const KEY_PERSON_MOVEMENT_DISABLED: &str = "movedisable";
const KEY_PERSON_SPEED: &str = "speed";
const KEY_THING_ACTIVE: &str = "active";
const KEY_THING_ID: &str = "id";
const KEY_THING_RESPAWN: &str = "respawn";
const KEY_THING_RESPAWN_DISABLED: &str = "respawn_disable";
const KEY_THING_VISIBLE: &str = "visible";

/// Thing id meaning "no target chosen".
pub const UNSET_THING_ID: i32 = -1;

/// How an NPC moves relative to the player when in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tracking {
    None,
    AvoidPlayer,
    ToPlayer,
}

impl Tracking {
    pub fn as_str(self) -> &'static str {
        match self {
            Tracking::None => "notrack",
            Tracking::AvoidPlayer => "avoidplayer",
            Tracking::ToPlayer => "toplayer",
        }
    }
}

impl fmt::Display for Tracking {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Tracking {
    type Err = PersistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "notrack" => Ok(Tracking::None),
            "avoidplayer" => Ok(Tracking::AvoidPlayer),
            "toplayer" => Ok(Tracking::ToPlayer),
            _ => Err(PersistError::UnknownValue {
                field: KEY_NPC_TRACKING.to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// A delayed fallback that can also be switched off entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedState {
    /// Fall back after this many milliseconds.
    After(u32),
    /// Never fall back.
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChange {
    pub thing_id: i32,
    pub thing_active: Option<bool>,
    pub thing_visible: Option<bool>,
    /// Time to respawn after the thing is hidden.
    pub thing_respawn: Option<TimedState>,
    /// Send the person back to its starting location.
    pub person_location_reset: bool,
    pub person_movement_disabled: Option<bool>,
    /// Map movement speed; tiles per second is `speed / 4`.
    pub person_speed: Option<u16>,
    pub npc_interaction_forced: Option<bool>,
    pub npc_tracking: Option<Tracking>,
    /// Time for an interactive object to return to its previous state once inactive.
    pub io_inactive: Option<TimedState>,
}

impl Default for PropertyChange {
    fn default() -> Self {
        Self {
            thing_id: UNSET_THING_ID,
            thing_active: None,
            thing_visible: None,
            thing_respawn: None,
            person_location_reset: false,
            person_movement_disabled: None,
            person_speed: None,
            npc_interaction_forced: None,
            npc_tracking: None,
            io_inactive: None,
        }
    }
}

fn write_timed(writer: &mut dyn RecordWriter, state: Option<TimedState>, timed_key: &str, disabled_key: &str) {
    match state {
        Some(TimedState::After(ms)) => writer.write_data(timed_key, ms.into()),
        Some(TimedState::Disabled) => writer.write_data(disabled_key, true.into()),
        None => {},
    }
}

impl EventFields for PropertyChange {
    fn load_field(&mut self, element: &str, record: &Record, _index: usize) -> Result<(), PersistError> {
        match element {
            KEY_IO_INACTIVE => self.io_inactive = Some(TimedState::After(read_int(record, KEY_IO_INACTIVE)?)),
            KEY_IO_INACTIVE_DISABLED => {
                if record.data_bool()? {
                    self.io_inactive = Some(TimedState::Disabled);
                }
            },
            KEY_NPC_INTERACTION_FORCED => self.npc_interaction_forced = Some(record.data_bool()?),
            KEY_NPC_TRACKING => self.npc_tracking = Some(record.data_string()?.parse()?),
            KEY_PERSON_LOCATION_RESET => {
                if record.data_bool()? {
                    self.person_location_reset = true;
                }
            },
            KEY_PERSON_MOVEMENT_DISABLED => self.person_movement_disabled = Some(record.data_bool()?),
            KEY_PERSON_SPEED => self.person_speed = Some(read_int(record, KEY_PERSON_SPEED)?),
            KEY_THING_ACTIVE => self.thing_active = Some(record.data_bool()?),
            KEY_THING_ID => self.thing_id = read_int(record, KEY_THING_ID)?,
            KEY_THING_RESPAWN => self.thing_respawn = Some(TimedState::After(read_int(record, KEY_THING_RESPAWN)?)),
            KEY_THING_RESPAWN_DISABLED => {
                if record.data_bool()? {
                    self.thing_respawn = Some(TimedState::Disabled);
                }
            },
            KEY_THING_VISIBLE => self.thing_visible = Some(record.data_bool()?),
            _ => {},
        }
        Ok(())
    }

    fn save_fields(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        writer.write_data(KEY_THING_ID, self.thing_id.into());
        if let Some(active) = self.thing_active {
            writer.write_data(KEY_THING_ACTIVE, active.into());
        }
        write_timed(writer, self.thing_respawn, KEY_THING_RESPAWN, KEY_THING_RESPAWN_DISABLED);
        if let Some(visible) = self.thing_visible {
            writer.write_data(KEY_THING_VISIBLE, visible.into());
        }
        if self.person_location_reset {
            writer.write_data(KEY_PERSON_LOCATION_RESET, true.into());
        }
        if let Some(disabled) = self.person_movement_disabled {
            writer.write_data(KEY_PERSON_MOVEMENT_DISABLED, disabled.into());
        }
        if let Some(speed) = self.person_speed {
            writer.write_data(KEY_PERSON_SPEED, speed.into());
        }
        if let Some(forced) = self.npc_interaction_forced {
            writer.write_data(KEY_NPC_INTERACTION_FORCED, forced.into());
        }
        if let Some(tracking) = self.npc_tracking {
            writer.write_data(KEY_NPC_TRACKING, tracking.as_str().into());
        }
        write_timed(writer, self.io_inactive, KEY_IO_INACTIVE, KEY_IO_INACTIVE_DISABLED);
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
    fn only_set_properties_are_saved() {
        let change = PropertyChange {
            thing_id: 21,
            thing_visible: Some(false),
            thing_respawn: Some(TimedState::Disabled),
            npc_tracking: Some(Tracking::AvoidPlayer),
            ..PropertyChange::default()
        };
        let mut writer = MemoryWriter::new();
        change.save_fields(&mut writer).unwrap();
        let saved: Vec<_> = writer
            .records()
            .iter()
            .map(|rec| (rec.path_string(), rec.data.clone()))
            .collect();
        assert_eq!(
            saved,
            vec![
                ("id".to_string(), DataValue::Integer(21)),
                ("respawn_disable".to_string(), DataValue::Boolean(true)),
                ("visible".to_string(), DataValue::Boolean(false)),
                ("tracking".to_string(), DataValue::String("avoidplayer".into())),
            ]
        );
    }

    #[test]
    fn disable_flags_only_apply_when_true() {
        let mut change = PropertyChange::default();
        change.load_field("inactive", &leaf("inactive", 1500), 0).unwrap();
        change.load_field("inactive_disable", &leaf("inactive_disable", false), 0).unwrap();
        assert_eq!(change.io_inactive, Some(TimedState::After(1500)));
        change.load_field("inactive_disable", &leaf("inactive_disable", true), 0).unwrap();
        assert_eq!(change.io_inactive, Some(TimedState::Disabled));
    }

    #[test]
    fn unknown_tracking_is_rejected() {
        let mut change = PropertyChange::default();
        let err = change.load_field("tracking", &leaf("tracking", "wander"), 0).unwrap_err();
        assert!(matches!(err, PersistError::UnknownValue { ref value, .. } if value == "wander"));
        change.load_field("tracking", &leaf("tracking", "toplayer"), 0).unwrap();
        assert_eq!(change.npc_tracking, Some(Tracking::ToPlayer));
    }
}
