//! Battle start event.

use tessera_data::{Record, RecordWriter};

use super::{Event, EventFields, save_nested};
use crate::persist::{self, PersistError};

const KEY_EVENT_LOSE: &str = "eventlose";
const KEY_EVENT_WIN: &str = "eventwin";
const KEY_GAME_OVER_ON_LOSS: &str = "losegg";
const KEY_RESTORE_HEALTH: &str = "restorehealth";
const KEY_RESTORE_QD: &str = "restoreqd";
const KEY_TARGET_HIDE_ON_WIN: &str = "windisappear";

/// Starts a battle against the event's target, with follow-up events for each outcome.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BattleStart {
    pub event_win: Box<Event>,
    pub event_lose: Box<Event>,
    pub game_over_on_loss: bool,
    pub restore_health: bool,
    pub restore_qd: bool,
    pub target_hide_on_win: bool,
}

impl EventFields for BattleStart {
    fn load_field(&mut self, element: &str, record: &Record, index: usize) -> Result<(), PersistError> {
        match element {
            KEY_EVENT_LOSE => persist::load(self.event_lose.as_mut(), record, index + 1)?,
            KEY_EVENT_WIN => persist::load(self.event_win.as_mut(), record, index + 1)?,
            KEY_GAME_OVER_ON_LOSS => self.game_over_on_loss = record.data_bool()?,
            KEY_RESTORE_HEALTH => self.restore_health = record.data_bool()?,
            KEY_RESTORE_QD => self.restore_qd = record.data_bool()?,
            KEY_TARGET_HIDE_ON_WIN => self.target_hide_on_win = record.data_bool()?,
            _ => {},
        }
        Ok(())
    }

    fn save_fields(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        save_nested(KEY_EVENT_LOSE, &self.event_lose, writer)?;
        save_nested(KEY_EVENT_WIN, &self.event_win, writer)?;
        for (key, flag) in [
            (KEY_GAME_OVER_ON_LOSS, self.game_over_on_loss),
            (KEY_RESTORE_HEALTH, self.restore_health),
            (KEY_RESTORE_QD, self.restore_qd),
            (KEY_TARGET_HIDE_ON_WIN, self.target_hide_on_win),
        ] {
            if flag {
                writer.write_data(key, true.into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, EventType, MapSwitch};
    use tessera_data::{Element, MemoryWriter};

    #[test]
    fn nested_outcome_events_load_through_dispatch() {
        let mut event = Event::default();
        let rec = Record::new(
            vec![
                Element::new("startbattle"),
                Element::new("eventwin"),
                Element::new("startmap"),
                Element::new("id"),
            ],
            5,
        );
        persist::load(&mut event, &rec, 0).unwrap();
        let EventKind::BattleStart(battle) = &event.kind else {
            panic!("expected battle start");
        };
        assert_eq!(battle.event_win.event_type(), EventType::MapSwitch);
        assert!(battle.event_lose.is_none());
    }

    #[test]
    fn only_set_flags_and_real_outcomes_are_saved() {
        let battle = BattleStart {
            event_lose: Box::new(Event::new(EventKind::MapSwitch(MapSwitch { map_id: 2 }))),
            restore_health: true,
            ..BattleStart::default()
        };
        let mut writer = MemoryWriter::new();
        battle.save_fields(&mut writer).unwrap();
        let paths: Vec<_> = writer.records().iter().map(Record::path_string).collect();
        assert_eq!(paths, vec!["eventlose/startmap/id", "restorehealth"]);
    }
}
