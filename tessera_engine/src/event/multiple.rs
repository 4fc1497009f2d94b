//! An ordered list of events fired together.

use tessera_data::{Record, RecordWriter};

use super::{Event, EventFields};
use crate::persist::{self, PersistError};

const KEY_EVENT: &str = "event";
const KEY_EVENT_ID: &str = "id";

/// Fires each contained event in order.
///
/// Each event is saved as `event[id=<position>]` wrapping its own type element, so
/// a sparse save (positions holding empty events are skipped) loads back with
/// [`EventKind::None`](super::EventKind::None) padding in the gaps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EventMultiple {
    events: Vec<Event>,
}

impl EventMultiple {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn event(&self, position: usize) -> Option<&Event> {
        self.events.get(position)
    }

    pub fn event_mut(&mut self, position: usize) -> Option<&mut Event> {
        self.events.get_mut(position)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Store `event` at `position`, padding with empty events if the list is shorter.
    pub fn set_event(&mut self, position: usize, event: Event) {
        if position < self.events.len() {
            self.events[position] = event;
        } else {
            self.events.resize_with(position, Event::default);
            self.events.push(event);
        }
    }

    pub fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Remove and return the event at `position`, shifting later events down.
    pub fn remove_event(&mut self, position: usize) -> Option<Event> {
        (position < self.events.len()).then(|| self.events.remove(position))
    }
}

fn parse_position(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

impl EventFields for EventMultiple {
    fn load_field(&mut self, element: &str, record: &Record, index: usize) -> Result<(), PersistError> {
        if element != KEY_EVENT || record.key(index) != KEY_EVENT_ID {
            return Ok(());
        }
        let Some(position) = parse_position(record.key_value(index)) else {
            return Ok(());
        };
        if position >= self.events.len() {
            self.set_event(position, Event::default());
        }
        persist::load(&mut self.events[position], record, index + 1)
    }

    fn save_fields(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        for (position, event) in self.events.iter().enumerate() {
            if !event.is_none() {
                writer.write_keyed_element(KEY_EVENT, KEY_EVENT_ID, &position.to_string());
                let result = persist::save(event, writer, false);
                writer.jump_to_parent();
                result?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, EventType, MapSwitch, Notification};
    use tessera_data::{Element, MemoryWriter};

    #[test]
    fn set_event_pads_with_empty_events() {
        let mut multiple = EventMultiple::default();
        multiple.set_event(2, Event::new(EventKind::Sound));
        assert_eq!(multiple.event_count(), 3);
        assert!(multiple.event(0).unwrap().is_none());
        assert!(multiple.event(1).unwrap().is_none());
        assert_eq!(multiple.event(2).unwrap().event_type(), EventType::Sound);

        multiple.set_event(0, Event::new(EventKind::MapSwitch(MapSwitch { map_id: 1 })));
        assert_eq!(multiple.event_count(), 3);
        assert!(multiple.remove_event(5).is_none());
        assert_eq!(multiple.remove_event(1).map(|e| e.event_type()), Some(EventType::None));
    }

    #[test]
    fn sparse_positions_load_with_padding() {
        let mut multiple = EventMultiple::default();
        let rec = Record::new(
            vec![
                Element::keyed("event", "id", "2"),
                Element::new("notification"),
                Element::new("text"),
            ],
            "Hey",
        );
        multiple.load_field("event", &rec, 0).unwrap();
        assert_eq!(multiple.event_count(), 3);
        assert_eq!(multiple.event(2).unwrap().event_type(), EventType::Notification);
    }

    #[test]
    fn malformed_positions_are_ignored() {
        let mut multiple = EventMultiple::default();
        for id in ["", "-1", "a1", "1.5"] {
            let rec = Record::new(vec![Element::keyed("event", "id", id), Element::new("justsound")], 1);
            multiple.load_field("event", &rec, 0).unwrap();
        }
        assert_eq!(multiple.event_count(), 0);
    }

    #[test]
    fn save_skips_empty_slots_but_keeps_positions() {
        let mut multiple = EventMultiple::default();
        multiple.set_event(
            1,
            Event::new(EventKind::Notification(Notification { text: "Hi".into() })),
        );
        let mut writer = MemoryWriter::new();
        multiple.save_fields(&mut writer).unwrap();
        let paths: Vec<_> = writer.records().iter().map(Record::path_string).collect();
        assert_eq!(paths, vec!["event[id=1]/notification/text"]);
    }
}
