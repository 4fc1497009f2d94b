//! Notification events: a short message shown to the player.

use tessera_data::{Record, RecordWriter};

use super::EventFields;
use crate::persist::PersistError;

const KEY_TEXT: &str = "text";

/// Shows a short notification to the player.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Notification {
    pub text: String,
}

impl EventFields for Notification {
    fn load_field(&mut self, element: &str, record: &Record, index: usize) -> Result<(), PersistError> {
        // older saves keep the text directly in the type element
        if element == KEY_TEXT || index == record.element_count() {
            self.text = record.data_string()?.to_string();
        }
        Ok(())
    }

    fn save_fields(&self, writer: &mut dyn RecordWriter) -> Result<(), PersistError> {
        writer.write_data(KEY_TEXT, self.text.as_str().into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_data::Element;

    #[test]
    fn reads_current_and_legacy_layouts() {
        let mut note = Notification::default();
        let current = Record::new(vec![Element::new("notification"), Element::new("text")], "Door opened");
        note.load_field("text", &current, 1).unwrap();
        assert_eq!(note.text, "Door opened");

        let legacy = Record::new(vec![Element::new("notification")], "Gate opened");
        note.load_field("", &legacy, 1).unwrap();
        assert_eq!(note.text, "Gate opened");
    }
}
