use zoon::*;

use crate::editor::SourceEditor;
use crate::preferences::Preferences;

/// State behind one `<textarea>` source editor.
///
/// The element renders `text` and writes user input back into it; the host
/// calls [`crate::Playground::source_changed`] from the same input handler.
/// Writes made through [`SourceEditor::set_text`] only update the element.
#[derive(Clone, Default)]
pub struct TextAreaEditor {
    text: Mutable<String>,
    preferences: Mutable<Preferences>,
}

impl TextAreaEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text_mutable(&self) -> &Mutable<String> {
        &self.text
    }

    pub fn preferences_mutable(&self) -> &Mutable<Preferences> {
        &self.preferences
    }
}

impl SourceEditor for TextAreaEditor {
    fn text(&self) -> String {
        self.text.get_cloned()
    }

    fn set_text(&mut self, text: &str) {
        self.text.set(text.to_owned());
    }

    fn refresh(&mut self, preferences: &Preferences) {
        self.preferences.set(*preferences);
    }
}
