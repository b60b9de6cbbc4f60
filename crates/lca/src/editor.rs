//! Text editor seam.
//!
//! The playground only needs to read and replace an editor's text and ask it
//! to redraw after a preference change. Change notifications flow the other
//! way: the host wires each editor's "user edited" event to
//! [`crate::Playground::source_changed`]. A programmatic `set_text` is not a
//! user edit.

use crate::preferences::Preferences;
use crate::project::{SourceKind, SourceTexts};

pub trait SourceEditor {
    fn text(&self) -> String;

    fn set_text(&mut self, text: &str);

    /// Redraw with the given theme and font size.
    fn refresh(&mut self, preferences: &Preferences);
}

/// Editor backed by a plain string; used by the CLI and by tests.
#[derive(Debug, Clone, Default)]
pub struct BufferEditor {
    text: String,
    applied: Option<Preferences>,
    refresh_count: usize,
}

impl BufferEditor {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Simulates a keystroke-level edit. The caller still has to notify the
    /// playground, just like a real editor's change event.
    pub fn type_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    pub fn applied_preferences(&self) -> Option<&Preferences> {
        self.applied.as_ref()
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_count
    }
}

impl SourceEditor for BufferEditor {
    fn text(&self) -> String {
        self.text.clone()
    }

    fn set_text(&mut self, text: &str) {
        text.clone_into(&mut self.text);
    }

    fn refresh(&mut self, preferences: &Preferences) {
        self.applied = Some(*preferences);
        self.refresh_count += 1;
    }
}

/// One editor per source kind.
#[derive(Debug, Clone, Default)]
pub struct Editors<E> {
    pub markup: E,
    pub style: E,
    pub script: E,
}

impl<E> Editors<E> {
    pub fn new(markup: E, style: E, script: E) -> Self {
        Self {
            markup,
            style,
            script,
        }
    }

    pub fn get(&self, kind: SourceKind) -> &E {
        match kind {
            SourceKind::Markup => &self.markup,
            SourceKind::Style => &self.style,
            SourceKind::Script => &self.script,
        }
    }

    pub fn get_mut(&mut self, kind: SourceKind) -> &mut E {
        match kind {
            SourceKind::Markup => &mut self.markup,
            SourceKind::Style => &mut self.style,
            SourceKind::Script => &mut self.script,
        }
    }
}

impl<E: SourceEditor> Editors<E> {
    pub fn texts(&self) -> SourceTexts {
        SourceTexts {
            markup: self.markup.text(),
            style: self.style.text(),
            script: self.script.text(),
        }
    }

    pub fn set_texts(&mut self, sources: &SourceTexts) {
        for kind in SourceKind::ALL {
            self.get_mut(kind).set_text(sources.get(kind));
        }
    }

    pub fn refresh_all(&mut self, preferences: &Preferences) {
        for kind in SourceKind::ALL {
            self.get_mut(kind).refresh(preferences);
        }
    }
}

impl Editors<BufferEditor> {
    pub fn from_texts(sources: &SourceTexts) -> Self {
        Self::new(
            BufferEditor::new(&*sources.markup),
            BufferEditor::new(&*sources.style),
            BufferEditor::new(&*sources.script),
        )
    }
}
