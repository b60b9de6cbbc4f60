//! User preferences and their persisted form.
//!
//! Every key is stored as plain text so the values stay readable in the
//! browser's storage inspector: `dark`, `16`, `true`.

use std::fmt;
use std::str::FromStr;

use crate::error::StoreError;
use crate::store::{KeyValueStore, keys};

pub const DEFAULT_FONT_SIZE_PX: u32 = 16;
pub const MIN_FONT_SIZE_PX: u32 = 8;
pub const MAX_FONT_SIZE_PX: u32 = 72;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Colour scheme name handed to the editors.
    pub fn editor_theme(self) -> &'static str {
        match self {
            Self::Dark => "monokai",
            Self::Light => "default",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown theme `{0}` (expected `dark` or `light`)")]
pub struct UnknownTheme(pub String);

impl FromStr for Theme {
    type Err = UnknownTheme;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "dark" => Ok(Self::Dark),
            "light" => Ok(Self::Light),
            other => Err(UnknownTheme(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preferences {
    pub theme: Theme,
    pub font_size_px: u32,
    pub auto_run: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Dark,
            font_size_px: DEFAULT_FONT_SIZE_PX,
            auto_run: true,
        }
    }
}

impl Preferences {
    pub fn clamp_font_size(px: u32) -> u32 {
        px.clamp(MIN_FONT_SIZE_PX, MAX_FONT_SIZE_PX)
    }

    pub fn with_theme(self, theme: Theme) -> Self {
        Self { theme, ..self }
    }

    pub fn with_font_size(self, px: u32) -> Self {
        Self {
            font_size_px: Self::clamp_font_size(px),
            ..self
        }
    }

    pub fn with_auto_run(self, auto_run: bool) -> Self {
        Self { auto_run, ..self }
    }

    /// Reads all three keys, falling back to the default for each one that is
    /// absent or unparsable.
    pub fn load(store: &impl KeyValueStore) -> Self {
        let defaults = Self::default();
        let theme = store
            .get(keys::THEME)
            .and_then(|value| value.parse().ok())
            .unwrap_or(defaults.theme);
        let font_size_px = store
            .get(keys::FONT_SIZE)
            .and_then(|value| value.trim().parse::<u32>().ok())
            .map(Self::clamp_font_size)
            .unwrap_or(defaults.font_size_px);
        // Only an explicit "false" turns auto-run off.
        let auto_run = store
            .get(keys::AUTO_RUN)
            .is_none_or(|value| value != "false");
        Self {
            theme,
            font_size_px,
            auto_run,
        }
    }

    pub fn persist_theme(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
        store.set(keys::THEME, self.theme.as_str())
    }

    pub fn persist_font_size(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
        store.set(keys::FONT_SIZE, &self.font_size_px.to_string())
    }

    pub fn persist_auto_run(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
        store.set(keys::AUTO_RUN, if self.auto_run { "true" } else { "false" })
    }

    pub fn persist(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
        self.persist_theme(store)?;
        self.persist_font_size(store)?;
        self.persist_auto_run(store)
    }
}
