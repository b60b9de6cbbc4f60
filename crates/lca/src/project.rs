//! Source texts and saved project snapshots.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use ulid::Ulid;

pub type ProjectId = Ulid;

/// The three editor panes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Markup,
    Style,
    Script,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [Self::Markup, Self::Style, Self::Script];

    /// Entry name inside the downloadable archive and the CLI project directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Markup => "index.html",
            Self::Style => "styles.css",
            Self::Script => "script.js",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Markup => "HTML",
            Self::Style => "CSS",
            Self::Script => "JS",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTexts {
    pub markup: String,
    pub style: String,
    pub script: String,
}

impl SourceTexts {
    pub fn new(
        markup: impl Into<String>,
        style: impl Into<String>,
        script: impl Into<String>,
    ) -> Self {
        Self {
            markup: markup.into(),
            style: style.into(),
            script: script.into(),
        }
    }

    pub fn get(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Markup => &self.markup,
            SourceKind::Style => &self.style,
            SourceKind::Script => &self.script,
        }
    }

    pub fn set(&mut self, kind: SourceKind, text: impl Into<String>) {
        let slot = match kind {
            SourceKind::Markup => &mut self.markup,
            SourceKind::Style => &mut self.style,
            SourceKind::Script => &mut self.script,
        };
        *slot = text.into();
    }

    pub fn is_empty(&self) -> bool {
        self.markup.is_empty() && self.style.is_empty() && self.script.is_empty()
    }
}

/// Saved snapshot of the three sources. Never mutated after creation.
///
/// Serialized with the field names `html`, `css`, `js` and `timestamp` so that
/// lists written before `id` existed still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    #[serde(rename = "html")]
    markup: String,
    #[serde(rename = "css")]
    style: String,
    #[serde(rename = "js")]
    script: String,
    #[serde(rename = "timestamp")]
    created_at: DateTime<Utc>,
    id: ProjectId,
}

impl Project {
    pub fn new(sources: SourceTexts, created_at: DateTime<Utc>) -> Self {
        let SourceTexts {
            markup,
            style,
            script,
        } = sources;
        Self {
            markup,
            style,
            script,
            created_at,
            id: Ulid::from_datetime(SystemTime::from(created_at)),
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn text(&self, kind: SourceKind) -> &str {
        match kind {
            SourceKind::Markup => &self.markup,
            SourceKind::Style => &self.style,
            SourceKind::Script => &self.script,
        }
    }

    pub fn sources(&self) -> SourceTexts {
        SourceTexts::new(&*self.markup, &*self.style, &*self.script)
    }
}

#[derive(Deserialize)]
struct StoredProject {
    html: String,
    css: String,
    js: String,
    timestamp: DateTime<Utc>,
    #[serde(default)]
    id: Option<ProjectId>,
}

/// Decodes a persisted project list.
///
/// Entries saved without an `id` get one derived from their timestamp and list
/// position, so the same list always yields the same ids.
pub fn decode_projects(json: &str) -> Result<Vec<Project>, serde_json::Error> {
    let stored: Vec<StoredProject> = serde_json::from_str(json)?;
    Ok(stored
        .into_iter()
        .enumerate()
        .map(|(position, stored)| {
            let id = stored.id.unwrap_or_else(|| {
                let millis = stored.timestamp.timestamp_millis().max(0) as u64;
                Ulid::from_parts(millis, position as u128)
            });
            Project {
                markup: stored.html,
                style: stored.css,
                script: stored.js,
                created_at: stored.timestamp,
                id,
            }
        })
        .collect())
}

pub fn encode_projects(projects: &[Project]) -> Result<String, serde_json::Error> {
    serde_json::to_string(projects)
}
