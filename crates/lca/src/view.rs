//! Host-side view collaborator: log panel, saved-project list, alerts and
//! page-level theming.

use crate::preferences::Preferences;
use crate::project::Project;
use crate::relay::LogLine;

pub trait PlaygroundView {
    fn clear_log(&mut self);

    fn append_log(&mut self, line: &LogLine);

    fn show_projects(&mut self, projects: &[Project]);

    /// Blocking acknowledgement, e.g. `window.alert`.
    fn notify(&mut self, message: &str);

    /// Page-level styling that is not owned by the editors (background, panel colours).
    fn apply_preferences(&mut self, preferences: &Preferences);
}

/// Remembers everything shown to it.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    pub log: Vec<LogLine>,
    pub log_clears: usize,
    pub projects: Vec<Project>,
    pub notifications: Vec<String>,
    pub preferences: Option<Preferences>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn log_texts(&self) -> Vec<&str> {
        self.log.iter().map(|line| line.text.as_str()).collect()
    }
}

impl PlaygroundView for RecordingView {
    fn clear_log(&mut self) {
        self.log.clear();
        self.log_clears += 1;
    }

    fn append_log(&mut self, line: &LogLine) {
        self.log.push(line.clone());
    }

    fn show_projects(&mut self, projects: &[Project]) {
        self.projects = projects.to_vec();
    }

    fn notify(&mut self, message: &str) {
        self.notifications.push(message.to_owned());
    }

    fn apply_preferences(&mut self, preferences: &Preferences) {
        self.preferences = Some(*preferences);
    }
}
