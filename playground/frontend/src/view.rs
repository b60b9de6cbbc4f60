use lca::Preferences;
use lca::Project;
use lca::relay::LogLine;
use lca::view::PlaygroundView;
use lca::zoon::{eprintln, *};

/// Reactive state behind the log panel, the saved-project list and the page
/// theme.
#[derive(Clone, Default)]
pub struct BrowserView {
    pub log: MutableVec<LogLine>,
    pub projects: MutableVec<Project>,
    pub preferences: Mutable<Preferences>,
}

impl PlaygroundView for BrowserView {
    fn clear_log(&mut self) {
        self.log.lock_mut().clear();
    }

    fn append_log(&mut self, line: &LogLine) {
        self.log.lock_mut().push_cloned(line.clone());
    }

    fn show_projects(&mut self, projects: &[Project]) {
        self.projects.lock_mut().replace_cloned(projects.to_vec());
    }

    fn notify(&mut self, message: &str) {
        let alerted = web_sys::window().map(|window| window.alert_with_message(message));
        if !matches!(alerted, Some(Ok(()))) {
            eprintln!("Failed to show alert: {message}");
        }
    }

    fn apply_preferences(&mut self, preferences: &Preferences) {
        self.preferences.set_neq(*preferences);
    }
}
