//! Playground controller: binds user actions to the editors, the sandbox, the
//! log relay and the persistent store.

use crate::archive::{self, Archive};
use crate::clock::{Clock, SystemClock};
use crate::editor::{Editors, SourceEditor};
use crate::error::ArchiveError;
use crate::preferences::{Preferences, Theme};
use crate::project::{Project, ProjectId, SourceKind, SourceTexts};
use crate::protocol::RunId;
use crate::relay::{LogEvent, LogLine, LogRelay, RelayReceiver};
use crate::sandbox::{RenderingSurface, SandboxExecutor};
use crate::store::{self, KeyValueStore};
use crate::view::PlaygroundView;

pub const SAVED_MESSAGE: &str = "Project saved successfully!";

pub struct Playground<E, S, R, V, C = SystemClock> {
    editors: Editors<E>,
    store: S,
    executor: SandboxExecutor<R>,
    view: V,
    clock: C,
    relay: LogRelay,
    preferences: Preferences,
    projects: Vec<Project>,
}

impl<E, S, R, V, C> Playground<E, S, R, V, C>
where
    E: SourceEditor,
    S: KeyValueStore,
    R: RenderingSurface,
    V: PlaygroundView,
    C: Clock,
{
    /// Loads preferences (defaults for anything missing), applies and persists
    /// them, and shows the saved project list.
    pub fn init(editors: Editors<E>, store: S, surface: R, view: V, clock: C) -> Self {
        let preferences = Preferences::load(&store);
        let projects = store::load_projects(&store);
        let mut playground = Self {
            editors,
            store,
            executor: SandboxExecutor::new(surface),
            view,
            clock,
            relay: LogRelay::new(),
            preferences,
            projects,
        };
        if let Err(error) = playground.preferences.persist(&mut playground.store) {
            log::warn!("Failed to store preferences: {error}");
        }
        playground.apply_preferences();
        playground.view.show_projects(&playground.projects);
        log::debug!(
            "Playground ready with {} saved project(s), {:?}",
            playground.projects.len(),
            playground.preferences
        );
        playground
    }

    /// Loads the current sources into a fresh sandbox document. Failures of
    /// the user code only ever show up as error lines in the log.
    pub fn run(&mut self) -> RunId {
        let sources = self.editors.texts();
        self.view.clear_log();
        let run = self.executor.execute(&sources);
        self.relay.begin(run);
        run
    }

    /// Called by the host whenever the user edits one of the sources.
    pub fn source_changed(&mut self, kind: SourceKind) -> Option<RunId> {
        if !self.preferences.auto_run {
            return None;
        }
        log::debug!("Auto-run after {} edit", kind.label());
        Some(self.run())
    }

    /// Appends a snapshot of the current sources to the saved list and returns
    /// its position.
    ///
    /// The list is re-read from the store first so projects saved from
    /// another tab since start-up are kept. Projects this session could not
    /// store stay in the list and are written along with the new one.
    pub fn save(&mut self) -> usize {
        let project = Project::new(self.editors.texts(), self.clock.now());
        let mut projects = store::load_projects(&self.store);
        for kept in &self.projects {
            if !projects.iter().any(|stored| stored.id() == kept.id()) {
                projects.push(kept.clone());
            }
        }
        projects.push(project);
        let index = projects.len() - 1;

        let outcome = store::persist_projects(&mut self.store, &projects);
        self.projects = projects;
        self.view.show_projects(&self.projects);
        match outcome {
            Ok(()) => self.view.notify(SAVED_MESSAGE),
            Err(error) => {
                log::warn!("Failed to store saved projects: {error}");
                self.view
                    .notify(&format!("Project kept for this session only: {error}"));
            }
        }
        index
    }

    /// Restores the project at `index` and runs it. Out-of-range is a no-op.
    pub fn load(&mut self, index: usize) -> bool {
        let Some(sources) = self.projects.get(index).map(Project::sources) else {
            log::debug!("No saved project at position {index}");
            return false;
        };
        self.restore(&sources);
        true
    }

    pub fn load_by_id(&mut self, id: ProjectId) -> bool {
        let Some(sources) = self
            .projects
            .iter()
            .find(|project| project.id() == id)
            .map(Project::sources)
        else {
            log::debug!("No saved project with id {id}");
            return false;
        };
        self.restore(&sources);
        true
    }

    /// Clears the sources, the log and the preview. Saved projects are untouched.
    pub fn new_project(&mut self) {
        self.editors.set_texts(&SourceTexts::default());
        self.view.clear_log();
        let run = self.executor.blank();
        self.relay.begin(run);
    }

    pub fn change_theme(&mut self, theme: Theme) {
        self.preferences = self.preferences.with_theme(theme);
        if let Err(error) = self.preferences.persist_theme(&mut self.store) {
            log::warn!("Failed to store theme: {error}");
        }
        self.apply_preferences();
    }

    pub fn change_font_size(&mut self, px: u32) {
        self.preferences = self.preferences.with_font_size(px);
        if let Err(error) = self.preferences.persist_font_size(&mut self.store) {
            log::warn!("Failed to store font size: {error}");
        }
        self.apply_preferences();
    }

    pub fn toggle_auto_run(&mut self, enabled: bool) {
        self.preferences = self.preferences.with_auto_run(enabled);
        if let Err(error) = self.preferences.persist_auto_run(&mut self.store) {
            log::warn!("Failed to store auto-run preference: {error}");
        }
        self.apply_preferences();
    }

    /// The settings form's save button: all three preferences at once.
    pub fn apply_settings(&mut self, preferences: Preferences) {
        self.change_theme(preferences.theme);
        self.change_font_size(preferences.font_size_px);
        self.toggle_auto_run(preferences.auto_run);
    }

    /// Hands one relayed console call to the log view, unless it belongs to
    /// a superseded run.
    pub fn accept_relay(&mut self, event: LogEvent) {
        if let Some(line) = self.relay.accept(event) {
            self.view.append_log(line);
        }
    }

    /// Accepts everything already queued on `receiver`; returns how many
    /// events were taken off the queue.
    pub fn pump_relay(&mut self, receiver: &mut RelayReceiver) -> usize {
        let events = receiver.drain_ready();
        let count = events.len();
        for event in events {
            self.accept_relay(event);
        }
        count
    }

    pub fn download(&self) -> Result<Archive, ArchiveError> {
        archive::build_archive(&self.editors.texts(), self.clock.now())
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn log_lines(&self) -> &[LogLine] {
        self.relay.lines()
    }

    pub fn current_run(&self) -> RunId {
        self.relay.current_run()
    }

    pub fn sources(&self) -> SourceTexts {
        self.editors.texts()
    }

    pub fn editors(&self) -> &Editors<E> {
        &self.editors
    }

    /// Direct editor access for the host. Changing text through here is not a
    /// user edit; call [`Self::source_changed`] to get auto-run behaviour.
    pub fn editors_mut(&mut self) -> &mut Editors<E> {
        &mut self.editors
    }

    pub fn surface(&self) -> &R {
        self.executor.surface()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn restore(&mut self, sources: &SourceTexts) {
        self.editors.set_texts(sources);
        self.run();
    }

    fn apply_preferences(&mut self) {
        self.editors.refresh_all(&self.preferences);
        self.view.apply_preferences(&self.preferences);
    }
}
