//! The project directory: one file per source plus the preview.

use std::fs;
use std::io::ErrorKind;

use anyhow::{Context, Result};
use lca::clock::Clock;
use lca::editor::{BufferEditor, Editors};
use lca::platform::cli::{FileStore, FileSurface};
use lca::view::RecordingView;
use lca::{Playground, SourceKind, SourceTexts};

use crate::config::Paths;

pub type CliPlayground<C> = Playground<BufferEditor, FileStore, FileSurface, RecordingView, C>;

pub struct Workspace {
    paths: Paths,
}

impl Workspace {
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Missing source files read as empty.
    pub fn read_sources(&self) -> Result<SourceTexts> {
        let mut sources = SourceTexts::default();
        for kind in SourceKind::ALL {
            let path = self.paths.project_dir.join(kind.file_name());
            match fs::read_to_string(&path) {
                Ok(text) => sources.set(kind, text),
                Err(error) if error.kind() == ErrorKind::NotFound => {}
                Err(error) => {
                    return Err(error).with_context(|| format!("Failed to read {}", path.display()));
                }
            }
        }
        Ok(sources)
    }

    pub fn write_sources(&self, sources: &SourceTexts) -> Result<()> {
        fs::create_dir_all(&self.paths.project_dir).with_context(|| {
            format!("Failed to create {}", self.paths.project_dir.display())
        })?;
        for kind in SourceKind::ALL {
            let path = self.paths.project_dir.join(kind.file_name());
            fs::write(&path, sources.get(kind))
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        Ok(())
    }

    /// A playground whose editors hold the files' current contents.
    pub fn open<C: Clock>(&self, clock: C) -> Result<CliPlayground<C>> {
        let sources = self.read_sources()?;
        Ok(Playground::init(
            Editors::from_texts(&sources),
            FileStore::new(&self.paths.store_dir),
            FileSurface::in_dir(&self.paths.project_dir),
            RecordingView::new(),
            clock,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn workspace(dir: &Path) -> Workspace {
        Workspace::new(Paths {
            project_dir: dir.join("project"),
            store_dir: dir.join("store"),
            config_file: None,
        })
    }

    #[test]
    fn missing_files_read_as_empty_sources() {
        let dir = tempfile::tempdir().unwrap();
        assert!(workspace(dir.path()).read_sources().unwrap().is_empty());
    }

    #[test]
    fn sources_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = workspace(dir.path());
        let sources = SourceTexts::new("<p>hi</p>", "p{color:red}", "console.log('a', 1)");
        workspace.write_sources(&sources).unwrap();

        assert_eq!(workspace.read_sources().unwrap(), sources);
        assert_eq!(
            fs::read_to_string(dir.path().join("project").join("styles.css")).unwrap(),
            "p{color:red}"
        );
    }
}
