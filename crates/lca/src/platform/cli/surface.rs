//! Preview file standing in for the sandboxed frame: each run overwrites it,
//! and opening it in a browser executes the composed document.

use std::fs;
use std::path::{Path, PathBuf};

use crate::sandbox::RenderingSurface;

pub const PREVIEW_FILE_NAME: &str = "preview.html";

#[derive(Debug, Clone)]
pub struct FileSurface {
    path: PathBuf,
    written: usize,
}

impl FileSurface {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            written: 0,
        }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(PREVIEW_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Documents successfully written so far.
    pub fn written(&self) -> usize {
        self.written
    }
}

impl RenderingSurface for FileSurface {
    fn replace_document(&mut self, document: &str) {
        let result = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::write(&self.path, document));
        match result {
            Ok(()) => self.written += 1,
            Err(error) => log::error!("Failed to write preview {}: {error}", self.path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_document_replaces_the_previous_one() {
        let dir = tempfile::tempdir().unwrap();
        let mut surface = FileSurface::in_dir(&dir.path().join("out"));
        surface.replace_document("<p>first</p>");
        surface.replace_document("");

        assert_eq!(fs::read_to_string(surface.path()).unwrap(), "");
        assert_eq!(surface.written(), 2);
    }
}
