//! Subcommand implementations. Each one opens the workspace's playground,
//! performs one user action and reports on `out`.

use std::fs;
use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use lca::Theme;
use lca::clock::Clock;
use lca::controller::SAVED_MESSAGE;
use lca::protocol::{RelayMessage, RunId};
use lca::relay::{LogEvent, LogRelay};

use crate::workspace::Workspace;

pub fn run(workspace: &Workspace, clock: &dyn Clock, out: &mut impl Write) -> Result<()> {
    let mut playground = workspace.open(clock)?;
    let run = playground.run();
    let surface = playground.surface();
    if surface.written() == 0 {
        bail!("Failed to write preview {}", surface.path().display());
    }
    writeln!(out, "Run {run}: open {} in a browser", surface.path().display())?;
    Ok(())
}

pub fn save(workspace: &Workspace, clock: &dyn Clock, out: &mut impl Write) -> Result<()> {
    let mut playground = workspace.open(clock)?;
    let index = playground.save();
    match playground.view().notifications.last() {
        Some(message) if message == SAVED_MESSAGE => {
            writeln!(out, "{message} (project {})", index + 1)?;
            Ok(())
        }
        Some(message) => bail!("{message}"),
        None => bail!("Project was not saved"),
    }
}

pub fn list(workspace: &Workspace, clock: &dyn Clock, out: &mut impl Write) -> Result<()> {
    let playground = workspace.open(clock)?;
    if playground.projects().is_empty() {
        writeln!(out, "No saved projects")?;
    }
    for (index, project) in playground.projects().iter().enumerate() {
        writeln!(
            out,
            "Project {}  {}  {}",
            index + 1,
            project.created_at(),
            project.id()
        )?;
    }
    Ok(())
}

/// `number` as printed by [`list`], starting at 1.
pub fn load(
    workspace: &Workspace,
    clock: &dyn Clock,
    number: usize,
    out: &mut impl Write,
) -> Result<()> {
    let mut playground = workspace.open(clock)?;
    let loaded = number
        .checked_sub(1)
        .is_some_and(|index| playground.load(index));
    if !loaded {
        bail!(
            "No saved project {number} ({} saved)",
            playground.projects().len()
        );
    }
    workspace.write_sources(&playground.sources())?;
    writeln!(
        out,
        "Loaded project {number} into {}",
        workspace.paths().project_dir.display()
    )?;
    Ok(())
}

pub fn new(workspace: &Workspace, clock: &dyn Clock, out: &mut impl Write) -> Result<()> {
    let mut playground = workspace.open(clock)?;
    playground.new_project();
    workspace.write_sources(&playground.sources())?;
    writeln!(out, "Cleared {}", workspace.paths().project_dir.display())?;
    Ok(())
}

pub fn export(
    workspace: &Workspace,
    clock: &dyn Clock,
    output: Option<PathBuf>,
    out: &mut impl Write,
) -> Result<()> {
    let playground = workspace.open(clock)?;
    let archive = playground.download()?;
    let path = output.unwrap_or_else(|| workspace.paths().project_dir.join(archive.file_name));
    fs::write(&path, &archive.bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    writeln!(out, "Wrote {} ({} bytes)", path.display(), archive.bytes.len())?;
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SettingsUpdate {
    pub theme: Option<Theme>,
    pub font_size: Option<u32>,
    pub auto_run: Option<bool>,
}

impl SettingsUpdate {
    fn is_empty(&self) -> bool {
        self.theme.is_none() && self.font_size.is_none() && self.auto_run.is_none()
    }
}

pub fn settings(
    workspace: &Workspace,
    clock: &dyn Clock,
    update: SettingsUpdate,
    out: &mut impl Write,
) -> Result<()> {
    let mut playground = workspace.open(clock)?;
    if !update.is_empty() {
        let current = *playground.preferences();
        let mut updated = current;
        if let Some(theme) = update.theme {
            updated = updated.with_theme(theme);
        }
        if let Some(px) = update.font_size {
            updated = updated.with_font_size(px);
        }
        if let Some(auto_run) = update.auto_run {
            updated = updated.with_auto_run(auto_run);
        }
        playground.apply_settings(updated);
    }

    let preferences = playground.preferences();
    writeln!(out, "theme      {}", preferences.theme)?;
    writeln!(out, "font-size  {}px", preferences.font_size_px)?;
    writeln!(out, "auto-run   {}", preferences.auto_run)?;
    Ok(())
}

/// Renders relay envelopes, one JSON object per input line.
///
/// With `only_run` set, everything else is stale. Without it, each newer run
/// supersedes the previous ones, as in the browser.
pub fn relay(
    input: impl BufRead,
    only_run: Option<u64>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<()> {
    let mut relay = LogRelay::new();
    if let Some(run) = only_run {
        relay.begin(RunId(run));
    }

    for (number, line) in input.lines().enumerate() {
        let line = line.context("Failed to read relay input")?;
        if line.trim().is_empty() {
            continue;
        }
        let message: RelayMessage = match serde_json::from_str(&line) {
            Ok(message) => message,
            Err(error) => {
                log::warn!("Skipping line {}: {error}", number + 1);
                continue;
            }
        };
        if !message.is_ours() {
            log::debug!("Skipping line {}: foreign channel `{}`", number + 1, message.channel);
            continue;
        }

        let event = LogEvent::from(message);
        if only_run.is_none() && event.run > relay.current_run() {
            relay.begin(event.run);
        }
        if let Some(line) = relay.accept(event) {
            if line.is_error() {
                writeln!(err, "{line}")?;
            } else {
                writeln!(out, "{line}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Paths;
    use chrono::{TimeZone, Utc};
    use lca::clock::FixedClock;
    use lca::{SourceKind, SourceTexts};
    use std::path::Path;

    fn workspace(dir: &Path) -> Workspace {
        Workspace::new(Paths {
            project_dir: dir.join("project"),
            store_dir: dir.join("store"),
            config_file: None,
        })
    }

    fn clock() -> FixedClock {
        FixedClock::new(Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap())
    }

    fn output(out: Vec<u8>) -> String {
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn run_writes_preview_document() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = workspace(dir.path());
        workspace
            .write_sources(&SourceTexts::new("<p>hi</p>", "p{color:red}", "console.log('a', 1)"))
            .unwrap();

        let mut out = Vec::new();
        run(&workspace, &clock(), &mut out).unwrap();

        let preview = fs::read_to_string(dir.path().join("project").join("preview.html")).unwrap();
        assert!(preview.contains("<p>hi</p>"));
        assert!(preview.contains("console.log('a', 1)"));
        assert!(output(out).starts_with("Run #1:"));
    }

    #[test]
    fn save_list_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = workspace(dir.path());
        let clock = clock();
        let sources = SourceTexts::new("<b>x</b>", "b{}", "console.log(1)");
        workspace.write_sources(&sources).unwrap();

        let mut out = Vec::new();
        save(&workspace, &clock, &mut out).unwrap();
        assert_eq!(output(out), "Project saved successfully! (project 1)\n");

        let mut out = Vec::new();
        list(&workspace, &clock, &mut out).unwrap();
        assert!(output(out).starts_with("Project 1  2024-03-04 05:06:07 UTC  "));

        new(&workspace, &clock, &mut Vec::new()).unwrap();
        assert!(workspace.read_sources().unwrap().is_empty());

        load(&workspace, &clock, 1, &mut Vec::new()).unwrap();
        assert_eq!(workspace.read_sources().unwrap(), sources);
    }

    #[test]
    fn load_out_of_range_leaves_files_alone() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = workspace(dir.path());
        workspace.write_sources(&SourceTexts::new("keep", "", "")).unwrap();

        assert!(load(&workspace, &clock(), 0, &mut Vec::new()).is_err());
        assert!(load(&workspace, &clock(), 3, &mut Vec::new()).is_err());
        assert_eq!(workspace.read_sources().unwrap().get(SourceKind::Markup), "keep");
    }

    #[test]
    fn settings_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = workspace(dir.path());
        let update = SettingsUpdate {
            theme: Some(Theme::Light),
            font_size: Some(100),
            ..SettingsUpdate::default()
        };
        settings(&workspace, &clock(), update, &mut Vec::new()).unwrap();

        let mut out = Vec::new();
        settings(&workspace, &clock(), SettingsUpdate::default(), &mut out).unwrap();
        assert_eq!(
            output(out),
            "theme      light\nfont-size  72px\nauto-run   true\n"
        );
    }

    #[test]
    fn export_writes_archive_next_to_sources() {
        let dir = tempfile::tempdir().unwrap();
        let workspace = workspace(dir.path());
        workspace.write_sources(&SourceTexts::new("a", "b", "c")).unwrap();

        export(&workspace, &clock(), None, &mut Vec::new()).unwrap();
        assert!(dir.path().join("project").join("lca-playground-project.tar.zst").is_file());
    }

    #[test]
    fn relay_follows_the_newest_run_and_splits_streams() {
        let input = [
            r#"{"channel":"lca-playground","run":1,"type":"log","data":["old"]}"#,
            r#"{"channel":"lca-playground","run":2,"type":"log","data":["a",1]}"#,
            r#"{"channel":"lca-playground","run":1,"type":"log","data":["late"]}"#,
            r#"{"channel":"other","run":2,"type":"log","data":["foreign"]}"#,
            "not json",
            r#"{"channel":"lca-playground","run":2,"type":"error","data":["Execution Error:","boom"]}"#,
        ]
        .join("\n");

        let (mut out, mut err) = (Vec::new(), Vec::new());
        relay(input.as_bytes(), None, &mut out, &mut err).unwrap();
        assert_eq!(output(out), "old\na 1\n");
        assert_eq!(output(err), "Execution Error: boom\n");
    }

    #[test]
    fn relay_can_pin_one_run() {
        let input = [
            r#"{"channel":"lca-playground","run":1,"type":"log","data":["one"]}"#,
            r#"{"channel":"lca-playground","run":2,"type":"log","data":["two"]}"#,
        ]
        .join("\n");

        let mut out = Vec::new();
        relay(input.as_bytes(), Some(1), &mut out, &mut Vec::new()).unwrap();
        assert_eq!(output(out), "one\n");
    }
}
