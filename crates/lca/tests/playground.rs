//! End-to-end flows through the playground with in-memory collaborators.
//!
//! No script engine runs here: the tests post the envelopes the sandbox shim
//! would post, stamped with the run id found in the loaded document.

use chrono::{TimeZone, Utc};
use lca::clock::FixedClock;
use lca::editor::{BufferEditor, Editors, SourceEditor};
use lca::protocol::{RelayMessage, RunId, Severity};
use lca::relay::{self, LogEvent};
use lca::sandbox::{EXECUTION_ERROR_LABEL, RecordingSurface};
use lca::store::{KeyValueStore, MemoryStore, keys};
use lca::view::RecordingView;
use lca::{Playground, SourceKind, SourceTexts};
use serde_json::json;

type TestPlayground<'a> =
    Playground<BufferEditor, &'a mut MemoryStore, RecordingSurface, RecordingView, &'a FixedClock>;

fn clock() -> FixedClock {
    FixedClock::new(Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap())
}

fn open<'a>(store: &'a mut MemoryStore, clock: &'a FixedClock) -> TestPlayground<'a> {
    Playground::init(
        Editors::default(),
        store,
        RecordingSurface::new(),
        RecordingView::new(),
        clock,
    )
}

/// The run id the shim in the current preview document stamps on messages.
fn shim_run(playground: &TestPlayground<'_>) -> RunId {
    let document = playground.surface().current().unwrap();
    let start = document.find("run: ").unwrap() + "run: ".len();
    let digits: String = document[start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    RunId(digits.parse().unwrap())
}

/// Envelope as it arrives over the wire.
fn post(run: RunId, kind: &str, data: serde_json::Value) -> LogEvent {
    let wire = json!({ "channel": "lca-playground", "run": run.0, "type": kind, "data": data });
    let message: RelayMessage = serde_json::from_value(wire).unwrap();
    assert!(message.is_ours());
    message.into()
}

fn set_sources(playground: &mut TestPlayground<'_>, sources: &SourceTexts) {
    playground.editors_mut().set_texts(sources);
}

#[test]
fn concrete_scenario_logs_one_line_and_renders_red_paragraph() {
    let (mut store, clock) = (MemoryStore::new(), clock());
    let mut playground = open(&mut store, &clock);
    set_sources(
        &mut playground,
        &SourceTexts::new("<p>hi</p>", "p{color:red}", "console.log('a', 1)"),
    );

    playground.run();
    let run = shim_run(&playground);
    playground.accept_relay(post(run, "log", json!(["a", 1])));

    assert_eq!(playground.view().log_texts(), ["a 1"]);
    let document = playground.surface().current().unwrap();
    assert!(document.contains("p{color:red}"));
    assert!(document.contains("<p>hi</p>"));
}

#[test]
fn two_logs_arrive_as_two_lines_in_call_order() {
    let (mut store, clock) = (MemoryStore::new(), clock());
    let mut playground = open(&mut store, &clock);
    playground.run();
    let run = shim_run(&playground);

    let (sender, mut receiver) = relay::channel();
    sender.send(post(run, "log", json!(["first"])));
    sender.send(post(run, "log", json!(["second"])));
    assert_eq!(playground.pump_relay(&mut receiver), 2);

    assert_eq!(playground.view().log_texts(), ["first", "second"]);
    assert!(playground.log_lines().iter().all(|line| !line.is_error()));
}

#[test]
fn synchronous_throw_is_one_error_line() {
    let (mut store, clock) = (MemoryStore::new(), clock());
    let mut playground = open(&mut store, &clock);
    set_sources(&mut playground, &SourceTexts::new("", "", "throw new Error('boom')"));
    playground.run();
    let run = shim_run(&playground);

    playground.accept_relay(post(run, "error", json!([EXECUTION_ERROR_LABEL, "boom"])));

    let lines = playground.log_lines();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].is_error());
    assert_eq!(lines[0].text, "Execution Error: boom");
}

#[test]
fn save_then_load_restores_sources_byte_for_byte() {
    let sources = SourceTexts::new("<p>\tü</p>\r\n", "p { color: red; }\n", "console.log(\"😀\")\n");
    let (mut store, clock) = (MemoryStore::new(), clock());
    {
        let mut playground = open(&mut store, &clock);
        set_sources(&mut playground, &sources);
        playground.save();
    }

    let mut playground = open(&mut store, &clock);
    playground.new_project();
    assert!(playground.load(0));
    assert_eq!(playground.sources(), sources);
    assert!(playground.surface().current().unwrap().contains("p { color: red; }"));
}

#[test]
fn out_of_range_load_changes_nothing() {
    let (mut store, clock) = (MemoryStore::new(), clock());
    let mut playground = open(&mut store, &clock);
    set_sources(&mut playground, &SourceTexts::new("<b>keep</b>", "", ""));
    playground.save();
    playground.run();
    let run = shim_run(&playground);
    playground.accept_relay(post(run, "log", json!(["still here"])));

    assert!(!playground.load(1));
    assert!(!playground.load(usize::MAX));
    assert_eq!(playground.sources().markup, "<b>keep</b>");
    assert_eq!(playground.view().log_texts(), ["still here"]);
    assert_eq!(playground.surface().load_count(), 1);
}

#[test]
fn font_size_survives_reload() {
    let (mut store, clock) = (MemoryStore::new(), clock());
    open(&mut store, &clock).change_font_size(21);
    assert_eq!(store.get(keys::FONT_SIZE).as_deref(), Some("21"));

    let playground = open(&mut store, &clock);
    assert_eq!(playground.preferences().font_size_px, 21);
}

#[test]
fn auto_run_decides_whether_an_edit_runs() {
    let (mut store, clock) = (MemoryStore::new(), clock());
    let mut playground = open(&mut store, &clock);

    playground.editors_mut().script.type_text("1 + 1");
    assert!(playground.source_changed(SourceKind::Script).is_some());
    assert_eq!(playground.surface().load_count(), 1);

    playground.toggle_auto_run(false);
    playground.editors_mut().style.type_text("p{}");
    assert!(playground.source_changed(SourceKind::Style).is_none());
    assert_eq!(playground.surface().load_count(), 1);
}

#[test]
fn loading_a_project_runs_once_even_with_auto_run() {
    let (mut store, clock) = (MemoryStore::new(), clock());
    let mut playground = open(&mut store, &clock);
    playground.editors_mut().markup.set_text("<i>x</i>");
    playground.save();

    assert!(playground.load(0));
    assert_eq!(playground.surface().load_count(), 1);
}

#[test]
fn messages_from_a_superseded_run_never_reach_the_log() {
    let (mut store, clock) = (MemoryStore::new(), clock());
    let mut playground = open(&mut store, &clock);
    playground.run();
    let first = shim_run(&playground);
    playground.run();
    let second = shim_run(&playground);

    playground.accept_relay(post(first, "log", json!(["old"])));
    playground.accept_relay(post(second, "error", json!(["new"])));
    assert_eq!(playground.view().log_texts(), ["new"]);
}

#[test]
fn projects_saved_without_ids_still_load() {
    let legacy = json!([
        { "html": "<p>old</p>", "css": "", "js": "console.log(1)", "timestamp": "2023-01-01T00:00:00.000Z" }
    ]);
    let mut store = MemoryStore::new();
    store.set(keys::PROJECTS, &legacy.to_string()).unwrap();

    let clock = clock();
    let mut playground = open(&mut store, &clock);
    assert_eq!(playground.view().projects.len(), 1);
    assert!(playground.load(0));
    assert_eq!(playground.sources().markup, "<p>old</p>");
}

#[test]
fn severities_map_to_wire_names() {
    assert_eq!(post(RunId(1), "log", json!([])).severity, Severity::Log);
    assert_eq!(post(RunId(1), "error", json!([])).severity, Severity::Error);
}
