//! Sandboxed executor.
//!
//! Every run composes a standalone HTML document from the three sources and
//! replaces the whole content of the isolated surface with it. The document's
//! only script is the user script wrapped in a closure that first swaps
//! `console.log`/`console.error` for a shim posting each call to the parent
//! window, then runs the user code inside `try`/`catch`.

use std::borrow::Cow;

use crate::project::SourceTexts;
use crate::protocol::{self, RunId, Severity};

/// Label of the error line reported for a synchronous exception.
pub const EXECUTION_ERROR_LABEL: &str = "Execution Error:";

/// An isolated rendering context, e.g. a sandboxed iframe.
pub trait RenderingSurface {
    /// Discards the current document and loads `document` in its place.
    fn replace_document(&mut self, document: &str);
}

impl<R: RenderingSurface + ?Sized> RenderingSurface for &mut R {
    fn replace_document(&mut self, document: &str) {
        (**self).replace_document(document)
    }
}

/// Keeps every document it was asked to load.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    documents: Vec<String>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn current(&self) -> Option<&str> {
        self.documents.last().map(String::as_str)
    }

    pub fn load_count(&self) -> usize {
        self.documents.len()
    }
}

impl RenderingSurface for RecordingSurface {
    fn replace_document(&mut self, document: &str) {
        self.documents.push(document.to_owned());
    }
}

pub struct SandboxExecutor<R> {
    surface: R,
    last_run: RunId,
}

impl<R: RenderingSurface> SandboxExecutor<R> {
    pub fn new(surface: R) -> Self {
        Self {
            surface,
            last_run: RunId::default(),
        }
    }

    /// Loads a fresh document for `sources` and returns the id its shim stamps
    /// on every relayed message.
    pub fn execute(&mut self, sources: &SourceTexts) -> RunId {
        let run = self.issue_run();
        let document = compose_document(sources, run);
        log::debug!("Loading sandbox run {run} ({} bytes)", document.len());
        self.surface.replace_document(&document);
        run
    }

    /// Empties the surface. The returned id belongs to no document, so
    /// anything still in flight from the previous run is stale.
    pub fn blank(&mut self) -> RunId {
        let run = self.issue_run();
        self.surface.replace_document("");
        run
    }

    pub fn last_run(&self) -> RunId {
        self.last_run
    }

    pub fn surface(&self) -> &R {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut R {
        &mut self.surface
    }

    fn issue_run(&mut self) -> RunId {
        self.last_run = self.last_run.next();
        self.last_run
    }
}

pub fn compose_document(sources: &SourceTexts, run: RunId) -> String {
    let style = escape_closing_tag(&sources.style, "style");
    let script = escape_comment_open(escape_closing_tag(&sources.script, "script"));
    let channel = js_string(protocol::CHANNEL);
    let label = js_string(EXECUTION_ERROR_LABEL);
    let log = js_string(Severity::Log.as_str());
    let error = js_string(Severity::Error.as_str());

    let mut document = String::with_capacity(
        sources.markup.len() + style.len() + script.len() + SHIM_OVERHEAD,
    );
    document.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n");
    document.push_str(&style);
    document.push_str("\n</style>\n</head>\n<body>\n");
    document.push_str(&sources.markup);
    document.push_str("\n<script>\n(function () {\n");
    document.push_str(&format!(
        "  var relay = function (type, args) {{\n    window.parent.postMessage({{ {}: {channel}, {}: {}, {}: type, {}: args }}, \"*\");\n  }};\n",
        protocol::CHANNEL_FIELD,
        protocol::RUN_FIELD,
        run.0,
        protocol::TYPE_FIELD,
        protocol::DATA_FIELD,
    ));
    document.push_str("  var shim = Object.create(window.console);\n");
    document.push_str(&format!(
        "  shim.log = function () {{ relay({log}, Array.prototype.slice.call(arguments)); }};\n"
    ));
    document.push_str(&format!(
        "  shim.error = function () {{ relay({error}, Array.prototype.slice.call(arguments)); }};\n"
    ));
    document.push_str("  window.console = shim;\n  try {\n");
    document.push_str(&script);
    document.push_str("\n  } catch (error) {\n");
    document.push_str(&format!(
        "    window.console.error({label}, error != null && error.message !== undefined ? error.message : String(error));\n"
    ));
    document.push_str("  }\n})();\n</script>\n</body>\n</html>\n");
    document
}

const SHIM_OVERHEAD: usize = 1024;

fn js_string(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// Rewrites `</tag` (any letter case) as `<\/tag` so embedded text cannot
/// close its own element. Inside script strings and CSS both spellings mean
/// the same thing.
fn escape_closing_tag<'a>(text: &'a str, tag: &str) -> Cow<'a, str> {
    let needle = format!("</{tag}");
    let lowered = text.to_ascii_lowercase();
    if !lowered.contains(&needle) {
        return Cow::Borrowed(text);
    }
    let mut escaped = String::with_capacity(text.len() + 8);
    let mut copied_up_to = 0;
    for (index, _) in lowered.match_indices(&needle) {
        escaped.push_str(&text[copied_up_to..index]);
        escaped.push_str("<\\/");
        copied_up_to = index + 2;
    }
    escaped.push_str(&text[copied_up_to..]);
    Cow::Owned(escaped)
}

/// Rewrites `<!--` as `<\!--`. An unclosed comment opener inside a script
/// element switches the HTML parser into the escaped state, where a later
/// `<script>` in a string swallows the real closing tag.
fn escape_comment_open(text: Cow<'_, str>) -> Cow<'_, str> {
    if text.contains("<!--") {
        Cow::Owned(text.replace("<!--", "<\\!--"))
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(document: &str, needle: &str) -> usize {
        document
            .find(needle)
            .unwrap_or_else(|| panic!("`{needle}` missing from:\n{document}"))
    }

    #[test]
    fn style_goes_to_head_and_markup_to_body() {
        let sources = SourceTexts::new("<p>hi</p>", "p{color:red}", "console.log('a', 1)");
        let document = compose_document(&sources, RunId(1));

        let head_end = position(&document, "</head>");
        let body_start = position(&document, "<body>");
        assert!(position(&document, "p{color:red}") < head_end);
        assert!(position(&document, "<p>hi</p>") > body_start);
        assert!(position(&document, "console.log('a', 1)") > position(&document, "try {"));
        assert!(position(&document, "console.log('a', 1)") < position(&document, "catch (error)"));
    }

    #[test]
    fn shim_is_installed_before_user_script() {
        let sources = SourceTexts::new("", "", "console.error('x')");
        let document = compose_document(&sources, RunId(1));
        assert!(position(&document, "window.console = shim") < position(&document, "console.error('x')"));
        assert!(document.contains(r#"relay("log""#));
        assert!(document.contains(r#"relay("error""#));
    }

    #[test]
    fn run_id_and_channel_are_stamped_into_the_shim() {
        let document = compose_document(&SourceTexts::default(), RunId(42));
        assert!(document.contains(r#"channel: "lca-playground", run: 42, type: type, data: args"#));
    }

    #[test]
    fn exceptions_are_reported_with_fixed_label() {
        let document = compose_document(&SourceTexts::default(), RunId(1));
        assert!(document.contains(r#"window.console.error("Execution Error:", "#));
    }

    #[test]
    fn closing_script_tag_in_user_script_is_escaped() {
        let sources = SourceTexts::new("", "", "console.log('</script><b>x</b>', '</SCRIPT>')");
        let document = compose_document(&sources, RunId(1));
        assert!(document.contains(r"console.log('<\/script><b>x</b>', '<\/SCRIPT>')"));
        assert_eq!(document.matches("</script>").count(), 1);
    }

    #[test]
    fn comment_opener_in_user_script_is_escaped() {
        let sources = SourceTexts::new("", "", "console.log('<!--<script>', '</script>')");
        let document = compose_document(&sources, RunId(1));
        assert!(document.contains(r"console.log('<\!--<script>', '<\/script>')"));
        assert!(!document.contains("<!--"));
        assert_eq!(document.matches("</script>").count(), 1);
    }

    #[test]
    fn closing_style_tag_in_style_is_escaped() {
        let sources = SourceTexts::new("", "a{content:'</style>'}", "");
        let document = compose_document(&sources, RunId(1));
        assert!(document.contains(r"a{content:'<\/style>'}"));
        assert_eq!(document.matches("</style>").count(), 1);
    }

    #[test]
    fn markup_is_embedded_verbatim() {
        let markup = "<div><p>unclosed <b>bold</div>";
        let document = compose_document(&SourceTexts::new(markup, "", ""), RunId(1));
        assert!(document.contains(markup));
    }

    #[test]
    fn every_execution_replaces_the_whole_document() {
        let mut executor = SandboxExecutor::new(RecordingSurface::new());
        let first = executor.execute(&SourceTexts::new("<p>1</p>", "", ""));
        let second = executor.execute(&SourceTexts::new("<p>2</p>", "", ""));

        assert_eq!(first, RunId(1));
        assert_eq!(second, RunId(2));
        let surface = executor.surface();
        assert_eq!(surface.load_count(), 2);
        let current = surface.current().unwrap();
        assert!(current.contains("<p>2</p>"));
        assert!(!current.contains("<p>1</p>"));
    }

    #[test]
    fn blank_retires_the_current_run() {
        let mut executor = SandboxExecutor::new(RecordingSurface::new());
        let run = executor.execute(&SourceTexts::default());
        let blank = executor.blank();
        assert!(blank > run);
        assert_eq!(executor.surface().current(), Some(""));
    }
}
