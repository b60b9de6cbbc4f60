//! Log relay from the sandbox to the host's log view.
//!
//! The host's message listener pushes decoded events into a [`RelaySender`];
//! whoever owns the [`RelayReceiver`] hands them to the playground, which keeps
//! only events stamped with the current run id.

use futures_channel::mpsc;
use futures_util::StreamExt;
use serde_json::{Number, Value};
use std::fmt;

use crate::protocol::{RelayMessage, RunId, Severity};

/// One console argument as received from the sandbox.
#[derive(Debug, Clone, PartialEq)]
pub enum LogArg {
    /// JavaScript `undefined`, which has no JSON form.
    Undefined,
    /// `NaN` or an infinity, which JSON cannot carry.
    NonFinite(f64),
    Value(Value),
}

impl LogArg {
    /// Wraps a JavaScript number, keeping `NaN` and the infinities apart.
    pub fn number(value: f64) -> Self {
        match Number::from_f64(value) {
            Some(number) => Self::Value(Value::Number(number)),
            None => Self::NonFinite(value),
        }
    }

    /// Strings as-is, other primitives in their canonical text, arrays and
    /// objects as compact JSON, `undefined` as nothing.
    pub fn display_text(&self) -> String {
        match self {
            Self::Undefined => String::new(),
            Self::NonFinite(value) if value.is_nan() => "NaN".to_owned(),
            Self::NonFinite(value) if value.is_sign_negative() => "-Infinity".to_owned(),
            Self::NonFinite(_) => "Infinity".to_owned(),
            Self::Value(Value::String(text)) => text.clone(),
            Self::Value(Value::Null) => "null".to_owned(),
            Self::Value(Value::Bool(flag)) => flag.to_string(),
            Self::Value(Value::Number(number)) => javascript_number(number).to_string(),
            Self::Value(structured) => normalize_numbers(structured.clone()).to_string(),
        }
    }
}

/// JavaScript has one number type; integral values print without a fraction.
fn javascript_number(number: &Number) -> Number {
    const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;
    match number.as_f64() {
        Some(float) if number.is_f64() && float.fract() == 0.0 && float.abs() <= MAX_SAFE_INTEGER => {
            Number::from(float as i64)
        }
        _ => number.clone(),
    }
}

fn normalize_numbers(value: Value) -> Value {
    match value {
        Value::Number(number) => Value::Number(javascript_number(&number)),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_numbers).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key, normalize_numbers(value)))
                .collect(),
        ),
        other => other,
    }
}

impl From<Value> for LogArg {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LogEvent {
    pub run: RunId,
    pub severity: Severity,
    pub args: Vec<LogArg>,
}

impl LogEvent {
    pub fn new(run: RunId, severity: Severity, args: impl IntoIterator<Item = LogArg>) -> Self {
        Self {
            run,
            severity,
            args: args.into_iter().collect(),
        }
    }
}

impl From<RelayMessage> for LogEvent {
    fn from(message: RelayMessage) -> Self {
        Self::new(
            message.run,
            message.severity,
            message.data.into_iter().map(LogArg::Value),
        )
    }
}

/// A rendered line in the log view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub severity: Severity,
    pub text: String,
}

impl LogLine {
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

pub fn render_args(args: &[LogArg]) -> String {
    args.iter()
        .map(LogArg::display_text)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone)]
pub struct RelaySender(mpsc::UnboundedSender<LogEvent>);

impl RelaySender {
    /// Never blocks. Returns `false` once the receiving side is gone.
    pub fn send(&self, event: LogEvent) -> bool {
        self.0.unbounded_send(event).is_ok()
    }
}

pub struct RelayReceiver(mpsc::UnboundedReceiver<LogEvent>);

impl RelayReceiver {
    /// Waits for the next event; `None` after every sender has been dropped.
    pub async fn next(&mut self) -> Option<LogEvent> {
        self.0.next().await
    }

    /// Takes every event that is already queued, without waiting.
    pub fn drain_ready(&mut self) -> Vec<LogEvent> {
        let mut events = Vec::new();
        while let Ok(Some(event)) = self.0.try_next() {
            events.push(event);
        }
        events
    }
}

pub fn channel() -> (RelaySender, RelayReceiver) {
    let (sender, receiver) = mpsc::unbounded();
    (RelaySender(sender), RelayReceiver(receiver))
}

/// Lines of the current run, in arrival order.
#[derive(Debug, Clone, Default)]
pub struct LogRelay {
    current: RunId,
    lines: Vec<LogLine>,
}

impl LogRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switches to `run`, dropping the previous run's lines.
    pub fn begin(&mut self, run: RunId) {
        self.current = run;
        self.lines.clear();
    }

    pub fn current_run(&self) -> RunId {
        self.current
    }

    /// Renders and keeps `event` if it belongs to the current run.
    pub fn accept(&mut self, event: LogEvent) -> Option<&LogLine> {
        if event.run != self.current {
            log::debug!(
                "Dropping stale {} message from run {} (current run {})",
                event.severity.as_str(),
                event.run,
                self.current
            );
            return None;
        }
        self.lines.push(LogLine {
            severity: event.severity,
            text: render_args(&event.args),
        });
        self.lines.last()
    }

    pub fn lines(&self) -> &[LogLine] {
        &self.lines
    }
}
