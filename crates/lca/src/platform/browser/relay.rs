//! `message` events from the preview frame, decoded into [`LogEvent`]s.

use js_sys::{Array, JSON, Reflect};
use serde_json::Value;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{MessageEvent, Window};

use crate::error::InitError;
use crate::protocol::{self, RunId, Severity};
use crate::relay::{LogArg, LogEvent, RelaySender};

/// Window `message` listener; removed again when dropped.
pub struct MessageListener {
    window: Window,
    callback: Closure<dyn FnMut(MessageEvent)>,
}

impl MessageListener {
    pub fn start(sender: RelaySender) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let callback = Closure::wrap(Box::new(move |event: MessageEvent| {
            let Some(relayed) = decode_message(&event.data()) else {
                return;
            };
            if !sender.send(relayed) {
                log::debug!("Relay receiver is gone, dropping message");
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        window.add_event_listener_with_callback("message", callback.as_ref().unchecked_ref())?;
        Ok(Self { window, callback })
    }

    /// [`MessageListener::start`] with the failure turned into an [`InitError`].
    pub fn open(sender: RelaySender) -> Result<Self, InitError> {
        Self::start(sender).map_err(|error| InitError::MessageListener(format!("{error:?}")))
    }
}

impl Drop for MessageListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("message", self.callback.as_ref().unchecked_ref());
    }
}

/// Anything that is not a well-formed envelope on our channel is ignored.
pub fn decode_message(data: &JsValue) -> Option<LogEvent> {
    if !data.is_object() {
        return None;
    }
    let field = |name: &str| Reflect::get(data, &JsValue::from_str(name)).ok();

    if field(protocol::CHANNEL_FIELD)?.as_string().as_deref() != Some(protocol::CHANNEL) {
        return None;
    }
    let run = field(protocol::RUN_FIELD)?
        .as_f64()
        .filter(|run| *run >= 0.0 && run.fract() == 0.0)?;
    let severity = Severity::from_type(&field(protocol::TYPE_FIELD)?.as_string()?)?;
    let data = field(protocol::DATA_FIELD)?;
    let args = if Array::is_array(&data) {
        Array::from(&data).iter().map(decode_arg).collect()
    } else {
        Vec::new()
    };
    Some(LogEvent::new(RunId(run as u64), severity, args))
}

fn decode_arg(value: JsValue) -> LogArg {
    if value.is_undefined() {
        return LogArg::Undefined;
    }
    if let Some(number) = value.as_f64().filter(|number| !number.is_finite()) {
        return LogArg::NonFinite(number);
    }
    match serde_wasm_bindgen::from_value::<Value>(value.clone()) {
        Ok(value) => LogArg::Value(value),
        Err(error) => {
            log::debug!("Console argument is not plain data: {error}");
            let text = JSON::stringify(&value)
                .ok()
                .map(String::from)
                .unwrap_or_else(|| format!("{value:?}"));
            LogArg::Value(Value::String(text))
        }
    }
}
