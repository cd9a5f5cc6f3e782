//! Captured-log tokenizing.
//!
//! A captured session log is plain console output from the game client. The
//! battle portion starts at the last `joinbattle` marker line; everything
//! before it is unrelated preamble. After the marker, three line shapes
//! matter (all other lines are noise):
//!
//! Received extension response: battleTimer
//! Extension response data: {"_NAME":"battleTimer","playerIndex":0,"start":true,"timeRemaining":60}
//! Received battle log message: {"Msg":"Round 1 begins"}
//!
//! The announce line only names the record; the `_NAME` inside the data
//! payload is authoritative and is what extraction dispatches on.

use memchr::memchr_iter;
use memmap2::Mmap;
use serde_json::Value;
use std::fs::File;
use std::path::Path;

use crate::error::ReconstructError;

/// The line that bounds a battle session inside a captured log.
pub const SESSION_MARKER: &str = "Received extension response: joinbattle";

const EXTENSION_DATA_PREFIX: &str = "Extension response data: ";
const MESSAGE_PREFIX: &str = "Received battle log message: ";

pub type Fields = serde_json::Map<String, Value>;

/// A structured snapshot emitted by the battle networking layer.
///
/// Carries at least a `_NAME` family tag and (for battle records) a `type`
/// event-kind tag, plus nested payload mappings.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ExtensionRecord {
    pub fields: Fields,
}

impl ExtensionRecord {
    pub fn new(fields: Fields) -> Self {
        Self { fields }
    }

    /// The extension family tag (`_NAME`).
    pub fn name(&self) -> Option<&str> {
        self.get_str("_NAME")
    }

    /// The event-kind tag (`type`).
    pub fn event_type(&self) -> Option<&str> {
        self.get_str("type")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.fields.get(key).and_then(Value::as_i64)
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get_i64(key).and_then(|n| usize::try_from(n).ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.fields.get(key).and_then(Value::as_bool)
    }

    pub fn get_i64_list(&self, key: &str) -> Option<Vec<i64>> {
        let values = self.fields.get(key)?.as_array()?;
        values.iter().map(Value::as_i64).collect()
    }

    pub fn get_usize_list(&self, key: &str) -> Option<Vec<usize>> {
        self.get_i64_list(key)?
            .into_iter()
            .map(|n| usize::try_from(n).ok())
            .collect()
    }

    /// The per-card disclosure list under a peek family (`DP` or `HP`).
    pub fn peeks(&self, family: &str) -> Option<&Vec<Value>> {
        self.fields.get(family)?.get("peeks")?.as_array()
    }

    /// The initial object dump carried by a joinbattle record.
    pub fn objects(&self) -> Option<&Vec<Value>> {
        self.fields.get("objects")?.as_array()
    }
}

/// A human-oriented log line: keyed (an `Event` tag plus kind-specific
/// fields) or a single free-text `Msg` string.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum MessageRecord {
    Keyed { event: String, fields: Fields },
    Text(String),
}

/// Field accessors shared by peek entries, dump objects and keyed message
/// payloads (all of which arrive as plain JSON objects).
pub fn field_str<'a>(obj: &'a Value, key: &str) -> Option<&'a str> {
    obj.get(key).and_then(Value::as_str)
}

pub fn field_i64(obj: &Value, key: &str) -> Option<i64> {
    obj.get(key).and_then(Value::as_i64)
}

pub fn field_usize(obj: &Value, key: &str) -> Option<usize> {
    field_i64(obj, key).and_then(|n| usize::try_from(n).ok())
}

pub fn field_bool(obj: &Value, key: &str) -> Option<bool> {
    obj.get(key).and_then(Value::as_bool)
}

pub fn field_f64(obj: &Value, key: &str) -> Option<f64> {
    obj.get(key).and_then(Value::as_f64)
}

/// The two ordered record sequences of one battle session.
#[derive(Debug, Default)]
pub struct SessionLog {
    pub extensions: Vec<ExtensionRecord>,
    pub messages: Vec<MessageRecord>,
}

/// Cut the log at the last session marker and tokenize what follows.
pub fn split_session(log: &str) -> Result<SessionLog, ReconstructError> {
    let tail = session_tail(log).ok_or(ReconstructError::MissingMarker)?;
    Ok(tokenize(tail))
}

/// Everything from the last marker line onward, or None if the marker
/// never occurs as a full line.
fn session_tail(log: &str) -> Option<&str> {
    let bytes = log.as_bytes();
    let mut tail_start = None;
    let mut line_start = 0;
    for line_end in memchr_iter(b'\n', bytes).chain(std::iter::once(bytes.len())) {
        if line_end > line_start {
            let line = log[line_start..line_end].trim_end_matches('\r');
            if line == SESSION_MARKER {
                tail_start = Some(line_start);
            }
        }
        line_start = line_end + 1;
    }
    tail_start.map(|start| &log[start..])
}

fn tokenize(tail: &str) -> SessionLog {
    let mut session = SessionLog::default();

    for line in tail.lines() {
        let line = line.trim_end_matches('\r');
        if let Some(payload) = line.strip_prefix(EXTENSION_DATA_PREFIX) {
            match serde_json::from_str::<Value>(payload) {
                Ok(Value::Object(fields)) => {
                    session.extensions.push(ExtensionRecord::new(fields));
                }
                Ok(_) => tracing::warn!("extension payload is not an object, skipping"),
                Err(e) => tracing::warn!(error = %e, "malformed extension payload, skipping"),
            }
        } else if let Some(payload) = line.strip_prefix(MESSAGE_PREFIX) {
            match serde_json::from_str::<Value>(payload) {
                Ok(Value::Object(fields)) => {
                    if let Some(record) = classify_message(fields) {
                        session.messages.push(record);
                    }
                }
                Ok(_) => tracing::warn!("message payload is not an object, skipping"),
                Err(e) => tracing::warn!(error = %e, "malformed message payload, skipping"),
            }
        }
    }

    session
}

fn classify_message(fields: Fields) -> Option<MessageRecord> {
    if let Some(text) = fields.get("Msg").and_then(Value::as_str) {
        return Some(MessageRecord::Text(text.to_string()));
    }
    if let Some(event) = fields.get("Event").and_then(Value::as_str) {
        let event = event.to_string();
        return Some(MessageRecord::Keyed { event, fields });
    }
    tracing::warn!("message record carries neither Msg nor Event, skipping");
    None
}

/// Read a captured log file into memory.
///
/// Logs are small enough to hold whole; the mmap keeps the read zero-copy
/// until the lossy UTF-8 pass (captured console output can contain stray
/// bytes).
pub fn read_log_file(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    let mmap = unsafe { Mmap::map(&file)? };
    Ok(String::from_utf8_lossy(mmap.as_ref()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_marker_is_reported() {
        let log = "some preamble\nReceived chat message: hi\n";
        assert!(matches!(
            split_session(log),
            Err(ReconstructError::MissingMarker)
        ));
    }

    #[test]
    fn tail_starts_at_last_marker() {
        let log = format!(
            "{m}\nExtension response data: {{\"_NAME\":\"old\"}}\n{m}\nExtension response data: {{\"_NAME\":\"new\"}}\n",
            m = SESSION_MARKER
        );
        let session = split_session(&log).unwrap();
        assert_eq!(session.extensions.len(), 1);
        assert_eq!(session.extensions[0].name(), Some("new"));
    }

    #[test]
    fn tokenize_classifies_record_kinds() {
        let log = format!(
            concat!(
                "{m}\n",
                "Extension response data: {{\"_NAME\":\"battle\",\"type\":\"pass\"}}\n",
                "Received battle log message: {{\"Msg\":\"Round 1 begins\"}}\n",
                "Received battle log message: {{\"Event\":\"startGame\"}}\n",
                "unrelated noise line\n",
            ),
            m = SESSION_MARKER
        );
        let session = split_session(&log).unwrap();
        assert_eq!(session.extensions.len(), 1);
        assert_eq!(session.extensions[0].event_type(), Some("pass"));
        assert_eq!(session.messages.len(), 2);
        assert_eq!(
            session.messages[0],
            MessageRecord::Text("Round 1 begins".to_string())
        );
        assert!(matches!(
            &session.messages[1],
            MessageRecord::Keyed { event, .. } if event == "startGame"
        ));
    }

    #[test]
    fn malformed_payloads_are_skipped() {
        let log = format!(
            concat!(
                "{m}\n",
                "Extension response data: {{not json\n",
                "Extension response data: {{\"_NAME\":\"battle\",\"type\":\"pass\"}}\n",
                "Received battle log message: {{\"neither\":1}}\n",
            ),
            m = SESSION_MARKER
        );
        let session = split_session(&log).unwrap();
        assert_eq!(session.extensions.len(), 1);
        assert!(session.messages.is_empty());
    }
}
