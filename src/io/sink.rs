//! Notification sinks.
//!
//! Each output format implements [`NotificationSink`].

use crate::models::Notification;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::str::FromStr;

/// Destination for admitted notifications.
pub trait NotificationSink: Send {
    /// Writes one notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    fn emit(&mut self, notification: &Notification) -> Result<()>;

    /// Flushes buffered output.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    fn flush(&mut self) -> Result<()>;
}

/// Supported notification formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// `HH:MM:SSZ <receiver> hearing <sender>`.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" | "ndjson" | "jsonl" => Ok(Self::Json),
            _ => Err(Error::InvalidInput(format!("Unknown output format: {s}"))),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Writes the one-line text form.
pub struct TextSink<W: Write> {
    writer: W,
}

impl<W: Write> TextSink<W> {
    /// Creates a text sink.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> NotificationSink for TextSink<W> {
    fn emit(&mut self, notification: &Notification) -> Result<()> {
        writeln!(self.writer, "{notification}").map_err(|e| write_error("write_text", &e))?;
        // Line-at-a-time so piped consumers see each contact immediately.
        self.writer
            .flush()
            .map_err(|e| write_error("flush_text", &e))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| write_error("flush_text", &e))
    }
}

/// Writes notifications as newline-delimited JSON.
pub struct JsonSink<W: Write> {
    writer: W,
}

impl<W: Write> JsonSink<W> {
    /// Creates a JSON sink.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> NotificationSink for JsonSink<W> {
    fn emit(&mut self, notification: &Notification) -> Result<()> {
        serde_json::to_writer(&mut self.writer, notification).map_err(|e| {
            Error::OperationFailed {
                operation: "write_json".to_string(),
                cause: e.to_string(),
            }
        })?;
        writeln!(self.writer).map_err(|e| write_error("write_json", &e))?;
        self.writer
            .flush()
            .map_err(|e| write_error("flush_json", &e))
    }

    fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| write_error("flush_json", &e))
    }
}

/// Creates a sink for the given format and writer.
pub fn create_sink<W: Write + Send + 'static>(
    writer: W,
    format: OutputFormat,
) -> Box<dyn NotificationSink> {
    match format {
        OutputFormat::Text => Box::new(TextSink::new(writer)),
        OutputFormat::Json => Box::new(JsonSink::new(writer)),
    }
}

fn write_error(operation: &str, e: &std::io::Error) -> Error {
    Error::OperationFailed {
        operation: operation.to_string(),
        cause: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EntityCode, SpotEvent};

    fn notification() -> Notification {
        let mut event =
            SpotEvent::from_epoch(EntityCode::new(223), EntityCode::new(291), 1_662_407_712).unwrap();
        event.sender_call = Some("G4ABC".to_string());
        Notification::new(event, "United States", "England")
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(OutputFormat::from_str("TEXT").unwrap(), OutputFormat::Text);
        assert_eq!(OutputFormat::from_str("jsonl").unwrap(), OutputFormat::Json);
        assert!(OutputFormat::from_str("yaml").is_err());
    }

    #[test]
    fn test_text_sink() {
        let mut sink = TextSink::new(Vec::new());
        sink.emit(&notification()).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "19:55:12Z United States hearing England\n");
    }

    #[test]
    fn test_json_sink() {
        let mut sink = JsonSink::new(Vec::new());
        sink.emit(&notification()).unwrap();
        sink.emit(&notification()).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(value["receiver"]["name"], "United States");
        assert_eq!(value["sender"]["code"], 223);
        assert_eq!(value["sender_call"], "G4ABC");
        assert_eq!(value["heard_at"], "2022-09-05T19:55:12Z");
    }
}
