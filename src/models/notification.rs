//! Notification of a newly observed cross-region contact.

use super::{EntityCode, SpotEvent};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// An entity code with its resolved display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedEntity {
    /// Registry code.
    pub code: EntityCode,
    /// Display name from the directory.
    pub name: String,
}

/// An admitted contact, ready for presentation.
///
/// The text form is `HH:MM:SSZ <receiver> hearing <sender>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Report time of the spot that opened the contact.
    pub heard_at: DateTime<Utc>,
    /// The receiving side.
    pub receiver: NamedEntity,
    /// The transmitting side.
    pub sender: NamedEntity,
    /// Receiving station callsign.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_call: Option<String>,
    /// Transmitting station callsign.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_call: Option<String>,
    /// Band label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<String>,
    /// Mode label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Frequency in hertz.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_hz: Option<u64>,
    /// Signal report in dB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_db: Option<i32>,
}

impl Notification {
    /// Builds a notification from an admitted event and its resolved names.
    #[must_use]
    pub fn new(event: SpotEvent, receiver_name: &str, sender_name: &str) -> Self {
        Self {
            heard_at: event.heard_at,
            receiver: NamedEntity {
                code: event.receiver,
                name: receiver_name.to_string(),
            },
            sender: NamedEntity {
                code: event.sender,
                name: sender_name.to_string(),
            },
            receiver_call: event.receiver_call,
            sender_call: event.sender_call,
            band: event.band,
            mode: event.mode,
            frequency_hz: event.frequency_hz,
            report_db: event.report_db,
        }
    }

    /// UTC time of day, e.g. `19:55:12Z`.
    #[must_use]
    pub fn time_label(&self) -> String {
        self.heard_at.format("%H:%M:%SZ").to_string()
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} hearing {}",
            self.time_label(),
            self.receiver.name,
            self.sender.name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_line() {
        let event =
            SpotEvent::from_epoch(EntityCode::new(223), EntityCode::new(291), 1_662_407_712).unwrap();
        let notification = Notification::new(event, "United States", "England");

        assert_eq!(notification.to_string(), "19:55:12Z United States hearing England");
    }

    #[test]
    fn test_midnight_is_zero_padded() {
        let event = SpotEvent::from_epoch(EntityCode::new(1), EntityCode::new(99), 0).unwrap();
        let notification = Notification::new(event, "Foreign", "Home");

        assert_eq!(notification.time_label(), "00:00:00Z");
    }

    #[test]
    fn test_json_omits_missing_calls() {
        let event = SpotEvent::from_epoch(EntityCode::new(1), EntityCode::new(99), 0).unwrap();
        let json = serde_json::to_value(Notification::new(event, "Foreign", "Home")).unwrap();

        assert_eq!(json["receiver"]["code"], 99);
        assert_eq!(json["sender"]["name"], "Home");
        assert!(json.get("sender_call").is_none());
    }
}
