//! Spot events and their wire representation.

use super::EntityCode;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single observation: `receiver` heard `sender` at `heard_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpotEvent {
    /// Entity of the transmitting station.
    pub sender: EntityCode,
    /// Entity of the receiving station.
    pub receiver: EntityCode,
    /// Report time (UTC, second resolution).
    pub heard_at: DateTime<Utc>,
    /// Transmitting station callsign, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_call: Option<String>,
    /// Receiving station callsign, if reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver_call: Option<String>,
    /// Band label such as `6m`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub band: Option<String>,
    /// Mode label such as `FT8`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    /// Dial frequency in hertz.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_hz: Option<u64>,
    /// Signal report in dB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_db: Option<i32>,
}

impl SpotEvent {
    /// Creates an event from two codes and an epoch timestamp in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the timestamp is outside the
    /// representable range.
    pub fn from_epoch(sender: EntityCode, receiver: EntityCode, epoch_secs: i64) -> Result<Self> {
        let heard_at = DateTime::from_timestamp(epoch_secs, 0).ok_or_else(|| {
            Error::InvalidInput(format!("timestamp {epoch_secs} is out of range"))
        })?;

        Ok(Self {
            sender,
            receiver,
            heard_at,
            sender_call: None,
            receiver_call: None,
            band: None,
            mode: None,
            frequency_hz: None,
            report_db: None,
        })
    }

    /// Epoch seconds of the report time.
    #[must_use]
    pub fn epoch_secs(&self) -> i64 {
        self.heard_at.timestamp()
    }
}

/// Spot payload as published by the reporting network.
///
/// Every field is optional on the wire; [`SpotMessage::into_event`] decides
/// whether the message carries enough to be processed.
///
/// | Key | Meaning |
/// |-----|---------|
/// | `sa` | sender entity code |
/// | `ra` | receiver entity code |
/// | `t` | epoch seconds |
/// | `sc` / `rc` | sender / receiver callsign |
/// | `b` | band |
/// | `md` | mode |
/// | `f` | frequency, Hz |
/// | `rp` | signal report, dB |
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotMessage {
    /// Sender entity code.
    pub sa: Option<i64>,
    /// Receiver entity code.
    pub ra: Option<i64>,
    /// Report time, epoch seconds.
    pub t: Option<i64>,
    /// Sender callsign.
    pub sc: Option<String>,
    /// Receiver callsign.
    pub rc: Option<String>,
    /// Band.
    pub b: Option<String>,
    /// Mode.
    pub md: Option<String>,
    /// Frequency in hertz.
    pub f: Option<u64>,
    /// Signal report in dB.
    pub rp: Option<i32>,
}

impl SpotMessage {
    /// Parses one JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the payload is not a JSON object of
    /// the expected shape.
    pub fn parse(payload: &str) -> Result<Self> {
        serde_json::from_str(payload)
            .map_err(|e| Error::InvalidInput(format!("malformed spot payload: {e}")))
    }

    /// Converts the payload into a [`SpotEvent`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the sender code, receiver code or
    /// timestamp is missing, or the timestamp is out of range.
    pub fn into_event(self) -> Result<SpotEvent> {
        let sender = self
            .sa
            .ok_or_else(|| Error::InvalidInput("spot is missing sender entity 'sa'".to_string()))?;
        let receiver = self
            .ra
            .ok_or_else(|| Error::InvalidInput("spot is missing receiver entity 'ra'".to_string()))?;
        let epoch_secs = self
            .t
            .ok_or_else(|| Error::InvalidInput("spot is missing timestamp 't'".to_string()))?;

        let mut event = SpotEvent::from_epoch(sender.into(), receiver.into(), epoch_secs)?;
        event.sender_call = self.sc;
        event.receiver_call = self.rc;
        event.band = self.b;
        event.mode = self.md;
        event.frequency_hz = self.f;
        event.report_db = self.rp;

        Ok(event)
    }
}
