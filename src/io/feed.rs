//! Newline-delimited spot feed.
//!
//! The broker client (or a recorded capture) writes one JSON payload per
//! line. Each line is decoded into a [`SpotEvent`]; lines that do not carry
//! a sender, receiver and timestamp are dropped here and never reach the
//! admission filter.

use super::NotificationSink;
use crate::models::{SpotEvent, SpotMessage};
use crate::services::{Outcome, ProcessStats, SpotProcessor};
use crate::{Error, Result};
use std::future::Future;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// One decoded line of the feed.
#[derive(Debug)]
pub enum FeedItem {
    /// A well-formed spot.
    Spot(SpotEvent),
    /// A line that could not be decoded.
    Malformed {
        /// 1-based line number.
        line: usize,
        /// Why decoding failed.
        error: Error,
    },
}

/// Reads spot payloads line by line.
///
/// Lines are framed on raw bytes, so a line that is not UTF-8 becomes a
/// [`FeedItem::Malformed`] instead of ending the feed.
pub struct FeedReader<R> {
    reader: R,
    buf: Vec<u8>,
    line_number: usize,
}

impl<R: AsyncBufRead + Unpin> FeedReader<R> {
    /// Creates a reader over `reader`.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line_number: 0,
        }
    }

    /// Reads the next non-blank line.
    ///
    /// Returns `Ok(None)` at end of input. Cancel-safe: bytes of a partly
    /// read line stay buffered until the next call.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying reader fails.
    pub async fn next_item(&mut self) -> Result<Option<FeedItem>> {
        loop {
            let read = self
                .reader
                .read_until(b'\n', &mut self.buf)
                .await
                .map_err(|e| Error::OperationFailed {
                    operation: "read_feed".to_string(),
                    cause: e.to_string(),
                })?;
            if read == 0 && self.buf.is_empty() {
                return Ok(None);
            }

            let raw = std::mem::take(&mut self.buf);
            self.line_number += 1;

            let payload = match std::str::from_utf8(&raw) {
                Ok(text) => text.trim(),
                Err(e) => {
                    return Ok(Some(FeedItem::Malformed {
                        line: self.line_number,
                        error: Error::InvalidInput(format!("spot line is not valid UTF-8: {e}")),
                    }));
                },
            };
            if payload.is_empty() {
                continue;
            }

            let item = match SpotMessage::parse(payload).and_then(SpotMessage::into_event) {
                Ok(event) => FeedItem::Spot(event),
                Err(error) => FeedItem::Malformed {
                    line: self.line_number,
                    error,
                },
            };
            return Ok(Some(item));
        }
    }
}

/// Processes a feed until end of input or `shutdown` resolves.
///
/// Admitted notifications go to `sink`. When `sweep_every` is set, expired
/// suppression records are pruned on that period.
///
/// # Errors
///
/// Returns an error if reading the feed or writing to the sink fails.
/// Malformed lines are logged and counted, not returned.
pub async fn run_feed<R, F>(
    reader: R,
    processor: &SpotProcessor,
    sink: &mut dyn NotificationSink,
    sweep_every: Option<Duration>,
    shutdown: F,
) -> Result<ProcessStats>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    let mut feed = FeedReader::new(reader);
    let mut stats = ProcessStats::default();
    let mut sweep = sweep_every.filter(|p| !p.is_zero()).map(|period| {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    });
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("Shutdown requested, stopping feed");
                break;
            },
            () = next_tick(&mut sweep) => {
                processor.prune_expired();
            },
            item = feed.next_item() => {
                let Some(item) = item? else {
                    tracing::info!("Feed reached end of input");
                    break;
                };
                stats.received += 1;
                metrics::counter!("spots_received_total").increment(1);

                match item {
                    FeedItem::Spot(event) => {
                        let outcome = processor.process(event);
                        stats.record(&outcome);
                        if let Outcome::Admitted(notification) = outcome {
                            sink.emit(&notification)?;
                        }
                    },
                    FeedItem::Malformed { line, error } => {
                        stats.malformed += 1;
                        metrics::counter!("spots_malformed_total").increment(1);
                        tracing::warn!(line, error = %error, "Dropping malformed spot");
                    },
                }
            },
        }
    }

    sink.flush()?;
    tracing::info!(
        received = stats.received,
        malformed = stats.malformed,
        rejected = stats.rejected,
        suppressed = stats.suppressed,
        admitted = stats.admitted,
        "Feed finished"
    );

    Ok(stats)
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        },
        None => std::future::pending().await,
    }
}
