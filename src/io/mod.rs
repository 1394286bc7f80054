//! Input and output adapters.
//!
//! The spot feed on the way in, notification sinks on the way out.

mod feed;
mod sink;

pub use feed::{FeedItem, FeedReader, run_feed};
pub use sink::{JsonSink, NotificationSink, OutputFormat, TextSink, create_sink};
