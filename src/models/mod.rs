//! Data models for spotwatch.
//!
//! Entity codes, contact pairs, spot events and the notifications derived
//! from them.

mod entity;
mod notification;
mod spot;

pub use entity::{ContactPair, EntityCode};
pub use notification::{NamedEntity, Notification};
pub use spot::{SpotEvent, SpotMessage};
