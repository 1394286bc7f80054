//! Command handlers module.
//!
//! - `run.rs`: feed processing loop
//! - `topics.rs`: broker topic filter listing
//! - `lookup.rs`: entity code resolution
//! - `config.rs`: configuration display

mod config;
mod lookup;
mod run;
mod topics;

pub use config::cmd_config;
pub use lookup::cmd_lookup;
pub use run::{RunOptions, cmd_run};
pub use topics::cmd_topics;
