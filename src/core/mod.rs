//! Core module - entry model, record store, aggregation and session state

pub mod config;
pub mod entry;
pub mod paste;
pub mod session;
pub mod store;
pub mod summary;

pub use config::Config;
pub use entry::{Field, RmaEntry};
pub use paste::parse_text;
pub use session::{Session, SessionError};
pub use store::{EntryId, RecordStore, StoreError};
pub use summary::{reason_label, summarize, Summary, Tally};
