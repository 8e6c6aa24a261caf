//! CLI command implementations

pub mod completions;
pub mod config;
pub mod entry;
pub mod export;
pub mod import;
pub mod init;
pub mod paste;
pub mod summary;
