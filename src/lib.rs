//! # foldersync - One-way folder synchronization
//!
//! Scans a host folder in parallel, records the tree in a `JSONSync.json`
//! manifest inside it and mirrors new or changed files onto a destination
//! folder. Nothing is ever deleted from the destination.

pub mod commands;
pub mod config;
pub mod executor;
pub mod manifest;
pub mod scanner;
pub mod types;
pub mod ui;

pub use config::{Config, FileConfig};
pub use types::{ErrorAggregator, FolderPair, MetadataNode, SyncError, SyncMode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
