//! Core type definitions for foldersync

mod aggregator;
mod error;
mod folders;
pub(crate) mod node;

pub use aggregator::ErrorAggregator;
pub use error::SyncError;
pub use folders::{can_enter_folder, FolderPair, SyncMode};
pub use node::{format_timestamp, split_name, MetadataNode};
