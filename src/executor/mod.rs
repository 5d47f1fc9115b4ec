//! Executor module for destination-side file operations

pub mod copy;
pub mod mirror;

pub use copy::{copy_file_contents, is_same_file, is_unchanged};
pub use mirror::{MirrorCallback, MirrorCopier, MirrorEvent, MirrorStats};
