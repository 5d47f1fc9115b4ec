//! Directory scanning logic

mod builder;

pub use builder::{ProgressCallback, TreeBuilder};
