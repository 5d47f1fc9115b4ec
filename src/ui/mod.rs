//! Terminal output

mod progress;

pub use progress::ProgressReporter;
