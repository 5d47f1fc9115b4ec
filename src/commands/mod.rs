//! Commands exposed to the command-line front end

pub mod sync;
