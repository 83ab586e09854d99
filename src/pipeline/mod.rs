//! Command-dispatch pipeline
//!
//! Classifies each submission and, for unknown commands, chains the two
//! remote inference calls on a dedicated worker thread.

pub mod dispatcher;

pub use dispatcher::{DispatchCommand, DispatchEvent, Dispatcher, DispatcherHandle};
