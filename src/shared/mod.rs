//! Messaging between the UI thread and the recognition worker

pub mod messages;

pub use messages::WorkerEvent;
