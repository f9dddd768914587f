//! Message types sent from the recognition worker to the UI thread

use std::fmt;
use std::sync::Arc;

use crate::processor::{Progress, RunOutput};
use crate::vision::OcrEngine;

/// Messages sent from the worker to its controller
pub enum WorkerEvent {
    /// The engine was loaded on this run and should be kept for later runs
    EngineLoaded(Arc<dyn OcrEngine>),
    /// Progress update for display
    Progress(Progress),
    /// Run finished; the error is already formatted for display
    Finished(Result<RunOutput, String>),
}

impl fmt::Debug for WorkerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerEvent::EngineLoaded(_) => write!(f, "EngineLoaded"),
            WorkerEvent::Progress(p) => f.debug_tuple("Progress").field(p).finish(),
            WorkerEvent::Finished(result) => f.debug_tuple("Finished").field(result).finish(),
        }
    }
}
