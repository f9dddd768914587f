//! Application Coordinator
//!
//! The controller shared by every front end. It owns the selected file, the
//! lazily loaded engine and the worker thread of the current run, and forwards
//! worker events to a [`Presenter`].
//!
//! States: `Idle -> FileSelected -> Processing -> Done | Failed`. Only one run can
//! be in flight per controller.

use anyhow::{bail, Result};
use crossbeam_channel::{unbounded, Receiver, Sender, TryRecvError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{error, info, warn};

use crate::config::ModelSettings;
use crate::processor::{process_file, Progress, RunOutput};
use crate::shared::WorkerEvent;
use crate::vision::{init_ocr_model, EngineOptions, ModelPaths, OcrEngine};

/// Builds the engine on the worker thread the first time it is needed
pub type EngineFactory = Arc<dyn Fn() -> Result<Arc<dyn OcrEngine>> + Send + Sync>;

/// Wakes the UI event loop after the worker posts an event
pub type RepaintWaker = Arc<dyn Fn() + Send + Sync>;

/// Kind of file offered by the picker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Image,
}

impl FileKind {
    pub fn filter_name(&self) -> &'static str {
        match self {
            FileKind::Pdf => "PDF files",
            FileKind::Image => "Image files",
        }
    }

    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            FileKind::Pdf => &["pdf"],
            FileKind::Image => &["jpg", "jpeg", "png", "bmp", "gif", "tiff"],
        }
    }
}

/// What a front end must provide to drive a controller
pub trait Presenter {
    /// Ask the user for a file; `None` when cancelled
    fn select_file(&mut self, kind: FileKind) -> Option<PathBuf>;
    fn show_progress(&mut self, progress: &Progress);
    fn show_result(&mut self, output: &RunOutput);
    fn show_error(&mut self, message: &str);
}

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    FileSelected,
    Processing,
    Done,
    Failed,
}

/// Whether a finished run leaves the start action enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartPolicy {
    /// The same file can be run again right away
    Immediate,
    /// A new file must be chosen after a successful run
    AfterNewSelection,
}

/// Engine factory that loads the PaddleOCR models described by `models`
pub fn paddle_engine_factory(models: ModelSettings, options: EngineOptions) -> EngineFactory {
    Arc::new(move || -> Result<Arc<dyn OcrEngine>> {
        let paths = ModelPaths::new(models.detection_dir(), models.recognition_dir())?;
        let engine = init_ocr_model(&paths, &options)?;
        Ok(Arc::new(engine) as Arc<dyn OcrEngine>)
    })
}

/// Front-end controller
pub struct OcrController {
    state: RunState,
    selected_file: Option<PathBuf>,
    output_dir: PathBuf,
    restart: RestartPolicy,
    /// Loaded on the first run and reused afterwards
    engine: Option<Arc<dyn OcrEngine>>,
    factory: EngineFactory,
    waker: Option<RepaintWaker>,
    events: Option<Receiver<WorkerEvent>>,
    worker: Option<JoinHandle<()>>,
    last_progress: Option<Progress>,
    last_output: Option<RunOutput>,
    last_error: Option<String>,
}

impl OcrController {
    pub fn new(factory: EngineFactory, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            state: RunState::Idle,
            selected_file: None,
            output_dir: output_dir.into(),
            restart: RestartPolicy::Immediate,
            engine: None,
            factory,
            waker: None,
            events: None,
            worker: None,
            last_progress: None,
            last_output: None,
            last_error: None,
        }
    }

    pub fn with_restart_policy(mut self, restart: RestartPolicy) -> Self {
        self.restart = restart;
        self
    }

    /// Called from the worker after every event
    pub fn set_waker(&mut self, waker: RepaintWaker) {
        self.waker = Some(waker);
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn selected_file(&self) -> Option<&Path> {
        self.selected_file.as_deref()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn is_engine_loaded(&self) -> bool {
        self.engine.is_some()
    }

    pub fn is_processing(&self) -> bool {
        self.state == RunState::Processing
    }

    pub fn last_progress(&self) -> Option<&Progress> {
        self.last_progress.as_ref()
    }

    pub fn last_output(&self) -> Option<&RunOutput> {
        self.last_output.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the start action is available
    pub fn can_start(&self) -> bool {
        if self.selected_file.is_none() {
            return false;
        }
        match self.state {
            RunState::FileSelected | RunState::Failed => true,
            RunState::Done => self.restart == RestartPolicy::Immediate,
            RunState::Idle | RunState::Processing => false,
        }
    }

    /// Record the file to recognize. Ignored while a run is in progress.
    pub fn select_file(&mut self, path: PathBuf) -> bool {
        if self.is_processing() {
            warn!("Ignoring file selection while processing: {:?}", path);
            return false;
        }

        info!("Selected file: {:?}", path);
        self.selected_file = Some(path);
        self.state = RunState::FileSelected;
        true
    }

    /// Let the presenter pick a file of the given kind
    pub fn choose_file(&mut self, presenter: &mut dyn Presenter, kind: FileKind) -> bool {
        if self.is_processing() {
            return false;
        }
        match presenter.select_file(kind) {
            Some(path) => self.select_file(path),
            None => false,
        }
    }

    /// Start recognizing the selected file on a worker thread
    pub fn start(&mut self) -> Result<()> {
        if self.is_processing() {
            bail!("A recognition run is already in progress");
        }
        let Some(path) = self.selected_file.clone() else {
            bail!("Please select a file first");
        };
        if !self.can_start() {
            bail!("Select a new file to start another run");
        }

        let (tx, rx) = unbounded();
        let worker = Worker {
            tx,
            waker: self.waker.clone(),
        };
        let engine = self.engine.clone();
        let factory = self.factory.clone();
        let output_dir = self.output_dir.clone();

        let handle = std::thread::Builder::new()
            .name("ocr-worker".to_string())
            .spawn(move || worker.run(engine, factory, path, output_dir))?;

        self.worker = Some(handle);
        self.events = Some(rx);
        self.state = RunState::Processing;
        self.last_progress = None;
        self.last_error = None;
        info!("Recognition run started");
        Ok(())
    }

    /// Apply pending worker events without blocking.
    /// Returns true when at least one event was handled.
    pub fn poll(&mut self, presenter: &mut dyn Presenter) -> bool {
        let Some(rx) = self.events.take() else {
            return false;
        };

        let mut handled = false;
        loop {
            match rx.try_recv() {
                Ok(event) => {
                    handled = true;
                    if self.handle_event(event, presenter) {
                        return true;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.worker_vanished(presenter);
                    return true;
                }
            }
        }

        self.events = Some(rx);
        handled
    }

    /// Block until the current run finishes, forwarding every event
    pub fn wait(&mut self, presenter: &mut dyn Presenter) {
        let Some(rx) = self.events.take() else {
            return;
        };

        loop {
            match rx.recv() {
                Ok(event) => {
                    if self.handle_event(event, presenter) {
                        return;
                    }
                }
                Err(_) => {
                    self.worker_vanished(presenter);
                    return;
                }
            }
        }
    }

    /// Returns true when the event ends the run
    fn handle_event(&mut self, event: WorkerEvent, presenter: &mut dyn Presenter) -> bool {
        match event {
            WorkerEvent::EngineLoaded(engine) => {
                self.engine = Some(engine);
                false
            }
            WorkerEvent::Progress(progress) => {
                presenter.show_progress(&progress);
                self.last_progress = Some(progress);
                false
            }
            WorkerEvent::Finished(Ok(output)) => {
                self.join_worker();
                self.state = RunState::Done;
                presenter.show_result(&output);
                self.last_output = Some(output);
                true
            }
            WorkerEvent::Finished(Err(message)) => {
                self.join_worker();
                self.state = RunState::Failed;
                presenter.show_error(&message);
                self.last_error = Some(message);
                true
            }
        }
    }

    fn worker_vanished(&mut self, presenter: &mut dyn Presenter) {
        self.join_worker();
        let message = "Recognition worker stopped unexpectedly".to_string();
        error!("{}", message);
        self.state = RunState::Failed;
        presenter.show_error(&message);
        self.last_error = Some(message);
    }

    fn join_worker(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.join().is_err() {
                error!("Recognition worker panicked");
            }
        }
    }
}

impl Drop for OcrController {
    fn drop(&mut self) {
        // Let an in-flight run finish writing its pages
        self.join_worker();
    }
}

/// Sending half owned by the worker thread
struct Worker {
    tx: Sender<WorkerEvent>,
    waker: Option<RepaintWaker>,
}

impl Worker {
    fn send(&self, event: WorkerEvent) {
        // The controller may already be gone; nothing left to report to
        let _ = self.tx.send(event);
        if let Some(wake) = &self.waker {
            wake();
        }
    }

    fn run(
        self,
        engine: Option<Arc<dyn OcrEngine>>,
        factory: EngineFactory,
        path: PathBuf,
        output_dir: PathBuf,
    ) {
        let engine = match engine {
            Some(engine) => engine,
            None => {
                self.send(WorkerEvent::Progress(Progress::InitializingModel));
                match factory() {
                    Ok(engine) => {
                        self.send(WorkerEvent::EngineLoaded(engine.clone()));
                        engine
                    }
                    Err(e) => {
                        error!("Failed to initialize OCR model: {:#}", e);
                        self.send(WorkerEvent::Finished(Err(format!(
                            "Failed to initialize OCR model: {:#}",
                            e
                        ))));
                        return;
                    }
                }
            }
        };

        self.send(WorkerEvent::Progress(Progress::Recognizing));
        let mut relay = |progress: Progress| self.send(WorkerEvent::Progress(progress));
        let result = process_file(&path, engine.as_ref(), &output_dir, Some(&mut relay))
            .map_err(|e| {
                error!("Recognition failed: {}", e);
                format!("Recognition failed: {}", e)
            });

        self.send(WorkerEvent::Finished(result));
    }
}
