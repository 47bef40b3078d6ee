//! One worker per processing run.
//!
//! Each "procesar" invocation spawns a dedicated thread so the caller's
//! interactive surface stays responsive. The worker owns every table until
//! the single terminal event hands the outcome over; all steps inside it
//! are strictly sequential and file I/O is blocking. Cancellation is not
//! supported: once started, a run ends in exactly one of
//! [`RunEvent::Finished`] or [`RunEvent::Failed`].

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread::JoinHandle;

use tracing::{error, info_span};
use uuid::Uuid;

use crate::models::{ProcessOutcome, ReportVariant};
use crate::transform::pipeline::{process_batch, Notice};

/// Notification emitted by a worker run.
///
/// Progress and status are display-only updates; `Finished` and `Failed`
/// are mutually exclusive terminal events, and exactly one of them closes
/// every run.
#[derive(Debug)]
pub enum RunEvent {
    /// Monotonic progress, 0 to 100.
    Progress(u8),
    /// Human-readable status line, not meant for machine parsing.
    Status(String),
    /// The run succeeded; the caller now owns the outcome.
    Finished(Box<ProcessOutcome>),
    /// The run aborted or failed; the message is the operator-facing text.
    Failed(String),
}

/// Options of one run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Operator name attached to the run's log span (`Sistema` when
    /// absent). Passed explicitly instead of living in process-wide state.
    pub operator: Option<String>,
}

/// Handle to a spawned run: its id and the event stream.
///
/// There is no cancellation; dropping the handle detaches from the events
/// but the run keeps going to completion.
pub struct RunHandle {
    /// Identifier attached to every log line of this run.
    pub run_id: Uuid,
    /// Event stream; iterate until the terminal event.
    pub events: Receiver<RunEvent>,
    thread: Option<JoinHandle<()>>,
}

impl RunHandle {
    /// Wait for the worker thread to exit. Events may still be queued in
    /// the receiver afterwards.
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// Spawn one processing run on its own thread.
///
/// The worker converts every pipeline notice into a [`RunEvent`] and
/// guarantees the single-terminal-event contract: pipeline errors become
/// one `Failed` with the user-facing message, panics are caught and
/// reported as the generic failure, and no partial outcome is ever sent.
pub fn spawn_run(
    file_paths: Vec<PathBuf>,
    variant: ReportVariant,
    options: RunOptions,
) -> RunHandle {
    let run_id = Uuid::new_v4();
    let (sender, events) = channel();

    let thread = std::thread::spawn(move || {
        run_worker(run_id, file_paths, variant, options, sender);
    });

    RunHandle {
        run_id,
        events,
        thread: Some(thread),
    }
}

fn run_worker(
    run_id: Uuid,
    file_paths: Vec<PathBuf>,
    variant: ReportVariant,
    options: RunOptions,
    sender: Sender<RunEvent>,
) {
    let usuario = options.operator.as_deref().unwrap_or("Sistema").to_string();
    let span = info_span!("procesamiento", corrida = %run_id, usuario = %usuario);
    let _guard = span.enter();

    let result = catch_unwind(AssertUnwindSafe(|| {
        let progress_sender = sender.clone();
        process_batch(&file_paths, variant, &mut move |notice| {
            // A disconnected receiver just means nobody is watching.
            let _ = progress_sender.send(match notice {
                Notice::Progress(p) => RunEvent::Progress(p),
                Notice::Status(s) => RunEvent::Status(s),
            });
        })
    }));

    let terminal = match result {
        Ok(Ok(outcome)) => RunEvent::Finished(Box::new(outcome)),
        Ok(Err(e)) => {
            error!("{e}");
            RunEvent::Failed(e.to_string())
        }
        Err(_) => {
            error!("Fallo interno no controlado durante el procesamiento");
            RunEvent::Failed("Error inesperado: fallo interno del procesamiento".into())
        }
    };
    let _ = sender.send(terminal);
}
