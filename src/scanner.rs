// Scan workflow: the state behind "take photo / upload image". It owns the
// busy flag and the message shown to the user, and is the only place where
// scan failures are turned into text.
//
// A scan is split in two halves around the network call: `start` flips the
// state to busy and hands out a `PendingScan`, `finish` consumes it with the
// call's outcome. `submit` runs both halves against a `CardApi`.

use crate::api::CardApi;
use crate::collection::CardCollection;
use crate::error::ApiError;
use crate::models::ScanResult;
use crate::picker::FilePicker;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const SCAN_FAILED_FALLBACK: &str = "Failed to scan card";

/// What the user sees: whether a scan is in flight and the last outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanState {
    pub busy: bool,
    pub message: String,
}

/// Proof that a scan was started. Only `ScanWorkflow::start` creates one,
/// and it refuses while another scan is in flight.
#[derive(Debug)]
pub struct PendingScan {
    file: PathBuf,
}

impl PendingScan {
    pub fn file(&self) -> &Path {
        &self.file
    }
}

/// Result of asking the workflow to scan something.
#[derive(Debug, PartialEq)]
pub enum SubmitOutcome {
    /// Nothing was selected; state untouched.
    NoFile,
    /// A scan is already running; state untouched.
    Busy,
    Scanned(ScanResult),
    Failed,
}

type Observer = Box<dyn FnMut(&ScanState)>;

#[derive(Default)]
pub struct ScanWorkflow {
    state: ScanState,
    observers: Vec<Observer>,
}

impl ScanWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    pub fn is_busy(&self) -> bool {
        self.state.busy
    }

    pub fn message(&self) -> &str {
        &self.state.message
    }

    /// Whether the scan trigger is enabled.
    pub fn can_trigger(&self) -> bool {
        !self.state.busy
    }

    /// Register a callback run after every state change.
    pub fn subscribe<F>(&mut self, observer: F)
    where
        F: FnMut(&ScanState) + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    fn notify(&mut self) {
        for observer in &mut self.observers {
            observer(&self.state);
        }
    }

    /// Enter the busy state for `file`. Returns `None`, leaving the state
    /// as it was, when no file was given or a scan is already running.
    pub fn start(&mut self, file: Option<PathBuf>) -> Option<PendingScan> {
        let file = match file {
            Some(file) => file,
            None => {
                debug!("no file selected, nothing to scan");
                return None;
            }
        };
        if self.state.busy {
            debug!(file = %file.display(), "scan already in flight, ignoring");
            return None;
        }
        self.state.busy = true;
        self.state.message.clear();
        self.notify();
        Some(PendingScan { file })
    }

    /// Leave the busy state with the outcome of the scan call.
    pub fn finish(&mut self, pending: PendingScan, result: &Result<ScanResult, ApiError>) -> &ScanState {
        self.state.message = match result {
            Ok(scan) => {
                info!(file = %pending.file.display(), message = %scan.message, "card scanned");
                format!("Success: {}", scan.message)
            }
            Err(e) => {
                warn!(file = %pending.file.display(), error = %e, "card scan failed");
                format!("Error: {}", e.reason().unwrap_or_else(|| SCAN_FAILED_FALLBACK.to_string()))
            }
        };
        self.state.busy = false;
        self.notify();
        &self.state
    }

    /// Scan `file` and fold a successful result into `collection`.
    pub fn submit<A>(&mut self, api: &A, collection: &mut CardCollection, file: Option<PathBuf>) -> SubmitOutcome
    where
        A: CardApi + ?Sized,
    {
        if file.is_some() && self.state.busy {
            return SubmitOutcome::Busy;
        }
        let pending = match self.start(file) {
            Some(pending) => pending,
            None => return SubmitOutcome::NoFile,
        };
        let result = api.scan_card(pending.file());
        // The outcome is shown before the collection catches up.
        self.finish(pending, &result);
        match result {
            Ok(scan) => {
                merge_into_collection(api, collection, &scan);
                SubmitOutcome::Scanned(scan)
            }
            Err(_) => SubmitOutcome::Failed,
        }
    }

    /// The scan trigger: does nothing while busy, otherwise asks `picker`
    /// for a file and submits it.
    pub fn trigger<A, P>(&mut self, api: &A, collection: &mut CardCollection, picker: &mut P) -> SubmitOutcome
    where
        A: CardApi + ?Sized,
        P: FilePicker + ?Sized,
    {
        if !self.can_trigger() {
            return SubmitOutcome::Busy;
        }
        let file = picker.pick_image();
        self.submit(api, collection, file)
    }
}

// Prefer the card embedded in the response; otherwise reload the list. A
// failed reload only costs freshness, the scan itself already succeeded.
fn merge_into_collection<A>(api: &A, collection: &mut CardCollection, scan: &ScanResult)
where
    A: CardApi + ?Sized,
{
    match scan.card() {
        Some(card) => {
            collection.upsert(card);
        }
        None => {
            if let Err(e) = collection.refresh(api) {
                warn!(error = %e, "could not refresh collection after scan");
            }
        }
    }
}
