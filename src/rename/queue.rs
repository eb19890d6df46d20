// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use futures::Stream;
use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedSender};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::drive::DriveGateway;

use super::plan::RenameOperation;
use super::working_set::WorkingSet;

/// Pause after every rename attempt, keeping Drive's rate limits happy
pub const DEFAULT_THROTTLE: Duration = Duration::from_millis(300);

/// Lifecycle of a single rename
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenameStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

/// Progress of one operation, emitted in order as the queue advances
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameEvent {
    /// Position of the operation in the batch
    pub index: usize,
    /// Number of operations in the batch
    pub total: usize,
    pub operation: RenameOperation,
    pub status: RenameStatus,
    /// Failure message for `Error` events
    pub error: Option<String>,
}

/// Final state of an attempted operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameOutcome {
    pub operation: RenameOperation,
    pub status: RenameStatus,
    pub error: Option<String>,
}

/// Result of a finished (or cancelled) batch
#[derive(Debug, Clone)]
pub struct RenameReport {
    /// Outcomes of every attempted operation, in batch order
    pub outcomes: Vec<RenameOutcome>,
    /// Number of operations in the batch
    pub total: usize,
    /// The working set with all successful renames applied
    pub working_set: WorkingSet,
    /// Whether the batch stopped early because it was cancelled
    pub cancelled: bool,
}

impl RenameReport {
    pub fn completed(&self) -> usize {
        self.count(RenameStatus::Completed)
    }

    pub fn failed(&self) -> usize {
        self.count(RenameStatus::Error)
    }

    /// Status of every operation in the batch; never-attempted ones stay `Pending`
    pub fn statuses(&self) -> Vec<RenameStatus> {
        let mut statuses: Vec<_> = self.outcomes.iter().map(|o| o.status).collect();
        statuses.resize(self.total, RenameStatus::Pending);
        statuses
    }

    fn count(&self, status: RenameStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}

/// Runs rename operations one at a time against a Drive gateway
pub struct RenameQueue<G: ?Sized> {
    gateway: Arc<G>,
    throttle: Duration,
}

impl<G: DriveGateway + ?Sized + 'static> RenameQueue<G> {
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            throttle: DEFAULT_THROTTLE,
        }
    }

    /// Change the pause between operations
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Start processing the batch on a background task
    pub fn spawn(&self, operations: Vec<RenameOperation>, working_set: WorkingSet) -> RenameTask {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run_queue(
            self.gateway.clone(),
            operations,
            working_set,
            self.throttle,
            cancel.clone(),
            tx,
        ));

        RenameTask {
            events: UnboundedReceiverStream::new(rx),
            cancel,
            handle,
        }
    }
}

/// A running batch: a one-shot stream of [`RenameEvent`]s plus its final report
pub struct RenameTask {
    events: UnboundedReceiverStream<RenameEvent>,
    cancel: CancellationToken,
    handle: JoinHandle<RenameReport>,
}

impl RenameTask {
    /// Stop before the next operation; a rename already sent is allowed to finish
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the worker to stop and return its report
    ///
    /// Events not yet consumed from the stream are discarded.
    pub async fn finish(self) -> RenameReport {
        drop(self.events);
        self.handle
            .await
            .unwrap_or_else(|e| std::panic::resume_unwind(e.into_panic()))
    }
}

impl Stream for RenameTask {
    type Item = RenameEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

async fn run_queue<G: DriveGateway + ?Sized>(
    gateway: Arc<G>,
    operations: Vec<RenameOperation>,
    mut working_set: WorkingSet,
    throttle: Duration,
    cancel: CancellationToken,
    events: UnboundedSender<RenameEvent>,
) -> RenameReport {
    let total = operations.len();
    let mut outcomes = Vec::with_capacity(total);
    let mut cancelled = false;

    // A closed receiver only means nobody is watching; the batch keeps going.
    let emit = |index: usize, operation: &RenameOperation, status, error: Option<String>| {
        let _ = events.send(RenameEvent {
            index,
            total,
            operation: operation.clone(),
            status,
            error,
        });
    };

    for (index, operation) in operations.into_iter().enumerate() {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        emit(index, &operation, RenameStatus::Processing, None);

        let (status, error) = match gateway
            .rename(&operation.file_id, &operation.new_name)
            .await
        {
            Ok(updated) => {
                info!(
                    old_name = %operation.old_name,
                    new_name = %operation.new_name,
                    "Renamed"
                );
                working_set.replace(updated);
                (RenameStatus::Completed, None)
            }
            Err(e) => {
                warn!(old_name = %operation.old_name, error = %e, "Rename failed");
                (RenameStatus::Error, Some(e.to_string()))
            }
        };

        emit(index, &operation, status, error.clone());
        outcomes.push(RenameOutcome {
            operation,
            status,
            error,
        });

        tokio::select! {
            _ = cancel.cancelled() => {}
            _ = tokio::time::sleep(throttle) => {}
        }
    }

    info!(
        attempted = outcomes.len(),
        total, cancelled, "Rename batch finished"
    );

    RenameReport {
        outcomes,
        total,
        working_set,
        cancelled,
    }
}
