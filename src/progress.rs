use std::sync::Arc;

use crate::rename::RenameEvent;

/// Events emitted while a Drive batch rename runs, for progress reporting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Metadata for a Drive ID is being fetched
    ResolvingItem { id: String },

    /// The ID resolved to a file or a fully listed folder
    ItemResolved {
        name: String,
        is_folder: bool,
        files: usize,
    },

    /// Renames were planned from the rules
    RenamesPlanned {
        /// Operations that will change a name
        planned: usize,
        /// Files the rules leave untouched
        unchanged: usize,
    },

    /// A single operation changed state
    Rename(RenameEvent),

    /// The batch stopped, either done or cancelled
    RenamesFinished {
        completed: usize,
        failed: usize,
        /// Operations never attempted because of cancellation
        skipped: usize,
        cancelled: bool,
    },
}

/// Trait for reporting progress events during a batch rename.
///
/// Implementations can use this to display progress bars, log messages,
/// or collect statistics.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress event
    fn report(&self, event: ProgressEvent);
}

/// A shared reference to a progress reporter
pub type SharedProgressReporter = Arc<dyn ProgressReporter>;

/// A no-op progress reporter that silently ignores all events.
/// Useful for tests or quiet mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn report(&self, _event: ProgressEvent) {}
}

impl NoopReporter {
    /// Create a new NoopReporter wrapped in an Arc
    pub fn shared() -> SharedProgressReporter {
        Arc::new(Self)
    }
}
