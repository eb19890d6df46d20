// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::drive::{DriveGateway, load_item};
use crate::error::DriveError;
use crate::progress::{ProgressEvent, SharedProgressReporter};
use crate::rename::{
    DEFAULT_THROTTLE, RenameOperation, RenameQueue, RenameReport, RenameRules, WorkingSet,
    plan_renames,
};

/// Options for a batch rename
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Pause between two renames
    pub throttle: Duration,
    /// Plan only; nothing is sent to Drive
    pub dry_run: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            throttle: DEFAULT_THROTTLE,
            dry_run: false,
        }
    }
}

/// Result of a batch rename
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// Every planned operation, in order
    pub planned: Vec<RenameOperation>,
    /// `None` for dry runs
    pub report: Option<RenameReport>,
}

/// Apply rename rules to every file of a Drive file or folder
///
/// Resolves the ID, plans the renames and runs them through a [`RenameQueue`],
/// forwarding each state change to the reporter. Cancelling `cancel` stops the
/// batch before its next operation.
pub async fn rename_item<G>(
    gateway: Arc<G>,
    id: &str,
    rules: &RenameRules,
    options: &BatchOptions,
    reporter: SharedProgressReporter,
    cancel: CancellationToken,
) -> Result<BatchResult, DriveError>
where
    G: DriveGateway + ?Sized + 'static,
{
    reporter.report(ProgressEvent::ResolvingItem { id: id.to_string() });
    let item = load_item(gateway.as_ref(), id).await?;
    reporter.report(ProgressEvent::ItemResolved {
        name: item.name().to_string(),
        is_folder: item.is_folder(),
        files: item.files().len(),
    });

    let working_set = WorkingSet::new(item.into_files());
    let planned = plan_renames(working_set.entries(), rules);
    reporter.report(ProgressEvent::RenamesPlanned {
        planned: planned.len(),
        unchanged: working_set.entries().len() - planned.len(),
    });

    if options.dry_run {
        info!(planned = planned.len(), "Dry run, nothing renamed");
        return Ok(BatchResult {
            planned,
            report: None,
        });
    }

    let mut task = RenameQueue::new(gateway)
        .with_throttle(options.throttle)
        .spawn(planned.clone(), working_set);
    let stopping = task.cancellation_token();

    loop {
        tokio::select! {
            event = task.next() => match event {
                Some(event) => reporter.report(ProgressEvent::Rename(event)),
                None => break,
            },
            _ = cancel.cancelled(), if !stopping.is_cancelled() => {
                info!("Cancelling rename batch");
                task.cancel();
            }
        }
    }

    let report = task.finish().await;
    reporter.report(ProgressEvent::RenamesFinished {
        completed: report.completed(),
        failed: report.failed(),
        skipped: report.total - report.outcomes.len(),
        cancelled: report.cancelled,
    });

    Ok(BatchResult {
        planned,
        report: Some(report),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::drive::{FOLDER_MIME_TYPE, FileEntry, FolderListing};
    use crate::progress::ProgressReporter;
    use crate::rename::RenameStatus;

    fn entry(id: &str, name: &str, mime: &str) -> FileEntry {
        FileEntry {
            id: id.to_string(),
            name: name.to_string(),
            size: 0,
            mime_type: mime.to_string(),
            web_content_link: None,
        }
    }

    struct FolderDrive {
        renamed: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl DriveGateway for FolderDrive {
        async fn get_info(&self, id: &str) -> Result<FileEntry, DriveError> {
            Ok(entry(id, "Dark S01", FOLDER_MIME_TYPE))
        }

        async fn list_folder(&self, _folder_id: &str) -> Result<FolderListing, DriveError> {
            let mut listing = FolderListing::default();
            listing.extend([
                entry("a", "Dark.S01E01.WEB.mkv", "video/x-matroska"),
                entry("b", "Dark.S01E02.WEB.mkv", "video/x-matroska"),
                entry("c", "notes.txt", "text/plain"),
            ]);
            Ok(listing)
        }

        async fn rename(&self, file_id: &str, new_name: &str) -> Result<FileEntry, DriveError> {
            self.renamed.lock().unwrap().push(new_name.to_string());
            Ok(entry(file_id, new_name, "video/x-matroska"))
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn report(&self, event: ProgressEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    fn web_to_bluray() -> RenameRules {
        RenameRules {
            find: "WEB".to_string(),
            replace: "BluRay".to_string(),
            append: String::new(),
        }
    }

    fn drive() -> Arc<FolderDrive> {
        Arc::new(FolderDrive {
            renamed: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn renames_every_matching_file() {
        let drive = drive();
        let reporter = Arc::new(RecordingReporter::default());

        let result = rename_item(
            drive.clone(),
            "folder",
            &web_to_bluray(),
            &BatchOptions::default(),
            reporter.clone(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(result.planned.len(), 2);
        let report = result.report.unwrap();
        assert_eq!(report.statuses(), vec![RenameStatus::Completed; 2]);
        assert_eq!(
            report.working_set.get("b").unwrap().name,
            "Dark.S01E02.BluRay.mkv"
        );
        assert_eq!(
            drive.renamed.lock().unwrap().as_slice(),
            ["Dark.S01E01.BluRay.mkv", "Dark.S01E02.BluRay.mkv"]
        );

        let events = reporter.events.lock().unwrap();
        assert!(matches!(events[0], ProgressEvent::ResolvingItem { .. }));
        assert!(matches!(
            events[1],
            ProgressEvent::ItemResolved {
                is_folder: true,
                files: 3,
                ..
            }
        ));
        assert!(matches!(
            events[2],
            ProgressEvent::RenamesPlanned {
                planned: 2,
                unchanged: 1
            }
        ));
        let renames = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Rename(_)))
            .count();
        assert_eq!(renames, 4);
        assert!(matches!(
            events.last(),
            Some(ProgressEvent::RenamesFinished {
                completed: 2,
                failed: 0,
                skipped: 0,
                cancelled: false
            })
        ));
    }

    #[tokio::test]
    async fn dry_run_sends_nothing() {
        let drive = drive();
        let options = BatchOptions {
            dry_run: true,
            ..BatchOptions::default()
        };

        let result = rename_item(
            drive.clone(),
            "folder",
            &web_to_bluray(),
            &options,
            crate::progress::NoopReporter::shared(),
            CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(result.planned.len(), 2);
        assert!(result.report.is_none());
        assert!(drive.renamed.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_batch_skips_remaining() {
        let drive = drive();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = rename_item(
            drive.clone(),
            "folder",
            &web_to_bluray(),
            &BatchOptions::default(),
            crate::progress::NoopReporter::shared(),
            cancel,
        )
        .await
        .unwrap();

        let report = result.report.unwrap();
        assert!(report.cancelled);
        assert!(report.outcomes.len() < 2);
    }
}
