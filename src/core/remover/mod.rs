//! # Remover Module
//!
//! Deletes all but one image from each duplicate group.
//!
//! The kept image is the largest file on disk; ties go to the image listed
//! first. Sizes are read again right before deletion, so files that changed
//! since scanning are judged by their current size.
//!
//! Failures are per file: a file that cannot be removed is reported and the
//! rest of the group, and every later group, are still processed. Nothing
//! already removed is restored.

use crate::core::comparator::DuplicateGroup;
use crate::core::reporter::save_groups;
use crate::error::{ReportError, RemoveError};
use crate::events::{null_sender, Event, EventSender, RemoveEvent};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of a removal pass
#[derive(Debug, Default)]
pub struct RemovalReport {
    /// Files deleted (or that would be deleted in a dry run)
    pub removed: Vec<PathBuf>,
    /// One kept file per processed group
    pub kept: Vec<PathBuf>,
    /// Bytes freed by the removals
    pub freed_bytes: u64,
    /// Non-fatal failures
    pub failures: Vec<RemoveError>,
}

/// Index of the image to keep: largest size, first one on ties
pub fn select_keeper(sizes: &[u64]) -> Option<usize> {
    sizes
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, u64)>, (i, &size)| match best {
            Some((_, best_size)) if best_size >= size => best,
            _ => Some((i, size)),
        })
        .map(|(i, _)| i)
}

/// Deletes duplicates, keeping one image per group
#[derive(Debug, Clone, Copy, Default)]
pub struct DuplicateRemover {
    dry_run: bool,
}

impl DuplicateRemover {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide what would be removed without touching the filesystem
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn remove(&self, groups: &[DuplicateGroup]) -> RemovalReport {
        self.remove_with_events(groups, &null_sender())
    }

    /// Save `groups` to `record`, then remove duplicates.
    ///
    /// Nothing is deleted unless the record was written.
    pub fn remove_recorded(
        &self,
        record: &Path,
        groups: &[DuplicateGroup],
        events: &EventSender,
    ) -> Result<RemovalReport, ReportError> {
        save_groups(record, groups)?;
        Ok(self.remove_with_events(groups, events))
    }

    pub fn remove_with_events(
        &self,
        groups: &[DuplicateGroup],
        events: &EventSender,
    ) -> RemovalReport {
        let mut report = RemovalReport::default();

        for group in groups {
            self.remove_group(&group.images, &mut report, events);
        }

        events.send(Event::Remove(RemoveEvent::Completed {
            removed: report.removed.len(),
            failed: report.failures.len(),
        }));
        info!(
            removed = report.removed.len(),
            failed = report.failures.len(),
            freed_bytes = report.freed_bytes,
            dry_run = self.dry_run,
            "duplicate removal finished"
        );

        report
    }

    fn remove_group(&self, images: &[PathBuf], report: &mut RemovalReport, events: &EventSender) {
        let sizes = match current_sizes(images) {
            Ok(sizes) => sizes,
            Err(e) => {
                // Without every size the keeper is unknowable; leave the group alone
                warn!(error = %e, "skipping group");
                events.send(Event::Remove(RemoveEvent::Failed {
                    path: failed_path(&e).to_path_buf(),
                    message: e.to_string(),
                }));
                report.failures.push(e);
                return;
            }
        };

        let Some(keep) = select_keeper(&sizes) else {
            return;
        };
        report.kept.push(images[keep].clone());

        for (i, (path, size)) in images.iter().zip(&sizes).enumerate() {
            if i == keep {
                continue;
            }

            let outcome = if self.dry_run {
                Ok(())
            } else {
                fs::remove_file(path)
            };

            match outcome {
                Ok(()) => {
                    report.removed.push(path.clone());
                    report.freed_bytes += size;
                    events.send(Event::Remove(RemoveEvent::Removed { path: path.clone() }));
                }
                Err(source) => {
                    warn!(path = %path.display(), error = %source, "failed to remove duplicate");
                    events.send(Event::Remove(RemoveEvent::Failed {
                        path: path.clone(),
                        message: source.to_string(),
                    }));
                    report.failures.push(RemoveError::RemoveFailed {
                        path: path.clone(),
                        source,
                    });
                }
            }
        }
    }
}

fn current_sizes(images: &[PathBuf]) -> Result<Vec<u64>, RemoveError> {
    images
        .iter()
        .map(|path| {
            fs::metadata(path)
                .map(|m| m.len())
                .map_err(|source| RemoveError::SizeUnavailable {
                    path: path.clone(),
                    source,
                })
        })
        .collect()
}

fn failed_path(error: &RemoveError) -> &Path {
    match error {
        RemoveError::SizeUnavailable { path, .. } | RemoveError::RemoveFailed { path, .. } => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventChannel;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, len: usize) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, vec![0u8; len]).unwrap();
        path
    }

    #[test]
    fn keeper_is_largest() {
        assert_eq!(select_keeper(&[10, 30, 20]), Some(1));
    }

    #[test]
    fn keeper_ties_go_to_first() {
        assert_eq!(select_keeper(&[5, 9, 9, 1]), Some(1));
        assert_eq!(select_keeper(&[7, 7]), Some(0));
    }

    #[test]
    fn keeper_of_nothing_is_none() {
        assert_eq!(select_keeper(&[]), None);
    }

    #[test]
    fn removes_all_but_the_largest() {
        let dir = TempDir::new().unwrap();
        let small = write(&dir, "small.png", 10);
        let large = write(&dir, "large.png", 100);
        let medium = write(&dir, "medium.png", 50);
        let group = DuplicateGroup::new(vec![small.clone(), large.clone(), medium.clone()], 0);

        let report = DuplicateRemover::new().remove(&[group]);

        assert!(large.exists());
        assert!(!small.exists());
        assert!(!medium.exists());
        assert_eq!(report.kept, vec![large]);
        assert_eq!(report.removed, vec![small, medium]);
        assert_eq!(report.freed_bytes, 60);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn equal_sizes_keep_the_first_listed() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.png", 32);
        let b = write(&dir, "b.png", 32);
        let group = DuplicateGroup::new(vec![a.clone(), b.clone()], 0);

        DuplicateRemover::new().remove(&[group]);

        assert!(a.exists());
        assert!(!b.exists());
    }

    #[test]
    fn dry_run_leaves_files_in_place() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.png", 8);
        let b = write(&dir, "b.png", 4);
        let group = DuplicateGroup::new(vec![a.clone(), b.clone()], 0);

        let report = DuplicateRemover::new().dry_run(true).remove(&[group]);

        assert!(a.exists());
        assert!(b.exists());
        assert_eq!(report.removed, vec![b]);
    }

    #[test]
    fn unreadable_group_is_skipped_and_later_groups_still_run() {
        let dir = TempDir::new().unwrap();
        let present = write(&dir, "present.png", 8);
        let missing = dir.path().join("missing.png");
        let c = write(&dir, "c.png", 8);
        let d = write(&dir, "d.png", 4);

        let groups = vec![
            DuplicateGroup::new(vec![present.clone(), missing], 0),
            DuplicateGroup::new(vec![c.clone(), d.clone()], 0),
        ];

        let report = DuplicateRemover::new().remove(&groups);

        assert!(present.exists());
        assert!(c.exists());
        assert!(!d.exists());
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0],
            RemoveError::SizeUnavailable { .. }
        ));
        assert_eq!(report.removed, vec![d]);
    }

    #[test]
    fn recorded_removal_saves_full_groups_first() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.png", 8);
        let b = write(&dir, "b.png", 4);
        let record = dir.path().join("dups.json");

        let report = DuplicateRemover::new()
            .remove_recorded(&record, &[DuplicateGroup::new(vec![a.clone(), b.clone()], 0)], &null_sender())
            .unwrap();

        assert_eq!(report.removed, vec![b.clone()]);
        let saved: Vec<Vec<PathBuf>> =
            serde_json::from_str(&fs::read_to_string(&record).unwrap()).unwrap();
        assert_eq!(saved, vec![vec![a, b]]);
    }

    #[test]
    fn failed_record_deletes_nothing() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.png", 8);
        let b = write(&dir, "b.png", 4);
        let record = dir.path().join("missing").join("dups.json");

        let result = DuplicateRemover::new().remove_recorded(
            &record,
            &[DuplicateGroup::new(vec![a.clone(), b.clone()], 0)],
            &null_sender(),
        );

        assert!(matches!(result, Err(ReportError::WriteFailed { .. })));
        assert!(a.exists());
        assert!(b.exists());
    }

    #[test]
    fn emits_removed_and_completed_events() {
        let dir = TempDir::new().unwrap();
        let a = write(&dir, "a.png", 8);
        let b = write(&dir, "b.png", 4);
        let (sender, receiver) = EventChannel::new();

        DuplicateRemover::new().remove_with_events(&[DuplicateGroup::new(vec![a, b.clone()], 0)], &sender);
        drop(sender);

        let events: Vec<_> = receiver.iter().collect();
        assert!(matches!(
            &events[0],
            Event::Remove(RemoveEvent::Removed { path }) if *path == b
        ));
        assert!(matches!(
            events.last(),
            Some(Event::Remove(RemoveEvent::Completed { removed: 1, failed: 0 }))
        ));
    }
}
