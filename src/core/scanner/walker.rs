//! Directory walking implementation using walkdir.

use super::{filter::ImageFilter, ImageFile, ScanResult};
use crate::error::ScanError;
use crate::events::{null_sender, Event, EventSender, ScanEvent};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Configuration for the directory scanner
#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    /// Descend into subdirectories (default: only the top level)
    pub recursive: bool,
    /// Whether to follow symbolic links
    pub follow_symlinks: bool,
}

/// Scanner implementation using the walkdir crate
pub struct DirectoryScanner {
    config: ScanConfig,
    filter: ImageFilter,
}

impl DirectoryScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            filter: ImageFilter::new(),
        }
    }

    pub fn scan(&self, root: &Path) -> Result<ScanResult, ScanError> {
        self.scan_with_events(root, &null_sender())
    }

    /// List image files under `root`, sorted by path.
    ///
    /// A missing root is an error; unreadable entries below it are collected
    /// in [`ScanResult::errors`] and the scan continues.
    pub fn scan_with_events(
        &self,
        root: &Path,
        events: &EventSender,
    ) -> Result<ScanResult, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::DirectoryNotFound {
                path: root.to_path_buf(),
            });
        }

        events.send(Event::Scan(ScanEvent::Started {
            root: root.to_path_buf(),
        }));

        let mut walker = WalkDir::new(root)
            .min_depth(1)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();
        if !self.config.recursive {
            walker = walker.max_depth(1);
        }

        let mut images = Vec::new();
        let mut errors = Vec::new();

        for entry_result in walker {
            match entry_result {
                Ok(entry) => {
                    if !entry.file_type().is_file() && !entry.path().is_file() {
                        continue;
                    }

                    let path = entry.path();
                    if !self.filter.should_include(path) {
                        continue;
                    }

                    match fs::metadata(path) {
                        Ok(metadata) => {
                            events.send(Event::Scan(ScanEvent::ImageFound {
                                path: path.to_path_buf(),
                            }));
                            images.push(ImageFile {
                                path: path.to_path_buf(),
                                size: metadata.len(),
                                format: self.filter.get_format(path),
                            });
                        }
                        Err(e) => {
                            let error = ScanError::ReadDirectory {
                                path: path.to_path_buf(),
                                source: e,
                            };
                            warn!("{}", error);
                            events.send(Event::Scan(ScanEvent::Error {
                                path: path.to_path_buf(),
                                message: error.to_string(),
                            }));
                            errors.push(error);
                        }
                    }
                }
                Err(e) => {
                    let path = e.path().map(|p| p.to_path_buf()).unwrap_or_default();

                    let error = if e.io_error().map(|e| e.kind())
                        == Some(std::io::ErrorKind::PermissionDenied)
                    {
                        ScanError::PermissionDenied { path: path.clone() }
                    } else {
                        ScanError::ReadDirectory {
                            path: path.clone(),
                            source: std::io::Error::other(e.to_string()),
                        }
                    };

                    warn!("{}", error);
                    events.send(Event::Scan(ScanEvent::Error {
                        path,
                        message: error.to_string(),
                    }));
                    errors.push(error);
                }
            }
        }

        images.sort_by(|a, b| a.path.cmp(&b.path));
        debug!(root = %root.display(), images = images.len(), "scan finished");

        events.send(Event::Scan(ScanEvent::Completed {
            total_images: images.len(),
        }));

        Ok(ScanResult { images, errors })
    }
}
