// src/analyzer.rs

use crate::config::IgnoreConfig;
use crate::error::Result;
use crate::extractor::SourceObjectExtractor;
use crate::model::*;
use crate::vcs::{ChangedPath, VersionControl};
use indicatif::ProgressBar;
use std::collections::BTreeMap;

/// A changed path after folding the staged and unstaged views together
#[derive(Debug, Clone)]
struct PendingChange {
    status: FileStatus,
    current_path: String,
}

pub struct ChangeSetAnalyzer<'a, V: VersionControl + ?Sized> {
    vcs: &'a V,
    config: &'a IgnoreConfig,
    extractor: SourceObjectExtractor,
}

impl<'a, V: VersionControl + ?Sized> ChangeSetAnalyzer<'a, V> {
    pub fn new(vcs: &'a V, config: &'a IgnoreConfig, extractor: SourceObjectExtractor) -> Self {
        Self { vcs, config, extractor }
    }

    /// Reports object-level changes for every changed file that passes the
    /// configured filters.
    ///
    /// With `staged_only` only the last commit vs. the index is considered.
    /// Otherwise unstaged edits and untracked files are included as well.
    pub fn analyze(&self, staged_only: bool) -> Result<AnalysisResult> {
        let mut changes = self.vcs.staged_changes()?;
        let untracked = if staged_only {
            Vec::new()
        } else {
            changes.extend(self.vcs.unstaged_changes()?);
            self.vcs.untracked_files()?
        };

        let bar = ProgressBar::new((changes.len() + untracked.len()) as u64);
        bar.set_message("Analyzing changes");

        let pending = self.collect_pending(&changes, &bar);
        let mut results = AnalysisResult::new();
        for (path, change) in pending {
            let file_change = self.analyze_change(&path, &change);
            results.insert(path, file_change);
        }

        for path in &untracked {
            bar.inc(1);
            if !self.config.accepts(path) {
                tracing::debug!(%path, "skipping untracked file");
                continue;
            }
            if results.contains_key(path) {
                tracing::warn!(%path, "path is both changed and untracked, keeping the tracked result");
                continue;
            }
            let Some(content) = self.vcs.read_workdir(path) else {
                tracing::debug!(%path, "untracked file vanished from working tree");
                continue;
            };
            results.insert(path.clone(), self.analyze_untracked(path, &content));
        }

        bar.finish_and_clear();
        tracing::info!(files = results.len(), staged_only, "analysis complete");
        Ok(results)
    }

    fn collect_pending(&self, changes: &[ChangedPath], bar: &ProgressBar) -> BTreeMap<String, PendingChange> {
        let mut pending: BTreeMap<String, PendingChange> = BTreeMap::new();

        for change in changes {
            bar.inc(1);
            let Some(path) = change.path() else { continue };
            if !self.config.accepts(path) {
                tracing::debug!(%path, "skipping filtered path");
                continue;
            }
            let current_path = change.current_path().unwrap_or(path).to_string();

            pending
                .entry(path.to_string())
                .and_modify(|earlier| {
                    earlier.status = earlier.status.then(change.status);
                    earlier.current_path = current_path.clone();
                })
                .or_insert(PendingChange { status: change.status, current_path });
        }

        pending
    }

    fn old_text(&self, path: &str, status: FileStatus) -> String {
        if status == FileStatus::Added {
            return String::new();
        }
        match self.vcs.file_at_head(path) {
            Some(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            None => {
                tracing::debug!(%path, "no content at last commit");
                String::new()
            }
        }
    }

    fn new_text(&self, path: &str, status: FileStatus) -> String {
        if status == FileStatus::Deleted {
            return String::new();
        }
        self.vcs.read_workdir(path).unwrap_or_else(|| {
            tracing::debug!(%path, "missing from working tree");
            String::new()
        })
    }

    fn analyze_change(&self, path: &str, change: &PendingChange) -> FileChange {
        let old_table = self.extractor.extract(&self.old_text(path, change.status));
        let new_table = self.extractor.extract(&self.new_text(&change.current_path, change.status));
        tracing::trace!(%path, old = old_table.len(), new = new_table.len(), "extracted objects");

        FileChange::from_delta(path, change.status, ObjectTable::diff(&old_table, &new_table))
    }

    fn analyze_untracked(&self, path: &str, content: &str) -> FileChange {
        let new_table = self.extractor.extract(content);
        if new_table.is_empty() {
            tracing::debug!(%path, "untracked file declares no functions or classes");
        }
        FileChange::from_delta(path, FileStatus::Added, ObjectTable::diff(&ObjectTable::new(), &new_table))
    }
}
