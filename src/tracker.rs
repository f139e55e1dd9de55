//! Per-file page arrival bookkeeping.
//!
//! Each file records its declared page count the first time any page of that
//! file is observed, along with the set of page numbers seen so far. A file is
//! complete once every declared page has been seen; the batch is complete once
//! every submitted file is. Files that have never reported keep the batch
//! incomplete. The declared count is never used to size an allocation.

use std::collections::{BTreeSet, HashMap};

use crate::types::RecognizedPage;

#[derive(Debug, Default)]
struct FilePages {
    declared: usize,
    seen: BTreeSet<usize>,
}

impl FilePages {
    fn is_complete(&self) -> bool {
        self.seen.len() == self.declared
    }
}

/// Tracks which pages of which files have been delivered
#[derive(Debug, Default)]
pub struct CompletionTracker {
    files: HashMap<usize, FilePages>,
}

impl CompletionTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a delivered page
    ///
    /// Placeholder pages (`page_number <= 0`) register their file but never
    /// count as a delivered page. Pages with a negative file index are ignored.
    pub fn observe(&mut self, page: &RecognizedPage) {
        let Ok(file_index) = usize::try_from(page.file_index) else {
            tracing::warn!(
                file_index = page.file_index,
                "page with negative file index, not counted"
            );
            return;
        };

        let file = self.files.entry(file_index).or_default();
        // zero declared pages came from a zero-page placeholder; let a real page set the count
        if file.declared == 0 {
            file.declared = page.number_of_pages_in_file;
        }

        if page.is_placeholder() {
            return;
        }

        match usize::try_from(page.page_number) {
            Ok(number) if number <= file.declared => {
                file.seen.insert(number);
            }
            _ => tracing::warn!(
                file_index,
                page_number = page.page_number,
                declared_pages = file.declared,
                "page number outside the file's declared page count, not counted"
            ),
        }
    }

    /// True once every page of `file_index` has been observed
    pub fn is_file_complete(&self, file_index: usize) -> bool {
        self.files
            .get(&file_index)
            .is_some_and(FilePages::is_complete)
    }

    /// True once every file in `0..total_files` is complete
    pub fn is_batch_complete(&self, total_files: usize) -> bool {
        (0..total_files).all(|index| self.is_file_complete(index))
    }

    /// Number of complete files among `0..total_files`
    pub fn completed_files(&self, total_files: usize) -> usize {
        (0..total_files)
            .filter(|&index| self.is_file_complete(index))
            .count()
    }
}
