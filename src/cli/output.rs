//! Output handling for the command-line tool.

use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::tracker::CompletionTracker;
use crate::types::RecognizedPage;

/// Streams pages into a `{"Pages":[...]}` JSON document
pub struct PagesWriter<W: Write> {
    inner: W,
    first: bool,
}

impl<W: Write> PagesWriter<W> {
    /// Write the document prologue
    pub fn new(mut inner: W) -> io::Result<Self> {
        inner.write_all(br#"{"Pages":["#)?;
        Ok(Self { inner, first: true })
    }

    /// Append one page
    pub fn write_page(&mut self, page: &RecognizedPage) -> io::Result<()> {
        if !self.first {
            self.inner.write_all(b",")?;
        }
        self.first = false;
        serde_json::to_writer(&mut self.inner, page)?;
        Ok(())
    }

    /// Close the document and flush
    pub fn finish(mut self) -> io::Result<W> {
        self.inner.write_all(b"]}")?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Reports each input file once, the first time all of its pages have arrived
pub struct Progress {
    tracker: CompletionTracker,
    reported: HashSet<usize>,
    total_files: usize,
}

impl Progress {
    /// Track a batch of `total_files`
    pub fn new(total_files: usize) -> Self {
        Self {
            tracker: CompletionTracker::new(),
            reported: HashSet::new(),
            total_files,
        }
    }

    /// Record a page; returns the number of complete files if this page finished one
    pub fn observe(&mut self, page: &RecognizedPage) -> Option<usize> {
        self.tracker.observe(page);
        let index = page.file_position()?;
        if self.tracker.is_file_complete(index) && self.reported.insert(index) {
            Some(self.reported.len())
        } else {
            None
        }
    }

    /// Number of files in the batch
    pub fn total_files(&self) -> usize {
        self.total_files
    }

    /// True once every file has completed
    pub fn is_complete(&self) -> bool {
        self.tracker.is_batch_complete(self.total_files)
    }
}

/// Save a rotated image as `autoRotated-<name>` in `dir` without overwriting
///
/// Existing files push the name to `1-autoRotated-<name>`, `2-autoRotated-<name>`, ...
pub fn save_rotated_image(dir: &Path, source: &Path, image: &[u8]) -> io::Result<PathBuf> {
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    let base = format!("autoRotated-{name}");

    let mut candidate = dir.join(&base);
    let mut number = 1u32;
    loop {
        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(mut file) => {
                file.write_all(image)?;
                return Ok(candidate);
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                candidate = dir.join(format!("{number}-{base}"));
                number += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Create the output file, truncating an existing one
pub fn create_output(path: &Path) -> io::Result<io::BufWriter<File>> {
    File::create(path).map(io::BufWriter::new)
}
