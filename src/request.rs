//! Request building: MIME inference, file loading and the wire payload.
//!
//! MIME types are inferred for every path before any file is read, and any
//! read failure aborts the whole build. Nothing touches the network here.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::config::RecognitionConfig;
use crate::error::{Error, Result};

/// File types the service accepts
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MimeType {
    /// `.bmp`
    Bmp,
    /// `.gif`
    Gif,
    /// `.pdf`
    Pdf,
    /// `.png`
    Png,
    /// `.jpg`
    Jpg,
    /// `.jpeg`
    Jpeg,
}

impl MimeType {
    const SUFFIXES: [(&'static str, MimeType); 6] = [
        (".bmp", MimeType::Bmp),
        (".gif", MimeType::Gif),
        (".pdf", MimeType::Pdf),
        (".png", MimeType::Png),
        (".jpg", MimeType::Jpg),
        (".jpeg", MimeType::Jpeg),
    ];

    /// Infer the MIME type from the file name suffix (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path.to_string_lossy().to_lowercase();
        Self::SUFFIXES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map(|(_, mime)| *mime)
            .ok_or_else(|| Error::UnrecognizedFileType {
                path: path.to_path_buf(),
            })
    }

    /// MIME string as sent to the service
    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Bmp => "image/bmp",
            MimeType::Gif => "image/gif",
            MimeType::Pdf => "application/pdf",
            MimeType::Png => "image/png",
            // the service expects the non-standard "image/jpg" for .jpg files
            MimeType::Jpg => "image/jpg",
            MimeType::Jpeg => "image/jpeg",
        }
    }
}

/// One file of a submission
#[derive(Clone, Debug)]
pub struct SubmissionFile {
    /// Position in the submission; the join key for returned pages
    pub index: usize,
    /// Where the file was read from
    pub path: PathBuf,
    /// Inferred MIME type
    pub mime_type: MimeType,
    /// Raw file contents
    pub payload: Vec<u8>,
}

/// The ordered batch of files sent in one request
#[derive(Clone, Debug)]
pub struct Submission {
    files: Vec<SubmissionFile>,
}

impl Submission {
    /// Infer MIME types for all paths, then read every file
    pub async fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self> {
        if paths.is_empty() {
            return Err(Error::EmptySubmission);
        }

        let mime_types = paths
            .iter()
            .map(|p| MimeType::from_path(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let mut files = Vec::with_capacity(paths.len());
        for (index, (path, mime_type)) in paths.iter().zip(mime_types).enumerate() {
            let path = path.as_ref().to_path_buf();
            let payload = tokio::fs::read(&path)
                .await
                .map_err(|source| Error::ReadFile {
                    path: path.clone(),
                    source,
                })?;
            tracing::debug!(index, path = %path.display(), bytes = payload.len(), "loaded file");
            files.push(SubmissionFile {
                index,
                path,
                mime_type,
                payload,
            });
        }

        Ok(Self { files })
    }

    /// Files in submission order
    pub fn files(&self) -> &[SubmissionFile] {
        &self.files
    }

    /// Number of files
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Always false for a built submission
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Wire body of the initial POST
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SightRequest {
    pub files: Vec<SightRequestFile>,
    pub make_sentences: bool,
    pub do_exif_rotate: bool,
    pub do_auto_rotate: bool,
    pub do_async: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub script_hints: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SightRequestFile {
    pub mime_type: &'static str,
    pub base64_file: String,
}

impl SightRequest {
    pub(crate) fn new(submission: &Submission, config: &RecognitionConfig) -> Self {
        Self {
            files: submission
                .files()
                .iter()
                .map(|file| SightRequestFile {
                    mime_type: file.mime_type.as_str(),
                    base64_file: STANDARD.encode(&file.payload),
                })
                .collect(),
            make_sentences: config.make_sentences,
            do_exif_rotate: config.do_exif_rotate,
            do_auto_rotate: config.do_auto_rotate,
            do_async: config.do_async,
            script_hints: config.script_hints.clone(),
        }
    }

    pub(crate) fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}
