//! Core types for sight
//!
//! Page and region types are relayed verbatim from the service. Their serde
//! shape is the Sight wire format (PascalCase keys, base64 images).

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// One page of recognized output
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RecognizedPage {
    /// Error reported by the service for this page (empty on success)
    pub error: String,

    /// Position of the source file in the submission
    ///
    /// Signed because the service relays it unchecked; see [`file_position`](Self::file_position).
    pub file_index: i64,

    /// 1-based page number; zero or negative marks a placeholder (e.g. a whole-file error)
    pub page_number: i64,

    /// Total pages the service found in the source file
    pub number_of_pages_in_file: usize,

    /// Recognized text regions
    #[serde(deserialize_with = "null_as_default")]
    pub recognized_text: Vec<RecognizedText>,

    /// Auto-rotated image, present only when rotation was requested
    #[serde(
        rename = "Base64Image",
        with = "base64_image",
        skip_serializing_if = "Option::is_none"
    )]
    pub rotated_image: Option<Vec<u8>>,
}

impl RecognizedPage {
    /// True for pages that do not stand for a real page of the file
    pub fn is_placeholder(&self) -> bool {
        self.page_number <= 0
    }

    /// Index into the submission, or `None` if the service sent a negative index
    pub fn file_position(&self) -> Option<usize> {
        usize::try_from(self.file_index).ok()
    }

    /// Error message, if the service reported one
    pub fn error(&self) -> Option<&str> {
        (!self.error.is_empty()).then_some(self.error.as_str())
    }
}

/// A single recognized text region with its bounding quadrilateral
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
#[allow(missing_docs)]
pub struct RecognizedText {
    /// The recognized text
    pub text: String,
    pub top_left_x: i32,
    pub top_left_y: i32,
    pub top_right_x: i32,
    pub top_right_y: i32,
    pub bottom_left_x: i32,
    pub bottom_left_y: i32,
    pub bottom_right_x: i32,
    pub bottom_right_y: i32,
    /// Recognition confidence in `[0, 1]`
    pub confidence: f64,
}

/// Opaque reference to an in-progress asynchronous job
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PollingHandle(url::Url);

impl PollingHandle {
    /// Parse a polling URL returned by the service
    pub fn parse(raw: &str) -> Result<Self> {
        url::Url::parse(raw)
            .map(Self)
            .map_err(|e| Error::protocol("initial", format!("invalid PollingURL {raw:?}: {e}")))
    }

    /// The polling URL
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for PollingHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

/// How a page stream ended
#[derive(Debug)]
pub enum PollOutcome {
    /// Every page of every submitted file was delivered
    Completed,
    /// Polling stopped on an error; the stream closed early
    Failed(Error),
    /// The stream was cancelled or dropped by the consumer
    Cancelled,
}

impl PollOutcome {
    /// True when the whole batch was delivered
    pub fn is_completed(&self) -> bool {
        matches!(self, PollOutcome::Completed)
    }
}

/// Body of the reply to the initial POST
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct InitialResponse {
    #[serde(rename = "PollingURL")]
    pub polling_url: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub recognized_text: Vec<RecognizedText>,
    #[serde(rename = "Base64Image", with = "base64_image")]
    pub rotated_image: Option<Vec<u8>>,
}

/// Body of a reply to a poll
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct PollResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub pages: Vec<RecognizedPage>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Base64 image helper; the service sends "" when there is no image
mod base64_image {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S>(image: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match image {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(encoded) if !encoded.is_empty() => STANDARD
                .decode(encoded.as_bytes())
                .map(Some)
                .map_err(de::Error::custom),
            _ => Ok(None),
        }
    }
}
