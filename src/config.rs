//! Configuration types for sight

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default Sight API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://siftrics.com/api/sight/";

/// Script hint codes known to be accepted by the service
///
/// Not exhaustive: the service may accept codes missing here, so unknown
/// codes are only warned about. The authoritative list is
/// <https://siftrics.com/docs/sight.html>.
pub const SUPPORTED_SCRIPTS: &[&str] = &[
    "arabic",
    "chinese_simplified",
    "chinese_traditional",
    "cyrillic",
    "devanagari",
    "greek",
    "hebrew",
    "japanese",
    "korean",
    "latin",
    "tamil",
    "thai",
];

/// Per-request recognition flags
///
/// Controls server-side behavior. Passed by reference into the request
/// builder and never mutated afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Coalesce word boxes into sentence boxes (default: true)
    #[serde(default = "default_true")]
    pub make_sentences: bool,

    /// Use EXIF orientation for the bounding box coordinate system
    #[serde(default)]
    pub do_exif_rotate: bool,

    /// Return images rotated so the majority of the text is upright
    #[serde(default)]
    pub do_auto_rotate: bool,

    /// Ask the service to process the batch asynchronously
    #[serde(default)]
    pub do_async: bool,

    /// Scripts to recognize (see [`SUPPORTED_SCRIPTS`]); empty lets the service decide
    #[serde(default)]
    pub script_hints: Vec<String>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self::sentences()
    }
}

impl RecognitionConfig {
    /// Sentence-level bounding boxes, no rotation, synchronous
    pub fn sentences() -> Self {
        Self {
            make_sentences: true,
            do_exif_rotate: false,
            do_auto_rotate: false,
            do_async: false,
            script_hints: Vec::new(),
        }
    }

    /// Same as [`sentences`](Self::sentences) but with word-level bounding boxes
    pub fn words() -> Self {
        Self {
            make_sentences: false,
            ..Self::sentences()
        }
    }

    /// Check that every script hint is a well-formed code
    ///
    /// Codes must be non-empty and use only `a-z` and `_`. Well-formed codes
    /// outside [`SUPPORTED_SCRIPTS`] are sent anyway, with a warning.
    pub fn validate(&self) -> Result<()> {
        for hint in &self.script_hints {
            let well_formed = !hint.is_empty()
                && hint.chars().all(|c| c.is_ascii_lowercase() || c == '_');
            if !well_formed {
                return Err(Error::UnsupportedScript(hint.clone()));
            }
            if !SUPPORTED_SCRIPTS.contains(&hint.as_str()) {
                tracing::warn!(script = %hint, "script hint is not a known code, sending it anyway");
            }
        }
        Ok(())
    }
}

/// Client behavior configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Endpoint the initial request is POSTed to
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Fixed delay before every poll (default: 500ms)
    #[serde(default = "default_poll_interval", with = "duration_millis")]
    pub poll_interval: Duration,

    /// Consecutive failed polls tolerated before giving up (default: 5)
    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,

    /// Pages buffered between the polling task and the consumer (default: 16)
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Per-request timeout (None = no timeout)
    #[serde(default, with = "optional_duration_millis")]
    pub request_timeout: Option<Duration>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            poll_interval: default_poll_interval(),
            max_consecutive_errors: default_max_consecutive_errors(),
            channel_capacity: default_channel_capacity(),
            request_timeout: None,
            user_agent: default_user_agent(),
        }
    }
}

impl ClientConfig {
    /// Reject values the client cannot run with
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.endpoint)
            .map_err(|e| Error::config("endpoint", format!("invalid endpoint URL: {e}")))?;
        if self.poll_interval.is_zero() {
            return Err(Error::config(
                "poll_interval",
                "poll interval must be greater than zero",
            ));
        }
        if self.max_consecutive_errors == 0 {
            return Err(Error::config(
                "max_consecutive_errors",
                "at least one failed poll must be tolerated",
            ));
        }
        if self.channel_capacity == 0 {
            return Err(Error::config(
                "channel_capacity",
                "channel capacity must be at least 1",
            ));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_max_consecutive_errors() -> u32 {
    5
}

fn default_channel_capacity() -> usize {
    16
}

fn default_user_agent() -> String {
    concat!("sight-rs/", env!("CARGO_PKG_VERSION")).to_string()
}

// Duration serialization helper (milliseconds)
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

mod optional_duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
