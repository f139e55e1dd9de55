//! The Sight API client.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::{ClientConfig, RecognitionConfig};
use crate::error::Result;
use crate::interpret::{InitialReply, interpret_initial};
use crate::poller::{PollSettings, Poller};
use crate::request::{SightRequest, Submission};
use crate::stream::PageStream;
use crate::transport::{HttpRequest, ReqwestTransport, Transport};

/// Client for the Sight text recognition API
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Clone)]
pub struct SightClient {
    api_key: String,
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for SightClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SightClient")
            .field("api_key", &"<redacted>")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SightClient {
    /// Create a client with the default configuration
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(api_key, ClientConfig::default())
    }

    /// Create a client with a custom configuration
    pub fn with_config(api_key: impl Into<String>, config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self {
            api_key: api_key.into(),
            config: Arc::new(config),
            transport: Arc::new(transport),
        })
    }

    /// Create a client that sends requests through `transport`
    pub fn with_transport(
        api_key: impl Into<String>,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            api_key: api_key.into(),
            config: Arc::new(config),
            transport,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Recognize text with sentence-level bounding boxes
    pub async fn recognize<P: AsRef<Path>>(&self, paths: &[P]) -> Result<PageStream> {
        self.recognize_with(&RecognitionConfig::sentences(), paths)
            .await
    }

    /// Recognize text with word-level bounding boxes
    pub async fn recognize_words<P: AsRef<Path>>(&self, paths: &[P]) -> Result<PageStream> {
        self.recognize_with(&RecognitionConfig::words(), paths).await
    }

    /// Recognize all the text in the given files
    ///
    /// Returns once the initial request has been answered. Input problems,
    /// a rejected key, and failures of the initial exchange are returned as
    /// errors before any stream exists. Everything after that happens on a
    /// background task that feeds the returned [`PageStream`]; failures there
    /// close the stream early and are reported by [`PageStream::finish`].
    pub async fn recognize_with<P: AsRef<Path>>(
        &self,
        config: &RecognitionConfig,
        paths: &[P],
    ) -> Result<PageStream> {
        config.validate()?;
        let submission = Submission::from_paths(paths).await?;
        let total_files = submission.len();
        let body = SightRequest::new(&submission, config).to_json()?;
        drop(submission);

        tracing::info!(
            files = total_files,
            bytes = body.len(),
            do_async = config.do_async,
            "uploading files"
        );
        let request = HttpRequest::post(self.config.endpoint.as_str(), body)
            .header("Content-Type", "application/json")
            .header("Authorization", self.authorization());
        let response = self.transport.exchange(request).await?;

        match interpret_initial(&response)? {
            InitialReply::Complete(page) => {
                tracing::debug!("received synchronous result");
                Ok(PageStream::ready(page, total_files))
            }
            InitialReply::Pending(handle) => {
                tracing::debug!(handle = %handle, "received polling handle");
                let (sink, stream) = PageStream::channel(self.config.channel_capacity, total_files);
                let settings = PollSettings {
                    interval: self.config.poll_interval,
                    max_consecutive_errors: self.config.max_consecutive_errors,
                };
                Poller::new(
                    Arc::clone(&self.transport),
                    handle,
                    self.authorization(),
                    total_files,
                    &settings,
                    sink,
                )
                .spawn();
                Ok(stream)
            }
        }
    }

    fn authorization(&self) -> String {
        format!("Basic {}", self.api_key)
    }
}
