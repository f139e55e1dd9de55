//! Background polling of an asynchronous recognition job.
//!
//! The poller owns all mutable polling state (per-file completion and the failure
//! count) and runs as a single task. Polls are strictly sequential with a fixed
//! delay before each one. Every decoded page is recorded and then pushed to the
//! consumer; after each successful poll the batch is checked for completion.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::retry::{ConsecutiveFailures, IsRetryable};
use crate::stream::PageSink;
use crate::tracker::CompletionTracker;
use crate::transport::{HttpRequest, Transport};
use crate::types::{PollOutcome, PollResponse, PollingHandle, RecognizedPage};

/// Fixed polling parameters
#[derive(Clone, Debug)]
pub(crate) struct PollSettings {
    pub interval: Duration,
    pub max_consecutive_errors: u32,
}

pub(crate) struct Poller {
    transport: Arc<dyn Transport>,
    handle: PollingHandle,
    authorization: String,
    total_files: usize,
    interval: Duration,
    tracker: CompletionTracker,
    failures: ConsecutiveFailures,
    sink: PageSink,
}

impl Poller {
    pub(crate) fn new(
        transport: Arc<dyn Transport>,
        handle: PollingHandle,
        authorization: String,
        total_files: usize,
        settings: &PollSettings,
        sink: PageSink,
    ) -> Self {
        Self {
            transport,
            handle,
            authorization,
            total_files,
            interval: settings.interval,
            tracker: CompletionTracker::new(),
            failures: ConsecutiveFailures::new(settings.max_consecutive_errors),
            sink,
        }
    }

    /// Start polling on a background task
    pub(crate) fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Poll until the batch is complete, polling fails, or the consumer leaves
    pub(crate) async fn run(mut self) {
        tracing::debug!(handle = %self.handle, files = self.total_files, "polling started");
        let outcome = self.poll_until_done().await;
        match &outcome {
            PollOutcome::Completed => {
                tracing::info!(handle = %self.handle, "all pages received")
            }
            PollOutcome::Failed(e) => {
                tracing::warn!(handle = %self.handle, error = %e, "polling stopped before completion")
            }
            PollOutcome::Cancelled => {
                tracing::info!(handle = %self.handle, "polling cancelled by consumer")
            }
        }
        self.sink.close(outcome);
    }

    async fn poll_until_done(&mut self) -> PollOutcome {
        loop {
            tokio::select! {
                biased;
                _ = self.sink.cancel_token().cancelled() => return PollOutcome::Cancelled,
                _ = tokio::time::sleep(self.interval) => {}
            }

            let pages = match self.poll_once().await {
                Ok(pages) => {
                    self.failures.reset();
                    pages
                }
                Err(e) if !e.is_retryable() => return PollOutcome::Failed(e),
                Err(e) => {
                    let exhausted = self.failures.record();
                    tracing::warn!(
                        error = %e,
                        attempt = self.failures.count(),
                        max_attempts = self.failures.limit(),
                        "poll failed"
                    );
                    if exhausted {
                        return PollOutcome::Failed(Error::RetriesExhausted {
                            attempts: self.failures.count(),
                            last: Box::new(e),
                        });
                    }
                    continue;
                }
            };

            tracing::debug!(pages = pages.len(), "poll returned pages");
            for page in pages {
                self.tracker.observe(&page);
                if !self.sink.push(page).await {
                    return PollOutcome::Cancelled;
                }
            }

            if self.tracker.is_batch_complete(self.total_files) {
                return PollOutcome::Completed;
            }
        }
    }

    async fn poll_once(&self) -> Result<Vec<RecognizedPage>> {
        let request = HttpRequest::get(self.handle.as_str())
            .header("Authorization", self.authorization.as_str());
        let response = self.transport.exchange(request).await?;

        match response.status {
            200 => {}
            401 => return Err(Error::Unauthorized),
            status => {
                return Err(Error::Server {
                    status,
                    body: response.body_text(),
                });
            }
        }

        let body: PollResponse =
            serde_json::from_slice(&response.body).map_err(|e| Error::protocol("poll", e))?;
        Ok(body.pages)
    }
}
