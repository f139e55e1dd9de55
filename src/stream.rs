//! Consumer-facing page stream.
//!
//! Pages arrive over a bounded channel; when the buffer is full the polling
//! task waits, which is the only backpressure. The channel closes exactly once
//! when the producer reaches a terminal state, and the terminal state itself is
//! available through [`PageStream::finish`].

use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::error::Error;
use crate::types::{PollOutcome, RecognizedPage};

/// Producer half, owned by whoever emits pages
#[derive(Debug)]
pub(crate) struct PageSink {
    pages: mpsc::Sender<RecognizedPage>,
    outcome: oneshot::Sender<PollOutcome>,
    cancel: CancellationToken,
}

impl PageSink {
    /// Deliver one page, waiting while the buffer is full
    ///
    /// Returns false when the consumer cancelled or dropped the stream.
    pub(crate) async fn push(&self, page: RecognizedPage) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            sent = self.pages.send(page) => sent.is_ok(),
        }
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Close the page channel and publish how it ended
    pub(crate) fn close(self, outcome: PollOutcome) {
        drop(self.pages);
        // the consumer may already be gone
        self.outcome.send(outcome).ok();
    }
}

/// Ordered stream of recognized pages for one submission
///
/// Implements [`Stream`]; it ends when every submitted file is complete or
/// polling gives up. Use [`finish`](Self::finish) to learn which.
#[derive(Debug)]
pub struct PageStream {
    pages: ReceiverStream<RecognizedPage>,
    outcome: oneshot::Receiver<PollOutcome>,
    cancel: CancellationToken,
    total_files: usize,
}

impl PageStream {
    pub(crate) fn channel(capacity: usize, total_files: usize) -> (PageSink, PageStream) {
        let (pages_tx, pages_rx) = mpsc::channel(capacity);
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let cancel = CancellationToken::new();
        let sink = PageSink {
            pages: pages_tx,
            outcome: outcome_tx,
            cancel: cancel.clone(),
        };
        let stream = PageStream {
            pages: ReceiverStream::new(pages_rx),
            outcome: outcome_rx,
            cancel,
            total_files,
        };
        (sink, stream)
    }

    /// A stream holding a single page that is already complete
    pub(crate) fn ready(page: RecognizedPage, total_files: usize) -> PageStream {
        let (sink, stream) = Self::channel(1, total_files);
        // capacity 1 and nothing queued yet, so this cannot fail
        sink.pages.try_send(page).ok();
        sink.close(PollOutcome::Completed);
        stream
    }

    /// Next page, or `None` once the stream has closed
    pub async fn next_page(&mut self) -> Option<RecognizedPage> {
        self.pages.next().await
    }

    /// Number of files in the submission this stream belongs to
    pub fn total_files(&self) -> usize {
        self.total_files
    }

    /// Ask the producer to stop; the stream closes with [`PollOutcome::Cancelled`]
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Discard remaining pages and wait for the terminal outcome
    pub async fn finish(mut self) -> PollOutcome {
        while self.pages.next().await.is_some() {}
        self.await_outcome().await
    }

    /// Gather every remaining page, then the terminal outcome
    pub async fn collect(mut self) -> (Vec<RecognizedPage>, PollOutcome) {
        let mut pages = Vec::new();
        while let Some(page) = self.pages.next().await {
            pages.push(page);
        }
        let outcome = self.await_outcome().await;
        (pages, outcome)
    }

    async fn await_outcome(&mut self) -> PollOutcome {
        (&mut self.outcome).await.unwrap_or_else(|_| {
            PollOutcome::Failed(Error::Other(
                "polling task ended without reporting an outcome".to_string(),
            ))
        })
    }
}

// The producer may be polling without pushing anything; wake it so it exits.
impl Drop for PageStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl Stream for PageStream {
    type Item = RecognizedPage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.pages).poll_next(cx)
    }
}
