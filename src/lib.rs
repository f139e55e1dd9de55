//! # sight
//!
//! Async client for the Sight text recognition API.
//!
//! A batch of images or documents is uploaded in one request. The service
//! either answers immediately with a single page of results, or hands back a
//! polling URL. In the second case a background task polls until every page
//! of every file has been delivered, and the pages are streamed to the caller
//! as they arrive.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sight::{PollOutcome, SightClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SightClient::new("xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx")?;
//!
//!     let mut pages = client.recognize(&["invoice.pdf", "receipt.jpg"]).await?;
//!     while let Some(page) = pages.next_page().await {
//!         for region in &page.recognized_text {
//!             println!("file {} page {}: {}", page.file_index, page.page_number, region.text);
//!         }
//!     }
//!
//!     if let PollOutcome::Failed(e) = pages.finish().await {
//!         eprintln!("stopped early: {e}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Command-line front end
pub mod cli;
/// Client entry points
pub mod client;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Initial reply classification
mod interpret;
/// Background polling task
mod poller;
/// Request building and MIME inference
pub mod request;
/// Polling failure policy
pub mod retry;
/// Consumer-facing page stream
pub mod stream;
/// Per-file completion tracking
pub mod tracker;
/// HTTP transport abstraction
pub mod transport;
/// Core types
pub mod types;

// Re-export commonly used types
pub use client::SightClient;
pub use config::{ClientConfig, RecognitionConfig, SUPPORTED_SCRIPTS};
pub use error::{Error, ErrorKind, Result, TransportError};
pub use request::{MimeType, Submission};
pub use stream::PageStream;
pub use tracker::CompletionTracker;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
pub use types::{PollOutcome, PollingHandle, RecognizedPage, RecognizedText};
