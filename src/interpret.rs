//! Classification of the reply to the initial request.

use crate::error::{Error, Result};
use crate::transport::HttpResponse;
use crate::types::{InitialResponse, PollingHandle, RecognizedPage};

/// What the initial exchange produced
#[derive(Debug)]
pub(crate) enum InitialReply {
    /// Synchronous mode: the single page is already here
    Complete(RecognizedPage),
    /// Asynchronous mode: results must be polled for
    Pending(PollingHandle),
}

/// Map the status and body of the initial reply to a reply or a terminal error
pub(crate) fn interpret_initial(response: &HttpResponse) -> Result<InitialReply> {
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

    let body: InitialResponse = serde_json::from_slice(&response.body)
        .map_err(|e| Error::protocol("initial", e))?;

    match body.polling_url.as_deref() {
        Some(url) if !url.is_empty() => PollingHandle::parse(url).map(InitialReply::Pending),
        _ => Ok(InitialReply::Complete(RecognizedPage {
            error: String::new(),
            file_index: 0,
            page_number: 1,
            number_of_pages_in_file: 1,
            recognized_text: body.recognized_text,
            rotated_image: body.rotated_image,
        })),
    }
}
