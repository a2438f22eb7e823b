//! Loading the hosted thumbnail shown on the collapsed card.

use std::time::Duration;

use iced::widget::image;
use iced::Task;
use tracing::{debug, error};

use crate::overlay::Message;
use crate::resolver::VideoId;
use crate::Error;

const TIMEOUT: Duration = Duration::from_secs(10);

/// Downloads the thumbnail of `id` and hands it to the overlay as
/// [`Message::ThumbnailLoaded`].
pub fn load(id: &VideoId) -> Task<Message> {
    let url = id.thumbnail_url();
    Task::perform(fetch(url), |result| {
        Message::ThumbnailLoaded(result.map_err(|err| err.to_string()))
    })
}

/// Downloads an image and wraps its encoded bytes in a handle.
pub async fn fetch(url: String) -> Result<image::Handle, Error> {
    debug!(message = "fetching thumbnail", %url);
    let client = reqwest::Client::builder().timeout(TIMEOUT).build()?;

    let bytes = client
        .get(&url)
        .send()
        .await
        .and_then(|response| response.error_for_status())
        .map_err(|err| {
            error!(message = "failed to fetch thumbnail", %url, %err);
            err
        })?
        .bytes()
        .await?;

    Ok(image::Handle::from_bytes(bytes.to_vec()))
}
