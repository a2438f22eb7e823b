//! # Iced PiP
//!
//! A draggable, resizable picture-in-picture overlay for Iced.
//!
//! The overlay starts as a collapsed thumbnail card. Clicking it opens a floating window that
//!     hosts an [`EmbeddedPlayer`] together with play/pause, seek, volume and fullscreen controls.
//!
//! The controller is a plain state object: feed it [`overlay::Message`]s through
//!     [`Overlay::update`] and apply the returned [`Effect`].
//!
//! Example:
//! ```rust,no_run
//! use iced::{Element, Size, Subscription, Task};
//! use iced_pip::{overlay, Effect, Overlay, PlayerConfig, Video};
//!
//! struct App {
//!     source: url::Url,
//!     overlay: Overlay<Video>,
//! }
//!
//! impl App {
//!     fn update(&mut self, message: overlay::Message) -> Task<overlay::Message> {
//!         match self.overlay.update(message) {
//!             Effect::MountPlayer => {
//!                 if let Ok(video) = Video::new(&self.source, self.overlay.config()) {
//!                     self.overlay.on_player_ready(video);
//!                 }
//!                 Task::none()
//!             }
//!             effect => effect.into_task(),
//!         }
//!     }
//!
//!     fn view(&self) -> Element<overlay::Message> {
//!         self.overlay.view()
//!     }
//!
//!     fn subscription(&self) -> Subscription<overlay::Message> {
//!         self.overlay.subscription()
//!     }
//! }
//!
//! fn main() -> iced::Result {
//!     let source = url::Url::parse("file:///C:/my_video.mp4").unwrap();
//!     iced::application("PiP", App::update, App::view)
//!         .subscription(App::subscription)
//!         .run_with(move || {
//!             let overlay = Overlay::new(PlayerConfig::default(), Size::new(1024.0, 768.0));
//!             (App { source, overlay }, Task::none())
//!         })
//! }
//! ```
//!
//! Video links can be resolved to identifiers and thumbnails without any network access, see
//!     [`extract_video_id`] and [`thumbnail_url_for_video`]. [`thumbnail::load`] downloads the
//!     thumbnail and puts it on the collapsed card.

pub mod duration;
pub mod overlay;
pub mod player;
pub mod resolver;
pub mod surface;
pub mod thumbnail;
mod video;
mod video_player;

use thiserror::Error;

pub use duration::{format_duration, format_seconds};
pub use overlay::{Effect, Overlay};
pub use player::{EmbeddedPlayer, PlayerConfig, PlayerEvent};
pub use resolver::{extract_video_id, thumbnail_url_for_id, thumbnail_url_for_video, VideoId};
pub use surface::{Grip, Surface, SurfaceEvent, SurfaceInput};
pub use video::Video;
pub use video_player::VideoPlayer;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid YouTube URL")]
    InvalidUrl,
    #[error("invalid URI")]
    Uri,
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Conversion(#[from] std::num::TryFromIntError),
    #[error("{0}")]
    Decode(#[from] video_rs::Error),
    #[error("{0}")]
    Ffmpeg(#[from] ffmpeg_next::Error),
    #[error("{0}")]
    Http(#[from] reqwest::Error),
    #[error("unknown error occured")]
    Unknown,
}
