//! The seam between the overlay and whatever actually plays the video.

use iced::Element;
use url::Url;

use crate::resolver::VideoId;

/// Callbacks raised by an embedded player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    /// Playback started, whoever asked for it.
    Started,
    /// Playback paused, whoever asked for it.
    Paused,
    /// The stream reached its end.
    Ended,
    /// The player failed to produce a frame.
    Failed(String),
}

/// A video player hosted inside the overlay.
///
/// Commands are fire-and-forget; implementations log their own failures.
pub trait EmbeddedPlayer {
    fn play(&mut self);

    fn pause(&mut self);

    /// Jumps to `seconds` from the start of the media.
    fn seek_to(&mut self, seconds: f64);

    /// Sets the volume, from 0 to 100.
    fn set_volume(&mut self, volume: u8);

    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Volume from 0 to 100.
    fn volume(&self) -> u8;

    /// Media duration in seconds.
    fn duration(&self) -> f64;

    /// The element that renders the video.
    fn surface(&self) -> Element<'_, PlayerEvent>;
}

/// Chrome and behaviour options handed to the player when it is created.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    /// Show the player's own controls next to the overlay's.
    pub native_controls: bool,
    /// Suggest related videos at the end.
    pub related_videos: bool,
    pub autoplay: bool,
    /// Restart from the beginning at the end of the stream.
    pub looping: bool,
    /// Allow the fullscreen control to enlarge the player.
    pub fullscreen: bool,
    /// Progress bar color of hosted players.
    pub color: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            native_controls: false,
            related_videos: false,
            autoplay: false,
            looping: false,
            fullscreen: true,
            color: String::from("white"),
        }
    }
}

impl PlayerConfig {
    pub fn autoplay(self, autoplay: bool) -> Self {
        PlayerConfig { autoplay, ..self }
    }

    pub fn looping(self, looping: bool) -> Self {
        PlayerConfig { looping, ..self }
    }

    pub fn fullscreen(self, fullscreen: bool) -> Self {
        PlayerConfig { fullscreen, ..self }
    }

    pub fn native_controls(self, native_controls: bool) -> Self {
        PlayerConfig {
            native_controls,
            ..self
        }
    }

    pub fn related_videos(self, related_videos: bool) -> Self {
        PlayerConfig {
            related_videos,
            ..self
        }
    }

    /// Embed page of a hosted video with these options applied as player parameters.
    pub fn embed_url(&self, id: &VideoId) -> Url {
        let flag = |on: bool| if on { "1" } else { "0" };
        let mut url = Url::parse("https://www.youtube.com/embed/").expect("static embed url");
        url.path_segments_mut()
            .expect("embed url has a path")
            .pop_if_empty()
            .push(id.as_str());
        url.query_pairs_mut()
            .append_pair("controls", flag(self.native_controls))
            .append_pair("rel", flag(self.related_videos))
            .append_pair("autoplay", flag(self.autoplay))
            .append_pair("loop", flag(self.looping))
            .append_pair("fs", flag(self.fullscreen))
            .append_pair("enablejsapi", "1")
            .append_pair("color", &self.color);
        url
    }
}
