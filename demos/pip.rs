//! Picture-in-picture playback of a local file or stream.
//!
//! ```text
//! cargo run --example pip -- /path/to/video.mp4 --looping
//! ```
//!
//! Hosted video links open the card with the downloaded thumbnail. Their pages cannot be
//! decoded locally, so the window explains that and points at the embed URL.

use std::path::PathBuf;

use clap::Parser;
use iced::{Element, Size, Subscription, Task};
use iced_pip::overlay::Message;
use iced_pip::{extract_video_id, thumbnail, Effect, Overlay, PlayerConfig, Video, VideoId};
use tracing::{error, info, warn};

const WINDOW_SIZE: Size = Size::new(1024.0, 768.0);

#[derive(Debug, Parser)]
#[command(about = "Play a video in a draggable picture-in-picture window")]
struct Args {
    /// File path or URL of the media to play.
    source: String,

    /// Start playing as soon as the window opens.
    #[arg(long)]
    autoplay: bool,

    /// Restart at the end of the video.
    #[arg(long)]
    looping: bool,

    /// Disable the fullscreen control.
    #[arg(long)]
    no_fullscreen: bool,
}

enum Source {
    /// A video page on the hosting site.
    Hosted(VideoId),
    /// Media that can be decoded locally.
    Media(url::Url),
}

struct App {
    source: Source,
    overlay: Overlay<Video>,
}

impl App {
    fn new(source: Source, config: PlayerConfig) -> (Self, Task<Message>) {
        let mut overlay = Overlay::new(config, WINDOW_SIZE);
        let task = match &source {
            Source::Hosted(id) => thumbnail::load(id),
            Source::Media(uri) => {
                match Video::thumbnail(uri) {
                    Ok(thumbnail) => overlay = overlay.with_thumbnail(thumbnail),
                    Err(err) => warn!(message = "no thumbnail", %err),
                }
                Task::none()
            }
        };

        (App { source, overlay }, task)
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match self.overlay.update(message) {
            Effect::MountPlayer => {
                match &self.source {
                    Source::Hosted(id) => {
                        let embed = self.overlay.config().embed_url(id);
                        info!(message = "hosted video cannot be decoded", %id, %embed);
                        self.overlay
                            .on_player_unavailable(format!("Hosted videos play in the browser: {embed}"));
                    }
                    Source::Media(uri) => match Video::new(uri, self.overlay.config()) {
                        Ok(video) => self.overlay.on_player_ready(video),
                        Err(err) => {
                            error!(message = "failed to open video", source = %uri, %err);
                            self.overlay.on_player_unavailable(err.to_string());
                        }
                    },
                }
                Task::none()
            }
            effect => effect.into_task(),
        }
    }

    fn view(&self) -> Element<Message> {
        self.overlay.view()
    }

    fn subscription(&self) -> Subscription<Message> {
        self.overlay.subscription()
    }
}

fn source_url(source: &str) -> Option<url::Url> {
    if let Ok(url) = url::Url::parse(source) {
        return Some(url);
    }
    let path = std::fs::canonicalize(PathBuf::from(source)).ok()?;
    url::Url::from_file_path(path).ok()
}

pub fn main() -> iced::Result {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let config = PlayerConfig::default()
        .autoplay(args.autoplay)
        .looping(args.looping)
        .fullscreen(!args.no_fullscreen);

    let source = match extract_video_id(&args.source) {
        Ok(id) => Source::Hosted(id),
        Err(_) => match source_url(&args.source) {
            Some(uri) => Source::Media(uri),
            None => {
                error!(message = "source is neither a URL nor an existing file", source = %args.source);
                return Ok(());
            }
        },
    };

    iced::application("Picture in picture", App::update, App::view)
        .subscription(App::subscription)
        .window_size(WINDOW_SIZE)
        .run_with(move || App::new(source, config))
}
