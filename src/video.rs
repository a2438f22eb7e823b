use crate::player::{EmbeddedPlayer, PlayerConfig, PlayerEvent};
use crate::video_player::VideoPlayer;
use crate::Error;
use ffmpeg_next::format::Pixel;
use ffmpeg_next::frame::Video as RgbaFrame;
use iced::widget::image as img;
use iced::Element;
use parking_lot::Mutex;
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};
use video_rs::{Decoder, Location};

pub(crate) struct Internal {
    pub(crate) id: u64,

    pub(crate) source: Arc<Mutex<Decoder>>,

    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) framerate: f32,

    /// Seconds.
    pub(crate) duration: f64,

    /// Frames decoded since the start of the media.
    pub(crate) timestamp: i64,

    pub(crate) frame: Option<img::Handle>,

    pub(crate) pause: PauseFlag,
    pub(crate) looping: bool,
    pub(crate) volume: u8,
    pub(crate) is_eos: bool,
    pub(crate) next_redraw: Instant,
}

impl Internal {
    pub(crate) fn seek(&mut self, seconds: f64) -> Result<(), Error> {
        let seconds = seconds.max(0.0).min(self.duration);
        let millis: i64 = ((seconds * 1000.0) as u64).try_into()?;
        self.source.lock().seek(millis)?;
        self.timestamp = (seconds * self.framerate as f64) as i64;
        self.is_eos = false;
        if self.pause.get() {
            // decode the frame at the new position on the next redraw
            self.frame = None;
        }
        Ok(())
    }

    pub(crate) fn restart_stream(&mut self) -> Result<(), Error> {
        self.set_paused(false);
        self.source.lock().seek_to_start()?;
        self.timestamp = 0;
        self.is_eos = false;
        Ok(())
    }

    pub(crate) fn set_paused(&mut self, paused: bool) {
        self.pause.set(paused);
    }

    pub(crate) fn paused(&self) -> bool {
        self.pause.get()
    }

    /// Decodes the next frame into [`Internal::frame`].
    ///
    /// Returns `Ok(false)` once the stream is exhausted.
    pub(crate) fn advance(&mut self) -> Result<bool, Error> {
        let handle = {
            let mut decoder = self.source.lock();
            match decoder.decode_raw() {
                Ok(frame) => rgba_handle(&frame)?,
                Err(video_rs::Error::DecodeExhausted) | Err(video_rs::Error::ReadExhausted) => {
                    return Ok(false)
                }
                Err(err) => return Err(err.into()),
            }
        };
        self.frame = Some(handle);
        self.timestamp += 1;
        Ok(true)
    }

    pub(crate) fn position(&self) -> f64 {
        if self.framerate <= 0.0 {
            return 0.0;
        }
        (self.timestamp as f64 / self.framerate as f64).min(self.duration)
    }
}

/// Paused state that remembers whether its last change was reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PauseFlag {
    paused: bool,
    unannounced: bool,
}

impl PauseFlag {
    pub(crate) fn new(paused: bool) -> Self {
        PauseFlag {
            paused,
            unannounced: false,
        }
    }

    pub(crate) fn get(&self) -> bool {
        self.paused
    }

    pub(crate) fn set(&mut self, paused: bool) {
        if self.paused != paused {
            self.paused = paused;
            self.unannounced = !self.unannounced;
        }
    }

    /// The paused state, if it changed since the last call.
    pub(crate) fn take_change(&mut self) -> Option<bool> {
        std::mem::take(&mut self.unannounced).then_some(self.paused)
    }
}

/// Converts a decoded frame to an RGBA image handle, dropping the row padding ffmpeg adds.
fn rgba_handle(frame: &ffmpeg_next::frame::Video) -> Result<img::Handle, Error> {
    let mut scaler = frame.converter(Pixel::RGBA)?;
    let mut rgba = RgbaFrame::empty();
    scaler.run(frame, &mut rgba)?;

    let (width, height) = (rgba.width(), rgba.height());
    let row = width as usize * 4;
    let stride = rgba.stride(0);
    let mut pixels = Vec::with_capacity(row * height as usize);
    for line in rgba.data(0).chunks(stride).take(height as usize) {
        pixels.extend_from_slice(&line[..row]);
    }

    Ok(img::Handle::from_rgba(width, height, pixels))
}

fn open(uri: &url::Url) -> Result<Decoder, Error> {
    video_rs::init()?;
    let location: Location = match uri.scheme() {
        "file" => uri.to_file_path().map_err(|_| Error::Uri)?.into(),
        _ => uri.clone().into(),
    };
    Ok(Decoder::new(location)?)
}

/// A video decoded locally from a URI (e.g., a local file path or HTTP stream).
///
/// Only the picture is decoded. [`EmbeddedPlayer::set_volume`] stores the level so the
/// controls can show it back, but nothing is played out.
pub struct Video(pub(crate) RefCell<Internal>);

impl Drop for Video {
    fn drop(&mut self) {
        info!(message = "releasing video element", id = self.0.borrow().id);
    }
}

static VIDEO_ID: AtomicU64 = AtomicU64::new(0);

impl Video {
    /// Opens the media at `uri`. Live sources have no duration and are rejected.
    pub fn new(uri: &url::Url, config: &PlayerConfig) -> Result<Self, Error> {
        let id = VIDEO_ID.fetch_add(1, Ordering::SeqCst);
        let source = open(uri)?;

        let (width, height) = source.size_out();
        let framerate = source.frame_rate();
        let duration = source.duration()?;
        if !duration.has_value() {
            return Err(Error::Unknown);
        }
        let duration = duration.as_secs_f64();

        info!(
            message = "creating video element",
            id,
            framerate,
            width,
            height,
            duration
        );

        Ok(Video(RefCell::new(Internal {
            id,
            source: Arc::new(Mutex::new(source)),
            width,
            height,
            framerate,
            duration,
            timestamp: 0,
            frame: None,
            pause: PauseFlag::new(!config.autoplay),
            looping: config.looping,
            volume: 100,
            is_eos: false,
            next_redraw: Instant::now(),
        })))
    }

    /// Decodes the first frame of the media at `uri`, for use as a still preview.
    pub fn thumbnail(uri: &url::Url) -> Result<img::Handle, Error> {
        let mut source = open(uri)?;
        let frame = source.decode_raw()?;
        rgba_handle(&frame)
    }

    /// Get the size/resolution of the video as `(width, height)`.
    #[inline(always)]
    pub fn size(&self) -> (u32, u32) {
        (self.0.borrow().width, self.0.borrow().height)
    }

}

impl EmbeddedPlayer for Video {
    fn play(&mut self) {
        let mut inner = self.0.borrow_mut();
        if inner.is_eos {
            if let Err(err) = inner.restart_stream() {
                error!(message = "failed to restart stream", id = inner.id, %err);
            }
        }
        inner.set_paused(false);
        inner.next_redraw = Instant::now();
    }

    fn pause(&mut self) {
        self.0.borrow_mut().set_paused(true);
    }

    fn seek_to(&mut self, seconds: f64) {
        let mut inner = self.0.borrow_mut();
        debug!(message = "seeking", id = inner.id, seconds);
        if let Err(err) = inner.seek(seconds) {
            error!(message = "failed to seek", id = inner.id, seconds, %err);
        }
    }

    fn set_volume(&mut self, volume: u8) {
        self.0.borrow_mut().volume = volume.min(100);
    }

    fn current_time(&self) -> f64 {
        self.0.borrow().position()
    }

    fn volume(&self) -> u8 {
        self.0.borrow().volume
    }

    fn duration(&self) -> f64 {
        self.0.borrow().duration
    }

    fn surface(&self) -> Element<'_, PlayerEvent> {
        VideoPlayer::new(self)
            .on_play(PlayerEvent::Started)
            .on_pause(PlayerEvent::Paused)
            .on_end_of_stream(PlayerEvent::Ended)
            .on_error(|err| PlayerEvent::Failed(err.to_string()))
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::PauseFlag;

    #[test]
    fn initial_state_is_not_a_change() {
        let mut flag = PauseFlag::new(true);
        assert!(flag.get());
        assert_eq!(flag.take_change(), None);
    }

    #[test]
    fn changes_are_reported_once() {
        let mut flag = PauseFlag::new(true);
        flag.set(false);
        assert_eq!(flag.take_change(), Some(false));
        assert_eq!(flag.take_change(), None);

        flag.set(false);
        assert_eq!(flag.take_change(), None);

        flag.set(true);
        assert_eq!(flag.take_change(), Some(true));
    }

    #[test]
    fn toggling_back_before_a_report_cancels_it() {
        let mut flag = PauseFlag::new(false);
        flag.set(true);
        flag.set(false);
        assert_eq!(flag.take_change(), None);
        assert!(!flag.get());
    }
}
