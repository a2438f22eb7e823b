use crate::video::{Internal, Video};
use crate::Error;
use iced::{
    advanced::{self, image as advanced_image, layout, widget, Widget},
    event::Status,
    widget::image as img,
    Element, Radians,
};
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{error, trace};

/// Video player widget which displays the current frame of a [`Video`](crate::Video).
pub struct VideoPlayer<'a, Message, Theme = iced::Theme, Renderer = iced::Renderer>
where
    Renderer: advanced_image::Renderer<Handle = img::Handle>,
{
    video: &'a Video,
    on_play: Option<Message>,
    on_pause: Option<Message>,
    on_end_of_stream: Option<Message>,
    on_error: Option<Box<dyn Fn(&Error) -> Message + 'a>>,
    _phantom: PhantomData<(Theme, Renderer)>,
}

impl<'a, Message, Theme, Renderer> VideoPlayer<'a, Message, Theme, Renderer>
where
    Renderer: advanced_image::Renderer<Handle = img::Handle>,
{
    /// Creates a new video player widget for a given video.
    pub fn new(video: &'a Video) -> Self {
        VideoPlayer {
            video,
            on_play: None,
            on_pause: None,
            on_end_of_stream: None,
            on_error: None,
            _phantom: Default::default(),
        }
    }

    /// Message to send when the video reaches the end of stream (i.e., the video ends).
    ///
    /// Looping videos restart instead and never send it.
    pub fn on_end_of_stream(self, on_end_of_stream: Message) -> Self {
        VideoPlayer {
            on_end_of_stream: Some(on_end_of_stream),
            ..self
        }
    }

    /// Message to send when playback resumes.
    pub fn on_play(self, on_play: Message) -> Self {
        VideoPlayer {
            on_play: Some(on_play),
            ..self
        }
    }

    /// Message to send when playback pauses, including at the end of the stream.
    pub fn on_pause(self, on_pause: Message) -> Self {
        VideoPlayer {
            on_pause: Some(on_pause),
            ..self
        }
    }

    /// Message to send when a frame cannot be decoded. Playback pauses.
    pub fn on_error<F>(self, on_error: F) -> Self
    where
        F: 'a + Fn(&Error) -> Message,
    {
        VideoPlayer {
            on_error: Some(Box::new(on_error)),
            ..self
        }
    }
}

impl<'a, Message, Theme, Renderer> VideoPlayer<'a, Message, Theme, Renderer>
where
    Message: Clone,
    Renderer: advanced_image::Renderer<Handle = img::Handle>,
{
    /// Publishes a play/pause change made since the last redraw.
    fn announce(&self, inner: &mut Internal, shell: &mut advanced::Shell<'_, Message>) {
        let message = match inner.pause.take_change() {
            Some(true) => self.on_pause.clone(),
            Some(false) => self.on_play.clone(),
            None => None,
        };
        if let Some(message) = message {
            trace!(id = inner.id, paused = inner.paused());
            shell.publish(message);
        }
    }
}

impl<'a, Message, Theme, Renderer> Widget<Message, Theme, Renderer>
    for VideoPlayer<'a, Message, Theme, Renderer>
where
    Message: Clone,
    Renderer: advanced_image::Renderer<Handle = img::Handle>,
{
    fn size(&self) -> iced::Size<iced::Length> {
        iced::Size {
            width: iced::Length::Fill,
            height: iced::Length::Fill,
        }
    }

    fn layout(
        &self,
        _tree: &mut widget::Tree,
        _renderer: &Renderer,
        limits: &layout::Limits,
    ) -> layout::Node {
        let (width, height) = self.video.size();
        let (width, height) = (width.max(1) as f32, height.max(1) as f32);
        let size = limits.resolve(
            iced::Length::Fill,
            iced::Length::Fill,
            iced::Size::new(width, height),
        );

        // fixed aspect ratio + never exceed available size
        let size = if (size.width / size.height) > (width / height) {
            iced::Size::new(size.height * (width / height), size.height)
        } else {
            iced::Size::new(size.width, size.width * (height / width))
        };

        layout::Node::new(size)
    }

    fn draw(
        &self,
        _tree: &widget::Tree,
        renderer: &mut Renderer,
        _theme: &Theme,
        _style: &advanced::renderer::Style,
        layout: advanced::Layout<'_>,
        _cursor: advanced::mouse::Cursor,
        _viewport: &iced::Rectangle,
    ) {
        let inner = self.video.0.borrow();
        if let Some(frame) = inner.frame.clone() {
            renderer.draw_image(
                frame,
                advanced_image::FilterMethod::Linear,
                layout.bounds(),
                Radians(0.0),
                1.0,
            );
        }
    }

    fn on_event(
        &mut self,
        _state: &mut widget::Tree,
        event: iced::Event,
        _layout: advanced::Layout<'_>,
        _cursor: advanced::mouse::Cursor,
        _renderer: &Renderer,
        _clipboard: &mut dyn advanced::Clipboard,
        shell: &mut advanced::Shell<'_, Message>,
        _viewport: &iced::Rectangle,
    ) -> Status {
        let iced::Event::Window(iced::window::Event::RedrawRequested(now)) = event else {
            return Status::Ignored;
        };

        let mut inner = self.video.0.borrow_mut();
        self.announce(&mut inner, shell);
        // a paused video still shows its first frame
        if inner.is_eos || (inner.paused() && inner.frame.is_some()) {
            return Status::Ignored;
        }

        if now < inner.next_redraw {
            shell.request_redraw(iced::window::RedrawRequest::At(inner.next_redraw));
            return Status::Captured;
        }

        match inner.advance() {
            Ok(true) => {
                trace!(id = inner.id, frame = inner.timestamp);
                let redraw_interval = 1.0 / inner.framerate.max(1.0);
                let until_redraw =
                    redraw_interval - (now - inner.next_redraw).as_secs_f32() % redraw_interval;
                inner.next_redraw = now + Duration::from_secs_f32(until_redraw);
                if !inner.paused() {
                    shell.request_redraw(iced::window::RedrawRequest::At(inner.next_redraw));
                }
            }
            Ok(false) if inner.looping => {
                if let Err(err) = inner.restart_stream() {
                    error!(message = "failed to loop video", id = inner.id, %err);
                    inner.set_paused(true);
                    self.announce(&mut inner, shell);
                    if let Some(on_error) = &self.on_error {
                        shell.publish(on_error(&err));
                    }
                } else {
                    shell.request_redraw(iced::window::RedrawRequest::NextFrame);
                }
            }
            Ok(false) => {
                inner.is_eos = true;
                inner.set_paused(true);
                self.announce(&mut inner, shell);
                if let Some(on_end_of_stream) = self.on_end_of_stream.clone() {
                    shell.publish(on_end_of_stream);
                }
            }
            Err(err) => {
                error!(message = "failed to decode frame", id = inner.id, %err);
                inner.set_paused(true);
                self.announce(&mut inner, shell);
                if let Some(on_error) = &self.on_error {
                    shell.publish(on_error(&err));
                }
            }
        }

        Status::Captured
    }
}

impl<'a, Message, Theme, Renderer> From<VideoPlayer<'a, Message, Theme, Renderer>>
    for Element<'a, Message, Theme, Renderer>
where
    Message: 'a + Clone,
    Theme: 'a,
    Renderer: 'a + advanced_image::Renderer<Handle = img::Handle>,
{
    fn from(video_player: VideoPlayer<'a, Message, Theme, Renderer>) -> Self {
        Self::new(video_player)
    }
}
