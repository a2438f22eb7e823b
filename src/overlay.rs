//! The picture-in-picture controller.
//!
//! [`Overlay`] owns all widget state and changes it only through [`Overlay::update`]. It has
//! two independent axes: visibility (a collapsed thumbnail card or an open floating window)
//! and playback (paused or playing). The embedded player is attached once it is ready and is
//! dropped again when the window closes. Until then every player command is a no-op.

use std::time::Duration;

use iced::alignment::Horizontal;
use iced::widget::{
    button, column, container, image, mouse_area, responsive, row, slider, stack, text,
    vertical_slider, Space,
};
use iced::{
    event, mouse, time, touch, window, Alignment, Background, Border, Color, ContentFit, Element,
    Length, Padding, Point, Size, Subscription, Task,
};
use tracing::{debug, info, warn};

use crate::duration::format_seconds;
use crate::player::{EmbeddedPlayer, PlayerConfig, PlayerEvent};
use crate::surface::{Grip, Surface, SurfaceEvent, SurfaceInput};

/// Smallest size the floating window can be resized to.
pub const MIN_SIZE: Size = Size::new(300.0, 280.0);

const CARD_SIZE: Size = Size::new(300.0, 160.0);

/// How often the elapsed time is read back from the player.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Visibility and geometry of the floating window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayState {
    pub is_open: bool,
    pub is_dragging: bool,
    /// Top-left corner, in logical pixels.
    pub position: Point,
    pub size: Size,
}

/// What the controls show. Times are in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlaybackState {
    pub is_playing: bool,
    /// From 0 to 100.
    pub volume: u8,
    pub total_duration: f64,
    /// Always within `0..=total_duration`.
    pub elapsed: f64,
    /// Position under the pointer while hovering the seek bar.
    pub hover_preview: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// The collapsed thumbnail card was clicked.
    Open,
    Close,
    Play,
    Pause,
    Player(PlayerEvent),
    /// Time to read the elapsed time from the player.
    Tick,
    /// The seek bar was moved to this many seconds.
    Seek(f64),
    /// The pointer moved `offset` pixels into a seek bar `width` pixels wide.
    SeekHover { offset: f32, width: f32 },
    SeekLeave,
    VolumeChanged(u8),
    VolumeHover(bool),
    Fullscreen,
    Surface(SurfaceInput),
    /// The card thumbnail finished downloading, see [`crate::thumbnail::load`].
    ThumbnailLoaded(Result<image::Handle, String>),
}

/// Work the host has to do after an update.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// The window opened: create the player and hand it to [`Overlay::on_player_ready`].
    MountPlayer,
    EnterFullscreen,
    ExitFullscreen,
}

impl Effect {
    /// Runs the window side of the effect. [`Effect::MountPlayer`] is left to the host.
    pub fn into_task<T: Send + 'static>(self) -> Task<T> {
        let mode = match self {
            Effect::EnterFullscreen => window::Mode::Fullscreen,
            Effect::ExitFullscreen => window::Mode::Windowed,
            Effect::None | Effect::MountPlayer => return Task::none(),
        };
        window::get_latest().and_then(move |id| window::change_mode(id, mode))
    }
}

pub struct Overlay<P> {
    config: PlayerConfig,
    state: OverlayState,
    playback: PlaybackState,
    hover_offset: Option<f32>,
    volume_visible: bool,
    fullscreen: bool,
    surface: Surface,
    thumbnail: Option<image::Handle>,
    /// Shown instead of the player when none could be mounted.
    notice: Option<String>,
    player: Option<P>,
}

impl<P: EmbeddedPlayer> Overlay<P> {
    /// A closed overlay for a window of size `viewport`.
    pub fn new(config: PlayerConfig, viewport: Size) -> Self {
        let surface = Surface::new(viewport, MIN_SIZE);
        let (position, size) = surface.initial_geometry();

        Overlay {
            config,
            state: OverlayState {
                is_open: false,
                is_dragging: false,
                position,
                size,
            },
            playback: PlaybackState::default(),
            hover_offset: None,
            volume_visible: false,
            fullscreen: false,
            surface,
            thumbnail: None,
            notice: None,
            player: None,
        }
    }

    /// Image shown on the collapsed card.
    pub fn with_thumbnail(self, thumbnail: image::Handle) -> Self {
        Overlay {
            thumbnail: Some(thumbnail),
            ..self
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn playback(&self) -> &PlaybackState {
        &self.playback
    }

    pub fn thumbnail(&self) -> Option<&image::Handle> {
        self.thumbnail.as_ref()
    }

    /// Why the open window has no player, if the host gave up mounting one.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn player(&self) -> Option<&P> {
        self.player.as_ref()
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn is_volume_visible(&self) -> bool {
        self.volume_visible
    }

    /// Offset and text of the hover preview label, while it is shown.
    pub fn hover_label(&self) -> Option<(f32, String)> {
        self.hover_offset
            .map(|offset| (offset, format_seconds(self.playback.hover_preview)))
    }

    /// Attaches a ready player and reads its initial volume and duration.
    pub fn on_player_ready(&mut self, player: P) {
        if !self.state.is_open {
            debug!("player became ready after the overlay closed");
            return;
        }

        self.playback.volume = player.volume().min(100);
        self.playback.total_duration = non_negative(player.duration());
        self.playback.elapsed = self.clamp_elapsed(self.playback.elapsed);
        self.playback.is_playing = self.config.autoplay;
        info!(
            message = "player ready",
            volume = self.playback.volume,
            duration = self.playback.total_duration
        );
        self.player = Some(player);
    }

    /// Reports that no player can be mounted for the open window.
    ///
    /// The window stays open and shows `reason` where the player would be.
    pub fn on_player_unavailable(&mut self, reason: impl Into<String>) {
        if !self.state.is_open {
            return;
        }
        let reason = reason.into();
        warn!(message = "player unavailable", %reason);
        self.notice = Some(reason);
    }

    pub fn update(&mut self, message: Message) -> Effect {
        match message {
            Message::Open => {
                if self.state.is_open {
                    return Effect::None;
                }
                self.state.is_open = true;
                info!(message = "opening overlay", position = ?self.state.position);
                return Effect::MountPlayer;
            }
            Message::Close => {
                if !self.state.is_open {
                    return Effect::None;
                }
                self.state.is_open = false;
                self.state.is_dragging = false;
                self.teardown();
                if self.fullscreen {
                    self.fullscreen = false;
                    return Effect::ExitFullscreen;
                }
            }
            Message::Play => {
                self.playback.is_playing = true;
                if let Some(player) = self.player.as_mut() {
                    player.play();
                }
            }
            Message::Pause => {
                self.playback.is_playing = false;
                if let Some(player) = self.player.as_mut() {
                    player.pause();
                }
            }
            Message::Player(event) => match event {
                PlayerEvent::Started => self.playback.is_playing = true,
                PlayerEvent::Paused | PlayerEvent::Ended => self.playback.is_playing = false,
                PlayerEvent::Failed(reason) => {
                    warn!(message = "player failed", %reason);
                    self.playback.is_playing = false;
                }
            },
            Message::Tick => {
                if let Some(player) = self.player.as_ref() {
                    self.playback.elapsed = self.clamp_elapsed(player.current_time());
                }
            }
            Message::Seek(value) => {
                let target = self.clamp_elapsed(value.trunc());
                self.playback.elapsed = target;
                debug!(message = "seeking", target);
                if let Some(player) = self.player.as_mut() {
                    player.seek_to(target);
                }
            }
            Message::SeekHover { offset, width } => {
                if width > 0.0 {
                    let offset = offset.clamp(0.0, width);
                    self.playback.hover_preview =
                        (offset / width) as f64 * self.playback.total_duration;
                    self.hover_offset = Some(offset);
                }
            }
            Message::SeekLeave => self.hover_offset = None,
            Message::VolumeChanged(volume) => {
                let volume = volume.min(100);
                self.playback.volume = volume;
                if let Some(player) = self.player.as_mut() {
                    player.set_volume(volume);
                }
            }
            Message::VolumeHover(visible) => self.volume_visible = visible,
            Message::Fullscreen => {
                if !self.config.fullscreen || !self.state.is_open {
                    debug!("fullscreen unavailable");
                    return Effect::None;
                }
                self.fullscreen = !self.fullscreen;
                return if self.fullscreen {
                    Effect::EnterFullscreen
                } else {
                    Effect::ExitFullscreen
                };
            }
            Message::Surface(input) => {
                let event = self
                    .surface
                    .handle(input, self.state.position, self.state.size);
                if let Some(event) = event {
                    self.apply(event);
                }
            }
            Message::ThumbnailLoaded(Ok(thumbnail)) => self.thumbnail = Some(thumbnail),
            Message::ThumbnailLoaded(Err(err)) => warn!(message = "no thumbnail", %err),
        }

        Effect::None
    }

    fn apply(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::DragStart => self.state.is_dragging = true,
            SurfaceEvent::Drag(position) => self.state.position = position,
            SurfaceEvent::DragStop => self.state.is_dragging = false,
            SurfaceEvent::Resize(size) => {
                self.state.size = Size::new(
                    size.width.max(MIN_SIZE.width),
                    size.height.max(MIN_SIZE.height),
                )
            }
        }
    }

    fn teardown(&mut self) {
        if self.player.take().is_some() {
            info!("player released");
        }
        self.playback = PlaybackState::default();
        self.notice = None;
        self.hover_offset = None;
        self.volume_visible = false;
    }

    fn clamp_elapsed(&self, seconds: f64) -> f64 {
        non_negative(seconds).min(self.playback.total_duration)
    }

    /// Pointer tracking while open, elapsed time polling once the player is attached.
    ///
    /// Window resizes are always tracked so the window reopens inside the viewport.
    pub fn subscription(&self) -> Subscription<Message> {
        let resizes = event::listen_with(viewport_input);
        if !self.state.is_open {
            return resizes;
        }

        let mut subscriptions = vec![resizes, event::listen_with(pointer_input)];
        if self.player.is_some() {
            subscriptions.push(time::every(POLL_INTERVAL).map(|_| Message::Tick));
        }
        Subscription::batch(subscriptions)
    }

    pub fn view(&self) -> Element<'_, Message> {
        if !self.state.is_open {
            return self.card();
        }

        if self.fullscreen {
            return column![self.screen(), self.controls()]
                .width(Length::Fill)
                .height(Length::Fill)
                .into();
        }

        let window = container(
            column![self.title_bar(), self.screen(), self.controls(), self.grip()].spacing(2),
        )
        .width(Length::Fixed(self.state.size.width))
        .height(Length::Fixed(self.state.size.height))
        .padding(4)
        .style(|_| container::Style {
            background: Some(Background::Color(Color::from_rgb8(14, 116, 144))),
            border: Border {
                radius: 8.0.into(),
                ..Border::default()
            },
            ..container::Style::default()
        });

        let placed = container(window)
            .padding(Padding {
                top: self.state.position.y,
                left: self.state.position.x,
                ..Padding::ZERO
            })
            .width(Length::Fill)
            .height(Length::Fill);

        stack![
            container(self.card()).width(Length::Fill).height(Length::Fill),
            placed
        ]
        .into()
    }

    fn card(&self) -> Element<'_, Message> {
        let open = self.state.is_open;

        let backdrop: Element<'_, Message> = match &self.thumbnail {
            Some(thumbnail) => image(thumbnail.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .content_fit(ContentFit::Cover)
                .into(),
            None => Space::new(Length::Fill, Length::Fill).into(),
        };

        let badge = if open {
            text("This video is playing in picture in picture.").size(13)
        } else {
            text("▶").size(28)
        };
        let badge = container(badge)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .style(move |_| container::Style {
                text_color: Some(Color::WHITE),
                background: open.then_some(Background::Color(Color {
                    a: 0.25,
                    ..Color::BLACK
                })),
                ..container::Style::default()
            });

        let card = container(stack![backdrop, badge])
            .width(Length::Fixed(CARD_SIZE.width))
            .height(Length::Fixed(CARD_SIZE.height))
            .style(|_| container::Style {
                background: Some(Background::Color(Color::from_rgb8(3, 7, 18))),
                ..container::Style::default()
            });

        if open {
            mouse_area(card).into()
        } else {
            mouse_area(card)
                .on_press(Message::Open)
                .interaction(mouse::Interaction::Pointer)
                .into()
        }
    }

    fn title_bar(&self) -> Element<'_, Message> {
        let interaction = if self.state.is_dragging {
            mouse::Interaction::Grabbing
        } else {
            mouse::Interaction::Grab
        };
        let handle = mouse_area(
            container(text("::::::::::").size(14))
                .width(Length::Fill)
                .center_x(Length::Fill),
        )
        .on_press(Message::Surface(SurfaceInput::Press(Grip::Handle)))
        .interaction(interaction);

        let close = button(text("✕").size(14))
            .on_press(Message::Close)
            .padding([0, 6])
            .style(button::text);

        row![handle, close].align_y(Alignment::Center).into()
    }

    fn screen(&self) -> Element<'_, Message> {
        let content: Element<'_, Message> = match &self.player {
            Some(player) => player.surface().map(Message::Player),
            None => match &self.notice {
                Some(notice) => text(notice.as_str()).size(13).into(),
                None => text("Loading…").size(13).into(),
            },
        };

        container(content)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
    }

    fn controls(&self) -> Element<'_, Message> {
        let toggle = if self.playback.is_playing {
            button(text("❚❚").size(14)).on_press(Message::Pause)
        } else {
            button(text("▶").size(14)).on_press(Message::Play)
        };
        let toggle = toggle.style(button::text);

        let clock = text(format!(
            "{} / {}",
            format_seconds(self.playback.elapsed),
            format_seconds(self.playback.total_duration)
        ))
        .size(12);

        let mut fullscreen = button(text("⛶").size(14)).style(button::text);
        if self.config.fullscreen {
            fullscreen = fullscreen.on_press(Message::Fullscreen);
        }

        row![
            toggle,
            self.seek_bar(),
            clock,
            self.volume_control(),
            fullscreen
        ]
        .spacing(4)
        .align_y(Alignment::Center)
        .into()
    }

    fn seek_bar(&self) -> Element<'_, Message> {
        let total = self.playback.total_duration;
        let elapsed = self.playback.elapsed;
        let label = self.hover_label();

        let bar = responsive(move |size| {
            let width = size.width;
            let seek = mouse_area(slider(0.0..=total, elapsed, Message::Seek).step(1.0))
                .on_move(move |point| Message::SeekHover {
                    offset: point.x,
                    width,
                })
                .on_exit(Message::SeekLeave);

            let tooltip: Element<'_, Message> = match &label {
                Some((offset, preview)) => container(text(preview.clone()).size(11))
                    .padding(Padding {
                        left: *offset,
                        ..Padding::ZERO
                    })
                    .into(),
                None => Space::with_height(Length::Fixed(14.0)).into(),
            };

            column![tooltip, seek].into()
        });

        container(bar)
            .width(Length::Fill)
            .height(Length::Fixed(36.0))
            .into()
    }

    fn volume_control(&self) -> Element<'_, Message> {
        let icon = text("♪").size(14);
        let content: Element<'_, Message> = if self.volume_visible {
            row![
                icon,
                vertical_slider(0..=100u8, self.playback.volume, Message::VolumeChanged)
                    .height(Length::Fixed(60.0))
            ]
            .spacing(2)
            .align_y(Alignment::Center)
            .into()
        } else {
            icon.into()
        };

        mouse_area(content)
            .on_enter(Message::VolumeHover(true))
            .on_exit(Message::VolumeHover(false))
            .into()
    }

    fn grip(&self) -> Element<'_, Message> {
        let grip = mouse_area(text("◢").size(12))
            .on_press(Message::Surface(SurfaceInput::Press(Grip::Corner)))
            .interaction(mouse::Interaction::Crosshair);

        container(grip)
            .width(Length::Fill)
            .align_x(Horizontal::Right)
            .into()
    }
}

fn non_negative(seconds: f64) -> f64 {
    if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    }
}

fn pointer_input(event: iced::Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        iced::Event::Mouse(mouse::Event::CursorMoved { position }) => {
            Some(Message::Surface(SurfaceInput::CursorMoved(position)))
        }
        iced::Event::Touch(
            touch::Event::FingerPressed { position, .. } | touch::Event::FingerMoved { position, .. },
        ) => Some(Message::Surface(SurfaceInput::CursorMoved(position))),
        iced::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
            Some(Message::Surface(SurfaceInput::Released))
        }
        iced::Event::Touch(touch::Event::FingerLifted { .. } | touch::Event::FingerLost { .. }) => {
            Some(Message::Surface(SurfaceInput::Lifted))
        }
        _ => None,
    }
}

fn viewport_input(event: iced::Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        iced::Event::Window(window::Event::Resized(size)) => {
            Some(Message::Surface(SurfaceInput::ViewportResized(size)))
        }
        _ => None,
    }
}
