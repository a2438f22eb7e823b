//! Drag and resize handling for the floating window.
//!
//! [`Surface`] turns raw pointer input into drag/resize events. It keeps the window inside
//! the viewport and never lets it shrink below the minimum size. The geometry itself is owned
//! by the caller and passed in with every input.

use iced::{Point, Size};

/// Distance from the right edge of the viewport at which the window first appears.
const DEFAULT_RIGHT_OFFSET: f32 = 350.0;
const DEFAULT_TOP: f32 = 10.0;

/// Part of the window that was pressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grip {
    /// The title bar, moves the window.
    Handle,
    /// The bottom right corner, resizes the window.
    Corner,
}

/// Raw pointer input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceInput {
    Press(Grip),
    CursorMoved(Point),
    Released,
    /// A touch ended: releases like [`SurfaceInput::Released`] and forgets the pointer.
    Lifted,
    ViewportResized(Size),
}

/// What the input amounted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    DragStart,
    /// New top-left corner.
    Drag(Point),
    DragStop,
    /// New window size.
    Resize(Size),
}

#[derive(Debug, Clone, Copy)]
struct Grab {
    grip: Grip,
    /// Pointer position at the press, or `None` until the pointer is first seen.
    cursor: Option<Point>,
    position: Point,
    size: Size,
}

#[derive(Debug, Clone)]
pub struct Surface {
    viewport: Size,
    min_size: Size,
    cursor: Option<Point>,
    grab: Option<Grab>,
}

impl Surface {
    pub fn new(viewport: Size, min_size: Size) -> Self {
        Surface {
            viewport,
            min_size,
            cursor: None,
            grab: None,
        }
    }

    /// Where the window opens: near the top right corner, at its minimum size.
    pub fn initial_geometry(&self) -> (Point, Size) {
        let position = Point::new(
            (self.viewport.width - DEFAULT_RIGHT_OFFSET).max(0.0),
            DEFAULT_TOP,
        );
        (position, self.min_size)
    }

    pub fn is_grabbed(&self) -> bool {
        self.grab.is_some()
    }

    /// Feeds one input, given the current window geometry.
    pub fn handle(&mut self, input: SurfaceInput, position: Point, size: Size) -> Option<SurfaceEvent> {
        match input {
            SurfaceInput::Press(grip) => {
                self.grab = Some(Grab {
                    grip,
                    cursor: self.cursor,
                    position,
                    size,
                });
                match grip {
                    Grip::Handle => Some(SurfaceEvent::DragStart),
                    Grip::Corner => None,
                }
            }
            SurfaceInput::CursorMoved(cursor) => {
                self.cursor = Some(cursor);
                let grab = self.grab.as_mut()?;
                // pressed before any movement was seen: measure from here on
                let origin = *grab.cursor.get_or_insert(cursor);
                let grab = *grab;
                let dx = cursor.x - origin.x;
                let dy = cursor.y - origin.y;

                match grab.grip {
                    Grip::Handle => {
                        let moved = Point::new(grab.position.x + dx, grab.position.y + dy);
                        Some(SurfaceEvent::Drag(self.clamp_position(moved, size)))
                    }
                    Grip::Corner => {
                        let resized = Size::new(grab.size.width + dx, grab.size.height + dy);
                        Some(SurfaceEvent::Resize(self.clamp_size(position, resized)))
                    }
                }
            }
            SurfaceInput::Released => self.release(),
            SurfaceInput::Lifted => {
                self.cursor = None;
                self.release()
            }
            SurfaceInput::ViewportResized(viewport) => {
                self.viewport = viewport;
                let clamped = self.clamp_position(position, size);
                (clamped != position).then_some(SurfaceEvent::Drag(clamped))
            }
        }
    }

    fn release(&mut self) -> Option<SurfaceEvent> {
        match self.grab.take()?.grip {
            Grip::Handle => Some(SurfaceEvent::DragStop),
            Grip::Corner => None,
        }
    }

    fn clamp_position(&self, position: Point, size: Size) -> Point {
        let max_x = (self.viewport.width - size.width).max(0.0);
        let max_y = (self.viewport.height - size.height).max(0.0);
        Point::new(position.x.clamp(0.0, max_x), position.y.clamp(0.0, max_y))
    }

    fn clamp_size(&self, position: Point, size: Size) -> Size {
        let max_width = (self.viewport.width - position.x).max(self.min_size.width);
        let max_height = (self.viewport.height - position.y).max(self.min_size.height);
        Size::new(
            size.width.clamp(self.min_size.width, max_width),
            size.height.clamp(self.min_size.height, max_height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIN: Size = Size::new(300.0, 280.0);

    fn surface() -> Surface {
        Surface::new(Size::new(1000.0, 800.0), MIN)
    }

    #[test]
    fn opens_top_right() {
        let (position, size) = surface().initial_geometry();
        assert_eq!(position, Point::new(650.0, 10.0));
        assert_eq!(size, MIN);

        let narrow = Surface::new(Size::new(200.0, 800.0), MIN);
        assert_eq!(narrow.initial_geometry().0.x, 0.0);
    }

    #[test]
    fn drags_within_viewport() {
        let mut surface = surface();
        let position = Point::new(100.0, 100.0);

        surface.handle(SurfaceInput::CursorMoved(Point::new(110.0, 105.0)), position, MIN);
        assert_eq!(
            surface.handle(SurfaceInput::Press(Grip::Handle), position, MIN),
            Some(SurfaceEvent::DragStart)
        );
        assert_eq!(
            surface.handle(SurfaceInput::CursorMoved(Point::new(160.0, 125.0)), position, MIN),
            Some(SurfaceEvent::Drag(Point::new(150.0, 120.0)))
        );
        assert_eq!(
            surface.handle(SurfaceInput::CursorMoved(Point::new(5000.0, -500.0)), position, MIN),
            Some(SurfaceEvent::Drag(Point::new(700.0, 0.0)))
        );
        assert_eq!(
            surface.handle(SurfaceInput::Released, position, MIN),
            Some(SurfaceEvent::DragStop)
        );
        assert_eq!(
            surface.handle(SurfaceInput::CursorMoved(Point::new(0.0, 0.0)), position, MIN),
            None
        );
    }

    #[test]
    fn resizes_above_minimum() {
        let mut surface = surface();
        let position = Point::new(100.0, 100.0);

        surface.handle(SurfaceInput::CursorMoved(Point::new(400.0, 380.0)), position, MIN);
        assert_eq!(surface.handle(SurfaceInput::Press(Grip::Corner), position, MIN), None);
        assert_eq!(
            surface.handle(SurfaceInput::CursorMoved(Point::new(450.0, 400.0)), position, MIN),
            Some(SurfaceEvent::Resize(Size::new(350.0, 300.0)))
        );
        assert_eq!(
            surface.handle(SurfaceInput::CursorMoved(Point::new(0.0, 0.0)), position, MIN),
            Some(SurfaceEvent::Resize(MIN))
        );
        assert_eq!(
            surface.handle(SurfaceInput::CursorMoved(Point::new(9000.0, 9000.0)), position, MIN),
            Some(SurfaceEvent::Resize(Size::new(900.0, 700.0)))
        );
        assert_eq!(surface.handle(SurfaceInput::Released, position, MIN), None);
        assert!(!surface.is_grabbed());
    }

    #[test]
    fn press_before_any_movement_does_not_jump() {
        let mut surface = surface();
        let position = Point::new(100.0, 100.0);

        surface.handle(SurfaceInput::Press(Grip::Handle), position, MIN);
        assert_eq!(
            surface.handle(SurfaceInput::CursorMoved(Point::new(120.0, 110.0)), position, MIN),
            Some(SurfaceEvent::Drag(position))
        );
        assert_eq!(
            surface.handle(SurfaceInput::CursorMoved(Point::new(130.0, 140.0)), position, MIN),
            Some(SurfaceEvent::Drag(Point::new(110.0, 130.0)))
        );
    }

    #[test]
    fn lifted_touch_is_forgotten() {
        let mut surface = surface();
        let position = Point::new(100.0, 100.0);

        surface.handle(SurfaceInput::CursorMoved(Point::new(400.0, 380.0)), position, MIN);
        surface.handle(SurfaceInput::Press(Grip::Handle), position, MIN);
        assert_eq!(
            surface.handle(SurfaceInput::Lifted, position, MIN),
            Some(SurfaceEvent::DragStop)
        );
        assert!(!surface.is_grabbed());

        // the next touch lands elsewhere; it must not be measured from the old finger
        surface.handle(SurfaceInput::Press(Grip::Corner), position, MIN);
        assert_eq!(
            surface.handle(SurfaceInput::CursorMoved(Point::new(20.0, 30.0)), position, MIN),
            Some(SurfaceEvent::Resize(MIN))
        );
        assert_eq!(
            surface.handle(SurfaceInput::CursorMoved(Point::new(70.0, 60.0)), position, MIN),
            Some(SurfaceEvent::Resize(Size::new(350.0, 310.0)))
        );
    }

    #[test]
    fn shrinking_viewport_pulls_window_back() {
        let mut surface = surface();
        let position = Point::new(650.0, 10.0);

        assert_eq!(
            surface.handle(SurfaceInput::ViewportResized(Size::new(800.0, 600.0)), position, MIN),
            Some(SurfaceEvent::Drag(Point::new(500.0, 10.0)))
        );
        assert_eq!(
            surface.handle(SurfaceInput::ViewportResized(Size::new(1200.0, 900.0)), position, MIN),
            None
        );
    }
}
