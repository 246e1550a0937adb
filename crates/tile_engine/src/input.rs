//! Turns raw keyboard, pointer and touch events into move directions.
//!
//! The translator owns no event loop. Hosts push events through an
//! [`InputSource`] and say, through an [`InputGate`], whether the session
//! can take a move right now.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::Direction;

/// Shortest drag, in device-independent pixels, that counts as a swipe.
pub const SWIPE_THRESHOLD: f32 = 30.0;

/// Screen position with `y` growing downward.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Other,
}

impl Key {
    pub const fn direction(self) -> Option<Direction> {
        match self {
            Self::ArrowUp => Some(Direction::Up),
            Self::ArrowDown => Some(Direction::Down),
            Self::ArrowLeft => Some(Direction::Left),
            Self::ArrowRight => Some(Direction::Right),
            Self::Other => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    PointerDown(Point),
    PointerUp(Point),
    TouchStart(Point),
    TouchEnd(Point),
}

/// Whether the session currently takes moves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InputGate {
    #[default]
    Ready,
    /// A move is between its slide and settle phases.
    Moving,
    /// The game is over.
    Over,
}

/// Anything events can be drained from.
pub trait InputSource {
    fn next_event(&mut self) -> Option<InputEvent>;
}

impl InputSource for VecDeque<InputEvent> {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.pop_front()
    }
}

/// Direction of a drag by `(dx, dy)`, or `None` for a drag shorter than
/// `threshold` on both axes. Ties go to the vertical axis.
pub fn swipe_direction(dx: f32, dy: f32, threshold: f32) -> Option<Direction> {
    let (abs_x, abs_y) = (dx.abs(), dy.abs());
    if abs_x.max(abs_y) < threshold {
        return None;
    }
    Some(if abs_x > abs_y {
        if dx > 0.0 { Direction::Right } else { Direction::Left }
    } else if dy > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    })
}

/// Tracks the one pending gesture origin and maps events to directions.
#[derive(Debug, Clone, PartialEq)]
pub struct InputTranslator {
    origin: Option<Point>,
    threshold: f32,
}

impl Default for InputTranslator {
    fn default() -> Self {
        Self::new(SWIPE_THRESHOLD)
    }
}

impl InputTranslator {
    pub const fn new(threshold: f32) -> Self {
        Self {
            origin: None,
            threshold,
        }
    }

    pub const fn origin(&self) -> Option<Point> {
        self.origin
    }

    /// Maps one event. Presses are remembered unless the game is over; a
    /// release always consumes the origin and only yields a direction while
    /// the gate is [`InputGate::Ready`]. Nothing is queued.
    pub fn translate(&mut self, event: InputEvent, gate: InputGate) -> Option<Direction> {
        match event {
            InputEvent::KeyDown(key) => match gate {
                InputGate::Ready => key.direction(),
                InputGate::Moving | InputGate::Over => None,
            },
            InputEvent::PointerDown(point) | InputEvent::TouchStart(point) => {
                if gate != InputGate::Over {
                    self.origin = Some(point);
                }
                None
            }
            InputEvent::PointerUp(point) | InputEvent::TouchEnd(point) => {
                let origin = self.origin.take()?;
                if gate != InputGate::Ready {
                    return None;
                }
                swipe_direction(point.x - origin.x, point.y - origin.y, self.threshold)
            }
        }
    }

    /// Drains `source` and returns the direction to dispatch, if any.
    ///
    /// Once a direction comes out the rest of the batch is handled as if a
    /// move were already in flight, so at most one direction is produced.
    pub fn poll<S: InputSource + ?Sized>(
        &mut self,
        source: &mut S,
        gate: InputGate,
    ) -> Option<Direction> {
        let mut gate = gate;
        let mut dispatched = None;
        while let Some(event) = source.next_event() {
            if let Some(direction) = self.translate(event, gate) {
                dispatched = Some(direction);
                gate = InputGate::Moving;
            }
        }
        dispatched
    }
}
