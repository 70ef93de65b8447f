//! Movement intent
//!
//! A single record written by whichever input source fired last (keyboard,
//! joystick drag, touch) and read by the simulation at the top of its
//! movement step.

use serde::{Deserialize, Serialize};

/// Which directions the player is currently asking for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputIntent {
    pub move_forward: bool,
    pub move_backward: bool,
    pub move_left: bool,
    pub move_right: bool,
}

/// Movement direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
}

impl Direction {
    /// Map a `KeyboardEvent.code` to a direction (arrows and WASD)
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "ArrowUp" | "KeyW" => Some(Direction::Forward),
            "ArrowDown" | "KeyS" => Some(Direction::Backward),
            "ArrowLeft" | "KeyA" => Some(Direction::Left),
            "ArrowRight" | "KeyD" => Some(Direction::Right),
            _ => None,
        }
    }
}

impl InputIntent {
    pub fn set(&mut self, direction: Direction, active: bool) {
        match direction {
            Direction::Forward => self.move_forward = active,
            Direction::Backward => self.move_backward = active,
            Direction::Left => self.move_left = active,
            Direction::Right => self.move_right = active,
        }
    }

    /// Keyboard source: key down sets, key up clears. Returns false for
    /// keys that don't steer.
    pub fn apply_key(&mut self, code: &str, pressed: bool) -> bool {
        match Direction::from_key_code(code) {
            Some(direction) => {
                self.set(direction, pressed);
                true
            }
            None => false,
        }
    }

    /// Joystick source: drag offset from the press point (screen pixels,
    /// y grows downward). Each axis registers once it passes `threshold`.
    pub fn apply_joystick(&mut self, dx: f32, dy: f32, threshold: f32) {
        self.move_forward = dy < -threshold;
        self.move_backward = dy > threshold;
        self.move_left = dx < -threshold;
        self.move_right = dx > threshold;
    }

    /// Joystick released / focus lost
    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    pub fn is_idle(&self) -> bool {
        !(self.move_forward || self.move_backward || self.move_left || self.move_right)
    }
}
