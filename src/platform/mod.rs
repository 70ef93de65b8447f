//! Platform abstraction layer
//!
//! The simulation never touches the renderer, the DOM or the audio device.
//! Hosts implement these traits; [`crate::FrameDriver`] calls them after each
//! tick to apply the change-set the simulation produced.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::sim::SegmentKind;

/// Opaque handle to a renderable object owned by the scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(pub u32);

/// Scene/render surface
pub trait SceneSurface {
    fn add_entity(&mut self, handle: EntityHandle, scale: Vec3);
    /// Also releases handles that were loaded but never added
    fn remove_entity(&mut self, handle: EntityHandle);
    /// Move an entity and set its yaw (radians)
    fn set_transform(&mut self, handle: EntityHandle, pos: Vec3, yaw: f32);
    fn set_segment_z(&mut self, segment: SegmentKind, z: f32);
    fn render_frame(&mut self);
}

/// HUD and overlay widgets
pub trait UiSink {
    fn update_distance(&mut self, distance: f64);
    fn update_fuel(&mut self, percent: f64);
    fn show_restart(&mut self);
    fn show_loading(&mut self);
    fn hide_loading(&mut self);
}

/// One-shot sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// Car hit an obstacle
    Crash,
    /// Fuel tank picked up
    CollectFuel,
}

/// Fire-and-forget audio channel
pub trait AudioSink {
    /// Start the looping engine sound
    fn start_engine(&mut self);
    fn stop_engine(&mut self);
    fn play(&mut self, cue: SoundCue);
}
