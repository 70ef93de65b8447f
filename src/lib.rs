//! Fuel Rush - an endless-road arcade driver
//!
//! Core modules:
//! - `sim`: Simulation (car, entity pools, collisions, fuel, phase machine)
//! - `driver`: Per-frame scheduling, spawn timers and side-effect dispatch
//! - `platform`: Boundary traits for scene, UI and audio collaborators
//! - `tuning`: Data-driven game balance
//! - `settings`: Player preferences

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod driver;
pub mod error;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;
pub mod ui;

pub use driver::{FrameDriver, FrameStatus, SpawnTimers};
pub use error::{AssetLoadError, ConfigError, InitError};
pub use settings::Settings;
pub use tuning::Tuning;

/// Game configuration constants
///
/// These are the defaults behind [`Tuning`]; the simulation reads the tuning
/// values, never these directly.
pub mod consts {
    /// Distance added to the odometer per tick
    pub const DISTANCE_STEP: f64 = 0.02;

    /// Car movement per tick along the track (z)
    pub const CAR_FORWARD_STEP: f32 = 0.2;
    /// Car movement per tick across the track (x)
    pub const CAR_LATERAL_STEP: f32 = 0.15;
    /// Lateral track bound (car x stays within ±this)
    pub const CAR_MAX_X: f32 = 6.0;
    /// Furthest the car may drive ahead (most negative z)
    pub const CAR_MIN_Z: f32 = -35.0;
    /// Furthest the car may drop back toward the camera
    pub const CAR_MAX_Z: f32 = 6.0;

    /// Fuel gauge
    pub const MAX_FUEL: f64 = 100.0;
    pub const INITIAL_FUEL: f64 = 100.0;
    pub const FUEL_CONSUMPTION_RATE: f64 = 0.1;
    pub const FUEL_COLLECTION_BONUS: f64 = 20.0;

    /// Box half-extents for the two collision pairings
    pub const OBSTACLE_COLLISION_THRESHOLD: f32 = 3.0;
    pub const FUEL_COLLISION_THRESHOLD: f32 = 2.0;

    /// Track geometry
    pub const TRACK_LENGTH: f32 = 500.0;
    pub const SCROLL_SPEED: f32 = 0.6;
    /// Segments past this depth are recycled to the far end
    pub const SEGMENT_WRAP_Z: f32 = 30.0;
    /// Initial segment depth (shifted toward the camera)
    pub const SEGMENT_START_OFFSET: f32 = 30.0;

    /// Pooled entities
    pub const ENTITY_STEP: f32 = 0.6;
    pub const SPAWN_Z: f32 = -250.0;
    pub const RETIRE_Z: f32 = 20.0;
    /// Obstacle lateral spawn range [min, max)
    pub const OBSTACLE_X_RANGE: (f32, f32) = (-5.0, 5.0);
    /// Fuel tank lateral spawn range [min, max)
    pub const FUEL_X_RANGE: (f32, f32) = (-5.0, 7.0);
    /// Fuel tanks hover one unit above the road
    pub const FUEL_SPAWN_Y: f32 = 1.0;
    /// Fuel tank spin (radians per tick)
    pub const FUEL_ROTATION_SPEED: f32 = 0.02;
    /// Obstacle spin (radians per tick)
    pub const OBSTACLE_ROTATION_SPEED: f32 = 0.0;

    /// Spawn timer intervals (milliseconds)
    pub const OBSTACLE_SPAWN_INTERVAL_MS: f64 = 2000.0;
    pub const FUEL_SPAWN_INTERVAL_MS: f64 = 4000.0;

    /// Car model placement
    pub const CAR_SCALE: f32 = 0.7;
    pub const CAR_YAW: f32 = std::f32::consts::PI;

    /// Asset paths
    pub const CAR_MODEL_PATH: &str = "./models/car/rc-10.glb";
    pub const FUEL_MODEL_PATH: &str = "./models/fuel/fuel.gltf";
}

/// Wrap a yaw angle to [-π, π)
#[inline]
pub fn wrap_yaw(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
