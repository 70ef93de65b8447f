//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads lives in [`Tuning`]. Defaults
//! come from [`crate::consts`]; a JSON document may override any subset.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Gameplay constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Car ===
    pub distance_step: f64,
    /// Forward/backward step. Kept separate from the lateral step
    pub forward_step: f32,
    pub lateral_step: f32,
    pub car_max_x: f32,
    pub car_min_z: f32,
    pub car_max_z: f32,

    // === Fuel ===
    pub max_fuel: f64,
    pub initial_fuel: f64,
    pub consumption_rate: f64,
    pub collection_bonus: f64,

    // === Collision ===
    pub obstacle_threshold: f32,
    pub fuel_threshold: f32,

    // === Track ===
    pub track_length: f32,
    pub scroll_speed: f32,
    pub segment_wrap_z: f32,
    pub segment_start_offset: f32,

    // === Entities ===
    pub entity_step: f32,
    pub spawn_z: f32,
    pub retire_z: f32,
    pub obstacle_x_range: (f32, f32),
    pub fuel_x_range: (f32, f32),
    pub fuel_spawn_y: f32,
    pub fuel_rotation_speed: f32,
    pub obstacle_rotation_speed: f32,

    // === Spawn timers ===
    pub obstacle_spawn_interval_ms: f64,
    pub fuel_spawn_interval_ms: f64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            distance_step: DISTANCE_STEP,
            forward_step: CAR_FORWARD_STEP,
            lateral_step: CAR_LATERAL_STEP,
            car_max_x: CAR_MAX_X,
            car_min_z: CAR_MIN_Z,
            car_max_z: CAR_MAX_Z,

            max_fuel: MAX_FUEL,
            initial_fuel: INITIAL_FUEL,
            consumption_rate: FUEL_CONSUMPTION_RATE,
            collection_bonus: FUEL_COLLECTION_BONUS,

            obstacle_threshold: OBSTACLE_COLLISION_THRESHOLD,
            fuel_threshold: FUEL_COLLISION_THRESHOLD,

            track_length: TRACK_LENGTH,
            scroll_speed: SCROLL_SPEED,
            segment_wrap_z: SEGMENT_WRAP_Z,
            segment_start_offset: SEGMENT_START_OFFSET,

            entity_step: ENTITY_STEP,
            spawn_z: SPAWN_Z,
            retire_z: RETIRE_Z,
            obstacle_x_range: OBSTACLE_X_RANGE,
            fuel_x_range: FUEL_X_RANGE,
            fuel_spawn_y: FUEL_SPAWN_Y,
            fuel_rotation_speed: FUEL_ROTATION_SPEED,
            obstacle_rotation_speed: OBSTACLE_ROTATION_SPEED,

            obstacle_spawn_interval_ms: OBSTACLE_SPAWN_INTERVAL_MS,
            fuel_spawn_interval_ms: FUEL_SPAWN_INTERVAL_MS,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and validate the result
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Depth the scrolling segments wrap back to
    pub fn segment_far_z(&self) -> f32 {
        -self.track_length / 2.0
    }

    /// Initial depth of every scrolling segment
    pub fn segment_start_z(&self) -> f32 {
        self.segment_far_z() + self.segment_start_offset
    }

    /// Check ranges the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("distance_step", self.distance_step)?;
        non_negative("forward_step", self.forward_step as f64)?;
        non_negative("lateral_step", self.lateral_step as f64)?;
        positive("car_max_x", self.car_max_x as f64)?;
        if self.car_min_z >= self.car_max_z {
            return Err(out_of_range(
                "car_min_z",
                format!("{} must be below car_max_z {}", self.car_min_z, self.car_max_z),
            ));
        }

        positive("max_fuel", self.max_fuel)?;
        if !(0.0..=self.max_fuel).contains(&self.initial_fuel) {
            return Err(out_of_range(
                "initial_fuel",
                format!("{} not within [0, {}]", self.initial_fuel, self.max_fuel),
            ));
        }
        non_negative("consumption_rate", self.consumption_rate)?;
        non_negative("collection_bonus", self.collection_bonus)?;

        positive("obstacle_threshold", self.obstacle_threshold as f64)?;
        positive("fuel_threshold", self.fuel_threshold as f64)?;

        positive("track_length", self.track_length as f64)?;
        non_negative("scroll_speed", self.scroll_speed as f64)?;
        if self.segment_far_z() >= self.segment_wrap_z {
            return Err(out_of_range(
                "segment_wrap_z",
                format!("{} must be beyond the far end {}", self.segment_wrap_z, self.segment_far_z()),
            ));
        }

        non_negative("entity_step", self.entity_step as f64)?;
        if self.spawn_z >= self.retire_z {
            return Err(out_of_range(
                "spawn_z",
                format!("{} must be farther than retire_z {}", self.spawn_z, self.retire_z),
            ));
        }
        range("obstacle_x_range", self.obstacle_x_range)?;
        range("fuel_x_range", self.fuel_x_range)?;

        positive("obstacle_spawn_interval_ms", self.obstacle_spawn_interval_ms)?;
        positive("fuel_spawn_interval_ms", self.fuel_spawn_interval_ms)?;
        Ok(())
    }
}

fn out_of_range(field: &'static str, reason: String) -> ConfigError {
    ConfigError::OutOfRange { field, reason }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(out_of_range(field, format!("{value} must be >= 0")))
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(out_of_range(field, format!("{value} must be > 0")))
    }
}

fn range(field: &'static str, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min < max {
        Ok(())
    } else {
        Err(out_of_range(field, format!("[{min}, {max}) is empty")))
    }
}
