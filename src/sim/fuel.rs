//! Fuel gauge
//!
//! Level always stays within `[0, capacity]`. Depletion is reported, not
//! acted on; the state machine decides what running dry means.

use serde::{Deserialize, Serialize};

/// Residual below which a consumed tank counts as empty
const EMPTY_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelGauge {
    level: f64,
    capacity: f64,
}

impl FuelGauge {
    pub fn new(initial: f64, capacity: f64) -> Self {
        Self {
            level: initial.clamp(0.0, capacity),
            capacity,
        }
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Burn `rate` units, never below zero
    pub fn consume(&mut self, rate: f64) -> f64 {
        self.level = (self.level - rate).max(0.0);
        if self.level < EMPTY_EPSILON {
            self.level = 0.0;
        }
        self.level
    }

    /// Add a pickup's `bonus`, never above capacity
    pub fn collect(&mut self, bonus: f64) -> f64 {
        self.level = (self.level + bonus).min(self.capacity);
        self.level
    }

    pub fn is_empty(&self) -> bool {
        self.level <= 0.0
    }
}
