//! Simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One tick per display frame, fixed per-tick steps
//! - Seeded RNG only
//! - No rendering, DOM or audio dependencies

pub mod collision;
pub mod fuel;
pub mod input;
pub mod pool;
pub mod scroller;
pub mod state;
pub mod tick;

pub use collision::collides;
pub use fuel::FuelGauge;
pub use input::{Direction, InputIntent};
pub use pool::{
    Entity, EntityKind, EntityPool, ObstacleVariant, SpawnRequest, SpawnResolution, SpawnTicket,
};
pub use scroller::{EnvironmentScroller, Segment, SegmentKind};
pub use state::{Car, EndReason, GameEvent, GamePhase, GameState};
pub use tick::{TickOutcome, tick};
