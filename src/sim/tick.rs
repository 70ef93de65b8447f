//! Per-frame simulation tick
//!
//! One call advances the run by exactly one display frame. The tick only
//! mutates [`GameState`]; everything the outside world should hear about is
//! returned as [`GameEvent`]s.

use super::collision::collides;
use super::input::InputIntent;
use super::state::{EndReason, GameEvent, GamePhase, GameState};
use crate::platform::EntityHandle;

/// Result of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub phase: GamePhase,
    pub events: Vec<GameEvent>,
}

impl TickOutcome {
    fn idle(phase: GamePhase) -> Self {
        Self {
            phase,
            events: Vec::new(),
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState, input: &InputIntent) -> TickOutcome {
    if state.phase != GamePhase::Playing {
        // Terminal bookkeeping only: make sure the engine loop is silenced
        let mut outcome = TickOutcome::idle(state.phase);
        if state.engine_running {
            state.engine_running = false;
            outcome.events.push(GameEvent::EngineStopped);
        }
        return outcome;
    }

    // Car not loaded yet: nothing to simulate around
    if state.car.handle.is_none() {
        return TickOutcome::idle(state.phase);
    }

    let mut events = Vec::new();
    state.time_ticks += 1;
    state.distance += state.tuning.distance_step;

    state.car.steer(input, &state.tuning);

    state.fuel.consume(state.tuning.consumption_rate);
    if state.fuel.is_empty() {
        events.push(GameEvent::FuelDepleted);
        events.extend(state.end(EndReason::OutOfFuel));
        return TickOutcome {
            phase: state.phase,
            events,
        };
    }

    state.scroller.advance(state.tuning.scroll_speed);

    state.pool.advance_all(state.tuning.entity_step);
    events.extend(
        state
            .pool
            .retire_expired(state.tuning.retire_z)
            .into_iter()
            .map(|handle| GameEvent::EntityRetired { handle }),
    );

    let car_pos = state.car.pos;
    let obstacle_hit = state
        .pool
        .obstacles()
        .find(|o| collides(car_pos, o.pos, state.tuning.obstacle_threshold))
        .map(|o| o.handle);
    if let Some(handle) = obstacle_hit {
        events.push(GameEvent::Crashed { handle });
        events.extend(state.end(EndReason::Crashed));
        return TickOutcome {
            phase: state.phase,
            events,
        };
    }

    // Every overlapping tank counts, not just the first
    let collected: Vec<EntityHandle> = state
        .pool
        .fuel_tanks()
        .filter(|t| collides(car_pos, t.pos, state.tuning.fuel_threshold))
        .map(|t| t.handle)
        .collect();
    if !collected.is_empty() {
        state.pool.remove(&collected);
        for handle in collected {
            let level = state.fuel.collect(state.tuning.collection_bonus);
            log::debug!("Collected fuel {:?}, level {:.1}", handle, level);
            events.push(GameEvent::FuelCollected { handle, level });
        }
    }

    TickOutcome {
        phase: state.phase,
        events,
    }
}
