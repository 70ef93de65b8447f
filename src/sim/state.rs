//! Game state and core simulation types

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::fuel::FuelGauge;
use super::input::InputIntent;
use super::pool::{EntityKind, EntityPool, SpawnRequest, SpawnResolution, SpawnTicket};
use super::scroller::EnvironmentScroller;
use crate::error::{AssetLoadError, InitError};
use crate::platform::EntityHandle;
use crate::tuning::Tuning;

/// Lifecycle of a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the start action (and the car model)
    NotStarted,
    /// Active gameplay
    Playing,
    /// Run ended; only a restart leaves this phase
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    Crashed,
    OutOfFuel,
}

/// Something the host should react to (audio, HUD, scene)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Entered Playing; engine loop should start
    Started,
    /// Engine loop should stop
    EngineStopped,
    /// Tank ran dry this tick
    FuelDepleted,
    /// Car hit this obstacle
    Crashed { handle: EntityHandle },
    /// Fuel tank picked up and removed from the pool
    FuelCollected { handle: EntityHandle, level: f64 },
    /// Entity drove past the camera and left the pool
    EntityRetired { handle: EntityHandle },
    GameOver { reason: EndReason },
}

/// The player's car. Height is fixed at road level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
    /// Scene handle, `None` until the model has loaded
    pub handle: Option<EntityHandle>,
    pub pos: Vec3,
}

impl Default for Car {
    fn default() -> Self {
        Self {
            handle: None,
            pos: Vec3::ZERO,
        }
    }
}

impl Car {
    /// Step once per active direction, then clamp to the track
    pub fn steer(&mut self, input: &InputIntent, tuning: &Tuning) {
        if input.move_forward {
            self.pos.z -= tuning.forward_step;
        }
        if input.move_backward {
            self.pos.z += tuning.forward_step;
        }
        if input.move_left {
            self.pos.x -= tuning.lateral_step;
        }
        if input.move_right {
            self.pos.x += tuning.lateral_step;
        }
        self.clamp_to_track(tuning);
    }

    pub fn clamp_to_track(&mut self, tuning: &Tuning) {
        self.pos.x = self.pos.x.clamp(-tuning.car_max_x, tuning.car_max_x);
        self.pos.z = self.pos.z.clamp(tuning.car_min_z, tuning.car_max_z);
    }
}

/// Complete game state for one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Spawn RNG
    pub rng: Pcg32,
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub end_reason: Option<EndReason>,
    /// Odometer
    pub distance: f64,
    pub fuel: FuelGauge,
    pub car: Car,
    pub scroller: EnvironmentScroller,
    /// Obstacles and fuel tanks
    pub pool: EntityPool,
    /// Whether the engine loop is (supposed to be) audible
    pub engine_running: bool,
    /// Simulation tick counter (Playing ticks only)
    pub time_ticks: u64,
}

impl GameState {
    /// Create a new game state with the given seed
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::NotStarted,
            end_reason: None,
            distance: 0.0,
            fuel: FuelGauge::new(tuning.initial_fuel, tuning.max_fuel),
            car: Car::default(),
            scroller: EnvironmentScroller::new(
                tuning.segment_start_z(),
                tuning.segment_wrap_z,
                tuning.segment_far_z(),
            ),
            pool: EntityPool::new(),
            engine_running: false,
            time_ticks: 0,
            tuning,
        }
    }

    /// Install the car once its model has loaded
    pub fn attach_car(&mut self, handle: EntityHandle) {
        self.car.handle = Some(handle);
    }

    /// NotStarted → Playing
    pub fn start(&mut self) -> Result<GameEvent, InitError> {
        if self.phase != GamePhase::NotStarted {
            return Err(InitError::AlreadyStarted);
        }
        if self.car.handle.is_none() {
            return Err(InitError::CarModel(AssetLoadError::new(
                crate::consts::CAR_MODEL_PATH,
                "car model not attached",
            )));
        }
        self.phase = GamePhase::Playing;
        self.engine_running = true;
        log::info!("Run started (seed {})", self.seed);
        Ok(GameEvent::Started)
    }

    /// Enter GameOver, recording why. Returns the events describing it.
    pub fn end(&mut self, reason: EndReason) -> Vec<GameEvent> {
        let mut events = Vec::with_capacity(3);
        self.phase = GamePhase::GameOver;
        self.end_reason = Some(reason);
        if self.engine_running {
            self.engine_running = false;
            events.push(GameEvent::EngineStopped);
        }
        events.push(GameEvent::GameOver { reason });
        log::info!(
            "Game over ({:?}) after {:.2} units, fuel {:.1}",
            reason,
            self.distance,
            self.fuel.level()
        );
        events
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Issue a spawn. Ignored unless Playing.
    pub fn request_spawn(&mut self, kind: EntityKind) -> Option<SpawnRequest> {
        if !self.is_playing() {
            return None;
        }
        Some(self.pool.issue(kind, &self.tuning, &mut self.rng))
    }

    /// Complete a spawn issued earlier; refused once the run is over
    pub fn resolve_spawn(
        &mut self,
        ticket: SpawnTicket,
        result: Result<EntityHandle, AssetLoadError>,
    ) -> SpawnResolution {
        let accepting = self.is_playing();
        self.pool.resolve(ticket, result, accepting)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_state() {
        let state = GameState::new(1, Tuning::default());
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert_eq!(state.fuel.level(), 100.0);
        assert_eq!(state.distance, 0.0);
        assert_eq!(state.car.pos, Vec3::ZERO);
        assert!(state.pool.is_empty());
    }

    #[test]
    fn test_start_requires_car() {
        let mut state = GameState::new(1, Tuning::default());
        assert!(matches!(state.start(), Err(InitError::CarModel(_))));
        assert_eq!(state.phase, GamePhase::NotStarted);

        state.attach_car(EntityHandle(1));
        assert_eq!(state.start().ok(), Some(GameEvent::Started));
        assert!(state.is_playing());
        assert!(state.engine_running);
        assert!(matches!(state.start(), Err(InitError::AlreadyStarted)));
    }

    #[test]
    fn test_spawn_only_while_playing() {
        let mut state = GameState::new(1, Tuning::default());
        assert!(state.request_spawn(EntityKind::Obstacle).is_none());

        state.attach_car(EntityHandle(1));
        state.start().expect("start");
        let request = state.request_spawn(EntityKind::Obstacle).expect("playing");

        state.end(EndReason::Crashed);
        assert!(state.request_spawn(EntityKind::FuelTank).is_none());
        assert_eq!(
            state.resolve_spawn(request.ticket, Ok(EntityHandle(5))),
            SpawnResolution::Discarded(EntityHandle(5))
        );
        assert!(state.pool.is_empty());
    }

    #[test]
    fn test_end_stops_engine_once() {
        let mut state = GameState::new(1, Tuning::default());
        state.attach_car(EntityHandle(1));
        state.start().expect("start");
        let events = state.end(EndReason::OutOfFuel);
        assert_eq!(
            events,
            vec![
                GameEvent::EngineStopped,
                GameEvent::GameOver {
                    reason: EndReason::OutOfFuel
                }
            ]
        );
        assert_eq!(state.end_reason, Some(EndReason::OutOfFuel));
    }

    #[test]
    fn test_steer_right_until_edge() {
        let tuning = Tuning::default();
        let mut car = Car {
            handle: None,
            pos: Vec3::new(5.0, 0.0, 0.0),
        };
        let input = InputIntent {
            move_right: true,
            ..Default::default()
        };
        car.steer(&input, &tuning);
        assert!((car.pos.x - 5.15).abs() < 1e-5);
        for _ in 0..20 {
            car.steer(&input, &tuning);
        }
        assert_eq!(car.pos.x, 6.0);
    }

    #[test]
    fn test_forward_and_lateral_steps_differ() {
        let tuning = Tuning::default();
        let mut car = Car::default();
        let input = InputIntent {
            move_forward: true,
            move_left: true,
            ..Default::default()
        };
        car.steer(&input, &tuning);
        assert!((car.pos.z - -0.2).abs() < 1e-6);
        assert!((car.pos.x - -0.15).abs() < 1e-6);
    }

    #[test]
    fn test_opposing_inputs_cancel() {
        let tuning = Tuning::default();
        let mut car = Car::default();
        let input = InputIntent {
            move_forward: true,
            move_backward: true,
            move_left: true,
            move_right: true,
        };
        car.steer(&input, &tuning);
        assert!(car.pos.x.abs() < 1e-6);
        assert!(car.pos.z.abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_car_stays_on_track(
            x in -20.0f32..20.0,
            z in -60.0f32..30.0,
            steps in proptest::collection::vec(any::<(bool, bool, bool, bool)>(), 1..50),
        ) {
            let tuning = Tuning::default();
            let mut car = Car { handle: None, pos: Vec3::new(x, 0.0, z) };
            for (f, b, l, r) in steps {
                let input = InputIntent {
                    move_forward: f,
                    move_backward: b,
                    move_left: l,
                    move_right: r,
                };
                car.steer(&input, &tuning);
                prop_assert!((-6.0..=6.0).contains(&car.pos.x));
                prop_assert!((-35.0..=6.0).contains(&car.pos.z));
                prop_assert_eq!(car.pos.y, 0.0);

                // Clamping twice changes nothing
                let before = car.pos;
                car.clamp_to_track(&tuning);
                prop_assert_eq!(car.pos, before);
            }
        }
    }
}
