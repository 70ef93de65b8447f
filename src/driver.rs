//! Frame driver
//!
//! Runs one simulation tick per display refresh, fires the spawn timers,
//! and applies each tick's change-set to the scene, HUD and audio. Once the
//! run ends the driver reports [`FrameStatus::Stop`] and the host must stop
//! requesting frames.

use crate::consts::{CAR_SCALE, CAR_YAW};
use crate::error::{AssetLoadError, InitError};
use crate::platform::{AudioSink, EntityHandle, SceneSurface, SoundCue, UiSink};
use crate::sim::{
    EntityKind, GameEvent, GamePhase, GameState, InputIntent, SpawnRequest, SpawnResolution,
    SpawnTicket, tick,
};
use crate::tuning::Tuning;
use glam::Vec3;

/// Longest frame gap the spawn timers will account for (ms). Background tabs
/// stop refreshing; coming back should not unleash a burst of spawns.
const MAX_FRAME_GAP_MS: f64 = 250.0;

/// Fixed-interval spawn triggers, one per entity kind
#[derive(Debug, Clone)]
pub struct SpawnTimers {
    obstacle_interval_ms: f64,
    fuel_interval_ms: f64,
    obstacle_elapsed_ms: f64,
    fuel_elapsed_ms: f64,
    last_time_ms: Option<f64>,
    cancelled: bool,
}

impl SpawnTimers {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            obstacle_interval_ms: tuning.obstacle_spawn_interval_ms,
            fuel_interval_ms: tuning.fuel_spawn_interval_ms,
            obstacle_elapsed_ms: 0.0,
            fuel_elapsed_ms: 0.0,
            last_time_ms: None,
            cancelled: false,
        }
    }

    /// Advance to frame timestamp `now_ms`, returning the kinds due a spawn.
    /// Nothing fires unless `phase` is Playing.
    pub fn advance(&mut self, now_ms: f64, phase: GamePhase) -> Vec<EntityKind> {
        let elapsed = match self.last_time_ms.replace(now_ms) {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_GAP_MS),
            None => 0.0,
        };
        if self.cancelled || phase != GamePhase::Playing {
            return Vec::new();
        }

        let mut due = Vec::new();
        self.obstacle_elapsed_ms += elapsed;
        while self.obstacle_elapsed_ms >= self.obstacle_interval_ms {
            self.obstacle_elapsed_ms -= self.obstacle_interval_ms;
            due.push(EntityKind::Obstacle);
        }
        self.fuel_elapsed_ms += elapsed;
        while self.fuel_elapsed_ms >= self.fuel_interval_ms {
            self.fuel_elapsed_ms -= self.fuel_interval_ms;
            due.push(EntityKind::FuelTank);
        }
        due
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

/// Whether the host should request another frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Continue,
    Stop,
}

/// What one frame produced for the host
#[derive(Debug, Clone)]
pub struct FrameReport {
    pub status: FrameStatus,
    /// Models the host should start loading
    pub spawns: Vec<SpawnRequest>,
}

pub struct FrameDriver {
    state: GameState,
    input: InputIntent,
    timers: SpawnTimers,
    scheduled: bool,
}

impl FrameDriver {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        Self {
            timers: SpawnTimers::new(&tuning),
            state: GameState::new(seed, tuning),
            input: InputIntent::default(),
            scheduled: false,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn input(&self) -> &InputIntent {
        &self.input
    }

    /// Shared intent record for input sources to write into
    pub fn input_mut(&mut self) -> &mut InputIntent {
        &mut self.input
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Finish start-up with the car model load result and start playing.
    /// The loading overlay is dismissed either way.
    pub fn begin(
        &mut self,
        car: Result<EntityHandle, AssetLoadError>,
        scene: &mut impl SceneSurface,
        ui: &mut impl UiSink,
        audio: &mut impl AudioSink,
    ) -> Result<(), InitError> {
        if self.state.phase != GamePhase::NotStarted {
            if let Ok(handle) = car {
                scene.remove_entity(handle);
            }
            return Err(InitError::AlreadyStarted);
        }
        let handle = match car {
            Ok(handle) => handle,
            Err(err) => {
                ui.hide_loading();
                log::error!("Game initialization failed: {}", err);
                return Err(err.into());
            }
        };

        scene.add_entity(handle, Vec3::splat(CAR_SCALE));
        self.state.attach_car(handle);
        let started = self.state.start()?;
        ui.hide_loading();
        self.dispatch(&[started], scene, ui, audio);
        self.sync_scene(scene);
        self.push_hud(ui);
        self.scheduled = true;
        Ok(())
    }

    /// Run one display frame at timestamp `now_ms`
    pub fn frame(
        &mut self,
        now_ms: f64,
        scene: &mut impl SceneSurface,
        ui: &mut impl UiSink,
        audio: &mut impl AudioSink,
    ) -> FrameReport {
        if !self.scheduled {
            return FrameReport {
                status: FrameStatus::Stop,
                spawns: Vec::new(),
            };
        }

        let spawns: Vec<SpawnRequest> = self
            .timers
            .advance(now_ms, self.state.phase)
            .into_iter()
            .filter_map(|kind| self.state.request_spawn(kind))
            .collect();

        let outcome = tick(&mut self.state, &self.input);
        self.dispatch(&outcome.events, scene, ui, audio);
        self.sync_scene(scene);
        self.push_hud(ui);
        scene.render_frame();

        let status = if outcome.is_game_over() {
            self.timers.cancel();
            self.scheduled = false;
            FrameStatus::Stop
        } else {
            FrameStatus::Continue
        };
        FrameReport { status, spawns }
    }

    /// Hand back a model load for a spawn issued by [`FrameDriver::frame`]
    pub fn resolve_spawn(
        &mut self,
        ticket: SpawnTicket,
        result: Result<EntityHandle, AssetLoadError>,
        scene: &mut impl SceneSurface,
    ) -> SpawnResolution {
        let resolution = self.state.resolve_spawn(ticket, result);
        match &resolution {
            SpawnResolution::Installed(handle) => {
                if let Some(entity) = self.state.pool.get(*handle) {
                    scene.add_entity(entity.handle, entity.scale);
                    scene.set_transform(entity.handle, entity.pos, entity.yaw);
                }
            }
            SpawnResolution::Discarded(handle) => scene.remove_entity(*handle),
            SpawnResolution::Failed(_) => {}
        }
        resolution
    }

    /// Throw the finished run away and play again with a fresh state.
    /// The car stays in the scene; pooled entities are removed.
    pub fn restart(
        &mut self,
        seed: u64,
        scene: &mut impl SceneSurface,
        ui: &mut impl UiSink,
        audio: &mut impl AudioSink,
    ) -> Result<(), InitError> {
        let car = self.state.car.handle.ok_or_else(|| {
            InitError::CarModel(AssetLoadError::new(
                crate::consts::CAR_MODEL_PATH,
                "car model never loaded",
            ))
        })?;
        let mut pool = std::mem::take(&mut self.state.pool);
        for handle in pool.clear() {
            scene.remove_entity(handle);
        }
        if self.state.engine_running {
            audio.stop_engine();
        }

        let tuning = self.state.tuning.clone();
        self.timers = SpawnTimers::new(&tuning);
        self.state = GameState::new(seed, tuning);
        self.state.attach_car(car);
        // Tickets keep counting so a load from the old run never matches a new slot
        self.state.pool = pool;
        self.input.release_all();

        let started = self.state.start()?;
        self.dispatch(&[started], scene, ui, audio);
        self.sync_scene(scene);
        self.push_hud(ui);
        self.scheduled = true;
        log::info!("Game restarted with seed: {}", seed);
        Ok(())
    }

    fn dispatch(
        &self,
        events: &[GameEvent],
        scene: &mut impl SceneSurface,
        ui: &mut impl UiSink,
        audio: &mut impl AudioSink,
    ) {
        for event in events {
            match *event {
                GameEvent::Started => audio.start_engine(),
                GameEvent::EngineStopped => audio.stop_engine(),
                GameEvent::FuelDepleted => log::info!("Out of fuel"),
                GameEvent::Crashed { handle } => {
                    log::info!("Crashed into {:?}", handle);
                    audio.play(SoundCue::Crash);
                }
                GameEvent::FuelCollected { handle, .. } => {
                    scene.remove_entity(handle);
                    audio.play(SoundCue::CollectFuel);
                }
                GameEvent::EntityRetired { handle } => scene.remove_entity(handle),
                GameEvent::GameOver { .. } => ui.show_restart(),
            }
        }
    }

    fn sync_scene(&self, scene: &mut impl SceneSurface) {
        if let Some(car) = self.state.car.handle {
            scene.set_transform(car, self.state.car.pos, CAR_YAW);
        }
        for segment in self.state.scroller.segments() {
            scene.set_segment_z(segment.kind, segment.z);
        }
        for entity in self.state.pool.iter() {
            scene.set_transform(entity.handle, entity.pos, entity.yaw);
        }
    }

    fn push_hud(&self, ui: &mut impl UiSink) {
        ui.update_distance(self.state.distance);
        ui.update_fuel(self.state.fuel.level());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{EndReason, Entity, SegmentKind};

    /// Everything the driver asked of the outside world, in order
    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Add(EntityHandle),
        Remove(EntityHandle),
        Render,
        Distance(f64),
        Fuel(f64),
        ShowRestart,
        ShowLoading,
        HideLoading,
        EngineOn,
        EngineOff,
        Cue(SoundCue),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
        transforms: Vec<(EntityHandle, Vec3)>,
        segments: Vec<(SegmentKind, f32)>,
    }

    impl Recorder {
        fn count(&self, call: &Call) -> usize {
            self.calls.iter().filter(|c| *c == call).count()
        }
    }

    impl SceneSurface for Recorder {
        fn add_entity(&mut self, handle: EntityHandle, _scale: Vec3) {
            self.calls.push(Call::Add(handle));
        }
        fn remove_entity(&mut self, handle: EntityHandle) {
            self.calls.push(Call::Remove(handle));
        }
        fn set_transform(&mut self, handle: EntityHandle, pos: Vec3, _yaw: f32) {
            self.transforms.push((handle, pos));
        }
        fn set_segment_z(&mut self, segment: SegmentKind, z: f32) {
            self.segments.push((segment, z));
        }
        fn render_frame(&mut self) {
            self.calls.push(Call::Render);
        }
    }

    impl UiSink for Recorder {
        fn update_distance(&mut self, distance: f64) {
            self.calls.push(Call::Distance(distance));
        }
        fn update_fuel(&mut self, percent: f64) {
            self.calls.push(Call::Fuel(percent));
        }
        fn show_restart(&mut self) {
            self.calls.push(Call::ShowRestart);
        }
        fn show_loading(&mut self) {
            self.calls.push(Call::ShowLoading);
        }
        fn hide_loading(&mut self) {
            self.calls.push(Call::HideLoading);
        }
    }

    impl AudioSink for Recorder {
        fn start_engine(&mut self) {
            self.calls.push(Call::EngineOn);
        }
        fn stop_engine(&mut self) {
            self.calls.push(Call::EngineOff);
        }
        fn play(&mut self, cue: SoundCue) {
            self.calls.push(Call::Cue(cue));
        }
    }

    /// Scene, HUD and audio recorded separately so each can be borrowed
    #[derive(Default)]
    struct Host {
        scene: Recorder,
        ui: Recorder,
        audio: Recorder,
    }

    impl Host {
        fn frame(&mut self, driver: &mut FrameDriver, now_ms: f64) -> FrameReport {
            driver.frame(now_ms, &mut self.scene, &mut self.ui, &mut self.audio)
        }
    }

    const CAR: EntityHandle = EntityHandle(1000);

    fn started() -> (FrameDriver, Host) {
        let mut driver = FrameDriver::new(42, Tuning::default());
        let mut host = Host::default();
        driver
            .begin(Ok(CAR), &mut host.scene, &mut host.ui, &mut host.audio)
            .expect("begin");
        (driver, host)
    }

    fn obstacle_on_car(handle: u32) -> Entity {
        Entity {
            handle: EntityHandle(handle),
            kind: EntityKind::Obstacle,
            variant: None,
            pos: Vec3::new(0.0, 0.0, -0.6),
            yaw: 0.0,
            rotation_speed: 0.0,
            scale: Vec3::ONE,
        }
    }

    #[test]
    fn test_spawn_timers_fire_on_interval() {
        let mut timers = SpawnTimers::new(&Tuning::default());
        let mut obstacles = 0;
        let mut tanks = 0;
        let mut now = 0.0;
        // 4 seconds of 16 ms frames
        for _ in 0..=250 {
            for kind in timers.advance(now, GamePhase::Playing) {
                match kind {
                    EntityKind::Obstacle => obstacles += 1,
                    EntityKind::FuelTank => tanks += 1,
                }
            }
            now += 16.0;
        }
        assert_eq!(obstacles, 2);
        assert_eq!(tanks, 1);
    }

    #[test]
    fn test_spawn_timers_respect_phase_and_cancel() {
        let mut timers = SpawnTimers::new(&Tuning::default());
        timers.advance(0.0, GamePhase::NotStarted);
        assert!(timers.advance(5000.0, GamePhase::NotStarted).is_empty());

        let mut now = 5000.0;
        for _ in 0..200 {
            now += 16.0;
            timers.advance(now, GamePhase::Playing);
        }
        timers.cancel();
        assert!(timers.is_cancelled());
        for _ in 0..1000 {
            now += 16.0;
            assert!(timers.advance(now, GamePhase::Playing).is_empty());
        }
    }

    #[test]
    fn test_spawn_timers_cap_long_gaps() {
        let mut timers = SpawnTimers::new(&Tuning::default());
        timers.advance(0.0, GamePhase::Playing);
        // A minute in a background tab is worth a single frame gap
        assert!(timers.advance(60_000.0, GamePhase::Playing).is_empty());
    }

    #[test]
    fn test_begin_failure_hides_loading_and_never_starts() {
        let mut driver = FrameDriver::new(1, Tuning::default());
        let mut host = Host::default();
        let err = AssetLoadError::new(crate::consts::CAR_MODEL_PATH, "network error");
        let result = driver.begin(Err(err), &mut host.scene, &mut host.ui, &mut host.audio);

        assert!(matches!(result, Err(InitError::CarModel(_))));
        assert_eq!(host.ui.calls, vec![Call::HideLoading]);
        assert!(host.audio.calls.is_empty());
        assert_eq!(driver.state().phase, GamePhase::NotStarted);
        assert_eq!(host.frame(&mut driver, 16.0).status, FrameStatus::Stop);
    }

    #[test]
    fn test_begin_starts_engine_and_places_car() {
        let (driver, host) = started();
        assert_eq!(driver.state().phase, GamePhase::Playing);
        assert!(driver.is_scheduled());
        assert_eq!(host.audio.calls, vec![Call::EngineOn]);
        assert_eq!(host.scene.calls, vec![Call::Add(CAR)]);
        assert_eq!(host.ui.calls[0], Call::HideLoading);
        assert!(host.scene.transforms.contains(&(CAR, Vec3::ZERO)));
    }

    #[test]
    fn test_frames_push_hud_and_render() {
        let (mut driver, mut host) = started();
        host.ui.calls.clear();
        driver.input_mut().move_left = true;

        assert_eq!(host.frame(&mut driver, 0.0).status, FrameStatus::Continue);
        assert_eq!(host.frame(&mut driver, 16.0).status, FrameStatus::Continue);

        assert_eq!(host.scene.count(&Call::Render), 2);
        assert!(host.ui.calls.contains(&Call::Distance(driver.state().distance)));
        assert!(host.ui.calls.contains(&Call::Fuel(driver.state().fuel.level())));
        assert!((driver.state().car.pos.x - -0.3).abs() < 1e-5);
        assert_eq!(host.scene.segments.len(), 9);
    }

    #[test]
    fn test_frames_issue_spawns_and_install_them() {
        let (mut driver, mut host) = started();
        let mut requests = Vec::new();
        let mut now = 0.0;
        for _ in 0..=125 {
            requests.extend(host.frame(&mut driver, now).spawns);
            now += 16.0;
        }
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].kind, EntityKind::Obstacle);

        let resolution = driver.resolve_spawn(requests[0].ticket, Ok(EntityHandle(7)), &mut host.scene);
        assert_eq!(resolution, SpawnResolution::Installed(EntityHandle(7)));
        assert_eq!(host.scene.count(&Call::Add(EntityHandle(7))), 1);
        assert_eq!(driver.state().pool.len(), 1);
    }

    #[test]
    fn test_failed_spawn_leaves_loop_running() {
        let (mut driver, mut host) = started();
        let request = driver.state.request_spawn(EntityKind::FuelTank).expect("spawn");
        let err = AssetLoadError::new(request.model_path.clone(), "decode failed");
        let resolution = driver.resolve_spawn(request.ticket, Err(err), &mut host.scene);
        assert!(matches!(resolution, SpawnResolution::Failed(_)));
        assert_eq!(host.frame(&mut driver, 0.0).status, FrameStatus::Continue);
    }

    #[test]
    fn test_crash_stops_the_loop() {
        let (mut driver, mut host) = started();
        let pending = driver.state.request_spawn(EntityKind::Obstacle).expect("spawn");
        driver.state.pool.insert(obstacle_on_car(5));

        let report = host.frame(&mut driver, 0.0);
        assert_eq!(report.status, FrameStatus::Stop);
        assert_eq!(driver.state().end_reason, Some(EndReason::Crashed));
        assert_eq!(
            host.audio.calls,
            vec![Call::EngineOn, Call::Cue(SoundCue::Crash), Call::EngineOff]
        );
        assert_eq!(host.audio.count(&Call::Cue(SoundCue::Crash)), 1);
        assert_eq!(host.audio.count(&Call::EngineOff), 1);
        assert_eq!(host.ui.count(&Call::ShowRestart), 1);

        // No further ticks once stopped
        let distance = driver.state().distance;
        assert_eq!(host.frame(&mut driver, 16.0).status, FrameStatus::Stop);
        assert_eq!(driver.state().distance, distance);

        // A model arriving late is released, not installed
        let resolution = driver.resolve_spawn(pending.ticket, Ok(EntityHandle(8)), &mut host.scene);
        assert_eq!(resolution, SpawnResolution::Discarded(EntityHandle(8)));
        assert_eq!(host.scene.count(&Call::Remove(EntityHandle(8))), 1);
        assert_eq!(host.scene.count(&Call::Add(EntityHandle(8))), 0);
    }

    #[test]
    fn test_collecting_fuel_removes_tank_and_plays_cue() {
        let (mut driver, mut host) = started();
        let mut tank = obstacle_on_car(9);
        tank.kind = EntityKind::FuelTank;
        driver.state.pool.insert(tank);

        assert_eq!(host.frame(&mut driver, 0.0).status, FrameStatus::Continue);
        assert_eq!(host.scene.count(&Call::Remove(EntityHandle(9))), 1);
        assert_eq!(host.audio.count(&Call::Cue(SoundCue::CollectFuel)), 1);
        assert_eq!(driver.state().fuel.level(), 100.0);
    }

    #[test]
    fn test_restart_builds_fresh_run() {
        let (mut driver, mut host) = started();
        let request = driver.state.request_spawn(EntityKind::FuelTank).expect("spawn");
        driver.resolve_spawn(request.ticket, Ok(EntityHandle(3)), &mut host.scene);
        driver.state.pool.insert(obstacle_on_car(5));
        host.frame(&mut driver, 0.0);
        assert_eq!(driver.state().phase, GamePhase::GameOver);

        driver
            .restart(7, &mut host.scene, &mut host.ui, &mut host.audio)
            .expect("restart");
        assert_eq!(driver.state().phase, GamePhase::Playing);
        assert_eq!(driver.state().seed, 7);
        assert_eq!(driver.state().distance, 0.0);
        assert_eq!(driver.state().fuel.level(), 100.0);
        assert!(driver.state().pool.is_empty());
        assert_eq!(driver.state().car.handle, Some(CAR));
        assert_eq!(host.scene.count(&Call::Remove(EntityHandle(3))), 1);
        assert_eq!(host.scene.count(&Call::Remove(EntityHandle(5))), 1);
        assert_eq!(host.audio.count(&Call::EngineOn), 2);
        assert_eq!(host.frame(&mut driver, 16.0).status, FrameStatus::Continue);
    }

    #[test]
    fn test_restart_discards_loads_from_previous_run() {
        let (mut driver, mut host) = started();
        let stale = driver.state.request_spawn(EntityKind::FuelTank).expect("spawn");
        driver.state.pool.insert(obstacle_on_car(5));
        host.frame(&mut driver, 0.0);
        assert_eq!(driver.state().phase, GamePhase::GameOver);

        driver
            .restart(7, &mut host.scene, &mut host.ui, &mut host.audio)
            .expect("restart");
        let fresh = driver.state.request_spawn(EntityKind::Obstacle).expect("spawn");
        assert_ne!(stale.ticket, fresh.ticket);

        let late = driver.resolve_spawn(stale.ticket, Ok(EntityHandle(77)), &mut host.scene);
        assert_eq!(late, SpawnResolution::Discarded(EntityHandle(77)));
        assert!(driver.state().pool.is_empty());
        assert_eq!(host.scene.count(&Call::Remove(EntityHandle(77))), 1);
        assert_eq!(host.scene.count(&Call::Add(EntityHandle(77))), 0);

        let own = driver.resolve_spawn(fresh.ticket, Ok(EntityHandle(88)), &mut host.scene);
        assert_eq!(own, SpawnResolution::Installed(EntityHandle(88)));
        let live: Vec<_> = driver.state().pool.iter().map(|e| (e.handle, e.kind)).collect();
        assert_eq!(live, vec![(EntityHandle(88), EntityKind::Obstacle)]);
    }

    #[test]
    fn test_second_begin_leaves_scene_alone() {
        let (mut driver, mut host) = started();
        host.scene.calls.clear();
        host.ui.calls.clear();

        let again = driver.begin(Ok(EntityHandle(50)), &mut host.scene, &mut host.ui, &mut host.audio);
        assert!(matches!(again, Err(InitError::AlreadyStarted)));
        assert_eq!(host.scene.calls, vec![Call::Remove(EntityHandle(50))]);
        assert!(host.ui.calls.is_empty());
        assert_eq!(driver.state().car.handle, Some(CAR));
        assert_eq!(host.audio.count(&Call::EngineOn), 1);
    }

    #[test]
    fn test_restart_without_car_fails() {
        let mut driver = FrameDriver::new(1, Tuning::default());
        let mut host = Host::default();
        assert!(matches!(
            driver.restart(2, &mut host.scene, &mut host.ui, &mut host.audio),
            Err(InitError::CarModel(_))
        ));
    }
}
