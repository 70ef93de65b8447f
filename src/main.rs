//! Fuel Rush entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{JsFuture, spawn_local};
    use web_sys::{HtmlElement, KeyboardEvent, MouseEvent, TouchEvent};

    use fuel_rush::audio::AudioManager;
    use fuel_rush::consts::CAR_MODEL_PATH;
    use fuel_rush::platform::{EntityHandle, SceneSurface, UiSink};
    use fuel_rush::settings::JoystickSize;
    use fuel_rush::sim::{SegmentKind, SpawnRequest};
    use fuel_rush::{AssetLoadError, FrameDriver, FrameStatus, Settings, Tuning, ui};

    // Bridge to the three.js scene owned by the page (window.fuelRushScene)
    #[wasm_bindgen(inline_js = "
        function host() {
            const h = window.fuelRushScene;
            if (!h) { throw new Error('window.fuelRushScene is not set up'); }
            return h;
        }
        export function load_model(path) { return host().loadModel(path); }
        export function scene_add(handle, sx, sy, sz) { host().add(handle, sx, sy, sz); }
        export function scene_remove(handle) { host().remove(handle); }
        export function scene_transform(handle, x, y, z, yaw) { host().transform(handle, x, y, z, yaw); }
        export function scene_segment(name, z) { host().segment(name, z); }
        export function scene_render() { host().render(); }
    ")]
    extern "C" {
        fn load_model(path: &str) -> js_sys::Promise;
        fn scene_add(handle: u32, sx: f32, sy: f32, sz: f32);
        fn scene_remove(handle: u32);
        fn scene_transform(handle: u32, x: f32, y: f32, z: f32, yaw: f32);
        fn scene_segment(name: &str, z: f32);
        fn scene_render();
    }

    /// Scene surface backed by the page's three.js bridge
    struct WebScene;

    impl SceneSurface for WebScene {
        fn add_entity(&mut self, handle: EntityHandle, scale: glam::Vec3) {
            scene_add(handle.0, scale.x, scale.y, scale.z);
        }

        fn remove_entity(&mut self, handle: EntityHandle) {
            scene_remove(handle.0);
        }

        fn set_transform(&mut self, handle: EntityHandle, pos: glam::Vec3, yaw: f32) {
            scene_transform(handle.0, pos.x, pos.y, pos.z, yaw);
        }

        fn set_segment_z(&mut self, segment: SegmentKind, z: f32) {
            let name = match segment {
                SegmentKind::Road => "road",
                SegmentKind::LeftGrass => "leftGrass",
                SegmentKind::RightGrass => "rightGrass",
            };
            scene_segment(name, z);
        }

        fn render_frame(&mut self) {
            scene_render();
        }
    }

    /// HUD widgets in the DOM
    struct DomUi {
        document: web_sys::Document,
    }

    impl DomUi {
        fn set_display(&self, id: &str, display: &str) {
            if let Some(el) = self
                .document
                .get_element_by_id(id)
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let _ = el.style().set_property("display", display);
            }
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }
    }

    impl UiSink for DomUi {
        fn update_distance(&mut self, distance: f64) {
            self.set_text("distance-display", &ui::distance_text(distance));
        }

        fn update_fuel(&mut self, percent: f64) {
            self.set_text("fuel-display", &ui::fuel_text(percent));
        }

        fn show_restart(&mut self) {
            self.set_display("restart-button", "block");
        }

        fn show_loading(&mut self) {
            self.set_display("loading-container", "flex");
        }

        fn hide_loading(&mut self) {
            self.set_display("loading-container", "none");
        }
    }

    /// Game instance holding all state
    struct Game {
        driver: FrameDriver,
        scene: WebScene,
        ui: DomUi,
        audio: AudioManager,
        settings: Settings,
        /// Joystick press point while dragging
        drag_origin: Option<(f32, f32)>,
    }

    impl Game {
        fn new(seed: u64, document: web_sys::Document) -> Self {
            let settings = Settings::load();
            Self {
                driver: FrameDriver::new(seed, Tuning::default()),
                scene: WebScene,
                ui: DomUi { document },
                audio: AudioManager::new(&settings),
                settings,
                drag_origin: None,
            }
        }

        fn drag(&mut self, x: f32, y: f32) {
            if let Some((ox, oy)) = self.drag_origin {
                let threshold = self.settings.joystick_threshold;
                self.driver.input_mut().apply_joystick(x - ox, y - oy, threshold);
            }
        }

        fn release(&mut self) {
            self.drag_origin = None;
            self.driver.input_mut().release_all();
        }
    }

    async fn load(path: &str) -> Result<EntityHandle, AssetLoadError> {
        let value = JsFuture::from(load_model(path))
            .await
            .map_err(|e| AssetLoadError::new(path, format!("{:?}", e)))?;
        value
            .as_f64()
            .map(|h| EntityHandle(h as u32))
            .ok_or_else(|| AssetLoadError::new(path, "loader returned no handle"))
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Fuel Rush starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, document.clone())));
        log::info!("Game initialized with seed: {}", seed);

        {
            let g = game.borrow();
            g.ui.set_display("start-button", "block");
            g.ui.set_display("loading-container", "none");
            g.ui.set_display("joystick", "none");
        }

        setup_start_button(game.clone());
        setup_restart_button(game.clone());
        setup_keyboard(game.clone());
        setup_joystick(game);
    }

    fn setup_start_button(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        let Some(btn) = document.get_element_by_id("start-button") else {
            log::error!("No start button in page");
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            {
                let mut g = game.borrow_mut();
                if g.driver.is_scheduled() {
                    return;
                }
                g.ui.set_display("start-button", "none");
                g.ui.show_loading();
            }

            let game = game.clone();
            spawn_local(async move {
                let car = load(CAR_MODEL_PATH).await;
                let started = {
                    let mut g = game.borrow_mut();
                    let Game {
                        driver,
                        scene,
                        ui,
                        audio,
                        settings,
                        ..
                    } = &mut *g;
                    let started = driver.begin(car, scene, ui, audio);
                    if started.is_ok() && settings.show_joystick {
                        size_joystick(&ui.document);
                        ui.set_display("joystick", "block");
                    }
                    started
                };
                match started {
                    Ok(()) => request_animation_frame(game),
                    Err(e) => log::error!("Game did not start: {}", e),
                }
            });
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        let Some(btn) = document.get_element_by_id("restart-button") else {
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let seed = js_sys::Date::now() as u64;
            let restarted = {
                let mut g = game.borrow_mut();
                if g.driver.is_scheduled() {
                    return;
                }
                let Game {
                    driver,
                    scene,
                    ui,
                    audio,
                    ..
                } = &mut *g;
                let restarted = driver.restart(seed, scene, ui, audio);
                ui.set_display("restart-button", "none");
                restarted
            };
            match restarted {
                Ok(()) => request_animation_frame(game.clone()),
                Err(e) => log::error!("Restart failed: {}", e),
            }
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        for (event_name, pressed) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut()
                    .driver
                    .input_mut()
                    .apply_key(&event.code(), pressed);
            });
            let _ = document
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Fit the stick to the viewport width
    fn size_joystick(document: &web_sys::Document) {
        let width = web_sys::window()
            .and_then(|w| w.inner_width().ok())
            .and_then(|w| w.as_f64())
            .unwrap_or(1024.0);
        let size = JoystickSize::for_viewport(width);
        let Some(stick) = document
            .get_element_by_id("joystick")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
        else {
            return;
        };
        let diameter = format!("{}px", size.diameter_px());
        let style = stick.style();
        let _ = style.set_property("width", &diameter);
        let _ = style.set_property("height", &diameter);
        log::debug!("Joystick size: {}", size.as_str());
    }

    fn setup_joystick(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();
        let Some(stick) = document.get_element_by_id("joystick") else {
            log::warn!("No joystick element, keyboard only");
            return;
        };

        {
            let document = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                size_joystick(&document);
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Press on the stick starts a drag
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut().drag_origin =
                    Some((event.client_x() as f32, event.client_y() as f32));
            });
            let _ = stick
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut().drag_origin =
                        Some((touch.client_x() as f32, touch.client_y() as f32));
                }
            });
            let _ = stick
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Drags and releases are tracked document-wide
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .drag(event.client_x() as f32, event.client_y() as f32);
            });
            let _ = document
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut()
                        .drag(touch.client_x() as f32, touch.client_y() as f32);
                }
            });
            let _ = document
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        for event_name in ["mouseup", "touchend"] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                if g.drag_origin.is_some() {
                    g.release();
                }
            });
            let _ = document
                .add_event_listener_with_callback(event_name, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let report = {
            let mut g = game.borrow_mut();
            let Game {
                driver,
                scene,
                ui,
                audio,
                ..
            } = &mut *g;
            driver.frame(time, scene, ui, audio)
        };

        for request in report.spawns {
            spawn(game.clone(), request);
        }

        match report.status {
            FrameStatus::Continue => request_animation_frame(game),
            FrameStatus::Stop => log::info!("Game Over!"),
        }
    }

    /// Load a spawn's model off the frame path and hand it back when ready
    fn spawn(game: Rc<RefCell<Game>>, request: SpawnRequest) {
        spawn_local(async move {
            let result = load(&request.model_path).await;
            let mut g = game.borrow_mut();
            let Game { driver, scene, .. } = &mut *g;
            driver.resolve_spawn(request.ticket, result, scene);
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    log::info!("Fuel Rush (native) starting...");
    log::info!("Native mode runs a headless autopilot demo; the playable build targets wasm32");

    let tuning = match std::env::args().nth(1) {
        Some(path) => fuel_rush::Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => fuel_rush::Tuning::default(),
    };
    headless::run(0x5eed, tuning)?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glam::Vec3;

    use fuel_rush::platform::{AudioSink, EntityHandle, SceneSurface, SoundCue, UiSink};
    use fuel_rush::sim::{EntityKind, SegmentKind};
    use fuel_rush::{FrameDriver, FrameStatus, InitError, Tuning};

    /// Stand-in for every collaborator: logs instead of drawing or playing
    #[derive(Default)]
    struct Headless {
        next_handle: u32,
        collected: u32,
    }

    impl Headless {
        /// Loader that always succeeds immediately
        fn load(&mut self) -> EntityHandle {
            self.next_handle += 1;
            EntityHandle(self.next_handle)
        }
    }

    impl SceneSurface for Headless {
        fn add_entity(&mut self, handle: EntityHandle, _scale: Vec3) {
            log::trace!("add {:?}", handle);
        }
        fn remove_entity(&mut self, handle: EntityHandle) {
            log::trace!("remove {:?}", handle);
        }
        fn set_transform(&mut self, _handle: EntityHandle, _pos: Vec3, _yaw: f32) {}
        fn set_segment_z(&mut self, _segment: SegmentKind, _z: f32) {}
        fn render_frame(&mut self) {}
    }

    impl UiSink for Headless {
        fn update_distance(&mut self, _distance: f64) {}
        fn update_fuel(&mut self, _percent: f64) {}
        fn show_restart(&mut self) {
            log::info!("(restart button shown)");
        }
        fn show_loading(&mut self) {}
        fn hide_loading(&mut self) {}
    }

    impl AudioSink for Headless {
        fn start_engine(&mut self) {}
        fn stop_engine(&mut self) {}
        fn play(&mut self, cue: SoundCue) {
            if cue == SoundCue::CollectFuel {
                self.collected += 1;
            }
        }
    }

    /// Drive a full run with a simple autopilot: chase fuel, dodge obstacles
    pub fn run(seed: u64, tuning: Tuning) -> Result<(), InitError> {
        const FRAME_MS: f64 = 1000.0 / 60.0;
        const MAX_FRAMES: u32 = 60 * 60 * 10;

        let mut driver = FrameDriver::new(seed, tuning);
        let mut scene = Headless::default();
        let mut ui = Headless::default();
        let mut audio = Headless::default();

        let car = scene.load();
        driver.begin(Ok(car), &mut scene, &mut ui, &mut audio)?;

        let mut frames = 0;
        while frames < MAX_FRAMES {
            steer(&mut driver);
            let report = driver.frame(frames as f64 * FRAME_MS, &mut scene, &mut ui, &mut audio);
            for request in report.spawns {
                let handle = scene.load();
                driver.resolve_spawn(request.ticket, Ok(handle), &mut scene);
            }
            frames += 1;
            if report.status == FrameStatus::Stop {
                break;
            }
        }

        let state = driver.state();
        log::info!(
            "Run finished after {} frames: {:?}, distance {:.2}, fuel {:.1}, tanks collected {}",
            frames,
            state.end_reason,
            state.distance,
            state.fuel.level(),
            audio.collected
        );
        Ok(())
    }

    fn steer(driver: &mut FrameDriver) {
        let state = driver.state();
        let car = state.car.pos;
        let lookahead = |kind: EntityKind| {
            state
                .pool
                .iter()
                .filter(move |e| e.kind == kind && e.pos.z < car.z && e.pos.z > car.z - 40.0)
                .map(|e| e.pos.x)
                .collect::<Vec<_>>()
        };
        let threats = lookahead(EntityKind::Obstacle);
        let target = lookahead(EntityKind::FuelTank).first().copied().unwrap_or(car.x);

        let threatened = threats.iter().any(|x| (x - car.x).abs() < 3.5);
        let desired = if threatened {
            // Swerve toward whichever side is further from the nearest threat
            let nearest = threats
                .iter()
                .copied()
                .min_by(|a, b| (a - car.x).abs().total_cmp(&(b - car.x).abs()))
                .unwrap_or(car.x);
            if nearest > car.x || car.x > 5.0 { car.x - 1.0 } else { car.x + 1.0 }
        } else {
            target
        };

        let input = driver.input_mut();
        input.release_all();
        input.move_left = desired < car.x - 0.1;
        input.move_right = desired > car.x + 0.1;
    }
}
