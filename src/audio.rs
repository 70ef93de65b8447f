//! Audio playback using HTML audio elements
//!
//! One looping engine track plus one-shot cues. Playback failures (autoplay
//! policy, missing files) are logged and otherwise ignored.

use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::HtmlAudioElement;

use crate::platform::{AudioSink, SoundCue};
use crate::settings::Settings;

const ENGINE_PATH: &str = "audio/car.mp3";
const CRASH_PATH: &str = "audio/car-crash.mp3";
const COLLECT_FUEL_PATH: &str = "audio/collect-fuel.mp3";

/// Audio manager for the game
pub struct AudioManager {
    engine: Option<HtmlAudioElement>,
    crash: Option<HtmlAudioElement>,
    collect_fuel: Option<HtmlAudioElement>,
    engine_volume: f64,
    sfx_volume: f64,
}

impl AudioManager {
    pub fn new(settings: &Settings) -> Self {
        let engine = load(ENGINE_PATH);
        if let Some(engine) = &engine {
            engine.set_loop(true);
        }
        Self {
            engine,
            crash: load(CRASH_PATH),
            collect_fuel: load(COLLECT_FUEL_PATH),
            engine_volume: settings.effective_engine_volume() as f64,
            sfx_volume: settings.effective_sfx_volume() as f64,
        }
    }
}

fn load(path: &str) -> Option<HtmlAudioElement> {
    match HtmlAudioElement::new_with_src(path) {
        Ok(el) => Some(el),
        Err(e) => {
            log::warn!("Failed to create audio element for {}: {:?}", path, e);
            None
        }
    }
}

fn play(el: &HtmlAudioElement, volume: f64) {
    el.set_volume(volume);
    match el.play() {
        // Autoplay blocks arrive as a rejected promise
        Ok(promise) => spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("Audio playback refused: {:?}", e);
            }
        }),
        Err(e) => log::warn!("Audio playback failed: {:?}", e),
    }
}

impl AudioSink for AudioManager {
    fn start_engine(&mut self) {
        if let Some(engine) = &self.engine {
            play(engine, self.engine_volume);
        }
    }

    fn stop_engine(&mut self) {
        if let Some(engine) = &self.engine {
            let _ = engine.pause();
        }
    }

    fn play(&mut self, cue: SoundCue) {
        let el = match cue {
            SoundCue::Crash => &self.crash,
            SoundCue::CollectFuel => &self.collect_fuel,
        };
        if let Some(el) = el {
            el.set_current_time(0.0);
            play(el, self.sfx_volume);
        }
    }
}
