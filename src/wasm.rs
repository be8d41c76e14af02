//! Browser bindings
//!
//! A JS renderer owns the canvas and the input listeners. It latches input
//! into a [`WasmGame`], calls `frame` once per animation frame, and draws
//! from `snapshot_json` / `events_json`.

use wasm_bindgen::prelude::*;

use crate::audio::AudioManager;
use crate::persistence::LocalStorage;
use crate::progression::{self, ShopItem};
use crate::session::Session;
use crate::settings::Settings;
use crate::sim::{GameEvent, TickInput};
use crate::tuning::{Tuning, Variant};

#[wasm_bindgen(start)]
pub fn wasm_start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // Already initialized by an earlier module instance
        return;
    }
    log::info!("Neon Breaker core loaded");
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen]
pub struct WasmGame {
    session: Session<LocalStorage>,
    settings: Settings,
    audio: AudioManager,
    input: TickInput,
    /// Page focus, for `mute_on_blur`
    focused: bool,
    last_time: f64,
    events: Vec<GameEvent>,
}

#[wasm_bindgen]
impl WasmGame {
    /// Start a session. `variant` overrides the saved preference.
    #[wasm_bindgen(constructor)]
    pub fn new(variant: Option<String>) -> WasmGame {
        let storage = LocalStorage;
        let mut settings = Settings::load(&storage);
        if let Some(v) = variant.as_deref().and_then(Variant::from_str) {
            settings.variant = v;
        }

        let seed = js_sys::Date::now() as u64;
        log::info!("Game initialized with seed: {}", seed);

        let mut audio = AudioManager::new();
        audio.set_volume(settings.volume_for_focus(true));

        WasmGame {
            session: Session::new(Tuning::preset(settings.variant), seed, storage),
            settings,
            audio,
            input: TickInput::default(),
            focused: true,
            last_time: 0.0,
            events: Vec::new(),
        }
    }

    /// Advance by the time since the last frame (`time` in ms)
    pub fn frame(&mut self, time: f64) {
        let dt = if self.last_time > 0.0 {
            ((time - self.last_time) / 1000.0) as f32
        } else {
            crate::consts::SIM_DT
        };
        self.last_time = time;

        // One-shot inputs stay latched until a fixed step consumes them
        self.session.update(dt, &mut self.input);

        self.events = self.session.drain_events();
        self.audio.play_events(&self.events);
    }

    pub fn set_paddle_target(&mut self, x: f32) {
        self.input.target_x = Some(x);
    }

    /// Keyboard direction; switches the paddle back to keyboard drive
    pub fn set_move(&mut self, direction: f32) {
        self.input.target_x = None;
        self.input.move_dir = direction.clamp(-1.0, 1.0);
    }

    /// Launch (or restart after game over). Doubles as the audio unlock gesture.
    pub fn launch(&mut self) {
        self.audio.resume();
        self.input.launch = true;
    }

    pub fn fire(&mut self) {
        self.input.fire = true;
    }

    pub fn set_idle_mode(&mut self, on: bool) {
        self.input.idle_mode = on;
        log::info!("Idle mode: {}", on);
    }

    /// Pick the offered upgrade at `index`
    pub fn choose_upgrade(&mut self, index: usize) -> bool {
        let Some(kind) = self.session.state().offered.get(index).copied() else {
            return false;
        };
        self.session.choose_upgrade(kind)
    }

    /// Name and description of each current offer, in `choose_upgrade` index order
    pub fn offers_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&progression::offer_cards(&self.session.state().offered)).map_err(js_err)
    }

    pub fn continue_level(&mut self) -> bool {
        self.session.continue_level()
    }

    /// Buy `"attack"` or `"speed"`; returns the new level
    pub fn purchase(&mut self, item: &str) -> Result<u32, JsValue> {
        let item = match item.to_lowercase().as_str() {
            "attack" => ShopItem::Attack,
            "speed" => ShopItem::Speed,
            other => return Err(JsValue::from_str(&format!("Unknown shop item: {}", other))),
        };
        self.session.purchase(item).map_err(js_err)
    }

    pub fn gold(&self) -> u64 {
        self.session.progress().gold
    }

    pub fn high_scores(&self) -> Vec<u64> {
        self.session.high_scores().entries.clone()
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.settings.set_master_volume(volume);
        self.save_settings();
    }

    pub fn toggle_mute(&mut self) -> bool {
        let muted = self.settings.toggle_mute();
        self.save_settings();
        muted
    }

    /// Window focus/blur hook
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
        self.audio.set_volume(self.settings.volume_for_focus(focused));
    }

    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.session.snapshot()).map_err(js_err)
    }

    /// Events from the last `frame` call
    pub fn events_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.events).map_err(js_err)
    }
}

impl WasmGame {
    fn save_settings(&mut self) {
        self.audio.set_volume(self.settings.volume_for_focus(self.focused));
        let mut storage = LocalStorage;
        if let Err(e) = self.settings.save(&mut storage) {
            log::warn!("Failed to save settings: {}", e);
        }
    }
}
