//! JavaScript bindings for the site's presentation layer
//!
//! The page creates one `FizziZone` per visit to the mini-game screen,
//! forwards taps and fall completions, and renders from the JSON events it
//! receives. Calls into `FizziZone` from inside the event callback are
//! allowed, but events they raise are not delivered.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

use crate::arcade::{Arcade, ArcadeEvent};
use crate::audio::{AudioManager, SoundCue};
use crate::persistence::LocalStorage;
use crate::platform::BrowserScheduler;
use crate::settings::Settings;
use crate::sim::{GamePhase, GameSession, GameSnapshot};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) just keeps the existing logger
    let _ = console_log::init_with_level(log::Level::Info);
    log::info!("Fizzi Zone module loaded");
}

#[wasm_bindgen]
pub struct FizziZone {
    arcade: Arcade<BrowserScheduler>,
    audio: Rc<RefCell<AudioManager>>,
    callback: Rc<RefCell<Option<js_sys::Function>>>,
    visibility: Option<Closure<dyn FnMut(web_sys::Event)>>,
}

#[wasm_bindgen]
impl FizziZone {
    /// `tuning_json` may be empty for the default balance
    #[wasm_bindgen(constructor)]
    pub fn new(viewport_width: f32, tuning_json: Option<String>) -> Result<FizziZone, JsValue> {
        let tuning = match tuning_json.as_deref() {
            Some(json) if !json.trim().is_empty() => {
                Tuning::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            _ => Tuning::default(),
        };
        let seed = js_sys::Date::now() as u64;
        let session = GameSession::new(tuning, seed, Box::new(LocalStorage))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        let arcade = Arcade::new(session, BrowserScheduler);
        arcade.set_viewport_width(viewport_width);

        let audio = Rc::new(RefCell::new(AudioManager::new(Settings::load())));
        let callback: Rc<RefCell<Option<js_sys::Function>>> = Rc::default();
        {
            let audio = audio.clone();
            let callback = callback.clone();
            arcade.set_listener(move |event, snapshot| {
                react_with_audio(&audio.borrow(), event);
                let Some(f) = callback.borrow().clone() else {
                    return;
                };
                let payload = to_json(&EventPayload { event, snapshot });
                if let Err(e) = f.call1(&JsValue::NULL, &JsValue::from_str(&payload)) {
                    log::warn!("Event callback threw: {:?}", e);
                }
            });
        }

        let visibility = watch_visibility(audio.clone());

        log::info!("Fizzi Zone ready (seed {})", seed);
        Ok(FizziZone {
            arcade,
            audio,
            callback,
            visibility,
        })
    }

    /// Register `callback(json)`; each call gets `{ event, snapshot }`
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&self, callback: js_sys::Function) {
        *self.callback.borrow_mut() = Some(callback);
    }

    #[wasm_bindgen(js_name = setViewportWidth)]
    pub fn set_viewport_width(&self, width: f32) {
        self.arcade.set_viewport_width(width);
    }

    #[wasm_bindgen(js_name = enterScreen)]
    pub fn enter_screen(&self) -> String {
        to_json(&self.arcade.enter_screen())
    }

    #[wasm_bindgen(js_name = getReady)]
    pub fn get_ready(&self) -> String {
        to_json(&self.arcade.get_ready())
    }

    #[wasm_bindgen(js_name = startRound)]
    pub fn start_round(&self) -> String {
        to_json(&self.arcade.start_round())
    }

    #[wasm_bindgen(js_name = restartRound)]
    pub fn restart_round(&self) -> String {
        let snapshot = self.arcade.restart_round();
        self.audio
            .borrow()
            .update_music(snapshot.phase == GamePhase::Active, true);
        to_json(&snapshot)
    }

    /// Returns the resolution JSON, or `null` if the tap was ignored
    #[wasm_bindgen(js_name = resolveTarget)]
    pub fn resolve_target(&self, id: u32) -> Option<String> {
        self.arcade.resolve_target(id).map(|r| to_json(&r))
    }

    #[wasm_bindgen(js_name = expireTarget)]
    pub fn expire_target(&self, id: u32) -> bool {
        self.arcade.expire_target(id)
    }

    #[wasm_bindgen(js_name = leaveScreen)]
    pub fn leave_screen(&self) -> String {
        let snapshot = self.arcade.leave_screen();
        self.audio.borrow().update_music(false, false);
        to_json(&snapshot)
    }

    pub fn snapshot(&self) -> String {
        to_json(&self.arcade.snapshot())
    }

    /// Game-over figures, or `null` while a round is not over
    pub fn summary(&self) -> Option<String> {
        self.arcade.summary().map(|s| to_json(&s))
    }

    #[wasm_bindgen(js_name = setMusicEnabled)]
    pub fn set_music_enabled(&self, enabled: bool) {
        self.audio.borrow_mut().set_music_enabled(enabled);
    }

    #[wasm_bindgen(js_name = musicEnabled)]
    pub fn music_enabled(&self) -> bool {
        self.audio.borrow().settings().music_enabled
    }
}

impl Drop for FizziZone {
    fn drop(&mut self) {
        let Some(closure) = self.visibility.take() else {
            return;
        };
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            let _ = document.remove_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
        }
    }
}

/// Pause the music while the tab is hidden (when `mute_on_blur` is set)
fn watch_visibility(
    audio: Rc<RefCell<AudioManager>>,
) -> Option<Closure<dyn FnMut(web_sys::Event)>> {
    let document = web_sys::window()?.document()?;
    let doc = document.clone();
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
        let hidden = doc.visibility_state() == web_sys::VisibilityState::Hidden;
        // Skip if the audio manager is busy inside a game event
        if let Ok(audio) = audio.try_borrow() {
            audio.set_page_hidden(hidden);
        }
    });
    if let Err(e) = document
        .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref())
    {
        log::warn!("Failed to watch page visibility: {:?}", e);
        return None;
    }
    Some(closure)
}

#[derive(Serialize)]
struct EventPayload<'a> {
    event: &'a ArcadeEvent,
    snapshot: &'a GameSnapshot,
}

fn react_with_audio(audio: &AudioManager, event: &ArcadeEvent) {
    match event {
        ArcadeEvent::TargetResolved(resolution) => {
            audio.play(SoundCue::for_kind(resolution.target.kind));
        }
        ArcadeEvent::PhaseChanged(phase) => audio.update_music(*phase == GamePhase::Active, false),
        ArcadeEvent::GameOver(_) => audio.update_music(false, false),
        _ => {}
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("Failed to serialize: {}", e);
        "null".to_string()
    })
}
