//! Player audio preferences
//!
//! Persisted separately from the played flag in LocalStorage.

use serde::{Deserialize, Serialize};

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Background music during a round
    pub music_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Background music volume (0.0 - 1.0)
    pub music_volume: f32,
    /// Sound effects volume multiplier (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Pause music when the tab is hidden
    pub mute_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            music_enabled: true,
            master_volume: 1.0,
            music_volume: 0.5,
            sfx_volume: 1.0,
            mute_on_blur: true,
        }
    }
}

impl Settings {
    /// Whether the music loop should be playing right now
    pub fn music_should_play(&self, round_active: bool, page_hidden: bool) -> bool {
        self.music_enabled && round_active && !(page_hidden && self.mute_on_blur)
    }

    /// Effective music volume (0 when disabled)
    pub fn effective_music_volume(&self) -> f32 {
        if self.music_enabled {
            (self.master_volume * self.music_volume).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Scale a clip's base volume by the master and sfx sliders
    pub fn effective_sfx_volume(&self, base: f32) -> f32 {
        (base * self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
    }

    /// Clamp all sliders into range (after loading untrusted JSON)
    pub fn sanitize(&mut self) {
        for v in [&mut self.master_volume, &mut self.music_volume, &mut self.sfx_volume] {
            *v = if v.is_finite() { (*v).clamp(0.0, 1.0) } else { 1.0 };
        }
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "fizzi_zone_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(mut settings) = serde_json::from_str::<Settings>(&json) {
                    settings.sanitize();
                    log::info!("Loaded settings from LocalStorage");
                    return settings;
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.music_enabled);
        assert!((settings.effective_music_volume() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_music_disabled_is_silent() {
        let settings = Settings {
            music_enabled: false,
            ..Settings::default()
        };
        assert_eq!(settings.effective_music_volume(), 0.0);
        assert!(!settings.music_should_play(true, false));
    }

    #[test]
    fn test_hidden_page_mutes_only_when_asked() {
        let mut settings = Settings::default();
        assert!(settings.music_should_play(true, false));
        assert!(!settings.music_should_play(true, true));
        assert!(!settings.music_should_play(false, false));

        settings.mute_on_blur = false;
        assert!(settings.music_should_play(true, true));
    }

    #[test]
    fn test_partial_json_and_sanitize() {
        let mut settings: Settings =
            serde_json::from_str(r#"{ "music_enabled": false, "sfx_volume": 3.0 }"#).unwrap();
        settings.sanitize();
        assert!(!settings.music_enabled);
        assert_eq!(settings.sfx_volume, 1.0);
        assert_eq!(settings.music_volume, 0.5);
        assert!((settings.effective_sfx_volume(0.6) - 0.6).abs() < 1e-6);
    }
}
