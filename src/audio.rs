//! Sound cues for game events
//!
//! Clips are served by the site under `/audio/`. Playback is fire-and-forget:
//! a clip that fails to play is logged and skipped.

use crate::sim::TargetKind;

/// Background loop while a round is Active
pub const MUSIC_CLIP: &str = "/audio/game-music.mp3";

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundCue {
    /// Soda can tapped
    CanPop,
    /// Bomb tapped
    BombExplosion,
    /// Diamond tapped
    DiamondCollect,
}

impl SoundCue {
    pub const ALL: [SoundCue; 3] = [
        SoundCue::CanPop,
        SoundCue::BombExplosion,
        SoundCue::DiamondCollect,
    ];

    /// Cue for tapping a target of the given kind
    pub fn for_kind(kind: TargetKind) -> Self {
        if kind.is_hazard() {
            SoundCue::BombExplosion
        } else if kind.is_collectible() {
            SoundCue::CanPop
        } else {
            SoundCue::DiamondCollect
        }
    }

    pub fn clip(&self) -> &'static str {
        match self {
            SoundCue::CanPop => "/audio/can-pop.mp3",
            SoundCue::BombExplosion => "/audio/bomb-explosion.mp3",
            SoundCue::DiamondCollect => "/audio/diamond-collect.mp3",
        }
    }

    /// Clip volume before the player's sliders apply
    pub fn base_volume(&self) -> f32 {
        match self {
            SoundCue::CanPop => 0.5,
            SoundCue::BombExplosion => 0.6,
            SoundCue::DiamondCollect => 0.7,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web_audio::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web_audio {
    use std::cell::Cell;
    use std::collections::HashMap;

    use web_sys::HtmlAudioElement;

    use super::{MUSIC_CLIP, SoundCue};
    use crate::settings::Settings;

    /// Preloaded `<audio>` elements for cues and music
    pub struct AudioManager {
        clips: HashMap<SoundCue, HtmlAudioElement>,
        music: Option<HtmlAudioElement>,
        settings: Settings,
        round_active: Cell<bool>,
        page_hidden: Cell<bool>,
    }

    impl AudioManager {
        pub fn new(settings: Settings) -> Self {
            let mut clips = HashMap::new();
            for cue in SoundCue::ALL {
                match HtmlAudioElement::new_with_src(cue.clip()) {
                    Ok(el) => {
                        clips.insert(cue, el);
                    }
                    Err(e) => log::warn!("Failed to load {}: {:?}", cue.clip(), e),
                }
            }
            let music = match HtmlAudioElement::new_with_src(MUSIC_CLIP) {
                Ok(el) => {
                    el.set_loop(true);
                    Some(el)
                }
                Err(e) => {
                    log::warn!("Failed to load music: {:?}", e);
                    None
                }
            };
            Self {
                clips,
                music,
                settings,
                round_active: Cell::new(false),
                page_hidden: Cell::new(false),
            }
        }

        pub fn settings(&self) -> &Settings {
            &self.settings
        }

        /// Play a cue from the start, cutting off any earlier play
        pub fn play(&self, cue: SoundCue) {
            let Some(el) = self.clips.get(&cue) else {
                return;
            };
            el.set_current_time(0.0);
            el.set_volume(self.settings.effective_sfx_volume(cue.base_volume()) as f64);
            if let Err(e) = el.play() {
                log::debug!("{:?} play failed: {:?}", cue, e);
            }
        }

        /// Start or stop the music loop for the current round state
        pub fn update_music(&self, round_active: bool, restart: bool) {
            self.round_active.set(round_active);
            self.sync_music(restart);
        }

        /// Page visibility changed; pauses the loop if `mute_on_blur` is set
        pub fn set_page_hidden(&self, hidden: bool) {
            self.page_hidden.set(hidden);
            self.sync_music(false);
        }

        fn sync_music(&self, restart: bool) {
            let Some(music) = &self.music else {
                return;
            };
            let play = self
                .settings
                .music_should_play(self.round_active.get(), self.page_hidden.get());
            if play {
                if restart {
                    music.set_current_time(0.0);
                }
                music.set_volume(self.settings.effective_music_volume() as f64);
                if let Err(e) = music.play() {
                    log::debug!("Music play failed: {:?}", e);
                }
            } else {
                let _ = music.pause();
            }
        }

        pub fn set_music_enabled(&mut self, enabled: bool) {
            self.settings.music_enabled = enabled;
            self.settings.save();
            self.sync_music(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_for_kind() {
        for kind in TargetKind::COLLECTIBLES {
            assert_eq!(SoundCue::for_kind(kind), SoundCue::CanPop);
        }
        assert_eq!(SoundCue::for_kind(TargetKind::Bomb), SoundCue::BombExplosion);
        assert_eq!(SoundCue::for_kind(TargetKind::Diamond), SoundCue::DiamondCollect);
    }

    #[test]
    fn test_cue_volumes_in_range() {
        for cue in SoundCue::ALL {
            assert!(cue.base_volume() > 0.0 && cue.base_volume() <= 1.0);
            assert!(cue.clip().starts_with("/audio/"));
        }
    }
}
