//! Player preferences
//!
//! Persisted separately from scores and progress, under its own key.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistError, Storage};
use crate::tuning::Variant;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Which rule set a new session starts with
    pub variant: Variant,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    /// Silence everything
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            variant: Variant::Neon,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            mute_on_blur: true,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "neonBreakerSettings";

    /// Gain applied to every sound effect
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Gain while the page is `focused` or not; blurred pages go silent
    /// when `mute_on_blur` is set
    pub fn volume_for_focus(&self, focused: bool) -> f32 {
        if !focused && self.mute_on_blur {
            0.0
        } else {
            self.effective_volume()
        }
    }

    /// Set master volume, clamped to 0..=1
    pub fn set_master_volume(&mut self, volume: f32) {
        self.master_volume = volume.clamp(0.0, 1.0);
    }

    pub fn toggle_mute(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Load settings, falling back to defaults
    pub fn load(storage: &dyn Storage) -> Self {
        let mut settings: Self = persistence::load_or_default(storage, Self::STORAGE_KEY);
        settings.master_volume = settings.master_volume.clamp(0.0, 1.0);
        settings.sfx_volume = settings.sfx_volume.clamp(0.0, 1.0);
        settings
    }

    pub fn save(&self, storage: &mut dyn Storage) -> Result<(), PersistError> {
        persistence::save_json(storage, Self::STORAGE_KEY, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_effective_volume() {
        let mut settings = Settings::default();
        assert!((settings.effective_volume() - 0.8).abs() < f32::EPSILON);
        settings.sfx_volume = 0.5;
        assert!((settings.effective_volume() - 0.4).abs() < f32::EPSILON);
        assert!(settings.toggle_mute());
        assert_eq!(settings.effective_volume(), 0.0);
    }

    #[test]
    fn test_round_trip_and_partial_blob() {
        let mut storage = MemoryStorage::new();
        let settings = Settings {
            variant: Variant::Classic,
            muted: true,
            ..Default::default()
        };
        settings.save(&mut storage).unwrap();
        assert_eq!(Settings::load(&storage), settings);

        storage.insert(Settings::STORAGE_KEY, r#"{"master_volume":3.0}"#);
        let loaded = Settings::load(&storage);
        assert_eq!(loaded.master_volume, 1.0);
        assert_eq!(loaded.variant, Variant::Neon);
        assert!(loaded.mute_on_blur);
    }

    #[test]
    fn test_blur_mutes_only_when_enabled() {
        let mut settings = Settings::default();
        assert_eq!(settings.volume_for_focus(false), 0.0);
        assert_eq!(settings.volume_for_focus(true), settings.effective_volume());

        settings.mute_on_blur = false;
        assert_eq!(settings.volume_for_focus(false), settings.effective_volume());

        settings.muted = true;
        assert_eq!(settings.volume_for_focus(true), 0.0);
    }

    #[test]
    fn test_set_master_volume_clamps() {
        let mut settings = Settings::default();
        settings.set_master_volume(-2.0);
        assert_eq!(settings.master_volume, 0.0);
    }
}
