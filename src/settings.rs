//! Game settings and preferences
//!
//! Persisted separately from game saves, under their own storage key.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::persistence::{SETTINGS_KEY, SaveStore, load_json, save_json};
use crate::sim::state::SimConfig;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === World ===
    /// Tile edge in pixels
    pub tile_size: u32,
    /// Viewport size in pixels
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Ticks the movement lock is held after a step
    pub move_cooldown_ticks: u32,
    /// Distinct item types the inventory holds
    pub inventory_slots: usize,
    /// Area a new game starts in
    pub start_map: String,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === HUD ===
    pub show_quest_hud: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            move_cooldown_ticks: MOVE_COOLDOWN_TICKS,
            inventory_slots: MAX_INVENTORY_SLOTS,
            start_map: START_MAP.to_string(),

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            mute_on_blur: true,

            show_quest_hud: true,
        }
    }
}

impl Settings {
    /// Simulation tunables, with out-of-range values pulled back to sane ones
    pub fn sim_config(&self) -> SimConfig {
        SimConfig {
            tile_size: self.tile_size.max(1),
            viewport_width: self.viewport_width.max(self.tile_size.max(1)),
            viewport_height: self.viewport_height.max(self.tile_size.max(1)),
            move_cooldown_ticks: self.move_cooldown_ticks,
            inventory_slots: self.inventory_slots.max(1),
        }
    }

    /// Volume applied to sound effects (0.0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Stored settings, or defaults when missing or unreadable
    pub fn load<S: SaveStore + ?Sized>(store: &S) -> Self {
        match load_json(store, SETTINGS_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring stored settings: {}", err);
                Self::default()
            }
        }
    }

    pub fn save<S: SaveStore + ?Sized>(&self, store: &S) {
        match save_json(store, SETTINGS_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(err) => log::warn!("Failed to save settings: {}", err),
        }
    }
}
