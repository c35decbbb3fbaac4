//! Cloud Kingdom - a tile-based exploration game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tile map, player, quests, dialog, game loop)
//! - `renderer`: Draw-primitive boundary and frame composition
//! - `persistence`: Save/load of the progress record
//! - `session`: Fixed-timestep host loop with persistence side effects
//! - `settings`: Player-tunable configuration
//! - `highscores`: Fewest-steps leaderboard per area
//! - `audio`: Sound cues for game events

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use session::Session;
pub use settings::Settings;

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz is plenty for tile stepping)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Tile edge in pixels
    pub const TILE_SIZE: u32 = 32;
    /// Default viewport (12 x 10 tiles)
    pub const VIEWPORT_WIDTH: u32 = 12 * TILE_SIZE;
    pub const VIEWPORT_HEIGHT: u32 = 10 * TILE_SIZE;

    /// Movement lock after a step (150 ms at 60 Hz)
    pub const MOVE_COOLDOWN_TICKS: u32 = 9;

    /// Distinct item types the inventory can hold
    pub const MAX_INVENTORY_SLOTS: usize = 12;

    /// Largest map edge accepted by the loader
    pub const MAX_MAP_EDGE: u32 = 40;

    /// First area of a fresh game
    pub const START_MAP: &str = "cloud_meadow";

    /// Item counted as "gems" in the progress record
    pub const GEM_ITEM: &str = "gem";
}

/// One of the four axis-aligned step directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Scan order used for adjacency checks
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Unit tile delta (screen space, y grows downward)
    #[inline]
    pub fn delta(self) -> IVec2 {
        match self {
            Direction::Up => IVec2::new(0, -1),
            Direction::Down => IVec2::new(0, 1),
            Direction::Left => IVec2::new(-1, 0),
            Direction::Right => IVec2::new(1, 0),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Map a keyboard key name (arrows or WASD) to a direction
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_lowercase().as_str() {
            "up" | "w" | "arrowup" => Some(Direction::Up),
            "down" | "s" | "arrowdown" => Some(Direction::Down),
            "left" | "a" | "arrowleft" => Some(Direction::Left),
            "right" | "d" | "arrowright" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// CSS hex form (`#rrggbb`) for the canvas backend
    pub fn to_css(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}
