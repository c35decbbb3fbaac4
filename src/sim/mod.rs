//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only (one tick per `TickInput`)
//! - Seeded RNG only (the demo wanderer)
//! - Stable iteration order (entities in map order, quests in list order)
//! - No rendering or platform dependencies

pub mod camera;
pub mod demo;
pub mod dialog;
pub mod inventory;
pub mod map;
pub mod player;
pub mod quest;
pub mod state;
pub mod tick;
pub mod tilemap;
pub mod tiles;

pub use camera::Camera;
pub use demo::Wanderer;
pub use dialog::{DialogError, DialogLine, DialogStep, DialogSystem, OnComplete};
pub use inventory::{Inventory, InventoryError, InventorySnapshot};
pub use map::{Entity, EntityKind, ExitPoint, MapDefinition, MapError, MapLibrary, QuestKind, QuestSpec, TilePoint};
pub use player::{MoveResult, PlayerController};
pub use quest::{Quest, QuestManager};
pub use state::{GameEvent, GamePhase, GameState, SimConfig};
pub use tick::{TickInput, tick};
pub use tilemap::{Interactable, TileMapEngine};
pub use tiles::TileType;
