//! Game state
//!
//! One mutable instance of every gameplay component, owned here and
//! mutated only by [`super::tick::tick`].

use glam::IVec2;

use super::camera::Camera;
use super::dialog::DialogSystem;
use super::inventory::{Inventory, InventorySnapshot};
use super::map::{MapError, MapLibrary};
use super::player::PlayerController;
use super::quest::QuestManager;
use super::tilemap::TileMapEngine;
use crate::consts::*;
use crate::persistence::SaveData;

/// Current phase of play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Walking around an area
    Exploring,
    /// Simulation frozen (movement cooldown included)
    Paused,
    /// Last area cleared
    Finished,
}

/// Notifications for the UI, drained by the host after each tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    MapLoaded { map_id: String, name: String },
    Moved { to: IVec2, steps: u32 },
    ItemPickedUp { item_id: String, count: u32 },
    InventoryFull { item_id: String },
    QuestProgress { quest_id: String, progress: u32, amount: u32 },
    QuestCompleted { quest_id: String, title: String },
    /// Interacted with the exit while quests remain
    ExitLocked { remaining: usize },
    Interacted { entity_id: String },
    DialogOpened { speaker: String },
    DialogAdvanced { index: usize },
    DialogClosed,
    AreaComplete {
        map_id: String,
        steps: u32,
        next_map: Option<String>,
    },
    MapLoadFailed { map_id: String, reason: String },
    GameFinished,
    Paused,
    Resumed,
}

/// Simulation tunables (see `Settings::sim_config`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    pub tile_size: u32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub move_cooldown_ticks: u32,
    pub inventory_slots: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
            move_cooldown_ticks: MOVE_COOLDOWN_TICKS,
            inventory_slots: MAX_INVENTORY_SLOTS,
        }
    }
}

/// Per-area components, built together so a failed load installs nothing
struct Area {
    map: TileMapEngine,
    player: PlayerController,
    quests: QuestManager,
}

impl Area {
    fn build(library: &MapLibrary, config: &SimConfig, map_id: &str) -> Result<Self, MapError> {
        let def = library.get(map_id)?;
        let map = TileMapEngine::new(def, config.tile_size);
        let player = PlayerController::new(map.player_start(), config.move_cooldown_ticks);
        let mut quests = QuestManager::new();
        quests.load_quests(map.quests());
        Ok(Self { map, player, quests })
    }
}

#[derive(Debug)]
pub struct GameState {
    pub phase: GamePhase,
    pub map: TileMapEngine,
    pub player: PlayerController,
    pub camera: Camera,
    /// Carried across areas
    pub inventory: Inventory,
    /// Reset on every area load
    pub quests: QuestManager,
    pub dialog: DialogSystem,
    /// Progress record handed to the save subsystem
    pub progress: SaveData,
    /// Simulation tick counter (paused ticks excluded)
    pub time_ticks: u64,
    config: SimConfig,
    library: MapLibrary,
    /// Inventory as it was when the area was entered
    area_inventory: InventorySnapshot,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh game starting in `start_map`
    pub fn new(library: MapLibrary, config: SimConfig, start_map: &str) -> Result<Self, MapError> {
        let area = Area::build(&library, &config, start_map)?;
        let mut state = Self {
            phase: GamePhase::Exploring,
            map: area.map,
            player: area.player,
            camera: Camera::new(config.viewport_width, config.viewport_height, config.tile_size),
            inventory: Inventory::new(config.inventory_slots),
            quests: area.quests,
            dialog: DialogSystem::new(),
            progress: SaveData::new(start_map),
            time_ticks: 0,
            config,
            library,
            area_inventory: InventorySnapshot::default(),
            events: Vec::new(),
        };
        state.enter_area();
        Ok(state)
    }

    /// Continue from a progress record. The record's inventory is restored
    /// when it fits; a bad inventory is logged and dropped. A finished
    /// record resumes in [`GamePhase::Finished`] so the last area cannot be
    /// farmed again.
    pub fn from_save(library: MapLibrary, config: SimConfig, save: &SaveData) -> Result<Self, MapError> {
        let mut state = Self::new(library, config, &save.current_map)?;
        if let Err(err) = state.inventory.restore(&save.inventory) {
            log::warn!("Discarding saved inventory: {}", err);
        }
        state.progress = save.clone();
        state.progress.inventory = state.inventory.snapshot();
        state.area_inventory = state.inventory.snapshot();
        if save.finished {
            state.phase = GamePhase::Finished;
            log::info!("Save is a finished game");
            return Ok(state);
        }
        log::info!(
            "Continuing in '{}' ({} areas completed)",
            save.current_map,
            save.areas_completed.len()
        );
        Ok(state)
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn library(&self) -> &MapLibrary {
        &self.library
    }

    /// Swap in a new area. On error the current area stays installed.
    pub fn load_map(&mut self, map_id: &str) -> Result<(), MapError> {
        let area = Area::build(&self.library, &self.config, map_id)?;
        self.map = area.map;
        self.player = area.player;
        self.quests = area.quests;
        self.dialog = DialogSystem::new();
        self.progress.current_map = map_id.to_string();
        self.enter_area();
        Ok(())
    }

    /// Replay the current area from its pristine layout. The inventory
    /// goes back to what it held on entry. A finished game stays finished.
    pub fn restart_area(&mut self) {
        if self.phase == GamePhase::Finished {
            log::info!("Game finished, start a new game to play again");
            return;
        }
        self.map.reset();
        self.player = PlayerController::new(self.map.player_start(), self.config.move_cooldown_ticks);
        self.quests.load_quests(self.map.quests());
        self.dialog = DialogSystem::new();
        if let Err(err) = self.inventory.restore(&self.area_inventory) {
            log::warn!("Could not restore area inventory: {}", err);
        }
        self.phase = GamePhase::Exploring;
        self.follow_player();
        log::info!("Restarted area '{}'", self.map.id());
    }

    fn enter_area(&mut self) {
        self.area_inventory = self.inventory.snapshot();
        self.follow_player();
        log::info!(
            "Entered '{}' ({}x{}, {} quests)",
            self.map.id(),
            self.map.width(),
            self.map.height(),
            self.quests.quests().len()
        );
        self.push_event(GameEvent::MapLoaded {
            map_id: self.map.id().to_string(),
            name: self.map.name().to_string(),
        });
    }

    /// Re-center the camera on the player
    pub fn follow_player(&mut self) {
        let pos = self.player.pos();
        self.camera
            .follow(pos.x, pos.y, self.map.width(), self.map.height());
    }

    pub(crate) fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events raised since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::map::fixtures;

    fn library() -> MapLibrary {
        let mut library = MapLibrary::new();
        let mut meadow = fixtures::meadow();
        meadow.entities.push(fixtures::item("g1", "gem", 6, 5));
        meadow.quests.push(fixtures::collect_quest("gems", "gem", 1));
        library.insert(meadow).unwrap();
        library
    }

    #[test]
    fn test_new_state_enters_start_map() {
        let mut state = GameState::new(library(), SimConfig::default(), "meadow").unwrap();
        assert_eq!(state.phase, GamePhase::Exploring);
        assert_eq!(state.player.pos(), IVec2::new(5, 5));
        assert_eq!(state.progress.current_map, "meadow");
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::MapLoaded {
                map_id: "meadow".to_string(),
                name: "Test Meadow".to_string(),
            }]
        );
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_unknown_start_map() {
        let result = GameState::new(library(), SimConfig::default(), "nowhere");
        assert!(matches!(result, Err(MapError::UnknownMap(_))));
    }

    #[test]
    fn test_failed_load_keeps_current_area() {
        let mut state = GameState::new(library(), SimConfig::default(), "meadow").unwrap();
        state.drain_events();
        assert!(state.load_map("nowhere").is_err());
        assert_eq!(state.map.id(), "meadow");
        assert_eq!(state.progress.current_map, "meadow");
        assert!(state.events().is_empty());
    }

    #[test]
    fn test_from_save_restores_inventory() {
        let mut save = SaveData::new("meadow");
        save.inventory.items.insert("gem".to_string(), 4);
        save.areas_completed.push("earlier".to_string());

        let state = GameState::from_save(library(), SimConfig::default(), &save).unwrap();
        assert_eq!(state.inventory.get_count("gem"), 4);
        assert_eq!(state.progress.areas_completed, vec!["earlier".to_string()]);
    }

    #[test]
    fn test_from_save_keeps_finished_game_finished() {
        let mut save = SaveData::new("meadow");
        save.inventory.items.insert("gem".to_string(), 1);
        save.finished = true;

        let state = GameState::from_save(library(), SimConfig::default(), &save).unwrap();
        assert_eq!(state.phase, GamePhase::Finished);
        assert_eq!(state.inventory.get_count("gem"), 1);
        assert!(state.progress.finished);
    }

    #[test]
    fn test_restart_ignored_once_finished() {
        let mut state = GameState::new(library(), SimConfig::default(), "meadow").unwrap();
        state.map.remove_entity("g1");
        state.phase = GamePhase::Finished;

        state.restart_area();
        assert_eq!(state.phase, GamePhase::Finished);
        assert!(state.map.get_entity_at(6, 5).is_none());
    }

    #[test]
    fn test_from_save_drops_oversized_inventory() {
        let mut save = SaveData::new("meadow");
        for i in 0..=MAX_INVENTORY_SLOTS {
            save.inventory.items.insert(format!("item_{i}"), 1);
        }
        let state = GameState::from_save(library(), SimConfig::default(), &save).unwrap();
        assert_eq!(state.inventory.used_slots(), 0);
        assert!(state.progress.inventory.items.is_empty());
    }

    #[test]
    fn test_restart_area_restores_layout_and_inventory() {
        let mut state = GameState::new(library(), SimConfig::default(), "meadow").unwrap();
        // Simulate an in-area pickup
        state.map.remove_entity("g1");
        state.inventory.add_item("gem", 1);

        state.restart_area();
        assert!(state.map.get_entity_at(6, 5).is_some());
        assert_eq!(state.inventory.get_count("gem"), 0);
        assert_eq!(state.player.steps(), 0);
        assert_eq!(state.quests.get("gems").unwrap().progress, 0);
    }
}
