//! Fixed timestep simulation tick
//!
//! The game loop: routes one tick's input through dialog gating, the
//! player, inventory and quests, and decides area transitions.

use super::dialog::DialogStep;
use super::map::{Entity, QuestKind};
use super::player::MoveResult;
use super::state::{GameEvent, GamePhase, GameState};
use crate::Direction;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Step request (arrow keys, swipe, d-pad)
    pub movement: Option<Direction>,
    /// Talk / confirm / use exit
    pub interact: bool,
    /// Pause toggle
    pub pause: bool,
}

impl TickInput {
    pub fn step(direction: Direction) -> Self {
        Self {
            movement: Some(direction),
            ..Default::default()
        }
    }

    pub fn interact() -> Self {
        Self {
            interact: true,
            ..Default::default()
        }
    }

    pub fn pause() -> Self {
        Self {
            pause: true,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Exploring => {
                state.phase = GamePhase::Paused;
                state.push_event(GameEvent::Paused);
                return;
            }
            GamePhase::Paused => {
                state.phase = GamePhase::Exploring;
                state.push_event(GameEvent::Resumed);
            }
            GamePhase::Finished => {}
        }
    }

    // Paused freezes everything, including the movement cooldown
    if state.phase != GamePhase::Exploring {
        return;
    }

    state.time_ticks += 1;
    state.player.update();

    // Dialog swallows all input; only confirm does anything
    if state.dialog.is_active() {
        if input.interact {
            advance_dialog(state);
        }
        return;
    }

    if let Some(direction) = input.movement {
        handle_move(state, direction);
    } else if input.interact {
        handle_interact(state);
    }
}

fn advance_dialog(state: &mut GameState) {
    match state.dialog.advance() {
        DialogStep::Next(index) => state.push_event(GameEvent::DialogAdvanced { index }),
        DialogStep::Closed => state.push_event(GameEvent::DialogClosed),
        DialogStep::Inactive => {}
    }
}

fn handle_move(state: &mut GameState, direction: Direction) {
    let result = state.player.try_move(&mut state.map, direction);
    if !result.moved() {
        return;
    }

    state.follow_player();
    state.push_event(GameEvent::Moved {
        to: state.player.pos(),
        steps: state.player.steps(),
    });

    if let MoveResult::Pickup { entity, .. } = result {
        collect_item(state, entity);
    }

    if state.player.is_at_exit(&state.map) && state.quests.are_all_complete() {
        complete_area(state);
    }
}

/// Credit a picked-up item to the inventory and quests. A refused item goes
/// back on the map.
fn collect_item(state: &mut GameState, entity: Entity) {
    let Some(item_id) = entity.item_id.clone() else {
        log::warn!("Item entity '{}' has no itemId", entity.id);
        state.map.restore_entity(entity);
        return;
    };

    if !state.inventory.add_item(&item_id, 1) {
        log::warn!("Inventory full, leaving '{}' on the map", entity.id);
        state.map.restore_entity(entity);
        state.push_event(GameEvent::InventoryFull { item_id });
        return;
    }
    state.push_event(GameEvent::ItemPickedUp {
        count: state.inventory.get_count(&item_id),
        item_id: item_id.clone(),
    });

    let was_completed: Vec<bool> = state.quests.quests().iter().map(|q| q.completed).collect();
    state.quests.update_progress(QuestKind::Collect, &item_id, 1);

    let mut notes = Vec::new();
    for (quest, was_done) in state.quests.quests().iter().zip(was_completed) {
        if quest.kind != QuestKind::Collect || quest.target != item_id || was_done {
            continue;
        }
        if quest.completed {
            notes.push(GameEvent::QuestCompleted {
                quest_id: quest.id.clone(),
                title: quest.title.clone(),
            });
        } else {
            notes.push(GameEvent::QuestProgress {
                quest_id: quest.id.clone(),
                progress: quest.progress,
                amount: quest.amount,
            });
        }
    }
    for note in notes {
        state.push_event(note);
    }
}

fn handle_interact(state: &mut GameState) {
    if state.player.is_at_exit(&state.map) {
        if state.quests.are_all_complete() {
            complete_area(state);
        } else {
            let remaining = state.quests.get_active_quests().len();
            log::debug!("Exit locked, {} quests remaining", remaining);
            state.push_event(GameEvent::ExitLocked { remaining });
        }
        return;
    }

    let Some(found) = state.player.interact(&state.map) else {
        return;
    };
    let entity_id = found.entity.id.clone();
    let speaker = found.entity.display_name().to_string();
    let lines = found.entity.dialog.clone();

    state.push_event(GameEvent::Interacted { entity_id });
    if state.dialog.show(&speaker, &lines, None).is_ok() {
        state.push_event(GameEvent::DialogOpened { speaker });
    }
}

/// Record the cleared area and move on to the next one (or finish)
fn complete_area(state: &mut GameState) {
    let map_id = state.map.id().to_string();
    let next_map = state.map.exit_point().and_then(|exit| exit.next_map.clone());
    let steps = state.player.steps();

    state
        .progress
        .record_area(&map_id, state.quests.get_completed_count(), &state.inventory);
    log::info!("Area '{}' complete in {} steps", map_id, steps);
    state.push_event(GameEvent::AreaComplete {
        map_id,
        steps,
        next_map: next_map.clone(),
    });

    match next_map {
        Some(next) => {
            if let Err(err) = state.load_map(&next) {
                log::error!("Failed to load map '{}': {}", next, err);
                state.push_event(GameEvent::MapLoadFailed {
                    map_id: next,
                    reason: err.to_string(),
                });
            }
        }
        None => {
            state.phase = GamePhase::Finished;
            state.progress.finished = true;
            log::info!("All areas complete");
            state.push_event(GameEvent::GameFinished);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::map::{ExitPoint, MapLibrary, fixtures};
    use crate::sim::state::SimConfig;
    use glam::IVec2;

    const COOLDOWN: u32 = 3;

    fn config() -> SimConfig {
        SimConfig {
            move_cooldown_ticks: COOLDOWN,
            ..SimConfig::default()
        }
    }

    fn state_with(def: crate::sim::map::MapDefinition) -> GameState {
        let id = def.id.clone();
        let mut library = MapLibrary::new();
        library.insert(def).unwrap();
        let mut state = GameState::new(library, config(), &id).unwrap();
        state.drain_events();
        state
    }

    /// Step and wait out the movement lock
    fn walk(state: &mut GameState, dirs: &[Direction]) {
        for dir in dirs {
            tick(state, &TickInput::step(*dir));
            for _ in 1..COOLDOWN {
                tick(state, &TickInput::default());
            }
        }
    }

    #[test]
    fn test_move_right_scenario() {
        let mut state = state_with(fixtures::meadow());
        tick(&mut state, &TickInput::step(Direction::Right));
        assert_eq!(state.player.pos(), IVec2::new(6, 5));
        assert_eq!(state.player.steps(), 1);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Moved {
                to: IVec2::new(6, 5),
                steps: 1
            }]
        );
    }

    #[test]
    fn test_moves_locked_until_cooldown_elapses() {
        let mut state = state_with(fixtures::meadow());
        tick(&mut state, &TickInput::step(Direction::Right));
        for _ in 1..COOLDOWN {
            tick(&mut state, &TickInput::step(Direction::Right));
        }
        // Inputs during the lock were dropped, not queued
        assert_eq!(state.player.steps(), 1);
        tick(&mut state, &TickInput::step(Direction::Right));
        assert_eq!(state.player.steps(), 2);
    }

    #[test]
    fn test_steps_count_successful_moves() {
        let mut state = state_with(fixtures::meadow());
        // Four moves up from (5,5), the fifth is blocked by the sky border
        walk(&mut state, &[Direction::Up; 5]);
        assert_eq!(state.player.pos(), IVec2::new(5, 1));
        assert_eq!(state.player.steps(), 4);
    }

    #[test]
    fn test_gem_pickup_completes_quest_scenario() {
        let mut def = fixtures::meadow();
        def.entities.push(fixtures::item("g1", "gem", 4, 5));
        def.entities.push(fixtures::item("g2", "gem", 3, 5));
        def.entities.push(fixtures::item("g3", "gem", 6, 5));
        def.quests.push(fixtures::collect_quest("gems", "gem", 3));
        let mut state = state_with(def);

        walk(&mut state, &[Direction::Left, Direction::Left]);
        assert_eq!(state.quests.get("gems").unwrap().progress, 2);
        let before = state.inventory.get_count("gem");
        state.drain_events();

        // Back to (5,5) then onto the third gem at (6,5)
        walk(&mut state, &[Direction::Right, Direction::Right]);
        walk(&mut state, &[Direction::Right]);

        assert_eq!(state.inventory.get_count("gem"), before + 1);
        let quest = state.quests.get("gems").unwrap();
        assert_eq!(quest.progress, 3);
        assert!(quest.completed);

        let completions: Vec<_> = state
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::QuestCompleted { .. }))
            .collect();
        assert_eq!(
            completions,
            vec![GameEvent::QuestCompleted {
                quest_id: "gems".to_string(),
                title: "Collect 3 gem".to_string(),
            }]
        );
    }

    #[test]
    fn test_pickup_reports_progress() {
        let mut def = fixtures::meadow();
        def.entities.push(fixtures::item("g1", "gem", 6, 5));
        def.quests.push(fixtures::collect_quest("gems", "gem", 3));
        let mut state = state_with(def);

        tick(&mut state, &TickInput::step(Direction::Right));
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::ItemPickedUp {
            item_id: "gem".to_string(),
            count: 1
        }));
        assert!(events.contains(&GameEvent::QuestProgress {
            quest_id: "gems".to_string(),
            progress: 1,
            amount: 3
        }));
    }

    #[test]
    fn test_full_inventory_leaves_item_on_map() {
        let mut def = fixtures::meadow();
        def.entities.push(fixtures::item("g1", "gem", 6, 5));
        def.quests.push(fixtures::collect_quest("gems", "gem", 1));
        let mut library = MapLibrary::new();
        library.insert(def).unwrap();
        let cfg = SimConfig {
            inventory_slots: 1,
            ..config()
        };
        let mut state = GameState::new(library, cfg, "meadow").unwrap();
        state.inventory.add_item("feather", 1);
        state.drain_events();

        tick(&mut state, &TickInput::step(Direction::Right));
        assert!(state.map.get_entity_at(6, 5).is_some());
        assert_eq!(state.quests.get("gems").unwrap().progress, 0);
        assert!(state.drain_events().contains(&GameEvent::InventoryFull {
            item_id: "gem".to_string()
        }));
    }

    #[test]
    fn test_exit_locked_with_incomplete_quest() {
        let mut def = fixtures::meadow();
        def.player_start = crate::sim::map::TilePoint::new(10, 8);
        def.quests.push(fixtures::collect_quest("gems", "gem", 1));
        def.exit_point = Some(ExitPoint {
            x: 10,
            y: 8,
            next_map: Some("next".to_string()),
        });
        let mut state = state_with(def);

        tick(&mut state, &TickInput::interact());
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::ExitLocked { remaining: 1 }]
        );
        assert_eq!(state.map.id(), "meadow");
        assert_eq!(state.phase, GamePhase::Exploring);
    }

    #[test]
    fn test_exit_without_quests_stays_locked() {
        let mut def = fixtures::meadow();
        def.player_start = crate::sim::map::TilePoint::new(10, 8);
        let mut state = state_with(def);

        tick(&mut state, &TickInput::interact());
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::ExitLocked { remaining: 0 }]
        );
    }

    #[test]
    fn test_walking_onto_open_exit_loads_next_map() {
        let mut first = fixtures::meadow();
        first.entities.push(fixtures::item("g1", "gem", 6, 5));
        first.quests.push(fixtures::collect_quest("gems", "gem", 1));
        first.exit_point = Some(ExitPoint {
            x: 7,
            y: 5,
            next_map: Some("second".to_string()),
        });
        let mut second = fixtures::meadow();
        second.id = "second".to_string();
        second.player_start = crate::sim::map::TilePoint::new(2, 2);

        let mut library = MapLibrary::new();
        library.insert(first).unwrap();
        library.insert(second).unwrap();
        let mut state = GameState::new(library, config(), "meadow").unwrap();
        state.drain_events();

        walk(&mut state, &[Direction::Right, Direction::Right]);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::AreaComplete {
            map_id: "meadow".to_string(),
            steps: 2,
            next_map: Some("second".to_string()),
        }));
        assert_eq!(state.map.id(), "second");
        assert_eq!(state.player.pos(), IVec2::new(2, 2));
        assert_eq!(state.player.steps(), 0);
        // Inventory carries over, quests do not
        assert_eq!(state.inventory.get_count("gem"), 1);
        assert!(state.quests.quests().is_empty());
        assert_eq!(state.progress.areas_completed, vec!["meadow".to_string()]);
        assert_eq!(state.progress.quests_completed, 1);
        assert_eq!(state.progress.total_gems, 1);
        assert_eq!(state.progress.current_map, "second");
    }

    #[test]
    fn test_unknown_next_map_aborts_transition() {
        let mut def = fixtures::meadow();
        def.entities.push(fixtures::item("g1", "gem", 6, 5));
        def.quests.push(fixtures::collect_quest("gems", "gem", 1));
        def.exit_point = Some(ExitPoint {
            x: 6,
            y: 5,
            next_map: Some("missing".to_string()),
        });
        let mut state = state_with(def);

        tick(&mut state, &TickInput::step(Direction::Right));
        let events = state.drain_events();
        assert!(
            events
                .iter()
                .any(|e| matches!(e, GameEvent::MapLoadFailed { map_id, .. } if map_id == "missing"))
        );
        assert_eq!(state.map.id(), "meadow");
        assert_eq!(state.phase, GamePhase::Exploring);

        // Retrying does not double count the area
        tick(&mut state, &TickInput::interact());
        assert_eq!(state.progress.quests_completed, 1);
        assert_eq!(state.progress.areas_completed.len(), 1);
    }

    #[test]
    fn test_last_area_finishes_game() {
        let mut def = fixtures::meadow();
        def.entities.push(fixtures::item("g1", "gem", 6, 5));
        def.quests.push(fixtures::collect_quest("gems", "gem", 1));
        def.player_start = crate::sim::map::TilePoint::new(9, 8);
        def.exit_point = Some(ExitPoint {
            x: 10,
            y: 8,
            next_map: None,
        });
        let mut state = state_with(def);

        // Exit at (10,8) reached before the quest is done: stays open
        tick(&mut state, &TickInput::step(Direction::Right));
        assert_eq!(state.phase, GamePhase::Exploring);

        state.inventory.add_item("gem", 1);
        state.quests.update_progress(QuestKind::Collect, "gem", 1);
        tick(&mut state, &TickInput::interact());
        assert_eq!(state.phase, GamePhase::Finished);
        assert!(state.progress.finished);
        assert!(state.drain_events().contains(&GameEvent::GameFinished));

        // Finished ignores further input
        let ticks = state.time_ticks;
        tick(&mut state, &TickInput::step(Direction::Left));
        assert_eq!(state.time_ticks, ticks);
    }

    #[test]
    fn test_dialog_gates_movement() {
        let mut def = fixtures::meadow();
        def.entities.push(fixtures::npc("Nimbus", 5, 4, &["Hi", "Bye"]));
        let mut state = state_with(def);

        tick(&mut state, &TickInput::interact());
        assert!(state.dialog.is_active());
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::Interacted {
                    entity_id: "Nimbus".to_string()
                },
                GameEvent::DialogOpened {
                    speaker: "Nimbus".to_string()
                },
            ]
        );

        // Movement is ignored while talking
        tick(&mut state, &TickInput::step(Direction::Down));
        assert_eq!(state.player.pos(), IVec2::new(5, 5));

        tick(&mut state, &TickInput::interact());
        assert_eq!(state.dialog.current().unwrap().message, "Bye");
        tick(&mut state, &TickInput::interact());
        assert!(!state.dialog.is_active());
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::DialogAdvanced { index: 1 },
                GameEvent::DialogClosed
            ]
        );

        tick(&mut state, &TickInput::step(Direction::Down));
        assert_eq!(state.player.pos(), IVec2::new(5, 6));
    }

    #[test]
    fn test_npc_without_dialog_only_interacts() {
        let mut def = fixtures::meadow();
        def.entities.push(fixtures::npc("mute", 6, 5, &[]));
        let mut state = state_with(def);

        tick(&mut state, &TickInput::interact());
        assert!(!state.dialog.is_active());
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::Interacted {
                entity_id: "mute".to_string()
            }]
        );
    }

    #[test]
    fn test_pause_freezes_cooldown() {
        let mut state = state_with(fixtures::meadow());
        tick(&mut state, &TickInput::step(Direction::Right));
        tick(&mut state, &TickInput::pause());
        assert_eq!(state.phase, GamePhase::Paused);

        // Paused ticks neither move nor release the lock
        for _ in 0..10 {
            tick(&mut state, &TickInput::step(Direction::Right));
        }
        assert_eq!(state.player.steps(), 1);
        assert!(state.player.is_moving());

        // Resume and the cooldown picks up where it left off
        tick(&mut state, &TickInput::pause());
        assert_eq!(state.phase, GamePhase::Exploring);
        for _ in 2..COOLDOWN {
            tick(&mut state, &TickInput::default());
        }
        tick(&mut state, &TickInput::step(Direction::Right));
        assert_eq!(state.player.steps(), 2);
        let events = state.drain_events();
        assert!(events.contains(&GameEvent::Paused));
        assert!(events.contains(&GameEvent::Resumed));
    }

    /// Shortest walk to `to`, never crossing `avoid`
    fn path_to(state: &GameState, to: IVec2, avoid: Option<IVec2>) -> Option<Vec<Direction>> {
        use std::collections::{HashMap, VecDeque};
        let start = state.player.pos();
        let mut came_from: HashMap<IVec2, (IVec2, Direction)> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        while let Some(pos) = queue.pop_front() {
            if pos == to {
                let mut dirs = Vec::new();
                let mut cur = pos;
                while cur != start {
                    let (prev, dir) = came_from[&cur];
                    dirs.push(dir);
                    cur = prev;
                }
                dirs.reverse();
                return Some(dirs);
            }
            for dir in Direction::ALL {
                let next = pos + dir.delta();
                if next == start || came_from.contains_key(&next) || Some(next) == avoid {
                    continue;
                }
                if state.map.is_walkable(next.x, next.y) {
                    came_from.insert(next, (pos, dir));
                    queue.push_back(next);
                }
            }
        }
        None
    }

    #[test]
    fn test_bundled_campaign_is_completable() {
        use crate::sim::map::EntityKind;

        let library = MapLibrary::bundled().unwrap();
        let mut state = GameState::new(library, config(), crate::consts::START_MAP).unwrap();
        let mut cleared = Vec::new();

        while state.phase != GamePhase::Finished {
            assert!(cleared.len() < 3, "too many areas: {:?}", cleared);
            let exit = state.map.exit_point().unwrap().pos();

            while !state.quests.are_all_complete() {
                let target = state
                    .map
                    .entities()
                    .iter()
                    .find(|e| e.kind == EntityKind::Item)
                    .map(|e| e.pos())
                    .expect("quests need items that are still on the map");
                let dirs = path_to(&state, target, Some(exit)).expect("item reachable");
                walk(&mut state, &dirs);
            }

            cleared.push(state.map.id().to_string());
            let dirs = path_to(&state, exit, None).expect("exit reachable");
            walk(&mut state, &dirs);
            if dirs.is_empty() {
                tick(&mut state, &TickInput::interact());
            }
        }

        assert_eq!(cleared, ["cloud_meadow", "rainbow_bridge", "sky_castle"]);
        assert_eq!(state.progress.areas_completed, cleared);
        assert_eq!(state.progress.quests_completed, 5);
        assert_eq!(state.progress.total_gems, 5);
    }

    #[test]
    fn test_camera_follows_moves() {
        let mut def = fixtures::meadow();
        def.width = 40;
        def.height = 40;
        for row in &mut def.tiles {
            row.resize(40, 1);
        }
        def.tiles.resize(40, vec![1; 40]);
        def.player_start = crate::sim::map::TilePoint::new(20, 20);
        let mut state = state_with(def);
        let before = state.camera;

        tick(&mut state, &TickInput::step(Direction::Right));
        assert_eq!(state.camera.x, before.x + state.config().tile_size as i32);
        assert_eq!(state.camera.y, before.y);
    }
}
