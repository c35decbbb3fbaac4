//! Player movement and interaction
//!
//! A two-state machine: idle, or moving while the step cooldown runs down.
//! The cooldown is counted in simulation ticks, so it stops when the
//! simulation stops (pause) and is fully deterministic under test.

use glam::IVec2;

use super::map::{Entity, EntityKind};
use super::tilemap::{Interactable, TileMapEngine};
use crate::Direction;

/// What a movement request did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveResult {
    /// Dropped: still moving, or the target cell is not walkable
    NotMoved,
    /// Stepped onto an empty cell
    Moved { to: IVec2 },
    /// Stepped onto an item, which has been taken off the map
    Pickup { to: IVec2, entity: Entity },
}

impl MoveResult {
    pub fn moved(&self) -> bool {
        !matches!(self, MoveResult::NotMoved)
    }
}

#[derive(Debug, Clone)]
pub struct PlayerController {
    pos: IVec2,
    steps: u32,
    /// Ticks left before the next move is accepted
    cooldown: u32,
    move_cooldown: u32,
}

impl PlayerController {
    pub fn new(start: IVec2, move_cooldown: u32) -> Self {
        Self {
            pos: start,
            steps: 0,
            cooldown: 0,
            move_cooldown,
        }
    }

    #[inline]
    pub fn pos(&self) -> IVec2 {
        self.pos
    }

    #[inline]
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// True while the movement lock is held
    #[inline]
    pub fn is_moving(&self) -> bool {
        self.cooldown > 0
    }

    /// Advance the movement lock by one simulation tick
    pub fn update(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    /// Try to step one tile. Requests made while locked or into a blocking
    /// tile are dropped, not queued.
    pub fn try_move(&mut self, map: &mut TileMapEngine, direction: Direction) -> MoveResult {
        if self.is_moving() {
            return MoveResult::NotMoved;
        }

        let target = self.pos + direction.delta();
        if !map.is_walkable(target.x, target.y) {
            log::debug!(
                "Move {} blocked at ({}, {})",
                direction.as_str(),
                target.x,
                target.y
            );
            return MoveResult::NotMoved;
        }

        self.pos = target;
        self.steps += 1;
        self.cooldown = self.move_cooldown;

        let item_id = map
            .get_entity_at(target.x, target.y)
            .filter(|e| e.kind == EntityKind::Item)
            .map(|e| e.id.clone());

        match item_id.and_then(|id| map.remove_entity(&id)) {
            Some(entity) => {
                log::debug!("Picked up '{}' at ({}, {})", entity.id, target.x, target.y);
                MoveResult::Pickup { to: target, entity }
            }
            None => MoveResult::Moved { to: target },
        }
    }

    pub fn can_interact(&self, map: &TileMapEngine) -> bool {
        self.interact(map).is_some()
    }

    /// The adjacent NPC or interactive entity, if any
    pub fn interact<'a>(&self, map: &'a TileMapEngine) -> Option<Interactable<'a>> {
        map.get_interactable_at(self.pos.x, self.pos.y)
    }

    pub fn is_at_exit(&self, map: &TileMapEngine) -> bool {
        map.exit_point().is_some_and(|exit| exit.pos() == self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::map::fixtures;
    use proptest::prelude::*;

    const COOLDOWN: u32 = 3;

    fn setup() -> (TileMapEngine, PlayerController) {
        let map = TileMapEngine::new(&fixtures::meadow(), 32);
        let player = PlayerController::new(map.player_start(), COOLDOWN);
        (map, player)
    }

    fn settle(player: &mut PlayerController) {
        for _ in 0..COOLDOWN {
            player.update();
        }
    }

    #[test]
    fn test_move_right_onto_cloud() {
        let (mut map, mut player) = setup();
        assert_eq!(player.pos(), IVec2::new(5, 5));

        let result = player.try_move(&mut map, Direction::Right);
        assert_eq!(result, MoveResult::Moved { to: IVec2::new(6, 5) });
        assert_eq!(player.pos().x, 6);
        assert_eq!(player.steps(), 1);
        assert!(player.is_moving());
    }

    #[test]
    fn test_move_dropped_while_locked() {
        let (mut map, mut player) = setup();
        assert!(player.try_move(&mut map, Direction::Right).moved());

        let result = player.try_move(&mut map, Direction::Right);
        assert_eq!(result, MoveResult::NotMoved);
        assert_eq!(player.pos(), IVec2::new(6, 5));

        // Lock releases after exactly the configured ticks
        for _ in 0..COOLDOWN - 1 {
            player.update();
        }
        assert!(player.is_moving());
        player.update();
        assert!(!player.is_moving());
        assert!(player.try_move(&mut map, Direction::Right).moved());
        assert_eq!(player.steps(), 2);
    }

    #[test]
    fn test_move_into_blocking_tile() {
        let mut def = fixtures::meadow();
        def.player_start = crate::sim::map::TilePoint::new(3, 4);
        let mut map = TileMapEngine::new(&def, 32);
        let mut player = PlayerController::new(map.player_start(), COOLDOWN);

        // Tree at (3,3) is directly above
        assert_eq!(player.try_move(&mut map, Direction::Up), MoveResult::NotMoved);
        assert_eq!(player.steps(), 0);
        assert!(!player.is_moving());
    }

    #[test]
    fn test_move_off_map_edge_blocked() {
        let mut def = fixtures::meadow();
        def.tile_type_names.insert(0, "cloud".to_string());
        def.player_start = crate::sim::map::TilePoint::new(0, 0);
        let mut map = TileMapEngine::new(&def, 32);
        let mut player = PlayerController::new(map.player_start(), 0);

        assert!(!player.try_move(&mut map, Direction::Left).moved());
        assert!(!player.try_move(&mut map, Direction::Up).moved());
        assert!(player.try_move(&mut map, Direction::Right).moved());
    }

    #[test]
    fn test_pickup_removes_item() {
        let mut def = fixtures::meadow();
        def.entities.push(fixtures::item("g1", "gem", 6, 5));
        let mut map = TileMapEngine::new(&def, 32);
        let mut player = PlayerController::new(map.player_start(), COOLDOWN);

        match player.try_move(&mut map, Direction::Right) {
            MoveResult::Pickup { to, entity } => {
                assert_eq!(to, IVec2::new(6, 5));
                assert_eq!(entity.id, "g1");
            }
            other => panic!("expected pickup, got {other:?}"),
        }
        assert!(map.get_entity_at(6, 5).is_none());
    }

    #[test]
    fn test_npc_not_picked_up() {
        let mut def = fixtures::meadow();
        def.entities.push(fixtures::npc("fay", 6, 5, &["hi"]));
        let mut map = TileMapEngine::new(&def, 32);
        let mut player = PlayerController::new(map.player_start(), COOLDOWN);

        assert_eq!(
            player.try_move(&mut map, Direction::Right),
            MoveResult::Moved { to: IVec2::new(6, 5) }
        );
        assert!(map.get_entity_at(6, 5).is_some());
    }

    #[test]
    fn test_interact_with_adjacent_npc() {
        let mut def = fixtures::meadow();
        def.entities.push(fixtures::npc("fay", 5, 6, &["hi"]));
        let map = TileMapEngine::new(&def, 32);
        let player = PlayerController::new(map.player_start(), COOLDOWN);

        assert!(player.can_interact(&map));
        let found = player.interact(&map).unwrap();
        assert_eq!(found.entity.id, "fay");
        assert_eq!(found.pos, IVec2::new(5, 6));
    }

    #[test]
    fn test_is_at_exit() {
        let (mut map, mut player) = setup();
        assert!(!player.is_at_exit(&map));

        // (5,5) -> (10,8): five right, three down
        let path = [Direction::Right; 5]
            .into_iter()
            .chain([Direction::Down; 3]);
        for dir in path {
            assert!(player.try_move(&mut map, dir).moved());
            settle(&mut player);
        }
        assert_eq!(player.pos(), IVec2::new(10, 8));
        assert!(player.is_at_exit(&map));
    }

    #[test]
    fn test_no_exit_point() {
        let mut def = fixtures::meadow();
        def.exit_point = None;
        let map = TileMapEngine::new(&def, 32);
        let player = PlayerController::new(map.player_start(), COOLDOWN);
        assert!(!player.is_at_exit(&map));
    }

    fn any_direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Up),
            Just(Direction::Down),
            Just(Direction::Left),
            Just(Direction::Right),
        ]
    }

    proptest! {
        #[test]
        fn prop_random_walk_stays_walkable(dirs in prop::collection::vec(any_direction(), 0..200)) {
            let (mut map, mut player) = setup();
            let mut successes = 0;
            for dir in dirs {
                if player.try_move(&mut map, dir).moved() {
                    successes += 1;
                    prop_assert!(map.is_walkable(player.pos().x, player.pos().y));
                }
                settle(&mut player);
            }
            prop_assert_eq!(player.steps(), successes);
        }
    }
}
