//! Attract-mode wanderer
//!
//! Produces [`TickInput`]s that walk the player around at random, talk to
//! whoever is adjacent and use the exit when standing on it. Seeded, so a
//! given seed replays the same session.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::GameState;
use super::tick::TickInput;
use crate::Direction;

/// Ticks between dialog advances, so lines stay readable
const DIALOG_DWELL_TICKS: u32 = 90;
/// Chance per step of picking a fresh heading
const TURN_CHANCE: f64 = 0.25;
/// Chance of talking to an adjacent NPC when one is in reach
const TALK_CHANCE: f64 = 0.3;

#[derive(Debug, Clone)]
pub struct Wanderer {
    rng: Pcg32,
    heading: Direction,
    last_pos: Option<glam::IVec2>,
    dwell: u32,
}

impl Wanderer {
    pub fn new(seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let heading = random_direction(&mut rng);
        Self {
            rng,
            heading,
            last_pos: None,
            dwell: 0,
        }
    }

    /// Input for the next tick
    pub fn next_input(&mut self, state: &GameState) -> TickInput {
        if state.dialog.is_active() {
            self.dwell += 1;
            if self.dwell >= DIALOG_DWELL_TICKS {
                self.dwell = 0;
                return TickInput::interact();
            }
            return TickInput::default();
        }
        self.dwell = 0;

        if state.player.is_moving() {
            return TickInput::default();
        }
        if state.player.is_at_exit(&state.map) && state.quests.are_all_complete() {
            return TickInput::interact();
        }
        if state.player.can_interact(&state.map) && self.rng.random_bool(TALK_CHANCE) {
            return TickInput::interact();
        }

        let pos = state.player.pos();
        let blocked = self.last_pos == Some(pos);
        if blocked || self.rng.random_bool(TURN_CHANCE) {
            self.heading = random_direction(&mut self.rng);
        }
        self.last_pos = Some(pos);
        TickInput::step(self.heading)
    }
}

fn random_direction(rng: &mut Pcg32) -> Direction {
    Direction::ALL[rng.random_range(0..Direction::ALL.len())]
}
