//! Host-side game session
//!
//! Wraps a [`GameState`] with the fixed-timestep accumulator, a one-shot
//! input queue and the persistence side effects (auto-save on area
//! completion and pause, leaderboard updates). Platform front ends own a
//! `Session` and feed it frame times and input.

use crate::consts::*;
use crate::highscores::HighScores;
use crate::persistence::{SaveData, SaveStore};
use crate::settings::Settings;
use crate::sim::map::{MapError, MapLibrary};
use crate::sim::state::{GameEvent, GameState};
use crate::sim::tick::{TickInput, tick};

/// Longest frame delta fed to the accumulator (s)
const MAX_FRAME_DT: f32 = 0.1;

/// A placed leaderboard run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub map_id: String,
    pub steps: u32,
    pub rank: usize,
}

pub struct Session<S: SaveStore> {
    store: S,
    settings: Settings,
    high_scores: HighScores,
    state: GameState,
    accumulator: f32,
    pending: TickInput,
    last_record: Option<NewRecord>,
}

impl<S: SaveStore> Session<S> {
    /// Open a session on `store`, continuing a stored game when one exists.
    /// An unusable save starts a fresh game instead.
    pub fn new(store: S, library: MapLibrary) -> Result<Self, MapError> {
        let settings = Settings::load(&store);
        let high_scores = HighScores::load(&store);
        let config = settings.sim_config();

        let state = if SaveData::exists(&store) {
            let save = SaveData::load(&store);
            match GameState::from_save(library.clone(), config, &save) {
                Ok(state) => state,
                Err(err) => {
                    log::warn!("Cannot continue from save, starting fresh: {}", err);
                    GameState::new(library, config, &settings.start_map)?
                }
            }
        } else {
            GameState::new(library, config, &settings.start_map)?
        };

        Ok(Self {
            store,
            settings,
            high_scores,
            state,
            accumulator: 0.0,
            pending: TickInput::default(),
            last_record: None,
        })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_scores(&self) -> &HighScores {
        &self.high_scores
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Leaderboard placement from the most recent area completion
    pub fn last_record(&self) -> Option<&NewRecord> {
        self.last_record.as_ref()
    }

    /// Replace and persist settings. World tunables apply from the next
    /// new game.
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings;
        self.settings.save(&self.store);
    }

    /// Discard progress and start over in the configured start map
    pub fn new_game(&mut self) -> Result<(), MapError> {
        let library = self.state.library().clone();
        let state = GameState::new(library, self.settings.sim_config(), &self.settings.start_map)?;
        SaveData::clear(&self.store);
        self.state = state;
        self.accumulator = 0.0;
        self.pending = TickInput::default();
        self.last_record = None;
        log::info!("Started new game in '{}'", self.settings.start_map);
        Ok(())
    }

    pub fn restart_area(&mut self) {
        self.state.restart_area();
        self.pending = TickInput::default();
    }

    /// Queue input for the next tick. One-shot flags accumulate until
    /// consumed; the latest direction wins.
    pub fn queue(&mut self, input: TickInput) {
        if input.movement.is_some() {
            self.pending.movement = input.movement;
        }
        self.pending.interact |= input.interact;
        self.pending.pause |= input.pause;
    }

    /// Advance by a frame's worth of time, returning the events raised
    pub fn update(&mut self, dt: f32, now_ms: f64) -> Vec<GameEvent> {
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut events = Vec::new();
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = std::mem::take(&mut self.pending);
            events.extend(self.step(&input, now_ms));
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        events
    }

    /// Run exactly one tick with `input`
    pub fn step(&mut self, input: &TickInput, now_ms: f64) -> Vec<GameEvent> {
        tick(&mut self.state, input);
        let events = self.state.drain_events();
        self.handle_events(&events, now_ms);
        events
    }

    fn handle_events(&mut self, events: &[GameEvent], now_ms: f64) {
        let mut dirty = false;
        for event in events {
            match event {
                GameEvent::AreaComplete { map_id, steps, .. } => {
                    if let Some(rank) = self.high_scores.add_run(map_id, *steps, now_ms) {
                        self.high_scores.save(&self.store);
                        self.last_record = Some(NewRecord {
                            map_id: map_id.clone(),
                            steps: *steps,
                            rank,
                        });
                    }
                    dirty = true;
                }
                GameEvent::GameFinished | GameEvent::Paused => dirty = true,
                _ => {}
            }
        }
        if dirty {
            self.state.progress.save(&self.store);
        }
    }
}
