//! Quest progress tracking
//!
//! Quests are loaded per area and only ever move forward until the next
//! `load_quests`.

use serde::{Deserialize, Serialize};

use super::map::{QuestKind, QuestSpec};

/// Runtime state of one quest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub desc: String,
    pub kind: QuestKind,
    pub target: String,
    pub amount: u32,
    pub progress: u32,
    pub completed: bool,
}

impl Quest {
    fn from_spec(spec: &QuestSpec) -> Self {
        Self {
            id: spec.id.clone(),
            title: spec.title.clone(),
            desc: spec.desc.clone(),
            kind: spec.kind,
            target: spec.target.clone(),
            amount: spec.amount,
            progress: 0,
            completed: false,
        }
    }

    /// Add progress, clamped at the ceiling. Returns true if this call
    /// completed the quest.
    fn add_progress(&mut self, amount: u32) -> bool {
        if self.completed {
            return false;
        }
        self.progress = self.progress.saturating_add(amount).min(self.amount);
        if self.progress >= self.amount {
            self.completed = true;
            return true;
        }
        false
    }

    /// HUD line, e.g. `Meadow Gems: 2/3`
    pub fn progress_text(&self) -> String {
        format!("{}: {}/{}", self.title, self.progress, self.amount)
    }
}

#[derive(Debug, Clone, Default)]
pub struct QuestManager {
    quests: Vec<Quest>,
}

impl QuestManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active set; every quest starts from zero
    pub fn load_quests(&mut self, specs: &[QuestSpec]) {
        self.quests = specs.iter().map(Quest::from_spec).collect();
    }

    /// Credit every open quest matching `(kind, target)`.
    ///
    /// Returns the first quest, in list order, that completed during this
    /// call. Other quests completing in the same call are visible through
    /// [`QuestManager::quests`].
    pub fn update_progress(&mut self, kind: QuestKind, target: &str, amount: u32) -> Option<&Quest> {
        let mut first_completed = None;
        for (index, quest) in self.quests.iter_mut().enumerate() {
            if quest.kind != kind || quest.target != target {
                continue;
            }
            if quest.add_progress(amount) {
                log::info!("Quest '{}' completed", quest.id);
                if first_completed.is_none() {
                    first_completed = Some(index);
                }
            }
        }
        first_completed.and_then(|i| self.quests.get(i))
    }

    /// Every quest in the loaded set, in order
    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn get(&self, id: &str) -> Option<&Quest> {
        self.quests.iter().find(|q| q.id == id)
    }

    pub fn get_active_quests(&self) -> Vec<&Quest> {
        self.quests.iter().filter(|q| !q.completed).collect()
    }

    /// False for an empty set: an area without quests keeps its exit locked
    pub fn are_all_complete(&self) -> bool {
        !self.quests.is_empty() && self.quests.iter().all(|q| q.completed)
    }

    pub fn get_completed_count(&self) -> usize {
        self.quests.iter().filter(|q| q.completed).count()
    }
}
