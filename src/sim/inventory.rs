//! Stackable inventory
//!
//! Counts per item id. The slot cap limits distinct item types, not units:
//! a stack never takes more than one slot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("invalid inventory data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("inventory data holds {found} item types but only {max} slots are available")]
    TooManySlots { found: usize, max: usize },
}

/// Serialized form (`{"items": {...}}`) shared with the save record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    #[serde(default)]
    pub items: BTreeMap<String, u32>,
}

#[derive(Debug, Clone)]
pub struct Inventory {
    items: BTreeMap<String, u32>,
    max_slots: usize,
}

impl Inventory {
    pub fn new(max_slots: usize) -> Self {
        Self {
            items: BTreeMap::new(),
            max_slots,
        }
    }

    pub fn max_slots(&self) -> usize {
        self.max_slots
    }

    /// Distinct item types held
    pub fn used_slots(&self) -> usize {
        self.items.len()
    }

    /// Add `qty` of an item. Fails without mutation if the item is new and
    /// every slot is taken.
    pub fn add_item(&mut self, item_id: &str, qty: u32) -> bool {
        if let Some(count) = self.items.get_mut(item_id) {
            *count = count.saturating_add(qty);
            return true;
        }
        if qty == 0 {
            return true;
        }
        if self.items.len() >= self.max_slots {
            log::info!("Inventory full, cannot add '{}'", item_id);
            return false;
        }
        self.items.insert(item_id.to_string(), qty);
        true
    }

    /// Remove `qty` of an item. Fails if fewer are held.
    pub fn remove_item(&mut self, item_id: &str, qty: u32) -> bool {
        let count = self.get_count(item_id);
        if count < qty {
            return false;
        }
        if count == qty {
            self.items.remove(item_id);
        } else if let Some(c) = self.items.get_mut(item_id) {
            *c -= qty;
        }
        true
    }

    pub fn has_item(&self, item_id: &str) -> bool {
        self.get_count(item_id) > 0
    }

    pub fn get_count(&self, item_id: &str) -> u32 {
        self.items.get(item_id).copied().unwrap_or(0)
    }

    /// Copy of every held item and its count
    pub fn get_all(&self) -> BTreeMap<String, u32> {
        self.items.clone()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot {
            items: self.items.clone(),
        }
    }

    /// Replace the contents from a snapshot. Zero counts are dropped.
    pub fn restore(&mut self, snapshot: &InventorySnapshot) -> Result<(), InventoryError> {
        let items: BTreeMap<String, u32> = snapshot
            .items
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(id, count)| (id.clone(), *count))
            .collect();
        if items.len() > self.max_slots {
            return Err(InventoryError::TooManySlots {
                found: items.len(),
                max: self.max_slots,
            });
        }
        self.items = items;
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.snapshot())
    }

    pub fn from_json(&mut self, json: &str) -> Result<(), InventoryError> {
        let snapshot: InventorySnapshot = serde_json::from_str(json)?;
        self.restore(&snapshot)
    }
}
