//! Map definitions
//!
//! Static, immutable area templates loaded from JSON. The engine clones a
//! template into a working copy; the template itself is never mutated.

use std::collections::{BTreeMap, HashMap, HashSet};

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::tiles;
use crate::consts::MAX_MAP_EDGE;

/// Errors raised while loading map data
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("unknown map id '{0}'")]
    UnknownMap(String),
    #[error("failed to parse map data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("map '{id}' has invalid size {width}x{height} (edges must be 1..={max})")]
    InvalidSize {
        id: String,
        width: u32,
        height: u32,
        max: u32,
    },
    #[error("map '{map}' has duplicate entity id '{entity}'")]
    DuplicateEntity { map: String, entity: String },
    #[error("map '{map}' has item '{entity}' without an itemId")]
    MissingItemId { map: String, entity: String },
}

/// A tile coordinate as it appears in map data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TilePoint {
    pub x: i32,
    pub y: i32,
}

impl TilePoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn as_ivec2(self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }
}

impl From<IVec2> for TilePoint {
    fn from(v: IVec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Item,
    Npc,
}

/// An item or NPC placed on the map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub x: i32,
    pub y: i32,
    pub sprite: String,
    /// Inventory item granted on pickup (items only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dialog: Vec<String>,
    /// Explicit interaction flag for non-NPC entities (signs, chests)
    #[serde(default)]
    pub interactive: bool,
}

impl Entity {
    #[inline]
    pub fn pos(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }

    pub fn is_npc(&self) -> bool {
        self.kind == EntityKind::Npc
    }

    /// Name shown as the dialog speaker
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// Objective type of a quest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestKind {
    Collect,
}

impl QuestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestKind::Collect => "collect",
        }
    }
}

/// Quest template as authored in map data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestSpec {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(rename = "type")]
    pub kind: QuestKind,
    pub target: String,
    pub amount: u32,
}

/// Where the area ends and which area follows
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitPoint {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub next_map: Option<String>,
}

impl ExitPoint {
    #[inline]
    pub fn pos(&self) -> IVec2 {
        IVec2::new(self.x, self.y)
    }
}

/// Immutable area template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapDefinition {
    pub id: String,
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// Tile-type index per cell, row-major (`tiles[y][x]`)
    pub tiles: Vec<Vec<u32>>,
    pub tile_type_names: BTreeMap<u32, String>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    pub player_start: TilePoint,
    #[serde(default)]
    pub quests: Vec<QuestSpec>,
    #[serde(default)]
    pub exit_point: Option<ExitPoint>,
}

impl MapDefinition {
    /// Parse and validate a map from its JSON form
    pub fn from_json(json: &str) -> Result<Self, MapError> {
        let map: MapDefinition = serde_json::from_str(json)?;
        map.validate()?;
        Ok(map)
    }

    /// Structural checks. Cell-level problems (short rows, unregistered
    /// indexes) are tolerated and resolve to void at lookup time.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.width == 0
            || self.height == 0
            || self.width > MAX_MAP_EDGE
            || self.height > MAX_MAP_EDGE
        {
            return Err(MapError::InvalidSize {
                id: self.id.clone(),
                width: self.width,
                height: self.height,
                max: MAX_MAP_EDGE,
            });
        }

        let mut seen = HashSet::new();
        for entity in &self.entities {
            if !seen.insert(entity.id.as_str()) {
                return Err(MapError::DuplicateEntity {
                    map: self.id.clone(),
                    entity: entity.id.clone(),
                });
            }
            if entity.kind == EntityKind::Item && entity.item_id.is_none() {
                return Err(MapError::MissingItemId {
                    map: self.id.clone(),
                    entity: entity.id.clone(),
                });
            }
        }

        let unresolved = self.unresolved_cells();
        if unresolved > 0 {
            log::warn!(
                "Map '{}': {} cells do not resolve to a registered tile type (treated as void)",
                self.id,
                unresolved
            );
        }
        Ok(())
    }

    /// Registered tile name for an in-bounds cell
    pub fn tile_name_at(&self, x: i32, y: i32) -> Option<&str> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let index = self.tiles.get(y as usize)?.get(x as usize)?;
        self.tile_type_names.get(index).map(String::as_str)
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width && (y as u32) < self.height
    }

    /// Count cells that will fall back to void
    fn unresolved_cells(&self) -> usize {
        let mut count = 0;
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                let resolved = self
                    .tile_name_at(x, y)
                    .and_then(tiles::tile_type)
                    .is_some();
                if !resolved {
                    count += 1;
                }
            }
        }
        count
    }
}

const BUNDLED_MAPS: &[&str] = &[
    include_str!("../../assets/maps/cloud_meadow.json"),
    include_str!("../../assets/maps/rainbow_bridge.json"),
    include_str!("../../assets/maps/sky_castle.json"),
];

/// All area templates available to a session, keyed by id
#[derive(Debug, Clone, Default)]
pub struct MapLibrary {
    maps: HashMap<String, MapDefinition>,
}

impl MapLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Maps shipped with the game
    pub fn bundled() -> Result<Self, MapError> {
        let mut library = Self::new();
        for json in BUNDLED_MAPS {
            library.insert(serde_json::from_str(json)?)?;
        }
        log::info!("Loaded {} bundled maps", library.maps.len());
        Ok(library)
    }

    /// Add or replace a map. Rejected maps leave the library unchanged.
    pub fn insert(&mut self, map: MapDefinition) -> Result<(), MapError> {
        map.validate()?;
        self.maps.insert(map.id.clone(), map);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Result<&MapDefinition, MapError> {
        self.maps
            .get(id)
            .ok_or_else(|| MapError::UnknownMap(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.maps.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }
}
