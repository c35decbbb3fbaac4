//! Tile map engine
//!
//! Owns the working copy of the current area: the resolved tile grid and
//! the live entity list. Lookups never fail; anything off the grid is void.

use glam::IVec2;

use super::map::{Entity, ExitPoint, MapDefinition, QuestSpec};
use super::tiles::{self, TileType, VOID};
use crate::Direction;
use crate::renderer::Surface;

/// Glyph drawn on the exit tile
pub const EXIT_SPRITE: &str = "🚪";

/// An entity the player can talk to, with where it stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interactable<'a> {
    pub entity: &'a Entity,
    pub pos: IVec2,
}

/// Working map instance built from an immutable template
#[derive(Debug, Clone)]
pub struct TileMapEngine {
    template: MapDefinition,
    /// Resolved tile types, row-major
    grid: Vec<&'static TileType>,
    entities: Vec<Entity>,
    tile_size: u32,
}

impl TileMapEngine {
    pub fn new(template: &MapDefinition, tile_size: u32) -> Self {
        let template = template.clone();
        let mut grid = Vec::with_capacity((template.width * template.height) as usize);
        for y in 0..template.height as i32 {
            for x in 0..template.width as i32 {
                let tile = template
                    .tile_name_at(x, y)
                    .map(tiles::tile_type_or_void)
                    .unwrap_or(&VOID);
                grid.push(tile);
            }
        }
        let entities = template.entities.clone();

        Self {
            template,
            grid,
            entities,
            tile_size,
        }
    }

    pub fn id(&self) -> &str {
        &self.template.id
    }

    pub fn name(&self) -> &str {
        &self.template.name
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.template.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.template.height
    }

    #[inline]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn player_start(&self) -> IVec2 {
        self.template.player_start.as_ivec2()
    }

    pub fn exit_point(&self) -> Option<&ExitPoint> {
        self.template.exit_point.as_ref()
    }

    pub fn quests(&self) -> &[QuestSpec] {
        &self.template.quests
    }

    /// Tile at a cell; void for anything outside the grid
    pub fn get_tile(&self, x: i32, y: i32) -> &'static TileType {
        if !self.template.in_bounds(x, y) {
            return &VOID;
        }
        let index = y as usize * self.width() as usize + x as usize;
        self.grid.get(index).copied().unwrap_or(&VOID)
    }

    #[inline]
    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        self.get_tile(x, y).walkable
    }

    /// Live entities in placement order
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// First entity at exact coordinates
    pub fn get_entity_at(&self, x: i32, y: i32) -> Option<&Entity> {
        self.entities.iter().find(|e| e.x == x && e.y == y)
    }

    /// Remove an entity by id. Absent ids are a no-op.
    pub fn remove_entity(&mut self, id: &str) -> Option<Entity> {
        let index = self.entities.iter().position(|e| e.id == id)?;
        Some(self.entities.remove(index))
    }

    /// Put back an entity previously taken with `remove_entity`
    pub fn restore_entity(&mut self, entity: Entity) {
        if self.entities.iter().any(|e| e.id == entity.id) {
            log::warn!("Entity '{}' already on map '{}'", entity.id, self.id());
            return;
        }
        self.entities.push(entity);
    }

    /// First NPC or interactive entity on a cell adjacent to `(x, y)`,
    /// scanning up, down, left, right
    pub fn get_interactable_at(&self, x: i32, y: i32) -> Option<Interactable<'_>> {
        let origin = IVec2::new(x, y);
        Direction::ALL.iter().find_map(|dir| {
            let pos = origin + dir.delta();
            let entity = self.get_entity_at(pos.x, pos.y)?;
            let interactive =
                entity.is_npc() || entity.interactive || self.get_tile(pos.x, pos.y).interactive;
            interactive.then_some(Interactable { entity, pos })
        })
    }

    /// Draw the visible part of the map into `surface`.
    ///
    /// The viewport is given in map pixel space; everything is drawn
    /// relative to its top-left corner.
    pub fn render(&self, surface: &mut dyn Surface, vx: f32, vy: f32, vw: f32, vh: f32) {
        let ts = self.tile_size as f32;
        let glyph_size = ts * 0.8;

        let start_col = (vx / ts).floor().max(0.0) as i32;
        let start_row = (vy / ts).floor().max(0.0) as i32;
        let end_col = (((vx + vw) / ts).ceil() as i32).min(self.width() as i32);
        let end_row = (((vy + vh) / ts).ceil() as i32).min(self.height() as i32);

        for y in start_row..end_row {
            for x in start_col..end_col {
                let tile = self.get_tile(x, y);
                let sx = x as f32 * ts - vx;
                let sy = y as f32 * ts - vy;
                if let Some(color) = tile.color {
                    surface.fill_rect(sx, sy, ts, ts, color);
                }
                if !tile.sprite.trim().is_empty() {
                    surface.draw_glyph(tile.sprite, sx + ts / 2.0, sy + ts / 2.0, glyph_size);
                }
            }
        }

        let visible = |pos: IVec2| -> Option<(f32, f32)> {
            let sx = pos.x as f32 * ts - vx;
            let sy = pos.y as f32 * ts - vy;
            (sx > -ts && sx < vw && sy > -ts && sy < vh).then_some((sx, sy))
        };

        for entity in &self.entities {
            if let Some((sx, sy)) = visible(entity.pos()) {
                surface.draw_glyph(&entity.sprite, sx + ts / 2.0, sy + ts / 2.0, glyph_size);
            }
        }

        if let Some((sx, sy)) = self.exit_point().and_then(|exit| visible(exit.pos())) {
            surface.draw_glyph(EXIT_SPRITE, sx + ts / 2.0, sy + ts / 2.0, glyph_size);
        }
    }

    /// Restore pristine entity placement from the template
    pub fn reset(&mut self) {
        self.entities = self.template.entities.clone();
        log::debug!("Map '{}' reset ({} entities)", self.id(), self.entities.len());
    }
}
