//! Viewport camera
//!
//! Centers on a tile and clamps to the map's pixel bounds. No smoothing:
//! the offset is a pure function of the target and the map size.

use glam::Vec2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Camera {
    /// Pixel offset of the viewport's top-left corner
    pub x: i32,
    pub y: i32,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub tile_size: u32,
}

impl Camera {
    pub fn new(viewport_width: u32, viewport_height: u32, tile_size: u32) -> Self {
        Self {
            x: 0,
            y: 0,
            viewport_width,
            viewport_height,
            tile_size,
        }
    }

    /// Center on tile `(target_x, target_y)` of a `map_width` x `map_height`
    /// tile map, clamped so the viewport never shows past the map edge
    pub fn follow(&mut self, target_x: i32, target_y: i32, map_width: u32, map_height: u32) {
        let ts = self.tile_size as f32;
        let viewport = Vec2::new(self.viewport_width as f32, self.viewport_height as f32);
        let map_px = Vec2::new(map_width as f32, map_height as f32) * ts;

        let target_center = Vec2::new(target_x as f32, target_y as f32) * ts + ts / 2.0;
        let max = (map_px - viewport).max(Vec2::ZERO);
        let offset = (target_center - viewport / 2.0).clamp(Vec2::ZERO, max).round();

        self.x = offset.x as i32;
        self.y = offset.y as i32;
    }

    /// Largest valid offset per axis for a map
    pub fn max_offset(&self, map_width: u32, map_height: u32) -> (i32, i32) {
        let max_x = (map_width * self.tile_size).saturating_sub(self.viewport_width);
        let max_y = (map_height * self.tile_size).saturating_sub(self.viewport_height);
        (max_x as i32, max_y as i32)
    }
}
