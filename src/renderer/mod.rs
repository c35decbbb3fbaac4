//! Rendering boundary
//!
//! The simulation draws through [`Surface`], two primitives in viewport
//! pixel space. Hosts supply the backend: a 2D canvas on wasm, a character
//! grid natively. Nothing here mutates game state.

#[cfg(target_arch = "wasm32")]
pub mod canvas;
pub mod text;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;
pub use text::TextSurface;

use crate::Rgb;
use crate::sim::state::{GamePhase, GameState};

/// Glyph drawn for the player
pub const PLAYER_SPRITE: &str = "🧝";

/// Draw target for map and entity glyphs
pub trait Surface {
    /// Solid rectangle, top-left anchored
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb);
    /// Glyph centered on `(cx, cy)`, `size` pixels tall
    fn draw_glyph(&mut self, glyph: &str, cx: f32, cy: f32, size: f32);
}

/// A recorded draw primitive
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    FillRect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        color: Rgb,
    },
    Glyph {
        glyph: String,
        cx: f32,
        cy: f32,
        size: f32,
    },
}

/// Surface that just records what was drawn
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub calls: Vec<DrawCall>,
}

impl RecordingSurface {
    /// Glyphs in draw order
    pub fn glyphs(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Glyph { glyph, .. } => Some(glyph.as_str()),
                DrawCall::FillRect { .. } => None,
            })
            .collect()
    }
}

impl Surface for RecordingSurface {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        self.calls.push(DrawCall::FillRect { x, y, w, h, color });
    }

    fn draw_glyph(&mut self, glyph: &str, cx: f32, cy: f32, size: f32) {
        self.calls.push(DrawCall::Glyph {
            glyph: glyph.to_string(),
            cx,
            cy,
            size,
        });
    }
}

/// Compose one frame: visible map through the camera, then the player
pub fn render_frame(state: &GameState, surface: &mut dyn Surface) {
    let config = state.config();
    let ts = config.tile_size as f32;
    let vx = state.camera.x as f32;
    let vy = state.camera.y as f32;
    let vw = config.viewport_width as f32;
    let vh = config.viewport_height as f32;

    surface.fill_rect(0.0, 0.0, vw, vh, Rgb::BLACK);
    state.map.render(surface, vx, vy, vw, vh);

    let pos = state.player.pos();
    let cx = pos.x as f32 * ts - vx + ts / 2.0;
    let cy = pos.y as f32 * ts - vy + ts / 2.0;
    surface.draw_glyph(PLAYER_SPRITE, cx, cy, ts * 0.8);
}

/// Side panel text: area, quests, inventory, steps
pub fn hud_lines(state: &GameState) -> Vec<String> {
    let mut lines = vec![state.map.name().to_string()];

    if state.quests.quests().is_empty() {
        lines.push("No quests here".to_string());
    }
    for quest in state.quests.quests() {
        let mark = if quest.completed { "✔" } else { "•" };
        lines.push(format!("{} {}", mark, quest.progress_text()));
    }

    let items = state.inventory.get_all();
    if items.is_empty() {
        lines.push("Inventory: empty".to_string());
    } else {
        let held: Vec<String> = items
            .iter()
            .map(|(id, count)| format!("{} x{}", id, count))
            .collect();
        lines.push(format!("Inventory: {}", held.join(", ")));
    }

    lines.push(format!("Steps: {}", state.player.steps()));
    match state.phase {
        GamePhase::Paused => lines.push("PAUSED".to_string()),
        GamePhase::Finished => lines.push("The kingdom is explored!".to_string()),
        GamePhase::Exploring => {}
    }
    lines
}

/// Dialog box text, when a dialog is open
pub fn dialog_text(state: &GameState) -> Option<String> {
    let line = state.dialog.current()?;
    Some(format!(
        "{}: {} ({}/{})",
        line.speaker,
        line.message,
        line.index + 1,
        line.total
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::map::{MapLibrary, fixtures};
    use crate::sim::state::SimConfig;
    use crate::sim::tick::{TickInput, tick};
    use crate::Direction;

    fn state() -> GameState {
        let mut def = fixtures::meadow();
        def.entities.push(fixtures::item("g1", "gem", 6, 5));
        def.entities.push(fixtures::npc("Nimbus", 5, 4, &["Hello there"]));
        def.quests.push(fixtures::collect_quest("gems", "gem", 2));
        let mut library = MapLibrary::new();
        library.insert(def).unwrap();
        GameState::new(library, SimConfig::default(), "meadow").unwrap()
    }

    #[test]
    fn test_player_drawn_last_at_camera_offset() {
        let state = state();
        let mut surface = RecordingSurface::default();
        render_frame(&state, &mut surface);

        let last = surface.calls.last().unwrap();
        let ts = 32.0;
        let expected_cx = 5.0 * ts - state.camera.x as f32 + ts / 2.0;
        let expected_cy = 5.0 * ts - state.camera.y as f32 + ts / 2.0;
        assert_eq!(
            *last,
            DrawCall::Glyph {
                glyph: PLAYER_SPRITE.to_string(),
                cx: expected_cx,
                cy: expected_cy,
                size: ts * 0.8,
            }
        );
        // Frame starts by clearing the viewport
        assert!(matches!(
            surface.calls.first(),
            Some(DrawCall::FillRect { color: Rgb::BLACK, .. })
        ));
    }

    #[test]
    fn test_render_does_not_mutate_state() {
        let state = state();
        let before = (state.player.pos(), state.camera, state.map.entities().len());
        let mut surface = RecordingSurface::default();
        render_frame(&state, &mut surface);
        render_frame(&state, &mut surface);
        assert_eq!(
            before,
            (state.player.pos(), state.camera, state.map.entities().len())
        );
    }

    #[test]
    fn test_hud_tracks_progress() {
        let mut state = state();
        tick(&mut state, &TickInput::step(Direction::Right));
        let hud = hud_lines(&state);
        assert_eq!(hud[0], "Test Meadow");
        assert!(hud.contains(&"• Collect 2 gem: 1/2".to_string()));
        assert!(hud.contains(&"Inventory: gem x1".to_string()));
        assert!(hud.contains(&"Steps: 1".to_string()));
    }

    #[test]
    fn test_dialog_text() {
        let mut state = state();
        assert_eq!(dialog_text(&state), None);
        tick(&mut state, &TickInput::interact());
        assert_eq!(
            dialog_text(&state).as_deref(),
            Some("Nimbus: Hello there (1/1)")
        );
    }
}
