//! Canvas 2D surface (wasm only)

use web_sys::CanvasRenderingContext2d;

use super::Surface;
use crate::Rgb;

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    /// Device pixel ratio applied to every coordinate
    scale: f64,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d, scale: f64) -> Self {
        ctx.set_text_align("center");
        ctx.set_text_baseline("middle");
        Self { ctx, scale }
    }

    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }
}

impl Surface for CanvasSurface {
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb) {
        let s = self.scale;
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx
            .fill_rect(x as f64 * s, y as f64 * s, w as f64 * s, h as f64 * s);
    }

    fn draw_glyph(&mut self, glyph: &str, cx: f32, cy: f32, size: f32) {
        let s = self.scale;
        self.ctx.set_font(&format!("{}px sans-serif", (size as f64 * s).round()));
        self.ctx.set_fill_style_str("#000000");
        if let Err(err) = self.ctx.fill_text(glyph, cx as f64 * s, cy as f64 * s) {
            log::debug!("fill_text failed: {:?}", err);
        }
    }
}
