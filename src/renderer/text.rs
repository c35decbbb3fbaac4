//! Character-grid surface for terminals and tests

use super::Surface;
use crate::Rgb;

/// One cell per tile; the last glyph drawn into a cell wins
#[derive(Debug, Clone)]
pub struct TextSurface {
    cols: usize,
    rows: usize,
    cell_size: f32,
    cells: Vec<String>,
}

impl TextSurface {
    pub fn new(viewport_width: u32, viewport_height: u32, tile_size: u32) -> Self {
        let tile_size = tile_size.max(1);
        let cols = (viewport_width / tile_size) as usize;
        let rows = (viewport_height / tile_size) as usize;
        Self {
            cols,
            rows,
            cell_size: tile_size as f32,
            cells: vec![" ".to_string(); cols * rows],
        }
    }

    pub fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = " ".to_string());
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<&str> {
        if col >= self.cols || row >= self.rows {
            return None;
        }
        self.cells.get(row * self.cols + col).map(String::as_str)
    }

    /// The grid as newline separated rows
    pub fn to_text(&self) -> String {
        self.cells
            .chunks(self.cols.max(1))
            .map(|row| row.concat())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn cell_index(&self, x: f32, y: f32) -> Option<usize> {
        if x < 0.0 || y < 0.0 {
            return None;
        }
        let col = (x / self.cell_size) as usize;
        let row = (y / self.cell_size) as usize;
        (col < self.cols && row < self.rows).then_some(row * self.cols + col)
    }
}

impl Surface for TextSurface {
    // Colors have no text form; a fill only blanks the cells it covers
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, _color: Rgb) {
        let mut cy = y;
        while cy < y + h {
            let mut cx = x;
            while cx < x + w {
                if let Some(i) = self.cell_index(cx, cy) {
                    self.cells[i] = " ".to_string();
                }
                cx += self.cell_size;
            }
            cy += self.cell_size;
        }
    }

    fn draw_glyph(&mut self, glyph: &str, cx: f32, cy: f32, _size: f32) {
        if let Some(i) = self.cell_index(cx, cy) {
            self.cells[i] = glyph.to_string();
        }
    }
}
