/// Terminal implementation of the screensaver `Surface`
///
/// Keeps a color per terminal cell and blends every draw call into it, so
/// the low-alpha fade each frame leaves motion trails the same way a
/// translucent overpaint does on a pixel canvas. Canvas units map onto cells
/// at `CELL_WIDTH` x `CELL_HEIGHT`.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;

use crate::screensaver::{Rgb, Surface, Vec2, Viewport};

/// Canvas units per terminal column
pub const CELL_WIDTH: f64 = 8.0;
/// Canvas units per terminal row (cells are roughly twice as tall as wide)
pub const CELL_HEIGHT: f64 = 16.0;

/// Glyphs by ink intensity, strongest first
const GLYPHS: [(f32, &str); 4] = [(0.45, "●"), (0.25, "•"), (0.10, "∙"), (0.04, "·")];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Texel {
    r: f32,
    g: f32,
    b: f32,
}

impl Texel {
    fn from_rgb(c: Rgb) -> Self {
        Self {
            r: c.0 as f32,
            g: c.1 as f32,
            b: c.2 as f32,
        }
    }

    fn blend(&mut self, c: Rgb, alpha: f32) {
        let a = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
        self.r += (c.0 as f32 - self.r) * a;
        self.g += (c.1 as f32 - self.g) * a;
        self.b += (c.2 as f32 - self.b) * a;
    }

    fn to_rgb(self) -> Rgb {
        Rgb(
            self.r.round().clamp(0.0, 255.0) as u8,
            self.g.round().clamp(0.0, 255.0) as u8,
            self.b.round().clamp(0.0, 255.0) as u8,
        )
    }
}

#[derive(Debug, Clone)]
pub struct TrailCanvas {
    cols: u16,
    rows: u16,
    background: Rgb,
    texels: Vec<Texel>,
}

impl TrailCanvas {
    /// `None` when the area has no cells to draw into
    pub fn new(cols: u16, rows: u16, background: Rgb) -> Option<Self> {
        if cols == 0 || rows == 0 {
            return None;
        }
        Some(Self {
            cols,
            rows,
            background,
            texels: vec![Texel::from_rgb(background); cols as usize * rows as usize],
        })
    }

    pub fn for_area(area: Rect, background: Rgb) -> Option<Self> {
        Self::new(area.width, area.height, background)
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    /// Blended color of a cell
    pub fn color_at(&self, col: u16, row: u16) -> Option<Rgb> {
        self.index(col as i64, row as i64).map(|i| self.texels[i].to_rgb())
    }

    /// How far a cell has moved away from the background, in `[0, 1]`
    pub fn intensity_at(&self, col: u16, row: u16) -> f32 {
        self.index(col as i64, row as i64)
            .map(|i| self.intensity(&self.texels[i]))
            .unwrap_or(0.0)
    }

    fn intensity(&self, texel: &Texel) -> f32 {
        let bg = Texel::from_rgb(self.background);
        let d = (texel.r - bg.r)
            .abs()
            .max((texel.g - bg.g).abs())
            .max((texel.b - bg.b).abs());
        (d / 255.0).clamp(0.0, 1.0)
    }

    fn index(&self, col: i64, row: i64) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.cols as i64 || row >= self.rows as i64 {
            return None;
        }
        Some(row as usize * self.cols as usize + col as usize)
    }

    fn cell_of(point: Vec2) -> Option<(i64, i64)> {
        if !point.x.is_finite() || !point.y.is_finite() {
            return None;
        }
        Some((
            (point.x / CELL_WIDTH).floor() as i64,
            (point.y / CELL_HEIGHT).floor() as i64,
        ))
    }

    fn blend_cell(&mut self, col: i64, row: i64, color: Rgb, alpha: f32) {
        if let Some(i) = self.index(col, row) {
            self.texels[i].blend(color, alpha);
        }
    }
}

impl Surface for TrailCanvas {
    fn viewport(&self) -> Viewport {
        Viewport {
            width: self.cols as f64 * CELL_WIDTH,
            height: self.rows as f64 * CELL_HEIGHT,
        }
    }

    fn fade(&mut self, color: Rgb, alpha: f32) {
        for texel in &mut self.texels {
            texel.blend(color, alpha);
        }
    }

    fn line(&mut self, from: Vec2, to: Vec2, color: Rgb, alpha: f32) {
        let (Some(start), Some(_)) = (Self::cell_of(from), Self::cell_of(to)) else {
            return;
        };

        // Sample at cell resolution; each cell is blended once per line
        let dx = to.x - from.x;
        let dy = to.y - from.y;
        let steps = (dx.abs() / CELL_WIDTH)
            .max(dy.abs() / CELL_HEIGHT)
            .ceil()
            .max(1.0) as usize;

        let mut last = None;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let cell = Self::cell_of(Vec2::new(from.x + dx * t, from.y + dy * t)).unwrap_or(start);
            if last != Some(cell) {
                self.blend_cell(cell.0, cell.1, color, alpha);
                last = Some(cell);
            }
        }
    }

    fn dot(&mut self, center: Vec2, radius: f64, color: Rgb, alpha: f32) {
        let Some((col, row)) = Self::cell_of(center) else {
            return;
        };
        self.blend_cell(col, row, color, alpha);

        // Neighbouring cells whose centers fall inside the dot
        let reach_x = (radius / CELL_WIDTH).ceil() as i64;
        let reach_y = (radius / CELL_HEIGHT).ceil() as i64;
        for r in (row - reach_y)..=(row + reach_y) {
            for c in (col - reach_x)..=(col + reach_x) {
                if (c, r) == (col, row) {
                    continue;
                }
                let cell_center = Vec2::new(
                    (c as f64 + 0.5) * CELL_WIDTH,
                    (r as f64 + 0.5) * CELL_HEIGHT,
                );
                if cell_center.distance(center) <= radius {
                    self.blend_cell(c, r, color, alpha);
                }
            }
        }
    }
}

impl Widget for &TrailCanvas {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bg: Color = self.background.into();
        let width = area.width.min(self.cols);
        let height = area.height.min(self.rows);

        for row in 0..height {
            for col in 0..width {
                let Some(i) = self.index(col as i64, row as i64) else {
                    continue;
                };
                let texel = &self.texels[i];
                let intensity = self.intensity(texel);
                let glyph = GLYPHS
                    .iter()
                    .find(|(threshold, _)| intensity >= *threshold)
                    .map(|(_, g)| *g)
                    .unwrap_or(" ");

                buf.get_mut(area.x + col, area.y + row)
                    .set_symbol(glyph)
                    .set_fg(texel.to_rgb().into())
                    .set_bg(bg);
            }
        }
    }
}
