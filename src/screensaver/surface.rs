/// Drawing primitives shared by the particle simulation and its renderers
///
/// The simulation never talks to the terminal directly; it draws through the
/// `Surface` trait so the same frame logic can target the terminal canvas or a
/// mock in tests.

/// 2D point or vector in canvas units
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Vec2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// 24-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Hex notation, e.g. `#00FF88`
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl From<Rgb> for ratatui::style::Color {
    fn from(c: Rgb) -> Self {
        ratatui::style::Color::Rgb(c.0, c.1, c.2)
    }
}

/// Dimensions of the drawing surface in canvas units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    /// Returns `None` when no usable surface can be built from the dimensions
    pub fn new(width: f64, height: f64) -> Option<Self> {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Some(Self { width, height })
        } else {
            None
        }
    }
}

/// A 2D surface the screensaver composites into.
///
/// Alpha values are in `[0, 1]`; implementations blend over existing content
/// rather than replacing it.
#[cfg_attr(test, mockall::automock)]
pub trait Surface {
    /// Size of the surface in canvas units
    fn viewport(&self) -> Viewport;

    /// Overpaint the whole surface with `color` at `alpha` (motion trails)
    fn fade(&mut self, color: Rgb, alpha: f32);

    /// Straight line between two canvas points
    fn line(&mut self, from: Vec2, to: Vec2, color: Rgb, alpha: f32);

    /// Filled dot centered on `center`
    fn dot(&mut self, center: Vec2, radius: f64, color: Rgb, alpha: f32);
}
