// Custom widgets; everything else is drawn inline with ratatui primitives
pub mod pulse_rings;
pub mod trail_canvas;

pub use pulse_rings::PulseRings;
pub use trail_canvas::{TrailCanvas, CELL_HEIGHT, CELL_WIDTH};
