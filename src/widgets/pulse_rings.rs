/// Concentric rings that breathe at the regime's pace
///
/// Each ring grows by `RING_GROWTH` canvas units and fades out, then returns,
/// once per period. Rings start one second apart. They are drawn only into
/// empty cells so particles stay on top.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::widgets::Widget;
use std::f64::consts::TAU;
use std::time::Duration;

use crate::screensaver::{Regime, Rgb};
use crate::widgets::{CELL_HEIGHT, CELL_WIDTH};

/// Base period at speed multiplier 1
const BASE_PERIOD_SECS: f64 = 4.0;
const RING_GROWTH: f64 = 100.0;
const RING_GLYPH: &str = "·";

/// (base radius, base opacity, start delay in seconds)
const RINGS: [(f64, f64, f64); 3] = [(200.0, 0.2, 0.0), (250.0, 0.15, 1.0), (300.0, 0.1, 2.0)];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ring {
    /// Canvas units
    pub radius: f64,
    pub opacity: f64,
}

pub fn ring_period(regime: Regime) -> Duration {
    Duration::from_secs_f64(BASE_PERIOD_SECS / regime.speed_multiplier())
}

/// Ring states at `elapsed` since the screensaver started
pub fn rings_at(regime: Regime, elapsed: Duration) -> [Ring; 3] {
    let period = ring_period(regime).as_secs_f64();
    RINGS.map(|(radius, opacity, delay)| {
        let running = elapsed.as_secs_f64() - delay;
        if running <= 0.0 || period <= 0.0 {
            return Ring { radius, opacity };
        }

        // Out to the peak over the first half, back over the second
        let phase = (running % period) / period;
        let swing = if phase < 0.5 {
            ease_out(phase * 2.0)
        } else {
            1.0 - ease_out(phase * 2.0 - 1.0)
        };

        Ring {
            radius: radius + RING_GROWTH * swing,
            opacity: opacity * (1.0 - swing),
        }
    })
}

fn ease_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

pub struct PulseRings {
    pub rings: [Ring; 3],
    pub color: Rgb,
    pub background: Rgb,
}

impl PulseRings {
    pub fn new(regime: Regime, elapsed: Duration, background: Rgb) -> Self {
        Self {
            rings: rings_at(regime, elapsed),
            color: regime.color(),
            background,
        }
    }
}

fn mix(from: Rgb, to: Rgb, t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Rgb(channel(from.0, to.0), channel(from.1, to.1), channel(from.2, to.2))
}

impl Widget for PulseRings {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cx = area.width as f64 * CELL_WIDTH / 2.0;
        let cy = area.height as f64 * CELL_HEIGHT / 2.0;

        for ring in self.rings {
            if ring.opacity <= 0.005 {
                continue;
            }
            let ink = mix(self.background, self.color, ring.opacity);

            // About one sample per column along the circumference
            let samples = ((TAU * ring.radius / CELL_WIDTH).ceil() as usize).max(16);
            for i in 0..samples {
                let angle = TAU * i as f64 / samples as f64;
                let col = ((cx + ring.radius * angle.cos()) / CELL_WIDTH).floor();
                let row = ((cy + ring.radius * angle.sin()) / CELL_HEIGHT).floor();
                if col < 0.0 || row < 0.0 || col >= area.width as f64 || row >= area.height as f64 {
                    continue;
                }

                let cell = buf.get_mut(area.x + col as u16, area.y + row as u16);
                if cell.symbol() == " " {
                    cell.set_symbol(RING_GLYPH).set_fg(ink.into());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgb = Rgb(15, 23, 42);

    #[test]
    fn test_period_follows_speed() {
        assert_eq!(ring_period(Regime::Idle), Duration::from_secs_f64(4.0 / Regime::Idle.speed_multiplier()));
        assert!(ring_period(Regime::Intense) < ring_period(Regime::Idle));
    }

    #[test]
    fn test_rings_rest_before_their_delay() {
        let rings = rings_at(Regime::Normal, Duration::from_millis(500));
        assert_eq!(rings[1], Ring { radius: 250.0, opacity: 0.15 });
        assert_eq!(rings[2], Ring { radius: 300.0, opacity: 0.1 });
        assert!(rings[0].radius > 200.0);
    }

    #[test]
    fn test_ring_peaks_mid_period_and_returns() {
        let half = ring_period(Regime::Idle) / 2;
        let peak = rings_at(Regime::Idle, half)[0];
        assert!((peak.radius - 300.0).abs() < 1e-6);
        assert!(peak.opacity.abs() < 1e-9);

        let full = rings_at(Regime::Idle, ring_period(Regime::Idle))[0];
        assert!((full.radius - 200.0).abs() < 1e-6);
    }

    #[test]
    fn test_ring_phase_depends_on_regime() {
        let elapsed = Duration::from_millis(700);
        let idle = rings_at(Regime::Idle, elapsed)[0];
        let intense = rings_at(Regime::Intense, elapsed)[0];
        assert_ne!(idle.radius, intense.radius);
    }

    #[test]
    fn test_rings_draw_into_empty_cells_only() {
        let area = Rect::new(0, 0, 80, 40);
        let mut buf = Buffer::empty(area);
        buf.get_mut(65, 20).set_symbol("●");

        PulseRings::new(Regime::Busy, Duration::ZERO, BG).render(area, &mut buf);

        // Innermost ring at rest: 200 units right of center is column 65
        assert_eq!(buf.get(65, 20).symbol(), "●");
        let ring_cells = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .filter(|&(x, y)| buf.get(x, y).symbol() == RING_GLYPH)
            .count();
        assert!(ring_cells > 0);

        let expected: ratatui::style::Color = mix(BG, Regime::Busy.color(), 0.2).into();
        assert_eq!(buf.get(15, 20).fg, expected);
    }
}
