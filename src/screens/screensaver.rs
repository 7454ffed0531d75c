/// Screensaver screen: particle canvas plus the host overlay

use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use std::time::Duration;

use crate::core::telemetry::{sanitize_percent, TelemetrySnapshot};
use crate::screensaver::controller::BACKGROUND;
use crate::screensaver::{Regime, Rgb};
use crate::utils::format_uptime;
use crate::widgets::{PulseRings, TrailCanvas, CELL_HEIGHT, CELL_WIDTH};

const ORB_WIDTH: u16 = 14;
const ORB_HEIGHT: u16 = 4;

/// Looping path through four keyframes spread evenly over `period`
#[derive(Debug, Clone, Copy)]
pub struct Keyframes {
    pub xs: [f64; 4],
    pub ys: [f64; 4],
    pub period: Duration,
}

impl Keyframes {
    /// Offset in canvas units at `elapsed`, eased in and out per segment
    pub fn offset_at(&self, elapsed: Duration) -> (f64, f64) {
        let period = self.period.as_secs_f64();
        if period <= 0.0 {
            return (self.xs[0], self.ys[0]);
        }

        let phase = (elapsed.as_secs_f64() % period) / period;
        let segments = (self.xs.len() - 1) as f64;
        let position = phase * segments;
        let index = (position.floor() as usize).min(self.xs.len() - 2);
        let t = ease_in_out(position - index as f64);

        (
            lerp(self.xs[index], self.xs[index + 1], t),
            lerp(self.ys[index], self.ys[index + 1], t),
        )
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

fn ease_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrbKind {
    Cpu,
    Memory,
    Network,
}

impl OrbKind {
    pub fn all() -> [OrbKind; 3] {
        [OrbKind::Cpu, OrbKind::Memory, OrbKind::Network]
    }

    fn title(&self) -> &'static str {
        match self {
            OrbKind::Cpu => "CPU",
            OrbKind::Memory => "MEM",
            OrbKind::Network => "NET",
        }
    }

    /// Resting spot as fractions of the screen
    fn anchor(&self) -> (f64, f64) {
        match self {
            OrbKind::Cpu => (0.25, 0.25),
            OrbKind::Memory => (2.0 / 3.0, 1.0 / 3.0),
            OrbKind::Network => (0.5, 2.0 / 3.0),
        }
    }

    pub fn path(&self) -> Keyframes {
        match self {
            OrbKind::Cpu => Keyframes {
                xs: [0.0, 100.0, -50.0, 0.0],
                ys: [0.0, -50.0, 100.0, 0.0],
                period: Duration::from_secs(20),
            },
            OrbKind::Memory => Keyframes {
                xs: [0.0, -80.0, 60.0, 0.0],
                ys: [0.0, 100.0, -80.0, 0.0],
                period: Duration::from_secs(25),
            },
            OrbKind::Network => Keyframes {
                xs: [0.0, 120.0, -100.0, 0.0],
                ys: [0.0, -70.0, 50.0, 0.0],
                period: Duration::from_secs(18),
            },
        }
    }

    fn reading(&self, snapshot: &TelemetrySnapshot) -> String {
        match self {
            OrbKind::Cpu => format!("{:.0}%", sanitize_percent(snapshot.avg_cpu_percent)),
            OrbKind::Memory => format!("{:.0}%", sanitize_percent(snapshot.memory_used_percent)),
            OrbKind::Network => format!("{:.1} MB/s", snapshot.sanitized_throughput()),
        }
    }
}

/// Where an orb sits at `elapsed`, kept fully inside `area`
pub fn orb_rect(kind: OrbKind, area: Rect, elapsed: Duration) -> Rect {
    let width = ORB_WIDTH.min(area.width);
    let height = ORB_HEIGHT.min(area.height);
    let (fx, fy) = kind.anchor();
    let (dx, dy) = kind.path().offset_at(elapsed);

    let x = area.width as f64 * fx + dx / CELL_WIDTH;
    let y = area.height as f64 * fy + dy / CELL_HEIGHT;
    let max_x = area.width.saturating_sub(width) as f64;
    let max_y = area.height.saturating_sub(height) as f64;

    Rect {
        x: area.x + x.round().clamp(0.0, max_x) as u16,
        y: area.y + y.round().clamp(0.0, max_y) as u16,
        width,
        height,
    }
}

pub struct ScreensaverScreen;

impl ScreensaverScreen {
    pub fn render(
        &self,
        frame: &mut Frame,
        canvas: &TrailCanvas,
        snapshot: Option<&TelemetrySnapshot>,
        regime: Regime,
        elapsed: Duration,
    ) {
        let area = frame.size();
        frame.render_widget(canvas, area);
        frame.render_widget(PulseRings::new(regime, elapsed, BACKGROUND), area);

        let Some(snapshot) = snapshot else {
            return;
        };
        let color = regime.color();

        for kind in OrbKind::all() {
            self.render_orb(frame, kind, area, snapshot, color, elapsed);
        }
        self.render_center(frame, area, snapshot, regime, color);
    }

    fn render_orb(
        &self,
        frame: &mut Frame,
        kind: OrbKind,
        area: Rect,
        snapshot: &TelemetrySnapshot,
        color: Rgb,
        elapsed: Duration,
    ) {
        let rect = orb_rect(kind, area, elapsed);
        if rect.width < 3 || rect.height < 3 {
            return;
        }

        let orb = Paragraph::new(Line::from(Span::styled(
            kind.reading(snapshot),
            Style::default().fg(color.into()).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(color.into()))
                .title(Span::styled(format!(" {} ", kind.title()), Style::default().fg(color.into())))
                .title_alignment(Alignment::Center),
        );

        frame.render_widget(orb, rect);
    }

    fn render_center(
        &self,
        frame: &mut Frame,
        area: Rect,
        snapshot: &TelemetrySnapshot,
        regime: Regime,
        color: Rgb,
    ) {
        let lines = vec![
            Line::from(Span::styled(
                snapshot.hostname.clone(),
                Style::default().fg(color.into()).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                format!("System {}", regime.label()),
                Style::default().fg(color.into()),
            )),
            Line::from(vec![
                Span::styled(
                    format!("Uptime: {}", format_uptime(snapshot.uptime_seconds)),
                    Style::default().fg(color.into()),
                ),
                Span::raw("    "),
                Span::styled(
                    format!(
                        "{}/{} containers",
                        snapshot.containers_running, snapshot.containers_total
                    ),
                    Style::default().fg(color.into()),
                ),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Press any key to return",
                Style::default().fg(color.into()).add_modifier(Modifier::DIM),
            )),
        ];

        let height = (lines.len() as u16).min(area.height);
        let center = Rect {
            x: area.x,
            y: area.y + (area.height.saturating_sub(height)) / 2,
            width: area.width,
            height,
        };

        frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), center);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn snapshot() -> TelemetrySnapshot {
        TelemetrySnapshot {
            avg_cpu_percent: 85.0,
            memory_used_percent: 90.0,
            network_throughput_mbs: 50.0,
            hostname: "nuc-01".to_string(),
            uptime_seconds: 90_061,
            containers_running: 3,
            containers_total: 5,
        }
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer.get(x, y).symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_keyframes_hit_each_key_and_loop() {
        let path = OrbKind::Cpu.path();
        assert_eq!(path.offset_at(Duration::ZERO), (0.0, 0.0));

        let (x, y) = path.offset_at(Duration::from_secs_f64(20.0 / 3.0));
        assert!((x - 100.0).abs() < 1e-6 && (y + 50.0).abs() < 1e-6);

        let (x, y) = path.offset_at(Duration::from_secs_f64(40.0 / 3.0));
        assert!((x + 50.0).abs() < 1e-6 && (y - 100.0).abs() < 1e-6);

        // Period wraps back to the start
        let (x, y) = path.offset_at(Duration::from_secs(20));
        assert!(x.abs() < 1e-9 && y.abs() < 1e-9);
    }

    #[test]
    fn test_keyframe_periods() {
        assert_eq!(OrbKind::Cpu.path().period, Duration::from_secs(20));
        assert_eq!(OrbKind::Memory.path().period, Duration::from_secs(25));
        assert_eq!(OrbKind::Network.path().period, Duration::from_secs(18));
    }

    #[test]
    fn test_orbs_stay_on_screen() {
        let area = Rect::new(0, 0, 40, 12);
        for kind in OrbKind::all() {
            for step in 0..100 {
                let rect = orb_rect(kind, area, Duration::from_millis(step * 250));
                assert!(rect.right() <= area.right());
                assert!(rect.bottom() <= area.bottom());
            }
        }
    }

    #[test]
    fn test_overlay_text() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let canvas = TrailCanvas::new(100, 30, BACKGROUND).unwrap();
        let snapshot = snapshot();

        terminal
            .draw(|f| {
                ScreensaverScreen.render(f, &canvas, Some(&snapshot), Regime::Intense, Duration::ZERO)
            })
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("nuc-01"));
        assert!(text.contains("System intense"));
        assert!(text.contains("Uptime: 1d 1h 1m"));
        assert!(text.contains("3/5 containers"));
        assert!(text.contains("50.0 MB/s"));
    }

    #[test]
    fn test_overlay_uses_regime_color() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let canvas = TrailCanvas::new(100, 30, BACKGROUND).unwrap();
        let snapshot = snapshot();

        terminal
            .draw(|f| ScreensaverScreen.render(f, &canvas, Some(&snapshot), Regime::Idle, Duration::ZERO))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let hostname_cell = (0..buffer.area.width - 1)
            .flat_map(|x| (0..buffer.area.height).map(move |y| (x, y)))
            .find(|&(x, y)| buffer.get(x, y).symbol() == "n" && buffer.get(x + 1, y).symbol() == "u")
            .map(|(x, y)| buffer.get(x, y).fg);

        assert_eq!(hostname_cell, Some(Regime::Idle.color().into()));
    }

    #[test]
    fn test_malformed_readings_are_sanitized() {
        let snapshot = TelemetrySnapshot {
            avg_cpu_percent: f64::NAN,
            memory_used_percent: 250.0,
            network_throughput_mbs: -3.0,
            ..snapshot()
        };

        assert_eq!(OrbKind::Cpu.reading(&snapshot), "0%");
        assert_eq!(OrbKind::Memory.reading(&snapshot), "100%");
        assert_eq!(OrbKind::Network.reading(&snapshot), "0.0 MB/s");
    }

    #[test]
    fn test_rings_drawn_around_center() {
        let mut terminal = Terminal::new(TestBackend::new(100, 40)).unwrap();
        let canvas = TrailCanvas::new(100, 40, BACKGROUND).unwrap();

        terminal
            .draw(|f| ScreensaverScreen.render(f, &canvas, None, Regime::Normal, Duration::ZERO))
            .unwrap();

        // Innermost ring at rest: 200 canvas units (25 columns) left of center
        let buffer = terminal.backend().buffer();
        assert_eq!(buffer.get(25, 20).symbol(), "·");
    }
}
