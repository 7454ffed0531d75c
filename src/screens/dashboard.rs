/// Main dashboard screen

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, Wrap},
    Frame,
};
use std::time::Duration;

use crate::core::feed::ConnectionStatus;
use crate::core::telemetry::{sanitize_percent, SystemMetrics, TelemetrySnapshot};
use crate::screensaver::Regime;
use crate::utils::{
    format_bytes, format_duration, format_uptime, truncate_string, usage_color, ContainerState,
};

/// Everything the dashboard needs for one draw
pub struct DashboardView<'a> {
    pub metrics: Option<&'a SystemMetrics>,
    pub snapshot: Option<&'a TelemetrySnapshot>,
    pub selected_index: usize,
    pub status_message: Option<&'a str>,
    pub idle_remaining: Duration,
    pub show_help: bool,
    /// "local" or the remote server URL
    pub source: &'a str,
    pub connection: &'a ConnectionStatus,
}

pub struct Dashboard {
    title: String,
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            title: "Pulse Dashboard".to_string(),
        }
    }

    pub fn render(&self, frame: &mut Frame, view: &DashboardView) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Header
                Constraint::Length(3), // Gauges
                Constraint::Min(6),    // Containers + disks
                Constraint::Length(3), // Footer
            ])
            .split(frame.size());

        match view.metrics {
            Some(metrics) => {
                self.render_header(frame, chunks[0], metrics, view);
                self.render_gauges(frame, chunks[1], metrics, view.snapshot);

                let body = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
                    .split(chunks[2]);
                self.render_containers(frame, body[0], metrics, view.selected_index);
                self.render_disks(frame, body[1], metrics);
            }
            None => {
                let message = match view.connection {
                    ConnectionStatus::Error(error) => {
                        format!("Cannot reach {}: {}", view.source, error)
                    }
                    _ => format!("Waiting for metrics from {}...", view.source),
                };
                let waiting = Paragraph::new(message)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::DarkGray))
                    .block(Block::default().borders(Borders::ALL).title(self.title.as_str()));
                frame.render_widget(waiting, chunks[0].union(chunks[2]));
            }
        }

        self.render_footer(frame, chunks[3], view);

        if view.show_help {
            self.render_help(frame);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect, metrics: &SystemMetrics, view: &DashboardView) {
        let host = &metrics.host;

        let regime = view
            .snapshot
            .map(|s| Regime::from_load(s.average_load()))
            .unwrap_or(Regime::Idle);

        let title_line = Line::from(vec![
            Span::styled(
                format!("{} ", self.title),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                host.hostname.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled("State: ", Style::default().fg(Color::Gray)),
            Span::styled(
                regime.label(),
                Style::default().fg(regime.color().into()).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" | "),
            Span::styled("Source: ", Style::default().fg(Color::Gray)),
            Span::styled(view.source, Style::default().fg(Color::DarkGray)),
            Span::raw(" "),
            connection_badge(view.connection),
        ]);

        let mut system_spans = vec![
            Span::styled("OS: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!("{} {}", host.os, host.platform),
                Style::default().fg(Color::White),
            ),
            Span::raw(" | "),
            Span::styled("Arch: ", Style::default().fg(Color::Gray)),
            Span::styled(host.architecture.clone(), Style::default().fg(Color::White)),
            Span::raw(" | "),
            Span::styled("Uptime: ", Style::default().fg(Color::Gray)),
            Span::styled(format_uptime(host.uptime), Style::default().fg(Color::White)),
            Span::raw(" | "),
            Span::styled("Power: ", Style::default().fg(Color::Gray)),
            Span::styled(
                format!(
                    "~{}W ({})",
                    host.power.estimated_watts, host.power.power_efficiency
                ),
                Style::default().fg(Color::Green),
            ),
        ];

        if let Some(k8s) = &host.kubernetes {
            system_spans.push(Span::raw(" | "));
            system_spans.push(Span::styled("Node: ", Style::default().fg(Color::Gray)));
            system_spans.push(Span::styled(
                format!("{} ({})", k8s.node_name, k8s.node_role),
                Style::default().fg(Color::Cyan),
            ));
        }

        let header = Paragraph::new(vec![title_line, Line::from(system_spans)])
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));

        frame.render_widget(header, area);
    }

    fn render_gauges(
        &self,
        frame: &mut Frame,
        area: Rect,
        metrics: &SystemMetrics,
        snapshot: Option<&TelemetrySnapshot>,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(35),
                Constraint::Percentage(35),
                Constraint::Percentage(30),
            ])
            .split(area);

        let cpu = sanitize_percent(metrics.average_cpu());
        let cpu_title = if metrics.cpu.temperature > 0.0 {
            format!("CPU ({} cores, {:.0}°C)", metrics.cpu.core_count, metrics.cpu.temperature)
        } else {
            format!("CPU ({} cores)", metrics.cpu.core_count)
        };
        frame.render_widget(usage_gauge(cpu_title, cpu), chunks[0]);

        let memory = sanitize_percent(metrics.memory.used_percent);
        let memory_title = format!(
            "Memory ({} / {})",
            format_bytes(metrics.memory.used),
            format_bytes(metrics.memory.total)
        );
        frame.render_widget(usage_gauge(memory_title, memory), chunks[1]);

        let throughput = snapshot.map(|s| s.sanitized_throughput()).unwrap_or(0.0);
        let network = Paragraph::new(Line::from(vec![
            Span::styled(
                format!("{:.2} MB/s", throughput),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!(
                    "  ↑{} ↓{}",
                    format_bytes(metrics.network.bytes_sent),
                    format_bytes(metrics.network.bytes_recv)
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ]))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Network"));
        frame.render_widget(network, chunks[2]);
    }

    fn render_containers(&self, frame: &mut Frame, area: Rect, metrics: &SystemMetrics, selected_index: usize) {
        let docker = &metrics.docker;
        let title = format!(
            "Containers ({}/{} running)",
            docker.running_count, docker.container_count
        );

        if docker.containers.is_empty() {
            let empty = Paragraph::new("No containers (is Docker running?)")
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(empty, area);
            return;
        }

        let header = Row::new(vec!["Name", "State", "Status", "Image", "ID"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .bottom_margin(1);

        let rows: Vec<Row> = docker
            .containers
            .iter()
            .enumerate()
            .map(|(idx, container)| {
                let state = ContainerState::from(container.state.as_str());
                let row = Row::new(vec![
                    Cell::from(truncate_string(&container.name, 24)),
                    Cell::from(Span::styled(state.label(), Style::default().fg(state.color()))),
                    Cell::from(container.status.clone()),
                    Cell::from(truncate_string(&container.image, 28)),
                    Cell::from(Span::styled(container.id.clone(), Style::default().fg(Color::DarkGray))),
                ]);

                if idx == selected_index {
                    row.style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
                } else {
                    row
                }
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(24),
                Constraint::Length(11),
                Constraint::Length(20),
                Constraint::Min(16),
                Constraint::Length(13),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title));

        frame.render_widget(table, area);
    }

    fn render_disks(&self, frame: &mut Frame, area: Rect, metrics: &SystemMetrics) {
        let header = Row::new(vec!["Mount", "Used", "Free", "%"])
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .bottom_margin(1);

        let rows: Vec<Row> = metrics
            .disk
            .iter()
            .map(|disk| {
                Row::new(vec![
                    Cell::from(truncate_string(&disk.path, 16)),
                    Cell::from(format_bytes(disk.used)),
                    Cell::from(format_bytes(disk.free)),
                    Cell::from(Span::styled(
                        format!("{:.0}%", disk.used_percent),
                        Style::default().fg(usage_color(disk.used_percent)),
                    )),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Min(10),
                Constraint::Length(10),
                Constraint::Length(10),
                Constraint::Length(5),
            ],
        )
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Disks"));

        frame.render_widget(table, area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect, view: &DashboardView) {
        let footer_text = if let Some(status) = view.status_message {
            status.to_string()
        } else {
            format!(
                "[↑↓] Select | [s]tart | [x] stop | [R]estart | [z] Screensaver | [?] Help | [q]uit | Screensaver in {}",
                format_duration(view.idle_remaining.as_secs())
            )
        };

        let footer = Paragraph::new(footer_text)
            .alignment(Alignment::Center)
            .style(if view.status_message.is_some() {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            })
            .block(Block::default().borders(Borders::ALL));

        frame.render_widget(footer, area);
    }

    fn render_help(&self, frame: &mut Frame) {
        let area = frame.size();
        let popup_area = centered_rect(area, 64, 20);

        let section = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
        let help_text = vec![
            Line::from(Span::styled(
                "Pulse Dashboard - Keyboard Shortcuts",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled("Containers:", section)),
            Line::from("  [↑ ↓]          Select container"),
            Line::from("  [s]            Start selected container"),
            Line::from("  [x]            Stop selected container"),
            Line::from("  [R]            Restart selected container"),
            Line::from(""),
            Line::from(Span::styled("Screensaver:", section)),
            Line::from("  [z]            Start now"),
            Line::from("  Any key/click  Return to the dashboard"),
            Line::from(""),
            Line::from(Span::styled("General:", section)),
            Line::from("  [?] / [F1]     Toggle this help screen"),
            Line::from("  [q] / [Ctrl+C] Quit"),
            Line::from(""),
            Line::from(Span::styled(
                "Press [?] or [Esc] to close this help",
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            )),
        ];

        frame.render_widget(Clear, popup_area);

        let help_widget = Paragraph::new(help_text)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan))
                    .title(Span::styled(
                        " Help ",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )),
            )
            .wrap(Wrap { trim: true });

        frame.render_widget(help_widget, popup_area);
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

fn usage_gauge(title: String, percent: f64) -> Gauge<'static> {
    Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .gauge_style(Style::default().fg(usage_color(percent)).bg(Color::Black))
        .percent(percent.round() as u16)
        .label(format!("{:.1}%", percent))
}

/// Colored dot plus label for the feed status
fn connection_badge(status: &ConnectionStatus) -> Span<'static> {
    let color = match status {
        ConnectionStatus::Connecting => Color::Gray,
        ConnectionStatus::Connected => Color::Green,
        ConnectionStatus::Stale => Color::Yellow,
        ConnectionStatus::Error(_) => Color::Red,
    };
    Span::styled(
        format!("● {}", status.label()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    )
}

/// Rect of at most `width` x `height` centered in `area`
fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = area.width.min(width);
    let height = area.height.min(height);
    Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    }
}
