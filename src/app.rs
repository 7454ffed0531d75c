/// Main TUI application

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, layout::Rect, Frame, Terminal};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::core::docker::{ContainerAction, ContainerControl};
use crate::core::{
    spawn_feed, FeedEvent, FeedHealth, MetricsCollector, MetricsSource, RemoteClient, TelemetryUpdate,
};
use crate::screens::{Dashboard, DashboardView, ScreensaverScreen};
use crate::screensaver::controller::BACKGROUND;
use crate::screensaver::{IdleTracker, IntervalScheduler, ScreensaverController, Surface};
use crate::utils::{AppConfig, ContainerState, STATUS_MESSAGE_TTL};
use crate::widgets::TrailCanvas;

/// Longest the loop blocks waiting for input
const INPUT_POLL: Duration = Duration::from_millis(100);

/// What a dashboard key press asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    ToggleHelp,
    CloseHelp,
    SelectPrevious,
    SelectNext,
    Container(ContainerAction),
    Screensaver,
}

impl Command {
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Some(Command::Quit),
            KeyCode::Char('q') => Some(Command::Quit),
            KeyCode::Char('?') | KeyCode::F(1) => Some(Command::ToggleHelp),
            KeyCode::Esc => Some(Command::CloseHelp),
            KeyCode::Up | KeyCode::Char('k') => Some(Command::SelectPrevious),
            KeyCode::Down | KeyCode::Char('j') => Some(Command::SelectNext),
            KeyCode::Char('s') => Some(Command::Container(ContainerAction::Start)),
            KeyCode::Char('x') => Some(Command::Container(ContainerAction::Stop)),
            KeyCode::Char('R') => Some(Command::Container(ContainerAction::Restart)),
            KeyCode::Char('z') => Some(Command::Screensaver),
            _ => None,
        }
    }
}

pub struct App {
    dashboard: Dashboard,
    saver_screen: ScreensaverScreen,
    controller: ScreensaverController<IntervalScheduler>,
    canvas: Option<TrailCanvas>,
    saver_started: Option<Instant>,
    idle: IdleTracker,
    control: ContainerControl,
    source: String,

    // Background channels
    telemetry_rx: UnboundedReceiver<FeedEvent>,
    action_tx: UnboundedSender<String>,
    action_rx: UnboundedReceiver<String>,
    saver_exit_tx: UnboundedSender<()>,
    saver_exit_rx: UnboundedReceiver<()>,

    latest: Option<TelemetryUpdate>,
    feed_health: FeedHealth,
    selected_index: usize,
    show_help: bool,
    status_message: Option<(String, Instant)>,
    should_quit: bool,
}

impl App {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let (source, control) = match &config.remote_url {
            Some(url) => {
                let client = RemoteClient::new(url)?;
                (MetricsSource::Remote(client.clone()), ContainerControl::Remote(client))
            }
            None => {
                let collector = MetricsCollector::with_local_docker().await;
                let docker = collector.docker().cloned();
                if docker.is_none() {
                    warn!("Docker not available, container actions disabled");
                }
                (MetricsSource::Local(collector), ContainerControl::Local(docker))
            }
        };
        let description = source.describe();

        // Create channels for background updates
        let (telemetry_tx, telemetry_rx) = mpsc::unbounded_channel();
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let (saver_exit_tx, saver_exit_rx) = mpsc::unbounded_channel();

        spawn_feed(source, config.refresh_interval, telemetry_tx);

        info!(
            "Dashboard started (source: {}, idle timeout: {:?}, {} fps)",
            description, config.idle_timeout, config.frame_rate
        );

        Ok(Self {
            dashboard: Dashboard::new(),
            saver_screen: ScreensaverScreen,
            controller: ScreensaverController::new(IntervalScheduler::new(config.frame_rate)),
            canvas: None,
            saver_started: None,
            idle: IdleTracker::new(config.idle_timeout, Instant::now()),
            control,
            source: description,
            telemetry_rx,
            action_tx,
            action_rx,
            saver_exit_tx,
            saver_exit_rx,
            latest: None,
            feed_health: FeedHealth::new(config.refresh_interval),
            selected_index: 0,
            show_help: false,
            status_message: None,
            should_quit: false,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_loop(&mut terminal).await;

        // Restore terminal
        self.controller.exit();
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        terminal.show_cursor()?;

        result
    }

    async fn run_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        loop {
            // Keep only the newest telemetry (non-blocking)
            while let Ok(event) = self.telemetry_rx.try_recv() {
                self.feed_health.record(&event, Instant::now());
                if let FeedEvent::Update(update) = event {
                    self.latest = Some(update);
                }
            }
            self.clamp_selection();

            while let Ok(message) = self.action_rx.try_recv() {
                self.set_status(message);
            }

            while self.saver_exit_rx.try_recv().is_ok() {
                self.canvas = None;
                self.saver_started = None;
                terminal.clear()?;
            }

            let now = Instant::now();
            if self.status_message.as_ref().is_some_and(|(_, at)| now.duration_since(*at) >= STATUS_MESSAGE_TTL) {
                self.status_message = None;
            }

            if !self.controller.is_active() && self.idle.is_idle(now) {
                self.start_screensaver(terminal.size()?);
            }

            if let Some(canvas) = self.canvas.as_mut() {
                let snapshot = self.latest.as_ref().map(|u| &u.snapshot);
                self.controller.pump(now, snapshot, canvas);
            }

            terminal.draw(|f| self.render(f))?;

            if event::poll(self.poll_timeout(Instant::now()))? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    Event::Mouse(mouse) => self.handle_mouse(mouse),
                    _ => {}
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Wake up for the next frame while the screensaver runs
    fn poll_timeout(&self, now: Instant) -> Duration {
        if self.controller.is_active() {
            self.controller
                .scheduler()
                .time_until_due(now)
                .unwrap_or(INPUT_POLL)
                .min(INPUT_POLL)
        } else {
            INPUT_POLL
        }
    }

    fn start_screensaver(&mut self, area: Rect) -> bool {
        if self.latest.is_none() {
            return false;
        }
        let Some(canvas) = TrailCanvas::for_area(area, BACKGROUND) else {
            debug!("No drawing area for screensaver");
            return false;
        };

        let exit_tx = self.saver_exit_tx.clone();
        let entered = self.controller.enter(
            Some(canvas.viewport()),
            self.latest.as_ref().map(|u| &u.snapshot),
            Box::new(move || {
                let _ = exit_tx.send(());
            }),
        );

        if entered {
            info!(
                "Screensaver started ({} particles, {:?})",
                self.controller.particle_count(),
                self.controller.regime()
            );
            self.canvas = Some(canvas);
            self.saver_started = Some(Instant::now());
            self.show_help = false;
        }
        entered
    }

    fn handle_key(&mut self, key: KeyEvent) {
        self.idle.record_activity(Instant::now());

        // Any key while the screensaver runs only dismisses it
        if self.controller.is_active() {
            self.controller.exit();
            return;
        }

        let Some(command) = Command::from_key(key) else {
            return;
        };

        match command {
            Command::Quit => self.should_quit = true,
            Command::ToggleHelp => self.show_help = !self.show_help,
            Command::CloseHelp => self.show_help = false,
            Command::SelectPrevious => {
                self.selected_index = self.selected_index.saturating_sub(1);
            }
            Command::SelectNext => {
                if self.selected_index + 1 < self.container_count() {
                    self.selected_index += 1;
                }
            }
            Command::Container(action) => self.container_action(action),
            Command::Screensaver => {
                if !self.start_screensaver(self.last_area()) {
                    self.set_status("Screensaver needs telemetry first".to_string());
                }
            }
        }
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        if !matches!(mouse.kind, MouseEventKind::Down(_)) {
            return;
        }
        self.idle.record_activity(Instant::now());
        if self.controller.is_active() {
            self.controller.exit();
        }
    }

    fn container_action(&mut self, action: ContainerAction) {
        let Some(container) = self
            .latest
            .as_ref()
            .and_then(|u| u.metrics.docker.containers.get(self.selected_index))
        else {
            self.set_status("No container selected".to_string());
            return;
        };

        let state = ContainerState::from(container.state.as_str());
        if !action.applies_to(state) {
            self.set_status(format!("{} is {}", container.name, state.label().to_lowercase()));
            return;
        }

        let id = container.id.clone();
        let name = container.name.clone();
        let control = self.control.clone();
        let tx = self.action_tx.clone();
        self.set_status(format!("Sending {} to {}...", action, name));

        tokio::spawn(async move {
            let message = match control.perform(action, &id).await {
                Ok(()) => format!("✓ {} {}", capitalize(action.as_str()), name),
                Err(e) => {
                    warn!("Container {} failed for {}: {:#}", action, name, e);
                    format!("✗ {} {} failed: {}", capitalize(action.as_str()), name, e)
                }
            };
            let _ = tx.send(message);
        });
    }

    fn container_count(&self) -> usize {
        self.latest
            .as_ref()
            .map_or(0, |u| u.metrics.docker.containers.len())
    }

    fn clamp_selection(&mut self) {
        let count = self.container_count();
        if count > 0 && self.selected_index >= count {
            self.selected_index = count - 1;
        }
    }

    /// Current terminal area; the canvas is sized from it
    fn last_area(&self) -> Rect {
        crossterm::terminal::size()
            .map(|(w, h)| Rect::new(0, 0, w, h))
            .unwrap_or_default()
    }

    fn set_status(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    fn render(&self, frame: &mut Frame) {
        let snapshot = self.latest.as_ref().map(|u| &u.snapshot);

        if let (Some(canvas), Some(regime)) = (self.canvas.as_ref(), self.controller.regime()) {
            let elapsed = self.saver_started.map(|t| t.elapsed()).unwrap_or_default();
            self.saver_screen.render(frame, canvas, snapshot, regime, elapsed);
            return;
        }

        let connection = self.feed_health.status(Instant::now());
        let view = DashboardView {
            metrics: self.latest.as_ref().map(|u| &u.metrics),
            snapshot,
            selected_index: self.selected_index,
            status_message: self.status_message.as_ref().map(|(m, _)| m.as_str()),
            idle_remaining: self.idle.remaining(Instant::now()),
            show_help: self.show_help,
            source: &self.source,
            connection: &connection,
        };
        self.dashboard.render(frame, &view);
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_bindings() {
        assert_eq!(Command::from_key(key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(
            Command::from_key(key(KeyCode::Char('s'))),
            Some(Command::Container(ContainerAction::Start))
        );
        assert_eq!(
            Command::from_key(key(KeyCode::Char('x'))),
            Some(Command::Container(ContainerAction::Stop))
        );
        assert_eq!(
            Command::from_key(key(KeyCode::Char('R'))),
            Some(Command::Container(ContainerAction::Restart))
        );
        assert_eq!(Command::from_key(key(KeyCode::Char('z'))), Some(Command::Screensaver));
        assert_eq!(Command::from_key(key(KeyCode::Down)), Some(Command::SelectNext));
        assert_eq!(Command::from_key(key(KeyCode::Char('r'))), None);
    }

    #[test]
    fn test_ctrl_c_quits() {
        let event = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(Command::from_key(event), Some(Command::Quit));
    }

    fn offline_config() -> AppConfig {
        AppConfig {
            remote_url: Some("http://127.0.0.1:9".to_string()),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_screensaver_waits_for_telemetry() {
        let mut app = App::new(offline_config()).await.unwrap();
        let area = Rect::new(0, 0, 80, 24);

        assert!(!app.start_screensaver(area));
        assert!(app.canvas.is_none());
        assert!(!app.controller.is_active());

        let metrics = crate::core::telemetry::tests::sample_metrics();
        let snapshot = crate::core::TelemetrySnapshot::from_metrics(&metrics, 0.0);
        app.latest = Some(TelemetryUpdate { metrics, snapshot });

        assert!(app.start_screensaver(area));
        assert!(app.canvas.is_some());
        assert!(app.controller.is_active());
    }

    #[tokio::test]
    async fn test_key_dismisses_screensaver() {
        let mut app = App::new(offline_config()).await.unwrap();
        let metrics = crate::core::telemetry::tests::sample_metrics();
        let snapshot = crate::core::TelemetrySnapshot::from_metrics(&metrics, 0.0);
        app.latest = Some(TelemetryUpdate { metrics, snapshot });
        assert!(app.start_screensaver(Rect::new(0, 0, 80, 24)));

        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.controller.is_active());
        assert!(!app.should_quit);
        assert!(app.saver_exit_rx.try_recv().is_ok());
    }

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("restart"), "Restart");
        assert_eq!(capitalize(""), "");
    }
}
