/// Screensaver loop controller: Inactive/Active lifecycle and per-frame orchestration

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;
use tracing::debug;

use super::kinetics;
use super::pool::ParticlePool;
use super::proximity;
use super::regime::Regime;
use super::scheduler::{FrameHandle, FrameScheduler};
use super::surface::{Rgb, Surface, Viewport};
use crate::core::telemetry::{sanitize_percent, TelemetrySnapshot};

/// Dark overpaint applied every frame instead of clearing, leaving trails
pub const BACKGROUND: Rgb = Rgb(15, 23, 42);
pub const TRAIL_FADE_ALPHA: f32 = 0.1;

/// Called once when an activation ends
pub type ExitCallback = Box<dyn FnOnce() + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Inactive,
    Active,
}

struct Session {
    pool: ParticlePool,
    pending: Option<FrameHandle>,
    on_exit: Option<ExitCallback>,
    frames: u64,
}

/// Latest load values seen, used when a frame runs without a snapshot
#[derive(Debug, Clone, Copy, Default)]
struct LastKnown {
    cpu: f64,
    load: f64,
    throughput: f64,
}

pub struct ScreensaverController<S: FrameScheduler, R: Rng = StdRng> {
    scheduler: S,
    rng: R,
    session: Option<Session>,
    last_known: LastKnown,
}

impl<S: FrameScheduler> ScreensaverController<S, StdRng> {
    pub fn new(scheduler: S) -> Self {
        Self::with_rng(scheduler, StdRng::from_entropy())
    }
}

impl<S: FrameScheduler, R: Rng> ScreensaverController<S, R> {
    pub fn with_rng(scheduler: S, rng: R) -> Self {
        Self {
            scheduler,
            rng,
            session: None,
            last_known: LastKnown::default(),
        }
    }

    pub fn state(&self) -> LoopState {
        if self.session.is_some() {
            LoopState::Active
        } else {
            LoopState::Inactive
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Inactive → Active.
    ///
    /// Requires a telemetry snapshot and a usable surface; otherwise stays
    /// inactive and returns `false`. Already active: no-op, `on_exit` is dropped
    /// unused.
    pub fn enter(
        &mut self,
        viewport: Option<Viewport>,
        snapshot: Option<&TelemetrySnapshot>,
        on_exit: ExitCallback,
    ) -> bool {
        if self.session.is_some() {
            return false;
        }
        let Some(snapshot) = snapshot else {
            debug!("screensaver entry skipped: no telemetry yet");
            return false;
        };
        let Some(viewport) = viewport else {
            debug!("screensaver entry skipped: no drawing surface");
            return false;
        };

        self.observe(snapshot);
        let regime = Regime::from_load(self.last_known.load);
        let mut pool = ParticlePool::new(viewport, regime);
        pool.seed(&mut self.rng);

        let pending = Some(self.scheduler.schedule());
        debug!(
            regime = regime.label(),
            particles = pool.len(),
            width = viewport.width,
            height = viewport.height,
            "screensaver activated"
        );

        self.session = Some(Session {
            pool,
            pending,
            on_exit: Some(on_exit),
            frames: 0,
        });
        true
    }

    /// Run the frame identified by `handle`.
    ///
    /// Returns `false` without touching anything when inactive or when the
    /// handle is not the pending one (cancelled or stale).
    pub fn frame<Su: Surface + ?Sized>(
        &mut self,
        handle: FrameHandle,
        snapshot: Option<&TelemetrySnapshot>,
        surface: &mut Su,
    ) -> bool {
        match self.session.as_ref() {
            Some(session) if session.pending == Some(handle) => {}
            _ => return false,
        }

        if let Some(snapshot) = snapshot {
            self.observe(snapshot);
        }
        let LastKnown { cpu, load, throughput } = self.last_known;

        let Some(session) = self.session.as_mut() else {
            return false;
        };
        session.pending = None;

        let regime = Regime::from_load(load);
        session.pool.resize_target(regime);
        session.pool.tick(throughput, &mut self.rng);

        let viewport = session.pool.viewport();
        kinetics::step(session.pool.particles_mut(), viewport, regime, cpu, &mut self.rng);

        surface.fade(BACKGROUND, TRAIL_FADE_ALPHA);
        proximity::draw_connections(session.pool.particles(), regime, surface);
        for particle in session.pool.particles() {
            surface.dot(particle.position, particle.size, particle.color, particle.opacity());
        }

        session.frames += 1;
        session.pending = Some(self.scheduler.schedule());
        true
    }

    /// Run the next frame if the scheduler says one is due
    pub fn pump<Su: Surface + ?Sized>(
        &mut self,
        now: Instant,
        snapshot: Option<&TelemetrySnapshot>,
        surface: &mut Su,
    ) -> bool {
        if self.session.is_none() {
            return false;
        }
        match self.scheduler.next_due(now) {
            Some(handle) => self.frame(handle, snapshot, surface),
            None => false,
        }
    }

    /// Active → Inactive. Cancels the pending frame, discards the pool and
    /// fires the exit callback. No-op when already inactive.
    pub fn exit(&mut self) -> bool {
        let Some(mut session) = self.session.take() else {
            return false;
        };

        if let Some(handle) = session.pending.take() {
            self.scheduler.cancel(handle);
        }
        debug!(frames = session.frames, "screensaver deactivated");

        if let Some(on_exit) = session.on_exit.take() {
            on_exit();
        }
        true
    }

    /// Regime of the running session
    pub fn regime(&self) -> Option<Regime> {
        self.session.as_ref().map(|s| s.pool.regime())
    }

    pub fn particle_count(&self) -> usize {
        self.session.as_ref().map_or(0, |s| s.pool.len())
    }

    pub fn frames_rendered(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.frames)
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    fn observe(&mut self, snapshot: &TelemetrySnapshot) {
        self.last_known = LastKnown {
            cpu: sanitize_percent(snapshot.avg_cpu_percent),
            load: snapshot.average_load(),
            throughput: snapshot.sanitized_throughput(),
        };
    }
}
