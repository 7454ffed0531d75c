/// Load-driven particle screensaver
///
/// Leaf-first: `regime` classifies load, `pool` owns particles, `kinetics`
/// moves them, `proximity` links neighbours, and `controller` runs the
/// Inactive/Active loop on top of a `scheduler`.

pub mod controller;
pub mod idle;
pub mod kinetics;
pub mod particle;
pub mod pool;
pub mod proximity;
pub mod regime;
pub mod scheduler;
pub mod surface;

pub use controller::{ExitCallback, LoopState, ScreensaverController};
pub use idle::IdleTracker;
pub use particle::Particle;
pub use pool::ParticlePool;
pub use regime::Regime;
pub use scheduler::{FrameHandle, FrameScheduler, IntervalScheduler, ManualScheduler};
pub use surface::{Rgb, Surface, Vec2, Viewport};
