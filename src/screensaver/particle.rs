/// A single screensaver particle

use rand::Rng;

use super::regime::Regime;
use super::surface::{Rgb, Vec2, Viewport};

/// Peak opacity of a freshly spawned particle
pub const PARTICLE_ALPHA: f32 = 0.6;

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f64,
    pub color: Rgb,
    pub life: i32,
    pub max_life: i32,
}

impl Particle {
    /// Spawn a particle somewhere on the canvas with the regime's color and speed
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, viewport: Viewport, regime: Regime) -> Self {
        let speed = regime.speed_multiplier();
        let max_life = rng.gen_range(101..200);

        Self {
            position: Vec2::new(
                rng.gen::<f64>() * viewport.width,
                rng.gen::<f64>() * viewport.height,
            ),
            velocity: Vec2::new(
                (rng.gen::<f64>() - 0.5) * speed,
                (rng.gen::<f64>() - 0.5) * speed,
            ),
            size: rng.gen::<f64>() * 3.0 + 1.0,
            color: regime.color(),
            life: max_life,
            max_life,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0
    }

    /// Opacity used when compositing; fades out as the particle ages
    pub fn opacity(&self) -> f32 {
        if self.max_life <= 0 {
            return 0.0;
        }
        let remaining = (self.life.max(0) as f32 / self.max_life as f32).min(1.0);
        remaining * PARTICLE_ALPHA
    }
}
