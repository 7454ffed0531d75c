/// Per-frame particle motion

use rand::Rng;

use super::particle::Particle;
use super::regime::Regime;
use super::surface::Viewport;

/// Velocity perturbation per frame at 100% CPU
pub const JITTER_SCALE: f64 = 0.1;

/// Advance every particle by one frame.
///
/// Integrates position, ages the particle, wraps it around the canvas edges,
/// injects CPU-proportional jitter and clamps velocity to the regime's limit.
/// Not reproducible unless `rng` is seeded.
pub fn step<R: Rng + ?Sized>(
    particles: &mut [Particle],
    viewport: Viewport,
    regime: Regime,
    avg_cpu_percent: f64,
    rng: &mut R,
) {
    let jitter = jitter_amplitude(avg_cpu_percent);
    let max_velocity = regime.max_velocity();

    for particle in particles.iter_mut() {
        particle.position.x += particle.velocity.x;
        particle.position.y += particle.velocity.y;
        particle.life -= 1;

        particle.position.x = wrap(particle.position.x, viewport.width);
        particle.position.y = wrap(particle.position.y, viewport.height);

        particle.velocity.x += (rng.gen::<f64>() - 0.5) * jitter;
        particle.velocity.y += (rng.gen::<f64>() - 0.5) * jitter;

        particle.velocity.x = particle.velocity.x.clamp(-max_velocity, max_velocity);
        particle.velocity.y = particle.velocity.y.clamp(-max_velocity, max_velocity);
    }
}

/// Toroidal wrap: leaving one edge re-enters at the opposite one
fn wrap(coordinate: f64, extent: f64) -> f64 {
    if coordinate < 0.0 {
        extent
    } else if coordinate > extent {
        0.0
    } else if coordinate.is_nan() {
        0.0
    } else {
        coordinate
    }
}

fn jitter_amplitude(avg_cpu_percent: f64) -> f64 {
    let cpu = if avg_cpu_percent.is_nan() {
        0.0
    } else {
        avg_cpu_percent.clamp(0.0, 100.0)
    };
    JITTER_SCALE * (cpu / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screensaver::surface::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn particle_at(x: f64, y: f64, vx: f64, vy: f64) -> Particle {
        Particle {
            position: Vec2::new(x, y),
            velocity: Vec2::new(vx, vy),
            size: 2.0,
            color: Regime::Idle.color(),
            life: 150,
            max_life: 150,
        }
    }

    #[test]
    fn test_integrates_and_ages_without_jitter_at_zero_cpu() {
        let mut rng = StdRng::seed_from_u64(0);
        let viewport = Viewport::new(100.0, 100.0).unwrap();
        let mut particles = vec![particle_at(10.0, 20.0, 0.5, -0.25)];

        step(&mut particles, viewport, Regime::Normal, 0.0, &mut rng);

        assert_eq!(particles[0].position, Vec2::new(10.5, 19.75));
        assert_eq!(particles[0].velocity, Vec2::new(0.5, -0.25));
        assert_eq!(particles[0].life, 149);
    }

    #[test]
    fn test_wraps_to_opposite_edge() {
        let mut rng = StdRng::seed_from_u64(0);
        let viewport = Viewport::new(100.0, 50.0).unwrap();
        let mut particles = vec![
            particle_at(0.2, 25.0, -0.5, 0.0),
            particle_at(99.8, 25.0, 0.5, 0.0),
            particle_at(50.0, 0.1, 0.0, -0.5),
            particle_at(50.0, 49.9, 0.0, 0.5),
        ];

        step(&mut particles, viewport, Regime::Normal, 0.0, &mut rng);

        assert_eq!(particles[0].position.x, 100.0);
        assert_eq!(particles[1].position.x, 0.0);
        assert_eq!(particles[2].position.y, 50.0);
        assert_eq!(particles[3].position.y, 0.0);
    }

    #[test]
    fn test_positions_stay_on_canvas() {
        let mut rng = StdRng::seed_from_u64(99);
        let viewport = Viewport::new(320.0, 200.0).unwrap();
        let mut particles: Vec<Particle> = (0..120)
            .map(|_| Particle::spawn(&mut rng, viewport, Regime::Intense))
            .collect();

        for _ in 0..5_000 {
            step(&mut particles, viewport, Regime::Intense, 100.0, &mut rng);
            for p in &particles {
                assert!((0.0..=320.0).contains(&p.position.x));
                assert!((0.0..=200.0).contains(&p.position.y));
            }
        }
    }

    #[test]
    fn test_velocity_clamped_to_regime_limit() {
        let mut rng = StdRng::seed_from_u64(4);
        let viewport = Viewport::new(500.0, 500.0).unwrap();
        let mut particles = vec![particle_at(250.0, 250.0, 40.0, -40.0)];

        step(&mut particles, viewport, Regime::Idle, 100.0, &mut rng);

        assert_eq!(particles[0].velocity.x, 1.0);
        assert_eq!(particles[0].velocity.y, -1.0);
    }

    #[test]
    fn test_jitter_scales_with_cpu_and_is_seed_reproducible() {
        let viewport = Viewport::new(500.0, 500.0).unwrap();
        let start = particle_at(250.0, 250.0, 0.0, 0.0);

        let mut a = vec![start.clone()];
        let mut b = vec![start.clone()];
        step(&mut a, viewport, Regime::Busy, 80.0, &mut StdRng::seed_from_u64(17));
        step(&mut b, viewport, Regime::Busy, 80.0, &mut StdRng::seed_from_u64(17));
        assert_eq!(a, b);

        let limit = JITTER_SCALE * 0.8 / 2.0;
        assert!(a[0].velocity.x.abs() <= limit);
        assert!(a[0].velocity.y.abs() <= limit);
    }

    #[test]
    fn test_bad_cpu_values_do_not_poison_velocity() {
        let mut rng = StdRng::seed_from_u64(8);
        let viewport = Viewport::new(500.0, 500.0).unwrap();
        let mut particles = vec![particle_at(250.0, 250.0, 0.1, 0.1)];

        step(&mut particles, viewport, Regime::Normal, f64::NAN, &mut rng);
        step(&mut particles, viewport, Regime::Normal, -40.0, &mut rng);
        step(&mut particles, viewport, Regime::Normal, 1e9, &mut rng);

        assert!(particles[0].velocity.x.is_finite());
        assert!(particles[0].velocity.y.is_finite());
        assert!(particles[0].velocity.x.abs() <= 2.0);
    }
}
