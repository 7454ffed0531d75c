/// Proximity graph: faded lines between nearby particles
///
/// Brute-force pairwise pass. At the 120-particle cap this is 7140 distance
/// checks per frame, which fits comfortably in a frame. If particle caps are
/// ever raised, swap the pair enumeration for a uniform grid keyed on
/// `CONNECTION_RADIUS`; the connection rule itself stays the same.

use super::particle::Particle;
use super::regime::Regime;
use super::surface::Surface;

/// Maximum distance (canvas units) at which two particles are linked
pub const CONNECTION_RADIUS: f64 = 150.0;

/// Line alpha for two particles at distance zero
pub const CONNECTION_MAX_ALPHA: f32 = 0.2;

/// Line opacity for a pair `distance` apart, `None` when they are not linked
pub fn connection_opacity(distance: f64) -> Option<f32> {
    if distance.is_nan() || distance >= CONNECTION_RADIUS {
        return None;
    }
    let closeness = 1.0 - distance.max(0.0) / CONNECTION_RADIUS;
    Some(closeness as f32 * CONNECTION_MAX_ALPHA)
}

/// Visit every linked pair `(i, j)` with `i < j` in pool order
pub fn for_each_connection<F>(particles: &[Particle], mut visit: F)
where
    F: FnMut(&Particle, &Particle, f32),
{
    for (i, a) in particles.iter().enumerate() {
        for b in &particles[i + 1..] {
            if let Some(alpha) = connection_opacity(a.position.distance(b.position)) {
                visit(a, b, alpha);
            }
        }
    }
}

/// Draw all connections in the regime color. Returns the number of lines drawn.
pub fn draw_connections<S: Surface + ?Sized>(
    particles: &[Particle],
    regime: Regime,
    surface: &mut S,
) -> usize {
    let color = regime.color();
    let mut drawn = 0;
    for_each_connection(particles, |a, b, alpha| {
        surface.line(a.position, b.position, color, alpha);
        drawn += 1;
    });
    drawn
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screensaver::surface::{MockSurface, Vec2};
    use mockall::predicate::*;

    fn particle_at(x: f64, y: f64) -> Particle {
        Particle {
            position: Vec2::new(x, y),
            velocity: Vec2::default(),
            size: 1.0,
            color: Regime::Idle.color(),
            life: 120,
            max_life: 120,
        }
    }

    #[test]
    fn test_opacity_is_strictly_decreasing() {
        let mut previous = connection_opacity(0.0).unwrap();
        assert!((previous - CONNECTION_MAX_ALPHA).abs() < f32::EPSILON);

        for d in 1..150 {
            let current = connection_opacity(d as f64).unwrap();
            assert!(current < previous, "opacity did not drop at d={}", d);
            previous = current;
        }
    }

    #[test]
    fn test_no_connection_at_or_beyond_radius() {
        assert_eq!(connection_opacity(CONNECTION_RADIUS), None);
        assert_eq!(connection_opacity(CONNECTION_RADIUS + 0.001), None);
        assert_eq!(connection_opacity(10_000.0), None);
        assert_eq!(connection_opacity(f64::NAN), None);
        assert!(connection_opacity(CONNECTION_RADIUS - 0.001).unwrap() > 0.0);
    }

    #[test]
    fn test_pairs_visited_once_in_order() {
        let particles = vec![
            particle_at(0.0, 0.0),
            particle_at(100.0, 0.0),
            particle_at(200.0, 0.0),
            particle_at(1_000.0, 1_000.0),
        ];

        let mut pairs = Vec::new();
        for_each_connection(&particles, |a, b, _| pairs.push((a.position.x, b.position.x)));

        // 0-200 is 200 apart, the far particle links to nobody
        assert_eq!(pairs, vec![(0.0, 100.0), (100.0, 200.0)]);
    }

    #[test]
    fn test_draw_connections_uses_regime_color() {
        let particles = vec![particle_at(0.0, 0.0), particle_at(0.0, 75.0)];

        let mut surface = MockSurface::new();
        surface
            .expect_line()
            .with(
                eq(Vec2::new(0.0, 0.0)),
                eq(Vec2::new(0.0, 75.0)),
                eq(Regime::Busy.color()),
                function(|alpha: &f32| (alpha - 0.1).abs() < 1e-6),
            )
            .times(1)
            .return_const(());

        let drawn = draw_connections(&particles, Regime::Busy, &mut surface);
        assert_eq!(drawn, 1);
    }

    #[test]
    fn test_dense_cluster_draws_every_pair() {
        let particles: Vec<Particle> = (0..120).map(|i| particle_at(i as f64 * 0.5, 0.0)).collect();

        let mut surface = MockSurface::new();
        surface.expect_line().times(7140).return_const(());

        assert_eq!(draw_connections(&particles, Regime::Intense, &mut surface), 7140);
    }
}
