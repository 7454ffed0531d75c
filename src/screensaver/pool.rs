/// Particle pool: spawning, expiry and bounded growth toward the regime target

use rand::Rng;
use std::cmp::Reverse;

use super::particle::Particle;
use super::regime::Regime;
use super::surface::Viewport;

/// Network throughput (MB/s) that buys one extra particle per frame
pub const NETWORK_SPAWN_STEP_MBS: f64 = 10.0;

/// Number of particles a single frame may create.
///
/// `min(floor(throughput / 10) + 1, target - count)`; NaN, negative or
/// infinite throughput counts as zero and a non-positive deficit yields zero.
pub fn spawn_budget(network_throughput_mbs: f64, target: usize, count: usize) -> usize {
    let deficit = target.saturating_sub(count);
    if deficit == 0 {
        return 0;
    }

    let throughput = if network_throughput_mbs.is_finite() && network_throughput_mbs > 0.0 {
        network_throughput_mbs
    } else {
        0.0
    };

    // `as` saturates, so absurd throughput still lands on the deficit
    let boost = (throughput / NETWORK_SPAWN_STEP_MBS).floor() as usize;
    boost.saturating_add(1).min(deficit)
}

#[derive(Debug)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    viewport: Viewport,
    regime: Regime,
}

impl ParticlePool {
    pub fn new(viewport: Viewport, regime: Regime) -> Self {
        Self {
            // Largest target, so steady state never reallocates
            particles: Vec::with_capacity(Regime::Intense.target_count() * 2),
            viewport,
            regime,
        }
    }

    /// Switch target size, color and speed for particles spawned from now on
    pub fn resize_target(&mut self, regime: Regime) {
        self.regime = regime;
    }

    /// Fill the pool up to the current target in one go
    pub fn seed<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        while self.particles.len() < self.target() {
            self.particles.push(Particle::spawn(rng, self.viewport, self.regime));
        }
    }

    /// Per-frame maintenance: drop expired particles, retire any excess over a
    /// shrunken target, then spawn toward the target. Returns how many
    /// particles were spawned.
    pub fn tick<R: Rng + ?Sized>(&mut self, network_throughput_mbs: f64, rng: &mut R) -> usize {
        self.particles.retain(Particle::is_alive);

        let target = self.target();
        if self.particles.len() > target {
            // Keep the longest-lived ones; the rest were about to fade anyway
            self.particles.sort_unstable_by_key(|p| Reverse(p.life));
            self.particles.truncate(target);
        }

        let budget = spawn_budget(network_throughput_mbs, target, self.particles.len());
        for _ in 0..budget {
            self.particles.push(Particle::spawn(rng, self.viewport, self.regime));
        }
        budget
    }

    pub fn target(&self) -> usize {
        self.regime.target_count()
    }

    pub fn regime(&self) -> Regime {
        self.regime
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    #[cfg(test)]
    pub(crate) fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }
}
