//! # Ambient Particle Field
//!
//! Motes drifting slowly along depth toward the observer. A mote that crosses
//! the near plane respawns at a uniformly random position in the whole
//! volume. No timers, no interaction with streams.

use glyphrain_core::{ParticleConfig, SimRng, Vec3, ViewingVolume};
use tracing::debug;

/// One mote.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Position inside the volume.
    pub position: Vec3,
    /// Drift speed along depth (units/s).
    pub drift_speed: f32,
}

/// Fixed pool of motes.
#[derive(Clone, Debug)]
pub struct ParticleField {
    particles: Vec<Particle>,
    rng: SimRng,
    respawns: u64,
}

impl ParticleField {
    /// Seeds `config.count` motes uniformly throughout `volume`.
    #[must_use]
    pub fn new(volume: &ViewingVolume, config: &ParticleConfig, mut rng: SimRng) -> Self {
        let particles = (0..config.count)
            .map(|_| Particle {
                position: random_point(volume, &mut rng),
                drift_speed: config.drift_speed
                    * rng.range(config.min_drift_factor, config.max_drift_factor),
            })
            .collect();
        Self {
            particles,
            rng,
            respawns: 0,
        }
    }

    /// Moves every mote toward the near plane; motes that cross it respawn.
    ///
    /// Returns the number of respawns this tick.
    pub fn tick(&mut self, dt: f32, volume: &ViewingVolume) -> u32 {
        // +1 when near is numerically larger than far.
        let toward_near = (volume.near - volume.far).signum();
        let mut respawned = 0;

        for particle in &mut self.particles {
            particle.position.z += particle.drift_speed * dt * toward_near;
            if (particle.position.z - volume.near) * toward_near > 0.0 {
                particle.position = random_point(volume, &mut self.rng);
                respawned += 1;
            }
        }

        self.respawns += u64::from(respawned);
        respawned
    }

    /// Respawns motes left outside a resized volume; the rest stay put.
    pub fn rebound(&mut self, volume: &ViewingVolume) {
        let mut moved = 0_u32;
        for particle in &mut self.particles {
            if !volume.contains(particle.position) {
                particle.position = random_point(volume, &mut self.rng);
                moved += 1;
            }
        }
        debug!(moved, total = self.particles.len(), "particle field rebounded");
    }

    /// All motes.
    #[inline]
    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Number of motes.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// True if the field has no motes.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Total respawns since creation.
    #[inline]
    #[must_use]
    pub fn respawns(&self) -> u64 {
        self.respawns
    }
}

fn random_point(volume: &ViewingVolume, rng: &mut SimRng) -> Vec3 {
    let (z_lo, z_hi) = volume.depth_bounds();
    Vec3::new(
        rng.range(-volume.half_width, volume.half_width),
        rng.range(volume.bottom, volume.top),
        rng.range(z_lo, z_hi),
    )
}
