//! Arena of live particles.
//!
//! `spawn`, `tick_all` and `snapshot` are the only ways in. The two mutators are
//! crate-private: outside code spawns through `Controls`, which validates first.
//! Each takes the store lock for its whole duration, so a spawn that races a tick
//! lands either before the pass (and is stepped by it) or after it (and is stepped
//! next tick), never in the middle.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::integrator;
use crate::parameter_set::PhysicsParams;
use crate::particle::{Particle, ParticleId};
use crate::sim_params::Bounds;

/// Outside the crate the store is read-only:
///
/// ```compile_fail
/// let store = physbox::ParticleStore::new();
/// store.spawn([0.0, 0.0], [0.0, 0.0], 1.0, 3.0);
/// ```
#[derive(Debug, Default)]
pub struct ParticleStore {
    particles: Mutex<Vec<Particle>>,
}

impl ParticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn spawn(
        &self,
        position: [f64; 2],
        velocity: [f64; 2],
        mass: f64,
        radius_scale: f64,
    ) -> ParticleId {
        let particle = Particle::new(position, velocity, mass, radius_scale);
        let mut particles = self.lock();
        let id = ParticleId(particles.len() as u64);
        particles.push(particle);
        log::trace!("Spawned {} {:?}", id, particle);
        id
    }

    /// Step every particle in place. Only the simulation loop should call this.
    pub(crate) fn tick_all(&self, params: &PhysicsParams, bounds: &Bounds, dt: f64) {
        let mut particles = self.lock();
        for particle in particles.iter_mut() {
            *particle = integrator::step(particle, params, bounds, dt);
        }
    }

    /// Copy of the current population, in spawn order.
    pub fn snapshot(&self) -> Vec<Particle> {
        self.lock().clone()
    }

    pub fn get(&self, id: ParticleId) -> Option<Particle> {
        self.lock().get(id.0 as usize).copied()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic can only happen between whole-particle writes, so the data behind a
    // poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Vec<Particle>> {
        self.particles.lock().unwrap_or_else(|poisoned| {
            log::warn!("Particle store lock was poisoned, recovering");
            PoisonError::into_inner(poisoned)
        })
    }
}
