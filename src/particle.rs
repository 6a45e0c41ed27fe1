//! Particle state shared between the simulation and render threads.

/// Arena index of a particle. Particles are never removed, so an id stays valid for
/// the lifetime of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub u64);

impl std::fmt::Display for ParticleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    /// Screen coordinates, origin top-left, y down.
    pub position: [f64; 2],
    /// Pixels per second.
    pub velocity: [f64; 2],
    pub mass: f64,
    /// Derived from mass at spawn. Used both for drawing and for wall collisions.
    pub radius: f64,
}

impl Particle {
    pub fn new(position: [f64; 2], velocity: [f64; 2], mass: f64, radius_scale: f64) -> Self {
        Particle {
            position,
            velocity,
            mass,
            radius: radius_for_mass(mass, radius_scale),
        }
    }

    pub fn speed(&self) -> f64 {
        self.velocity[0].hypot(self.velocity[1])
    }

    pub fn is_well_formed(&self) -> bool {
        self.position.iter().all(|v| v.is_finite())
            && self.velocity.iter().all(|v| v.is_finite())
            && self.mass > 0.0
            && self.radius > 0.0
    }
}

/// Monotonic in mass, so heavier particles are always drawn at least as large.
pub fn radius_for_mass(mass: f64, radius_scale: f64) -> f64 {
    radius_scale * mass.sqrt()
}
