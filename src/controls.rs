//! The only way the outside world changes the simulation.
//!
//! Everything is validated here. Anything that fails validation returns an
//! `InputError` and leaves the store and the parameters exactly as they were.

use std::sync::Arc;

use crate::error::InputError;
use crate::parameter_set::{ParameterSet, PhysicsParams};
use crate::particle::ParticleId;
use crate::particle_store::ParticleStore;
use crate::sim_params::{Bounds, SimParams};

/// What the renderer needs to draw one particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone)]
pub struct Controls {
    store: Arc<ParticleStore>,
    params: Arc<ParameterSet>,
    bounds: Bounds,
    radius_scale: f64,
}

impl Controls {
    pub fn new(store: Arc<ParticleStore>, params: Arc<ParameterSet>, sim_params: &SimParams) -> Self {
        Controls {
            store,
            params,
            bounds: sim_params.bounds(),
            radius_scale: sim_params.radius_scale(),
        }
    }

    pub fn spawn_particle(
        &self,
        x: f64,
        y: f64,
        vx: f64,
        vy: f64,
        mass: f64,
    ) -> Result<ParticleId, InputError> {
        finite("x", x)?;
        finite("y", y)?;
        finite("vx", vx)?;
        finite("vy", vy)?;
        finite("mass", mass)?;
        if mass <= 0.0 {
            return Err(InputError::NonPositiveMass(mass));
        }
        let id = self.store.spawn([x, y], [vx, vy], mass, self.radius_scale);
        log::info!(
            "Spawned particle {} at ({}, {}) v=({}, {}) m={}",
            id,
            x,
            y,
            vx,
            vy,
            mass
        );
        Ok(id)
    }

    /// Spawns in the middle of the box.
    pub fn spawn_at_center(&self, vx: f64, vy: f64, mass: f64) -> Result<ParticleId, InputError> {
        self.spawn_particle(self.bounds.width / 2.0, self.bounds.height / 2.0, vx, vy, mass)
    }

    pub fn set_parameters(&self, gravity: f64, drag: f64, bounce: f64) -> Result<(), InputError> {
        finite("gravity", gravity)?;
        finite("drag", drag)?;
        finite("bounce", bounce)?;
        let params = PhysicsParams {
            gravity,
            drag,
            bounce,
        };
        self.params.set(params);
        log::info!(
            "Physics updated: gravity={} drag={} bounce={}",
            gravity,
            drag,
            bounce
        );
        Ok(())
    }

    /// Text-field flavour of `set_parameters`. All three fields must parse before
    /// anything is applied.
    pub fn set_parameters_from_text(
        &self,
        gravity: &str,
        drag: &str,
        bounce: &str,
    ) -> Result<(), InputError> {
        let gravity = parse_field("gravity", gravity)?;
        let drag = parse_field("drag", drag)?;
        let bounce = parse_field("bounce", bounce)?;
        self.set_parameters(gravity, drag, bounce)
    }

    /// Text-field flavour of `spawn_at_center`.
    pub fn spawn_from_text(&self, vx: &str, vy: &str, mass: &str) -> Result<ParticleId, InputError> {
        let vx = parse_field("vx", vx)?;
        let vy = parse_field("vy", vy)?;
        let mass = parse_field("mass", mass)?;
        self.spawn_at_center(vx, vy, mass)
    }

    pub fn parameters(&self) -> PhysicsParams {
        self.params.get()
    }

    pub fn get_snapshot(&self) -> Vec<ParticleView> {
        self.store
            .snapshot()
            .iter()
            .map(|p| ParticleView {
                x: p.position[0],
                y: p.position[1],
                radius: p.radius,
            })
            .collect()
    }

    pub fn particle_count(&self) -> usize {
        self.store.len()
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }
}

pub fn parse_field(field: &'static str, text: &str) -> Result<f64, InputError> {
    let value: f64 = text.trim().parse().map_err(|_| InputError::NotANumber {
        field,
        value: text.to_string(),
    })?;
    finite(field, value)
}

fn finite(field: &'static str, value: f64) -> Result<f64, InputError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(InputError::NotFinite { field, value })
    }
}
