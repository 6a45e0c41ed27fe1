pub mod control_panel;
pub mod controls;
pub mod error;
pub mod fps_estimator;
pub mod integrator;
pub mod parameter_set;
pub mod particle;
pub mod particle_store;
pub mod render;
pub mod sim_params;
pub mod simulation_loop;
pub mod simulator;

pub use controls::{Controls, ParticleView};
pub use error::InputError;
pub use parameter_set::{ParameterSet, PhysicsParams};
pub use particle::{Particle, ParticleId};
pub use particle_store::ParticleStore;
pub use simulator::{ShutdownReport, Simulator};
