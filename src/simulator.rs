use std::sync::Arc;

use log::info;

use crate::controls::Controls;
use crate::parameter_set::{ParameterSet, PhysicsParams};
use crate::particle_store::ParticleStore;
use crate::render::{Capture, RenderLoop};
use crate::sim_params::SimParams;
use crate::simulation_loop::SimulationLoop;

/// Counters reported after both loops have exited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    pub ticks: u64,
    pub frames: u64,
    pub particles: usize,
}

/// Owns the shared state and both loop threads.
pub struct Simulator {
    controls: Controls,
    simulation: SimulationLoop,
    render: Option<RenderLoop>,
}

impl Simulator {
    pub fn start(sim_params: &SimParams, capture: Option<Capture>) -> std::io::Result<Simulator> {
        let store = Arc::new(ParticleStore::new());
        let params = Arc::new(ParameterSet::new(PhysicsParams::from(sim_params.physics)));
        let controls = Controls::new(store.clone(), params.clone(), sim_params);

        let simulation = SimulationLoop::start(store, params, sim_params)?;
        let render = if sim_params.render.enabled {
            Some(RenderLoop::start(controls.clone(), sim_params, capture)?)
        } else {
            None
        };
        Ok(Simulator {
            controls,
            simulation,
            render,
        })
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn render(&self) -> Option<&RenderLoop> {
        self.render.as_ref()
    }

    pub fn simulation(&self) -> &SimulationLoop {
        &self.simulation
    }

    /// Stops rendering first, then simulation, and waits for both threads.
    pub fn shutdown(mut self) -> ShutdownReport {
        let frames = match self.render.as_mut() {
            Some(render) => {
                render.stop();
                render.frames()
            }
            None => 0,
        };
        self.simulation.stop();
        let report = ShutdownReport {
            ticks: self.simulation.ticks(),
            frames,
            particles: self.controls.particle_count(),
        };
        info!("Shut down: {:?}", report);
        report
    }
}
