use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::info;

use crate::fps_estimator::FpsEstimator;
use crate::parameter_set::ParameterSet;
use crate::particle_store::ParticleStore;
use crate::sim_params::{Bounds, SimParams};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Stopped,
}

/// Counters shared between a loop thread and its handle.
#[derive(Debug, Default)]
pub(crate) struct LoopStatus {
    running: AtomicBool,
    iterations: AtomicU64,
}

impl LoopStatus {
    pub(crate) fn started() -> Arc<Self> {
        let status = LoopStatus::default();
        status.running.store(true, Ordering::SeqCst);
        Arc::new(status)
    }

    pub(crate) fn state(&self) -> LoopState {
        if self.running.load(Ordering::SeqCst) {
            LoopState::Running
        } else {
            LoopState::Stopped
        }
    }

    pub(crate) fn iterations(&self) -> u64 {
        self.iterations.load(Ordering::SeqCst)
    }

    pub(crate) fn count_iteration(&self) {
        self.iterations.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn stopped(&self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Blocks for up to `timeout`. Returns true if the loop should exit, either because a
/// stop was requested or because the handle went away.
pub(crate) fn wait_for_stop(stop_rx: &crossbeam_channel::Receiver<()>, timeout: Duration) -> bool {
    crossbeam_channel::select! {
        recv(stop_rx) -> _ => true,
        default(timeout) => false,
    }
}

/// Background thread that advances the particle store at a fixed tick rate.
pub struct SimulationLoop {
    stop_tx: Option<crossbeam_channel::Sender<()>>,
    thread: Option<std::thread::JoinHandle<()>>,
    status: Arc<LoopStatus>,
}

impl SimulationLoop {
    pub fn start(
        store: Arc<ParticleStore>,
        params: Arc<ParameterSet>,
        sim_params: &SimParams,
    ) -> std::io::Result<SimulationLoop> {
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);
        let status = LoopStatus::started();
        let bounds = sim_params.bounds();
        let max_step = sim_params.max_step();
        let tick_rate = sim_params.tick_rate;

        let thread = {
            let status = status.clone();
            std::thread::Builder::new()
                .name("simulation".into())
                .spawn(move || {
                    run(&store, &params, bounds, tick_rate, max_step, &stop_rx, &status);
                    status.stopped();
                })?
        };
        info!(
            "Simulation loop started at {} Hz, max step {:?}",
            tick_rate, max_step
        );
        Ok(SimulationLoop {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
            status,
        })
    }

    pub fn state(&self) -> LoopState {
        self.status.state()
    }

    pub fn ticks(&self) -> u64 {
        self.status.iterations()
    }

    /// Asks the thread to exit after the tick in progress, then waits for it.
    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                log::error!("Simulation thread panicked");
            }
            info!("Simulation loop stopped after {} ticks", self.ticks());
        }
    }
}

impl Drop for SimulationLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Time since the previous tick, capped at `max_step` so a stall never turns into one
/// huge jump.
pub(crate) fn tick_dt(clock: &mut FpsEstimator, max_step: Duration) -> Duration {
    clock.tick().min(max_step)
}

fn run(
    store: &ParticleStore,
    params: &ParameterSet,
    bounds: Bounds,
    tick_rate: f64,
    max_step: Duration,
    stop_rx: &crossbeam_channel::Receiver<()>,
    status: &LoopStatus,
) {
    let mut clock = FpsEstimator::new(tick_rate);
    loop {
        let dt = tick_dt(&mut clock, max_step);
        // Parameters are sampled once, so the whole pass sees one triple.
        let physics = params.get();
        store.tick_all(&physics, &bounds, dt.as_secs_f64());
        status.count_iteration();

        if wait_for_stop(stop_rx, clock.time_until_next()) {
            break;
        }
    }
}
