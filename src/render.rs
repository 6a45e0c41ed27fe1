//! Headless renderer.
//!
//! Draws each frame into a private back buffer, then swaps it with the shared front
//! buffer so readers only ever see finished frames. The only thing it touches in the
//! simulation is `Controls::get_snapshot`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use image::{Rgb, RgbImage};
use log::{debug, error, info};

use crate::controls::{Controls, ParticleView};
use crate::fps_estimator::FpsEstimator;
use crate::sim_params::SimParams;
use crate::simulation_loop::{wait_for_stop, LoopState, LoopStatus};

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const PARTICLE: Rgb<u8> = Rgb([0, 0, 0]);

/// Where finished frames are written, if anywhere.
#[derive(Debug, Clone)]
pub struct Capture {
    pub dir: PathBuf,
    pub every: u32,
}

pub struct RenderLoop {
    stop_tx: Option<crossbeam_channel::Sender<()>>,
    thread: Option<std::thread::JoinHandle<()>>,
    status: Arc<LoopStatus>,
    front: Arc<Mutex<RgbImage>>,
    fps: Arc<AtomicU32>,
}

impl RenderLoop {
    pub fn start(
        controls: Controls,
        sim_params: &SimParams,
        capture: Option<Capture>,
    ) -> std::io::Result<RenderLoop> {
        let bounds = sim_params.bounds();
        let width = bounds.width.max(1.0).round() as u32;
        let height = bounds.height.max(1.0).round() as u32;
        let front = Arc::new(Mutex::new(RgbImage::from_pixel(width, height, BACKGROUND)));
        let fps = Arc::new(AtomicU32::new(0));
        let status = LoopStatus::started();
        let (stop_tx, stop_rx) = crossbeam_channel::bounded::<()>(1);

        if let Some(capture) = &capture {
            std::fs::create_dir_all(&capture.dir)?;
            info!(
                "Capturing every {} frame(s) to {}",
                capture.every,
                capture.dir.display()
            );
        }

        let target_fps = sim_params.render.fps;
        let thread = {
            let front = front.clone();
            let fps = fps.clone();
            let status = status.clone();
            std::thread::Builder::new()
                .name("render".into())
                .spawn(move || {
                    let mut back = RgbImage::from_pixel(width, height, BACKGROUND);
                    let mut clock = FpsEstimator::new(target_fps);
                    loop {
                        clock.tick();
                        draw_frame(&mut back, &controls.get_snapshot());
                        std::mem::swap(&mut *lock(&front), &mut back);

                        let frame = status.iterations();
                        status.count_iteration();
                        if clock.fps() != fps.swap(clock.fps(), Ordering::Relaxed) {
                            debug!("FPS: {}", clock.fps());
                        }
                        if let Some(capture) = &capture {
                            save_frame(capture, frame, &front);
                        }

                        if wait_for_stop(&stop_rx, clock.time_until_next()) {
                            break;
                        }
                    }
                    status.stopped();
                })?
        };
        info!("Render loop started at {} fps ({}x{})", target_fps, width, height);
        Ok(RenderLoop {
            stop_tx: Some(stop_tx),
            thread: Some(thread),
            status,
            front,
            fps,
        })
    }

    /// Copy of the last completed frame.
    pub fn latest_frame(&self) -> RgbImage {
        lock(&self.front).clone()
    }

    pub fn frames(&self) -> u64 {
        self.status.iterations()
    }

    /// Frames drawn over the last full second.
    pub fn fps(&self) -> u32 {
        self.fps.load(Ordering::Relaxed)
    }

    pub fn state(&self) -> LoopState {
        self.status.state()
    }

    pub fn stop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.try_send(());
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("Render thread panicked");
            }
            info!("Render loop stopped after {} frames", self.frames());
        }
    }
}

impl Drop for RenderLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

fn lock(front: &Mutex<RgbImage>) -> MutexGuard<'_, RgbImage> {
    front.lock().unwrap_or_else(PoisonError::into_inner)
}

fn save_frame(capture: &Capture, frame: u64, front: &Mutex<RgbImage>) {
    if capture.every == 0 || frame % u64::from(capture.every) != 0 {
        return;
    }
    let path = capture.dir.join(format!("frame_{:06}.png", frame));
    if let Err(e) = lock(front).save(&path) {
        error!("Failed to write {}: {:?}", path.display(), e);
    }
}

/// Clears `target` and fills a disc for every particle, clipped to the image.
pub fn draw_frame(target: &mut RgbImage, particles: &[ParticleView]) {
    for pixel in target.pixels_mut() {
        *pixel = BACKGROUND;
    }
    let (width, height) = target.dimensions();
    for p in particles {
        let min_x = (p.x - p.radius).floor().max(0.0) as u32;
        let min_y = (p.y - p.radius).floor().max(0.0) as u32;
        let max_x = (p.x + p.radius).ceil().min(width as f64) as u32;
        let max_y = (p.y + p.radius).ceil().min(height as f64) as u32;
        let r2 = p.radius * p.radius;
        for py in min_y..max_y {
            for px in min_x..max_x {
                // Sample at the pixel centre.
                let dx = px as f64 + 0.5 - p.x;
                let dy = py as f64 + 0.5 - p.y;
                if dx * dx + dy * dy <= r2 {
                    target.put_pixel(px, py, PARTICLE);
                }
            }
        }
    }
}
