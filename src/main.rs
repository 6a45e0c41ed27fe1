use std::io::BufRead;
use std::time::Duration;

use log::{error, info};
use physbox::control_panel::{self, Reply};
use physbox::render::Capture;
use physbox::sim_params::SimParams;

gflags::define! {
    --config: &str = "sim_config.toml"
}
gflags::define! {
    --log_filter: &str = "warn,physbox=info"
}
gflags::define! {
    -h, --help = false
}
gflags::define! {
    /// Exit after this many seconds. 0 runs until `quit` or end of input.
    --run_for_secs: f64 = 0.0
}
gflags::define! {
    /// Write rendered frames here as PNGs.
    --capture_dir: &str = ""
}

fn read_config_from_file(path: &str) -> anyhow::Result<SimParams> {
    let params = std::fs::read_to_string(path)?.parse()?;
    Ok(params)
}

fn get_sim_config() -> SimParams {
    match read_config_from_file(CONFIG.flag) {
        Ok(params) => params,
        Err(e) => {
            error!("Failed to parse config file({}): {:?}", CONFIG.flag, e);
            physbox::sim_params::get_sim_config_from_default_file()
        }
    }
}

fn get_capture(sim_params: &SimParams) -> Option<Capture> {
    if CAPTURE_DIR.flag.is_empty() {
        return None;
    }
    Some(Capture {
        dir: CAPTURE_DIR.flag.into(),
        every: sim_params.render.capture_every.max(1),
    })
}

// Stdin blocks, so it gets its own thread and hands lines over a channel.
fn start_input_thread() -> crossbeam_channel::Receiver<String> {
    let (tx, rx) = crossbeam_channel::unbounded::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to read input: {:?}", e);
                    break;
                }
            }
        }
    });
    rx
}

fn main() -> anyhow::Result<()> {
    gflags::parse();
    if HELP.flag {
        gflags::print_help_and_exit(0);
    }
    scrub_log::init_with_filter_string(LOG_FILTER.flag)
        .map_err(|e| anyhow::anyhow!("Failed to init logging: {:?}", e))?;

    let sim_params = get_sim_config();
    info!("Running with {:?}", sim_params);
    let sim = physbox::Simulator::start(&sim_params, get_capture(&sim_params))?;

    let deadline = if RUN_FOR_SECS.flag > 0.0 {
        crossbeam_channel::after(Duration::from_secs_f64(RUN_FOR_SECS.flag))
    } else {
        crossbeam_channel::never()
    };
    let lines = start_input_thread();
    println!("{}", control_panel::HELP);

    loop {
        crossbeam_channel::select! {
            recv(lines) -> line => match line {
                Ok(line) => match control_panel::execute(&line, sim.controls(), &sim_params.spawn) {
                    Reply::Text(text) => {
                        if !text.is_empty() {
                            println!("{}", text);
                        }
                    }
                    Reply::Quit => break,
                },
                Err(_) => {
                    info!("End of input");
                    // Keep running until the deadline, if there is one.
                    if RUN_FOR_SECS.flag > 0.0 {
                        let _ = deadline.recv();
                    }
                    break;
                }
            },
            recv(deadline) -> _ => {
                info!("Time is up");
                break;
            }
        }
    }

    if let Some(render) = sim.render() {
        info!("Last measured render rate: {} fps", render.fps());
    }
    let report = sim.shutdown();
    println!(
        "{} ticks, {} frames, {} particles",
        report.ticks, report.frames, report.particles
    );
    Ok(())
}
