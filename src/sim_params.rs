use serde::{Deserialize, Serialize};

pub const SIM_WIDTH: f64 = 640.0;
pub const SIM_HEIGHT: f64 = 480.0;
pub const DEFAULT_RADIUS_PER_SQRT_MASS: f64 = 3.0;
pub const DEFAULT_MAX_BURST: u32 = 1000;

// Parameters that define the simulation. These don't change at runtime, except for
// `physics`, which only seeds the live ParameterSet.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct SimParams {
    pub width: f64,
    pub height: f64,

    // Simulation ticks per second.
    pub tick_rate: f64,
    // Longest step a single tick may take, so a stall doesn't turn into one huge jump.
    pub max_step_secs: f64,
    pub radius_per_sqrt_mass: f64,

    #[serde(default)]
    pub physics: PhysicsDefaults,

    #[serde(default)]
    pub spawn: SpawnDefaults,

    #[serde(default)]
    pub render: RenderParams,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct PhysicsDefaults {
    pub gravity: f64,
    pub drag: f64,
    pub bounce: f64,
}

impl Default for PhysicsDefaults {
    fn default() -> Self {
        PhysicsDefaults {
            gravity: 1500.0,
            drag: 0.2,
            bounce: 0.9,
        }
    }
}

// What the control panel spawns when a field is left out.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct SpawnDefaults {
    pub vx: f64,
    pub vy: f64,
    pub mass: f64,
    // Largest `burst` accepted from one command. Particles are never removed.
    #[serde(default = "default_max_burst")]
    pub max_burst: u32,
}

fn default_max_burst() -> u32 {
    DEFAULT_MAX_BURST
}

impl Default for SpawnDefaults {
    fn default() -> Self {
        SpawnDefaults {
            vx: 100.0,
            vy: 0.0,
            mass: 10.0,
            max_burst: DEFAULT_MAX_BURST,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct RenderParams {
    pub enabled: bool,
    pub fps: f64,
    // Write every nth frame to the capture directory. 0 disables capture.
    pub capture_every: u32,
}

impl Default for RenderParams {
    fn default() -> Self {
        RenderParams {
            enabled: true,
            fps: 60.0,
            capture_every: 0,
        }
    }
}

/// Simulation area. Fixed for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Bounds {
            width: SIM_WIDTH,
            height: SIM_HEIGHT,
        }
    }
}

fn positive_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

fn positive_or_default(name: &str, value: &mut f64, fallback: f64) {
    if !(value.is_finite() && *value > 0.0) {
        log::warn!("Invalid {} = {}, using {}", name, value, fallback);
        *value = fallback;
    }
}

impl SimParams {
    /// Replaces values that can't describe a real simulation (zero, negative or
    /// non-finite sizes and rates) with the defaults.
    pub fn validated(mut self) -> SimParams {
        let defaults = SimParams::default();
        positive_or_default("width", &mut self.width, defaults.width);
        positive_or_default("height", &mut self.height, defaults.height);
        positive_or_default("tick_rate", &mut self.tick_rate, defaults.tick_rate);
        positive_or_default(
            "radius_per_sqrt_mass",
            &mut self.radius_per_sqrt_mass,
            defaults.radius_per_sqrt_mass,
        );
        positive_or_default("render.fps", &mut self.render.fps, defaults.render.fps);
        if self.spawn.max_burst == 0 {
            log::warn!("Invalid spawn.max_burst = 0, using {}", defaults.spawn.max_burst);
            self.spawn.max_burst = defaults.spawn.max_burst;
        }
        self
    }

    pub fn bounds(&self) -> Bounds {
        Bounds {
            width: positive_or(self.width, SIM_WIDTH),
            height: positive_or(self.height, SIM_HEIGHT),
        }
    }

    /// Always positive, so every particle gets a positive radius.
    pub fn radius_scale(&self) -> f64 {
        positive_or(self.radius_per_sqrt_mass, DEFAULT_RADIUS_PER_SQRT_MASS)
    }

    pub fn max_step(&self) -> std::time::Duration {
        if self.max_step_secs.is_finite() && self.max_step_secs > 0.0 {
            std::time::Duration::from_secs_f64(self.max_step_secs)
        } else {
            std::time::Duration::from_millis(50)
        }
    }
}

impl std::str::FromStr for SimParams {
    type Err = toml::de::Error;
    fn from_str(serialized: &str) -> Result<Self, Self::Err> {
        let params: SimParams = toml::from_str(serialized)?;
        Ok(params.validated())
    }
}

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            width: SIM_WIDTH,
            height: SIM_HEIGHT,
            tick_rate: 66.0,
            max_step_secs: 0.05,
            radius_per_sqrt_mass: DEFAULT_RADIUS_PER_SQRT_MASS,
            physics: PhysicsDefaults::default(),
            spawn: SpawnDefaults::default(),
            render: RenderParams::default(),
        }
    }
}

pub fn get_sim_config_from_default_file() -> SimParams {
    let config_data = include_str!("../sim_config.toml");
    match config_data.parse() {
        Ok(params) => params,
        Err(e) => {
            log::error!(
                "Failed to parse config file({}): {:?}",
                "../sim_config.toml",
                e
            );
            SimParams::default()
        }
    }
}
