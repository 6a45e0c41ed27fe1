//! Line-based stand-in for the control panel: one command per line, parsed into a
//! `Command` and applied through `Controls`.

use rand::Rng;

use crate::controls::{parse_field, Controls};
use crate::error::InputError;
use crate::sim_params::SpawnDefaults;

pub const HELP: &str = "\
commands:
  spawn [vx vy mass]          spawn at the centre, missing fields use the defaults
  spawn_at x y vx vy mass     spawn anywhere
  burst n                     spawn n (up to spawn.max_burst) particles with jittered
                              default velocities
  apply gravity drag bounce   replace the physics parameters
  params                      show the physics parameters
  list                        show every particle
  count                       show the particle count
  help
  quit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Spawn { vx: f64, vy: f64, mass: f64 },
    SpawnAt { x: f64, y: f64, vx: f64, vy: f64, mass: f64 },
    Burst(u32),
    Apply { gravity: f64, drag: f64, bounce: f64 },
    Params,
    List,
    Count,
    Help,
    Quit,
    Empty,
}

impl Command {
    pub fn parse(line: &str, defaults: &SpawnDefaults) -> Result<Command, InputError> {
        let mut words = line.split_whitespace();
        let name = match words.next() {
            Some(name) => name,
            None => return Ok(Command::Empty),
        };
        let args: Vec<&str> = words.collect();
        let command = match name {
            "spawn" => match args.as_slice() {
                [] => Command::Spawn {
                    vx: defaults.vx,
                    vy: defaults.vy,
                    mass: defaults.mass,
                },
                [vx, vy] => Command::Spawn {
                    vx: parse_field("vx", vx)?,
                    vy: parse_field("vy", vy)?,
                    mass: defaults.mass,
                },
                [vx, vy, mass] => Command::Spawn {
                    vx: parse_field("vx", vx)?,
                    vy: parse_field("vy", vy)?,
                    mass: parse_field("mass", mass)?,
                },
                _ => return Err(arity("spawn", "0, 2 or 3", args.len())),
            },
            "spawn_at" => match args.as_slice() {
                [x, y, vx, vy, mass] => Command::SpawnAt {
                    x: parse_field("x", x)?,
                    y: parse_field("y", y)?,
                    vx: parse_field("vx", vx)?,
                    vy: parse_field("vy", vy)?,
                    mass: parse_field("mass", mass)?,
                },
                _ => return Err(arity("spawn_at", "5", args.len())),
            },
            "burst" => match args.as_slice() {
                [n] => {
                    let n = n.parse::<u32>().map_err(|_| InputError::NotANumber {
                        field: "n",
                        value: n.to_string(),
                    })?;
                    if n > defaults.max_burst {
                        return Err(InputError::BurstTooLarge {
                            requested: n,
                            max: defaults.max_burst,
                        });
                    }
                    Command::Burst(n)
                }
                _ => return Err(arity("burst", "1", args.len())),
            },
            "apply" => match args.as_slice() {
                [gravity, drag, bounce] => Command::Apply {
                    gravity: parse_field("gravity", gravity)?,
                    drag: parse_field("drag", drag)?,
                    bounce: parse_field("bounce", bounce)?,
                },
                _ => return Err(arity("apply", "3", args.len())),
            },
            "params" => Command::Params,
            "list" => Command::List,
            "count" => Command::Count,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(InputError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}

fn arity(command: &'static str, expected: &'static str, got: usize) -> InputError {
    InputError::WrongArity {
        command,
        expected,
        got,
    }
}

/// Result of running one line.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Quit,
}

/// Parses and runs one line against `controls`.
pub fn execute(line: &str, controls: &Controls, defaults: &SpawnDefaults) -> Reply {
    let command = match Command::parse(line, defaults) {
        Ok(command) => command,
        Err(e) => {
            log::warn!("Rejected input '{}': {}", line.trim(), e);
            return Reply::Text(format!("Input error: {}", e));
        }
    };
    match run(command, controls, defaults) {
        Ok(reply) => reply,
        Err(e) => {
            log::warn!("Rejected input '{}': {}", line.trim(), e);
            Reply::Text(format!("Input error: {}", e))
        }
    }
}

fn run(command: Command, controls: &Controls, defaults: &SpawnDefaults) -> Result<Reply, InputError> {
    let text = match command {
        Command::Spawn { vx, vy, mass } => {
            format!("spawned {}", controls.spawn_at_center(vx, vy, mass)?)
        }
        Command::SpawnAt { x, y, vx, vy, mass } => {
            format!("spawned {}", controls.spawn_particle(x, y, vx, vy, mass)?)
        }
        Command::Burst(n) => {
            let mut rng = rand::thread_rng();
            for _ in 0..n {
                let vx = defaults.vx + rng.gen_range(-100.0, 100.0);
                let vy = defaults.vy + rng.gen_range(-100.0, 100.0);
                controls.spawn_at_center(vx, vy, defaults.mass)?;
            }
            format!("spawned {} particles", n)
        }
        Command::Apply {
            gravity,
            drag,
            bounce,
        } => {
            controls.set_parameters(gravity, drag, bounce)?;
            "applied".to_string()
        }
        Command::Params => {
            let p = controls.parameters();
            format!("gravity={} drag={} bounce={}", p.gravity, p.drag, p.bounce)
        }
        Command::List => controls
            .get_snapshot()
            .iter()
            .enumerate()
            .map(|(i, p)| format!("#{} x={:.1} y={:.1} r={:.1}", i, p.x, p.y, p.radius))
            .collect::<Vec<_>>()
            .join("\n"),
        Command::Count => format!("{} particles", controls.particle_count()),
        Command::Help => HELP.to_string(),
        Command::Quit => return Ok(Reply::Quit),
        Command::Empty => String::new(),
    };
    Ok(Reply::Text(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameter_set::{ParameterSet, PhysicsParams};
    use crate::particle_store::ParticleStore;
    use crate::sim_params::SimParams;
    use std::sync::Arc;

    fn controls() -> Controls {
        Controls::new(
            Arc::new(ParticleStore::new()),
            Arc::new(ParameterSet::new(PhysicsParams::default())),
            &SimParams::default(),
        )
    }

    #[test]
    fn parse_fills_in_spawn_defaults() {
        let defaults = SpawnDefaults::default();
        assert_eq!(
            Command::parse("spawn", &defaults),
            Ok(Command::Spawn {
                vx: 100.0,
                vy: 0.0,
                mass: 10.0
            })
        );
        assert_eq!(
            Command::parse("  spawn -20 5 ", &defaults),
            Ok(Command::Spawn {
                vx: -20.0,
                vy: 5.0,
                mass: 10.0
            })
        );
        assert_eq!(Command::parse("   ", &defaults), Ok(Command::Empty));
    }

    #[test]
    fn parse_rejects_bad_input() {
        let defaults = SpawnDefaults::default();
        assert_eq!(
            Command::parse("apply abc 0.2 0.9", &defaults),
            Err(InputError::NotANumber {
                field: "gravity",
                value: "abc".to_string()
            })
        );
        assert!(matches!(
            Command::parse("spawn 1", &defaults),
            Err(InputError::WrongArity { got: 1, .. })
        ));
        assert!(matches!(
            Command::parse("teleport", &defaults),
            Err(InputError::UnknownCommand(_))
        ));
        assert!(Command::parse("burst -3", &defaults).is_err());
    }

    #[test]
    fn rejected_apply_keeps_previous_parameters() {
        let controls = controls();
        let defaults = SpawnDefaults::default();
        assert_eq!(
            execute("apply 800 0.1 0.5", &controls, &defaults),
            Reply::Text("applied".to_string())
        );
        let before = controls.parameters();

        match execute("apply abc 0.3 0.3", &controls, &defaults) {
            Reply::Text(text) => assert!(text.starts_with("Input error")),
            Reply::Quit => panic!("unexpected quit"),
        }
        assert_eq!(controls.parameters(), before);
    }

    #[test]
    fn spawn_and_burst_grow_the_population() {
        let controls = controls();
        let defaults = SpawnDefaults::default();
        execute("spawn", &controls, &defaults);
        execute("spawn_at 10 20 0 0 4", &controls, &defaults);
        execute("burst 5", &controls, &defaults);
        execute("spawn 0 0 0", &controls, &defaults);
        assert_eq!(controls.particle_count(), 7);
        assert_eq!(
            execute("count", &controls, &defaults),
            Reply::Text("7 particles".to_string())
        );
        match execute("list", &controls, &defaults) {
            Reply::Text(text) => {
                assert_eq!(text.lines().count(), 7);
                assert!(text.lines().nth(1).unwrap().starts_with("#1 x=10.0 y=20.0 r=6.0"));
            }
            Reply::Quit => panic!("unexpected quit"),
        }
        assert_eq!(execute("quit", &controls, &defaults), Reply::Quit);
    }

    #[test]
    fn burst_is_capped_by_max_burst() {
        let defaults = SpawnDefaults::default();
        assert_eq!(Command::parse("burst 1000", &defaults), Ok(Command::Burst(1000)));
        assert_eq!(
            Command::parse("burst 1001", &defaults),
            Err(InputError::BurstTooLarge {
                requested: 1001,
                max: 1000
            })
        );

        let controls = controls();
        let small = SpawnDefaults {
            max_burst: 3,
            ..SpawnDefaults::default()
        };
        match execute("burst 4", &controls, &small) {
            Reply::Text(text) => assert!(text.starts_with("Input error")),
            Reply::Quit => panic!("unexpected quit"),
        }
        assert_eq!(controls.particle_count(), 0);
        execute("burst 3", &controls, &small);
        assert_eq!(controls.particle_count(), 3);
    }
}
