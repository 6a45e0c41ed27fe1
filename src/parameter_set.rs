use std::sync::{Mutex, MutexGuard, PoisonError};

/// Global physics knobs, read by every particle on every tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    /// Acceleration along +y (down), px/s^2.
    pub gravity: f64,
    /// Fraction of velocity removed per second.
    pub drag: f64,
    /// Restitution applied on wall hits.
    pub bounce: f64,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        PhysicsParams {
            gravity: 1500.0,
            drag: 0.2,
            bounce: 0.9,
        }
    }
}

impl From<crate::sim_params::PhysicsDefaults> for PhysicsParams {
    fn from(defaults: crate::sim_params::PhysicsDefaults) -> Self {
        PhysicsParams {
            gravity: defaults.gravity,
            drag: defaults.drag,
            bounce: defaults.bounce,
        }
    }
}

/// The live parameter triple. Updates replace all three fields under one lock, so a
/// reader never sees half of an update.
#[derive(Debug, Default)]
pub struct ParameterSet {
    current: Mutex<PhysicsParams>,
}

impl ParameterSet {
    pub fn new(initial: PhysicsParams) -> Self {
        ParameterSet {
            current: Mutex::new(initial),
        }
    }

    pub fn get(&self) -> PhysicsParams {
        *self.lock()
    }

    pub fn set(&self, params: PhysicsParams) {
        *self.lock() = params;
        log::debug!("Physics parameters now {:?}", params);
    }

    // The guarded value is Copy and is only ever written whole.
    fn lock(&self) -> MutexGuard<'_, PhysicsParams> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn set_replaces_whole_triple() {
        let set = ParameterSet::new(PhysicsParams::default());
        let next = PhysicsParams {
            gravity: -10.0,
            drag: 3.0,
            bounce: 1.5,
        };
        set.set(next);
        assert_eq!(set.get(), next);
    }

    #[test]
    fn readers_never_see_mixed_triples() {
        let set = Arc::new(ParameterSet::new(PhysicsParams {
            gravity: 0.0,
            drag: 0.0,
            bounce: 0.0,
        }));
        let writer = {
            let set = set.clone();
            std::thread::spawn(move || {
                for i in 0..10_000 {
                    let v = i as f64;
                    set.set(PhysicsParams {
                        gravity: v,
                        drag: v,
                        bounce: v,
                    });
                }
            })
        };
        for _ in 0..10_000 {
            let p = set.get();
            assert_eq!(p.gravity, p.drag);
            assert_eq!(p.drag, p.bounce);
        }
        writer.join().unwrap();
    }
}
