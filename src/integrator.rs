//! Semi-implicit Euler stepping for a single particle.
//!
//! Velocity is updated first (gravity, then drag) and the new velocity is used to move
//! the particle. Wall hits are resolved afterwards by clamping the particle back inside
//! the box and reflecting the velocity component on that axis, scaled by `bounce`.

use crate::parameter_set::PhysicsParams;
use crate::particle::Particle;
use crate::sim_params::Bounds;

/// Advance `particle` by `dt` seconds. Mass and radius are never touched.
///
/// A non-positive `dt` returns the particle as-is. Non-finite inputs give an
/// unspecified result.
pub fn step(particle: &Particle, params: &PhysicsParams, bounds: &Bounds, dt: f64) -> Particle {
    if dt <= 0.0 {
        return *particle;
    }
    let mut next = *particle;

    next.velocity[1] += params.gravity * dt;

    let damping = drag_factor(params.drag, dt);
    next.velocity[0] *= damping;
    next.velocity[1] *= damping;

    next.position[0] += next.velocity[0] * dt;
    next.position[1] += next.velocity[1] * dt;

    let (x, vx) = resolve_axis(
        next.position[0],
        next.velocity[0],
        next.radius,
        bounds.width,
        params.bounce,
    );
    let (y, vy) = resolve_axis(
        next.position[1],
        next.velocity[1],
        next.radius,
        bounds.height,
        params.bounce,
    );
    next.position = [x, y];
    next.velocity = [vx, vy];
    next
}

/// Multiplier applied to velocity for one step. Stays in [0, 1] for non-negative drag,
/// so drag can stop a particle but never turn it around.
pub fn drag_factor(drag: f64, dt: f64) -> f64 {
    (1.0 - drag * dt).max(0.0)
}

// Returns the resolved (position, velocity) along one axis of length `extent`.
fn resolve_axis(pos: f64, vel: f64, radius: f64, extent: f64, bounce: f64) -> (f64, f64) {
    // Too big to fit: pin to the middle rather than bounce between both walls.
    if radius > extent / 2.0 {
        return (extent / 2.0, 0.0);
    }
    if pos - radius < 0.0 {
        (radius, -vel * bounce)
    } else if pos + radius > extent {
        (extent - radius, -vel * bounce)
    } else {
        (pos, vel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f64 = 1.0 / 60.0;

    fn params(gravity: f64, drag: f64, bounce: f64) -> PhysicsParams {
        PhysicsParams {
            gravity,
            drag,
            bounce,
        }
    }

    fn particle(position: [f64; 2], velocity: [f64; 2], mass: f64) -> Particle {
        Particle::new(position, velocity, mass, 3.0)
    }

    fn inside(p: &Particle, bounds: &Bounds) -> bool {
        const EPS: f64 = 1e-9;
        p.position[0] - p.radius >= -EPS
            && p.position[0] + p.radius <= bounds.width + EPS
            && p.position[1] - p.radius >= -EPS
            && p.position[1] + p.radius <= bounds.height + EPS
    }

    #[test]
    fn zero_dt_is_a_no_op() {
        let bounds = Bounds::default();
        let p = particle([5.0, 700.0], [-30.0, 12.0], 50.0);
        assert_eq!(step(&p, &PhysicsParams::default(), &bounds, 0.0), p);
    }

    #[test]
    fn mass_and_radius_survive_any_step() {
        let bounds = Bounds::default();
        let cases = [
            particle([320.0, 240.0], [100.0, 0.0], 10.0),
            particle([1.0, 1.0], [-500.0, -500.0], 2.0),
            particle([639.0, 479.0], [900.0, 900.0], 0.5),
            particle([320.0, 240.0], [0.0, 0.0], 20000.0),
        ];
        let settings = [
            params(1500.0, 0.2, 0.9),
            params(-800.0, 0.0, 1.2),
            params(0.0, 50.0, 0.0),
        ];
        for p in cases.iter() {
            for s in settings.iter() {
                for dt in &[0.0, 0.001, DT, 0.05, 1.0] {
                    let next = step(p, s, &bounds, *dt);
                    assert_eq!(next.mass, p.mass);
                    assert_eq!(next.radius, p.radius);
                }
            }
        }
    }

    #[test]
    fn drag_never_reverses_or_amplifies() {
        assert_eq!(drag_factor(0.0, DT), 1.0);
        assert!(drag_factor(0.2, DT) < 1.0);
        assert_eq!(drag_factor(100.0, 1.0), 0.0);

        let bounds = Bounds::default();
        let p = particle([320.0, 240.0], [200.0, -50.0], 10.0);
        let next = step(&p, &params(0.0, 1000.0, 0.9), &bounds, DT);
        assert_eq!(next.velocity, [0.0, 0.0]);
        assert_eq!(next.position, p.position);
    }

    #[test]
    fn wall_hits_reflect_and_scale_by_bounce() {
        let bounds = Bounds::default();
        let no_forces = params(0.0, 0.0, 0.5);
        let r = radius_for(10.0);

        let left = step(&particle([r, 240.0], [-40.0, 0.0], 10.0), &no_forces, &bounds, DT);
        assert_eq!(left.position[0], r);
        assert_eq!(left.velocity[0], 20.0);

        let right = step(
            &particle([bounds.width - r, 240.0], [40.0, 0.0], 10.0),
            &no_forces,
            &bounds,
            DT,
        );
        assert_eq!(right.position[0], bounds.width - r);
        assert_eq!(right.velocity[0], -20.0);

        let top = step(&particle([320.0, r], [0.0, -40.0], 10.0), &no_forces, &bounds, DT);
        assert_eq!(top.position[1], r);
        assert_eq!(top.velocity[1], 20.0);

        let bottom = step(
            &particle([320.0, bounds.height - r], [0.0, 40.0], 10.0),
            &no_forces,
            &bounds,
            DT,
        );
        assert_eq!(bottom.position[1], bounds.height - r);
        assert_eq!(bottom.velocity[1], -20.0);

        for p in [left, right, top, bottom].iter() {
            assert!(inside(p, &bounds));
        }
    }

    #[test]
    fn corner_hit_reflects_both_axes() {
        let bounds = Bounds::default();
        let r = radius_for(10.0);
        let p = particle([r, r], [-10.0, -10.0], 10.0);
        let next = step(&p, &params(0.0, 0.0, 1.0), &bounds, DT);
        assert_eq!(next.position, [r, r]);
        assert_eq!(next.velocity, [10.0, 10.0]);
    }

    #[test]
    fn dropped_particle_falls_then_bounces_off_floor() {
        let bounds = Bounds::default();
        let settings = params(1500.0, 0.2, 0.9);
        let mut p = particle([320.0, 240.0], [100.0, 0.0], 10.0);

        for _ in 0..1000 {
            let expected_impact_vy = (p.velocity[1] + settings.gravity * DT) * drag_factor(0.2, DT);
            let next = step(&p, &settings, &bounds, DT);
            if next.velocity[1] < 0.0 {
                assert_eq!(next.position[1], bounds.height - p.radius);
                assert!((next.velocity[1] + 0.9 * expected_impact_vy).abs() < 1e-9);
                return;
            }
            assert!(next.position[1] > p.position[1]);
            assert!(inside(&next, &bounds));
            p = next;
        }
        panic!("particle never reached the floor");
    }

    #[test]
    fn oversized_particle_is_pinned_to_center() {
        let bounds = Bounds::default();
        let p = particle([320.0, 240.0], [100.0, 0.0], 20000.0);
        assert!(p.radius > bounds.width / 2.0);

        let mut next = p;
        for _ in 0..10 {
            next = step(&next, &PhysicsParams::default(), &bounds, DT);
            assert_eq!(next.position, [320.0, 240.0]);
            assert_eq!(next.velocity, [0.0, 0.0]);
        }
    }

    #[test]
    fn wide_but_not_tall_particle_pins_one_axis() {
        let bounds = Bounds {
            width: 100.0,
            height: 1000.0,
        };
        let p = particle([50.0, 500.0], [30.0, 0.0], 400.0);
        assert_eq!(p.radius, 60.0);
        let next = step(&p, &params(100.0, 0.0, 0.9), &bounds, DT);
        assert_eq!(next.position[0], 50.0);
        assert_eq!(next.velocity[0], 0.0);
        assert!(next.position[1] > 500.0);
    }

    fn radius_for(mass: f64) -> f64 {
        crate::particle::radius_for_mass(mass, 3.0)
    }
}
