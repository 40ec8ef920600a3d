//! # Update Kernel
//!
//! Pure function from one particle's previous state, the collider snapshot
//! and the tuning constants to its next position and velocity.
//!
//! ```text
//! 1. integrate          pos' = pos + vel
//! 2. drag / homing      flagged particles only
//! 3. capsule pass       first hit wins, swirl accumulates until then
//! 4. point pass         only if (3) found no hit, spheres at the tips
//! 5. wall reflection    per axis, only while moving outward
//! ```
//!
//! Collision tests use the position *before* integration; pushes are added
//! to the integrated position.

use crate::collider::Collider;
use crate::math::{lerp, Vec3};
use crate::particle::{Particle, FLAG_INTERACTED};
use crate::tuning::{Bounds, Tuning};

/// Next position (with flag) and velocity of one particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    /// Position (xyz) + interaction flag (w).
    pub position: [f32; 4],
    /// Velocity (xyz) + unused lane (w).
    pub velocity: [f32; 4],
}

/// Runs the update kernel for one particle.
///
/// The seed is not touched; the kernel never draws random numbers.
#[must_use]
pub fn simulate(prev: &Particle, colliders: &[Collider], tuning: &Tuning) -> Motion {
    let pos = prev.position_xyz();
    let vel = prev.velocity_xyz();

    let mut out_pos = pos + vel;
    let mut out_vel = vel;
    let mut out_vel_w = prev.velocity[3];
    let mut flag = prev.position[3];

    if prev.is_interacted() {
        out_vel = out_vel * tuning.drag;
        out_vel_w *= tuning.drag;
        // At the origin there is no direction to pull in.
        if let Some(home) = (prev.origin_xyz() - out_pos).try_normalize() {
            out_vel += home * tuning.homing_strength;
        }
    }

    let collided = capsule_pass(pos, colliders, tuning, &mut out_pos, &mut out_vel)
        || point_pass(pos, colliders, tuning, &mut out_pos, &mut out_vel);
    if collided {
        flag = FLAG_INTERACTED;
    }

    reflect(&tuning.bounds, &mut out_pos, &mut out_vel);

    Motion {
        position: out_pos.with_w(flag),
        velocity: out_vel.with_w(out_vel_w),
    }
}

/// Scans colliders as capsules. Returns `true` on the first hit.
fn capsule_pass(
    pos: Vec3,
    colliders: &[Collider],
    tuning: &Tuning,
    out_pos: &mut Vec3,
    out_vel: &mut Vec3,
) -> bool {
    for collider in colliders {
        let Some(axis) = collider.axis() else {
            continue;
        };

        let rel = pos - collider.base_point();
        let along = axis.up.dot(rel);
        if along <= 0.0 || along >= axis.height {
            continue;
        }

        let cross = axis.up.cross(rel);
        let dist = cross.length();
        let boundary = lerp(
            collider.base_radius(),
            collider.tip_radius(),
            along / axis.height,
        );

        if boundary > dist {
            // On the axis the radial direction is undefined; any
            // perpendicular puts the particle exactly on the surface.
            let outward = cross
                .cross(axis.up)
                .normalize_or(axis.up.any_orthonormal());
            let movement = outward * boundary;
            *out_pos += movement;
            *out_vel += movement * tuning.collision_kick;
            return true;
        }

        if boundary * 2.0 - dist > 0.0 {
            if let Some(tangent) = cross.try_normalize() {
                *out_vel += tangent * tuning.swirl_strength;
            }
        }
    }
    false
}

/// Scans the tip spheres. Returns `true` on the first hit.
fn point_pass(
    pos: Vec3,
    colliders: &[Collider],
    tuning: &Tuning,
    out_pos: &mut Vec3,
    out_vel: &mut Vec3,
) -> bool {
    for collider in colliders {
        let radius = collider.tip_radius();
        let rel = pos - collider.tip_point();
        let dist = rel.length();

        if dist < radius {
            let movement = rel.normalize_or(Vec3::X) * radius;
            *out_pos += movement;
            *out_vel += movement * tuning.collision_kick;
            return true;
        }

        if radius * 2.0 - dist > 0.0 {
            // Swirl stays in the X/Y plane.
            if let Some(tangent) = Vec3::new(rel.y, -rel.x, 0.0).try_normalize() {
                *out_vel += tangent * tuning.swirl_strength;
            }
        }
    }
    false
}

/// Reflects position and velocity off the box walls, one axis at a time.
///
/// An axis is reflected only while its velocity still points out of the box.
/// The doubled overshoot can leave a particle outside for a few ticks after
/// the crossing; during those ticks it drifts back in untouched.
fn reflect(bounds: &Bounds, pos: &mut Vec3, vel: &mut Vec3) {
    let [hx, hy, hz] = bounds.half_extents;
    reflect_axis(&mut pos.x, &mut vel.x, hx);
    reflect_axis(&mut pos.y, &mut vel.y, hy);
    reflect_axis(&mut pos.z, &mut vel.z, hz);
}

#[inline]
fn reflect_axis(p: &mut f32, v: &mut f32, half: f32) {
    if *p < -half && *v < 0.0 {
        *p += (*p + half) * 2.0;
        *v *= -1.0;
    }
    if *p > half && *v > 0.0 {
        *p += (*p - half) * 2.0;
        *v *= -1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle(pos: [f32; 3], vel: [f32; 3], flag: f32) -> Particle {
        Particle {
            position: [pos[0], pos[1], pos[2], flag],
            velocity: [vel[0], vel[1], vel[2], 0.0],
            origin: [pos[0], pos[1], pos[2], 0.0],
            random_seed: 1,
            _padding: [0; 3],
        }
    }

    /// Vertical capsule through the origin, from y = -1 to y = 1.
    fn upright(radius: f32) -> Collider {
        Collider::new([0.0, -1.0, 0.0], radius, [0.0, 1.0, 0.0], radius)
    }

    #[test]
    fn test_free_flight() {
        let p = particle([0.5, -0.25, 1.0], [0.01, 0.02, -0.03], 0.0);
        let m = simulate(&p, &[], &Tuning::default());
        assert_eq!(m.position, [0.5 + 0.01, -0.25 + 0.02, 1.0 - 0.03, 0.0]);
        assert_eq!(m.velocity, p.velocity);
    }

    #[test]
    fn test_drag_and_homing_for_flagged() {
        let mut p = particle([1.0, 0.0, 0.0], [0.1, 0.0, 0.0], 1.0);
        p.origin = [0.0, 0.0, 0.0, 0.0];
        let m = simulate(&p, &[], &Tuning::default());

        assert_eq!(m.position[3], 1.0);
        // 0.1 * 0.95 minus homing toward -X.
        let expected = 0.1 * 0.95 - 0.0005;
        assert!((m.velocity[0] - expected).abs() < 1e-7);
    }

    #[test]
    fn test_homing_at_origin_is_finite() {
        let p = particle([0.0, 0.0, 0.0], [0.0, 0.0, 0.0], 1.0);
        let m = simulate(&p, &[], &Tuning::default());
        assert!(m.position.iter().all(|c| c.is_finite()));
        assert!(m.velocity.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn test_wall_reflection_high_side() {
        // Integrates to x = 5.3, 0.1 past the wall.
        let p = particle([5.2, 0.0, 0.0], [0.1, 0.0, 0.0], 0.0);
        let m = simulate(&p, &[], &Tuning::default());
        assert!((m.position[0] - 5.5).abs() < 1e-5, "x = {}", m.position[0]);
        assert_eq!(m.velocity[0], -0.1);
        assert_eq!(m.velocity[1], 0.0);
    }

    #[test]
    fn test_wall_reflection_every_axis() {
        let p = particle([-5.2, -2.0, -2.56], [-0.1, -0.1, -0.1], 0.0);
        let m = simulate(&p, &[], &Tuning::default());
        assert!((m.position[0] - -5.5).abs() < 1e-5);
        assert!((m.position[1] - -2.3).abs() < 1e-5);
        assert!((m.position[2] - -2.86).abs() < 1e-5);
        assert_eq!(&m.velocity[..3], &[0.1, 0.1, 0.1]);
    }

    #[test]
    fn test_crossing_particle_returns_inside() {
        let bounds = Tuning::default().bounds;
        for flag in [0.0, 1.0] {
            let mut p = particle([5.21, 0.0, 0.0], [0.02, 0.0, 0.0], flag);
            p.origin = [0.0; 4];

            for tick in 1..=200 {
                let m = simulate(&p, &[], &Tuning::default());
                p.position = m.position;
                p.velocity = m.velocity;

                assert!(p.is_finite(), "flag {flag}, tick {tick}");
                assert!(p.position[0].abs() < 5.5, "flag {flag}, tick {tick}: x = {}", p.position[0]);
                if tick >= 10 {
                    assert!(bounds.contains([p.position[0], p.position[1], p.position[2]]));
                }
            }
        }
    }

    #[test]
    fn test_outside_moving_inward_is_not_reflected() {
        let p = particle([5.4, 0.0, 0.0], [-0.05, 0.0, 0.0], 0.0);
        let m = simulate(&p, &[], &Tuning::default());
        assert!((m.position[0] - 5.35).abs() < 1e-6);
        assert_eq!(m.velocity[0], -0.05);
    }

    #[test]
    fn test_on_axis_collision_lands_on_surface() {
        let p = particle([0.0, 0.0, 0.0], [0.0, 0.0, 0.0], 0.0);
        let m = simulate(&p, &[upright(0.5)], &Tuning::default());

        assert_eq!(m.position[3], 1.0);
        let radial = Vec3::new(m.position[0], 0.0, m.position[2]);
        assert!((radial.length() - 0.5).abs() < 1e-6);
        assert_eq!(m.position[1], 0.0);

        let v = Vec3::from_xyz(m.velocity);
        assert!(v.length() > 0.0);
        // Kick is 0.1 of the push.
        let push = Vec3::from_xyz(m.position);
        assert!((v - push * 0.1).length() < 1e-7);
    }

    #[test]
    fn test_outside_height_range_is_ignored() {
        // Above the tip and far from the tip sphere.
        let low = Collider::new([0.0, -1.5, 0.0], 0.5, [0.0, -0.5, 0.0], 0.5);
        let p = particle([0.0, 1.5, 0.0], [0.0, 0.0, 0.0], 0.0);
        let m = simulate(&p, &[low], &Tuning::default());
        assert_eq!(m.position, p.position);
        assert_eq!(m.velocity, p.velocity);
    }

    #[test]
    fn test_swirl_accumulates_across_colliders() {
        let p = particle([0.3, 0.0, 0.0], [0.0, 0.0, 0.0], 0.0);

        let one = simulate(&p, &[upright(0.2)], &Tuning::default());
        let two = simulate(&p, &[upright(0.2), upright(0.2)], &Tuning::default());

        assert_eq!(one.position[3], 0.0);
        assert!((one.velocity[2] - -0.0007).abs() < 1e-9);
        assert!((two.velocity[2] - -0.0014).abs() < 1e-9);
        // Position is not displaced by the force field.
        assert_eq!(one.position, p.position);
    }

    #[test]
    fn test_first_collider_wins() {
        let p = particle([0.05, 0.0, 0.0], [0.0, 0.0, 0.0], 0.0);
        let small = upright(0.2);
        let large = upright(0.6);

        let a = simulate(&p, &[small, large], &Tuning::default());
        let b = simulate(&p, &[large, small], &Tuning::default());

        assert!((a.position[0] - (0.05 + 0.2)).abs() < 1e-6);
        assert!((b.position[0] - (0.05 + 0.6)).abs() < 1e-6);
    }

    #[test]
    fn test_point_pass_on_degenerate_collider() {
        let point = Collider::new([1.0, 0.0, 0.0], 0.3, [1.0, 0.0, 0.0], 0.3);
        let p = particle([1.1, 0.0, 0.0], [0.0, 0.0, 0.0], 0.0);
        let m = simulate(&p, &[point], &Tuning::default());

        assert_eq!(m.position[3], 1.0);
        assert!((m.position[0] - 1.4).abs() < 1e-6);
        assert!((m.velocity[0] - 0.03).abs() < 1e-7);
    }

    #[test]
    fn test_point_swirl_stays_in_xy_plane() {
        let sphere = Collider::new([1.0, 0.0, 0.0], 0.3, [1.0, 0.0, 0.0], 0.3);
        let p = particle([1.4, 0.0, 0.2], [0.0, 0.0, 0.0], 0.0);
        let m = simulate(&p, &[sphere], &Tuning::default());

        assert_eq!(m.position, p.position);
        assert_eq!(m.velocity[0], 0.0);
        assert!((m.velocity[1] - -0.0007).abs() < 1e-9);
        assert_eq!(m.velocity[2], 0.0);
    }

    #[test]
    fn test_first_tip_sphere_wins() {
        let right = Collider::new([1.2, 0.0, 0.0], 0.3, [1.2, 0.0, 0.0], 0.3);
        let left = Collider::new([0.8, 0.0, 0.0], 0.3, [0.8, 0.0, 0.0], 0.3);
        let p = particle([1.0, 0.0, 0.0], [0.0, 0.0, 0.0], 0.0);

        let a = simulate(&p, &[right, left], &Tuning::default());
        let b = simulate(&p, &[left, right], &Tuning::default());

        assert!((a.position[0] - 0.7).abs() < 1e-6);
        assert!((a.velocity[0] - -0.03).abs() < 1e-7);
        assert!((b.position[0] - 1.3).abs() < 1e-6);
        assert!((b.velocity[0] - 0.03).abs() < 1e-7);
    }

    #[test]
    fn test_point_pass_skipped_after_capsule_hit() {
        // Inside the capsule and inside the tip sphere of a second collider.
        let point = Collider::new([0.0, 0.0, 0.0], 1.0, [0.0, 0.0, 0.0], 1.0);
        let p = particle([0.0, 0.0, 0.0], [0.0, 0.0, 0.0], 0.0);
        let m = simulate(&p, &[upright(0.5), point], &Tuning::default());

        let radial = Vec3::new(m.position[0], 0.0, m.position[2]);
        assert!((radial.length() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_inactive_slots_have_no_effect() {
        let p = particle([0.0, 0.0, 0.0], [0.01, 0.0, 0.0], 0.0);
        let m = simulate(&p, &[Collider::default(); 8], &Tuning::default());
        assert_eq!(m.position, [0.01, 0.0, 0.0, 0.0]);
        assert_eq!(m.velocity, p.velocity);
    }

    #[test]
    fn test_degenerate_collider_never_produces_nan() {
        let point = Collider::new([0.0; 3], 0.5, [0.0; 3], 0.5);
        let p = particle([0.0, 0.0, 0.0], [0.0, 0.0, 0.0], 1.0);
        let m = simulate(&p, &[point], &Tuning::default());
        assert!(m.position.iter().all(|c| c.is_finite()));
        assert!(m.velocity.iter().all(|c| c.is_finite()));
    }
}
