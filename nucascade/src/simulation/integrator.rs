//! Step-size control and step geometry for the cascade
//!
//! Provides the adaptive time step shared by all active particles, the
//! plane test that decides whether a nucleon lies in the corridor swept by a
//! step, and the projection used for the impact parameter.

use crate::simulation::constants::{HBARC, MIN_STEP_FRACTION};
use crate::simulation::states::{NVec3, Particle, ParticleStatus};

/// Step distance and time step chosen for one cascade step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub distance: f64, // distance covered by the fastest active particle (fm)
    pub time: f64,     // time step (MeV⁻¹)
}

/// Choose the common step for the active particles `kicked`
///
/// The fastest particle moves `max_distance`, shortened so that no active
/// particle passes its closest approach to another nucleon (active or
/// background) or crosses the surface of radius `radius` within one step:
///   d = min(max_distance, β_max·t* over approaching pairs, β_max·s/|β_i| to the surface)
///   d >= MIN_STEP_FRACTION * max_distance
///   dt = d / (β_max * ħc)
/// A zero distance or a particle set at rest gives a zero time step.
pub fn adaptive_step(particles: &[Particle], kicked: &[usize], max_distance: f64, radius: f64) -> Step {
    let beta_max = kicked
        .iter()
        .map(|&i| particles[i].beta().norm())
        .fold(0.0, f64::max);

    if beta_max <= 0.0 || max_distance <= 0.0 {
        return Step { distance: 0.0, time: 0.0 };
    }

    let floor = MIN_STEP_FRACTION * max_distance;
    let mut distance = max_distance;
    let mut clip = |travel: f64| distance = distance.min(travel.max(floor));

    for &i in kicked {
        let particle = &particles[i];
        if !particle.status.is_active() {
            continue;
        }

        for (j, other) in particles.iter().enumerate() {
            if j == i || !(other.status.is_active() || other.status == ParticleStatus::Background) {
                continue;
            }
            if let Some(t_star) = closest_approach_time(particle, other) {
                clip(beta_max * t_star);
            }
        }

        if let Some(s) = distance_to_surface(particle, radius) {
            clip(beta_max * s / particle.beta().norm());
        }
    }

    Step {
        distance,
        time: distance / (beta_max * HBARC),
    }
}

/// Velocity in units of c, zero for anything not propagating
fn velocity(particle: &Particle) -> NVec3 {
    if particle.status.is_active() {
        particle.beta()
    } else {
        NVec3::zeros()
    }
}

/// Time (fm/c) until two particles reach their closest approach, `None` if
/// they are not approaching each other
pub fn closest_approach_time(a: &Particle, b: &Particle) -> Option<f64> {
    // r: separation, v: relative velocity (units of c)
    let r = b.position - a.position;
    let v = velocity(b) - velocity(a);
    let rv = r.dot(&v);
    let v2 = v.norm_squared();
    if rv >= 0.0 || v2 <= 0.0 {
        return None;
    }
    Some(-rv / v2)
}

/// Path length from inside a sphere of radius `radius` to its surface along
/// the momentum, `None` outside the sphere or at rest
fn distance_to_surface(particle: &Particle, radius: f64) -> Option<f64> {
    let x = particle.position;
    let r2 = radius * radius;
    if !(x.norm_squared() < r2) || particle.momentum.p() <= 0.0 {
        return None;
    }
    let u = particle.momentum.vec.normalize();
    let xu = x.dot(&u);
    Some(-xu + (xu * xu - (x.norm_squared() - r2)).sqrt())
}

/// True if `position` lies between the planes through `point1` and `point2`
/// normal to the segment joining them
///
/// The end plane is inclusive and the start plane is not, so a nucleon that a
/// step ends on is seen by that step only.
pub fn between_planes(position: &NVec3, point1: &NVec3, point2: &NVec3) -> bool {
    let dist = point2 - point1;
    (position - point1).dot(&dist) > 0.0 && (position - point2).dot(&dist) <= 0.0
}

/// Projection of `position` onto the plane through `plane_pt` with unit normal `plane_vec`
pub fn project(position: &NVec3, plane_pt: &NVec3, plane_vec: &NVec3) -> NVec3 {
    let projection = (position - plane_pt).dot(plane_vec) * plane_vec;
    position - projection
}
