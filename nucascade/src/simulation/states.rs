//! Core state types for the cascade.
//!
//! Defines the particle entity moved through the nucleus:
//! - `Pid`            species identifier (PDG code)
//! - `ParticleStatus` where the particle is in the cascade life cycle
//! - `Particle`       identity, kinematics, formation zone and lineage
//!
//! Mothers and daughters are indices into the owning nucleon list, never
//! references, so a nucleus is a flat arena.

use std::fmt;
use std::str::FromStr;

use nalgebra::Vector3;

use crate::error::CascadeError;
use crate::simulation::constants::{HBARC, MASS_NUCLEON, MASS_NEUTRON, MASS_PROTON};
use crate::simulation::kinematics::{parse_three_vector, three_vector_string, FourVector};

pub type NVec3 = Vector3<f64>;

/// PDG species identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid(pub i64);

impl Pid {
    pub const PROTON: Pid = Pid(2212);
    pub const NEUTRON: Pid = Pid(2112);

    /// Pole mass in MeV, the average nucleon mass for anything unknown
    pub fn mass(&self) -> f64 {
        match *self {
            Self::PROTON => MASS_PROTON,
            Self::NEUTRON => MASS_NEUTRON,
            _ => MASS_NUCLEON,
        }
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleStatus {
    Background,  // part of the nuclear medium
    Propagating, // active in the cascade
    Escaped,     // left the nucleus
    Captured,    // reached the surface without enough energy to leave
    Interacted,  // stopped at its first interaction (mean free path runs)
}

impl ParticleStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, ParticleStatus::Propagating)
    }

    fn code(&self) -> i32 {
        match self {
            ParticleStatus::Background => 0,
            ParticleStatus::Propagating => 1,
            ParticleStatus::Escaped => 2,
            ParticleStatus::Captured => 3,
            ParticleStatus::Interacted => 4,
        }
    }

    fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(ParticleStatus::Background),
            1 => Some(ParticleStatus::Propagating),
            2 => Some(ParticleStatus::Escaped),
            3 => Some(ParticleStatus::Captured),
            4 => Some(ParticleStatus::Interacted),
            _ => None,
        }
    }
}

impl fmt::Display for ParticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone)]
pub struct Particle {
    pid: Pid,                     // species, fixed at construction
    pub status: ParticleStatus,   // life-cycle state
    pub momentum: FourVector,     // four-momentum (MeV)
    pub position: NVec3,          // position (fm)
    pub formation_zone: f64,      // time left before it may interact (MeV⁻¹)
    pub distance_traveled: f64,   // accumulated path length (fm)
    pub mothers: Vec<usize>,      // indices of the particles that struck it
    pub daughters: Vec<usize>,    // indices of the particles it struck
}

impl Particle {
    pub fn new(pid: Pid, momentum: FourVector, position: NVec3, status: ParticleStatus) -> Self {
        Self {
            pid,
            status,
            momentum,
            position,
            formation_zone: 0.0,
            distance_traveled: 0.0,
            mothers: Vec::new(),
            daughters: Vec::new(),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn mass(&self) -> f64 {
        self.momentum.m()
    }

    /// Velocity in units of c
    pub fn beta(&self) -> NVec3 {
        self.momentum.boost_vector()
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.momentum.e() - self.mass()
    }

    /// Formation time from the momentum before (`p1`) and the momentum transfer or
    /// momentum after (`p2`) the interaction: E(p1) / |m_N² - p1·p2|
    ///
    /// A vanishing denominator stores inf/NaN, which the cascade reports.
    pub fn set_formation_zone(&mut self, p1: &FourVector, p2: &FourVector) {
        self.formation_zone = p1.e() / (MASS_NUCLEON * MASS_NUCLEON - p1.dot(p2)).abs();
    }

    pub fn in_formation_zone(&self) -> bool {
        self.formation_zone > 0.0
    }

    pub fn update_formation_zone(&mut self, time: f64) {
        self.formation_zone -= time;
    }

    /// Distance covered in a time `time` (MeV⁻¹): |p|/E · time · ħc
    pub fn travel_distance(&self, time: f64) -> f64 {
        self.momentum.p() / self.momentum.e() * time * HBARC
    }

    /// Offset of length `dist` along the momentum direction
    pub fn step_vector(&self, dist: f64) -> NVec3 {
        let theta = self.momentum.theta();
        let phi = self.momentum.phi();

        // Spherical -> Cartesian offset
        NVec3::new(
            dist * theta.sin() * phi.cos(),
            dist * theta.sin() * phi.sin(),
            dist * theta.cos(),
        )
    }

    /// Move along the momentum direction for a time `time`
    pub fn propagate(&mut self, time: f64) {
        let dist = self.travel_distance(time);
        self.space_propagate(dist);
    }

    /// Undo a `propagate` of the same time
    pub fn back_propagate(&mut self, time: f64) {
        let dist = self.travel_distance(time);
        self.space_propagate(-dist);
    }

    /// Move a fixed distance (fm) along the momentum direction
    pub fn space_propagate(&mut self, dist: f64) {
        self.position += self.step_vector(dist);
        self.distance_traveled += dist;
    }
}

impl PartialEq for Particle {
    fn eq(&self, other: &Self) -> bool {
        self.pid == other.pid
            && self.status == other.status
            && self.formation_zone == other.formation_zone
            && self.momentum == other.momentum
            && self.position == other.position
            && self.mothers == other.mothers
            && self.daughters == other.daughters
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Particle({}, {}, {}, {})",
            self.pid,
            self.momentum,
            three_vector_string(&self.position),
            self.status
        )
    }
}

/// Parses the `Display` form back, `Particle(pid, FourVector(..), ThreeVector(..), status)`
impl FromStr for Particle {
    type Err = CascadeError;

    fn from_str(s: &str) -> Result<Self, CascadeError> {
        let bad = || CascadeError::Parse(format!("malformed particle {s:?}"));
        let inner = s
            .trim()
            .strip_prefix("Particle(")
            .and_then(|r| r.strip_suffix(')'))
            .ok_or_else(bad)?;

        let (pid, rest) = inner.split_once(',').ok_or_else(bad)?;
        let pid = Pid(pid.trim().parse().map_err(|_| bad())?);

        // Each vector ends at its first closing parenthesis
        let rest = rest.trim_start();
        let end = rest.find(')').ok_or_else(bad)? + 1;
        let momentum: FourVector = rest[..end].parse()?;

        let rest = rest[end..].trim_start().strip_prefix(',').ok_or_else(bad)?.trim_start();
        let end = rest.find(')').ok_or_else(bad)? + 1;
        let position = parse_three_vector(&rest[..end])?;

        let code = rest[end..].trim_start().strip_prefix(',').ok_or_else(bad)?;
        let status = code
            .trim()
            .parse()
            .ok()
            .and_then(ParticleStatus::from_code)
            .ok_or_else(bad)?;

        Ok(Particle::new(pid, momentum, position, status))
    }
}
