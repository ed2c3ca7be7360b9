//! Relativistic kinematics for the cascade
//!
//! `FourVector` stores (px, py, pz, E) with a (+, -, -, -) metric. Three-vectors
//! are plain `NVec3` (nalgebra) values, shared with positions.

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use crate::error::{CascadeError, Result};
use crate::simulation::states::NVec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FourVector {
    pub vec: NVec3, // spatial part (px, py, pz)
    pub e: f64,     // energy
}

impl Default for FourVector {
    fn default() -> Self {
        Self { vec: NVec3::zeros(), e: 0.0 }
    }
}

impl FourVector {
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { vec: NVec3::new(px, py, pz), e }
    }

    pub fn from_vec3(vec: NVec3, e: f64) -> Self {
        Self { vec, e }
    }

    /// On-shell four-vector with three-momentum `vec` and mass `mass`
    pub fn on_shell(vec: NVec3, mass: f64) -> Self {
        let e = (mass * mass + vec.norm_squared()).sqrt();
        Self { vec, e }
    }

    pub fn e(&self) -> f64 {
        self.e
    }

    /// Magnitude of the three-momentum
    pub fn p(&self) -> f64 {
        self.vec.norm()
    }

    pub fn pt(&self) -> f64 {
        self.vec.x.hypot(self.vec.y)
    }

    /// Minkowski product with another four-vector
    pub fn dot(&self, other: &FourVector) -> f64 {
        self.e * other.e - self.vec.dot(&other.vec)
    }

    pub fn m2(&self) -> f64 {
        self.dot(self)
    }

    /// Invariant mass, zero for (numerically) light-like vectors
    pub fn m(&self) -> f64 {
        let m2 = self.m2();
        if m2.abs() < 1e-6 {
            return 0.0;
        }
        m2.sqrt()
    }

    /// Polar angle in [0, π]
    pub fn theta(&self) -> f64 {
        self.pt().atan2(self.vec.z)
    }

    /// Azimuthal angle in [0, 2π)
    pub fn phi(&self) -> f64 {
        let phi = self.vec.y.atan2(self.vec.x);
        if phi < 0.0 {
            phi + 2.0 * std::f64::consts::PI
        } else {
            phi
        }
    }

    /// Velocity of the frame in which this four-vector is at rest
    pub fn boost_vector(&self) -> NVec3 {
        self.vec / self.e
    }

    /// Lorentz boost by velocity `beta`
    ///
    /// Returns an error if |beta| >= 1, the boost is not defined there.
    pub fn boost(&self, beta: &NVec3) -> Result<FourVector> {
        let beta2 = beta.norm_squared();
        if !(beta2 < 1.0) {
            return Err(CascadeError::SuperluminalBoost { beta: beta2.sqrt() });
        }
        let gamma = 1.0 / (1.0 - beta2).sqrt();
        let betap = beta.dot(&self.vec);
        let gamma2 = if beta2 > 0.0 { (gamma - 1.0) / beta2 } else { 0.0 };

        let vec = self.vec + (gamma2 * betap + gamma * self.e) * beta;
        let e = gamma * (self.e + betap);
        Ok(FourVector { vec, e })
    }
}

impl Add for FourVector {
    type Output = FourVector;
    fn add(self, rhs: FourVector) -> FourVector {
        FourVector { vec: self.vec + rhs.vec, e: self.e + rhs.e }
    }
}

impl Sub for FourVector {
    type Output = FourVector;
    fn sub(self, rhs: FourVector) -> FourVector {
        FourVector { vec: self.vec - rhs.vec, e: self.e - rhs.e }
    }
}

impl fmt::Display for FourVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourVector({}, {}, {}, {})", self.vec.x, self.vec.y, self.vec.z, self.e)
    }
}

/// Canonical string form of a three-vector, `ThreeVector(x, y, z)`
pub fn three_vector_string(v: &NVec3) -> String {
    format!("ThreeVector({}, {}, {})", v.x, v.y, v.z)
}

/// Comma separated floats inside `Name(...)`
fn parse_components<const N: usize>(s: &str, name: &str) -> Result<[f64; N]> {
    let bad = || CascadeError::Parse(format!("expected {}({} numbers), got {:?}", name, N, s));
    let inner = s
        .trim()
        .strip_prefix(name)
        .and_then(|r| r.strip_prefix('('))
        .and_then(|r| r.strip_suffix(')'))
        .ok_or_else(bad)?;

    let mut out = [0.0; N];
    let mut parts = inner.split(',');
    for slot in out.iter_mut() {
        *slot = parts.next().ok_or_else(bad)?.trim().parse().map_err(|_| bad())?;
    }
    if parts.next().is_some() {
        return Err(bad());
    }
    Ok(out)
}

/// Inverse of [`three_vector_string`]
pub fn parse_three_vector(s: &str) -> Result<NVec3> {
    let [x, y, z] = parse_components::<3>(s, "ThreeVector")?;
    Ok(NVec3::new(x, y, z))
}

impl FromStr for FourVector {
    type Err = CascadeError;

    fn from_str(s: &str) -> Result<Self> {
        let [px, py, pz, e] = parse_components::<4>(s, "FourVector")?;
        Ok(FourVector::new(px, py, pz, e))
    }
}
