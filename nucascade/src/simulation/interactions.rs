//! Nucleon-nucleon interaction models for the cascade
//!
//! The cascade only needs two things from an interaction model: a cross
//! section for a pair of particles and a sampler for the outgoing momentum in
//! the pair centre-of-mass frame. [`Interactions`] is that seam; the models
//! selectable from a scenario file are collected in [`InteractionModel`].

use std::f64::consts::PI;

use crate::error::{CascadeError, Result};
use crate::simulation::states::{NVec3, Particle};

/// Trait for two-body interaction models.
/// Implementations must be shareable across per-event workers.
pub trait Interactions: Send + Sync {
    fn name(&self) -> &str;

    /// Cross section for `p1` scattering off `p2`, in mb
    fn cross_section(&self, p1: &Particle, p2: &Particle) -> Result<f64>;

    /// Outgoing centre-of-mass three-momentum of the first particle, with the
    /// polar angle measured from ẑ standing in for its incoming direction
    /// - `same_species`: both particles have the same pid
    /// - `p_cm`: centre-of-mass momentum magnitude (MeV)
    /// - `rans`: two uniform numbers in [0, 1)
    ///
    /// The cascade rotates the result onto the actual incoming momentum.
    /// The default is isotropic.
    fn make_momentum(&self, _same_species: bool, p_cm: f64, rans: [f64; 2]) -> NVec3 {
        isotropic(p_cm, rans)
    }
}

fn isotropic(p_cm: f64, rans: [f64; 2]) -> NVec3 {
    let cos_theta = 2.0 * rans[0] - 1.0;
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let phi = 2.0 * PI * rans[1];
    p_cm * NVec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

/// Energy independent cross sections
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantInteraction {
    pub pp: f64, // same-species cross section (mb)
    pub np: f64, // mixed-species cross section (mb)
}

impl Interactions for ConstantInteraction {
    fn name(&self) -> &str {
        "Constant"
    }

    fn cross_section(&self, p1: &Particle, p2: &Particle) -> Result<f64> {
        Ok(if p1.pid() == p2.pid() { self.pp } else { self.np })
    }
}

/// Elastic NN parametrisation of Cugnon, Mizutani and Vandermeulen
///
/// Cross sections and the t-slope of the angular distribution are functions of
/// the laboratory momentum (GeV/c) of one nucleon in the rest frame of the other.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CugnonInteraction;

impl CugnonInteraction {
    pub fn sigma_pp(p_lab: f64) -> f64 {
        if p_lab < 0.8 {
            23.5 + 1000.0 * (p_lab - 0.7).powi(4)
        } else if p_lab < 2.0 {
            1250.0 / (p_lab + 50.0) - 4.0 * (p_lab - 1.3).powi(2)
        } else {
            77.0 / (p_lab + 1.5)
        }
    }

    pub fn sigma_np(p_lab: f64) -> f64 {
        if p_lab < 0.8 {
            33.0 + 196.0 * (p_lab - 0.95).abs().powf(2.5)
        } else if p_lab < 2.0 {
            31.0 / p_lab.sqrt()
        } else {
            77.0 / (p_lab + 1.5)
        }
    }

    /// Slope B of dσ/dt ∝ exp(B t) in GeV⁻²
    pub fn slope(same_species: bool, p_lab: f64) -> f64 {
        let pp = |p: f64| {
            if p < 2.0 {
                5.5 * p.powi(8) / (7.7 + p.powi(8))
            } else {
                5.334 + 0.67 * (p - 2.0)
            }
        };
        if same_species {
            return pp(p_lab);
        }
        if p_lab < 0.225 {
            0.0
        } else if p_lab < 0.6 {
            16.53 * (p_lab - 0.225)
        } else if p_lab < 1.6 {
            -1.63 * p_lab + 7.16
        } else {
            pp(p_lab)
        }
    }

    /// Lab momentum (GeV/c) from the centre-of-mass momentum of an equal-mass pair (MeV)
    fn p_lab_from_cm(p_cm: f64) -> f64 {
        let m = crate::simulation::constants::MASS_NUCLEON;
        let e_cm = (m * m + p_cm * p_cm).sqrt();
        2.0 * p_cm * e_cm / m / 1000.0
    }
}

/// Momentum of `p1` in the rest frame of `p2` (GeV/c)
pub fn lab_momentum(p1: &Particle, p2: &Particle) -> f64 {
    let s = (p1.momentum + p2.momentum).m2();
    let m1 = p1.mass();
    let m2 = p2.mass();
    let arg = (s - (m1 + m2).powi(2)) * (s - (m1 - m2).powi(2));
    if arg <= 0.0 || m2 <= 0.0 {
        return 0.0;
    }
    arg.sqrt() / (2.0 * m2) / 1000.0
}

impl Interactions for CugnonInteraction {
    fn name(&self) -> &str {
        "Cugnon"
    }

    fn cross_section(&self, p1: &Particle, p2: &Particle) -> Result<f64> {
        let p_lab = lab_momentum(p1, p2);
        Ok(if p1.pid() == p2.pid() {
            Self::sigma_pp(p_lab)
        } else {
            Self::sigma_np(p_lab)
        })
    }

    fn make_momentum(&self, same_species: bool, p_cm: f64, rans: [f64; 2]) -> NVec3 {
        let b = Self::slope(same_species, Self::p_lab_from_cm(p_cm));
        let p_gev = p_cm / 1000.0;
        let t_max = 4.0 * p_gev * p_gev;
        if b * t_max < 1e-8 {
            return isotropic(p_cm, rans);
        }

        // -t from exp(-B x) truncated to [0, 4p²]
        let x = -(1.0 - rans[0] * (1.0 - (-b * t_max).exp())).ln() / b;
        let cos_theta = (1.0 - x / (2.0 * p_gev * p_gev)).clamp(-1.0, 1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
        let phi = 2.0 * PI * rans[1];
        p_cm * NVec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
    }
}

/// Interaction models selectable from a scenario file
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionModel {
    Constant(ConstantInteraction),
    Cugnon(CugnonInteraction),
}

impl InteractionModel {
    /// Constant cross sections, rejecting unusable values up front
    pub fn constant(pp: f64, np: f64) -> Result<Self> {
        for value in [pp, np] {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(CascadeError::InvalidCrossSection { value });
            }
        }
        Ok(Self::Constant(ConstantInteraction { pp, np }))
    }
}

impl Interactions for InteractionModel {
    fn name(&self) -> &str {
        match self {
            InteractionModel::Constant(m) => m.name(),
            InteractionModel::Cugnon(m) => m.name(),
        }
    }

    fn cross_section(&self, p1: &Particle, p2: &Particle) -> Result<f64> {
        match self {
            InteractionModel::Constant(m) => m.cross_section(p1, p2),
            InteractionModel::Cugnon(m) => m.cross_section(p1, p2),
        }
    }

    fn make_momentum(&self, same_species: bool, p_cm: f64, rans: [f64; 2]) -> NVec3 {
        match self {
            InteractionModel::Constant(m) => m.make_momentum(same_species, p_cm, rans),
            InteractionModel::Cugnon(m) => m.make_momentum(same_species, p_cm, rans),
        }
    }
}
