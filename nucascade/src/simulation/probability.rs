//! Interaction probability as a function of impact parameter
//!
//! Each policy maps (b², σ), both in fm², to a probability in [0, 1]. The
//! Gaussian and pion profiles integrate to σ over the transverse plane.

use serde::Deserialize;

use crate::simulation::constants::PION_PROFILE_AMPLITUDE;

/// Which impact-parameter profile the cascade uses
/// `Probability: "Gaussian"`, `"Pion"` or `"Cylinder"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbabilityType {
    Gaussian,
    Pion,
    Cylinder,
}

impl ProbabilityType {
    pub fn probability(&self, b2: f64, sigma: f64) -> f64 {
        if !(sigma > 0.0) {
            return 0.0;
        }
        match self {
            ProbabilityType::Gaussian => (-std::f64::consts::PI * b2 / sigma).exp(),
            ProbabilityType::Pion => {
                let a = PION_PROFILE_AMPLITUDE;
                a * (-std::f64::consts::PI * a * b2 / sigma).exp()
            }
            ProbabilityType::Cylinder => {
                if b2 < sigma / std::f64::consts::PI { 1.0 } else { 0.0 }
            }
        }
    }
}
