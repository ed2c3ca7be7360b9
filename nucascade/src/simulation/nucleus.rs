//! Nuclear medium the cascade runs through
//!
//! Owns the nucleon arena plus the geometry the cascade queries: radius,
//! density profile, local Fermi momentum and the escape potential.

use std::f64::consts::PI;

use rand::Rng;

use crate::error::{CascadeError, Result};
use crate::simulation::constants::{HBARC, MASS_NUCLEON, RHO_SATURATION};
use crate::simulation::kinematics::FourVector;
use crate::simulation::states::{NVec3, Particle, ParticleStatus, Pid};

/// Radial nucleon density shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DensityProfile {
    /// Constant saturation density inside the radius
    Uniform,
    /// Fermi distribution 1 / (1 + exp((r - R) / a)), normalised to A nucleons
    WoodsSaxon { diffuseness: f64 },
}

/// How the Fermi momentum depends on position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FermiGas {
    /// Same kF everywhere inside the nucleus
    Global,
    /// kF from the local density
    Local,
}

#[derive(Debug, Clone)]
pub struct Nucleus {
    z: usize,
    a: usize,
    fermi_momentum: f64, // global kF (MeV)
    radius: f64,         // fm
    potential: f64,      // escape potential (MeV)
    rho0: f64,           // central density (fm⁻³)
    density: DensityProfile,
    fermi_gas: FermiGas,
    nucleons: Vec<Particle>,
}

impl Nucleus {
    pub fn new(
        z: usize,
        a: usize,
        binding: f64,
        fermi_momentum: f64,
        density: DensityProfile,
        fermi_gas: FermiGas,
    ) -> Result<Self> {
        if a == 0 {
            return Err(CascadeError::InvalidNucleus("nucleus needs at least one nucleon".into()));
        }
        if z > a {
            return Err(CascadeError::InvalidNucleus(format!(
                "requires the number of protons be at most the number of nucleons, got {z} protons and {a} nucleons"
            )));
        }
        if !(fermi_momentum >= 0.0) || !binding.is_finite() {
            return Err(CascadeError::InvalidNucleus(format!(
                "binding {binding} MeV and Fermi momentum {fermi_momentum} MeV must be finite and non-negative"
            )));
        }
        if let DensityProfile::WoodsSaxon { diffuseness } = density {
            if !(diffuseness > 0.0) {
                return Err(CascadeError::InvalidNucleus(format!(
                    "Woods-Saxon diffuseness must be positive, got {diffuseness}"
                )));
            }
        }

        let radius = (a as f64 / (4.0 / 3.0 * PI * RHO_SATURATION)).cbrt();
        let potential = (MASS_NUCLEON * MASS_NUCLEON + fermi_momentum * fermi_momentum).sqrt()
            - MASS_NUCLEON
            + binding;

        let mut nucleus = Self {
            z,
            a,
            fermi_momentum,
            radius,
            potential,
            rho0: RHO_SATURATION,
            density,
            fermi_gas,
            nucleons: Vec::new(),
        };
        nucleus.rho0 = nucleus.normalisation();
        Ok(nucleus)
    }

    /// Central density giving ∫ρ d³r = A for the chosen profile
    fn normalisation(&self) -> f64 {
        match self.density {
            DensityProfile::Uniform => RHO_SATURATION,
            DensityProfile::WoodsSaxon { diffuseness } => {
                // Simpson's rule over [0, R + 10a]
                let r_max = self.radius + 10.0 * diffuseness;
                let n = 400;
                let h = r_max / n as f64;
                let shape = |r: f64| r * r / (1.0 + ((r - self.radius) / diffuseness).exp());
                let mut sum = shape(0.0) + shape(r_max);
                for i in 1..n {
                    let w = if i % 2 == 1 { 4.0 } else { 2.0 };
                    sum += w * shape(i as f64 * h);
                }
                let integral = 4.0 * PI * sum * h / 3.0;
                self.a as f64 / integral
            }
        }
    }

    pub fn protons(&self) -> usize {
        self.z
    }

    pub fn neutrons(&self) -> usize {
        self.a - self.z
    }

    pub fn nucleon_count(&self) -> usize {
        self.a
    }

    /// Radius of the sharp-surface sphere (fm)
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Kinetic energy a nucleon spends to leave (MeV)
    pub fn potential(&self) -> f64 {
        self.potential
    }

    pub fn density_profile(&self) -> DensityProfile {
        self.density
    }

    pub fn nucleons(&self) -> &[Particle] {
        &self.nucleons
    }

    pub fn nucleons_mut(&mut self) -> &mut Vec<Particle> {
        &mut self.nucleons
    }

    pub fn set_nucleons(&mut self, nucleons: Vec<Particle>) {
        self.nucleons = nucleons;
    }

    /// Nucleon density at radius `r` (fm⁻³)
    pub fn rho(&self, r: f64) -> f64 {
        match self.density {
            DensityProfile::Uniform => {
                if r <= self.radius { self.rho0 } else { 0.0 }
            }
            DensityProfile::WoodsSaxon { diffuseness } => {
                self.rho0 / (1.0 + ((r - self.radius) / diffuseness).exp())
            }
        }
    }

    /// Fermi momentum at radius `r` (MeV)
    pub fn fermi_momentum(&self, r: f64) -> f64 {
        match self.fermi_gas {
            FermiGas::Global => self.fermi_momentum,
            FermiGas::Local => HBARC * (3.0 * PI * PI * self.rho(r) / 2.0).cbrt(),
        }
    }

    /// Fill the nucleus with a fresh nucleon configuration
    ///
    /// Positions follow the density profile, momenta fill the local Fermi sphere
    /// uniformly. The first Z nucleons are protons; all are in the background.
    pub fn generate_config<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let r_max = match self.density {
            DensityProfile::Uniform => self.radius,
            DensityProfile::WoodsSaxon { diffuseness } => self.radius + 5.0 * diffuseness,
        };
        let rho_max = self.rho(0.0);

        let mut nucleons = Vec::with_capacity(self.a);
        for i in 0..self.a {
            let pid = if i < self.z { Pid::PROTON } else { Pid::NEUTRON };

            // Rejection sampling of r with weight r² ρ(r)
            let r = loop {
                let r = r_max * rng.random::<f64>().cbrt();
                if rng.random::<f64>() * rho_max <= self.rho(r) {
                    break r;
                }
            };
            let position = r * random_direction(rng);

            let kf = self.fermi_momentum(r);
            let p = kf * rng.random::<f64>().cbrt();
            let momentum = FourVector::on_shell(p * random_direction(rng), pid.mass());

            nucleons.push(Particle::new(pid, momentum, position, ParticleStatus::Background));
        }
        self.nucleons = nucleons;
    }
}

/// Isotropic unit vector
pub fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> NVec3 {
    let cos_theta = 2.0 * rng.random::<f64>() - 1.0;
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    let phi = 2.0 * PI * rng.random::<f64>();
    NVec3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}
