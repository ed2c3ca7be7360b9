//! Configuration types for loading cascade scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! cascade run. A scenario consists of:
//!
//! - [`CascadeConfig`]  – interaction model, probability profile and step size
//! - [`NucleusConfig`]  – target nucleus and its Fermi gas
//! - [`RunConfig`]      – number of events, seed, algorithm and kick
//! - [`OutputConfig`]   – histogram binning and output location
//! - [`ScenarioConfig`] – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! An example carbon scenario matching these types:
//!
//! ```yaml
//! cascade:
//!   Interaction:
//!     Name: Constant        # or Cugnon
//!     pp: 40.0              # same-species cross section (mb)
//!     np: 40.0              # mixed-species cross section (mb)
//!   Probability: Gaussian   # Gaussian, Pion or Cylinder
//!   Step: 0.03              # maximum step distance (fm)
//!
//! nucleus:
//!   z: 6
//!   a: 12
//!   binding: 8.0            # MeV
//!   fermi_momentum: 225.0   # MeV
//!   density: uniform        # or { woods_saxon: { diffuseness: 0.5 } }
//!   fermi_gas: global       # or local
//!
//! run:
//!   events: 1000
//!   seed: 42                # deterministic seed
//!   algorithm: direct       # or nuwro
//!   mode: cascade           # or mean_free_path
//!   max_steps: 100000
//!   energy_transfer: [0.0, 0.0, 500.0, 100.0]   # px, py, pz, E (MeV)
//!   sigma: [1.0, 1.0]       # proton / neutron kick cross sections
//!
//! output:
//!   path: output
//!   bins: 50
//!   min: 0.0
//!   max: 1000.0
//! ```
//!
//! The scenario builder then maps this configuration into the runtime
//! `Cascade`, `Nucleus` and parameter types.

use serde::Deserialize;

use crate::error::{CascadeError, Result};
use crate::simulation::constants::{DEFAULT_STEP, MAX_STEPS};
use crate::simulation::probability::ProbabilityType;

/// Interaction model, selected by `Name`
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "Name")]
pub enum InteractionConfig {
    Constant { pp: f64, np: f64 }, // energy independent cross sections (mb)
    Cugnon,                        // Cugnon elastic NN parametrisation
}

fn default_step() -> f64 {
    DEFAULT_STEP
}

fn default_true() -> bool {
    true
}

/// Cascade settings, `{ Interaction, Probability, Step }`
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct CascadeConfig {
    pub interaction: InteractionConfig, // pp / np cross section provider
    pub probability: ProbabilityType,   // impact-parameter profile
    #[serde(default = "default_step")]
    pub step: f64,                      // maximum step distance (fm)
    #[serde(default = "default_true")]
    pub pauli_blocking: bool,           // veto collisions into the Fermi sea
}

impl CascadeConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.step > 0.0) || !self.step.is_finite() {
            return Err(CascadeError::InvalidParameter(format!(
                "Step must be a positive distance, got {}",
                self.step
            )));
        }
        Ok(())
    }
}

/// Radial density of the nucleus
#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum DensityConfig {
    Uniform,
    WoodsSaxon { diffuseness: f64 },
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FermiGasConfig {
    Global,
    Local,
}

/// Target nucleus
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct NucleusConfig {
    pub z: usize,               // protons
    pub a: usize,               // nucleons
    pub binding: f64,           // binding energy (MeV)
    pub fermi_momentum: f64,    // global Fermi momentum (MeV)
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub density: DensityConfig,
    pub fermi_gas: FermiGasConfig,
}

/// Stepping scheme used for every event
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AlgorithmConfig {
    Direct, // adaptive step, corridor test
    Nuwro,  // fixed step, density attenuation
}

/// Full cascade or first-interaction measurement
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModeConfig {
    Cascade,
    MeanFreePath,
}

fn default_max_steps() -> usize {
    MAX_STEPS
}

/// Global run parameters
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub events: usize,                 // number of events
    pub seed: u64,                     // deterministic seed
    pub algorithm: AlgorithmConfig,
    pub mode: ModeConfig,
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,              // step ceiling per event
    pub energy_transfer: [f64; 4],     // px, py, pz, E (MeV)
    pub sigma: [f64; 2],               // proton / neutron kick cross sections
}

/// Histogram output
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct OutputConfig {
    pub path: String, // directory for the histogram files
    pub bins: usize,
    pub min: f64,
    pub max: f64,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub cascade: CascadeConfig,       // cascade engine settings
    pub nucleus: NucleusConfig,       // target nucleus
    pub run: RunConfig,               // events and kick
    pub output: Option<OutputConfig>, // histograms, skipped when absent
}

impl ScenarioConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let cfg: ScenarioConfig = serde_yaml::from_str(text)?;
        cfg.cascade.validate()?;
        Ok(cfg)
    }
}
