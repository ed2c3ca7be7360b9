//! Physical constants used by the cascade
//!
//! Energies and momenta are in MeV, lengths in fm, cross sections in mb at the
//! interaction-model boundary and fm² inside the engine.

/// ħc in MeV fm, converts a time in MeV⁻¹ into a distance in fm
pub const HBARC: f64 = 197.326_980_4;

/// Proton mass (MeV)
pub const MASS_PROTON: f64 = 938.272_088;

/// Neutron mass (MeV)
pub const MASS_NEUTRON: f64 = 939.565_420;

/// Nucleon mass used in the formation-zone denominator (MeV)
pub const MASS_NUCLEON: f64 = 0.5 * (MASS_PROTON + MASS_NEUTRON);

/// Saturation density of nuclear matter (fm⁻³)
pub const RHO_SATURATION: f64 = 0.16;

/// 1 mb = 0.1 fm²
pub const MB_TO_FM2: f64 = 0.1;

/// Default maximum step distance (fm)
pub const DEFAULT_STEP: f64 = 0.03;

/// Default step ceiling for an evolution call
pub const MAX_STEPS: usize = 100_000;

/// Lower bound of the adaptive step, as a fraction of the maximum step
pub const MIN_STEP_FRACTION: f64 = 1.0e-3;

/// Peak probability of the pion impact-parameter profile
pub const PION_PROFILE_AMPLITUDE: f64 = 0.5;
