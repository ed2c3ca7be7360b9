//! Numerical parameters for a cascade run
//!
//! `Parameters` holds runtime settings:
//! - number of events and the seed they derive their random streams from,
//! - the step ceiling for each evolution call,
//! - the kick: energy transfer and proton / neutron cross sections

use crate::simulation::kinematics::FourVector;

#[derive(Debug, Clone)]
pub struct Parameters {
    pub events: usize,               // number of events
    pub seed: u64,                   // event i uses seed + i
    pub max_steps: usize,            // step ceiling
    pub energy_transfer: FourVector, // momentum transfer of the kick (MeV)
    pub sigma: [f64; 2],             // proton / neutron kick cross sections
}

impl Parameters {
    /// Seed of the random stream for event `index`
    pub fn event_seed(&self, index: usize) -> u64 {
        self.seed.wrapping_add(index as u64)
    }
}
