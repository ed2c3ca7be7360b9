//! High-level runtime engine settings
//!
//! Selects the stepping algorithm and the run mode used when evolving the
//! events of a `Scenario`

use rand::Rng;

use crate::configuration::config::{AlgorithmConfig, ModeConfig};
use crate::error::Result;
use crate::simulation::cascade::{Cascade, EvolutionStatus};
use crate::simulation::event::Event;
use crate::simulation::interactions::Interactions;

#[derive(Debug, Clone, Copy)]
pub struct Engine {
    pub algorithm: AlgorithmConfig, // direct or nuwro
    pub mode: ModeConfig,           // full cascade or mean free path
}

impl Engine {
    /// Evolve the kicked particles of `event` with the selected algorithm
    pub fn run<I: Interactions, R: Rng + ?Sized>(
        &self,
        cascade: &mut Cascade<I>,
        event: &mut Event,
        rng: &mut R,
        max_steps: usize,
    ) -> Result<EvolutionStatus> {
        match (self.algorithm, self.mode) {
            (AlgorithmConfig::Direct, ModeConfig::Cascade) => cascade.evolve_event(event, rng, max_steps),
            (AlgorithmConfig::Direct, ModeConfig::MeanFreePath) => {
                cascade.mean_free_path(event.nucleus_mut(), rng, max_steps)
            }
            (AlgorithmConfig::Nuwro, ModeConfig::Cascade) => cascade.nuwro(event.nucleus_mut(), rng, max_steps),
            (AlgorithmConfig::Nuwro, ModeConfig::MeanFreePath) => {
                cascade.mean_free_path_nuwro(event.nucleus_mut(), rng, max_steps)
            }
        }
    }
}
