//! A single event handed to the cascade: the nucleus after the hard
//! interaction, the energy transfer of that interaction and its weight.

use crate::simulation::kinematics::FourVector;
use crate::simulation::nucleus::Nucleus;
use crate::simulation::states::{ParticleStatus, Pid};

#[derive(Debug, Clone)]
pub struct Event {
    nucleus: Nucleus,
    energy_transfer: FourVector,
    weight: f64,
}

impl Event {
    pub fn new(nucleus: Nucleus, energy_transfer: FourVector, weight: f64) -> Self {
        Self { nucleus, energy_transfer, weight }
    }

    pub fn nucleus(&self) -> &Nucleus {
        &self.nucleus
    }

    pub fn nucleus_mut(&mut self) -> &mut Nucleus {
        &mut self.nucleus
    }

    pub fn energy_transfer(&self) -> FourVector {
        self.energy_transfer
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn count(&self, status: ParticleStatus) -> usize {
        self.nucleus.nucleons().iter().filter(|p| p.status == status).count()
    }

    /// Species and momenta of the escaped particles, in nucleon order
    pub fn final_state(&self) -> (Vec<Pid>, Vec<FourVector>) {
        self.nucleus
            .nucleons()
            .iter()
            .filter(|p| p.status == ParticleStatus::Escaped)
            .map(|p| (p.pid(), p.momentum))
            .unzip()
    }
}
