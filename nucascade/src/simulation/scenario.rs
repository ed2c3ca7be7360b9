//! Build fully-initialized cascade runs from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle
//! (`Scenario`) containing:
//! - engine settings (`Engine`)
//! - numerical parameters (`Parameters`)
//! - the target nucleus template (`Nucleus`, no nucleons yet)
//! - the interaction model and probability profile every event's cascade uses
//!
//! Events are independent: each one gets its own nucleus copy, cascade and
//! random stream, so they are evolved in parallel.

use log::{debug, info, warn};
use rand::SeedableRng;
use rand_chacha::ChaChaRng;
use rayon::prelude::*;

use crate::configuration::config::{
    DensityConfig, FermiGasConfig, InteractionConfig, OutputConfig, ScenarioConfig,
};
use crate::error::Result;
use crate::simulation::cascade::{Cascade, EvolutionStatus};
use crate::simulation::engine::Engine;
use crate::simulation::event::Event;
use crate::simulation::interactions::{CugnonInteraction, InteractionModel, Interactions};
use crate::simulation::kinematics::FourVector;
use crate::simulation::nucleus::{DensityProfile, FermiGas, Nucleus};
use crate::simulation::params::Parameters;
use crate::simulation::probability::ProbabilityType;

/// Result of one evolved event
#[derive(Debug, Clone)]
pub struct EventOutcome {
    pub index: usize,              // event number
    pub kicked: usize,             // nucleon given the kick
    pub status: EvolutionStatus,   // how the evolution ended
    pub event: Event,              // final nucleus state
}

/// Runtime bundle built from a [`ScenarioConfig`]
pub struct Scenario {
    pub engine: Engine,
    pub parameters: Parameters,
    pub nucleus: Nucleus,
    pub interactions: InteractionModel,
    pub probability: ProbabilityType,
    pub step: f64,
    pub pauli_blocking: bool,
    pub output: Option<OutputConfig>,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        cfg.cascade.validate()?;

        // Interaction model (runtime) from InteractionConfig
        let interactions = match cfg.cascade.interaction {
            InteractionConfig::Constant { pp, np } => InteractionModel::constant(pp, np)?,
            InteractionConfig::Cugnon => InteractionModel::Cugnon(CugnonInteraction),
        };

        // Nucleus template from NucleusConfig
        let n_cfg = cfg.nucleus;
        let density = match n_cfg.density {
            DensityConfig::Uniform => DensityProfile::Uniform,
            DensityConfig::WoodsSaxon { diffuseness } => DensityProfile::WoodsSaxon { diffuseness },
        };
        let fermi_gas = match n_cfg.fermi_gas {
            FermiGasConfig::Global => FermiGas::Global,
            FermiGasConfig::Local => FermiGas::Local,
        };
        let nucleus = Nucleus::new(n_cfg.z, n_cfg.a, n_cfg.binding, n_cfg.fermi_momentum, density, fermi_gas)?;

        // Parameters (runtime) from RunConfig
        let r_cfg = cfg.run;
        let q = r_cfg.energy_transfer;
        let parameters = Parameters {
            events: r_cfg.events,
            seed: r_cfg.seed,
            max_steps: r_cfg.max_steps,
            energy_transfer: FourVector::new(q[0], q[1], q[2], q[3]),
            sigma: r_cfg.sigma,
        };

        let engine = Engine {
            algorithm: r_cfg.algorithm,
            mode: r_cfg.mode,
        };

        debug!(
            "scenario: {} events on Z={} A={} with {} interactions",
            parameters.events,
            nucleus.protons(),
            nucleus.nucleon_count(),
            interactions.name()
        );

        Ok(Self {
            engine,
            parameters,
            nucleus,
            interactions,
            probability: cfg.cascade.probability,
            step: cfg.cascade.step,
            pauli_blocking: cfg.cascade.pauli_blocking,
            output: cfg.output,
        })
    }

    /// Fresh cascade for one event
    pub fn new_cascade(&self) -> Result<Cascade<InteractionModel>> {
        Ok(Cascade::new(self.interactions, self.probability, self.step)?
            .with_pauli_blocking(self.pauli_blocking))
    }

    /// Generate, kick and evolve event `index`
    pub fn run_event(&self, index: usize) -> Result<EventOutcome> {
        let mut rng = ChaChaRng::seed_from_u64(self.parameters.event_seed(index));

        let mut nucleus = self.nucleus.clone();
        nucleus.generate_config(&mut rng);

        let mut cascade = self.new_cascade()?;
        let q = self.parameters.energy_transfer;
        let kicked = cascade.kick(&mut nucleus, &q, self.parameters.sigma, &mut rng)?;

        let mut event = Event::new(nucleus, q, 1.0);
        let status = self.engine.run(&mut cascade, &mut event, &mut rng, self.parameters.max_steps)?;

        Ok(EventOutcome { index, kicked, status, event })
    }

    /// Evolve every event; outcomes are returned in event order
    ///
    /// An event that fails is logged and left out, the rest still run.
    pub fn run(&self) -> Vec<EventOutcome> {
        info!(
            "running {} events ({:?}, {:?})",
            self.parameters.events, self.engine.algorithm, self.engine.mode
        );
        let outcomes: Vec<EventOutcome> = (0..self.parameters.events)
            .into_par_iter()
            .filter_map(|index| match self.run_event(index) {
                Ok(outcome) => Some(outcome),
                Err(err) => {
                    warn!("event {index} dropped: {err}");
                    None
                }
            })
            .collect();

        let dropped = self.parameters.events - outcomes.len();
        if dropped > 0 {
            warn!("{dropped} of {} events dropped", self.parameters.events);
        }
        outcomes
    }
}
