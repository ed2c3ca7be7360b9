pub mod error;
pub mod simulation;
pub mod configuration;
pub mod output;
pub mod benchmark;

pub use error::{CascadeError, Result};

pub use simulation::states::{NVec3, Particle, ParticleStatus, Pid};
pub use simulation::kinematics::FourVector;
pub use simulation::nucleus::{DensityProfile, FermiGas, Nucleus};
pub use simulation::interactions::{ConstantInteraction, CugnonInteraction, InteractionModel, Interactions};
pub use simulation::probability::ProbabilityType;
pub use simulation::cascade::{Cascade, EvolutionStatus, InteractionDistances};
pub use simulation::event::Event;
pub use simulation::scenario::{EventOutcome, Scenario};

pub use configuration::config::{CascadeConfig, InteractionConfig, NucleusConfig, RunConfig, OutputConfig, ScenarioConfig};

pub use output::histogram::{EventSink, Histogram, HistogramCollection};

pub use benchmark::benchmark::{bench_evolve, bench_step_curve};
