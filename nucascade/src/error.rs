//! Error types for the cascade engine

use thiserror::Error;

use crate::simulation::states::Pid;

#[derive(Error, Debug)]
pub enum CascadeError {
    #[error("Invalid cross section: {value} (must be finite and non-negative)")]
    InvalidCrossSection { value: f64 },

    #[error("Non-finite formation zone {value} for particle {index}")]
    NonFiniteFormationZone { index: usize, value: f64 },

    #[error("Boost with |beta| = {beta} is not below the speed of light")]
    SuperluminalBoost { beta: f64 },

    #[error("Invalid nucleus: {0}")]
    InvalidNucleus(String),

    #[error("No background nucleon of species {pid} left to kick")]
    NoNucleonToKick { pid: Pid },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Scenario decode error: {0}")]
    Decode(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CascadeError>;
