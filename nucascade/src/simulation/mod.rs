pub mod constants;
pub mod states;
pub mod kinematics;
pub mod nucleus;
pub mod interactions;
pub mod probability;
pub mod integrator;
pub mod cascade;
pub mod event;
pub mod params;
pub mod engine;
pub mod scenario;
