use std::time::Instant;

use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use crate::error::Result;
use crate::simulation::cascade::Cascade;
use crate::simulation::interactions::InteractionModel;
use crate::simulation::kinematics::FourVector;
use crate::simulation::nucleus::{DensityProfile, FermiGas, Nucleus};
use crate::simulation::probability::ProbabilityType;

/// Helper to build a symmetric nucleus of `a` nucleons
fn make_nucleus(a: usize) -> Result<Nucleus> {
    Nucleus::new(a / 2, a, 8.0, 225.0, DensityProfile::Uniform, FermiGas::Global)
}

fn make_cascade(step: f64) -> Result<Cascade> {
    Cascade::new(InteractionModel::constant(40.0, 40.0)?, ProbabilityType::Gaussian, step)
}

/// Average time per event (ms) of `events` kicked-and-evolved events
fn time_events(a: usize, step: f64, events: u64, nuwro: bool) -> Result<f64> {
    let template = make_nucleus(a)?;
    let q = FourVector::new(0.0, 0.0, 500.0, 100.0);
    let mut cascade = make_cascade(step)?;

    let t0 = Instant::now();
    for seed in 0..events {
        let mut rng = ChaChaRng::seed_from_u64(seed);
        let mut nucleus = template.clone();
        nucleus.generate_config(&mut rng);
        cascade.kick(&mut nucleus, &q, [1.0, 1.0], &mut rng)?;
        if nuwro {
            cascade.nuwro(&mut nucleus, &mut rng, 100_000)?;
        } else {
            cascade.evolve(&mut nucleus, &mut rng, 100_000)?;
        }
    }
    Ok(t0.elapsed().as_secs_f64() * 1000.0 / events as f64)
}

/// Direct vs NuWro stepping for nuclei of increasing size
pub fn bench_evolve() -> Result<()> {
    let sizes = [4, 12, 40, 56, 208];
    let events = 50;

    for a in sizes {
        // Smaller runs first to warm caches
        time_events(a, 0.03, 2, false)?;

        let direct = time_events(a, 0.03, events, false)?;
        let nuwro = time_events(a, 0.03, events, true)?;
        println!("A = {a:4}, direct = {direct:9.4} ms/event, NuWro = {nuwro:9.4} ms/event");
    }
    Ok(())
}

/// Cost of the direct cascade against the maximum step, carbon target
/// Paste output directly into a spreadsheet to graph
pub fn bench_step_curve() -> Result<()> {
    println!("step_fm,direct_ms,nuwro_ms");
    for step in [0.01, 0.02, 0.03, 0.05, 0.1, 0.2, 0.5] {
        let direct = time_events(12, step, 20, false)?;
        let nuwro = time_events(12, step, 20, true)?;
        println!("{step},{direct:.6},{nuwro:.6}");
    }
    Ok(())
}
