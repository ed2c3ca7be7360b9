//! Intranuclear cascade
//!
//! Nucleons struck in the hard interaction are propagated through the
//! nuclear medium. Whether a propagating nucleon interacts is decided from the
//! interaction cross section with each background nucleon it passes and the
//! selected impact-parameter profile. Collisions are resolved in the pair
//! centre-of-mass frame and vetoed by Pauli blocking.
//!
//! Two stepping schemes are provided:
//! - direct (`evolve`, `mean_free_path`): a common adaptive time step, with
//!   every background nucleon inside the swept corridor tested closest first
//! - NuWro-like (`nuwro`, `mean_free_path_nuwro`): a fixed distance per step,
//!   with the interaction chance from the local density and an averaged cross
//!   section, the partner being the nearest background nucleon of the sampled
//!   species
//!
//! Random numbers are drawn in a fixed order so that a seed reproduces a run:
//! - kick: species, then nucleon index
//! - direct: per active particle, one uniform per candidate until one fires,
//!   then two for the outgoing direction
//! - NuWro: per active particle, interaction, species, then two for the
//!   outgoing direction

use std::collections::HashSet;
use std::f64::consts::PI;

use log::{debug, trace, warn};
use nalgebra::Rotation3;
use rand::Rng;

use crate::error::{CascadeError, Result};
use crate::simulation::constants::{HBARC, MB_TO_FM2};
use crate::simulation::event::Event;
use crate::simulation::integrator::{adaptive_step, between_planes, project};
use crate::simulation::interactions::{InteractionModel, Interactions};
use crate::simulation::kinematics::FourVector;
use crate::simulation::nucleus::Nucleus;
use crate::simulation::probability::ProbabilityType;
use crate::simulation::states::{NVec3, Particle, ParticleStatus, Pid};

/// Candidate partners with their squared impact parameter (fm²)
pub type InteractionDistances = Vec<(usize, f64)>;

/// How an evolution call ended
#[derive(Debug, Clone, PartialEq)]
pub enum EvolutionStatus {
    /// Every particle reached a final state or the background
    Complete { steps: usize },
    /// The step ceiling was hit with `active` particles still propagating
    StepLimit { steps: usize, active: Vec<usize> },
}

impl EvolutionStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, EvolutionStatus::Complete { .. })
    }

    pub fn steps(&self) -> usize {
        match self {
            EvolutionStatus::Complete { steps } | EvolutionStatus::StepLimit { steps, .. } => *steps,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Cascade,      // struck nucleons join the cascade
    MeanFreePath, // particles stop at their first interaction
}

pub struct Cascade<I: Interactions = InteractionModel> {
    kicked_idxs: Vec<usize>,
    distance: f64,  // maximum step distance (fm)
    time_step: f64, // last time step taken (MeV⁻¹)
    interactions: I,
    probability: ProbabilityType,
    pauli_enabled: bool,
}

impl<I: Interactions> Cascade<I> {
    /// Create the cascade
    /// - `interactions`: model for pp, pn and nn cross sections
    /// - `probability`: impact-parameter profile
    /// - `distance`: maximum distance step (fm)
    pub fn new(interactions: I, probability: ProbabilityType, distance: f64) -> Result<Self> {
        if !(distance >= 0.0) || !distance.is_finite() {
            return Err(CascadeError::InvalidParameter(format!(
                "step distance must be finite and non-negative, got {distance}"
            )));
        }
        Ok(Self {
            kicked_idxs: Vec::new(),
            distance,
            time_step: 0.0,
            interactions,
            probability,
            pauli_enabled: true,
        })
    }

    pub fn with_pauli_blocking(mut self, enabled: bool) -> Self {
        self.pauli_enabled = enabled;
        self
    }

    pub fn kicked(&self) -> &[usize] {
        &self.kicked_idxs
    }

    /// Mark nucleon `idx` as a cascade particle
    pub fn set_kicked(&mut self, idx: usize) {
        self.kicked_idxs.push(idx);
    }

    /// Clear the run state for the next cascade
    pub fn reset(&mut self) {
        self.kicked_idxs.clear();
        self.time_step = 0.0;
    }

    /// Give a random background nucleon the momentum transfer `energy_transfer`
    ///
    /// A proton is struck with probability sigma[0] / (sigma[0] + sigma[1]),
    /// a neutron otherwise. Returns the index of the kicked nucleon.
    pub fn kick<R: Rng + ?Sized>(
        &mut self,
        nucleus: &mut Nucleus,
        energy_transfer: &FourVector,
        sigma: [f64; 2],
        rng: &mut R,
    ) -> Result<usize> {
        for value in sigma {
            if !(value >= 0.0) || !value.is_finite() {
                return Err(CascadeError::InvalidCrossSection { value });
            }
        }
        let total = sigma[0] + sigma[1];
        if total <= 0.0 {
            return Err(CascadeError::InvalidCrossSection { value: total });
        }

        let pid = if rng.random::<f64>() < sigma[0] / total { Pid::PROTON } else { Pid::NEUTRON };
        let indices: Vec<usize> = nucleus
            .nucleons()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.pid() == pid && p.status == ParticleStatus::Background)
            .map(|(i, _)| i)
            .collect();
        if indices.is_empty() {
            return Err(CascadeError::NoNucleonToKick { pid });
        }
        let idx = indices[rng.random_range(0..indices.len())];

        let kicked = &mut nucleus.nucleons_mut()[idx];
        let p_initial = kicked.momentum;
        kicked.set_formation_zone(&p_initial, energy_transfer);
        check_formation_zone(idx, kicked)?;
        kicked.status = ParticleStatus::Propagating;
        kicked.momentum = p_initial + *energy_transfer;
        debug!("kicked nucleon {idx}: {kicked}");

        self.kicked_idxs.push(idx);
        Ok(idx)
    }

    /// Run the cascade until every particle escapes, is captured or returns to
    /// the background, or until `max_steps` steps have been taken
    pub fn evolve<R: Rng + ?Sized>(
        &mut self,
        nucleus: &mut Nucleus,
        rng: &mut R,
        max_steps: usize,
    ) -> Result<EvolutionStatus> {
        let result = self.run_direct(nucleus, rng, max_steps, Mode::Cascade);
        self.finish(result)
    }

    /// Run the cascade on an event, picking up its propagating nucleons when
    /// nothing has been kicked explicitly
    pub fn evolve_event<R: Rng + ?Sized>(
        &mut self,
        event: &mut Event,
        rng: &mut R,
        max_steps: usize,
    ) -> Result<EvolutionStatus> {
        if self.kicked_idxs.is_empty() {
            let active: Vec<usize> = event
                .nucleus()
                .nucleons()
                .iter()
                .enumerate()
                .filter(|(_, p)| p.status.is_active())
                .map(|(i, _)| i)
                .collect();
            self.kicked_idxs.extend(active);
        }
        debug!(
            "evolving event with q = {} and {} cascade particles",
            event.energy_transfer(),
            self.kicked_idxs.len()
        );
        self.evolve(event.nucleus_mut(), rng, max_steps)
    }

    /// Propagate the kicked particles with the direct stepping until each
    /// interacts once, accumulating their `distance_traveled`
    pub fn mean_free_path<R: Rng + ?Sized>(
        &mut self,
        nucleus: &mut Nucleus,
        rng: &mut R,
        max_steps: usize,
    ) -> Result<EvolutionStatus> {
        let result = self.run_direct(nucleus, rng, max_steps, Mode::MeanFreePath);
        self.finish(result)
    }

    /// Run the cascade with the NuWro-like stepping
    pub fn nuwro<R: Rng + ?Sized>(
        &mut self,
        nucleus: &mut Nucleus,
        rng: &mut R,
        max_steps: usize,
    ) -> Result<EvolutionStatus> {
        let result = self.run_nuwro(nucleus, rng, max_steps, Mode::Cascade);
        self.finish(result)
    }

    /// Mean free path measurement with the NuWro-like stepping
    pub fn mean_free_path_nuwro<R: Rng + ?Sized>(
        &mut self,
        nucleus: &mut Nucleus,
        rng: &mut R,
        max_steps: usize,
    ) -> Result<EvolutionStatus> {
        let result = self.run_nuwro(nucleus, rng, max_steps, Mode::MeanFreePath);
        self.finish(result)
    }

    fn run_direct<R: Rng + ?Sized>(
        &mut self,
        nucleus: &mut Nucleus,
        rng: &mut R,
        max_steps: usize,
        mode: Mode,
    ) -> Result<EvolutionStatus> {
        self.prepare(nucleus)?;
        debug!("direct cascade ({mode:?}) with {} kicked particles", self.kicked_idxs.len());

        let mut steps = 0;
        while steps < max_steps && !self.kicked_idxs.is_empty() {
            self.adaptive_step(nucleus.nucleons(), nucleus.radius());

            let current = self.kicked_idxs.clone();
            let mut new_kicked = current.clone();
            for idx in current {
                let kicked = &nucleus.nucleons()[idx];
                if !kicked.status.is_active() {
                    continue;
                }

                // No interactions inside the formation zone
                if kicked.in_formation_zone() {
                    nucleus.nucleons_mut()[idx].update_formation_zone(self.time_step);
                    continue;
                }

                let allowed = self.allowed_interactions(nucleus.nucleons(), idx);
                if allowed.is_empty() {
                    continue;
                }

                let Some(hit_idx) = self.interacted(nucleus.nucleons(), idx, &allowed, rng)? else {
                    continue;
                };

                if self.finalize_momentum(nucleus, idx, hit_idx, rng)? {
                    self.record_hit(nucleus, idx, hit_idx, mode, &mut new_kicked);
                }
            }
            self.kicked_idxs = new_kicked;

            // Advance every particle still propagating by the common time step
            let time = self.time_step;
            for &idx in &self.kicked_idxs {
                let particle = &mut nucleus.nucleons_mut()[idx];
                if particle.status.is_active() {
                    particle.propagate(time);
                }
            }

            self.update_active(nucleus);
            self.escaped(nucleus);
            steps += 1;
        }
        Ok(self.status(steps))
    }

    fn run_nuwro<R: Rng + ?Sized>(
        &mut self,
        nucleus: &mut Nucleus,
        rng: &mut R,
        max_steps: usize,
        mode: Mode,
    ) -> Result<EvolutionStatus> {
        self.prepare(nucleus)?;
        debug!("NuWro cascade ({mode:?}) with {} kicked particles", self.kicked_idxs.len());

        let z = nucleus.protons() as f64;
        let n = nucleus.neutrons() as f64;
        let a = nucleus.nucleon_count() as f64;
        let distance = self.distance;

        let mut steps = 0;
        while steps < max_steps && !self.kicked_idxs.is_empty() {
            let current = self.kicked_idxs.clone();
            let mut new_kicked = current.clone();
            for idx in current {
                let kicked = &nucleus.nucleons()[idx];
                if !kicked.status.is_active() {
                    continue;
                }
                let beta = kicked.beta().norm();
                if beta <= 0.0 || distance <= 0.0 {
                    continue;
                }
                self.time_step = distance / (beta * HBARC);

                if kicked.in_formation_zone() {
                    let particle = &mut nucleus.nucleons_mut()[idx];
                    particle.update_formation_zone(self.time_step);
                    particle.space_propagate(distance);
                    continue;
                }

                // Attenuation over the step from the local density
                let position = kicked.position;
                let rho = nucleus.rho(position.norm());
                let sigma_p = self.get_xsec(kicked, &medium_nucleon(Pid::PROTON, position))?;
                let sigma_n = self.get_xsec(kicked, &medium_nucleon(Pid::NEUTRON, position))?;
                let weighted = z * sigma_p + n * sigma_n;
                let inv_lambda = rho * weighted / a;
                let prob = 1.0 - (-distance * inv_lambda).exp();

                let draw = rng.random::<f64>();
                nucleus.nucleons_mut()[idx].space_propagate(distance);
                if draw >= prob {
                    continue;
                }

                let pid = if rng.random::<f64>() < z * sigma_p / weighted { Pid::PROTON } else { Pid::NEUTRON };
                let vertex = nucleus.nucleons()[idx].position;
                let Some(hit_idx) = nearest_background(nucleus.nucleons(), &vertex, pid) else {
                    continue;
                };

                // The partner takes part at the interaction vertex
                let resting = nucleus.nucleons()[hit_idx].position;
                nucleus.nucleons_mut()[hit_idx].position = vertex;
                if self.finalize_momentum(nucleus, idx, hit_idx, rng)? {
                    self.record_hit(nucleus, idx, hit_idx, mode, &mut new_kicked);
                } else {
                    nucleus.nucleons_mut()[hit_idx].position = resting;
                }
            }
            self.kicked_idxs = new_kicked;

            self.update_active(nucleus);
            self.escaped(nucleus);
            steps += 1;
        }
        Ok(self.status(steps))
    }

    /// Keep only valid, distinct, propagating indices in the active set
    fn prepare(&mut self, nucleus: &Nucleus) -> Result<()> {
        let count = nucleus.nucleons().len();
        if let Some(&idx) = self.kicked_idxs.iter().find(|&&i| i >= count) {
            return Err(CascadeError::InvalidParameter(format!(
                "kicked index {idx} out of range for {count} nucleons"
            )));
        }
        let mut seen = HashSet::new();
        self.kicked_idxs
            .retain(|&i| seen.insert(i) && nucleus.nucleons()[i].status.is_active());
        Ok(())
    }

    fn record_hit(
        &self,
        nucleus: &mut Nucleus,
        idx: usize,
        hit_idx: usize,
        mode: Mode,
        new_kicked: &mut Vec<usize>,
    ) {
        match mode {
            Mode::Cascade => new_kicked.push(hit_idx),
            Mode::MeanFreePath => {
                let nucleons = nucleus.nucleons_mut();
                nucleons[idx].status = ParticleStatus::Interacted;
                nucleons[hit_idx].status = ParticleStatus::Interacted;
            }
        }
    }

    fn status(&self, steps: usize) -> EvolutionStatus {
        if self.kicked_idxs.is_empty() {
            EvolutionStatus::Complete { steps }
        } else {
            warn!(
                "cascade stopped at the step ceiling ({steps}) with {} particles still propagating",
                self.kicked_idxs.len()
            );
            EvolutionStatus::StepLimit { steps, active: self.kicked_idxs.clone() }
        }
    }

    fn finish(&mut self, result: Result<EvolutionStatus>) -> Result<EvolutionStatus> {
        if let Ok(status) = &result {
            debug!("cascade finished: {status:?}");
        }
        self.reset();
        result
    }

    /// Set the common time step for the active particles inside a nucleus of
    /// radius `radius`
    pub fn adaptive_step(&mut self, particles: &[Particle], radius: f64) {
        let step = adaptive_step(particles, &self.kicked_idxs, self.distance, radius);
        self.time_step = step.time;
    }

    /// Background nucleons inside the corridor swept by particle `idx` during
    /// the current time step, closest first
    pub fn allowed_interactions(&self, particles: &[Particle], idx: usize) -> InteractionDistances {
        let mut results = InteractionDistances::new();
        let kicked = &particles[idx];
        let dist = kicked.travel_distance(self.time_step);
        if !(dist > 0.0) {
            return results;
        }

        // Planes through the start and end of the step
        let point1 = kicked.position;
        let point2 = point1 + kicked.step_vector(dist);
        let normed_momentum = kicked.momentum.vec.normalize();

        for (i, other) in particles.iter().enumerate() {
            if i == idx || other.status != ParticleStatus::Background {
                continue;
            }
            if !between_planes(&other.position, &point1, &point2) {
                continue;
            }
            let projected = project(&other.position, &point1, &normed_momentum);
            results.push((i, (projected - point1).norm_squared()));
        }

        // Stable: equal distances keep index order
        results.sort_by(|a, b| a.1.total_cmp(&b.1));
        results
    }

    /// Cross section between two particles in fm²
    pub fn get_xsec(&self, p1: &Particle, p2: &Particle) -> Result<f64> {
        let xsec = self.interactions.cross_section(p1, p2)?;
        if !(xsec >= 0.0) || !xsec.is_finite() {
            return Err(CascadeError::InvalidCrossSection { value: xsec });
        }
        Ok(xsec * MB_TO_FM2)
    }

    /// First candidate (closest first) that the probability draw accepts
    pub fn interacted<R: Rng + ?Sized>(
        &self,
        particles: &[Particle],
        idx: usize,
        dists: &[(usize, f64)],
        rng: &mut R,
    ) -> Result<Option<usize>> {
        let kicked = &particles[idx];
        for &(candidate, b2) in dists {
            let xsec = self.get_xsec(kicked, &particles[candidate])?;
            let prob = self.probability.probability(b2, xsec);
            if rng.random::<f64>() < prob {
                return Ok(Some(candidate));
            }
        }
        Ok(None)
    }

    /// Resolve the collision of particles `i` and `j`
    ///
    /// Outgoing momenta are generated in the pair centre-of-mass frame and
    /// boosted back, conserving the total four-momentum. Returns false and
    /// leaves both particles untouched when Pauli blocking vetoes the outcome.
    pub fn finalize_momentum<R: Rng + ?Sized>(
        &self,
        nucleus: &mut Nucleus,
        i: usize,
        j: usize,
        rng: &mut R,
    ) -> Result<bool> {
        let (p1_lab, p2_lab, same_species, pos1, pos2) = {
            let nucleons = nucleus.nucleons();
            let (a, b) = (&nucleons[i], &nucleons[j]);
            (a.momentum, b.momentum, a.pid() == b.pid(), a.position, b.position)
        };

        // Boost to the centre-of-mass frame
        let boost_cm = (p1_lab + p2_lab).boost_vector();
        let p1_cm = p1_lab.boost(&-boost_cm)?;
        let p2_cm = p2_lab.boost(&-boost_cm)?;

        // Outgoing momentum with the incoming magnitude, sampled about ẑ and
        // turned onto the incoming direction
        let p_r = p1_cm.p();
        let rans = [rng.random::<f64>(), rng.random::<f64>()];
        let momentum = along(&p1_cm.vec) * self.interactions.make_momentum(same_species, p_r, rans);

        let p1_out = FourVector::from_vec3(momentum, p1_cm.e()).boost(&boost_cm)?;
        let p2_out = FourVector::from_vec3(-momentum, p2_cm.e()).boost(&boost_cm)?;

        if self.pauli_enabled
            && (below_fermi_sea(nucleus, &p1_out, &pos1) || below_fermi_sea(nucleus, &p2_out, &pos2))
        {
            trace!("collision {i} + {j} Pauli blocked");
            return Ok(false);
        }

        let nucleons = nucleus.nucleons_mut();
        {
            let first = &mut nucleons[i];
            first.momentum = p1_out;
            first.set_formation_zone(&p1_lab, &p1_out);
            check_formation_zone(i, first)?;
            first.daughters.push(j);
        }
        {
            let second = &mut nucleons[j];
            second.momentum = p2_out;
            second.set_formation_zone(&p2_lab, &p2_out);
            check_formation_zone(j, second)?;
            second.status = ParticleStatus::Propagating;
            second.mothers.push(i);
        }
        trace!("collision {i} + {j}: {p1_out} {p2_out}");
        Ok(true)
    }

    /// True if `particle` sits below the local Fermi sea
    pub fn pauli_blocking(&self, nucleus: &Nucleus, particle: &Particle) -> bool {
        below_fermi_sea(nucleus, &particle.momentum, &particle.position)
    }

    /// Drop particles that stopped propagating and return those that sank
    /// below the Fermi sea to the background
    fn update_active(&mut self, nucleus: &mut Nucleus) {
        let pauli_enabled = self.pauli_enabled;
        let mut absorbed = Vec::new();
        self.kicked_idxs.retain(|&idx| {
            let particle = &nucleus.nucleons()[idx];
            if !particle.status.is_active() {
                return false;
            }
            if pauli_enabled && below_fermi_sea(nucleus, &particle.momentum, &particle.position) {
                absorbed.push(idx);
                return false;
            }
            true
        });
        for idx in absorbed {
            trace!("particle {idx} absorbed into the background");
            nucleus.nucleons_mut()[idx].status = ParticleStatus::Background;
        }
    }

    /// Remove particles that crossed the surface moving outwards
    ///
    /// A particle with kinetic energy above the escape potential leaves with
    /// that energy subtracted; otherwise it is captured.
    fn escaped(&mut self, nucleus: &mut Nucleus) {
        let radius = nucleus.radius();
        let potential = nucleus.potential();
        let nucleons = nucleus.nucleons_mut();
        self.kicked_idxs.retain(|&idx| {
            let particle = &mut nucleons[idx];
            let outward = particle.position.dot(&particle.momentum.vec) > 0.0;
            if particle.position.norm() < radius || !outward {
                return true;
            }

            let kinetic = particle.kinetic_energy();
            if kinetic > potential {
                let mass = particle.mass();
                let e_out = kinetic - potential + mass;
                let p_out = (e_out * e_out - mass * mass).sqrt();
                let direction = particle.momentum.vec.normalize();
                particle.momentum = FourVector::from_vec3(p_out * direction, e_out);
                particle.status = ParticleStatus::Escaped;
            } else {
                particle.status = ParticleStatus::Captured;
            }
            trace!("particle {idx} left the active set: {particle}");
            false
        });
    }
}

/// Rotation taking ẑ onto `direction`, the identity for a vanishing one
fn along(direction: &NVec3) -> Rotation3<f64> {
    Rotation3::rotation_between(&NVec3::z(), direction)
        .unwrap_or_else(|| Rotation3::from_axis_angle(&NVec3::x_axis(), PI))
}

fn below_fermi_sea(nucleus: &Nucleus, momentum: &FourVector, position: &NVec3) -> bool {
    momentum.p() < nucleus.fermi_momentum(position.norm())
}

fn check_formation_zone(index: usize, particle: &Particle) -> Result<()> {
    if particle.formation_zone.is_finite() {
        Ok(())
    } else {
        Err(CascadeError::NonFiniteFormationZone { index, value: particle.formation_zone })
    }
}

/// Nucleon at rest used to evaluate the averaged medium cross section
fn medium_nucleon(pid: Pid, position: NVec3) -> Particle {
    Particle::new(
        pid,
        FourVector::on_shell(NVec3::zeros(), pid.mass()),
        position,
        ParticleStatus::Background,
    )
}

/// Nearest background nucleon of species `pid`, lowest index on ties
fn nearest_background(particles: &[Particle], vertex: &NVec3, pid: Pid) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in particles.iter().enumerate() {
        if p.pid() != pid || p.status != ParticleStatus::Background {
            continue;
        }
        let d2 = (p.position - vertex).norm_squared();
        if best.map_or(true, |(_, b)| d2 < b) {
            best = Some((i, d2));
        }
    }
    best.map(|(i, _)| i)
}
