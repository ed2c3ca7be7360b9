//! Weighted histograms of the cascade final state
//!
//! A sink receives, per event, the species and four-momenta of the escaped
//! particles together with the event weight. [`HistogramCollection`] bins the
//! kinetic energy of protons and neutrons and writes each histogram as a plain
//! text table.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::{CascadeError, Result};
use crate::simulation::kinematics::FourVector;
use crate::simulation::states::Pid;

/// Consumer of final-state tuples
pub trait EventSink {
    fn fill(&mut self, pids: &[Pid], momenta: &[FourVector], weight: f64);
}

/// One-dimensional histogram with uniform bins and weighted entries
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    pub name: String,
    edges: Vec<f64>,
    values: Vec<f64>,
    errors2: Vec<f64>, // sum of squared weights per bin
    underflow: f64,
    overflow: f64,
    entries: usize,
}

impl Histogram {
    pub fn new(name: impl Into<String>, bins: usize, min: f64, max: f64) -> Result<Self> {
        if bins == 0 || !(max > min) || !min.is_finite() || !max.is_finite() {
            return Err(CascadeError::InvalidParameter(format!(
                "histogram needs at least one bin and min < max, got {bins} bins on [{min}, {max})"
            )));
        }
        let width = (max - min) / bins as f64;
        let edges = (0..=bins).map(|i| min + i as f64 * width).collect();
        Ok(Self {
            name: name.into(),
            edges,
            values: vec![0.0; bins],
            errors2: vec![0.0; bins],
            underflow: 0.0,
            overflow: 0.0,
            entries: 0,
        })
    }

    pub fn bins(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    pub fn underflow(&self) -> f64 {
        self.underflow
    }

    pub fn overflow(&self) -> f64 {
        self.overflow
    }

    /// Bin holding `value`, `None` outside [min, max)
    pub fn find_bin(&self, value: f64) -> Option<usize> {
        let min = self.edges[0];
        let max = self.edges[self.bins()];
        if !(value >= min) || value >= max {
            return None;
        }
        let bin = self.edges.partition_point(|&e| e <= value) - 1;
        Some(bin.min(self.bins() - 1))
    }

    pub fn fill(&mut self, value: f64, weight: f64) {
        self.entries += 1;
        match self.find_bin(value) {
            Some(bin) => {
                self.values[bin] += weight;
                self.errors2[bin] += weight * weight;
            }
            None if value < self.edges[0] => self.underflow += weight,
            None => self.overflow += weight,
        }
    }

    /// Sum of the in-range bin contents
    pub fn integral(&self) -> f64 {
        self.values.iter().sum()
    }

    pub fn scale(&mut self, factor: f64) {
        for (v, e2) in self.values.iter_mut().zip(self.errors2.iter_mut()) {
            *v *= factor;
            *e2 *= factor * factor;
        }
        self.underflow *= factor;
        self.overflow *= factor;
    }

    /// Scale to unit area (bin contents times widths); empty histograms are left alone
    pub fn normalize(&mut self) {
        let area: f64 = self
            .values
            .iter()
            .zip(self.edges.windows(2))
            .map(|(v, w)| v * (w[1] - w[0]))
            .sum();
        if area > 0.0 {
            self.scale(1.0 / area);
        }
    }

    /// Text table: a header line, then `low high value error` per bin
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "# {} entries={} underflow={:.6e} overflow={:.6e}",
            self.name, self.entries, self.underflow, self.overflow
        );
        for (i, w) in self.edges.windows(2).enumerate() {
            let _ = writeln!(
                out,
                "{:.6e} {:.6e} {:.6e} {:.6e}",
                w[0],
                w[1],
                self.values[i],
                self.errors2[i].sqrt()
            );
        }
        out
    }

    /// Write the table to `<dir>/<name>.txt`
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;
        fs::write(dir.join(format!("{}.txt", self.name)), self.to_text())?;
        Ok(())
    }
}

/// Kinetic energy spectra of the escaped protons and neutrons (MeV)
#[derive(Debug, Clone)]
pub struct HistogramCollection {
    pub protons: Histogram,
    pub neutrons: Histogram,
    events: usize,
    sum_weights: f64,
}

impl HistogramCollection {
    pub fn new(bins: usize, min: f64, max: f64) -> Result<Self> {
        Ok(Self {
            protons: Histogram::new("proton_kinetic_energy", bins, min, max)?,
            neutrons: Histogram::new("neutron_kinetic_energy", bins, min, max)?,
            events: 0,
            sum_weights: 0.0,
        })
    }

    pub fn events(&self) -> usize {
        self.events
    }

    pub fn sum_weights(&self) -> f64 {
        self.sum_weights
    }

    /// Divide by the summed event weight, giving per-event yields
    pub fn finalize(&mut self) {
        if self.sum_weights > 0.0 {
            let factor = 1.0 / self.sum_weights;
            self.protons.scale(factor);
            self.neutrons.scale(factor);
        }
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        self.protons.save(dir)?;
        self.neutrons.save(dir)
    }
}

impl EventSink for HistogramCollection {
    fn fill(&mut self, pids: &[Pid], momenta: &[FourVector], weight: f64) {
        self.events += 1;
        self.sum_weights += weight;
        for (pid, momentum) in pids.iter().zip(momenta) {
            let kinetic = momentum.e() - momentum.m();
            match *pid {
                Pid::PROTON => self.protons.fill(kinetic, weight),
                Pid::NEUTRON => self.neutrons.fill(kinetic, weight),
                _ => {}
            }
        }
    }
}
