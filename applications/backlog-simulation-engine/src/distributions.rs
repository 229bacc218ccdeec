//! Empirical sample pools backing arrival and remediation draws
//!
//! The engine never fits distributions; it resamples finite, pre-built pools
//! with replacement. Building the pools (skew-normal fits, historical
//! histograms) happens upstream and arrives here as plain numbers.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Finite pool of pre-built samples, drawn from with replacement.
///
/// An empty pool is a degenerate-but-valid input: every draw yields `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SamplePool {
    samples: Vec<f64>,
}

impl SamplePool {
    pub fn new(samples: Vec<f64>) -> Self {
        SamplePool { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Draw one sample with replacement
    pub fn sample(&self, rng: &mut impl Rng) -> f64 {
        self.samples.choose(rng).copied().unwrap_or(0.0)
    }

    /// Smallest strictly-positive sample, if any
    pub fn min_positive(&self) -> Option<f64> {
        self.samples
            .iter()
            .copied()
            .filter(|s| *s > 0.0)
            .fold(None, |acc, s| match acc {
                Some(m) if m <= s => Some(m),
                _ => Some(s),
            })
    }
}

/// Arrival-count and remediation-duration pools for one defect type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypeDistributions {
    /// Defects arriving per hour (values are truncated to integers on use)
    pub incoming: SamplePool,
    /// Remediation durations in hours
    pub remediation: SamplePool,
}

/// One `TypeDistributions` per defect type, aligned with the simulator's
/// type list by index.
#[derive(Debug, Clone, Default)]
pub struct DistributionSet {
    per_type: Vec<TypeDistributions>,
}

impl DistributionSet {
    pub fn new(per_type: Vec<TypeDistributions>) -> Self {
        DistributionSet { per_type }
    }

    pub fn len(&self) -> usize {
        self.per_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_type.is_empty()
    }

    pub fn get(&self, index: usize) -> Result<&TypeDistributions> {
        self.per_type
            .get(index)
            .ok_or(SimulationError::PerTypeMismatch("distributions"))
    }

    /// Derive the fine simulation time step from the remediation pools.
    ///
    /// `dt` is half the smallest candidate over all types, where a type's
    /// candidate is its smallest strictly-positive remediation sample when
    /// that is below one hour, and `1.0` otherwise (including empty or
    /// all-zero pools). The hourly arrival grid is the coarse reference, so
    /// the result always satisfies `0 < dt <= 0.5`.
    pub fn time_step(&self) -> f64 {
        let min_candidate = self
            .per_type
            .iter()
            .map(|d| match d.remediation.min_positive() {
                Some(m) if m < 1.0 => m,
                _ => 1.0,
            })
            .fold(1.0_f64, f64::min);
        min_candidate / 2.0
    }
}
