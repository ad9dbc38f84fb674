use crate::core::hamiltonian::term::EnergyBreakdown;
use nalgebra::Vector3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationRecord {
    pub step: usize,
    pub energy: EnergyBreakdown,
}

/// Per-step energy records of one run. Records can only be appended.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IterationHistory {
    records: Vec<IterationRecord>,
}

impl IterationHistory {
    pub fn with_capacity(steps: usize) -> Self {
        Self {
            records: Vec::with_capacity(steps),
        }
    }

    pub fn push(&mut self, step: usize, energy: EnergyBreakdown) {
        self.records.push(IterationRecord { step, energy });
    }

    pub fn records(&self) -> &[IterationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&IterationRecord> {
        self.records.last()
    }

    /// `(step, energy)` pairs in append order, as consumed by the run log.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &EnergyBreakdown)> + '_ {
        self.records.iter().map(|r| (r.step, &r.energy))
    }
}

#[derive(Debug, Clone)]
pub struct OptimizationResult {
    /// Final unit-norm spins in dense site order.
    pub spins: Vec<Vector3<f64>>,
    pub history: IterationHistory,
    /// Number of Hamiltonian evaluations performed.
    pub evaluations: usize,
}

impl OptimizationResult {
    /// Total energy of the last recorded step.
    pub fn final_energy(&self) -> Option<f64> {
        self.history.last().map(|r| r.energy.total())
    }
}
