use super::error::{DivergentQuantity, EngineError};
use crate::core::hamiltonian::evaluator::Hamiltonian;
use crate::core::hamiltonian::term::EnergyBreakdown;
use nalgebra::{DVector, Vector3};

/// Flattens spins into a `3N` parameter vector.
pub(crate) fn pack(spins: &[Vector3<f64>]) -> DVector<f64> {
    DVector::from_iterator(spins.len() * 3, spins.iter().flat_map(|s| s.iter().copied()))
}

#[inline]
fn site(x: &DVector<f64>, k: usize) -> Vector3<f64> {
    Vector3::new(x[3 * k], x[3 * k + 1], x[3 * k + 2])
}

#[inline]
fn set_site(x: &mut DVector<f64>, k: usize, v: &Vector3<f64>) {
    x[3 * k] = v.x;
    x[3 * k + 1] = v.y;
    x[3 * k + 2] = v.z;
}

/// Splits a parameter vector into unit spins, failing on a collapsed norm.
pub(crate) fn unpack_normalized(
    x: &DVector<f64>,
    step: usize,
) -> Result<Vec<Vector3<f64>>, EngineError> {
    (0..x.len() / 3)
        .map(|k| normalized(&site(x, k), step).map(|(n, _)| n))
        .collect()
}

/// Renormalizes every spin of `x` in place.
pub(crate) fn project(x: &mut DVector<f64>, step: usize) -> Result<(), EngineError> {
    for k in 0..x.len() / 3 {
        let (n, _) = normalized(&site(x, k), step)?;
        set_site(x, k, &n);
    }
    Ok(())
}

fn normalized(v: &Vector3<f64>, step: usize) -> Result<(Vector3<f64>, f64), EngineError> {
    let norm = v.norm();
    if norm.is_finite() && norm > 0.0 {
        Ok((v / norm, norm))
    } else {
        Err(EngineError::NumericalDivergence {
            step,
            quantity: DivergentQuantity::SpinNorm,
        })
    }
}

/// The Hamiltonian seen as a function of the raw, unnormalized parameters.
///
/// Every evaluation normalizes the spins first; the returned gradient is
/// taken with respect to the raw parameters, chained through the
/// normalization: `g_raw = (g_n - n (n . g_n)) / |x|`.
pub(crate) struct Objective<'a> {
    hamiltonian: &'a Hamiltonian,
    field: Option<&'a Vector3<f64>>,
    spins: Vec<Vector3<f64>>,
    norms: Vec<f64>,
    grad_n: Vec<Vector3<f64>>,
    evaluations: usize,
}

impl<'a> Objective<'a> {
    pub fn new(hamiltonian: &'a Hamiltonian, field: Option<&'a Vector3<f64>>) -> Self {
        let n = hamiltonian.n_sites();
        Self {
            hamiltonian,
            field,
            spins: vec![Vector3::zeros(); n],
            norms: vec![0.0; n],
            grad_n: vec![Vector3::zeros(); n],
            evaluations: 0,
        }
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    fn normalize_into_buffer(&mut self, x: &DVector<f64>, step: usize) -> Result<(), EngineError> {
        if x.len() != 3 * self.spins.len() {
            return Err(EngineError::Internal(format!(
                "parameter vector has length {}, expected {}",
                x.len(),
                3 * self.spins.len()
            )));
        }
        for k in 0..self.spins.len() {
            let (n, norm) = normalized(&site(x, k), step)?;
            self.spins[k] = n;
            self.norms[k] = norm;
        }
        Ok(())
    }

    fn check_energy(energy: EnergyBreakdown, step: usize) -> Result<EnergyBreakdown, EngineError> {
        if energy.is_finite() {
            Ok(energy)
        } else {
            Err(EngineError::NumericalDivergence {
                step,
                quantity: DivergentQuantity::Energy,
            })
        }
    }

    /// Energy of the normalized configuration, without a gradient.
    pub fn energy(&mut self, x: &DVector<f64>, step: usize) -> Result<EnergyBreakdown, EngineError> {
        self.normalize_into_buffer(x, step)?;
        let energy = self.hamiltonian.evaluate(&self.spins, self.field)?;
        self.evaluations += 1;
        Self::check_energy(energy, step)
    }

    /// Energy of the normalized configuration, writing the raw-parameter
    /// gradient into `grad`.
    pub fn energy_and_gradient(
        &mut self,
        x: &DVector<f64>,
        grad: &mut DVector<f64>,
        step: usize,
    ) -> Result<EnergyBreakdown, EngineError> {
        self.normalize_into_buffer(x, step)?;
        let energy =
            self.hamiltonian
                .evaluate_with_gradient(&self.spins, self.field, &mut self.grad_n)?;
        self.evaluations += 1;
        let energy = Self::check_energy(energy, step)?;

        if grad.len() != x.len() {
            *grad = DVector::zeros(x.len());
        }
        for k in 0..self.spins.len() {
            let n = &self.spins[k];
            let g = &self.grad_n[k];
            let g_raw = (g - n * n.dot(g)) / self.norms[k];
            set_site(grad, k, &g_raw);
        }
        if !grad.iter().all(|v| v.is_finite()) {
            return Err(EngineError::NumericalDivergence {
                step,
                quantity: DivergentQuantity::Gradient,
            });
        }
        Ok(energy)
    }
}
