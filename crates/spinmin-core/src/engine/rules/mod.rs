//! Gradient-based update rules.
//!
//! First-order rules consume one gradient per step; L-BFGS drives the
//! objective itself for several inner iterations. All of them act on the raw
//! `3N` parameter vector, and the caller projects spins back onto the unit
//! sphere afterwards.

mod adagrad;
mod adam;
mod lbfgs;
mod rmsprop;
mod sgd;

pub use adagrad::Adagrad;
pub use adam::Adam;
pub use lbfgs::Lbfgs;
pub use rmsprop::RmsProp;
pub use sgd::Sgd;

use super::config::{OptimizationConfig, OptimizerKind};
use super::error::EngineError;
use super::objective::Objective;
use crate::core::hamiltonian::term::EnergyBreakdown;
use nalgebra::DVector;

/// A rule that maps one gradient to one parameter update.
pub trait FirstOrderRule {
    fn apply(&mut self, params: &mut DVector<f64>, grad: &DVector<f64>);
}

/// The update rule of one run, with its accumulated state.
#[derive(Debug, Clone)]
pub enum UpdateRule {
    Sgd(Sgd),
    Adam(Adam),
    AdamW(Adam),
    RmsProp(RmsProp),
    Adagrad(Adagrad),
    Lbfgs(Lbfgs),
}

impl UpdateRule {
    pub fn from_config(config: &OptimizationConfig, n_params: usize) -> Self {
        let lr = config.learning_rate;
        match config.optimizer {
            OptimizerKind::Sgd => Self::Sgd(Sgd::new(lr)),
            OptimizerKind::Adam => Self::Adam(Adam::new(lr, n_params)),
            OptimizerKind::AdamW => {
                Self::AdamW(Adam::new(lr, n_params).with_weight_decay(config.weight_decay))
            }
            OptimizerKind::RmsProp => Self::RmsProp(RmsProp::new(lr, n_params)),
            OptimizerKind::Adagrad => Self::Adagrad(Adagrad::new(lr, n_params)),
            OptimizerKind::Lbfgs => Self::Lbfgs(Lbfgs::new(lr, config.lbfgs_max_iterations)),
        }
    }

    /// Advances `params` by one outer step.
    ///
    /// First-order rules return the breakdown evaluated before their update.
    /// L-BFGS returns `None`; its step is recorded with the energy of the
    /// projected result.
    pub(crate) fn step(
        &mut self,
        params: &mut DVector<f64>,
        grad: &mut DVector<f64>,
        objective: &mut Objective<'_>,
        step: usize,
    ) -> Result<Option<EnergyBreakdown>, EngineError> {
        let rule: &mut dyn FirstOrderRule = match self {
            Self::Sgd(r) => r,
            Self::Adam(r) | Self::AdamW(r) => r,
            Self::RmsProp(r) => r,
            Self::Adagrad(r) => r,
            Self::Lbfgs(r) => {
                r.step(params, grad, objective, step)?;
                return Ok(None);
            }
        };
        let energy = objective.energy_and_gradient(params, grad, step)?;
        rule.apply(params, grad);
        Ok(Some(energy))
    }
}
