use crate::engine::error::EngineError;
use crate::engine::objective::Objective;
use nalgebra::DVector;
use std::collections::VecDeque;
use tracing::trace;

const HISTORY_SIZE: usize = 100;
const TOLERANCE_GRAD: f64 = 1e-7;
const TOLERANCE_CHANGE: f64 = 1e-9;
const CURVATURE_EPS: f64 = 1e-10;

/// Limited-memory BFGS with a fixed step length and no line search.
///
/// One outer step runs up to `max_iter` inner iterations and at most
/// `max_iter * 5 / 4` objective evaluations. The curvature pairs, the last
/// search direction and the previous gradient survive across outer steps.
#[derive(Debug, Clone)]
pub struct Lbfgs {
    lr: f64,
    max_iter: usize,
    max_eval: usize,
    /// Inner iterations performed over the whole run.
    n_iter: usize,
    direction: Option<DVector<f64>>,
    step_length: f64,
    /// Curvature pairs `(y, s, 1 / y.s)`, oldest first.
    history: VecDeque<(DVector<f64>, DVector<f64>, f64)>,
    h_diag: f64,
    prev_grad: Option<DVector<f64>>,
}

impl Lbfgs {
    pub fn new(lr: f64, max_iter: usize) -> Self {
        Self {
            lr,
            max_iter,
            max_eval: max_iter * 5 / 4,
            n_iter: 0,
            direction: None,
            step_length: lr,
            history: VecDeque::with_capacity(HISTORY_SIZE),
            h_diag: 1.0,
            prev_grad: None,
        }
    }

    /// Two-loop recursion: approximates `-H g` from the stored pairs.
    fn search_direction(&self, grad: &DVector<f64>) -> DVector<f64> {
        let mut q = -grad;
        let mut alphas = Vec::with_capacity(self.history.len());
        for (y, s, rho) in self.history.iter().rev() {
            let alpha = s.dot(&q) * rho;
            q.axpy(-alpha, y, 1.0);
            alphas.push(alpha);
        }

        let mut r = q * self.h_diag;
        for ((y, s, rho), alpha) in self.history.iter().zip(alphas.iter().rev()) {
            let beta = y.dot(&r) * rho;
            r.axpy(alpha - beta, s, 1.0);
        }
        r
    }

    fn update_curvature(&mut self, grad: &DVector<f64>, direction: &DVector<f64>) {
        let Some(prev) = &self.prev_grad else {
            return;
        };
        let y = grad - prev;
        let s = direction * self.step_length;
        let ys = y.dot(&s);
        if ys > CURVATURE_EPS {
            if self.history.len() == HISTORY_SIZE {
                self.history.pop_front();
            }
            self.h_diag = ys / y.dot(&y);
            self.history.push_back((y, s, 1.0 / ys));
        }
    }

    /// Runs one outer step, updating `params` in place.
    pub(crate) fn step(
        &mut self,
        params: &mut DVector<f64>,
        grad: &mut DVector<f64>,
        objective: &mut Objective<'_>,
        step: usize,
    ) -> Result<(), EngineError> {
        let mut loss = objective.energy_and_gradient(params, grad, step)?.total();
        let mut evals = 1;

        if grad.amax() <= TOLERANCE_GRAD {
            trace!(step, "L-BFGS gradient below tolerance; no update.");
            return Ok(());
        }

        let mut inner = 0;
        while inner < self.max_iter {
            inner += 1;
            self.n_iter += 1;

            let direction = match self.direction.take() {
                Some(prev_direction) if self.n_iter > 1 => {
                    self.update_curvature(grad, &prev_direction);
                    self.search_direction(grad)
                }
                _ => {
                    self.history.clear();
                    self.h_diag = 1.0;
                    -&*grad
                }
            };

            self.prev_grad = Some(grad.clone());
            let prev_loss = loss;

            self.step_length = if self.n_iter == 1 {
                (1.0 / grad.lp_norm(1)).min(1.0) * self.lr
            } else {
                self.lr
            };

            let gtd = grad.dot(&direction);
            if gtd > -TOLERANCE_CHANGE {
                self.direction = Some(direction);
                break;
            }

            params.axpy(self.step_length, &direction, 1.0);

            let mut converged = false;
            if inner != self.max_iter {
                loss = objective.energy_and_gradient(params, grad, step)?.total();
                evals += 1;
                converged = grad.amax() <= TOLERANCE_GRAD;
            }

            let moved = direction.amax() * self.step_length;
            self.direction = Some(direction);

            if inner == self.max_iter
                || evals >= self.max_eval
                || converged
                || moved <= TOLERANCE_CHANGE
                || (loss - prev_loss).abs() < TOLERANCE_CHANGE
            {
                break;
            }
        }

        trace!(step, inner, evals, "L-BFGS outer step complete.");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hamiltonian::evaluator::{ExchangePair, Hamiltonian};
    use crate::engine::objective::pack;
    use nalgebra::Vector3;

    fn chain() -> Hamiltonian {
        Hamiltonian::new(
            3,
            vec![ExchangePair::new(0, 1, 1.0), ExchangePair::new(1, 2, 1.0)],
            None,
            None,
        )
        .unwrap()
    }

    #[test]
    fn two_loop_with_empty_history_is_steepest_descent() {
        let rule = Lbfgs::new(1.0, 20);
        let g = DVector::from_vec(vec![1.0, -2.0, 0.5]);
        assert_eq!(rule.search_direction(&g), -g);
    }

    #[test]
    fn curvature_pairs_are_kept_across_outer_steps() {
        let h = chain();
        let mut objective = Objective::new(&h, None);
        let mut params = pack(&[
            Vector3::new(1.0, 0.2, 0.0),
            Vector3::new(0.0, 1.0, 0.3),
            Vector3::new(0.2, 0.0, 1.0),
        ]);
        let mut grad = DVector::zeros(9);
        let mut rule = Lbfgs::new(0.1, 3);

        rule.step(&mut params, &mut grad, &mut objective, 0).unwrap();
        let after_first = rule.history.len();
        rule.step(&mut params, &mut grad, &mut objective, 1).unwrap();

        assert!(rule.n_iter > 1);
        assert!(rule.history.len() >= after_first);
    }

    #[test]
    fn evaluations_per_outer_step_respect_the_budget() {
        let h = chain();
        let mut objective = Objective::new(&h, None);
        let mut params = pack(&[Vector3::x(), Vector3::y(), Vector3::z()]);
        let mut grad = DVector::zeros(9);
        let mut rule = Lbfgs::new(0.01, 20);

        rule.step(&mut params, &mut grad, &mut objective, 0).unwrap();
        assert!(objective.evaluations() <= 25);
    }

    #[test]
    fn converged_configuration_is_left_untouched() {
        let h = chain();
        let mut objective = Objective::new(&h, None);
        let mut params = pack(&[Vector3::z(), Vector3::z(), Vector3::z()]);
        let before = params.clone();
        let mut grad = DVector::zeros(9);

        Lbfgs::new(1.0, 20)
            .step(&mut params, &mut grad, &mut objective, 0)
            .unwrap();
        assert_eq!(params, before);
        assert_eq!(objective.evaluations(), 1);
    }
}
