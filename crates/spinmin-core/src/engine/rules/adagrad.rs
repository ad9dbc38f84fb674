use super::FirstOrderRule;
use nalgebra::DVector;

const EPS: f64 = 1e-10;

/// Adagrad with a non-decaying squared-gradient sum starting at zero.
#[derive(Debug, Clone)]
pub struct Adagrad {
    lr: f64,
    sum: DVector<f64>,
}

impl Adagrad {
    pub fn new(lr: f64, n_params: usize) -> Self {
        Self {
            lr,
            sum: DVector::zeros(n_params),
        }
    }
}

impl FirstOrderRule for Adagrad {
    fn apply(&mut self, params: &mut DVector<f64>, grad: &DVector<f64>) {
        for ((p, g), s) in params.iter_mut().zip(grad.iter()).zip(self.sum.iter_mut()) {
            *s += g * g;
            *p -= self.lr * g / (s.sqrt() + EPS);
        }
    }
}
