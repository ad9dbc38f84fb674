use super::FirstOrderRule;
use nalgebra::DVector;

const ALPHA: f64 = 0.99;
const EPS: f64 = 1e-8;

/// RMSprop with an exponentially decaying squared-gradient average.
#[derive(Debug, Clone)]
pub struct RmsProp {
    lr: f64,
    square_avg: DVector<f64>,
}

impl RmsProp {
    pub fn new(lr: f64, n_params: usize) -> Self {
        Self {
            lr,
            square_avg: DVector::zeros(n_params),
        }
    }
}

impl FirstOrderRule for RmsProp {
    fn apply(&mut self, params: &mut DVector<f64>, grad: &DVector<f64>) {
        for ((p, g), s) in params
            .iter_mut()
            .zip(grad.iter())
            .zip(self.square_avg.iter_mut())
        {
            *s = ALPHA * *s + (1.0 - ALPHA) * g * g;
            *p -= self.lr * g / (s.sqrt() + EPS);
        }
    }
}
