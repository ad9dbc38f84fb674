use super::FirstOrderRule;
use nalgebra::DVector;

/// Plain gradient descent, `p -= lr * g`.
#[derive(Debug, Clone)]
pub struct Sgd {
    lr: f64,
}

impl Sgd {
    pub fn new(lr: f64) -> Self {
        Self { lr }
    }
}

impl FirstOrderRule for Sgd {
    fn apply(&mut self, params: &mut DVector<f64>, grad: &DVector<f64>) {
        params.axpy(-self.lr, grad, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_moves_against_the_gradient() {
        let mut p = DVector::from_vec(vec![1.0, 2.0]);
        let g = DVector::from_vec(vec![0.5, -1.0]);
        Sgd::new(0.1).apply(&mut p, &g);
        assert!((p[0] - 0.95).abs() < 1e-15);
        assert!((p[1] - 2.1).abs() < 1e-15);
    }
}
