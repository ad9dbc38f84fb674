use super::FirstOrderRule;
use nalgebra::DVector;

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPS: f64 = 1e-8;

/// Adam with bias-corrected moments. With a weight decay set it becomes
/// AdamW: parameters shrink by `1 - lr * wd` before each moment update.
#[derive(Debug, Clone)]
pub struct Adam {
    lr: f64,
    weight_decay: Option<f64>,
    step: i32,
    exp_avg: DVector<f64>,
    exp_avg_sq: DVector<f64>,
}

impl Adam {
    pub fn new(lr: f64, n_params: usize) -> Self {
        Self {
            lr,
            weight_decay: None,
            step: 0,
            exp_avg: DVector::zeros(n_params),
            exp_avg_sq: DVector::zeros(n_params),
        }
    }

    pub fn with_weight_decay(mut self, weight_decay: f64) -> Self {
        self.weight_decay = Some(weight_decay);
        self
    }
}

impl FirstOrderRule for Adam {
    fn apply(&mut self, params: &mut DVector<f64>, grad: &DVector<f64>) {
        self.step = self.step.saturating_add(1);
        if let Some(wd) = self.weight_decay {
            *params *= 1.0 - self.lr * wd;
        }

        let bias_correction1 = 1.0 - BETA1.powi(self.step);
        let bias_correction2_sqrt = (1.0 - BETA2.powi(self.step)).sqrt();
        let step_size = self.lr / bias_correction1;

        for (((p, g), m), v) in params
            .iter_mut()
            .zip(grad.iter())
            .zip(self.exp_avg.iter_mut())
            .zip(self.exp_avg_sq.iter_mut())
        {
            *m = BETA1 * *m + (1.0 - BETA1) * g;
            *v = BETA2 * *v + (1.0 - BETA2) * g * g;
            let denom = v.sqrt() / bias_correction2_sqrt + EPS;
            *p -= step_size * *m / denom;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_each_parameter_by_about_lr() {
        let mut p = DVector::from_vec(vec![0.0, 0.0]);
        let g = DVector::from_vec(vec![3.0, -0.5]);
        Adam::new(0.01, 2).apply(&mut p, &g);
        assert!((p[0] + 0.01).abs() < 1e-8);
        assert!((p[1] - 0.01).abs() < 1e-8);
    }

    #[test]
    fn zero_gradient_leaves_parameters_unchanged() {
        let mut p = DVector::from_vec(vec![0.3, -0.7]);
        let g = DVector::zeros(2);
        let mut rule = Adam::new(0.1, 2);
        for _ in 0..5 {
            rule.apply(&mut p, &g);
        }
        assert_eq!(p, DVector::from_vec(vec![0.3, -0.7]));
    }

    #[test]
    fn weight_decay_shrinks_parameters_before_the_update() {
        let mut p = DVector::from_vec(vec![2.0]);
        let g = DVector::zeros(1);
        Adam::new(0.1, 1).with_weight_decay(0.5).apply(&mut p, &g);
        assert!((p[0] - 1.9).abs() < 1e-15);
    }
}
