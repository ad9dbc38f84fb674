use spinmin::engine::config::{
    DEFAULT_LBFGS_MAX_ITERATIONS, DEFAULT_WEIGHT_DECAY, OptimizerKind,
};

pub struct DefaultsConfig {
    pub optimizer: String,
    pub learning_rate: f64,
    pub steps: usize,
    pub run_id: String,
    pub lbfgs_max_iterations: usize,
    pub weight_decay: f64,
    pub output_dir: String,
    pub benchmark_optimizers: Vec<String>,
    pub trials: usize,
    pub perturbation: f64,
    pub seed: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            optimizer: OptimizerKind::Adam.name().to_string(),
            learning_rate: 0.01,
            steps: 5000,
            run_id: "default".to_string(),
            lbfgs_max_iterations: DEFAULT_LBFGS_MAX_ITERATIONS,
            weight_decay: DEFAULT_WEIGHT_DECAY,
            output_dir: "data".to_string(),
            benchmark_optimizers: OptimizerKind::ALL
                .iter()
                .map(|k| k.name().to_string())
                .collect(),
            trials: 3,
            perturbation: 0.0,
            seed: 0,
        }
    }
}
