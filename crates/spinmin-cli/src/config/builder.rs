use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileInputConfig, FileOptimizationConfig, FileOutputConfig};
use super::models::{BenchmarkAppConfig, LatticeInput, OptimizeAppConfig};
use crate::cli::{BenchmarkArgs, LatticeArgs, OptimizeArgs, RunArgs};
use crate::error::{CliError, Result};
use crate::utils::parser::{parse_name_list, parse_vector};
use nalgebra::Vector3;
use spinmin::core::io::discovery::FileOverrides;
use spinmin::engine::config::{OptimizationConfigBuilder, OptimizerKind};
use spinmin::workflows::benchmark::BenchmarkConfig;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub fn build_optimize_config(args: &OptimizeArgs) -> Result<OptimizeAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(args.config.as_deref(), &args.set_values)?;

    let lattice = resolve_lattice(&args.lattice, file_config.input.take())?;
    let output_dir = resolve_output_dir(args.output_dir.as_ref(), file_config.output.take(), &defaults);

    let opt_file = file_config.optimization.take().unwrap_or_default();
    let optimizer = args
        .optimizer
        .clone()
        .or_else(|| opt_file.optimizer.clone())
        .unwrap_or_else(|| defaults.optimizer.clone());

    let core_config = run_config_builder(&args.run, opt_file, &defaults)?
        .optimizer_name(optimizer)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(OptimizeAppConfig {
        lattice,
        output_dir,
        reference: args.reference.clone(),
        core_config,
    })
}

pub fn build_benchmark_config(args: &BenchmarkArgs) -> Result<BenchmarkAppConfig> {
    let defaults = DefaultsConfig::default();
    let mut file_config = load_file_config(args.config.as_deref(), &args.set_values)?;

    let lattice = resolve_lattice(&args.lattice, file_config.input.take())?;
    let output_dir = resolve_output_dir(args.output_dir.as_ref(), file_config.output.take(), &defaults);

    let bench_file = file_config.benchmark.take().unwrap_or_default();
    let names = if args.optimizers.is_empty() {
        bench_file
            .optimizers
            .unwrap_or_else(|| defaults.benchmark_optimizers.clone())
    } else {
        args.optimizers.clone()
    };
    let optimizers = names
        .iter()
        .map(|name| {
            name.parse::<OptimizerKind>()
                .map_err(|e| CliError::Config(e.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;
    let first = optimizers.first().copied().ok_or_else(|| {
        CliError::Config("The benchmark needs at least one optimizer".to_string())
    })?;

    // The rule of `[optimization]` is replaced by every benchmarked rule in turn.
    let opt_file = file_config.optimization.take().unwrap_or_default();
    let base = run_config_builder(&args.run, opt_file, &defaults)?
        .optimizer(first)
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let core_config = BenchmarkConfig {
        base,
        optimizers,
        trials: args.trials.or(bench_file.trials).unwrap_or(defaults.trials),
        perturbation: args
            .perturbation
            .or(bench_file.perturbation)
            .unwrap_or(defaults.perturbation),
        seed: args.seed.or(bench_file.seed).unwrap_or(defaults.seed),
    };
    core_config
        .validate()
        .map_err(|e| CliError::Config(e.to_string()))?;

    Ok(BenchmarkAppConfig {
        lattice,
        output_dir,
        core_config,
    })
}

fn load_file_config(path: Option<&Path>, set_values: &[String]) -> Result<FileConfig> {
    let file_config = match path {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    apply_set_values(file_config, set_values)
}

fn resolve_lattice(args: &LatticeArgs, file_val: Option<FileInputConfig>) -> Result<LatticeInput> {
    let file_val = file_val.unwrap_or_default();
    let dir = args.lattice_dir.clone().or(file_val.lattice_dir).ok_or_else(|| {
        CliError::Config(
            "No lattice directory given. Pass --lattice or set `input.lattice-dir`.".to_string(),
        )
    })?;

    Ok(LatticeInput {
        dir,
        overrides: FileOverrides {
            restart: args.restart.clone().or(file_val.restart),
            exchange: args.exchange.clone().or(file_val.exchange),
            dmi: args.dmi.clone().or(file_val.dmi),
            anisotropy: args.anisotropy.clone().or(file_val.anisotropy),
        },
    })
}

fn resolve_output_dir(
    cli_arg: Option<&PathBuf>,
    file_val: Option<FileOutputConfig>,
    defaults: &DefaultsConfig,
) -> PathBuf {
    cli_arg
        .cloned()
        .or(file_val.and_then(|o| o.dir))
        .unwrap_or_else(|| PathBuf::from(&defaults.output_dir))
}

fn run_config_builder(
    args: &RunArgs,
    file_val: FileOptimizationConfig,
    defaults: &DefaultsConfig,
) -> Result<OptimizationConfigBuilder> {
    let run_id = args
        .run_id
        .clone()
        .or(file_val.run_id)
        .unwrap_or_else(|| defaults.run_id.clone());
    let external_field = args.field.or(file_val.external_field).map(Vector3::from);

    Ok(OptimizationConfigBuilder::new()
        .learning_rate(
            args.learning_rate
                .or(file_val.learning_rate)
                .unwrap_or(defaults.learning_rate),
        )
        .steps(args.steps.or(file_val.steps).unwrap_or(defaults.steps))
        .run_id(run_id)
        .external_field(external_field)
        .lbfgs_max_iterations(
            args.lbfgs_max_iterations
                .or(file_val.lbfgs_max_iterations)
                .unwrap_or(defaults.lbfgs_max_iterations),
        )
        .weight_decay(
            args.weight_decay
                .or(file_val.weight_decay)
                .unwrap_or(defaults.weight_decay),
        ))
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key.split_once('.') {
            Some(("input", field)) => {
                let input = config.input.get_or_insert_with(Default::default);
                let slot = match field {
                    "lattice-dir" => &mut input.lattice_dir,
                    "restart" => &mut input.restart,
                    "exchange" => &mut input.exchange,
                    "dmi" => &mut input.dmi,
                    "anisotropy" => &mut input.anisotropy,
                    _ => return Err(unsupported_key(key)),
                };
                *slot = Some(PathBuf::from(value_str));
            }
            Some(("output", "dir")) => {
                config.output.get_or_insert_with(Default::default).dir =
                    Some(PathBuf::from(value_str));
            }
            Some(("optimization", field)) => {
                let opt = config.optimization.get_or_insert_with(Default::default);
                match field {
                    "optimizer" => opt.optimizer = Some(value_str.to_string()),
                    "learning-rate" => {
                        opt.learning_rate = Some(parse_value(key, value_str, "float")?)
                    }
                    "steps" => opt.steps = Some(parse_value(key, value_str, "integer")?),
                    "run-id" => opt.run_id = Some(value_str.to_string()),
                    "external-field" => {
                        opt.external_field = Some(
                            parse_vector(value_str).map_err(|e| CliError::Config(e.to_string()))?,
                        )
                    }
                    "lbfgs-max-iterations" => {
                        opt.lbfgs_max_iterations = Some(parse_value(key, value_str, "integer")?)
                    }
                    "weight-decay" => {
                        opt.weight_decay = Some(parse_value(key, value_str, "float")?)
                    }
                    _ => return Err(unsupported_key(key)),
                }
            }
            Some(("benchmark", field)) => {
                let bench = config.benchmark.get_or_insert_with(Default::default);
                match field {
                    "optimizers" => bench.optimizers = Some(parse_name_list(value_str)),
                    "trials" => bench.trials = Some(parse_value(key, value_str, "integer")?),
                    "perturbation" => {
                        bench.perturbation = Some(parse_value(key, value_str, "float")?)
                    }
                    "seed" => bench.seed = Some(parse_value(key, value_str, "integer")?),
                    _ => return Err(unsupported_key(key)),
                }
            }
            _ => return Err(unsupported_key(key)),
        }
    }
    Ok(config)
}

fn unsupported_key(key: &str) -> CliError {
    CliError::Config(format!(
        "Unsupported configuration key for --set: '{}'",
        key
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn base_optimize_args() -> OptimizeArgs {
        OptimizeArgs {
            lattice: LatticeArgs {
                lattice_dir: Some(PathBuf::from("lattice")),
                ..Default::default()
            },
            output_dir: None,
            config: None,
            optimizer: None,
            run: RunArgs::default(),
            reference: None,
            set_values: vec![],
        }
    }

    fn base_benchmark_args() -> BenchmarkArgs {
        BenchmarkArgs {
            lattice: LatticeArgs {
                lattice_dir: Some(PathBuf::from("lattice")),
                ..Default::default()
            },
            output_dir: None,
            config: None,
            optimizers: vec![],
            run: RunArgs::default(),
            trials: None,
            perturbation: None,
            seed: None,
            set_values: vec![],
        }
    }

    fn write_config(toml: &str) -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("spinmin.toml");
        fs::write(&path, toml).unwrap();
        (dir, path)
    }

    #[test]
    fn defaults_fill_every_unset_value() {
        let app = build_optimize_config(&base_optimize_args()).unwrap();
        let defaults = DefaultsConfig::default();
        let cfg = app.core_config;

        assert_eq!(cfg.optimizer, OptimizerKind::Adam);
        assert_eq!(cfg.learning_rate, defaults.learning_rate);
        assert_eq!(cfg.steps, defaults.steps);
        assert_eq!(cfg.run_id, "default");
        assert_eq!(cfg.external_field, None);
        assert_eq!(cfg.lbfgs_max_iterations, defaults.lbfgs_max_iterations);
        assert_eq!(cfg.weight_decay, defaults.weight_decay);
        assert_eq!(app.output_dir, PathBuf::from("data"));
        assert_eq!(app.lattice.dir, PathBuf::from("lattice"));
        assert_eq!(app.lattice.overrides, FileOverrides::default());
    }

    #[test]
    fn file_values_are_merged() {
        let (_dir, path) = write_config(
            r#"
            [input]
            lattice-dir = "from-file"
            anisotropy = "from-file/anisotropy.alt"

            [output]
            dir = "runs"

            [optimization]
            optimizer = "rmsprop"
            learning-rate = 0.2
            steps = 40
            run-id = "skx"
            external-field = [0.0, 0.0, 1.5]
            "#,
        );
        let mut args = base_optimize_args();
        args.lattice.lattice_dir = None;
        args.config = Some(path);

        let app = build_optimize_config(&args).unwrap();
        let cfg = app.core_config;
        assert_eq!(app.lattice.dir, PathBuf::from("from-file"));
        assert_eq!(
            app.lattice.overrides.anisotropy,
            Some(PathBuf::from("from-file/anisotropy.alt"))
        );
        assert_eq!(app.output_dir, PathBuf::from("runs"));
        assert_eq!(cfg.optimizer, OptimizerKind::RmsProp);
        assert_eq!(cfg.learning_rate, 0.2);
        assert_eq!(cfg.steps, 40);
        assert_eq!(cfg.run_id, "skx");
        assert_eq!(cfg.external_field, Some(Vector3::new(0.0, 0.0, 1.5)));
    }

    #[test]
    fn cli_flags_override_set_values_and_file() {
        let (_dir, path) = write_config(
            r#"
            [optimization]
            optimizer = "sgd"
            steps = 40
            learning-rate = 0.2
            "#,
        );
        let mut args = base_optimize_args();
        args.config = Some(path);
        args.optimizer = Some("adagrad".to_string());
        args.run.steps = Some(7);
        args.set_values = vec![
            "optimization.steps=99".to_string(),
            "optimization.learning-rate=0.3".to_string(),
        ];

        let cfg = build_optimize_config(&args).unwrap().core_config;
        assert_eq!(cfg.optimizer, OptimizerKind::Adagrad);
        assert_eq!(cfg.steps, 7);
        assert_eq!(cfg.learning_rate, 0.3);
    }

    #[test]
    fn set_values_cover_every_section() {
        let mut args = base_optimize_args();
        args.set_values = vec![
            "input.dmi=alt/dmdata".to_string(),
            "output.dir=elsewhere".to_string(),
            "optimization.optimizer=l-bfgs".to_string(),
            "optimization.external-field=0,1,0".to_string(),
            "optimization.lbfgs-max-iterations=5".to_string(),
            "optimization.weight-decay=0.5".to_string(),
            "optimization.run-id=tuned".to_string(),
        ];

        let app = build_optimize_config(&args).unwrap();
        assert_eq!(app.lattice.overrides.dmi, Some(PathBuf::from("alt/dmdata")));
        assert_eq!(app.output_dir, PathBuf::from("elsewhere"));
        let cfg = app.core_config;
        assert_eq!(cfg.optimizer, OptimizerKind::Lbfgs);
        assert_eq!(cfg.external_field, Some(Vector3::y()));
        assert_eq!(cfg.lbfgs_max_iterations, 5);
        assert_eq!(cfg.weight_decay, 0.5);
        assert_eq!(cfg.run_id, "tuned");
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        for bad in [
            "optimization.steps",
            "optimization.steps=many",
            "optimization.momentum=0.9",
            "plotting.enabled=true",
            "steps=3",
        ] {
            let mut args = base_optimize_args();
            args.set_values = vec![bad.to_string()];
            assert!(
                matches!(build_optimize_config(&args), Err(CliError::Config(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn unknown_optimizer_is_a_configuration_error() {
        let mut args = base_optimize_args();
        args.optimizer = Some("newton".to_string());
        assert!(matches!(
            build_optimize_config(&args),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn invalid_run_id_is_a_configuration_error() {
        let mut args = base_optimize_args();
        args.run.run_id = Some("../escape".to_string());
        assert!(matches!(
            build_optimize_config(&args),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn missing_lattice_directory_is_reported() {
        let mut args = base_optimize_args();
        args.lattice.lattice_dir = None;
        let err = build_optimize_config(&args).err().unwrap();
        assert!(err.to_string().contains("--lattice"));
    }

    #[test]
    fn benchmark_defaults_to_every_rule() {
        let app = build_benchmark_config(&base_benchmark_args()).unwrap();
        let cfg = app.core_config;
        assert_eq!(cfg.optimizers, OptimizerKind::ALL.to_vec());
        assert_eq!(cfg.trials, DefaultsConfig::default().trials);
        assert_eq!(cfg.perturbation, 0.0);
        assert_eq!(cfg.base.run_id, "default");
    }

    #[test]
    fn benchmark_merges_file_set_and_flags() {
        let (_dir, path) = write_config(
            r#"
            [optimization]
            steps = 25

            [benchmark]
            optimizers = ["adam", "sgd", "lbfgs"]
            trials = 2
            perturbation = 0.1
            seed = 9
            "#,
        );
        let mut args = base_benchmark_args();
        args.config = Some(path);
        args.trials = Some(5);
        args.set_values = vec!["benchmark.optimizers=adamw,rmsprop".to_string()];

        let cfg = build_benchmark_config(&args).unwrap().core_config;
        assert_eq!(
            cfg.optimizers,
            vec![OptimizerKind::AdamW, OptimizerKind::RmsProp]
        );
        assert_eq!(cfg.trials, 5);
        assert_eq!(cfg.perturbation, 0.1);
        assert_eq!(cfg.seed, 9);
        assert_eq!(cfg.base.steps, 25);
    }

    #[test]
    fn benchmark_rejects_repeated_and_unknown_rules() {
        let mut args = base_benchmark_args();
        args.optimizers = vec!["adam".to_string(), "ADAM".to_string()];
        assert!(matches!(
            build_benchmark_config(&args),
            Err(CliError::Config(_))
        ));

        args.optimizers = vec!["adam".to_string(), "momentum".to_string()];
        assert!(matches!(
            build_benchmark_config(&args),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn benchmark_rejects_zero_trials() {
        let mut args = base_benchmark_args();
        args.trials = Some(0);
        assert!(matches!(
            build_benchmark_config(&args),
            Err(CliError::Config(_))
        ));
    }
}
