use gepreg::config::{ConfigManager, FitMethod, RunConfig};
use gepreg::engines::evaluation::fitness::link_columns;
use gepreg::engines::evaluation::{FitnessEvaluator, WorkerPool};
use gepreg::engines::generation::{EvolutionEngine, ProgressCallback, RoundSummary, StopReason};
use gepreg::engines::model::{predict, ModelStore, PersistedModel};
use gepreg::functions::primitives::guard;
use gepreg::services::{score, train, train_with_callback, DataLoader};
use gepreg::{GepError, Table, TrainingSet};
use std::path::Path;

/// Records the per-generation best fitness of every round.
#[derive(Default)]
struct TrajectoryRecorder {
    generations: Vec<(usize, usize, f64)>,
    rounds: Vec<RoundSummary>,
}

impl ProgressCallback for TrajectoryRecorder {
    fn on_round_start(&mut self, _round: usize) {}

    fn on_generation_complete(&mut self, round: usize, generation: usize, best: f64, _mean: f64) {
        self.generations.push((round, generation, best));
    }

    fn on_round_complete(&mut self, summary: &RoundSummary) {
        self.rounds.push(summary.clone());
    }
}

fn column(values: &[f64]) -> Table {
    Table::from_columns(&[values.to_vec()]).unwrap()
}

fn config_in(dir: &Path, name: &str) -> RunConfig {
    RunConfig {
        output: dir.join(name),
        ..RunConfig::default()
    }
}

fn messy_data() -> (Vec<f64>, Table) {
    let x1: Vec<f64> = (0..25).map(|i| i as f64 * 0.4 - 5.0).collect();
    let x2: Vec<f64> = (0..25).map(|i| ((i * 5) % 7) as f64 - 3.0).collect();
    let y = x1
        .iter()
        .zip(&x2)
        .map(|(a, b)| (a * 0.9).sin() * b + 0.2 * a * a - b.cos())
        .collect();
    (y, Table::from_columns(&[x1, x2]).unwrap())
}

#[test]
fn boundary_run_reaches_maxiter_and_persists_usable_model() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        headlen: 1,
        popsize: 4,
        maxiter: 2,
        goal: 1.0,
        ..config_in(dir.path(), "boundary.json")
    };
    let response = [1.0, -2.0, 0.5, 3.0, -1.0, 2.5];
    let inputs = column(&[0.3, 1.1, 1.9, 2.2, 3.7, 4.4]);

    let report = train(&response, &inputs, &config).unwrap();
    assert_eq!(report.rounds.len(), 1);
    assert_eq!(report.rounds[0].generations, 2);
    assert_eq!(report.rounds[0].stop_reason, StopReason::MaxIterations);
    assert!(report.model_path.exists());

    let predictions = score(&report.model_path, &column(&[-1.0, 0.0, 10.0])).unwrap();
    assert_eq!(predictions.len(), 3);
    assert!(predictions.iter().all(|p| p.is_finite()));
}

#[test]
fn identity_response_converges_and_scores_back() {
    let response = [1.0, 2.0, 3.0, 4.0];
    let inputs = column(&response);

    for seed in 1..=5 {
        let dir = tempfile::tempdir().unwrap();
        let config = RunConfig {
            px1: 0.4,
            px2: 0.1,
            pm: 0.3,
            popsize: 20,
            headlen: 3,
            goal: 0.99,
            rseed: seed,
            ..config_in(dir.path(), "identity.json")
        };

        let report = train(&response, &inputs, &config).unwrap();
        assert!(report.best_fitness >= 0.99, "seed {} reached {}", seed, report.best_fitness);
        assert_eq!(report.rounds[0].stop_reason, StopReason::GoalReached);
        assert!(report.rounds[0].generations < 100);

        let predictions = score(&report.model_path, &inputs).unwrap();
        for (p, y) in predictions.iter().zip(&response) {
            assert!((p - y).abs() < 0.25, "seed {}: predicted {} for {}", seed, p, y);
        }
    }
}

#[test]
fn fixed_seed_gives_identical_trajectories() {
    let (response, inputs) = messy_data();
    let dir = tempfile::tempdir().unwrap();
    let base = RunConfig {
        popsize: 30,
        maxiter: 12,
        rseed: 7,
        maxpass: 2,
        goal: 1.0,
        ..RunConfig::default()
    };

    let mut first = TrajectoryRecorder::default();
    let a = train_with_callback(
        &response,
        &inputs,
        &RunConfig {
            output: dir.path().join("a.json"),
            ..base.clone()
        },
        &mut first,
    )
    .unwrap();

    let mut second = TrajectoryRecorder::default();
    let b = train_with_callback(
        &response,
        &inputs,
        &RunConfig {
            output: dir.path().join("b.json"),
            ..base.clone()
        },
        &mut second,
    )
    .unwrap();

    assert_eq!(first.generations, second.generations);
    assert_eq!(a.formula, b.formula);
    assert_eq!(
        std::fs::read_to_string(&a.model_path).unwrap(),
        std::fs::read_to_string(&b.model_path).unwrap()
    );
}

#[test]
fn worker_count_does_not_change_results() {
    let (response, inputs) = messy_data();
    let data = TrainingSet::new(inputs, response).unwrap();
    let config = RunConfig {
        popsize: 24,
        maxiter: 8,
        goal: 1.0,
        ..RunConfig::default()
    };
    let run = |workers: WorkerPool| {
        let mut engine = EvolutionEngine::with_workers(config.clone(), 2, workers).unwrap();
        let mut recorder = TrajectoryRecorder::default();
        let outcome = engine.run(&data, &mut recorder).unwrap();
        (recorder.generations, outcome.best.chromosome)
    };

    let threaded = WorkerPool::from_pool(
        rayon::ThreadPoolBuilder::new()
            .num_threads(3)
            .build()
            .unwrap(),
    );
    assert_eq!(threaded.workers(), 3);
    assert_eq!(run(WorkerPool::sequential()), run(threaded));
}

#[test]
fn best_fitness_is_monotonic_under_elitism() {
    let (response, inputs) = messy_data();
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        popsize: 25,
        maxiter: 20,
        eliterate: 0.04,
        pm: 0.5,
        goal: 1.0,
        rseed: 3,
        ..config_in(dir.path(), "elite.json")
    };

    let report = train(&response, &inputs, &config).unwrap();
    let history = &report.rounds[0].history;
    assert_eq!(history.len(), 21);
    for pair in history.windows(2) {
        assert!(pair[1] >= pair[0], "best fitness dropped: {:?}", history);
    }
    assert!((report.metrics["r2"] - report.best_fitness).abs() < 1e-12);
}

#[test]
fn restarts_keep_the_best_round() {
    let (response, inputs) = messy_data();
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        popsize: 15,
        maxiter: 5,
        maxpass: 3,
        goal: 1.0,
        ..config_in(dir.path(), "rounds.json")
    };

    let mut recorder = TrajectoryRecorder::default();
    let report = train_with_callback(&response, &inputs, &config, &mut recorder).unwrap();
    assert_eq!(report.rounds.len(), 3);
    assert_eq!(recorder.rounds.len(), 3);

    let best_round = report
        .rounds
        .iter()
        .map(|r| r.best_fitness)
        .fold(0.0, f64::max);
    assert_eq!(report.best_fitness, best_round);
    assert_eq!(report.hall_of_fame[0].fitness, best_round);
    assert!(report.hall_of_fame.len() <= config.hall_of_fame_size);
}

#[test]
fn persisted_model_predicts_like_the_in_memory_chromosome() {
    let (response, inputs) = messy_data();
    let data = TrainingSet::new(inputs, response).unwrap();
    let config = RunConfig {
        popsize: 20,
        maxiter: 10,
        goal: 1.0,
        ..RunConfig::default()
    };

    let mut engine = EvolutionEngine::new(config, 2).unwrap();
    let outcome = engine.run(&data, &mut TrajectoryRecorder::default()).unwrap();
    let best = &outcome.best;

    let fresh = Table::from_rows(&[
        vec![0.25, -7.0],
        vec![100.0, 3.5],
        vec![-0.001, 0.0],
        vec![13.0, -13.0],
    ])
    .unwrap();
    let evaluator = FitnessEvaluator::new(&data, &outcome.table);
    let in_memory: Vec<f64> = link_columns(
        &evaluator.gene_outputs(&best.chromosome, &fresh),
        &best.evaluation.fit,
    )
    .into_iter()
    .map(guard)
    .collect();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    let model = PersistedModel::new(
        outcome.table.clone(),
        best.chromosome.clone(),
        best.evaluation.fit.clone(),
        best.fitness(),
    );
    ModelStore::save(&model, &path).unwrap();
    let loaded = ModelStore::load(&path).unwrap();

    assert_eq!(predict(&loaded, &fresh).unwrap(), in_memory);
}

#[test]
fn invalid_requests_fail_before_training() {
    let dir = tempfile::tempdir().unwrap();
    let response = [1.0, 2.0, 3.0];
    let inputs = column(&[1.0, 2.0, 3.0]);

    let bad_configs = [
        RunConfig {
            maxiter: 1,
            ..config_in(dir.path(), "a.json")
        },
        RunConfig {
            headlen: 101,
            ..config_in(dir.path(), "b.json")
        },
        RunConfig {
            fit_method: FitMethod::Classification,
            ..config_in(dir.path(), "c.json")
        },
        RunConfig {
            rseed: 0,
            ..config_in(dir.path(), "d.json")
        },
    ];
    for config in &bad_configs {
        assert!(matches!(
            train(&response, &inputs, config),
            Err(GepError::Validation(_))
        ));
        assert!(!config.output.exists());
    }

    let config = config_in(dir.path(), "shape.json");
    assert!(matches!(
        train(&[1.0, 2.0], &inputs, &config),
        Err(GepError::Validation(_))
    ));
    assert!(matches!(
        train(&response, &column(&[1.0, f64::NAN, 3.0]), &config),
        Err(GepError::Validation(_))
    ));
    assert!(!config.output.exists());
}

#[test]
fn scoring_rejects_wrong_width_and_corrupt_models() {
    let dir = tempfile::tempdir().unwrap();
    let config = RunConfig {
        maxiter: 3,
        popsize: 6,
        ..config_in(dir.path(), "small.json")
    };
    let report = train(&[1.0, 4.0, 9.0], &column(&[1.0, 2.0, 3.0]), &config).unwrap();

    let wide = Table::from_rows(&[vec![1.0, 2.0]]).unwrap();
    assert!(matches!(
        score(&report.model_path, &wide),
        Err(GepError::Validation(_))
    ));

    let text = std::fs::read_to_string(&report.model_path).unwrap();
    let corrupt = dir.path().join("corrupt.json");
    std::fs::write(&corrupt, &text[..text.len() - 10]).unwrap();
    assert!(matches!(
        score(&corrupt, &column(&[1.0])),
        Err(GepError::Format(_))
    ));
}

#[test]
fn csv_and_config_files_drive_a_run() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("run.toml");
    let output = dir.path().join("quadratic.json");
    std::fs::write(
        &config_path,
        format!(
            "[training]\npopsize = 30\nheadlen = 4\ngoal = 0.999\noutput = {:?}\n\n[data]\nresponse_column = \"y\"\n",
            output.to_string_lossy()
        ),
    )
    .unwrap();

    let manager = ConfigManager::new();
    manager.load_from_file(&config_path).unwrap();
    let app = manager.get().unwrap();

    let data_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/quadratic.csv");
    let data = DataLoader::load_training(&data_path, &app.data).unwrap();
    assert_eq!(data.nvars(), 1);

    let report = train(data.response(), data.inputs(), &app.training).unwrap();
    assert_eq!(report.model_path, output);
    assert!(report.best_fitness >= 0.999, "reached {}", report.best_fitness);

    let inputs = DataLoader::load_inputs(&data_path, &app.data).unwrap();
    let predictions = score(&output, &inputs).unwrap();
    assert_eq!(predictions.len(), data.nrows());
}
