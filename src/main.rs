use anyhow::{Context, Result};
use gepreg::config::ConfigManager;
use gepreg::services::{score, train, DataLoader};
use gepreg::data::CsvConnector;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(name = "gepreg", about = "Composite linear-nonlinear GEP symbolic regression")]
enum Cli {
    /// Evolve a model from a CSV training file and save it
    Train {
        #[structopt(long = "data", parse(from_os_str))]
        data: PathBuf,
        #[structopt(long = "config", parse(from_os_str))]
        config: Option<PathBuf>,
        #[structopt(short = "r", long = "response", help = "Response column name")]
        response: Option<String>,
        #[structopt(short = "o", long = "output", parse(from_os_str))]
        output: Option<PathBuf>,
        #[structopt(short = "v", long = "verbose", help = "0 = silent, 1 = per round, 2 = per generation")]
        verbose: Option<u8>,
        #[structopt(short = "t", long = "threads")]
        threads: Option<usize>,
        #[structopt(short = "s", long = "seed")]
        seed: Option<u64>,
    },
    /// Predict with a saved model
    Score {
        #[structopt(short = "m", long = "model", parse(from_os_str))]
        model: PathBuf,
        #[structopt(long = "data", parse(from_os_str))]
        data: PathBuf,
        #[structopt(long = "config", parse(from_os_str))]
        config: Option<PathBuf>,
        #[structopt(short = "o", long = "output", parse(from_os_str), help = "CSV file for predictions; stdout when omitted")]
        output: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let default_filter = if verbose == 0 { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn load_config(path: Option<&PathBuf>) -> Result<ConfigManager> {
    let manager = ConfigManager::new();
    if let Some(path) = path {
        manager
            .load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
    }
    Ok(manager)
}

fn main() -> Result<()> {
    match Cli::from_args() {
        Cli::Train {
            data,
            config,
            response,
            output,
            verbose,
            threads,
            seed,
        } => {
            let manager = load_config(config.as_ref())?;
            manager
                .update(|c| {
                    if let Some(response) = response {
                        c.data.response_column = response;
                    }
                    if let Some(output) = output {
                        c.training.output = output;
                    }
                    if let Some(verbose) = verbose {
                        c.training.verbose = verbose;
                    }
                    if let Some(threads) = threads {
                        c.training.nthreads = threads;
                    }
                    if let Some(seed) = seed {
                        c.training.rseed = seed;
                    }
                })
                .context("Invalid command line options")?;
            let app = manager.get()?;
            init_logging(app.training.verbose);

            let training = DataLoader::load_training(&data, &app.data)
                .with_context(|| format!("Failed to load training data {}", data.display()))?;
            let report = train(training.response(), training.inputs(), &app.training)
                .context("Training failed")?;

            println!("model:   {}", report.model_path.display());
            println!("formula: y = {}", report.formula);
            let mut metrics: Vec<_> = report.metrics.iter().collect();
            metrics.sort_by(|a, b| a.0.cmp(b.0));
            for (name, value) in metrics {
                println!("{:<8} {:.6}", format!("{}:", name), value);
            }
        }
        Cli::Score {
            model,
            data,
            config,
            output,
        } => {
            let manager = load_config(config.as_ref())?;
            let app = manager.get()?;
            init_logging(0);

            let inputs = DataLoader::load_inputs(&data, &app.data)
                .with_context(|| format!("Failed to load scoring data {}", data.display()))?;
            let predictions = score(&model, &inputs)
                .with_context(|| format!("Scoring with {} failed", model.display()))?;

            match output {
                Some(path) => CsvConnector::write_predictions(&path, &predictions)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => {
                    for value in predictions {
                        println!("{}", value);
                    }
                }
            }
        }
    }
    Ok(())
}
