//! `polycomp` command-line front-end
//!
//! ```text
//! polycomp [--config-dir DIR] [--artifacts DIR] <generate|train|predict|importance|info>
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`,
//! `-v` for `info`, `-vv` for `debug`).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use polycomp::composite::{Property, DEFAULT_PARTICLE_SIZE_UM};
use polycomp::config::AppConfig;
use polycomp::dataset::Dataset;
use polycomp::predictor::{
    render_dataset_summary, render_importances, render_key_values, render_prediction,
    PredictionRequest, PredictorSession,
};
use polycomp::storage::DatasetStore;
use polycomp::{export, Pipeline, DEFAULT_ARTIFACTS_DIR, DEFAULT_CONFIG_DIR};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory holding categories.json and hyperparameters.json
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_DIR)]
    config_dir: PathBuf,

    /// Directory the model artifacts are written to and read from
    #[arg(long, global = true, default_value = DEFAULT_ARTIFACTS_DIR)]
    artifacts: PathBuf,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a synthetic dataset and write it as Parquet or CSV
    Generate {
        /// Output file (.parquet or .csv)
        #[arg(short, long, default_value = "polymer_composites.parquet")]
        output: PathBuf,
        /// Number of samples (overrides hyperparameters.json)
        #[arg(short = 'n', long)]
        samples: Option<usize>,
        /// Random seed (overrides hyperparameters.json)
        #[arg(long)]
        seed: Option<u64>,
        /// Relative noise level (overrides hyperparameters.json)
        #[arg(long)]
        noise: Option<f64>,
    },
    /// Train the model and write artifacts plus the training report
    Train,
    /// Predict the nine properties of one composite
    Predict {
        /// Polymer matrix (Epoxy, Polyester, Vinyl Ester, Phenolic, Polyurethane)
        #[arg(short, long, default_value = "Epoxy")]
        matrix: String,
        /// Filler type (Bone particles, Hydroxyapatite, Chitosan, Cellulose nanocrystals, Lignin, Starch)
        #[arg(short, long, default_value = "Hydroxyapatite")]
        filler: String,
        /// Filler content in wt% (0-50)
        #[arg(short = 'p', long, default_value_t = 25.0)]
        filler_percent: f64,
        /// Cure temperature in °C (60-180)
        #[arg(long, default_value_t = 120.0)]
        temperature: f64,
        /// Cure time in hours (2-24)
        #[arg(long, default_value_t = 8.0)]
        time: f64,
        /// Consolidation pressure in MPa (0.1-10)
        #[arg(long, default_value_t = 2.0)]
        pressure: f64,
        /// Filler particle size in µm (10-500)
        #[arg(long, default_value_t = DEFAULT_PARTICLE_SIZE_UM)]
        particle_size: f64,
        /// Also write the result table to this CSV file
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Show feature importances of the trained model
    Importance {
        /// Property name or column (default: every property)
        #[arg(long)]
        property: Option<String>,
    },
    /// Show model details and dataset statistics
    Info {
        /// Summarize this Parquet dataset instead of regenerating the training data
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let pipeline = Pipeline::builder()
        .config_dir(&cli.config_dir)
        .artifacts_dir(&cli.artifacts)
        .build()
        .with_context(|| format!("loading configuration from {}", cli.config_dir.display()))?;

    match cli.command {
        Commands::Generate {
            output,
            samples,
            seed,
            noise,
        } => generate(pipeline.config(), &output, samples, seed, noise),
        Commands::Train => train(&pipeline),
        Commands::Predict {
            matrix,
            filler,
            filler_percent,
            temperature,
            time,
            pressure,
            particle_size,
            export,
        } => {
            let request = PredictionRequest {
                polymer_matrix: matrix,
                filler_type: filler,
                filler_percent,
                cure_temperature_c: temperature,
                cure_time_h: time,
                pressure_mpa: pressure,
                particle_size_um: particle_size,
            };
            predict(&pipeline, &request, export.as_deref())
        }
        Commands::Importance { property } => importance(&pipeline, property.as_deref()),
        Commands::Info { dataset } => show_info(&pipeline, dataset.as_deref()),
    }
}

fn generate(
    config: &AppConfig,
    output: &Path,
    samples: Option<usize>,
    seed: Option<u64>,
    noise: Option<f64>,
) -> Result<()> {
    let mut config = config.clone();
    let hp = &mut config.hyperparameters;
    hp.n_samples = samples.unwrap_or(hp.n_samples);
    hp.seed = seed.unwrap_or(hp.seed);
    hp.noise_level = noise.unwrap_or(hp.noise_level);
    hp.validate()?;

    let pipeline = Pipeline::builder().config(config).build()?;
    let dataset = pipeline.generate_dataset()?;
    write_dataset(&dataset, output)?;
    println!("Wrote {} samples to {}", dataset.len(), output.display());
    Ok(())
}

fn write_dataset(dataset: &Dataset, output: &Path) -> Result<()> {
    let is_csv = output
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        export::export_dataset(output, dataset)?;
    } else {
        DatasetStore::from_dataset(dataset)?.save_parquet(output)?;
    }
    Ok(())
}

fn train(pipeline: &Pipeline) -> Result<()> {
    let trained = pipeline.train().context("training failed")?;
    let report = &trained.report;

    let rows: Vec<(String, String)> = report
        .metrics
        .iter()
        .map(|m| {
            let scale = if m.log_scale { " (log10)" } else { "" };
            (
                format!("{}{scale}", m.target),
                format!("R² {:>7.3}   MAE {:>10.4}   RMSE {:>10.4}", m.r2, m.mae, m.rmse),
            )
        })
        .collect();
    println!(
        "{}",
        render_key_values(
            &format!(
                "Run {}: {} train / {} test samples",
                report.run.run_id(),
                report.n_train,
                report.n_test
            ),
            &rows
        )
    );
    if let Some(r2) = report.mean_r2() {
        println!("Mean held-out R²: {r2:.3}");
    }
    println!("Artifacts written to {}", pipeline.artifacts_dir().display());
    Ok(())
}

fn predict(pipeline: &Pipeline, request: &PredictionRequest, export: Option<&Path>) -> Result<()> {
    let predictor = pipeline
        .predictor()
        .context("could not load the trained model")?;
    let mut session = PredictorSession::new(predictor);
    let prediction = *session.submit(request)?;
    println!("{}", render_prediction(&prediction));

    if let Some(path) = export {
        session.export_last_csv(path)?;
        info!(path = %path.display(), "prediction exported");
        println!("Results written to {}", path.display());
    }
    Ok(())
}

fn importance(pipeline: &Pipeline, property: Option<&str>) -> Result<()> {
    let predictor = pipeline
        .predictor()
        .context("could not load the trained model")?;
    let properties: Vec<Property> = match property {
        Some(name) => match Property::from_name(name) {
            Some(p) => vec![p],
            None => bail!(
                "unknown property '{name}' (expected one of: {})",
                Property::ALL.map(Property::column).join(", ")
            ),
        },
        None => Property::ALL.to_vec(),
    };
    for property in properties {
        println!(
            "{}",
            render_importances(property, &predictor.ranked_importances(property))
        );
    }
    Ok(())
}

fn show_info(pipeline: &Pipeline, dataset: Option<&Path>) -> Result<()> {
    let predictor = pipeline
        .predictor()
        .context("could not load the trained model")?;
    println!(
        "{}",
        render_key_values("Model Details", &predictor.model_details())
    );

    let dataset = match dataset {
        Some(path) => DatasetStore::load_parquet(path)
            .and_then(|store| store.to_dataset())
            .with_context(|| format!("reading dataset {}", path.display()))?,
        None => {
            let config = predictor
                .report()
                .map(|report| AppConfig {
                    categories: pipeline.config().categories.clone(),
                    hyperparameters: report.hyperparameters.clone(),
                })
                .unwrap_or_else(|| pipeline.config().clone());
            Pipeline::builder().config(config).build()?.generate_dataset()?
        }
    };
    println!("Dataset Statistics");
    println!("{}", render_dataset_summary(&dataset.summary()));
    Ok(())
}
