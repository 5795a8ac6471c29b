//! Complete polycomp pipeline: Generate → Persist → Train → Predict → Export
//!
//! This demo walks the whole workflow in a temporary directory:
//! 1. Generate a synthetic dataset and store it as Parquet
//! 2. Train the multi-output forest and write the artifacts
//! 3. Reload the predictor from disk, as the CLI does at startup
//! 4. Predict a filler-content sweep and export the last result as CSV
//!
//! Run with: cargo run --example end_to_end --release

use polycomp::composite::Property;
use polycomp::config::{AppConfig, CategoryConfig, Hyperparameters};
use polycomp::predictor::{render_prediction, PredictionRequest, PredictorSession, DEFAULT_EXPORT_FILE};
use polycomp::storage::DatasetStore;
use polycomp::Pipeline;
use std::time::Instant;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║           POLYCOMP END-TO-END PIPELINE DEMONSTRATION         ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let workdir = std::env::temp_dir().join("polycomp_demo");
    let artifacts = workdir.join("artifacts");
    std::fs::create_dir_all(&workdir)?;

    let pipeline = Pipeline::builder()
        .config(AppConfig {
            categories: CategoryConfig::default(),
            hyperparameters: Hyperparameters {
                n_estimators: 50,
                ..Hyperparameters::default()
            },
        })
        .artifacts_dir(&artifacts)
        .build()?;

    // Step 1: Generate and persist
    println!("┌─ STEP 1: SYNTHETIC DATA ───────────────────────────────────┐");
    let start = Instant::now();
    let dataset = pipeline.generate_dataset()?;
    let parquet_path = workdir.join("polymer_composites.parquet");
    DatasetStore::from_dataset(&dataset)?.save_parquet(&parquet_path)?;
    let reloaded = DatasetStore::load_parquet(&parquet_path)?.to_dataset()?;
    println!("│ Samples generated: {}", dataset.len());
    println!("│ Parquet round trip: {} rows", reloaded.len());
    println!("│ Time: {:?}", start.elapsed());
    println!("└────────────────────────────────────────────────────────────┘\n");

    // Step 2: Train
    println!("┌─ STEP 2: TRAINING ─────────────────────────────────────────┐");
    let start = Instant::now();
    let trained = pipeline.train()?;
    for metrics in &trained.report.metrics {
        println!("│ {:<32} R² {:>6.3}", metrics.target, metrics.r2);
    }
    println!("│ Time: {:?}", start.elapsed());
    println!("└────────────────────────────────────────────────────────────┘\n");

    // Step 3: Reload and predict
    println!("┌─ STEP 3: FILLER SWEEP (Epoxy + Hydroxyapatite) ────────────┐");
    let mut session = PredictorSession::new(pipeline.predictor()?);
    for percent in [0.0, 10.0, 20.0, 30.0, 40.0, 50.0] {
        let request = PredictionRequest::new("Epoxy", "Hydroxyapatite").filler_percent(percent);
        let prediction = session.submit(&request)?;
        println!(
            "│ {percent:>4.0} wt%  tensile {:>7} MPa  k {:>6} W/m·K",
            Property::TensileStrength.format_value(prediction.properties.get(Property::TensileStrength)),
            Property::ThermalConductivity
                .format_value(prediction.properties.get(Property::ThermalConductivity)),
        );
    }
    let rejected = session.submit(&PredictionRequest::new("Epoxy", "Hydroxyapatite").filler_percent(51.0));
    if let Err(e) = rejected {
        println!("│ 51 wt% rejected: {e}");
    }
    println!("└────────────────────────────────────────────────────────────┘\n");

    // Step 4: Export
    if let Some(last) = session.last() {
        println!("{}", render_prediction(last));
    }
    let csv_path = workdir.join(DEFAULT_EXPORT_FILE);
    session.export_last_csv(&csv_path)?;
    println!("Exported last prediction to {}", csv_path.display());

    Ok(())
}
