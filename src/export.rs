//! CSV export
//!
//! Two flat-file outputs:
//! - the prediction summary (`Property,Value,Unit`, one row per property)
//! - a full dataset, with the same columns as the Parquet layout

use crate::composite::{Property, PropertyVector};
use crate::dataset::{dataset_schema, Dataset, Sample};
use crate::Result;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use tracing::info;

#[derive(Serialize)]
struct SummaryRow<'a> {
    #[serde(rename = "Property")]
    property: &'a str,
    #[serde(rename = "Value")]
    value: String,
    #[serde(rename = "Unit")]
    unit: &'a str,
}

/// Write the prediction summary table.
///
/// Values use the same precision as the terminal tables.
///
/// # Errors
///
/// Returns [`crate::Error::Csv`] if a record cannot be written.
pub fn write_prediction_csv<W: Write>(writer: W, properties: &PropertyVector) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for (property, value) in properties.iter() {
        wtr.serialize(SummaryRow {
            property: property.name(),
            value: property.format_value(value),
            unit: property.unit(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}

/// Prediction summary as a CSV string
///
/// # Errors
///
/// Returns [`crate::Error::Csv`] if a record cannot be written.
pub fn prediction_csv_string(properties: &PropertyVector) -> Result<String> {
    let mut buffer = Vec::new();
    write_prediction_csv(&mut buffer, properties)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write the prediction summary to `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_prediction<P: AsRef<Path>>(path: P, properties: &PropertyVector) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    write_prediction_csv(file, properties)?;
    info!(path = %path.display(), "exported prediction");
    Ok(())
}

/// Write every sample, one row each, with a header row.
///
/// # Errors
///
/// Returns [`crate::Error::Csv`] if a record cannot be written.
pub fn write_dataset_csv<W: Write>(writer: W, dataset: &Dataset) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let schema = dataset_schema();
    wtr.write_record(schema.fields().iter().map(|f| f.name().as_str()))?;
    for sample in dataset {
        wtr.write_record(dataset_row(sample))?;
    }
    wtr.flush()?;
    Ok(())
}

fn dataset_row(sample: &Sample) -> Vec<String> {
    let spec = &sample.spec;
    let mut row = vec![
        spec.matrix().label().to_string(),
        spec.filler().label().to_string(),
        (spec.filler_fraction() * 100.0).to_string(),
        (spec.matrix_fraction() * 100.0).to_string(),
        spec.cure_temperature_c().to_string(),
        spec.cure_time_h().to_string(),
        spec.pressure_mpa().to_string(),
        spec.particle_size_um().to_string(),
        sample.density_g_cm3().to_string(),
    ];
    row.extend(
        Property::ALL
            .iter()
            .map(|p| sample.properties.get(*p).to_string()),
    );
    row
}

/// Write a dataset to a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_dataset<P: AsRef<Path>>(path: P, dataset: &Dataset) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)?;
    write_dataset_csv(file, dataset)?;
    info!(path = %path.display(), rows = dataset.len(), "exported dataset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::GeneratorConfig;

    fn sample_properties() -> PropertyVector {
        PropertyVector::from_array([58.64, 95.1, 20.0, 118.2, 0.264, 52.3, 3.2e12, 4.1, 0.0213])
    }

    #[test]
    fn test_prediction_csv_layout() {
        let csv = prediction_csv_string(&sample_properties()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), Property::COUNT + 1);
        assert_eq!(lines[0], "Property,Value,Unit");
        assert_eq!(lines[1], "Tensile Strength,58.64,MPa");
        assert!(lines[7].starts_with("Electrical Resistivity,3.20e12,"));
        assert_eq!(lines[9], "Dielectric Loss Factor,0.0213,-");
    }

    #[test]
    fn test_prediction_csv_parses_back() {
        let csv = prediction_csv_string(&sample_properties()).unwrap();
        let mut reader = csv::Reader::from_reader(csv.as_bytes());
        let names: Vec<String> = reader
            .records()
            .map(|r| r.unwrap()[0].to_string())
            .collect();
        let expected: Vec<String> = Property::ALL.iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn test_dataset_csv_shape() {
        let dataset = Dataset::generate(12, GeneratorConfig::default()).unwrap();
        let mut buffer = Vec::new();
        write_dataset_csv(&mut buffer, &dataset).unwrap();

        let mut reader = csv::Reader::from_reader(buffer.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), 18);
        assert_eq!(&headers[0], "Polymer_Matrix");
        let rows: Vec<_> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 12);
        let tensile: f64 = rows[0][9].parse().unwrap();
        assert!((tensile - dataset.samples()[0].properties.tensile_strength_mpa).abs() < 1e-9);
    }

    #[test]
    fn test_export_to_file() {
        let path = std::env::temp_dir().join(format!("polycomp_prediction_{}.csv", std::process::id()));
        export_prediction(&path, &sample_properties()).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Property,Value,Unit"));
        let _ = std::fs::remove_file(&path);
    }
}
