//! Arrow column layout of a dataset
//!
//! | column                  | type    |
//! |-------------------------|---------|
//! | `Polymer_Matrix`        | Utf8    |
//! | `Filler_Type`           | Utf8    |
//! | `Filler_Ratio_wt%`      | Float64 |
//! | `Matrix_Ratio_wt%`      | Float64 |
//! | `Curing_Temperature_C`  | Float64 |
//! | `Curing_Time_hours`     | Float64 |
//! | `Pressure_MPa`          | Float64 |
//! | `Particle_Size_microns` | Float64 |
//! | `Density_g_cm3`         | Float64 |
//! | one per [`Property`]    | Float64 |
//!
//! Mass fractions are stored in percent. `Matrix_Ratio_wt%` and
//! `Density_g_cm3` are derived and ignored on read.

use super::{Dataset, Sample};
use crate::composite::{CompositeSpec, FillerType, PolymerMatrix, Property, PropertyVector};
use crate::{Error, Result};
use arrow::array::{Array, ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

/// Input column names, in feature order
pub const FEATURE_COLUMNS: [&str; 9] = [
    POLYMER_MATRIX,
    FILLER_TYPE,
    FILLER_RATIO,
    MATRIX_RATIO,
    CURING_TEMPERATURE,
    CURING_TIME,
    PRESSURE,
    PARTICLE_SIZE,
    DENSITY,
];

const POLYMER_MATRIX: &str = "Polymer_Matrix";
const FILLER_TYPE: &str = "Filler_Type";
const FILLER_RATIO: &str = "Filler_Ratio_wt%";
const MATRIX_RATIO: &str = "Matrix_Ratio_wt%";
const CURING_TEMPERATURE: &str = "Curing_Temperature_C";
const CURING_TIME: &str = "Curing_Time_hours";
const PRESSURE: &str = "Pressure_MPa";
const PARTICLE_SIZE: &str = "Particle_Size_microns";
const DENSITY: &str = "Density_g_cm3";

/// Schema shared by every dataset batch
#[must_use]
pub fn dataset_schema() -> SchemaRef {
    let mut fields = vec![
        Field::new(POLYMER_MATRIX, DataType::Utf8, false),
        Field::new(FILLER_TYPE, DataType::Utf8, false),
    ];
    fields.extend(
        FEATURE_COLUMNS[2..]
            .iter()
            .map(|name| Field::new(*name, DataType::Float64, false)),
    );
    fields.extend(
        Property::ALL
            .iter()
            .map(|p| Field::new(p.column(), DataType::Float64, false)),
    );
    Arc::new(Schema::new(fields))
}

impl Dataset {
    /// Convert to a single Arrow batch with [`dataset_schema`].
    ///
    /// # Errors
    ///
    /// Returns an Arrow error if the batch cannot be assembled.
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let samples = self.samples();
        let floats = |f: &dyn Fn(&Sample) -> f64| -> ArrayRef {
            Arc::new(Float64Array::from_iter_values(samples.iter().map(f)))
        };

        let mut columns: Vec<ArrayRef> = vec![
            Arc::new(StringArray::from_iter_values(
                samples.iter().map(|s| s.spec.matrix().label()),
            )),
            Arc::new(StringArray::from_iter_values(
                samples.iter().map(|s| s.spec.filler().label()),
            )),
            floats(&|s| s.spec.filler_fraction() * 100.0),
            floats(&|s| s.spec.matrix_fraction() * 100.0),
            floats(&|s| s.spec.cure_temperature_c()),
            floats(&|s| s.spec.cure_time_h()),
            floats(&|s| s.spec.pressure_mpa()),
            floats(&|s| s.spec.particle_size_um()),
            floats(&Sample::density_g_cm3),
        ];
        for property in Property::ALL {
            columns.push(floats(&|s| s.properties.get(property)));
        }

        Ok(RecordBatch::try_new(dataset_schema(), columns)?)
    }

    /// Rebuild a dataset from batches with the dataset columns.
    ///
    /// Columns are looked up by name, so extra columns are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StorageError`] for missing or mistyped columns and
    /// nulls, and [`Error::InvalidInput`] for unknown labels or
    /// out-of-range values.
    pub fn from_record_batches(batches: &[RecordBatch]) -> Result<Self> {
        let mut samples = Vec::new();
        for batch in batches {
            samples.extend(samples_from_batch(batch)?);
        }
        Ok(Self::new(samples))
    }
}

fn samples_from_batch(batch: &RecordBatch) -> Result<Vec<Sample>> {
    let matrix = string_column(batch, POLYMER_MATRIX)?;
    let filler = string_column(batch, FILLER_TYPE)?;
    let filler_ratio = float_column(batch, FILLER_RATIO)?;
    let temperature = float_column(batch, CURING_TEMPERATURE)?;
    let time = float_column(batch, CURING_TIME)?;
    let pressure = float_column(batch, PRESSURE)?;
    let particle_size = float_column(batch, PARTICLE_SIZE)?;
    let targets = Property::ALL
        .iter()
        .map(|p| float_column(batch, p.column()))
        .collect::<Result<Vec<_>>>()?;

    (0..batch.num_rows())
        .map(|row| {
            let spec = CompositeSpec::builder(
                matrix.value(row).parse::<PolymerMatrix>()?,
                filler.value(row).parse::<FillerType>()?,
            )
            .filler_fraction(filler_ratio.value(row) / 100.0)
            .cure_temperature_c(temperature.value(row))
            .cure_time_h(time.value(row))
            .pressure_mpa(pressure.value(row))
            .particle_size_um(particle_size.value(row))
            .build()?;

            let mut values = [0.0; Property::COUNT];
            for (value, column) in values.iter_mut().zip(&targets) {
                *value = column.value(row);
            }
            Ok(Sample {
                spec,
                properties: PropertyVector::from_array(values),
            })
        })
        .collect()
}

fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    let array = batch
        .column_by_name(name)
        .ok_or_else(|| Error::StorageError(format!("missing column {name}")))?;
    if array.null_count() > 0 {
        return Err(Error::StorageError(format!("column {name} contains nulls")));
    }
    Ok(array)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    column(batch, name)?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| Error::StorageError(format!("column {name} is not Utf8")))
}

fn float_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    column(batch, name)?
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| Error::StorageError(format!("column {name} is not Float64")))
}
