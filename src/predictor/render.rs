//! Plain-text tables for the terminal

use super::Prediction;
use crate::composite::{Property, PropertyGroup};
use crate::dataset::DatasetSummary;
use std::fmt::Write;

const BAR_WIDTH: usize = 30;

/// Predicted properties grouped into Mechanical, Thermal and Electrical
/// sections, preceded by the input composition.
#[must_use]
pub fn render_prediction(prediction: &Prediction) -> String {
    let spec = &prediction.spec;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} + {} ({:.1} wt% filler, {:.1} wt% matrix)",
        spec.matrix(),
        spec.filler(),
        spec.filler_fraction() * 100.0,
        spec.matrix_fraction() * 100.0
    );
    let _ = writeln!(
        out,
        "cured {:.0} °C for {:.1} h at {:.1} MPa, particles {:.0} µm",
        spec.cure_temperature_c(),
        spec.cure_time_h(),
        spec.pressure_mpa(),
        spec.particle_size_um()
    );

    let name_width = Property::ALL
        .iter()
        .map(|p| p.name().chars().count())
        .max()
        .unwrap_or(0);
    for group in PropertyGroup::ALL {
        let _ = writeln!(out, "\n{}", group.title());
        for property in Property::ALL.iter().filter(|p| p.group() == group) {
            let value = property.format_value(prediction.properties.get(*property));
            let _ = writeln!(
                out,
                "  {:<name_width$}  {:>12}  {}",
                property.name(),
                value,
                property.unit()
            );
        }
    }
    out
}

/// Ranked importances for one property with a horizontal bar per feature.
#[must_use]
pub fn render_importances(property: Property, ranked: &[(String, f64)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Feature importance for {}", property.name());
    let width = ranked.iter().map(|(f, _)| f.chars().count()).max().unwrap_or(0);
    let top = ranked.iter().map(|(_, w)| *w).fold(0.0_f64, f64::max);
    for (feature, weight) in ranked {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let bar = if top > 0.0 {
            ((weight / top) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let _ = writeln!(
            out,
            "  {feature:<width$}  {weight:>6.4}  {}",
            "█".repeat(bar)
        );
    }
    out
}

/// Two-column `Parameter | Value` table under `title`.
#[must_use]
pub fn render_key_values(title: &str, rows: &[(String, String)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    for (key, value) in rows {
        let _ = writeln!(out, "  {key:<width$}  {value}");
    }
    out
}

/// Category counts and per-property statistics of a dataset.
#[must_use]
pub fn render_dataset_summary(summary: &DatasetSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total samples: {}", summary.n_samples);

    let _ = writeln!(out, "\nPolymer matrix");
    for (label, count) in &summary.matrix_counts {
        let _ = writeln!(out, "  {label:<24}{count:>6}");
    }
    let _ = writeln!(out, "\nFiller type");
    for (label, count) in &summary.filler_counts {
        let _ = writeln!(out, "  {label:<24}{count:>6}");
    }

    let _ = writeln!(
        out,
        "\n  {:<30}{:>12}{:>12}{:>12}{:>12}",
        "Property", "min", "max", "mean", "std"
    );
    for property in Property::ALL {
        if let Some(stats) = summary.properties.get(property.column()) {
            let _ = writeln!(
                out,
                "  {:<30}{:>12}{:>12}{:>12}{:>12}",
                property.column(),
                property.format_value(stats.min),
                property.format_value(stats.max),
                property.format_value(stats.mean),
                property.format_value(stats.std)
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::{CompositeSpec, FillerType, PolymerMatrix, PropertyVector};
    use crate::dataset::Dataset;
    use crate::physics::GeneratorConfig;

    fn prediction() -> Prediction {
        let spec = CompositeSpec::builder(PolymerMatrix::Epoxy, FillerType::Hydroxyapatite)
            .build()
            .unwrap();
        Prediction {
            spec,
            properties: PropertyVector::from_array([
                58.64, 90.0, 20.0, 130.0, 0.35, 45.0, 3.2e12, 4.1, 0.02,
            ]),
        }
    }

    #[test]
    fn test_prediction_grouped() {
        let text = render_prediction(&prediction());
        let mech = text.find("Mechanical").unwrap();
        let thermal = text.find("Thermal\n").unwrap();
        let elec = text.find("Electrical\n").unwrap();
        assert!(mech < thermal && thermal < elec);
        assert!(text.contains("58.64"));
        assert!(text.contains("3.20e12"));
        assert!(text.contains("Epoxy + Hydroxyapatite"));
    }

    #[test]
    fn test_importance_bars_scale_to_top() {
        let ranked = vec![
            ("Filler_Ratio_wt%".to_string(), 0.6),
            ("Pressure_MPa".to_string(), 0.3),
        ];
        let text = render_importances(Property::TensileStrength, &ranked);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[2].matches('█').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_key_values_aligned() {
        let rows = vec![
            ("Max Depth".to_string(), "15".to_string()),
            ("Number of Estimators".to_string(), "100".to_string()),
        ];
        let text = render_key_values("Model Details", &rows);
        assert!(text.starts_with("Model Details\n"));
        assert!(text.contains("  Max Depth             15"));
    }

    #[test]
    fn test_dataset_summary_lists_every_property() {
        let dataset = Dataset::generate(40, GeneratorConfig::default()).unwrap();
        let text = render_dataset_summary(&dataset.summary());
        assert!(text.contains("Total samples: 40"));
        for property in Property::ALL {
            assert!(text.contains(property.column()));
        }
    }
}
