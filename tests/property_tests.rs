//! Property-based tests for polycomp
//!
//! - Generator invariants: bounds, determinism, noise envelope, neat-resin baseline
//! - Input validation: every accepted spec is inside the documented ranges
//! - Model invariants: predictions stay inside the training target range
//! - Run with ProptestConfig::with_cases(64)

use polycomp::composite::{
    CompositeSpec, FillerType, PolymerMatrix, Property, CURE_TEMPERATURE_RANGE, CURE_TIME_RANGE,
    PARTICLE_SIZE_RANGE, PRESSURE_RANGE,
};
use polycomp::model::{ForestParams, RandomForest, StandardScaler};
use polycomp::physics::{physical_bounds, GeneratorConfig, SyntheticGenerator};
use polycomp::predictor::PredictionRequest;
use polycomp::training::r2_score;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_matrix() -> impl Strategy<Value = PolymerMatrix> {
    prop::sample::select(PolymerMatrix::ALL.to_vec())
}

fn arb_filler() -> impl Strategy<Value = FillerType> {
    prop::sample::select(FillerType::ALL.to_vec())
}

/// Any spec inside the accepted input ranges
fn arb_spec() -> impl Strategy<Value = CompositeSpec> {
    (
        arb_matrix(),
        arb_filler(),
        0.0f64..=0.5,
        CURE_TEMPERATURE_RANGE,
        CURE_TIME_RANGE,
        PRESSURE_RANGE,
        PARTICLE_SIZE_RANGE,
    )
        .prop_map(|(matrix, filler, fraction, temp, time, pressure, size)| {
            CompositeSpec::builder(matrix, filler)
                .filler_fraction(fraction)
                .cure_temperature_c(temp)
                .cure_time_h(time)
                .pressure_mpa(pressure)
                .particle_size_um(size)
                .build()
                .unwrap()
        })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: every generated value is finite and inside its physical bounds
    #[test]
    fn prop_generated_values_within_bounds(
        spec in arb_spec(),
        seed in any::<u64>(),
        noise_level in 0.0f64..=0.5
    ) {
        let generator = SyntheticGenerator::new(GeneratorConfig { seed, noise_level }).unwrap();
        let properties = generator.generate_with_seed(&spec, seed);
        for (property, value) in properties.iter() {
            let (lo, hi) = physical_bounds(property);
            prop_assert!(value.is_finite());
            prop_assert!(value >= lo && value <= hi, "{} = {} outside {}..={}", property, value, lo, hi);
        }
    }

    /// Property: same seed and spec give the same vector
    #[test]
    fn prop_generation_deterministic(spec in arb_spec(), seed in any::<u64>()) {
        let generator = SyntheticGenerator::with_seed(seed);
        prop_assert_eq!(
            generator.generate_with_seed(&spec, seed),
            generator.generate_with_seed(&spec, seed)
        );
    }

    /// Property: zero noise reproduces the physics value exactly
    #[test]
    fn prop_zero_noise_is_evaluate(spec in arb_spec(), seed in any::<u64>()) {
        let generator = SyntheticGenerator::new(GeneratorConfig { seed, noise_level: 0.0 }).unwrap();
        prop_assert_eq!(generator.generate_with_seed(&spec, seed), SyntheticGenerator::evaluate(&spec));
    }

    /// Property: zero filler reproduces the matrix baseline under any
    /// accepted process conditions
    #[test]
    fn prop_zero_filler_is_baseline(
        matrix in arb_matrix(),
        filler in arb_filler(),
        temperature in CURE_TEMPERATURE_RANGE,
        time in CURE_TIME_RANGE,
        pressure in PRESSURE_RANGE,
        size in PARTICLE_SIZE_RANGE
    ) {
        let spec = CompositeSpec::builder(matrix, filler)
            .filler_fraction(0.0)
            .cure_temperature_c(temperature)
            .cure_time_h(time)
            .pressure_mpa(pressure)
            .particle_size_um(size)
            .build()
            .unwrap();
        let got = SyntheticGenerator::evaluate(&spec).to_array();
        let want = SyntheticGenerator::baseline(matrix).to_array();
        for (g, w) in got.iter().zip(want.iter()) {
            prop_assert!((g - w).abs() / w < 1e-6, "{}: {} vs {}", matrix, g, w);
        }
    }

    /// Property: filler content above 50 % never passes validation
    #[test]
    fn prop_excess_filler_rejected(percent in 50.0001f64..1000.0) {
        let request = PredictionRequest::default().filler_percent(percent);
        prop_assert!(request.validate().is_err());
    }

    /// Property: accepted requests map percent to fraction exactly
    #[test]
    fn prop_accepted_percent_maps_to_fraction(percent in 0.0f64..=50.0) {
        let spec = PredictionRequest::default().filler_percent(percent).validate().unwrap();
        prop_assert!((spec.filler_fraction() - percent / 100.0).abs() < 1e-12);
        prop_assert!((spec.matrix_fraction() + spec.filler_fraction() - 1.0).abs() < 1e-12);
    }

    /// Property: scaled training columns have zero mean
    #[test]
    fn prop_scaler_centers_columns(
        rows in proptest::collection::vec(proptest::collection::vec(-100.0f64..100.0, 3), 2..40)
    ) {
        let scaler = StandardScaler::fit(&rows).unwrap();
        let scaled = scaler.transform(&rows).unwrap();
        for j in 0..3 {
            let mean: f64 = scaled.iter().map(|r| r[j]).sum::<f64>() / scaled.len() as f64;
            prop_assert!(mean.abs() < 1e-6, "column {} mean {}", j, mean);
        }
    }

    /// Property: forest predictions are averages of leaf means, so they stay
    /// inside the range of the training targets
    #[test]
    fn prop_forest_prediction_within_target_range(
        y in proptest::collection::vec(-50.0f64..50.0, 12..40),
        query in -3.0f64..3.0
    ) {
        let x: Vec<Vec<f64>> = (0..y.len()).map(|i| vec![i as f64 / y.len() as f64]).collect();
        let params = ForestParams { n_estimators: 5, ..ForestParams::default() };
        let forest = RandomForest::fit(&x, &y, &params).unwrap();
        let lo = y.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = y.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let prediction = forest.predict_row(&[query]);
        prop_assert!(prediction >= lo - 1e-9 && prediction <= hi + 1e-9);
    }

    /// Property: perfect predictions score R² = 1
    #[test]
    fn prop_r2_of_identity_is_one(y in proptest::collection::vec(-10.0f64..10.0, 1..30)) {
        prop_assert!((r2_score(&y, &y) - 1.0).abs() < 1e-12);
    }
}

#[test]
fn test_resistivity_bounds_positive() {
    let (lo, _) = physical_bounds(Property::ElectricalResistivity);
    assert!(lo > 0.0);
}
