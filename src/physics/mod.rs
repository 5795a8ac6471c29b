//! Synthetic Property Generator
//!
//! Physics-informed training data for the regression pipeline. Each
//! [`CompositeSpec`] is mapped to a [`PropertyVector`] by closed-form
//! composite mechanics, then perturbed with bounded multiplicative noise to
//! emulate measurement scatter.
//!
//! ```text
//! CompositeSpec ──> volume fraction ──┬─> Halpin-Tsai ─> strength, impact
//!                                     ├─> Maxwell / Turner ─> k, CTE
//!                   degree of cure ───┼─> DiBenedetto ─> Tg
//!                                     ├─> percolation ─> resistivity
//!                                     └─> Lichtenecker ─> ε, tan δ
//!                                           │
//!                                    noise, clip to bounds
//! ```
//!
//! Contract:
//! - Deterministic for a fixed seed and input.
//! - Every output is finite and inside [`physical_bounds`]; values are
//!   clipped, never rejected.
//! - Zero filler reproduces the matrix data sheet
//!   ([`SyntheticGenerator::baseline`]) under any accepted process
//!   conditions. Cure and consolidation shifts grow with filler content.

pub mod constituents;
pub mod cure;
pub mod mixing;

pub use constituents::{FillerData, MatrixData};

use crate::composite::{
    CompositeSpec, FillerType, PolymerMatrix, Property, PropertyVector, CURE_TEMPERATURE_RANGE,
    CURE_TIME_RANGE, FILLER_FRACTION_RANGE, PARTICLE_SIZE_RANGE, PRESSURE_RANGE,
};
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Default relative noise amplitude (±10%)
pub const DEFAULT_NOISE_LEVEL: f64 = 0.10;

/// Default seed for reproducible datasets
pub const DEFAULT_SEED: u64 = 42;

/// Largest accepted noise amplitude
pub const MAX_NOISE_LEVEL: f64 = 0.5;

/// Physically plausible output range for a property.
///
/// Generator outputs are clipped into this range.
#[must_use]
pub const fn physical_bounds(property: Property) -> (f64, f64) {
    match property {
        Property::TensileStrength => (5.0, 200.0),
        Property::FlexuralStrength => (10.0, 300.0),
        Property::ImpactStrength => (1.0, 100.0),
        Property::GlassTransitionTemp => (20.0, 300.0),
        Property::ThermalConductivity => (0.05, 2.0),
        Property::ThermalExpansion => (5.0, 200.0),
        Property::ElectricalResistivity => (1e6, 1e16),
        Property::DielectricConstant => (2.0, 15.0),
        Property::DielectricLossFactor => (0.001, 0.5),
    }
}

/// Generator settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Seed of the generator's noise stream
    pub seed: u64,
    /// Relative noise amplitude; each output is scaled by `1 + U(-a, a)`
    pub noise_level: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            noise_level: DEFAULT_NOISE_LEVEL,
        }
    }
}

/// Intermediate micromechanics quantities, exposed for inspection and tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Micromechanics {
    /// Filler volume fraction
    pub volume_fraction: f64,
    /// Degree of cure
    pub degree_of_cure: f64,
    /// Halpin-Tsai `E_c / E_m`
    pub modulus_ratio: f64,
    /// Percolation threshold (volume fraction)
    pub percolation_threshold: f64,
    /// Composite density (g/cm³)
    pub density_g_cm3: f64,
}

/// Physics-informed property generator with a seeded noise stream.
#[derive(Debug, Clone)]
pub struct SyntheticGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl SyntheticGenerator {
    /// Create a generator.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the noise level is negative,
    /// non-finite or above [`MAX_NOISE_LEVEL`].
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        if !config.noise_level.is_finite()
            || !(0.0..=MAX_NOISE_LEVEL).contains(&config.noise_level)
        {
            return Err(Error::InvalidInput(format!(
                "noise level {} must be within 0..={MAX_NOISE_LEVEL}",
                config.noise_level
            )));
        }
        Ok(Self {
            config,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Generator with default noise and the given seed
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            config: GeneratorConfig {
                seed,
                noise_level: DEFAULT_NOISE_LEVEL,
            },
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator settings
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Pure-matrix data sheet values; what [`evaluate`](Self::evaluate)
    /// returns for zero filler.
    #[must_use]
    pub fn baseline(matrix: PolymerMatrix) -> PropertyVector {
        let m = matrix.data();
        PropertyVector::from_array([
            m.tensile_mpa,
            m.flexural_mpa,
            m.impact_j_m,
            m.tg_c,
            m.conductivity_w_mk,
            m.cte_ppm_c,
            10f64.powf(m.log_resistivity),
            m.dielectric_constant,
            m.loss_factor,
        ])
    }

    /// Intermediate quantities for a spec.
    #[must_use]
    pub fn micromechanics(spec: &CompositeSpec) -> Micromechanics {
        let m = spec.matrix().data();
        let f = spec.filler().data();
        let phi = mixing::volume_fraction(spec.filler_fraction(), f.density_g_cm3, m.density_g_cm3);
        Micromechanics {
            volume_fraction: phi,
            degree_of_cure: cure::degree_of_cure(
                spec.cure_temperature_c(),
                spec.cure_time_h(),
                m.activation_energy_kj_mol,
            ),
            modulus_ratio: mixing::halpin_tsai_ratio(
                f.modulus_gpa,
                m.modulus_gpa,
                2.0 * f.aspect_ratio,
                phi,
            ),
            percolation_threshold: mixing::percolation_threshold(f.aspect_ratio),
            density_g_cm3: mixing::composite_density(
                spec.filler_fraction(),
                f.density_g_cm3,
                m.density_g_cm3,
            ),
        }
    }

    /// Noise-free physics prediction, clipped to [`physical_bounds`].
    #[must_use]
    pub fn evaluate(spec: &CompositeSpec) -> PropertyVector {
        clip(raw_properties(spec))
    }

    /// Noisy sample drawn from this generator's stream.
    ///
    /// Successive calls advance the stream; use
    /// [`generate_with_seed`](Self::generate_with_seed) for a value that
    /// depends only on `(spec, seed)`.
    pub fn generate(&mut self, spec: &CompositeSpec) -> PropertyVector {
        let noise_level = self.config.noise_level;
        perturb(raw_properties(spec), noise_level, &mut self.rng)
    }

    /// Noisy sample from a fresh stream seeded with `seed`.
    #[must_use]
    pub fn generate_with_seed(&self, spec: &CompositeSpec, seed: u64) -> PropertyVector {
        let mut rng = StdRng::seed_from_u64(seed);
        perturb(raw_properties(spec), self.config.noise_level, &mut rng)
    }

    /// Draw a random composite spec uniformly over the accepted input ranges.
    pub fn random_spec<R: Rng + ?Sized>(rng: &mut R) -> CompositeSpec {
        let matrix = PolymerMatrix::ALL[rng.gen_range(0..PolymerMatrix::ALL.len())];
        let filler = FillerType::ALL[rng.gen_range(0..FillerType::ALL.len())];
        CompositeSpec::clamped(
            matrix,
            filler,
            rng.gen_range(FILLER_FRACTION_RANGE),
            rng.gen_range(CURE_TEMPERATURE_RANGE),
            rng.gen_range(CURE_TIME_RANGE),
            rng.gen_range(PRESSURE_RANGE),
            rng.gen_range(PARTICLE_SIZE_RANGE),
        )
    }

    /// Draw a random spec and a noisy property vector from this generator.
    pub fn sample(&mut self) -> (CompositeSpec, PropertyVector) {
        let spec = Self::random_spec(&mut self.rng);
        let properties = self.generate(&spec);
        (spec, properties)
    }
}

/// Unclipped physics values in [`Property::ALL`] order.
fn raw_properties(spec: &CompositeSpec) -> [f64; Property::COUNT] {
    let m = spec.matrix().data();
    let f = spec.filler().data();
    let micro = SyntheticGenerator::micromechanics(spec);
    let phi = micro.volume_fraction;
    let adhesion = f.adhesion;

    // Cure and consolidation defects act through the filler interface:
    // the neat resin keeps its data-sheet values
    let exposure = cure::interface_exposure(spec.filler_fraction());
    let process = exposure.mul_add(
        cure::cure_factor(micro.degree_of_cure) * cure::consolidation_factor(spec.pressure_mpa())
            - 1.0,
        1.0,
    );

    // Finer particles expose more interface: 100 µm is neutral
    let size_factor =
        (0.15 * phi).mul_add(-(spec.particle_size_um() / 100.0).ln() / 5f64.ln(), 1.0);

    let area = mixing::load_bearing_fraction(phi, adhesion);
    let stiffening = micro.modulus_ratio - 1.0;

    let tensile = m.tensile_mpa
        * area
        * (adhesion * 0.25).mul_add(stiffening, 1.0)
        * size_factor
        * process;
    let flexural = m.flexural_mpa
        * area
        * (adhesion * 0.35).mul_add(stiffening, 1.0)
        * size_factor
        * process;

    let particulate_loss = 0.9 * phi.powf(2.0 / 3.0) * 0.5f64.mul_add(-adhesion, 1.0);
    let embrittlement = (1.0 - particulate_loss).max(0.0);
    let toughening = (0.3 * adhesion * phi).mul_add(f.aspect_ratio.ln(), 1.0);
    let impact = m.impact_j_m * embrittlement * toughening * process;

    let mobility_shift = 25.0 * adhesion * phi * (1.0 - (-f.aspect_ratio / 5.0).exp());
    let tg_deficit = m.tg_c - cure::dibenedetto_tg(m.tg_c, micro.degree_of_cure);
    let tg = exposure.mul_add(-tg_deficit, m.tg_c) + mobility_shift;

    let conductivity = mixing::maxwell_garnett(m.conductivity_w_mk, f.conductivity_w_mk, phi);
    let cte = mixing::turner_cte(m.cte_ppm_c, f.cte_ppm_c, m.modulus_gpa, f.modulus_gpa, phi);

    let log_rho = mixing::percolated_log_resistivity(
        m.log_resistivity,
        f.log_resistivity,
        phi,
        micro.percolation_threshold,
    );

    let permittivity = mixing::lichtenecker(m.dielectric_constant, f.dielectric_constant, phi);
    let loss = mixing::rule_of_mixtures(m.loss_factor, f.loss_factor, phi)
        + mixing::interfacial_loss(phi, adhesion);

    [
        tensile,
        flexural,
        impact,
        tg,
        conductivity,
        cte,
        10f64.powf(log_rho),
        permittivity,
        loss,
    ]
}

fn perturb<R: Rng + ?Sized>(
    mut values: [f64; Property::COUNT],
    noise_level: f64,
    rng: &mut R,
) -> PropertyVector {
    if noise_level > 0.0 {
        for value in &mut values {
            let u: f64 = rng.gen_range(-1.0..=1.0);
            *value *= u.mul_add(noise_level, 1.0);
        }
    }
    clip(values)
}

fn clip(mut values: [f64; Property::COUNT]) -> PropertyVector {
    for (property, value) in Property::ALL.iter().zip(values.iter_mut()) {
        let (lo, hi) = physical_bounds(*property);
        let clipped = if value.is_finite() { (*value).clamp(lo, hi) } else { lo };
        if (clipped - *value).abs() > 0.0 {
            trace!(property = property.column(), raw = *value, clipped, "clipped to bounds");
        }
        *value = clipped;
    }
    PropertyVector::from_array(values)
}
