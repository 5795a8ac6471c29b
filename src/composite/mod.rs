//! Composite data model
//!
//! A [`CompositeSpec`] describes one formulation: which polymer matrix, which
//! natural filler, how much of it, and how the part was cured. It is validated
//! on construction and immutable afterwards, so anything holding a
//! `CompositeSpec` may assume every documented range holds.
//!
//! ```rust
//! use polycomp::composite::{CompositeSpec, FillerType, PolymerMatrix};
//!
//! let spec = CompositeSpec::builder(PolymerMatrix::Epoxy, FillerType::Hydroxyapatite)
//!     .filler_fraction(0.20)
//!     .cure_temperature_c(120.0)
//!     .cure_time_h(2.0)
//!     .pressure_mpa(1.0)
//!     .build()?;
//!
//! assert!((spec.matrix_fraction() - 0.80).abs() < 1e-12);
//! # Ok::<(), polycomp::Error>(())
//! ```

mod properties;

pub use properties::{Property, PropertyGroup, PropertyVector};

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Maximum filler mass fraction accepted anywhere in the pipeline
pub const MAX_FILLER_FRACTION: f64 = 0.5;

/// Accepted filler mass fraction
pub const FILLER_FRACTION_RANGE: RangeInclusive<f64> = 0.0..=MAX_FILLER_FRACTION;

/// Accepted cure temperature (°C)
pub const CURE_TEMPERATURE_RANGE: RangeInclusive<f64> = 60.0..=180.0;

/// Accepted cure time (hours)
pub const CURE_TIME_RANGE: RangeInclusive<f64> = 2.0..=24.0;

/// Accepted consolidation pressure (MPa)
pub const PRESSURE_RANGE: RangeInclusive<f64> = 0.1..=10.0;

/// Accepted filler particle size (µm)
pub const PARTICLE_SIZE_RANGE: RangeInclusive<f64> = 10.0..=500.0;

/// Particle size assumed when none is given (µm)
pub const DEFAULT_PARTICLE_SIZE_UM: f64 = 100.0;

/// Polymer matrix resins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PolymerMatrix {
    /// Bisphenol-A epoxy
    Epoxy,
    /// Unsaturated polyester
    Polyester,
    /// Vinyl ester
    VinylEster,
    /// Phenol-formaldehyde
    Phenolic,
    /// Thermoset polyurethane
    Polyurethane,
}

impl PolymerMatrix {
    /// All matrices, in declaration order
    pub const ALL: [Self; 5] = [
        Self::Epoxy,
        Self::Polyester,
        Self::VinylEster,
        Self::Phenolic,
        Self::Polyurethane,
    ];

    /// Human-readable label, also used as the encoder category
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Epoxy => "Epoxy",
            Self::Polyester => "Polyester",
            Self::VinylEster => "Vinyl Ester",
            Self::Phenolic => "Phenolic",
            Self::Polyurethane => "Polyurethane",
        }
    }
}

/// Natural (biogenic) fillers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FillerType {
    /// Bovine bone particles
    BoneParticles,
    /// Hydroxyapatite
    Hydroxyapatite,
    /// Chitosan particles
    Chitosan,
    /// Cellulose nanocrystals
    CelluloseNanocrystals,
    /// Lignin
    Lignin,
    /// Starch
    Starch,
}

impl FillerType {
    /// All fillers, in declaration order
    pub const ALL: [Self; 6] = [
        Self::BoneParticles,
        Self::Hydroxyapatite,
        Self::Chitosan,
        Self::CelluloseNanocrystals,
        Self::Lignin,
        Self::Starch,
    ];

    /// Human-readable label, also used as the encoder category
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::BoneParticles => "Bone particles",
            Self::Hydroxyapatite => "Hydroxyapatite",
            Self::Chitosan => "Chitosan",
            Self::CelluloseNanocrystals => "Cellulose nanocrystals",
            Self::Lignin => "Lignin",
            Self::Starch => "Starch",
        }
    }
}

impl fmt::Display for PolymerMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for FillerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalize a user-typed label: lowercase, `_`/`-` treated as spaces,
/// whitespace collapsed.
fn normalize_label(s: &str) -> String {
    s.split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

impl FromStr for PolymerMatrix {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize_label(s);
        Self::ALL
            .into_iter()
            .find(|m| normalize_label(m.label()) == wanted)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "unknown polymer matrix '{s}' (expected one of: {})",
                    Self::ALL.map(Self::label).join(", ")
                ))
            })
    }
}

impl FromStr for FillerType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize_label(s);
        // "Bone" and "Chitosan particles" are accepted shorthands
        let wanted = match wanted.as_str() {
            "bone" | "bovine bone particles" => "bone particles".to_string(),
            "chitosan particles" => "chitosan".to_string(),
            "cnc" => "cellulose nanocrystals".to_string(),
            _ => wanted,
        };
        Self::ALL
            .into_iter()
            .find(|f| normalize_label(f.label()) == wanted)
            .ok_or_else(|| {
                Error::InvalidInput(format!(
                    "unknown filler type '{s}' (expected one of: {})",
                    Self::ALL.map(Self::label).join(", ")
                ))
            })
    }
}

/// One composite formulation and its processing conditions.
///
/// Immutable: fields are private and only reachable through validated
/// constructors. Deserialization goes through the same validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCompositeSpec")]
pub struct CompositeSpec {
    matrix: PolymerMatrix,
    filler: FillerType,
    filler_fraction: f64,
    cure_temperature_c: f64,
    cure_time_h: f64,
    pressure_mpa: f64,
    particle_size_um: f64,
}

impl CompositeSpec {
    /// Create a validated spec with the default particle size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if any value is non-finite or outside
    /// its documented range.
    pub fn new(
        matrix: PolymerMatrix,
        filler: FillerType,
        filler_fraction: f64,
        cure_temperature_c: f64,
        cure_time_h: f64,
        pressure_mpa: f64,
    ) -> Result<Self> {
        Self::builder(matrix, filler)
            .filler_fraction(filler_fraction)
            .cure_temperature_c(cure_temperature_c)
            .cure_time_h(cure_time_h)
            .pressure_mpa(pressure_mpa)
            .build()
    }

    /// Create a builder with reference processing conditions
    /// (25 wt% filler, 120 °C, 8 h, 2 MPa, 100 µm).
    #[must_use]
    pub const fn builder(matrix: PolymerMatrix, filler: FillerType) -> CompositeSpecBuilder {
        CompositeSpecBuilder::new(matrix, filler)
    }

    /// Polymer matrix
    #[must_use]
    pub const fn matrix(&self) -> PolymerMatrix {
        self.matrix
    }

    /// Filler type
    #[must_use]
    pub const fn filler(&self) -> FillerType {
        self.filler
    }

    /// Filler mass fraction (0–0.5)
    #[must_use]
    pub const fn filler_fraction(&self) -> f64 {
        self.filler_fraction
    }

    /// Matrix mass fraction (`1 - filler_fraction`)
    #[must_use]
    pub fn matrix_fraction(&self) -> f64 {
        1.0 - self.filler_fraction
    }

    /// Cure temperature (°C)
    #[must_use]
    pub const fn cure_temperature_c(&self) -> f64 {
        self.cure_temperature_c
    }

    /// Cure time (hours)
    #[must_use]
    pub const fn cure_time_h(&self) -> f64 {
        self.cure_time_h
    }

    /// Consolidation pressure (MPa)
    #[must_use]
    pub const fn pressure_mpa(&self) -> f64 {
        self.pressure_mpa
    }

    /// Filler particle size (µm)
    #[must_use]
    pub const fn particle_size_um(&self) -> f64 {
        self.particle_size_um
    }

    /// Same formulation with a different filler fraction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the fraction is out of range.
    pub fn with_filler_fraction(&self, filler_fraction: f64) -> Result<Self> {
        let next = Self {
            filler_fraction,
            ..*self
        };
        next.validate()?;
        Ok(next)
    }

    /// Construct from sampled values, clamping each into its accepted range.
    pub(crate) fn clamped(
        matrix: PolymerMatrix,
        filler: FillerType,
        filler_fraction: f64,
        cure_temperature_c: f64,
        cure_time_h: f64,
        pressure_mpa: f64,
        particle_size_um: f64,
    ) -> Self {
        let clamp = |value: f64, range: &RangeInclusive<f64>| value.clamp(*range.start(), *range.end());
        Self {
            matrix,
            filler,
            filler_fraction: clamp(filler_fraction, &FILLER_FRACTION_RANGE),
            cure_temperature_c: clamp(cure_temperature_c, &CURE_TEMPERATURE_RANGE),
            cure_time_h: clamp(cure_time_h, &CURE_TIME_RANGE),
            pressure_mpa: clamp(pressure_mpa, &PRESSURE_RANGE),
            particle_size_um: clamp(particle_size_um, &PARTICLE_SIZE_RANGE),
        }
    }

    fn validate(&self) -> Result<()> {
        check_range("filler fraction", self.filler_fraction, &FILLER_FRACTION_RANGE, "")?;
        check_range("cure temperature", self.cure_temperature_c, &CURE_TEMPERATURE_RANGE, " °C")?;
        check_range("cure time", self.cure_time_h, &CURE_TIME_RANGE, " h")?;
        check_range("pressure", self.pressure_mpa, &PRESSURE_RANGE, " MPa")?;
        check_range("particle size", self.particle_size_um, &PARTICLE_SIZE_RANGE, " µm")?;
        Ok(())
    }
}

/// Unvalidated wire form of [`CompositeSpec`]
#[derive(Deserialize)]
struct RawCompositeSpec {
    matrix: PolymerMatrix,
    filler: FillerType,
    filler_fraction: f64,
    cure_temperature_c: f64,
    cure_time_h: f64,
    pressure_mpa: f64,
    #[serde(default = "default_particle_size")]
    particle_size_um: f64,
}

const fn default_particle_size() -> f64 {
    DEFAULT_PARTICLE_SIZE_UM
}

impl TryFrom<RawCompositeSpec> for CompositeSpec {
    type Error = Error;

    fn try_from(raw: RawCompositeSpec) -> Result<Self> {
        Self::builder(raw.matrix, raw.filler)
            .filler_fraction(raw.filler_fraction)
            .cure_temperature_c(raw.cure_temperature_c)
            .cure_time_h(raw.cure_time_h)
            .pressure_mpa(raw.pressure_mpa)
            .particle_size_um(raw.particle_size_um)
            .build()
    }
}

fn check_range(name: &str, value: f64, range: &RangeInclusive<f64>, unit: &str) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::InvalidInput(format!("{name} must be a finite number")));
    }
    if !range.contains(&value) {
        return Err(Error::InvalidInput(format!(
            "{name} {value}{unit} is outside the accepted range {}{unit}..={}{unit}",
            range.start(),
            range.end()
        )));
    }
    Ok(())
}

/// Builder for `CompositeSpec`.
#[derive(Debug, Clone, Copy)]
pub struct CompositeSpecBuilder {
    spec: CompositeSpec,
}

impl CompositeSpecBuilder {
    /// Create a new builder with reference processing conditions.
    #[must_use]
    pub const fn new(matrix: PolymerMatrix, filler: FillerType) -> Self {
        Self {
            spec: CompositeSpec {
                matrix,
                filler,
                filler_fraction: 0.25,
                cure_temperature_c: 120.0,
                cure_time_h: 8.0,
                pressure_mpa: 2.0,
                particle_size_um: DEFAULT_PARTICLE_SIZE_UM,
            },
        }
    }

    /// Set the filler mass fraction (0–0.5).
    #[must_use]
    pub const fn filler_fraction(mut self, fraction: f64) -> Self {
        self.spec.filler_fraction = fraction;
        self
    }

    /// Set the cure temperature (°C).
    #[must_use]
    pub const fn cure_temperature_c(mut self, celsius: f64) -> Self {
        self.spec.cure_temperature_c = celsius;
        self
    }

    /// Set the cure time (hours).
    #[must_use]
    pub const fn cure_time_h(mut self, hours: f64) -> Self {
        self.spec.cure_time_h = hours;
        self
    }

    /// Set the consolidation pressure (MPa).
    #[must_use]
    pub const fn pressure_mpa(mut self, mpa: f64) -> Self {
        self.spec.pressure_mpa = mpa;
        self
    }

    /// Set the filler particle size (µm).
    #[must_use]
    pub const fn particle_size_um(mut self, microns: f64) -> Self {
        self.spec.particle_size_um = microns;
        self
    }

    /// Validate and build the `CompositeSpec`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] naming the first out-of-range value.
    pub fn build(self) -> Result<CompositeSpec> {
        self.spec.validate()?;
        Ok(self.spec)
    }
}
