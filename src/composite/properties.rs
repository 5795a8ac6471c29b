//! The nine predicted material properties

use serde::{Deserialize, Serialize};
use std::fmt;

/// Property family, used to group results for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyGroup {
    /// Strength and toughness
    Mechanical,
    /// Transition temperature, conduction, expansion
    Thermal,
    /// Resistivity and dielectric response
    Electrical,
}

impl PropertyGroup {
    /// All groups in display order
    pub const ALL: [Self; 3] = [Self::Mechanical, Self::Thermal, Self::Electrical];

    /// Section title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Mechanical => "Mechanical",
            Self::Thermal => "Thermal",
            Self::Electrical => "Electrical",
        }
    }
}

/// One of the nine predicted properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Property {
    /// Tensile strength (MPa)
    TensileStrength,
    /// Flexural strength (MPa)
    FlexuralStrength,
    /// Notched impact strength (J/m)
    ImpactStrength,
    /// Glass transition temperature (°C)
    GlassTransitionTemp,
    /// Thermal conductivity (W/m·K)
    ThermalConductivity,
    /// Coefficient of thermal expansion (ppm/°C)
    ThermalExpansion,
    /// Volume electrical resistivity (Ω·m)
    ElectricalResistivity,
    /// Relative permittivity at 1 MHz
    DielectricConstant,
    /// Dielectric loss factor (tan δ) at 1 MHz
    DielectricLossFactor,
}

impl Property {
    /// Number of properties in a [`PropertyVector`]
    pub const COUNT: usize = 9;

    /// All properties in canonical (column) order
    pub const ALL: [Self; Self::COUNT] = [
        Self::TensileStrength,
        Self::FlexuralStrength,
        Self::ImpactStrength,
        Self::GlassTransitionTemp,
        Self::ThermalConductivity,
        Self::ThermalExpansion,
        Self::ElectricalResistivity,
        Self::DielectricConstant,
        Self::DielectricLossFactor,
    ];

    /// Position in [`Property::ALL`]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Display name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TensileStrength => "Tensile Strength",
            Self::FlexuralStrength => "Flexural Strength",
            Self::ImpactStrength => "Impact Strength",
            Self::GlassTransitionTemp => "Glass Transition Temperature",
            Self::ThermalConductivity => "Thermal Conductivity",
            Self::ThermalExpansion => "Thermal Expansion",
            Self::ElectricalResistivity => "Electrical Resistivity",
            Self::DielectricConstant => "Dielectric Constant",
            Self::DielectricLossFactor => "Dielectric Loss Factor",
        }
    }

    /// Column name used in datasets, artifacts and reports
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::TensileStrength => "Tensile_Strength_MPa",
            Self::FlexuralStrength => "Flexural_Strength_MPa",
            Self::ImpactStrength => "Impact_Strength_J_m",
            Self::GlassTransitionTemp => "Glass_Transition_Temp_C",
            Self::ThermalConductivity => "Thermal_Conductivity_W_mK",
            Self::ThermalExpansion => "Thermal_Expansion_ppm_C",
            Self::ElectricalResistivity => "Electrical_Resistivity_Ohm_m",
            Self::DielectricConstant => "Dielectric_Constant",
            Self::DielectricLossFactor => "Dielectric_Loss_Factor",
        }
    }

    /// Unit label (`-` for dimensionless)
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::TensileStrength | Self::FlexuralStrength => "MPa",
            Self::ImpactStrength => "J/m",
            Self::GlassTransitionTemp => "°C",
            Self::ThermalConductivity => "W/m·K",
            Self::ThermalExpansion => "ppm/°C",
            Self::ElectricalResistivity => "Ω·m",
            Self::DielectricConstant | Self::DielectricLossFactor => "-",
        }
    }

    /// Display group
    #[must_use]
    pub const fn group(self) -> PropertyGroup {
        match self {
            Self::TensileStrength | Self::FlexuralStrength | Self::ImpactStrength => {
                PropertyGroup::Mechanical
            }
            Self::GlassTransitionTemp | Self::ThermalConductivity | Self::ThermalExpansion => {
                PropertyGroup::Thermal
            }
            Self::ElectricalResistivity | Self::DielectricConstant | Self::DielectricLossFactor => {
                PropertyGroup::Electrical
            }
        }
    }

    /// Whether the model learns this target on a log10 scale
    #[must_use]
    pub const fn log_scaled(self) -> bool {
        matches!(self, Self::ElectricalResistivity)
    }

    /// Format a value with the precision used in result tables
    #[must_use]
    pub fn format_value(self, value: f64) -> String {
        match self {
            Self::ThermalConductivity => format!("{value:.3}"),
            Self::GlassTransitionTemp | Self::ThermalExpansion => format!("{value:.1}"),
            Self::ElectricalResistivity => format!("{value:.2e}"),
            Self::DielectricLossFactor => format!("{value:.4}"),
            _ => format!("{value:.2}"),
        }
    }

    /// Look up a property by column name or display name (case-insensitive)
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = name.trim();
        Self::ALL.into_iter().find(|p| {
            p.column().eq_ignore_ascii_case(wanted) || p.name().eq_ignore_ascii_case(wanted)
        })
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The nine properties of one composite, always produced together.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertyVector {
    /// Tensile strength (MPa)
    pub tensile_strength_mpa: f64,
    /// Flexural strength (MPa)
    pub flexural_strength_mpa: f64,
    /// Impact strength (J/m)
    pub impact_strength_j_m: f64,
    /// Glass transition temperature (°C)
    pub glass_transition_c: f64,
    /// Thermal conductivity (W/m·K)
    pub thermal_conductivity_w_mk: f64,
    /// Thermal expansion coefficient (ppm/°C)
    pub thermal_expansion_ppm_c: f64,
    /// Electrical resistivity (Ω·m)
    pub electrical_resistivity_ohm_m: f64,
    /// Dielectric constant
    pub dielectric_constant: f64,
    /// Dielectric loss factor (tan δ)
    pub dielectric_loss_factor: f64,
}

impl PropertyVector {
    /// Build from values in [`Property::ALL`] order
    #[must_use]
    pub const fn from_array(values: [f64; Property::COUNT]) -> Self {
        Self {
            tensile_strength_mpa: values[0],
            flexural_strength_mpa: values[1],
            impact_strength_j_m: values[2],
            glass_transition_c: values[3],
            thermal_conductivity_w_mk: values[4],
            thermal_expansion_ppm_c: values[5],
            electrical_resistivity_ohm_m: values[6],
            dielectric_constant: values[7],
            dielectric_loss_factor: values[8],
        }
    }

    /// Values in [`Property::ALL`] order
    #[must_use]
    pub const fn to_array(&self) -> [f64; Property::COUNT] {
        [
            self.tensile_strength_mpa,
            self.flexural_strength_mpa,
            self.impact_strength_j_m,
            self.glass_transition_c,
            self.thermal_conductivity_w_mk,
            self.thermal_expansion_ppm_c,
            self.electrical_resistivity_ohm_m,
            self.dielectric_constant,
            self.dielectric_loss_factor,
        ]
    }

    /// Value of a single property
    #[must_use]
    pub const fn get(&self, property: Property) -> f64 {
        self.to_array()[property.index()]
    }

    /// Iterate `(property, value)` pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (Property, f64)> {
        Property::ALL.into_iter().zip(self.to_array())
    }

    /// True when every value is finite
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.to_array().iter().all(|v| v.is_finite())
    }
}
