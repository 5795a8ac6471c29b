//! Constituent data sheets
//!
//! Representative room-temperature values for fully cured resins and dry
//! natural fillers, compiled from handbook ranges. They are calibration
//! policy, not measured constants: the generator only needs them to be
//! plausible and mutually consistent.

use crate::composite::{FillerType, PolymerMatrix};

/// Fully cured, void-free resin properties.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatrixData {
    /// Tensile strength (MPa)
    pub tensile_mpa: f64,
    /// Flexural strength (MPa)
    pub flexural_mpa: f64,
    /// Notched impact strength (J/m)
    pub impact_j_m: f64,
    /// Glass transition temperature at full cure (°C)
    pub tg_c: f64,
    /// Thermal conductivity (W/m·K)
    pub conductivity_w_mk: f64,
    /// Thermal expansion (ppm/°C)
    pub cte_ppm_c: f64,
    /// log10 of volume resistivity (Ω·m)
    pub log_resistivity: f64,
    /// Relative permittivity
    pub dielectric_constant: f64,
    /// Loss tangent
    pub loss_factor: f64,
    /// Density (g/cm³)
    pub density_g_cm3: f64,
    /// Young's modulus (GPa)
    pub modulus_gpa: f64,
    /// Apparent cure activation energy (kJ/mol)
    pub activation_energy_kj_mol: f64,
}

/// Dry filler properties and interface behavior.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FillerData {
    /// Density (g/cm³)
    pub density_g_cm3: f64,
    /// Young's modulus (GPa)
    pub modulus_gpa: f64,
    /// Thermal conductivity (W/m·K)
    pub conductivity_w_mk: f64,
    /// Thermal expansion (ppm/°C)
    pub cte_ppm_c: f64,
    /// log10 of volume resistivity (Ω·m), moisture-bearing
    pub log_resistivity: f64,
    /// Relative permittivity
    pub dielectric_constant: f64,
    /// Loss tangent
    pub loss_factor: f64,
    /// Length/diameter ratio of a typical particle
    pub aspect_ratio: f64,
    /// Interfacial adhesion quality, 0 (none) to 1 (perfect bonding)
    pub adhesion: f64,
}

impl PolymerMatrix {
    /// Data sheet for this resin
    #[must_use]
    pub const fn data(self) -> MatrixData {
        match self {
            Self::Epoxy => MatrixData {
                tensile_mpa: 65.0,
                flexural_mpa: 110.0,
                impact_j_m: 25.0,
                tg_c: 120.0,
                conductivity_w_mk: 0.20,
                cte_ppm_c: 60.0,
                log_resistivity: 13.0,
                dielectric_constant: 3.6,
                loss_factor: 0.020,
                density_g_cm3: 1.20,
                modulus_gpa: 3.0,
                activation_energy_kj_mol: 60.0,
            },
            Self::Polyester => MatrixData {
                tensile_mpa: 50.0,
                flexural_mpa: 85.0,
                impact_j_m: 18.0,
                tg_c: 85.0,
                conductivity_w_mk: 0.18,
                cte_ppm_c: 90.0,
                log_resistivity: 12.0,
                dielectric_constant: 3.3,
                loss_factor: 0.015,
                density_g_cm3: 1.25,
                modulus_gpa: 3.2,
                activation_energy_kj_mol: 55.0,
            },
            Self::VinylEster => MatrixData {
                tensile_mpa: 75.0,
                flexural_mpa: 125.0,
                impact_j_m: 22.0,
                tg_c: 110.0,
                conductivity_w_mk: 0.20,
                cte_ppm_c: 65.0,
                log_resistivity: 13.0,
                dielectric_constant: 3.2,
                loss_factor: 0.012,
                density_g_cm3: 1.15,
                modulus_gpa: 3.3,
                activation_energy_kj_mol: 58.0,
            },
            Self::Phenolic => MatrixData {
                tensile_mpa: 45.0,
                flexural_mpa: 80.0,
                impact_j_m: 12.0,
                tg_c: 170.0,
                conductivity_w_mk: 0.25,
                cte_ppm_c: 45.0,
                log_resistivity: 11.0,
                dielectric_constant: 5.0,
                loss_factor: 0.030,
                density_g_cm3: 1.30,
                modulus_gpa: 4.0,
                activation_energy_kj_mol: 75.0,
            },
            Self::Polyurethane => MatrixData {
                tensile_mpa: 40.0,
                flexural_mpa: 60.0,
                impact_j_m: 45.0,
                tg_c: 60.0,
                conductivity_w_mk: 0.22,
                cte_ppm_c: 130.0,
                log_resistivity: 11.0,
                dielectric_constant: 4.5,
                loss_factor: 0.035,
                density_g_cm3: 1.10,
                modulus_gpa: 1.5,
                activation_energy_kj_mol: 50.0,
            },
        }
    }
}

impl FillerType {
    /// Data sheet for this filler
    #[must_use]
    pub const fn data(self) -> FillerData {
        match self {
            Self::BoneParticles => FillerData {
                density_g_cm3: 1.90,
                modulus_gpa: 15.0,
                conductivity_w_mk: 0.50,
                cte_ppm_c: 10.0,
                log_resistivity: 9.0,
                dielectric_constant: 8.0,
                loss_factor: 0.050,
                aspect_ratio: 3.0,
                adhesion: 0.55,
            },
            Self::Hydroxyapatite => FillerData {
                density_g_cm3: 3.16,
                modulus_gpa: 80.0,
                conductivity_w_mk: 1.25,
                cte_ppm_c: 11.0,
                log_resistivity: 10.0,
                dielectric_constant: 10.0,
                loss_factor: 0.030,
                aspect_ratio: 2.0,
                adhesion: 0.45,
            },
            Self::Chitosan => FillerData {
                density_g_cm3: 1.40,
                modulus_gpa: 2.5,
                conductivity_w_mk: 0.25,
                cte_ppm_c: 40.0,
                log_resistivity: 8.0,
                dielectric_constant: 6.0,
                loss_factor: 0.080,
                aspect_ratio: 5.0,
                adhesion: 0.70,
            },
            Self::CelluloseNanocrystals => FillerData {
                density_g_cm3: 1.60,
                modulus_gpa: 140.0,
                conductivity_w_mk: 0.60,
                cte_ppm_c: 8.0,
                log_resistivity: 8.5,
                dielectric_constant: 6.5,
                loss_factor: 0.060,
                aspect_ratio: 25.0,
                adhesion: 0.80,
            },
            Self::Lignin => FillerData {
                density_g_cm3: 1.35,
                modulus_gpa: 3.5,
                conductivity_w_mk: 0.20,
                cte_ppm_c: 40.0,
                log_resistivity: 10.0,
                dielectric_constant: 4.5,
                loss_factor: 0.040,
                aspect_ratio: 1.5,
                adhesion: 0.50,
            },
            Self::Starch => FillerData {
                density_g_cm3: 1.50,
                modulus_gpa: 2.0,
                conductivity_w_mk: 0.22,
                cte_ppm_c: 50.0,
                log_resistivity: 7.5,
                dielectric_constant: 7.0,
                loss_factor: 0.100,
                aspect_ratio: 1.2,
                adhesion: 0.40,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_data_plausible() {
        for matrix in PolymerMatrix::ALL {
            let d = matrix.data();
            assert!(d.tensile_mpa > 0.0 && d.flexural_mpa > d.tensile_mpa, "{matrix}");
            assert!(d.density_g_cm3 > 1.0 && d.density_g_cm3 < 1.5, "{matrix}");
            assert!(d.log_resistivity >= 10.0, "{matrix}");
        }
    }

    #[test]
    fn test_filler_adhesion_in_unit_interval() {
        for filler in FillerType::ALL {
            let d = filler.data();
            assert!(d.adhesion > 0.0 && d.adhesion < 1.0, "{filler}");
            assert!(d.aspect_ratio >= 1.0, "{filler}");
            // Fillers are more conductive than any resin
            assert!(d.log_resistivity < 11.0, "{filler}");
        }
    }
}
