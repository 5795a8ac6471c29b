//! Cure kinetics and processing factors
//!
//! First-order Arrhenius conversion referenced to 120 °C:
//!
//! ```text
//! k(T) = k_ref · exp(-Ea/R · (1/T − 1/T_ref))
//! α(T, t) = 1 − exp(−k(T) · t)
//! ```

use crate::composite::MAX_FILLER_FRACTION;

/// Gas constant (J/mol·K)
pub const GAS_CONSTANT: f64 = 8.314;

/// Reference cure temperature (K), 120 °C
pub const REFERENCE_TEMPERATURE_K: f64 = 393.15;

/// Rate constant at the reference temperature (1/h)
pub const REFERENCE_RATE_PER_HOUR: f64 = 1.5;

/// DiBenedetto λ (ratio of heat capacity jumps)
pub const DIBENEDETTO_LAMBDA: f64 = 0.4;

/// Tg depression of the uncured resin relative to full cure (°C)
pub const UNCURED_TG_OFFSET_C: f64 = 100.0;

/// Pressure at and above which the laminate is considered void-free (MPa)
pub const CONSOLIDATION_PRESSURE_MPA: f64 = 1.0;

/// Degree of cure α ∈ [0, 1).
#[must_use]
pub fn degree_of_cure(temperature_c: f64, time_h: f64, activation_energy_kj_mol: f64) -> f64 {
    let temperature_k = temperature_c + 273.15;
    let exponent = -(activation_energy_kj_mol * 1000.0 / GAS_CONSTANT)
        * (1.0 / temperature_k - 1.0 / REFERENCE_TEMPERATURE_K);
    let rate = REFERENCE_RATE_PER_HOUR * exponent.exp();
    (1.0 - (-rate * time_h).exp()).clamp(0.0, 1.0)
}

/// DiBenedetto glass transition at degree of cure `alpha`.
#[must_use]
pub fn dibenedetto_tg(tg_full_cure_c: f64, alpha: f64) -> f64 {
    let tg0 = tg_full_cure_c - UNCURED_TG_OFFSET_C;
    let lambda = DIBENEDETTO_LAMBDA;
    let fraction = lambda * alpha / (1.0 - (1.0 - lambda) * alpha);
    (tg_full_cure_c - tg0).mul_add(fraction, tg0)
}

/// Strength retention from incomplete cure: 0.85 uncured, 1.0 fully cured.
#[must_use]
pub fn cure_factor(alpha: f64) -> f64 {
    0.15f64.mul_add(alpha, 0.85)
}

/// Share of the full cure and consolidation shift felt at a filler mass
/// fraction: 0 for neat resin, 1 at the maximum loading.
#[must_use]
pub fn interface_exposure(filler_fraction: f64) -> f64 {
    (filler_fraction / MAX_FILLER_FRACTION).clamp(0.0, 1.0)
}

/// Void penalty for under-consolidated parts; 1.0 at or above 1 MPa.
#[must_use]
pub fn consolidation_factor(pressure_mpa: f64) -> f64 {
    if pressure_mpa >= CONSOLIDATION_PRESSURE_MPA {
        1.0
    } else {
        0.03f64.mul_add((pressure_mpa / CONSOLIDATION_PRESSURE_MPA).ln(), 1.0)
    }
}
