//! Composite mixing laws
//!
//! Closed-form micromechanics used by the synthetic generator. Every function
//! reduces to the matrix value at zero filler volume fraction.
//!
//! References:
//! - Halpin & Kardos (1976): The Halpin-Tsai equations: a review
//! - Nicolais & Narkis (1971): Stress-strain behavior of filled polymers
//! - Turner (1946): Thermal expansion stresses in reinforced plastics
//! - Kirkpatrick (1973): Percolation and conduction

/// Random close packing of spheres; filler volume cannot exceed it.
pub const MAX_PACKING_FRACTION: f64 = 0.64;

/// Universal conductivity exponent for 3D percolation
pub const PERCOLATION_EXPONENT: f64 = 2.0;

/// Convert a filler mass fraction to a volume fraction.
///
/// Clamped to [`MAX_PACKING_FRACTION`].
#[must_use]
pub fn volume_fraction(mass_fraction: f64, filler_density: f64, matrix_density: f64) -> f64 {
    if mass_fraction <= 0.0 {
        return 0.0;
    }
    let filler_volume = mass_fraction / filler_density;
    let matrix_volume = (1.0 - mass_fraction) / matrix_density;
    (filler_volume / (filler_volume + matrix_volume)).min(MAX_PACKING_FRACTION)
}

/// Composite density by the inverse rule of mixtures on mass fractions.
#[must_use]
pub fn composite_density(mass_fraction: f64, filler_density: f64, matrix_density: f64) -> f64 {
    1.0 / (mass_fraction / filler_density + (1.0 - mass_fraction) / matrix_density)
}

/// Linear rule of mixtures.
#[must_use]
pub fn rule_of_mixtures(matrix: f64, filler: f64, phi: f64) -> f64 {
    matrix.mul_add(1.0 - phi, filler * phi)
}

/// Halpin-Tsai modulus ratio `E_c / E_m`.
///
/// `xi` is the shape factor (2·aspect ratio for aligned short fibers,
/// 2 for spheres).
#[must_use]
pub fn halpin_tsai_ratio(filler_modulus: f64, matrix_modulus: f64, xi: f64, phi: f64) -> f64 {
    let ratio = filler_modulus / matrix_modulus;
    let eta = (ratio - 1.0) / (ratio + xi);
    (1.0 + xi * eta * phi) / (1.0 - eta * phi)
}

/// Nicolais–Narkis effective load-bearing area, softened by adhesion.
///
/// Perfect adhesion keeps the full matrix cross-section; no adhesion removes
/// `1.21·φ^(2/3)` of it.
#[must_use]
pub fn load_bearing_fraction(phi: f64, adhesion: f64) -> f64 {
    (1.0 - 1.21 * phi.powf(2.0 / 3.0) * (1.0 - adhesion)).max(0.0)
}

/// Maxwell–Garnett effective conductivity for dispersed particles.
#[must_use]
pub fn maxwell_garnett(matrix: f64, filler: f64, phi: f64) -> f64 {
    let delta = filler - matrix;
    matrix * (2.0 * phi).mul_add(delta, filler + 2.0 * matrix) / (filler + 2.0 * matrix - phi * delta)
}

/// Turner's modulus-weighted thermal expansion.
#[must_use]
pub fn turner_cte(
    matrix_cte: f64,
    filler_cte: f64,
    matrix_modulus: f64,
    filler_modulus: f64,
    phi: f64,
) -> f64 {
    let matrix_weight = (1.0 - phi) * matrix_modulus;
    let filler_weight = phi * filler_modulus;
    matrix_cte.mul_add(matrix_weight, filler_cte * filler_weight) / (matrix_weight + filler_weight)
}

/// Lichtenecker logarithmic mixing (permittivity).
#[must_use]
pub fn lichtenecker(matrix: f64, filler: f64, phi: f64) -> f64 {
    rule_of_mixtures(matrix.ln(), filler.ln(), phi).exp()
}

/// Percolation threshold estimate from particle aspect ratio.
///
/// Elongated particles connect at lower loadings (excluded-volume argument).
#[must_use]
pub fn percolation_threshold(aspect_ratio: f64) -> f64 {
    (0.30 / aspect_ratio.sqrt()).clamp(0.05, 0.35)
}

/// log10 resistivity across the percolation transition.
///
/// Below the threshold the composite conducts like the matrix with a
/// dilute-filler correction; above it conductivity rises with the universal
/// power law `σ = σ_f · ((φ − φc)/(1 − φc))^t`.
#[must_use]
pub fn percolated_log_resistivity(
    matrix_log_rho: f64,
    filler_log_rho: f64,
    phi: f64,
    threshold: f64,
) -> f64 {
    let sigma_matrix = 10f64.powf(-matrix_log_rho);
    let sigma_filler = 10f64.powf(-filler_log_rho);

    // Dilute regime: isolated conductive islands (Maxwell-Garnett)
    let sigma_dilute = maxwell_garnett(sigma_matrix, sigma_filler, phi.min(threshold));

    let sigma = if phi > threshold {
        let reduced = (phi - threshold) / (1.0 - threshold);
        sigma_dilute + sigma_filler * reduced.powf(PERCOLATION_EXPONENT)
    } else {
        sigma_dilute
    };
    -sigma.log10()
}

/// Interfacial (Maxwell–Wagner) polarization loss added to the mixed tan δ.
#[must_use]
pub fn interfacial_loss(phi: f64, adhesion: f64) -> f64 {
    0.08 * phi * (1.0 - phi) * (1.0 - adhesion)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn test_zero_filler_reduces_to_matrix() {
        assert!((rule_of_mixtures(3.0, 10.0, 0.0) - 3.0).abs() < EPS);
        assert!((halpin_tsai_ratio(80.0, 3.0, 4.0, 0.0) - 1.0).abs() < EPS);
        assert!((load_bearing_fraction(0.0, 0.3) - 1.0).abs() < EPS);
        assert!((maxwell_garnett(0.2, 1.25, 0.0) - 0.2).abs() < EPS);
        assert!((turner_cte(60.0, 10.0, 3.0, 80.0, 0.0) - 60.0).abs() < EPS);
        assert!((lichtenecker(3.6, 10.0, 0.0) - 3.6).abs() < 1e-9);
        assert!((percolated_log_resistivity(13.0, 9.0, 0.0, 0.2) - 13.0).abs() < 1e-9);
    }

    #[test]
    fn test_volume_fraction_for_dense_filler() {
        // 20 wt% hydroxyapatite in epoxy is well under 10 vol%
        let phi = volume_fraction(0.2, 3.16, 1.2);
        assert!(phi > 0.08 && phi < 0.09, "phi = {phi}");
    }

    #[test]
    fn test_volume_fraction_capped_at_packing_limit() {
        let phi = volume_fraction(0.99, 1.0, 5.0);
        assert!((phi - MAX_PACKING_FRACTION).abs() < EPS);
    }

    #[test]
    fn test_halpin_tsai_stiffens_with_stiff_filler() {
        let low = halpin_tsai_ratio(80.0, 3.0, 4.0, 0.05);
        let high = halpin_tsai_ratio(80.0, 3.0, 4.0, 0.20);
        assert!(low > 1.0 && high > low);
        // Higher aspect ratio reinforces more at the same loading
        assert!(halpin_tsai_ratio(80.0, 3.0, 50.0, 0.05) > low);
    }

    #[test]
    fn test_percolation_transition_is_abrupt() {
        let threshold = 0.15;
        let below = percolated_log_resistivity(13.0, 8.0, threshold - 0.02, threshold);
        let above = percolated_log_resistivity(13.0, 8.0, threshold + 0.10, threshold);
        // Far more change across the threshold than below it
        let dilute_drop = 13.0 - below;
        let jump = below - above;
        assert!(dilute_drop < 0.5, "dilute drop {dilute_drop}");
        assert!(jump > 1.0, "jump {jump}");
    }

    #[test]
    fn test_percolation_threshold_bounds() {
        assert!((percolation_threshold(1.0) - 0.30).abs() < EPS);
        assert!((percolation_threshold(1000.0) - 0.05).abs() < EPS);
        assert!((percolation_threshold(0.5) - 0.35).abs() < EPS);
    }

    #[test]
    fn test_composite_density_between_constituents() {
        let rho = composite_density(0.3, 3.16, 1.2);
        assert!(rho > 1.2 && rho < 3.16);
    }
}
