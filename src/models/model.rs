//! Stress evaluation and the chi-square objective.
//!
//! The calibrators only need two primitive operations from a model:
//! evaluate τ(γ̇), and score a set of observations against it. Scoring is
//! written against the [`StressModel`] trait so anything exposing a stress
//! evaluation can be dropped into the chi-square objective — the trait is the
//! core's one extensibility point.

use crate::domain::YplModel;

/// Anything that maps a shear rate to a shear stress.
pub trait StressModel {
    /// τ(γ̇) in Pa.
    fn stress(&self, shear_rate: f64) -> f64;
}

impl StressModel for YplModel {
    fn stress(&self, shear_rate: f64) -> f64 {
        self.tau0 + self.k * shear_rate.powf(self.n)
    }
}

/// Weighted sum of squared residuals `Σ((τᵢ − model(γ̇ᵢ)) / σᵢ)²`.
///
/// Returns `None` on empty or mismatched inputs or a non-finite result, so
/// "not computed" can never be mistaken for a perfect fit.
pub fn chi_square(
    shear_rates: &[f64],
    shear_stresses: &[f64],
    sigmas: &[f64],
    model: &impl StressModel,
) -> Option<f64> {
    if shear_rates.is_empty()
        || shear_rates.len() != shear_stresses.len()
        || shear_rates.len() != sigmas.len()
    {
        return None;
    }

    let mut sum = 0.0;
    for ((&rate, &stress), &sigma) in shear_rates.iter().zip(shear_stresses).zip(sigmas) {
        let r = (stress - model.stress(rate)) / sigma;
        sum += r * r;
    }

    sum.is_finite().then_some(sum)
}

/// [`chi_square`] with the same σ for every point (the rheogram case).
pub fn chi_square_uniform(
    shear_rates: &[f64],
    shear_stresses: &[f64],
    sigma: f64,
    model: &impl StressModel,
) -> Option<f64> {
    let sigmas = vec![sigma; shear_rates.len()];
    chi_square(shear_rates, shear_stresses, &sigmas, model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ypl_stress_evaluates_the_law() {
        let model = YplModel {
            tau0: 3.0,
            k: 0.5,
            n: 0.8,
        };
        let rate = 100.0_f64;
        let expected = 3.0 + 0.5 * rate.powf(0.8);
        assert!((model.stress(rate) - expected).abs() < 1e-12);
        // γ̇ = 0 evaluates to the yield stress alone.
        assert!((model.stress(0.0) - 3.0).abs() < 1e-12);
    }

    #[test]
    fn chi_square_is_zero_on_exact_data() {
        let model = YplModel {
            tau0: 2.0,
            k: 0.3,
            n: 0.7,
        };
        let rates = [1.0, 10.0, 100.0, 500.0];
        let stresses: Vec<f64> = rates.iter().map(|&g| model.stress(g)).collect();
        let chi = chi_square_uniform(&rates, &stresses, 0.01, &model).unwrap();
        assert!(chi.abs() < 1e-12);
    }

    #[test]
    fn chi_square_weights_by_sigma() {
        let model = YplModel::default();
        // One point, residual 1.0, sigma 0.5 → (1/0.5)² = 4.
        let chi = chi_square(&[1.0], &[2.0], &[0.5], &model).unwrap();
        assert!((chi - 4.0).abs() < 1e-12);
    }

    #[test]
    fn mismatched_inputs_are_not_computed() {
        let model = YplModel::default();
        assert!(chi_square(&[1.0, 2.0], &[1.0], &[0.01, 0.01], &model).is_none());
        assert!(chi_square(&[], &[], &[], &model).is_none());
    }

    #[test]
    fn a_custom_model_plugs_into_the_objective() {
        struct Bingham {
            tau0: f64,
            mu: f64,
        }
        impl StressModel for Bingham {
            fn stress(&self, shear_rate: f64) -> f64 {
                self.tau0 + self.mu * shear_rate
            }
        }

        let model = Bingham { tau0: 5.0, mu: 0.02 };
        let rates = [10.0, 20.0];
        let stresses: Vec<f64> = rates.iter().map(|&g| model.stress(g)).collect();
        let chi = chi_square_uniform(&rates, &stresses, 0.01, &model).unwrap();
        assert!(chi.abs() < 1e-12);
    }
}
