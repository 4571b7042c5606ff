//! Customer Value Estimator
//!
//! `clv = (balance * balance_rate + salary * salary_rate) * products * (tenure / 12)`
//!
//! Pure arithmetic. Negative inputs are not rejected here: they produce a
//! negative (degenerate) CLV, which is still a valid output.

use crate::config::ValueModel;
use crate::models::CustomerFeatures;

use super::types::CustomerValueEstimate;

pub fn estimate_value(
    features: &CustomerFeatures,
    probability: f64,
    model: &ValueModel,
) -> CustomerValueEstimate {
    let yearly_margin =
        features.balance * model.balance_rate + features.estimated_salary * model.salary_rate;
    let tenure_years = features.tenure as f64 / model.months_per_year;
    let clv = yearly_margin * features.num_of_products as f64 * tenure_years;

    let potential_loss = clv * probability;

    CustomerValueEstimate {
        clv,
        potential_loss,
        retention_roi: potential_loss * model.recovery_rate,
    }
}
