//! Risk Factor Enumerator
//!
//! Unlike the insight cascade this is additive: every condition is checked
//! independently and each one that holds contributes a factor with a fixed
//! severity weight and impact tier. An empty result means "no risk detected".

use crate::config::EngineConfig;
use crate::models::CustomerFeatures;

use super::types::{Impact, RiskFactor};

struct FactorRule {
    applies: fn(&CustomerFeatures, &EngineConfig) -> bool,
    name: &'static str,
    value: f64,
    impact: Impact,
    describe: fn(&CustomerFeatures) -> String,
    recommendation: &'static str,
}

fn is_withdrawal(f: &CustomerFeatures, c: &EngineConfig) -> bool {
    f.delta_balance < -c.risk_factors.withdrawal_threshold
}

// Table order is the tie-break order for equal weights.
static FACTORS: &[FactorRule] = &[
    FactorRule {
        applies: |f, c| c.insight.in_risk_age(f.age) && !f.is_active_member,
        name: "Inactivo en Edad Crítica",
        value: 0.95,
        impact: Impact::Critical,
        describe: |_| "Combinación peligrosa: inactividad en rango etario de alto riesgo".to_string(),
        recommendation: "URGENTE: Campaña de reactivación inmediata con incentivos atractivos",
    },
    FactorRule {
        applies: |f, c| f.num_of_products >= c.insight.product_overload_min,
        name: "Múltiples Productos (3+)",
        value: 0.75,
        impact: Impact::High,
        describe: |_| "Sobrecarga de productos puede generar confusión y abandono".to_string(),
        recommendation: "Simplificar portafolio, consolidar servicios, ofrecer asesoría personalizada",
    },
    FactorRule {
        applies: |f, c| f.country == c.insight.high_risk_country,
        name: "País de Alto Riesgo",
        value: 0.7,
        impact: Impact::Medium,
        describe: |f| {
            format!(
                "El mercado de {} muestra tasas de abandono históricamente elevadas",
                f.country
            )
        },
        recommendation: "Investigar competencia local, adaptar ofertas al mercado",
    },
    FactorRule {
        applies: is_withdrawal,
        name: "Retiro Significativo de Fondos",
        value: 0.9,
        impact: Impact::Critical,
        describe: |f| format!("Cliente retiró {:.0}$ recientemente", f.delta_balance.abs()),
        recommendation: "Contacto inmediato para entender razones y ofrecer alternativas",
    },
    FactorRule {
        applies: |f, c| f.delta_balance < 0.0 && !is_withdrawal(f, c),
        name: "Reducción de Balance",
        value: 0.6,
        impact: Impact::Medium,
        describe: |_| "Cliente está reduciendo su exposición con la entidad".to_string(),
        recommendation: "Ofrecer productos de inversión o ahorro atractivos",
    },
    FactorRule {
        applies: |f, _| f.delta_num_of_products < 0,
        name: "Cancelación de Productos",
        value: 0.8,
        impact: Impact::High,
        describe: |f| {
            format!(
                "Cliente canceló {} producto(s)",
                f.delta_num_of_products.unsigned_abs()
            )
        },
        recommendation: "Investigar motivos de cancelación, ofrecer alternativas mejoradas",
    },
    FactorRule {
        applies: |f, _| f.recent_inactive,
        name: "Pasó de Activo a Inactivo",
        value: 0.85,
        impact: Impact::Critical,
        describe: |_| "Cliente dejó de utilizar activamente los servicios".to_string(),
        recommendation: "Campaña de win-back urgente, identificar barreras de uso",
    },
    FactorRule {
        applies: |f, _| f.product_usage_drop,
        name: "Disminución en Uso de Productos",
        value: 0.75,
        impact: Impact::High,
        describe: |_| "Cliente redujo significativamente su engagement".to_string(),
        recommendation: "Gamificación, recompensas por uso, notificaciones de valor agregado",
    },
    FactorRule {
        applies: |f, _| f.had_complaint,
        name: "Quejas Recientes",
        value: 0.8,
        impact: Impact::High,
        describe: |_| "Cliente expresó insatisfacción recientemente".to_string(),
        recommendation: "Seguimiento de resolución, compensación proactiva, mejorar la experiencia",
    },
];

/// Every independent risk condition that holds, heaviest first
pub fn enumerate_factors(features: &CustomerFeatures, config: &EngineConfig) -> Vec<RiskFactor> {
    let mut factors: Vec<RiskFactor> = FACTORS
        .iter()
        .filter(|rule| (rule.applies)(features, config))
        .map(|rule| RiskFactor {
            name: rule.name.to_string(),
            value: rule.value,
            impact: rule.impact,
            description: (rule.describe)(features),
            recommendation: rule.recommendation.to_string(),
        })
        .collect();

    // Stable sort keeps table order among equal weights
    factors.sort_by(|a, b| b.value.total_cmp(&a.value));

    tracing::debug!(count = factors.len(), "Enumerated risk factors");
    factors
}

/// Number of independent conditions in the table
pub fn condition_count() -> usize {
    FACTORS.len()
}
