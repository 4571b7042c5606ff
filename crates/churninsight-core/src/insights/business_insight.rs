//! Business Insight Selector
//!
//! Picks ONE headline explanation per customer. Rules are an ordered table
//! evaluated first-match-wins; the order encodes business severity:
//! inactivity in the risk age band, then product saturation, then region,
//! then age alone. A fallback "stable" insight makes the function total.

use crate::config::InsightThresholds;
use crate::models::CustomerFeatures;

use super::types::{BusinessInsight, InsightPriority, InsightRule};

struct CascadeRule {
    rule: InsightRule,
    applies: fn(&CustomerFeatures, &InsightThresholds) -> bool,
    technical_cause: &'static str,
    business_cause: &'static str,
    suggested_action: &'static str,
    priority: InsightPriority,
    estimated_impact: &'static str,
}

impl CascadeRule {
    fn to_insight(&self) -> BusinessInsight {
        BusinessInsight {
            rule: self.rule,
            technical_cause: self.technical_cause.to_string(),
            business_cause: self.business_cause.to_string(),
            suggested_action: self.suggested_action.to_string(),
            priority: self.priority,
            estimated_impact: self.estimated_impact.to_string(),
        }
    }
}

fn inactive_in_risk_age(f: &CustomerFeatures, t: &InsightThresholds) -> bool {
    t.in_risk_age(f.age) && !f.is_active_member
}

fn product_saturation(f: &CustomerFeatures, t: &InsightThresholds) -> bool {
    f.num_of_products >= t.product_overload_min
}

fn regional_sensitivity(f: &CustomerFeatures, t: &InsightThresholds) -> bool {
    f.country == t.high_risk_country
}

fn life_cycle(f: &CustomerFeatures, t: &InsightThresholds) -> bool {
    t.in_risk_age(f.age)
}

fn always(_: &CustomerFeatures, _: &InsightThresholds) -> bool {
    true
}

static CASCADE: &[CascadeRule] = &[
    CascadeRule {
        rule: InsightRule::InactiveInRiskAge,
        applies: inactive_in_risk_age,
        technical_cause: "Inactivo_40_70: miembro inactivo dentro del rango etario de riesgo",
        business_cause: "Abandono silencioso",
        suggested_action: "Campaña de reactivación con contacto directo del gestor y un incentivo por uso",
        priority: InsightPriority::High,
        estimated_impact: "Recuperar la actividad reduce de forma notable la probabilidad de fuga en este grupo",
    },
    CascadeRule {
        rule: InsightRule::ProductSaturation,
        applies: product_saturation,
        technical_cause: "Products_Risk_Flag: cartera con 3 o más productos contratados",
        business_cause: "Saturación de cartera",
        suggested_action: "Revisar y consolidar productos con asesoría personalizada",
        priority: InsightPriority::High,
        estimated_impact: "Simplificar la cartera disminuye la fricción y las cancelaciones en cadena",
    },
    CascadeRule {
        rule: InsightRule::RegionalSensitivity,
        applies: regional_sensitivity,
        technical_cause: "Country_Risk_Flag: residente en el mercado con mayor tasa de abandono",
        business_cause: "Sensibilidad regional",
        suggested_action: "Adaptar ofertas y condiciones a la competencia del mercado local",
        priority: InsightPriority::Medium,
        estimated_impact: "Ofertas alineadas con el mercado local reducen la fuga por precio",
    },
    CascadeRule {
        rule: InsightRule::LifeCycle,
        applies: life_cycle,
        technical_cause: "Age_Risk: cliente dentro del rango etario de mayor propensión al abandono",
        business_cause: "Ciclo de vida",
        suggested_action: "Ofrecer productos acordes a la etapa vital (ahorro, inversión, jubilación)",
        priority: InsightPriority::Low,
        estimated_impact: "Acompañar la etapa vital refuerza la vinculación a largo plazo",
    },
];

static STABLE: CascadeRule = CascadeRule {
    rule: InsightRule::Stable,
    applies: always,
    technical_cause: "Sin indicadores de riesgo activos",
    business_cause: "Cliente estable",
    suggested_action: "Mantener comunicación periódica y programa de fidelización",
    priority: InsightPriority::Low,
    estimated_impact: "Mantenimiento preventivo de la relación",
};

/// Select the business insight for a customer (first matching rule wins)
pub fn select_insight(features: &CustomerFeatures, thresholds: &InsightThresholds) -> BusinessInsight {
    let rule = CASCADE
        .iter()
        .find(|r| (r.applies)(features, thresholds))
        .unwrap_or(&STABLE);

    tracing::debug!(rule = ?rule.rule, "Selected business insight");
    rule.to_insight()
}

/// Rules in evaluation order, for display and auditing
pub fn cascade_order() -> Vec<InsightRule> {
    CASCADE
        .iter()
        .map(|r| r.rule)
        .chain(std::iter::once(STABLE.rule))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::stable_customer;
    use crate::models::Country;

    fn select(f: &CustomerFeatures) -> BusinessInsight {
        select_insight(f, &InsightThresholds::default())
    }

    #[test]
    fn test_inactive_in_risk_age_beats_everything() {
        let mut c = stable_customer();
        c.age = 45;
        c.is_active_member = false;
        c.num_of_products = 1;
        c.country = Country::France;

        let insight = select(&c);
        assert_eq!(insight.business_cause, "Abandono silencioso");
        assert_eq!(insight.priority, InsightPriority::High);

        // Still rule 1 with every lower rule also matching
        c.num_of_products = 5;
        c.country = Country::Germany;
        assert_eq!(select(&c).rule, InsightRule::InactiveInRiskAge);
    }

    #[test]
    fn test_product_saturation_when_active() {
        let mut c = stable_customer();
        c.age = 45;
        c.is_active_member = true;
        c.num_of_products = 5;

        let insight = select(&c);
        assert_eq!(insight.business_cause, "Saturación de cartera");
        assert_eq!(insight.priority, InsightPriority::High);
    }

    #[test]
    fn test_regional_sensitivity() {
        let mut c = stable_customer();
        c.country = Country::Germany;
        c.num_of_products = 2;

        let insight = select(&c);
        assert_eq!(insight.rule, InsightRule::RegionalSensitivity);
        assert_eq!(insight.priority, InsightPriority::Medium);
    }

    #[test]
    fn test_life_cycle_for_active_risk_age() {
        let mut c = stable_customer();
        c.age = 70;
        c.is_active_member = true;

        let insight = select(&c);
        assert_eq!(insight.business_cause, "Ciclo de vida");
        assert_eq!(insight.priority, InsightPriority::Low);
    }

    #[test]
    fn test_fallback_is_stable() {
        let c = stable_customer();
        let insight = select(&c);
        assert_eq!(insight.rule, InsightRule::Stable);
        assert_eq!(insight.business_cause, "Cliente estable");
        assert_eq!(insight.priority, InsightPriority::Low);
    }

    #[test]
    fn test_inactive_outside_risk_age_is_not_rule_one() {
        let mut c = stable_customer();
        c.age = 39;
        c.is_active_member = false;
        assert_eq!(select(&c).rule, InsightRule::Stable);

        c.age = 71;
        assert_eq!(select(&c).rule, InsightRule::Stable);
    }

    #[test]
    fn test_cascade_order() {
        assert_eq!(
            cascade_order(),
            vec![
                InsightRule::InactiveInRiskAge,
                InsightRule::ProductSaturation,
                InsightRule::RegionalSensitivity,
                InsightRule::LifeCycle,
                InsightRule::Stable,
            ]
        );
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let thresholds = InsightThresholds {
            high_risk_country: Country::Spain,
            ..Default::default()
        };
        let mut c = stable_customer();
        c.country = Country::Spain;
        assert_eq!(
            select_insight(&c, &thresholds).rule,
            InsightRule::RegionalSensitivity
        );
        c.country = Country::Germany;
        assert_eq!(select_insight(&c, &thresholds).rule, InsightRule::Stable);
    }
}
