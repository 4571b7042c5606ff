//! Urgency Scorer and action timeline
//!
//! Additive point scheme capped at 100. The score then selects one of three
//! fixed action plans.

use crate::config::{RiskFactorThresholds, UrgencyWeights};
use crate::models::CustomerFeatures;

use super::types::{ActionTimeline, UrgencyScore, UrgencyTier};

pub const MAX_SCORE: u32 = 100;

/// Score how time-sensitive an intervention is (0..=100)
pub fn score_urgency(
    probability: f64,
    features: &CustomerFeatures,
    weights: &UrgencyWeights,
    factors: &RiskFactorThresholds,
) -> UrgencyScore {
    let conditions: [(bool, u32, &str); 5] = [
        (
            probability > weights.high_probability,
            weights.high_probability_points,
            "Probabilidad muy alta",
        ),
        (
            features.recent_inactive,
            weights.recent_inactive_points,
            "Recientemente inactivo",
        ),
        (
            features.delta_balance < -factors.withdrawal_threshold,
            weights.withdrawal_points,
            "Retiro masivo de fondos",
        ),
        (
            features.had_complaint,
            weights.complaint_points,
            "Queja reciente",
        ),
        (
            features.delta_num_of_products < 0,
            weights.product_cancellation_points,
            "Cancelación de productos",
        ),
    ];

    let mut score: u32 = 0;
    let mut labels = Vec::new();
    for (holds, points, label) in conditions {
        if holds {
            score = score.saturating_add(points);
            labels.push(label.to_string());
        }
    }

    UrgencyScore {
        score: score.min(MAX_SCORE),
        factors: labels,
    }
}

/// Map a score onto its tier
pub fn urgency_tier(score: u32, weights: &UrgencyWeights) -> UrgencyTier {
    if score > weights.immediate_above {
        UrgencyTier::Immediate
    } else if score > weights.short_term_above {
        UrgencyTier::ShortTerm
    } else {
        UrgencyTier::Maintenance
    }
}

const IMMEDIATE: [&[&str]; 3] = [
    &[
        "Contacto telefónico en próximas 2 horas",
        "Oferta exclusiva de retención (descuento 30%)",
        "Escalamiento a gerente senior",
    ],
    &[
        "Seguimiento día 3: verificar satisfacción",
        "Día 7: segunda oferta si no hay respuesta",
        "Día 14: revisión final antes de marcar como perdido",
    ],
    &[],
];

const SHORT_TERM: [&[&str]; 3] = [
    &[
        "Email personalizado en próximas 24 horas",
        "Oferta de mejora de servicio",
    ],
    &[
        "Semana 1: Encuesta de satisfacción",
        "Semana 2: Oferta de producto complementario",
        "Mes 1: Revisión de progreso",
    ],
    &[
        "Trimestre: Evaluación de retención",
        "Semestre: Programa de fidelización",
    ],
];

const MAINTENANCE: [&[&str]; 3] = [
    &["Mantener comunicación regular"],
    &[
        "Mes 1: Check-in de satisfacción",
        "Trimestre: Oferta de beneficios por lealtad",
    ],
    &[
        "Semestre: Invitación a programa de referidos",
        "Anual: Revisión de beneficios premium",
    ],
];

/// Fixed action plan for the tier the score falls into
pub fn action_timeline(urgency: &UrgencyScore, weights: &UrgencyWeights) -> ActionTimeline {
    let tier = urgency_tier(urgency.score, weights);
    let [immediate, short, medium] = match tier {
        UrgencyTier::Immediate => IMMEDIATE,
        UrgencyTier::ShortTerm => SHORT_TERM,
        UrgencyTier::Maintenance => MAINTENANCE,
    };

    let owned = |actions: &[&str]| actions.iter().map(|a| a.to_string()).collect::<Vec<_>>();
    ActionTimeline {
        tier,
        immediate_actions: owned(immediate),
        short_term: owned(short),
        medium_term: owned(medium),
    }
}
