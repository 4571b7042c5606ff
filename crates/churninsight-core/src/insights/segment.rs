//! Segment Classifier
//!
//! Mutually exclusive classification, first match wins, with an
//! unconditional default. Once a branch matches, its characteristics and
//! retention strategy are a fixed lookup.

use crate::config::SegmentThresholds;
use crate::models::CustomerFeatures;

use super::types::{CustomerSegment, SegmentKind};

struct SegmentRule {
    kind: SegmentKind,
    applies: fn(&CustomerFeatures, &SegmentThresholds) -> bool,
    name: &'static str,
    characteristics: &'static [&'static str],
    retention_strategy: &'static str,
}

impl SegmentRule {
    fn to_segment(&self) -> CustomerSegment {
        CustomerSegment {
            kind: self.kind,
            name: self.name.to_string(),
            characteristics: self.characteristics.iter().map(|c| c.to_string()).collect(),
            retention_strategy: self.retention_strategy.to_string(),
        }
    }
}

fn premium(f: &CustomerFeatures, t: &SegmentThresholds) -> bool {
    f.balance > t.premium_balance || f.estimated_salary > t.premium_salary
}

fn critical_multifactor(f: &CustomerFeatures, _: &SegmentThresholds) -> bool {
    !f.is_active_member && (f.delta_balance < 0.0 || f.delta_num_of_products < 0)
}

fn young_active(f: &CustomerFeatures, t: &SegmentThresholds) -> bool {
    f.age < t.young_age_below && f.is_active_member && f.num_of_products <= t.young_products_max
}

fn senior_established(f: &CustomerFeatures, t: &SegmentThresholds) -> bool {
    f.age > t.senior_age_above && f.num_of_products >= t.senior_products_min && f.is_active_member
}

static SEGMENTS: &[SegmentRule] = &[
    SegmentRule {
        kind: SegmentKind::Premium,
        applies: premium,
        name: "Cliente Premium / VIP",
        characteristics: &[
            "Alto valor económico",
            "Poder adquisitivo significativo",
            "Requiere atención personalizada",
            "Sensible a la calidad del servicio",
        ],
        retention_strategy:
            "Asignar gerente de cuenta dedicado, servicios exclusivos, beneficios premium",
    },
    SegmentRule {
        kind: SegmentKind::CriticalMultifactor,
        applies: critical_multifactor,
        name: "En Riesgo Crítico Multifactor",
        characteristics: &[
            "Inactivo con señales de abandono",
            "Reduciendo su relación comercial",
            "Múltiples indicadores negativos",
            "Requiere intervención urgente",
        ],
        retention_strategy:
            "Equipo de retención especializado, ofertas agresivas, contacto inmediato",
    },
    SegmentRule {
        kind: SegmentKind::YoungActive,
        applies: young_active,
        name: "Millennial/Gen Z Activo",
        characteristics: &[
            "Edad joven con potencial de crecimiento",
            "Activo pero con pocos productos",
            "Oportunidad de cross-selling",
            "Sensible a experiencia digital",
        ],
        retention_strategy: "Gamificación, app móvil optimizada, beneficios por referidos",
    },
    SegmentRule {
        kind: SegmentKind::SeniorEstablished,
        applies: senior_established,
        name: "Cliente Senior Establecido",
        characteristics: &[
            "Cliente maduro y estable",
            "Múltiples productos activos",
            "Valora seguridad y confianza",
            "Requiere comunicación clara",
        ],
        retention_strategy:
            "Asesoría financiera, productos de inversión conservadores, atención telefónica",
    },
];

static STANDARD: SegmentRule = SegmentRule {
    kind: SegmentKind::Standard,
    applies: |_, _| true,
    name: "Cliente Estándar",
    characteristics: &[
        "Perfil balanceado",
        "Uso moderado de servicios",
        "Potencial de desarrollo",
        "Requiere engagement regular",
    ],
    retention_strategy:
        "Comunicación periódica, ofertas personalizadas, programas de fidelización",
};

/// Assign exactly one segment to a customer
pub fn classify_segment(features: &CustomerFeatures, thresholds: &SegmentThresholds) -> CustomerSegment {
    let rule = SEGMENTS
        .iter()
        .find(|r| (r.applies)(features, thresholds))
        .unwrap_or(&STANDARD);

    tracing::debug!(segment = rule.kind.as_str(), "Classified customer segment");
    rule.to_segment()
}
