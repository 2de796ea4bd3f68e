//! Display view over a raw payment payload.
//!
//! The payload itself is never validated or rewritten; this module only
//! derives the strings shown to the operator.

use serde_json::Value;

/// Placeholder for a field that is missing or null.
const MISSING: &str = "-";

/// Number of leading characters revealed by [`mask_card`].
const CARD_PREFIX: usize = 6;
/// Index from which the tail is revealed again.
const CARD_TAIL_FROM: usize = 12;
const CARD_MASK: &str = "******";

/// Operator-facing fields of a `POST /procesar-pago` body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionView {
    pub id: String,
    pub pos: String,
    pub merchant: String,
    pub kind: String,
    pub brand: String,
    pub modality: String,
    pub amount: String,
    pub currency: String,
    pub masked_card: String,
    pub holder: String,
}

impl TransactionView {
    pub fn from_payload(payload: &Value) -> Self {
        Self {
            id: field(payload, "codigoUnicoTransaccion"),
            pos: field(payload, "codigoPOS"),
            merchant: field(payload, "codigoComercio"),
            kind: field(payload, "tipo"),
            brand: field(payload, "marca"),
            modality: field(payload, "modalidad"),
            amount: field(payload, "monto"),
            currency: field(payload, "moneda"),
            masked_card: field_opt(payload, "numeroTarjeta")
                .map(|card| mask_card(&card))
                .unwrap_or_else(|| MISSING.to_string()),
            holder: field(payload, "nombreTitular"),
        }
    }
}

/// Masks a card-like string: first 6 characters, six `*`, then everything
/// from index 12 on. `"4111111111111111"` becomes `"411111******1111"`.
///
/// Strings shorter than 13 characters would expose most of their digits, so
/// they are masked completely instead.
pub fn mask_card(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() <= CARD_TAIL_FROM {
        return "*".repeat(chars.len());
    }

    let mut masked = String::with_capacity(raw.len());
    masked.extend(&chars[..CARD_PREFIX]);
    masked.push_str(CARD_MASK);
    masked.extend(&chars[CARD_TAIL_FROM..]);
    masked
}

fn field(payload: &Value, key: &str) -> String {
    field_opt(payload, key).unwrap_or_else(|| MISSING.to_string())
}

fn field_opt(payload: &Value, key: &str) -> Option<String> {
    match payload.get(key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
