use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::leg::{coerce_number, coerce_qty, format_number, serialize_js_number, Leg, LegSide, OptionKind};

/// A leg in the shape the server accepts. Only built from legs that pass validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedLeg {
    #[serde(rename = "type")]
    pub kind: OptionKind,
    pub side: LegSide,
    #[serde(rename = "K", serialize_with = "serialize_js_number")]
    pub strike: f64,
    #[serde(serialize_with = "serialize_js_number")]
    pub price: f64,
    #[serde(rename = "Q")]
    pub qty: u32,
}

impl SubmittedLeg {
    pub fn from_leg(leg: &Leg) -> Option<Self> {
        let strike = leg.strike.filter(|k| k.is_finite())?;
        let price = leg.price.filter(|p| p.is_finite())?;
        Some(Self {
            kind: leg.option_kind()?,
            side: leg.leg_side()?,
            strike,
            price,
            qty: leg.qty.max(1),
        })
    }
}

pub fn is_submittable(leg: &Leg) -> bool {
    SubmittedLeg::from_leg(leg).is_some()
}

/// Result of encoding the leg collection for the hidden form field.
#[derive(Debug, Clone, PartialEq)]
pub struct SerializedLegs {
    pub json: String,
    pub submitted: Vec<SubmittedLeg>,
    /// Positions of legs left out because they were incomplete or invalid.
    pub dropped: Vec<usize>,
}

/// Encode every submittable leg, in order, as a JSON array. Other legs are skipped.
pub fn serialize_legs(legs: &[Leg]) -> Result<SerializedLegs, serde_json::Error> {
    let mut submitted = Vec::with_capacity(legs.len());
    let mut dropped = Vec::new();
    for (idx, leg) in legs.iter().enumerate() {
        match SubmittedLeg::from_leg(leg) {
            Some(s) => submitted.push(s),
            None => dropped.push(idx),
        }
    }
    let json = serde_json::to_string(&submitted)?;
    Ok(SerializedLegs {
        json,
        submitted,
        dropped,
    })
}

/// Parse the legs embedded in the page by a previous submission.
///
/// Returns `None` for missing or blank text, invalid JSON, a non-array document, or an
/// array without any object entries.
pub fn parse_initial_legs(text: Option<&str>) -> Option<Vec<Leg>> {
    let text = text?.trim();
    if text.is_empty() {
        return None;
    }
    let doc: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(err) => {
            debug!(%err, "ignoring unparsable initial legs");
            return None;
        }
    };
    let Value::Array(entries) = doc else {
        debug!("initial legs payload is not an array");
        return None;
    };
    let legs: Vec<Leg> = entries
        .iter()
        .filter_map(Value::as_object)
        .map(leg_from_seed)
        .collect();
    if legs.is_empty() {
        None
    } else {
        Some(legs)
    }
}

fn leg_from_seed(seed: &Map<String, Value>) -> Leg {
    Leg {
        kind: seed_text(seed.get("type")),
        side: seed_text(seed.get("side")),
        strike: seed_number(seed.get("K")),
        price: seed_number(seed.get("price")),
        qty: seed_qty(seed.get("Q")),
    }
}

fn seed_text(v: Option<&Value>) -> String {
    v.and_then(Value::as_str).unwrap_or_default().to_string()
}

fn seed_number(v: Option<&Value>) -> Option<f64> {
    match v {
        None | Some(Value::Null) => None,
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => coerce_number(s),
        Some(_) => Some(f64::NAN),
    }
}

fn seed_qty(v: Option<&Value>) -> u32 {
    match v {
        Some(Value::Number(n)) => n.as_f64().map(|q| coerce_qty(&format_number(q))).unwrap_or(1),
        Some(Value::String(s)) => coerce_qty(s),
        _ => 1,
    }
}
