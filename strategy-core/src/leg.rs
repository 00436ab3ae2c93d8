use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LegError {
    #[error("unknown leg field '{0}'")]
    UnknownField(String),
}

/// Option right of a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Call,
    Put,
}

impl OptionKind {
    pub const ALL: [OptionKind; 2] = [OptionKind::Call, OptionKind::Put];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::Call => "call",
            OptionKind::Put => "put",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OptionKind::Call => "Call",
            OptionKind::Put => "Put",
        }
    }

    /// Exact match on the wire value; anything else is "unset or invalid".
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == raw)
    }
}

/// Position direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegSide {
    Long,
    Short,
}

impl LegSide {
    pub const ALL: [LegSide; 2] = [LegSide::Long, LegSide::Short];

    pub fn as_str(&self) -> &'static str {
        match self {
            LegSide::Long => "long",
            LegSide::Short => "short",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LegSide::Long => "Long",
            LegSide::Short => "Short",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

/// Editable fields of a leg, named as they travel in form `data-field` attributes and JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegField {
    Kind,
    Side,
    Strike,
    Price,
    Qty,
}

impl LegField {
    pub const ALL: [LegField; 5] = [
        LegField::Side,
        LegField::Kind,
        LegField::Strike,
        LegField::Price,
        LegField::Qty,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            LegField::Kind => "type",
            LegField::Side => "side",
            LegField::Strike => "K",
            LegField::Price => "price",
            LegField::Qty => "Q",
        }
    }
}

impl FromStr for LegField {
    type Err = LegError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LegField::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| LegError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for LegField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One option position as edited in the form.
///
/// `kind` and `side` keep whatever the selector produced (empty = unset); they are only
/// interpreted when the leg is validated for submission. `strike`/`price` use `None` for
/// an empty input and NaN for input that is not a number.
#[derive(Debug, Clone, PartialEq)]
pub struct Leg {
    pub kind: String,
    pub side: String,
    pub strike: Option<f64>,
    pub price: Option<f64>,
    pub qty: u32,
}

impl Default for Leg {
    fn default() -> Self {
        Self {
            kind: String::new(),
            side: String::new(),
            strike: None,
            price: None,
            qty: 1,
        }
    }
}

impl Leg {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn option_kind(&self) -> Option<OptionKind> {
        OptionKind::parse(&self.kind)
    }

    pub fn leg_side(&self) -> Option<LegSide> {
        LegSide::parse(&self.side)
    }

    /// Write a raw form value into `field`, applying that field's coercion.
    pub fn set_field(&mut self, field: LegField, raw: &str) {
        match field {
            LegField::Kind => self.kind = raw.to_string(),
            LegField::Side => self.side = raw.to_string(),
            LegField::Strike => self.strike = coerce_number(raw),
            LegField::Price => self.price = coerce_number(raw),
            LegField::Qty => self.qty = coerce_qty(raw),
        }
    }

    /// Current value of `field` as it should appear in a form control.
    pub fn field_value(&self, field: LegField) -> String {
        match field {
            LegField::Kind => self.kind.clone(),
            LegField::Side => self.side.clone(),
            LegField::Strike => self.strike.map(format_number).unwrap_or_default(),
            LegField::Price => self.price.map(format_number).unwrap_or_default(),
            LegField::Qty => self.qty.to_string(),
        }
    }
}

/// Quantity coercion: integer prefix of `raw` (empty reads as "1"), floored at 1.
pub fn coerce_qty(raw: &str) -> u32 {
    let raw = if raw.is_empty() { "1" } else { raw };
    match parse_int_prefix(raw) {
        Some(n) => n.clamp(1, u32::MAX as i64) as u32,
        None => 1,
    }
}

/// Strike/premium coercion: `None` for empty input, otherwise the parsed number (NaN if
/// it does not parse).
pub fn coerce_number(raw: &str) -> Option<f64> {
    if raw.trim().is_empty() {
        None
    } else {
        Some(raw.trim().parse::<f64>().unwrap_or(f64::NAN))
    }
}

/// Leading-integer parse: optional whitespace and sign, then digits; trailing text is
/// ignored ("3.7" -> 3, "12abc" -> 12). Saturates instead of overflowing.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes() {
        if !b.is_ascii_digit() {
            break;
        }
        seen = true;
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(b - b'0'));
    }
    if !seen {
        return None;
    }
    Some(if negative { -value } else { value })
}

/// Format a number the way a browser prints it into an input or JSON.
pub fn format_number(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        let sign = if v > 0.0 { "" } else { "-" };
        format!("{sign}Infinity")
    } else if v == 0.0 {
        "0".to_string()
    } else {
        v.to_string()
    }
}

// Largest integer an f64 holds exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Serialize whole numbers without a fractional part, matching `JSON.stringify`.
pub(crate) fn serialize_js_number<S: Serializer>(v: &f64, s: S) -> Result<S::Ok, S::Error> {
    if v.fract() == 0.0 && v.abs() < MAX_SAFE_INTEGER {
        s.serialize_i64(*v as i64)
    } else {
        s.serialize_f64(*v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qty_coercion_floors_at_one() {
        assert_eq!(coerce_qty("0"), 1);
        assert_eq!(coerce_qty(""), 1);
        assert_eq!(coerce_qty("-5"), 1);
        assert_eq!(coerce_qty("3.7"), 3);
        assert_eq!(coerce_qty("12abc"), 12);
        assert_eq!(coerce_qty("abc"), 1);
        assert_eq!(coerce_qty("  7"), 7);
    }

    #[test]
    fn number_coercion_keeps_empty_marker() {
        assert_eq!(coerce_number(""), None);
        assert_eq!(coerce_number("101.5"), Some(101.5));
        assert!(coerce_number("abc").unwrap().is_nan());
    }

    #[test]
    fn selectors_store_raw_text() {
        let mut leg = Leg::new();
        leg.set_field(LegField::Kind, "straddle");
        leg.set_field(LegField::Side, "short");
        assert_eq!(leg.kind, "straddle");
        assert_eq!(leg.option_kind(), None);
        assert_eq!(leg.leg_side(), Some(LegSide::Short));
    }

    #[test]
    fn field_names_roundtrip() {
        for field in LegField::ALL {
            assert_eq!(field.name().parse::<LegField>(), Ok(field));
        }
        assert_eq!(
            "strike".parse::<LegField>(),
            Err(LegError::UnknownField("strike".into()))
        );
    }

    #[test]
    fn field_values_print_like_inputs() {
        let mut leg = Leg::new();
        assert_eq!(leg.field_value(LegField::Strike), "");
        leg.set_field(LegField::Strike, "100");
        leg.set_field(LegField::Price, "2.25");
        assert_eq!(leg.field_value(LegField::Strike), "100");
        assert_eq!(leg.field_value(LegField::Price), "2.25");
        assert_eq!(leg.field_value(LegField::Qty), "1");
    }
}
