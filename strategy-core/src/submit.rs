use thiserror::Error;

use crate::leg::Leg;
use crate::payload::{serialize_legs, SerializedLegs};

/// Stop must exceed the largest strike by this factor to be left alone.
pub const STOP_MIN_RATIO: f64 = 1.3;
/// Replacement stop, as a multiple of the largest strike.
pub const STOP_EXTEND_RATIO: f64 = 1.7;

/// Reasons the form refuses to submit. `Display` is the message shown to the user.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SubmitError {
    #[error("Please ensure: step > 0")]
    NonPositiveStep,
    #[error("Please ensure: stop > start")]
    UnorderedDomain,
    #[error("Please fill the first leg (action, type, strike, premium).")]
    IncompleteFirstLeg,
    #[error("could not encode legs: {0}")]
    Encode(String),
}

/// Chart domain as typed into the start/stop/step inputs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Domain {
    pub start: f64,
    pub stop: f64,
    pub step: f64,
}

impl Domain {
    pub fn from_raw(start: &str, stop: &str, step: &str) -> Self {
        Self {
            start: form_number(start),
            stop: form_number(stop),
            step: form_number(step),
        }
    }
}

/// Number read from a text input: blank is 0, anything unparsable is NaN.
pub fn form_number(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        0.0
    } else {
        raw.parse().unwrap_or(f64::NAN)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitRules {
    /// Also refuse submission when stop is not after start.
    pub enforce_domain_order: bool,
    /// Push stop out past the largest strike before checking.
    pub auto_extend_stop: bool,
}

impl Default for SubmitRules {
    fn default() -> Self {
        Self {
            enforce_domain_order: true,
            auto_extend_stop: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitDecision {
    /// New value for the stop input; applied whether or not submission proceeds.
    pub stop_override: Option<f64>,
    pub outcome: Result<SerializedLegs, SubmitError>,
}

/// Stop value to use instead of `stop` when it does not clear the largest finite strike
/// by [`STOP_MIN_RATIO`]. `None` when no leg has a strike or `stop` is already wide enough.
pub fn extended_stop(legs: &[Leg], stop: f64) -> Option<f64> {
    let biggest = legs
        .iter()
        .filter_map(|l| l.strike)
        .filter(|k| k.is_finite())
        .fold(None, |acc: Option<f64>, k| Some(acc.map_or(k, |m| m.max(k))))?;
    if stop > 0.0 && stop > biggest * STOP_MIN_RATIO {
        None
    } else {
        Some(biggest * STOP_EXTEND_RATIO)
    }
}

/// The first leg needs action, type, strike and premium before anything is sent.
pub fn first_leg_complete(leg: &Leg) -> bool {
    !leg.kind.is_empty() && !leg.side.is_empty() && leg.strike.is_some() && leg.price.is_some()
}

/// Run the submit-time checks and, if they pass, encode the legs for the hidden field.
pub fn prepare_submission(legs: &[Leg], domain: Domain, rules: &SubmitRules) -> SubmitDecision {
    let stop_override = if rules.auto_extend_stop {
        extended_stop(legs, domain.stop)
    } else {
        None
    };
    let stop = stop_override.unwrap_or(domain.stop);

    let outcome = check(legs, domain.start, stop, domain.step, rules).and_then(|()| {
        serialize_legs(legs).map_err(|e| SubmitError::Encode(e.to_string()))
    });

    SubmitDecision {
        stop_override,
        outcome,
    }
}

fn check(
    legs: &[Leg],
    start: f64,
    stop: f64,
    step: f64,
    rules: &SubmitRules,
) -> Result<(), SubmitError> {
    if !(step > 0.0) {
        return Err(SubmitError::NonPositiveStep);
    }
    if rules.enforce_domain_order && !(stop > start) {
        return Err(SubmitError::UnorderedDomain);
    }
    match legs.first() {
        Some(first) if first_leg_complete(first) => Ok(()),
        _ => Err(SubmitError::IncompleteFirstLeg),
    }
}
