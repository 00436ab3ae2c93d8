use strategy_core::{format_number, prepare_submission, Domain, Leg};
use tracing::{debug, warn};

use crate::config::PageConfig;

/// Read/write access to the form's named inputs. Writing to a missing input is a no-op.
pub trait FormFields {
    fn value(&self, id: &str) -> Option<String>;
    fn set_value(&mut self, id: &str, value: &str);
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitVerdict {
    /// Payload written; let the browser submit.
    Proceed,
    /// Cancel the submit and show this message.
    Abort(String),
}

/// Submit-time handling: extend the stop input if needed, check the domain and first leg,
/// then write the legs payload into the hidden field. On abort the payload field is left
/// as it was.
pub fn handle_submit<F: FormFields>(
    legs: &[Leg],
    fields: &mut F,
    config: &PageConfig,
) -> SubmitVerdict {
    let ids = &config.ids;
    let read = |id: &str| fields.value(id).unwrap_or_default();
    let domain = Domain::from_raw(&read(&ids.start), &read(&ids.stop), &read(&ids.step));

    let decision = prepare_submission(legs, domain, &config.submit_rules());
    if let Some(stop) = decision.stop_override {
        debug!(stop, "extending stop past the largest strike");
        fields.set_value(&ids.stop, &format_number(stop));
    }

    match decision.outcome {
        Ok(payload) => {
            if !payload.dropped.is_empty() {
                debug!(dropped = ?payload.dropped, "incomplete legs left out of the payload");
            }
            fields.set_value(&ids.legs_json, &payload.json);
            SubmitVerdict::Proceed
        }
        Err(err) => {
            warn!(%err, "submission blocked");
            SubmitVerdict::Abort(err.to_string())
        }
    }
}
