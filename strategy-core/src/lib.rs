//! Leg collection model for the option strategy form: per-field coercion, the
//! collection invariants, the submission payload and the submit-time checks.

pub mod leg;
pub mod payload;
pub mod store;
pub mod submit;

pub use leg::{
    coerce_number, coerce_qty, format_number, Leg, LegError, LegField, LegSide, OptionKind,
};
pub use payload::{is_submittable, parse_initial_legs, serialize_legs, SerializedLegs, SubmittedLeg};
pub use store::LegStore;
pub use submit::{prepare_submission, Domain, SubmitDecision, SubmitError, SubmitRules};
