//! Document expiry primitives shared by every readiness check.
//!
//! Expiry dates travel as loosely formatted strings: plain `YYYY-MM-DD`, full ISO timestamps,
//! or the `2999-12-31` sentinel the backend stores for documents that never expire.

mod dates;
mod predicate;

pub use dates::{date_only, expiry_for_submission, expiry_label, parse_date, NO_EXPIRY_SENTINEL};
pub use predicate::{any_expired, is_expired};
