pub mod expiry;
pub mod fleet;
pub mod readiness;
