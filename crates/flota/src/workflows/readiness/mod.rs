//! Sail-readiness ("zarpe") rules: expiry aggregation over ships and crew, the sail verdict,
//! and the guard that keeps crew with expired documents off a ship's roster.

mod aggregator;
mod guard;
pub mod report;
mod router;
mod rule;
mod service;
pub mod view;

#[cfg(test)]
mod tests;

pub use aggregator::{aggregate_expiry, EntityKind, ExpiryMap, ExpirySummary};
pub use guard::{AssignmentGuard, AssignmentRejection};
pub use report::{
    CrewOverview, CrewRow, EnrolmentReport, FleetOverview, RosterRow, ShipReadinessReport,
    ShipRow,
};
pub use router::readiness_router;
pub use rule::SailReadiness;
pub use service::{ReadinessService, ReadinessServiceError};
pub use view::{ExpiryCheck, Keyed, ListPhase, ListView, ViewTransitionError};
