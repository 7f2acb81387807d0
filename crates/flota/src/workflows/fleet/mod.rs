//! Fleet records as the backend exposes them, and the seam used to reach the backend.

pub mod directory;
pub mod domain;
mod http;

pub use directory::{backend_message, DirectoryError, FleetDirectory};
pub use domain::{
    CrewAssignment, CrewMemberId, CrewSummary, Document, Enrolment, NewDocument, ShipId,
    ShipSummary,
};
pub use http::HttpFleetDirectory;
