use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::workflows::fleet::{CrewAssignment, CrewMemberId, DirectoryError, FleetDirectory};

/// Reasons a crew member cannot be added to a ship's roster.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssignmentRejection {
    #[error("no crew member selected")]
    NoCandidate,
    #[error("crew member {0} is already on the roster")]
    AlreadyAssigned(CrewMemberId),
    #[error("crew member {0} has expired documents")]
    ExpiredDocuments(CrewMemberId),
    #[error("documents of crew member {member} could not be verified: {source}")]
    Unverifiable {
        member: CrewMemberId,
        #[source]
        source: DirectoryError,
    },
}

impl AssignmentRejection {
    /// Blocking message shown next to the roster form.
    pub fn message(&self) -> &'static str {
        match self {
            AssignmentRejection::NoCandidate => "Selecciona un tripulante.",
            AssignmentRejection::AlreadyAssigned(_) => {
                "No se puede agregar: el tripulante ya está asignado a este barco."
            }
            AssignmentRejection::ExpiredDocuments(_) => {
                "No se puede agregar: el tripulante tiene documentos caducados."
            }
            AssignmentRejection::Unverifiable { .. } => {
                "No se puede agregar: no se pudieron validar los documentos del tripulante."
            }
        }
    }
}

/// Vets a roster candidate before the add-to-roster call is made.
///
/// Unlike the list aggregations, a failed document lookup blocks the assignment.
pub struct AssignmentGuard<D: ?Sized> {
    directory: Arc<D>,
}

impl<D: ?Sized> Clone for AssignmentGuard<D> {
    fn clone(&self) -> Self {
        Self {
            directory: self.directory.clone(),
        }
    }
}

impl<D> AssignmentGuard<D>
where
    D: FleetDirectory + ?Sized,
{
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }

    /// A blank selection is no selection.
    pub fn candidate(
        candidate: Option<&CrewMemberId>,
    ) -> Result<CrewMemberId, AssignmentRejection> {
        match candidate {
            Some(member) if !member.0.trim().is_empty() => Ok(member.clone()),
            _ => Err(AssignmentRejection::NoCandidate),
        }
    }

    pub async fn vet(
        &self,
        candidate: Option<&CrewMemberId>,
        roster: &[CrewAssignment],
        today: NaiveDate,
    ) -> Result<CrewMemberId, AssignmentRejection> {
        let member = Self::candidate(candidate)?;

        if roster.iter().any(|entry| entry.member_id == member) {
            return Err(AssignmentRejection::AlreadyAssigned(member));
        }

        let documents = match self.directory.crew_documents(&member).await {
            Ok(documents) => documents,
            Err(source) => {
                warn!(
                    crew_member = %member,
                    error = %source,
                    "assignment blocked: documents unavailable"
                );
                return Err(AssignmentRejection::Unverifiable { member, source });
            }
        };

        if let Some(expired) = documents.iter().find(|doc| doc.is_expired(today)) {
            info!(
                crew_member = %member,
                document = %expired.kind,
                "assignment blocked: expired document"
            );
            return Err(AssignmentRejection::ExpiredDocuments(member));
        }

        Ok(member)
    }
}
