use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::{info, warn};

use super::aggregator::{aggregate_expiry, ExpiryMap};
use super::guard::{AssignmentGuard, AssignmentRejection};
use super::report::{
    CrewOverview, EnrolmentReport, FleetOverview, RosterRow, ShipReadinessReport,
};
use super::rule::SailReadiness;
use super::view::{Keyed, ListView, ViewTransitionError};
use crate::workflows::expiry::{date_only, parse_date};
use crate::workflows::fleet::{
    CrewAssignment, CrewMemberId, CrewSummary, DirectoryError, Enrolment, FleetDirectory,
    NewDocument, ShipId, ShipSummary,
};

pub const LIST_LOAD_FAILED: &str = "No se pudo cargar el listado.";
pub const ROSTER_LOAD_FAILED: &str = "No se pudieron cargar los tripulantes.";
pub const ROSTER_ADD_FAILED: &str = "No se pudo agregar el tripulante.";
pub const CREW_ASSIGNED: &str = "Tripulante agregado.";
pub const NO_ENROLMENTS: &str = "Sin enroles para este tripulante.";
pub const CREW_REMOVED: &str = "Tripulante quitado.";
pub const ROSTER_REMOVE_FAILED: &str = "No se pudo quitar el tripulante.";
pub const EXPIRY_UPDATED: &str = "Fecha de caducidad actualizada.";
pub const EXPIRY_UPDATE_FAILED: &str = "No se pudo actualizar la fecha de caducidad.";
pub const SHIP_LOAD_FAILED: &str = "No se pudo cargar el barco.";

/// Read-model service computing expiry flags, sail readiness and guarded roster changes on
/// top of a `FleetDirectory`.
pub struct ReadinessService<D: ?Sized> {
    directory: Arc<D>,
    guard: AssignmentGuard<D>,
}

impl<D> ReadinessService<D>
where
    D: FleetDirectory + ?Sized + 'static,
{
    pub fn new(directory: Arc<D>) -> Self {
        let guard = AssignmentGuard::new(directory.clone());
        Self { directory, guard }
    }

    pub fn directory(&self) -> &Arc<D> {
        &self.directory
    }

    /// Ship list with per-ship expiry flags. Fails only when the listing itself fails.
    pub async fn fleet_overview(
        &self,
        today: NaiveDate,
    ) -> Result<FleetOverview, ReadinessServiceError> {
        let ships = self.directory.list_ships().await?;
        let expiry = self
            .ship_expiry(ships.iter().map(Keyed::key).collect(), today)
            .await;
        Ok(FleetOverview::new(ships, expiry))
    }

    /// Crew list with per-member expiry flags. Fails only when the listing itself fails.
    pub async fn crew_overview(
        &self,
        today: NaiveDate,
    ) -> Result<CrewOverview, ReadinessServiceError> {
        let crew = self.directory.list_crew().await?;
        let expiry = self
            .crew_expiry(crew.iter().map(Keyed::key).collect(), today)
            .await;
        Ok(CrewOverview::new(crew, expiry))
    }

    /// Reload a ship list view: listing first, then the expiry check.
    pub async fn refresh_fleet_view(
        &self,
        view: &mut ListView<ShipSummary>,
        today: NaiveDate,
    ) -> Result<(), ViewTransitionError> {
        refresh_view(view, self.directory.list_ships(), |keys| {
            self.ship_expiry(keys, today)
        })
        .await
    }

    /// Reload a crew list view: listing first, then the expiry check.
    pub async fn refresh_crew_view(
        &self,
        view: &mut ListView<CrewSummary>,
        today: NaiveDate,
    ) -> Result<(), ViewTransitionError> {
        refresh_view(view, self.directory.list_crew(), |keys| {
            self.crew_expiry(keys, today)
        })
        .await
    }

    /// Sail readiness of one ship. An unknown ship is an error; every other lookup failure
    /// degrades the report instead: the ship's own documents default to "not expired" and an
    /// unreadable roster yields no crew.
    pub async fn ship_readiness(
        &self,
        ship: &ShipId,
        today: NaiveDate,
    ) -> Result<ShipReadinessReport, ReadinessServiceError> {
        let profile = async {
            match self.directory.ship(ship).await {
                Ok(profile) => Ok(Some(profile.name)),
                Err(DirectoryError::NotFound) => Err(DirectoryError::NotFound),
                Err(err) => {
                    warn!(ship = %ship, error = %err, "ship profile unavailable");
                    Ok(None)
                }
            }
        };

        let own_documents = async {
            match self.directory.ship_documents(ship).await {
                Ok(documents) => documents.iter().any(|doc| doc.is_expired(today)),
                Err(err) => {
                    warn!(ship = %ship, error = %err, "ship documents unavailable");
                    false
                }
            }
        };

        let crew_check = async {
            match self.directory.ship_crew(ship).await {
                Ok(roster) => {
                    let ids = roster_ids(&roster);
                    let expiry = self.crew_expiry(ids, today).await;
                    (roster, expiry, None)
                }
                Err(err) => {
                    warn!(ship = %ship, error = %err, "ship roster unavailable");
                    (
                        Vec::new(),
                        ExpiryMap::default(),
                        Some(err.user_message(ROSTER_LOAD_FAILED)),
                    )
                }
            }
        };

        let (profile, ship_documents_expired, (roster, crew_expiry, crew_error)) =
            futures::join!(profile, own_documents, crew_check);
        let ship_name = profile?;

        let crew_expired_count = crew_expiry.expired_count();
        let readiness = SailReadiness::evaluate(ship_documents_expired, crew_expired_count);
        let crew = roster
            .into_iter()
            .map(|assignment| RosterRow {
                has_expired_documents: crew_expiry.has_expired(&assignment.member_id),
                assignment,
            })
            .collect();

        Ok(ShipReadinessReport {
            ship_id: ship.clone(),
            ship_name,
            ship_documents_expired,
            crew,
            crew_expiry,
            crew_expired_count,
            warning: readiness.warning(),
            readiness,
            crew_error,
        })
    }

    /// Add a crew member to a ship's roster once the guard has vetted their documents.
    pub async fn assign_crew(
        &self,
        ship: &ShipId,
        candidate: Option<&CrewMemberId>,
        today: NaiveDate,
    ) -> Result<CrewMemberId, ReadinessServiceError> {
        let candidate = AssignmentGuard::<D>::candidate(candidate)?;
        let roster = self.directory.ship_crew(ship).await?;
        let member = self.guard.vet(Some(&candidate), &roster, today).await?;

        self.directory
            .assign_crew(ship, &member)
            .await
            .map_err(ReadinessServiceError::Roster)?;

        info!(ship = %ship, crew_member = %member, "crew member assigned");
        Ok(member)
    }

    /// Take a crew member off a ship's roster. No document check applies.
    pub async fn remove_crew(
        &self,
        ship: &ShipId,
        member: Option<&CrewMemberId>,
    ) -> Result<CrewMemberId, ReadinessServiceError> {
        let member = AssignmentGuard::<D>::candidate(member)?;
        self.directory
            .remove_crew(ship, &member)
            .await
            .map_err(ReadinessServiceError::RosterRemoval)?;

        info!(ship = %ship, crew_member = %member, "crew member removed");
        Ok(member)
    }

    /// Crew members not yet on the ship's roster.
    pub async fn available_crew(
        &self,
        ship: &ShipId,
    ) -> Result<Vec<CrewSummary>, ReadinessServiceError> {
        let (crew, roster) =
            futures::join!(self.directory.list_crew(), self.directory.ship_crew(ship));
        let (crew, roster) = (crew?, roster?);

        Ok(crew
            .into_iter()
            .filter(|member| !roster.iter().any(|entry| entry.member_id == member.id))
            .collect())
    }

    /// Ships whose roster currently includes `member`. Rosters that cannot be read are
    /// skipped.
    pub async fn enrolments(
        &self,
        member: &CrewMemberId,
    ) -> Result<EnrolmentReport, ReadinessServiceError> {
        let ships = self.directory.list_ships().await?;
        let directory = &self.directory;

        let lookups = ships.into_iter().map(|ship| async move {
            let roster = directory.ship_crew(&ship.id).await;
            match roster {
                Ok(roster) => roster
                    .into_iter()
                    .find(|entry| &entry.member_id == member)
                    .map(|entry| Enrolment {
                        ship_id: ship.id,
                        ship_name: ship.name,
                        date: ship.date,
                        created_at: entry.created_at,
                    }),
                Err(err) => {
                    warn!(
                        ship = %ship.id,
                        error = %err,
                        "roster unavailable for enrolment lookup"
                    );
                    None
                }
            }
        });

        let enrolments: Vec<Enrolment> = join_all(lookups).await.into_iter().flatten().collect();
        let message = if enrolments.is_empty() {
            NO_ENROLMENTS.to_string()
        } else {
            String::new()
        };

        Ok(EnrolmentReport {
            crew_member: member.clone(),
            enrolments,
            message,
        })
    }

    /// Attach a document to a ship; a blank expiry is stored as "never expires".
    pub async fn register_ship_document(
        &self,
        ship: &ShipId,
        kind: &str,
        file_path: &str,
        expires_on: Option<&str>,
    ) -> Result<NewDocument, ReadinessServiceError> {
        if kind.trim().is_empty() || file_path.trim().is_empty() {
            return Err(ReadinessServiceError::IncompleteDocument);
        }

        let document = NewDocument::new(kind.trim(), file_path.trim(), expires_on);
        self.directory
            .add_ship_document(ship, document.clone())
            .await?;
        info!(
            ship = %ship,
            kind = %document.kind,
            expires_on = %document.expires_on,
            "ship document registered"
        );
        Ok(document)
    }

    /// Change the expiry of an existing ship document; a blank expiry becomes "never expires".
    pub async fn update_ship_document_expiry(
        &self,
        ship: &ShipId,
        file_path: &str,
        kind: &str,
        expires_on: Option<&str>,
    ) -> Result<NewDocument, ReadinessServiceError> {
        if file_path.trim().is_empty() {
            return Err(ReadinessServiceError::UnknownDocument);
        }

        let document = NewDocument::new(kind.trim(), file_path.trim(), expires_on);
        self.directory
            .update_ship_document_expiry(ship, document.clone())
            .await
            .map_err(ReadinessServiceError::DocumentUpdate)?;
        info!(
            ship = %ship,
            file = %document.file_path,
            expires_on = %document.expires_on,
            "ship document expiry updated"
        );
        Ok(document)
    }

    /// Attach a personal document to a crew member. Unlike ship documents, crew documents
    /// always carry a real expiry date.
    pub async fn register_crew_document(
        &self,
        member: &CrewMemberId,
        kind: &str,
        file_path: &str,
        expires_on: Option<&str>,
    ) -> Result<NewDocument, ReadinessServiceError> {
        if kind.trim().is_empty() || file_path.trim().is_empty() {
            return Err(ReadinessServiceError::IncompleteDocument);
        }

        let expiry = date_only(expires_on);
        if expiry.is_empty() {
            return Err(ReadinessServiceError::MissingExpiry);
        }
        parse_date(&expiry).map_err(|_| ReadinessServiceError::InvalidExpiry(expiry.clone()))?;

        let document = NewDocument {
            kind: kind.trim().to_string(),
            file_path: file_path.trim().to_string(),
            expires_on: expiry,
        };
        self.directory
            .add_crew_document(member, document.clone())
            .await?;
        info!(
            crew_member = %member,
            kind = %document.kind,
            expires_on = %document.expires_on,
            "crew document registered"
        );
        Ok(document)
    }

    async fn ship_expiry(&self, ids: Vec<ShipId>, today: NaiveDate) -> ExpiryMap<ShipId> {
        let directory = &self.directory;
        aggregate_expiry(ids, today, |id| async move {
            directory.ship_documents(&id).await
        })
        .await
    }

    async fn crew_expiry(
        &self,
        ids: Vec<CrewMemberId>,
        today: NaiveDate,
    ) -> ExpiryMap<CrewMemberId> {
        let directory = &self.directory;
        aggregate_expiry(ids, today, |id| async move {
            directory.crew_documents(&id).await
        })
        .await
    }
}

fn roster_ids(roster: &[CrewAssignment]) -> Vec<CrewMemberId> {
    roster
        .iter()
        .filter(|entry| !entry.member_id.0.is_empty())
        .map(|entry| entry.member_id.clone())
        .collect()
}

async fn refresh_view<R, L, C, Fut>(
    view: &mut ListView<R>,
    listing: L,
    check: C,
) -> Result<(), ViewTransitionError>
where
    R: Keyed,
    L: Future<Output = Result<Vec<R>, DirectoryError>>,
    C: FnOnce(Vec<R::Key>) -> Fut,
    Fut: Future<Output = ExpiryMap<R::Key>>,
{
    view.begin_load();
    let rows = match listing.await {
        Ok(rows) => rows,
        Err(err) => {
            warn!(error = %err, "listing failed; clearing expiry state");
            return view.fail_load(err.user_message(LIST_LOAD_FAILED));
        }
    };

    view.finish_load(rows)?;
    let keys = view.begin_expiry_check()?;
    if keys.is_empty() {
        return Ok(());
    }

    let expiry = check(keys).await;
    view.finish_expiry_check(expiry)
}

/// Error raised by the readiness service.
#[derive(Debug, thiserror::Error)]
pub enum ReadinessServiceError {
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Rejected(#[from] AssignmentRejection),
    #[error("roster update failed: {0}")]
    Roster(#[source] DirectoryError),
    #[error("roster removal failed: {0}")]
    RosterRemoval(#[source] DirectoryError),
    #[error("document expiry update failed: {0}")]
    DocumentUpdate(#[source] DirectoryError),
    #[error("document type and file path are required")]
    IncompleteDocument,
    #[error("document file path is required")]
    UnknownDocument,
    #[error("crew documents require an expiry date")]
    MissingExpiry,
    #[error("expiry '{0}' is not a YYYY-MM-DD date")]
    InvalidExpiry(String),
}

impl ReadinessServiceError {
    /// Short user-facing message for the failed action.
    pub fn message(&self) -> String {
        match self {
            ReadinessServiceError::Directory(DirectoryError::NotFound) => {
                SHIP_LOAD_FAILED.to_string()
            }
            ReadinessServiceError::Directory(err) => err.user_message(LIST_LOAD_FAILED),
            ReadinessServiceError::Rejected(rejection) => rejection.message().to_string(),
            ReadinessServiceError::Roster(_) => ROSTER_ADD_FAILED.to_string(),
            ReadinessServiceError::RosterRemoval(_) => ROSTER_REMOVE_FAILED.to_string(),
            ReadinessServiceError::DocumentUpdate(err) => err.user_message(EXPIRY_UPDATE_FAILED),
            ReadinessServiceError::IncompleteDocument => {
                "Indica el tipo de documento y el archivo.".to_string()
            }
            ReadinessServiceError::UnknownDocument => {
                "No se pudo identificar el documento.".to_string()
            }
            ReadinessServiceError::MissingExpiry | ReadinessServiceError::InvalidExpiry(_) => {
                "Selecciona la fecha de caducidad.".to_string()
            }
        }
    }
}
