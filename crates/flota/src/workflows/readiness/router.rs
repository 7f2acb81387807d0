use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::guard::AssignmentRejection;
use super::service::{
    ReadinessService, ReadinessServiceError, CREW_ASSIGNED, CREW_REMOVED, EXPIRY_UPDATED,
};
use crate::workflows::expiry::parse_date;
use crate::workflows::fleet::{CrewMemberId, DirectoryError, FleetDirectory, ShipId};

/// Router builder exposing the readiness read-models and the guarded roster endpoint.
pub fn readiness_router<D>(service: Arc<ReadinessService<D>>) -> Router
where
    D: FleetDirectory + ?Sized + 'static,
{
    Router::new()
        .route("/api/v1/barcos/readiness", get(fleet_handler::<D>))
        .route("/api/v1/barcos/:ship_id/zarpe", get(zarpe_handler::<D>))
        .route(
            "/api/v1/barcos/:ship_id/tripulantes",
            post(assign_handler::<D>),
        )
        .route(
            "/api/v1/barcos/:ship_id/tripulantes/:member_id",
            delete(remove_handler::<D>),
        )
        .route(
            "/api/v1/barcos/:ship_id/tripulantes/disponibles",
            get(available_handler::<D>),
        )
        .route(
            "/api/v1/barcos/:ship_id/documentos",
            post(document_handler::<D>).put(expiry_update_handler::<D>),
        )
        .route("/api/v1/tripulantes/readiness", get(crew_handler::<D>))
        .route(
            "/api/v1/tripulantes/:member_id/documentos",
            post(crew_document_handler::<D>),
        )
        .route(
            "/api/v1/tripulantes/:member_id/enroles",
            get(enrolments_handler::<D>),
        )
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TodayQuery {
    #[serde(default)]
    today: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AssignRequest {
    #[serde(rename = "idTripulante", default)]
    crew_member: Option<CrewMemberId>,
    #[serde(default)]
    today: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DocumentRequest {
    #[serde(rename = "tipo", default)]
    kind: String,
    #[serde(rename = "archivo_path", default)]
    file_path: String,
    #[serde(rename = "fecha_caducidad", default)]
    expires_on: Option<String>,
}

const INVALID_TODAY: &str = "Fecha inválida: usa el formato AAAA-MM-DD.";

/// Blank or missing means the server's local date; anything else must be `YYYY-MM-DD`.
fn resolve_today(raw: Option<&str>) -> Result<NaiveDate, Response> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(Local::now().date_naive()),
        Some(value) => parse_date(value).map_err(|error| {
            let payload = json!({ "error": error, "mensaje": INVALID_TODAY });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }),
    }
}

fn error_response(error: ReadinessServiceError) -> Response {
    let status = match &error {
        ReadinessServiceError::Rejected(AssignmentRejection::NoCandidate)
        | ReadinessServiceError::IncompleteDocument
        | ReadinessServiceError::UnknownDocument
        | ReadinessServiceError::MissingExpiry
        | ReadinessServiceError::InvalidExpiry(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ReadinessServiceError::Rejected(_) => StatusCode::CONFLICT,
        ReadinessServiceError::Directory(DirectoryError::NotFound)
        | ReadinessServiceError::RosterRemoval(DirectoryError::NotFound) => StatusCode::NOT_FOUND,
        ReadinessServiceError::Directory(_)
        | ReadinessServiceError::Roster(_)
        | ReadinessServiceError::RosterRemoval(_)
        | ReadinessServiceError::DocumentUpdate(_) => StatusCode::BAD_GATEWAY,
    };

    let payload = json!({
        "error": error.to_string(),
        "mensaje": error.message(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn fleet_handler<D>(
    State(service): State<Arc<ReadinessService<D>>>,
    Query(query): Query<TodayQuery>,
) -> Response
where
    D: FleetDirectory + ?Sized + 'static,
{
    let today = match resolve_today(query.today.as_deref()) {
        Ok(today) => today,
        Err(response) => return response,
    };
    match service.fleet_overview(today).await {
        Ok(overview) => (StatusCode::OK, axum::Json(overview)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn crew_handler<D>(
    State(service): State<Arc<ReadinessService<D>>>,
    Query(query): Query<TodayQuery>,
) -> Response
where
    D: FleetDirectory + ?Sized + 'static,
{
    let today = match resolve_today(query.today.as_deref()) {
        Ok(today) => today,
        Err(response) => return response,
    };
    match service.crew_overview(today).await {
        Ok(overview) => (StatusCode::OK, axum::Json(overview)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn zarpe_handler<D>(
    State(service): State<Arc<ReadinessService<D>>>,
    Path(ship_id): Path<String>,
    Query(query): Query<TodayQuery>,
) -> Response
where
    D: FleetDirectory + ?Sized + 'static,
{
    let today = match resolve_today(query.today.as_deref()) {
        Ok(today) => today,
        Err(response) => return response,
    };
    match service.ship_readiness(&ShipId(ship_id), today).await {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn assign_handler<D>(
    State(service): State<Arc<ReadinessService<D>>>,
    Path(ship_id): Path<String>,
    axum::Json(request): axum::Json<AssignRequest>,
) -> Response
where
    D: FleetDirectory + ?Sized + 'static,
{
    let ship = ShipId(ship_id);
    let today = match resolve_today(request.today.as_deref()) {
        Ok(today) => today,
        Err(response) => return response,
    };
    match service
        .assign_crew(&ship, request.crew_member.as_ref(), today)
        .await
    {
        Ok(member) => {
            let payload = json!({
                "idBarco": ship,
                "idTripulante": member,
                "mensaje": CREW_ASSIGNED,
            });
            (StatusCode::CREATED, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn remove_handler<D>(
    State(service): State<Arc<ReadinessService<D>>>,
    Path((ship_id, member_id)): Path<(String, String)>,
) -> Response
where
    D: FleetDirectory + ?Sized + 'static,
{
    let ship = ShipId(ship_id);
    match service
        .remove_crew(&ship, Some(&CrewMemberId(member_id)))
        .await
    {
        Ok(member) => {
            let payload = json!({
                "idBarco": ship,
                "idTripulante": member,
                "mensaje": CREW_REMOVED,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn available_handler<D>(
    State(service): State<Arc<ReadinessService<D>>>,
    Path(ship_id): Path<String>,
) -> Response
where
    D: FleetDirectory + ?Sized + 'static,
{
    match service.available_crew(&ShipId(ship_id)).await {
        Ok(crew) => (StatusCode::OK, axum::Json(json!({ "tripulantes": crew }))).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn document_handler<D>(
    State(service): State<Arc<ReadinessService<D>>>,
    Path(ship_id): Path<String>,
    axum::Json(request): axum::Json<DocumentRequest>,
) -> Response
where
    D: FleetDirectory + ?Sized + 'static,
{
    let ship = ShipId(ship_id);
    match service
        .register_ship_document(
            &ship,
            &request.kind,
            &request.file_path,
            request.expires_on.as_deref(),
        )
        .await
    {
        Ok(document) => (StatusCode::CREATED, axum::Json(document)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn expiry_update_handler<D>(
    State(service): State<Arc<ReadinessService<D>>>,
    Path(ship_id): Path<String>,
    axum::Json(request): axum::Json<DocumentRequest>,
) -> Response
where
    D: FleetDirectory + ?Sized + 'static,
{
    match service
        .update_ship_document_expiry(
            &ShipId(ship_id),
            &request.file_path,
            &request.kind,
            request.expires_on.as_deref(),
        )
        .await
    {
        Ok(document) => {
            let payload = json!({ "documento": document, "mensaje": EXPIRY_UPDATED });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn crew_document_handler<D>(
    State(service): State<Arc<ReadinessService<D>>>,
    Path(member_id): Path<String>,
    axum::Json(request): axum::Json<DocumentRequest>,
) -> Response
where
    D: FleetDirectory + ?Sized + 'static,
{
    match service
        .register_crew_document(
            &CrewMemberId(member_id),
            &request.kind,
            &request.file_path,
            request.expires_on.as_deref(),
        )
        .await
    {
        Ok(document) => (StatusCode::CREATED, axum::Json(document)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn enrolments_handler<D>(
    State(service): State<Arc<ReadinessService<D>>>,
    Path(member_id): Path<String>,
) -> Response
where
    D: FleetDirectory + ?Sized + 'static,
{
    match service.enrolments(&CrewMemberId(member_id)).await {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(error) => error_response(error),
    }
}
