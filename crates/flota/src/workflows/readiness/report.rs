use serde::Serialize;

use super::aggregator::{EntityKind, ExpiryMap, ExpirySummary};
use super::rule::SailReadiness;
use super::view::Keyed;
use crate::workflows::fleet::{
    CrewAssignment, CrewMemberId, CrewSummary, Enrolment, ShipId, ShipSummary,
};

impl Keyed for ShipSummary {
    type Key = ShipId;

    fn key(&self) -> ShipId {
        self.id.clone()
    }
}

impl Keyed for CrewSummary {
    type Key = CrewMemberId;

    fn key(&self) -> CrewMemberId {
        self.id.clone()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipRow {
    #[serde(flatten)]
    pub ship: ShipSummary,
    #[serde(rename = "tieneDocumentosCaducados")]
    pub has_expired_documents: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrewRow {
    #[serde(flatten)]
    pub member: CrewSummary,
    #[serde(rename = "tieneDocumentosCaducados")]
    pub has_expired_documents: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterRow {
    #[serde(flatten)]
    pub assignment: CrewAssignment,
    #[serde(rename = "tieneDocumentosCaducados")]
    pub has_expired_documents: bool,
}

/// Ship list with per-row expiry flags and the list banner.
#[derive(Debug, Clone, Serialize)]
pub struct FleetOverview {
    pub ships: Vec<ShipRow>,
    pub expiry: ExpiryMap<ShipId>,
    pub summary: ExpirySummary,
}

impl FleetOverview {
    pub fn new(ships: Vec<ShipSummary>, expiry: ExpiryMap<ShipId>) -> Self {
        let summary = ExpirySummary::from_map(EntityKind::Ship, &expiry);
        let ships = ships
            .into_iter()
            .map(|ship| ShipRow {
                has_expired_documents: expiry.has_expired(&ship.id),
                ship,
            })
            .collect();
        Self {
            ships,
            expiry,
            summary,
        }
    }
}

/// Crew list with per-row expiry flags and the list banner.
#[derive(Debug, Clone, Serialize)]
pub struct CrewOverview {
    pub crew: Vec<CrewRow>,
    pub expiry: ExpiryMap<CrewMemberId>,
    pub summary: ExpirySummary,
}

impl CrewOverview {
    pub fn new(crew: Vec<CrewSummary>, expiry: ExpiryMap<CrewMemberId>) -> Self {
        let summary = ExpirySummary::from_map(EntityKind::CrewMember, &expiry);
        let crew = crew
            .into_iter()
            .map(|member| CrewRow {
                has_expired_documents: expiry.has_expired(&member.id),
                member,
            })
            .collect();
        Self {
            crew,
            expiry,
            summary,
        }
    }
}

/// Everything the ship detail screen needs to decide whether the ship may sail.
#[derive(Debug, Clone, Serialize)]
pub struct ShipReadinessReport {
    pub ship_id: ShipId,
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub ship_name: Option<String>,
    pub ship_documents_expired: bool,
    pub crew: Vec<RosterRow>,
    pub crew_expiry: ExpiryMap<CrewMemberId>,
    pub crew_expired_count: usize,
    pub readiness: SailReadiness,
    #[serde(rename = "avisoZarpe")]
    pub warning: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crew_error: Option<String>,
}

impl ShipReadinessReport {
    pub fn may_sail(&self) -> bool {
        self.readiness.may_sail()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrolmentReport {
    pub crew_member: CrewMemberId,
    pub enrolments: Vec<Enrolment>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
}
