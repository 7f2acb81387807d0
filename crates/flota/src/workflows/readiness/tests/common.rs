use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::workflows::fleet::{
    CrewAssignment, CrewMemberId, CrewSummary, DirectoryError, Document, FleetDirectory,
    NewDocument, ShipId, ShipSummary,
};
use crate::workflows::readiness::ReadinessService;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
}

pub(super) fn document(kind: &str, expires_on: Option<&str>) -> Document {
    Document {
        id: None,
        kind: kind.to_string(),
        file_path: format!("docs/{}.pdf", kind.to_lowercase()),
        created_at: None,
        expires_on: expires_on.map(str::to_string),
    }
}

pub(super) fn ship(id: &str, name: &str) -> ShipSummary {
    ShipSummary {
        id: ShipId::from(id),
        name: name.to_string(),
        date: "2024-05-01".to_string(),
        crew_count: 0,
    }
}

pub(super) fn crew_member(id: &str, name: &str) -> CrewSummary {
    CrewSummary {
        id: CrewMemberId::from(id),
        name: name.to_string(),
        surname: "Pérez".to_string(),
        phone: "600000000".to_string(),
        nationality: "ES".to_string(),
        position: "Marinero".to_string(),
    }
}

#[derive(Default)]
struct FleetState {
    ships: Vec<ShipSummary>,
    crew: Vec<CrewSummary>,
    rosters: HashMap<ShipId, Vec<CrewAssignment>>,
    ship_documents: HashMap<ShipId, Vec<Document>>,
    crew_documents: HashMap<CrewMemberId, Vec<Document>>,
    failing_ships: HashSet<ShipId>,
    failing_rosters: HashSet<ShipId>,
    failing_crew: HashSet<CrewMemberId>,
    listing_down: bool,
    roster_writes_down: bool,
    profiles_down: bool,
    crew_document_calls: Vec<CrewMemberId>,
    registered: Vec<(ShipId, NewDocument)>,
    crew_registered: Vec<(CrewMemberId, NewDocument)>,
}

/// Scriptable in-memory backend.
#[derive(Default, Clone)]
pub(super) struct FakeDirectory {
    state: Arc<Mutex<FleetState>>,
}

impl FakeDirectory {
    fn with<T>(&self, f: impl FnOnce(&mut FleetState) -> T) -> T {
        let mut guard = self.state.lock().expect("fake directory mutex poisoned");
        f(&mut guard)
    }

    pub(super) fn add_ship(&self, ship: ShipSummary, documents: Vec<Document>) {
        self.with(|state| {
            state.ship_documents.insert(ship.id.clone(), documents);
            state.rosters.entry(ship.id.clone()).or_default();
            state.ships.push(ship);
        });
    }

    pub(super) fn add_crew(&self, member: CrewSummary, documents: Vec<Document>) {
        self.with(|state| {
            state.crew_documents.insert(member.id.clone(), documents);
            state.crew.push(member);
        });
    }

    pub(super) fn enrol(&self, ship: &str, member: &str) {
        self.with(|state| {
            state
                .rosters
                .entry(ShipId::from(ship))
                .or_default()
                .push(CrewAssignment::new(CrewMemberId::from(member)));
        });
    }

    pub(super) fn fail_ship_documents(&self, ship: &str) {
        self.with(|state| state.failing_ships.insert(ShipId::from(ship)));
    }

    pub(super) fn fail_roster(&self, ship: &str) {
        self.with(|state| state.failing_rosters.insert(ShipId::from(ship)));
    }

    pub(super) fn fail_crew_documents(&self, member: &str) {
        self.with(|state| state.failing_crew.insert(CrewMemberId::from(member)));
    }

    pub(super) fn take_listing_down(&self) {
        self.with(|state| state.listing_down = true);
    }

    pub(super) fn take_roster_writes_down(&self) {
        self.with(|state| state.roster_writes_down = true);
    }

    pub(super) fn take_profiles_down(&self) {
        self.with(|state| state.profiles_down = true);
    }

    pub(super) fn roster(&self, ship: &str) -> Vec<CrewMemberId> {
        self.with(|state| {
            state
                .rosters
                .get(&ShipId::from(ship))
                .map(|roster| roster.iter().map(|entry| entry.member_id.clone()).collect())
                .unwrap_or_default()
        })
    }

    pub(super) fn crew_document_calls(&self) -> Vec<CrewMemberId> {
        self.with(|state| state.crew_document_calls.clone())
    }

    pub(super) fn registered(&self) -> Vec<(ShipId, NewDocument)> {
        self.with(|state| state.registered.clone())
    }

    pub(super) fn crew_registered(&self) -> Vec<(CrewMemberId, NewDocument)> {
        self.with(|state| state.crew_registered.clone())
    }

    pub(super) fn ship_documents_of(&self, ship: &str) -> Vec<Document> {
        self.with(|state| {
            state
                .ship_documents
                .get(&ShipId::from(ship))
                .cloned()
                .unwrap_or_default()
        })
    }
}

fn unavailable() -> DirectoryError {
    DirectoryError::Transport("connection refused".to_string())
}

#[async_trait]
impl FleetDirectory for FakeDirectory {
    async fn list_ships(&self) -> Result<Vec<ShipSummary>, DirectoryError> {
        self.with(|state| {
            if state.listing_down {
                Err(unavailable())
            } else {
                Ok(state.ships.clone())
            }
        })
    }

    async fn ship(&self, ship: &ShipId) -> Result<ShipSummary, DirectoryError> {
        self.with(|state| {
            if state.profiles_down {
                return Err(unavailable());
            }
            state
                .ships
                .iter()
                .find(|entry| &entry.id == ship)
                .cloned()
                .ok_or(DirectoryError::NotFound)
        })
    }

    async fn ship_documents(&self, ship: &ShipId) -> Result<Vec<Document>, DirectoryError> {
        self.with(|state| {
            if state.failing_ships.contains(ship) {
                return Err(unavailable());
            }
            state
                .ship_documents
                .get(ship)
                .cloned()
                .ok_or(DirectoryError::NotFound)
        })
    }

    async fn ship_crew(&self, ship: &ShipId) -> Result<Vec<CrewAssignment>, DirectoryError> {
        self.with(|state| {
            if state.failing_rosters.contains(ship) {
                return Err(DirectoryError::Backend {
                    status: 500,
                    message: String::new(),
                });
            }
            Ok(state.rosters.get(ship).cloned().unwrap_or_default())
        })
    }

    async fn assign_crew(
        &self,
        ship: &ShipId,
        member: &CrewMemberId,
    ) -> Result<(), DirectoryError> {
        self.with(|state| {
            if state.roster_writes_down {
                return Err(unavailable());
            }
            state
                .rosters
                .entry(ship.clone())
                .or_default()
                .push(CrewAssignment::new(member.clone()));
            Ok(())
        })
    }

    async fn remove_crew(
        &self,
        ship: &ShipId,
        member: &CrewMemberId,
    ) -> Result<(), DirectoryError> {
        self.with(|state| {
            if state.roster_writes_down {
                return Err(unavailable());
            }
            let roster = state.rosters.get_mut(ship).ok_or(DirectoryError::NotFound)?;
            let before = roster.len();
            roster.retain(|entry| &entry.member_id != member);
            if roster.len() == before {
                Err(DirectoryError::NotFound)
            } else {
                Ok(())
            }
        })
    }

    async fn add_ship_document(
        &self,
        ship: &ShipId,
        document: NewDocument,
    ) -> Result<(), DirectoryError> {
        self.with(|state| {
            state.registered.push((ship.clone(), document.clone()));
            state
                .ship_documents
                .entry(ship.clone())
                .or_default()
                .push(document.into_document());
            Ok(())
        })
    }

    async fn update_ship_document_expiry(
        &self,
        ship: &ShipId,
        document: NewDocument,
    ) -> Result<(), DirectoryError> {
        self.with(|state| {
            let stored = state
                .ship_documents
                .get_mut(ship)
                .and_then(|documents| {
                    documents
                        .iter_mut()
                        .find(|doc| doc.file_path == document.file_path)
                })
                .ok_or(DirectoryError::NotFound)?;
            stored.expires_on = Some(document.expires_on);
            Ok(())
        })
    }

    async fn list_crew(&self) -> Result<Vec<CrewSummary>, DirectoryError> {
        self.with(|state| {
            if state.listing_down {
                Err(unavailable())
            } else {
                Ok(state.crew.clone())
            }
        })
    }

    async fn crew_documents(&self, member: &CrewMemberId) -> Result<Vec<Document>, DirectoryError> {
        self.with(|state| {
            state.crew_document_calls.push(member.clone());
            if state.failing_crew.contains(member) {
                return Err(unavailable());
            }
            Ok(state.crew_documents.get(member).cloned().unwrap_or_default())
        })
    }

    async fn add_crew_document(
        &self,
        member: &CrewMemberId,
        document: NewDocument,
    ) -> Result<(), DirectoryError> {
        self.with(|state| {
            state.crew_registered.push((member.clone(), document.clone()));
            state
                .crew_documents
                .entry(member.clone())
                .or_default()
                .push(document.into_document());
            Ok(())
        })
    }
}

pub(super) fn service(directory: &FakeDirectory) -> ReadinessService<FakeDirectory> {
    ReadinessService::new(Arc::new(directory.clone()))
}

/// Three ships: #2's documents cannot be read, #3 carries an expired certificate.
pub(super) fn three_ship_fleet() -> FakeDirectory {
    let directory = FakeDirectory::default();
    directory.add_ship(ship("1", "Virgen del Carmen"), Vec::new());
    directory.add_ship(
        ship("2", "Nuevo Horizonte"),
        vec![document("ISM", Some("2001-01-01"))],
    );
    directory.add_ship(
        ship("3", "Mar de Alborán"),
        vec![document("Navegabilidad", Some("2020-01-01"))],
    );
    directory.fail_ship_documents("2");
    directory
}
