use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use flota::workflows::expiry::NO_EXPIRY_SENTINEL;
use flota::workflows::fleet::{
    CrewAssignment, CrewMemberId, CrewSummary, DirectoryError, Document, FleetDirectory,
    NewDocument, ShipId, ShipSummary,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default)]
struct FleetRecords {
    ships: Vec<ShipSummary>,
    crew: Vec<CrewSummary>,
    rosters: HashMap<ShipId, Vec<CrewAssignment>>,
    ship_documents: HashMap<ShipId, Vec<Document>>,
    crew_documents: HashMap<CrewMemberId, Vec<Document>>,
}

/// Fleet backend held in memory, used by the demo and by router tests.
#[derive(Default, Clone)]
pub(crate) struct InMemoryFleetDirectory {
    records: Arc<Mutex<FleetRecords>>,
}

fn document(kind: &str, owner: &str, expires_on: String) -> Document {
    Document {
        id: None,
        kind: kind.to_string(),
        file_path: format!("{owner}/{}.pdf", kind.to_lowercase().replace(' ', "-")),
        created_at: None,
        expires_on: Some(expires_on),
    }
}

fn ship(id: &str, name: &str, date: &str) -> ShipSummary {
    ShipSummary {
        id: ShipId::from(id),
        name: name.to_string(),
        date: date.to_string(),
        crew_count: 0,
    }
}

fn crew_member(id: &str, name: &str, surname: &str, position: &str) -> CrewSummary {
    CrewSummary {
        id: CrewMemberId::from(id),
        name: name.to_string(),
        surname: surname.to_string(),
        phone: String::new(),
        nationality: "ES".to_string(),
        position: position.to_string(),
    }
}

impl InMemoryFleetDirectory {
    /// Three ships and four crew members with expiries placed around `today`:
    /// ship 2 carries an expired certificate and crew member 12 an expired logbook.
    pub(crate) fn demo(today: NaiveDate) -> Self {
        let day = |offset: i64| (today + Duration::days(offset)).format("%Y-%m-%d").to_string();
        let mut records = FleetRecords::default();

        records.ships = vec![
            ship("1", "Virgen del Carmen", "2024-03-02"),
            ship("2", "Nuevo Horizonte", "2023-11-20"),
            ship("3", "Mar de Alborán", "2025-06-14"),
        ];
        records.ship_documents.insert(
            ShipId::from("1"),
            vec![document("Navegabilidad", "barcos/1", day(180))],
        );
        records.ship_documents.insert(
            ShipId::from("2"),
            vec![
                document("Navegabilidad", "barcos/2", day(90)),
                document("ISM", "barcos/2", day(-3)),
            ],
        );
        records.ship_documents.insert(
            ShipId::from("3"),
            vec![document("Seguro", "barcos/3", NO_EXPIRY_SENTINEL.to_string())],
        );

        records.crew = vec![
            crew_member("11", "Lucía", "Martín", "Patrón"),
            crew_member("12", "Mario", "Vidal", "Marinero"),
            crew_member("13", "Irene", "Soto", "Mecánica"),
            crew_member("14", "Pablo", "Ruiz", "Marinero"),
        ];
        records.crew_documents.insert(
            CrewMemberId::from("11"),
            vec![document("Libreta marítima", "tripulantes/11", day(200))],
        );
        records.crew_documents.insert(
            CrewMemberId::from("12"),
            vec![document("Libreta marítima", "tripulantes/12", day(-10))],
        );
        records.crew_documents.insert(
            CrewMemberId::from("13"),
            vec![document(
                "Certificado médico",
                "tripulantes/13",
                NO_EXPIRY_SENTINEL.to_string(),
            )],
        );

        for (ship, members) in [("1", &["11"][..]), ("2", &[][..]), ("3", &["12", "13"][..])] {
            records.rosters.insert(
                ShipId::from(ship),
                members
                    .iter()
                    .map(|member| CrewAssignment::new(CrewMemberId::from(*member)))
                    .collect(),
            );
        }
        for ship in records.ships.iter_mut() {
            ship.crew_count = records.rosters.get(&ship.id).map_or(0, |r| r.len() as u32);
        }

        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    fn records(&self) -> Result<MutexGuard<'_, FleetRecords>, DirectoryError> {
        self.records
            .lock()
            .map_err(|_| DirectoryError::Transport("in-memory fleet lock poisoned".to_string()))
    }
}

#[async_trait]
impl FleetDirectory for InMemoryFleetDirectory {
    async fn list_ships(&self) -> Result<Vec<ShipSummary>, DirectoryError> {
        Ok(self.records()?.ships.clone())
    }

    async fn ship(&self, ship: &ShipId) -> Result<ShipSummary, DirectoryError> {
        self.records()?
            .ships
            .iter()
            .find(|entry| &entry.id == ship)
            .cloned()
            .ok_or(DirectoryError::NotFound)
    }

    async fn ship_documents(&self, ship: &ShipId) -> Result<Vec<Document>, DirectoryError> {
        self.records()?
            .ship_documents
            .get(ship)
            .cloned()
            .ok_or(DirectoryError::NotFound)
    }

    async fn ship_crew(&self, ship: &ShipId) -> Result<Vec<CrewAssignment>, DirectoryError> {
        self.records()?
            .rosters
            .get(ship)
            .cloned()
            .ok_or(DirectoryError::NotFound)
    }

    async fn assign_crew(
        &self,
        ship: &ShipId,
        member: &CrewMemberId,
    ) -> Result<(), DirectoryError> {
        let mut records = self.records()?;
        let roster = records
            .rosters
            .get_mut(ship)
            .ok_or(DirectoryError::NotFound)?;
        roster.push(CrewAssignment::new(member.clone()));
        let count = roster.len() as u32;
        if let Some(entry) = records.ships.iter_mut().find(|entry| &entry.id == ship) {
            entry.crew_count = count;
        }
        Ok(())
    }

    async fn remove_crew(
        &self,
        ship: &ShipId,
        member: &CrewMemberId,
    ) -> Result<(), DirectoryError> {
        let mut records = self.records()?;
        let roster = records
            .rosters
            .get_mut(ship)
            .ok_or(DirectoryError::NotFound)?;
        let before = roster.len();
        roster.retain(|entry| &entry.member_id != member);
        if roster.len() == before {
            return Err(DirectoryError::NotFound);
        }
        let count = roster.len() as u32;
        if let Some(entry) = records.ships.iter_mut().find(|entry| &entry.id == ship) {
            entry.crew_count = count;
        }
        Ok(())
    }

    async fn add_ship_document(
        &self,
        ship: &ShipId,
        document: NewDocument,
    ) -> Result<(), DirectoryError> {
        self.records()?
            .ship_documents
            .get_mut(ship)
            .ok_or(DirectoryError::NotFound)?
            .push(document.into_document());
        Ok(())
    }

    async fn update_ship_document_expiry(
        &self,
        ship: &ShipId,
        document: NewDocument,
    ) -> Result<(), DirectoryError> {
        let mut records = self.records()?;
        let stored = records
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
    }

    async fn list_crew(&self) -> Result<Vec<CrewSummary>, DirectoryError> {
        Ok(self.records()?.crew.clone())
    }

    async fn crew_documents(&self, member: &CrewMemberId) -> Result<Vec<Document>, DirectoryError> {
        Ok(self
            .records()?
            .crew_documents
            .get(member)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_crew_document(
        &self,
        member: &CrewMemberId,
        document: NewDocument,
    ) -> Result<(), DirectoryError> {
        let mut records = self.records()?;
        if !records.crew.iter().any(|entry| &entry.id == member) {
            return Err(DirectoryError::NotFound);
        }
        records
            .crew_documents
            .entry(member.clone())
            .or_default()
            .push(document.into_document());
        Ok(())
    }
}
