use serde::Serialize;

const SHIP_DOCUMENTS_CLAUSE: &str = "documentos del barco caducados";

/// Whether a ship may leave port, derived from its own documents and its crew's.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SailReadiness {
    pub cannot_sail: bool,
    pub reason: String,
}

impl SailReadiness {
    pub fn evaluate(ship_documents_expired: bool, crew_expired_count: usize) -> Self {
        let mut clauses = Vec::new();
        if ship_documents_expired {
            clauses.push(SHIP_DOCUMENTS_CLAUSE.to_string());
        }
        if crew_expired_count > 0 {
            clauses.push(format!(
                "{crew_expired_count} tripulante(s) con documentos caducados"
            ));
        }

        Self {
            cannot_sail: !clauses.is_empty(),
            reason: clauses.join(" y "),
        }
    }

    pub fn may_sail(&self) -> bool {
        !self.cannot_sail
    }

    /// Banner for the ship detail view (`avisoZarpe`).
    pub fn warning(&self) -> String {
        if self.cannot_sail {
            format!("Este barco no puede zarpar al mar: {}.", self.reason)
        } else {
            String::new()
        }
    }
}
