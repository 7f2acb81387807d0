use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::workflows::expiry::{expiry_for_submission, expiry_label, is_expired};

/// Backend identifiers arrive either as strings or as bare numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(value) => value,
        Raw::Number(value) => value.to_string(),
    })
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "string_or_number")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(value)| value))
}

/// Identifier of a ship (`idBarco`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShipId(#[serde(deserialize_with = "string_or_number")] pub String);

/// Identifier of a crew member (`user_id` / `idTripulante`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrewMemberId(#[serde(deserialize_with = "string_or_number")] pub String);

impl fmt::Display for ShipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CrewMemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ShipId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<&str> for CrewMemberId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A stored certificate or personal document. The owner is implied by the listing that
/// returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(
        default,
        deserialize_with = "optional_string_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    #[serde(rename = "tipo", default)]
    pub kind: String,
    #[serde(rename = "archivo_path", default)]
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(
        rename = "fecha_caducidad",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_on: Option<String>,
}

impl Document {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        is_expired(self.expires_on.as_deref(), today)
    }

    pub fn expiry_label(&self) -> String {
        expiry_label(self.expires_on.as_deref())
    }

    /// Last path segment of the storage key.
    pub fn file_name(&self) -> &str {
        match self.file_path.rsplit('/').next() {
            Some(name) if !name.is_empty() => name,
            _ => "documento.pdf",
        }
    }
}

/// Payload used to attach a document to a ship or crew member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewDocument {
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "archivo_path")]
    pub file_path: String,
    #[serde(rename = "fecha_caducidad")]
    pub expires_on: String,
}

impl NewDocument {
    /// A blank expiry is written as the no-expiry sentinel.
    pub fn new(
        kind: impl Into<String>,
        file_path: impl Into<String>,
        expires_on: Option<&str>,
    ) -> Self {
        Self {
            kind: kind.into(),
            file_path: file_path.into(),
            expires_on: expiry_for_submission(expires_on),
        }
    }

    pub fn into_document(self) -> Document {
        Document {
            id: None,
            kind: self.kind,
            file_path: self.file_path,
            created_at: None,
            expires_on: Some(self.expires_on),
        }
    }
}

/// Row of the ship listing (`GET /barcos`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipSummary {
    #[serde(rename = "idBarco")]
    pub id: ShipId,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "fecha", default)]
    pub date: String,
    #[serde(rename = "tripulantesCount", default)]
    pub crew_count: u32,
}

/// Row of the global crew listing (`GET /tripulantes`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrewSummary {
    #[serde(rename = "user_id")]
    pub id: CrewMemberId,
    #[serde(rename = "nombre", default)]
    pub name: String,
    #[serde(rename = "apellidos", default)]
    pub surname: String,
    #[serde(rename = "telefono", default)]
    pub phone: String,
    #[serde(rename = "nacionalidad", default)]
    pub nationality: String,
    #[serde(rename = "puesto", default)]
    pub position: String,
}

impl CrewSummary {
    pub fn full_name(&self) -> String {
        let joined = format!("{} {}", self.name, self.surname);
        let trimmed = joined.trim();
        if trimmed.is_empty() {
            self.id.0.clone()
        } else {
            trimmed.to_string()
        }
    }
}

#[derive(Deserialize)]
struct RawCrewAssignment {
    #[serde(rename = "idTripulante", default, deserialize_with = "optional_string_or_number")]
    crew_id: Option<String>,
    #[serde(default, deserialize_with = "optional_string_or_number")]
    user_id: Option<String>,
    #[serde(default)]
    nombre: Option<String>,
    #[serde(default)]
    apellidos: Option<String>,
    #[serde(default)]
    puesto: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

/// Roster entry of a ship (`GET /barco/{id}/tripulantes`).
///
/// The roster keys members by `idTripulante`; some backends echo `user_id` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawCrewAssignment")]
pub struct CrewAssignment {
    #[serde(rename = "idTripulante")]
    pub member_id: CrewMemberId,
    #[serde(rename = "nombre", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "apellidos", skip_serializing_if = "Option::is_none")]
    pub surname: Option<String>,
    #[serde(rename = "puesto", skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl From<RawCrewAssignment> for CrewAssignment {
    fn from(raw: RawCrewAssignment) -> Self {
        Self {
            member_id: CrewMemberId(raw.crew_id.or(raw.user_id).unwrap_or_default()),
            name: raw.nombre,
            surname: raw.apellidos,
            position: raw.puesto,
            created_at: raw.created_at,
        }
    }
}

impl CrewAssignment {
    pub fn new(member_id: CrewMemberId) -> Self {
        Self {
            member_id,
            name: None,
            surname: None,
            position: None,
            created_at: None,
        }
    }
}

/// A ship a crew member is currently assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrolment {
    #[serde(rename = "idBarco")]
    pub ship_id: ShipId,
    #[serde(rename = "nombre")]
    pub ship_name: String,
    #[serde(rename = "fecha")]
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct DocumentsEnvelope {
    #[serde(default)]
    pub documentos: Vec<Document>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ShipsEnvelope {
    #[serde(default)]
    pub barcos: Vec<ShipSummary>,
}

/// `GET /barco/{id}` answers either `{ "barco": {...} }` or the bare record.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ShipEnvelope {
    Wrapped { barco: ShipSummary },
    Bare(ShipSummary),
}

impl ShipEnvelope {
    pub(crate) fn into_ship(self) -> ShipSummary {
        match self {
            ShipEnvelope::Wrapped { barco } => barco,
            ShipEnvelope::Bare(ship) => ship,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CrewEnvelope {
    #[serde(default)]
    pub tripulantes: Vec<CrewSummary>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RosterEnvelope {
    #[serde(default)]
    pub tripulantes: Vec<CrewAssignment>,
}
