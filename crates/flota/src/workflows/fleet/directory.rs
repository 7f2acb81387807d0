use async_trait::async_trait;
use serde_json::Value;

use super::domain::{
    CrewAssignment, CrewMemberId, CrewSummary, Document, NewDocument, ShipId, ShipSummary,
};

/// Read/write access to the fleet backend. Every readiness check goes through this seam so
/// the rules can be exercised against in-memory fleets.
#[async_trait]
pub trait FleetDirectory: Send + Sync {
    async fn list_ships(&self) -> Result<Vec<ShipSummary>, DirectoryError>;
    async fn ship(&self, ship: &ShipId) -> Result<ShipSummary, DirectoryError>;
    async fn ship_documents(&self, ship: &ShipId) -> Result<Vec<Document>, DirectoryError>;
    async fn ship_crew(&self, ship: &ShipId) -> Result<Vec<CrewAssignment>, DirectoryError>;
    async fn assign_crew(&self, ship: &ShipId, member: &CrewMemberId)
        -> Result<(), DirectoryError>;
    async fn remove_crew(&self, ship: &ShipId, member: &CrewMemberId)
        -> Result<(), DirectoryError>;
    async fn add_ship_document(
        &self,
        ship: &ShipId,
        document: NewDocument,
    ) -> Result<(), DirectoryError>;
    /// Rewrites the expiry of the ship document stored at `document.file_path`.
    async fn update_ship_document_expiry(
        &self,
        ship: &ShipId,
        document: NewDocument,
    ) -> Result<(), DirectoryError>;
    async fn list_crew(&self) -> Result<Vec<CrewSummary>, DirectoryError>;
    async fn crew_documents(&self, member: &CrewMemberId) -> Result<Vec<Document>, DirectoryError>;
    async fn add_crew_document(
        &self,
        member: &CrewMemberId,
        document: NewDocument,
    ) -> Result<(), DirectoryError>;
}

/// Failure talking to the fleet backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DirectoryError {
    #[error("fleet backend unreachable: {0}")]
    Transport(String),
    #[error("fleet backend rejected the request ({status}): {message}")]
    Backend { status: u16, message: String },
    #[error("record not found")]
    NotFound,
    #[error("unexpected response from fleet backend: {0}")]
    Decode(String),
}

impl DirectoryError {
    /// Backend-supplied text when there is any, otherwise the caller's localized fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            DirectoryError::Backend { message, .. } if !message.trim().is_empty() => {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }
}

/// Flatten the error payload of a failed backend response into one line.
///
/// Accepts `{"error": "text"}`, `{"error": {"message", "code", "details"}}`, a bare string,
/// or anything else (rendered as JSON).
pub fn backend_message(body: &Value) -> String {
    let raw = match body.get("error") {
        Some(inner) if !inner.is_null() => inner,
        _ => body,
    };

    match raw {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Object(fields) => match fields.get("message").and_then(Value::as_str) {
            Some(message) => {
                let mut line = message.to_string();
                if let Some(code) = fields.get("code").filter(|code| !code.is_null()) {
                    let code = code.as_str().map_or_else(|| code.to_string(), str::to_string);
                    line.push_str(&format!(" ({code})"));
                }
                if let Some(details) = fields.get("details").and_then(Value::as_str) {
                    line.push_str(&format!(" - {details}"));
                }
                line
            }
            None => raw.to_string(),
        },
        other => other.to_string(),
    }
}
