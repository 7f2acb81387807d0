use std::borrow::Cow;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use super::directory::{backend_message, DirectoryError, FleetDirectory};
use super::domain::{
    CrewAssignment, CrewEnvelope, CrewMemberId, CrewSummary, Document, DocumentsEnvelope,
    NewDocument, RosterEnvelope, ShipEnvelope, ShipId, ShipSummary, ShipsEnvelope,
};
use crate::config::DirectoryConfig;

/// `FleetDirectory` backed by the fleet REST API, authenticated with a bearer token.
#[derive(Clone)]
pub struct HttpFleetDirectory {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpFleetDirectory {
    pub fn new(config: &DirectoryConfig) -> Result<Self, DirectoryError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| DirectoryError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, DirectoryError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|err| DirectoryError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.json::<Value>().await.unwrap_or(Value::Null);
        Err(status_error(status, &body))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, DirectoryError> {
        let url = self.url(path);
        debug!(%url, "fleet directory request");
        let response = self.send(self.client.get(&url)).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| DirectoryError::Decode(err.to_string()))
    }
}

fn status_error(status: StatusCode, body: &Value) -> DirectoryError {
    if status == StatusCode::NOT_FOUND {
        return DirectoryError::NotFound;
    }

    DirectoryError::Backend {
        status: status.as_u16(),
        message: backend_message(body),
    }
}

fn segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

#[async_trait]
impl FleetDirectory for HttpFleetDirectory {
    async fn list_ships(&self) -> Result<Vec<ShipSummary>, DirectoryError> {
        let envelope: ShipsEnvelope = self.get_json("barcos").await?;
        Ok(envelope.barcos)
    }

    async fn ship(&self, ship: &ShipId) -> Result<ShipSummary, DirectoryError> {
        let envelope: ShipEnvelope = self.get_json(&format!("barco/{}", segment(&ship.0))).await?;
        Ok(envelope.into_ship())
    }

    async fn ship_documents(&self, ship: &ShipId) -> Result<Vec<Document>, DirectoryError> {
        let envelope: DocumentsEnvelope = self
            .get_json(&format!("barco/{}/documentos", segment(&ship.0)))
            .await?;
        Ok(envelope.documentos)
    }

    async fn ship_crew(&self, ship: &ShipId) -> Result<Vec<CrewAssignment>, DirectoryError> {
        let envelope: RosterEnvelope = self
            .get_json(&format!("barco/{}/tripulantes", segment(&ship.0)))
            .await?;
        Ok(envelope.tripulantes)
    }

    async fn assign_crew(
        &self,
        ship: &ShipId,
        member: &CrewMemberId,
    ) -> Result<(), DirectoryError> {
        let url = self.url(&format!("barco/{}/tripulantes", segment(&ship.0)));
        let payload = json!({ "idTripulante": member.0 });
        self.send(self.client.post(&url).json(&payload)).await?;
        Ok(())
    }

    async fn remove_crew(
        &self,
        ship: &ShipId,
        member: &CrewMemberId,
    ) -> Result<(), DirectoryError> {
        let url = self.url(&format!(
            "barco/{}/tripulantes/{}",
            segment(&ship.0),
            segment(&member.0)
        ));
        self.send(self.client.delete(&url)).await?;
        Ok(())
    }

    async fn add_ship_document(
        &self,
        ship: &ShipId,
        document: NewDocument,
    ) -> Result<(), DirectoryError> {
        let url = self.url(&format!("barco/{}/documentos", segment(&ship.0)));
        self.send(self.client.post(&url).json(&document)).await?;
        Ok(())
    }

    async fn update_ship_document_expiry(
        &self,
        ship: &ShipId,
        document: NewDocument,
    ) -> Result<(), DirectoryError> {
        let url = self.url(&format!("barco/{}/documentos", segment(&ship.0)));
        self.send(self.client.put(&url).json(&document)).await?;
        Ok(())
    }

    async fn list_crew(&self) -> Result<Vec<CrewSummary>, DirectoryError> {
        let envelope: CrewEnvelope = self.get_json("tripulantes").await?;
        Ok(envelope.tripulantes)
    }

    async fn crew_documents(&self, member: &CrewMemberId) -> Result<Vec<Document>, DirectoryError> {
        let envelope: DocumentsEnvelope = self
            .get_json(&format!("tripulante/{}/documentos", segment(&member.0)))
            .await?;
        Ok(envelope.documentos)
    }

    async fn add_crew_document(
        &self,
        member: &CrewMemberId,
        document: NewDocument,
    ) -> Result<(), DirectoryError> {
        let url = self.url(&format!("tripulante/{}/documentos", segment(&member.0)));
        self.send(self.client.post(&url).json(&document)).await?;
        Ok(())
    }
}
