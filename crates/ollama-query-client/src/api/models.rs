//! Models API.

use crate::client::OllamaClient;
use crate::error::Result;
use crate::types::{Model, ModelsResponse, ShowRequest, ShowResponse};

/// Models API client.
pub struct ModelsApi {
    client: OllamaClient,
}

impl ModelsApi {
    pub(crate) fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    /// List installed models (`GET /api/tags`).
    pub fn list(&self) -> Result<Vec<Model>> {
        let response: ModelsResponse = self.client.get("tags")?;
        Ok(response.models)
    }

    /// List models currently loaded in memory (`GET /api/ps`).
    pub fn running(&self) -> Result<Vec<Model>> {
        let response: ModelsResponse = self.client.get("ps")?;
        Ok(response.models)
    }

    /// Show details of one model (`POST /api/show`).
    pub fn show(&self, name: &str) -> Result<ShowResponse> {
        self.client.post(
            "show",
            &ShowRequest {
                model: name.to_string(),
            },
        )
    }
}
