//! Version API.

use crate::client::OllamaClient;
use crate::error::Result;
use crate::types::VersionResponse;

/// Version API client.
pub struct VersionApi {
    client: OllamaClient,
}

impl VersionApi {
    pub(crate) fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    /// Get the server version.
    pub fn get(&self) -> Result<VersionResponse> {
        self.client.get("version")
    }
}
