//! Generate API.

use std::io::BufReader;

use reqwest::blocking::Response;

use crate::client::OllamaClient;
use crate::error::Result;
use crate::stream::RecordStream;
use crate::types::{GenerateRecord, GenerateRequest};

/// Records streamed back from `/api/generate`.
pub type GenerateStream = RecordStream<BufReader<Response>, GenerateRecord>;

/// Generate API client.
pub struct GenerateApi {
    client: OllamaClient,
}

impl GenerateApi {
    pub(crate) fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    /// Stream a completion.
    ///
    /// A non-empty `request.context` continues an earlier generation.
    pub fn stream(&self, request: &GenerateRequest) -> Result<GenerateStream> {
        tracing::debug!(
            model = %request.model,
            context_len = request.context.len(),
            "starting generation"
        );
        let body = self.client.post_stream("generate", request)?;
        Ok(RecordStream::new(body))
    }
}
