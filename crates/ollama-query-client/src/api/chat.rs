//! Chat API.

use std::io::BufReader;

use reqwest::blocking::Response;

use crate::client::OllamaClient;
use crate::error::Result;
use crate::stream::RecordStream;
use crate::types::{ChatMessage, ChatRecord, ChatRequest};

/// Records streamed back from `/api/chat`.
pub type ChatStream = RecordStream<BufReader<Response>, ChatRecord>;

/// Chat API client.
pub struct ChatApi {
    client: OllamaClient,
}

impl ChatApi {
    pub(crate) fn new(client: OllamaClient) -> Self {
        Self { client }
    }

    /// Stream a chat response.
    ///
    /// Returns once the response headers arrive; records are read from the
    /// body as the iterator is advanced.
    pub fn stream(&self, request: &ChatRequest) -> Result<ChatStream> {
        let body = self.client.post_stream("chat", request)?;
        Ok(RecordStream::new(body))
    }

    /// Stream the reply to a single message (convenience method).
    pub fn stream_message(
        &self,
        model: impl Into<String>,
        role: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<ChatStream> {
        self.stream(&ChatRequest::new(model, ChatMessage::new(role, content)))
    }
}
