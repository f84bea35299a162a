//! Main client implementation.

use std::io::BufReader;
use std::sync::Arc;
use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use url::Url;

use crate::api::{ChatApi, GenerateApi, ModelsApi, VersionApi};
use crate::error::{Error, ErrorResponse, Result};

/// Default server address of a local Ollama install.
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// Blocking Ollama API client.
///
/// Every call blocks the calling thread until the response has been read
/// (or, for streaming endpoints, until the caller stops reading the body).
///
/// # Example
///
/// ```no_run
/// use ollama_query_client::OllamaClient;
///
/// # fn example() -> ollama_query_client::Result<()> {
/// let client = OllamaClient::builder()
///     .base_url("http://localhost:11434")
///     .build()?;
///
/// let version = client.version().get()?;
/// println!("server {}", version.version);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct OllamaClient {
    /// Inner shared state.
    inner: Arc<ClientInner>,
}

/// Inner client state (shared across clones).
pub(crate) struct ClientInner {
    /// HTTP client.
    pub(crate) http: Client,
    /// Base URL for API requests.
    pub(crate) base_url: Url,
}

impl OllamaClient {
    /// Create a new client builder.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // ─────────────────────────────────────────────────────────────────────────
    // API accessors
    // ─────────────────────────────────────────────────────────────────────────

    /// Access the chat API.
    pub fn chat(&self) -> ChatApi {
        ChatApi::new(self.clone())
    }

    /// Access the generate API.
    pub fn generate(&self) -> GenerateApi {
        GenerateApi::new(self.clone())
    }

    /// Access the models API (tags, ps, show).
    pub fn models(&self) -> ModelsApi {
        ModelsApi::new(self.clone())
    }

    /// Access the version API.
    pub fn version(&self) -> VersionApi {
        VersionApi::new(self.clone())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internal HTTP methods
    // ─────────────────────────────────────────────────────────────────────────

    /// Build a URL for an API path.
    pub(crate) fn url(&self, path: &str) -> Result<Url> {
        let path = path.trim_start_matches('/');
        self.inner
            .base_url
            .join(&format!("api/{}", path))
            .map_err(Error::from)
    }

    /// Make a GET request.
    pub(crate) fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path)?;
        tracing::debug!(%url, "GET");
        let response = self.inner.http.get(url).send()?;
        self.handle_response(response)
    }

    /// Make a POST request.
    pub(crate) fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "POST");
        let response = self.inner.http.post(url).json(body).send()?;
        self.handle_response(response)
    }

    /// Make a POST request for streaming (returns the body reader directly).
    pub(crate) fn post_stream<B>(&self, path: &str, body: &B) -> Result<BufReader<Response>>
    where
        B: serde::Serialize + ?Sized,
    {
        let url = self.url(path)?;
        tracing::debug!(%url, "POST (stream)");
        let response = self.inner.http.post(url).json(body).send()?;

        if !response.status().is_success() {
            return Err(self.extract_error(response));
        }

        Ok(BufReader::new(response))
    }

    /// Handle a response, extracting the body or error.
    ///
    /// The body is buffered in full before decoding.
    fn handle_response<T: serde::de::DeserializeOwned>(&self, response: Response) -> Result<T> {
        if response.status().is_success() {
            let body = response.bytes()?;
            Ok(serde_json::from_slice(&body)?)
        } else {
            Err(self.extract_error(response))
        }
    }

    /// Extract an error from a failed response.
    fn extract_error(&self, response: Response) -> Error {
        let status = response.status().as_u16();

        match response.json::<ErrorResponse>() {
            Ok(err) => Error::Api {
                status,
                message: err.error,
            },
            Err(_) => Error::Api {
                status,
                message: format!("HTTP {}", status),
            },
        }
    }
}

/// Builder for creating an [`OllamaClient`].
#[derive(Debug)]
pub struct ClientBuilder {
    base_url: Option<String>,
}

impl ClientBuilder {
    /// Create a new builder with defaults.
    pub fn new() -> Self {
        Self { base_url: None }
    }

    /// Set the base URL for the server.
    ///
    /// A bare `host:port` is taken as plain HTTP.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<OllamaClient> {
        let base_url = self
            .base_url
            .ok_or_else(|| Error::Config("base_url is required".to_string()))?;

        let base_url = base_url.trim();
        if base_url.is_empty() {
            return Err(Error::Config("base_url is empty".to_string()));
        }

        // Parse and normalize base URL
        let mut base_url = if base_url.contains("://") {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("http://{}", base_url))?
        };
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // A generation may run for minutes and the REPL waits for it, so the
        // blocking client's default request timeout is switched off.
        let http = Client::builder()
            .default_headers(headers)
            .user_agent(format!("ollama-query/{}", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()?;

        Ok(OllamaClient {
            inner: Arc::new(ClientInner { http, base_url }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_requires_base_url() {
        let result = ClientBuilder::new().build();
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_with_base_url() {
        let client = ClientBuilder::new()
            .base_url("http://localhost:11434")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "http://localhost:11434/");
    }

    #[test]
    fn test_builder_adds_missing_scheme() {
        let client = ClientBuilder::new()
            .base_url("ai.local:11434")
            .build()
            .unwrap();

        assert_eq!(client.base_url().as_str(), "http://ai.local:11434/");
    }

    #[test]
    fn test_builder_rejects_garbage() {
        let result = ClientBuilder::new().base_url("http://[::1").build();
        assert!(matches!(result, Err(Error::InvalidUrl(_))));
    }

    #[test]
    fn test_url_building() {
        let client = OllamaClient::builder().base_url(DEFAULT_HOST).build().unwrap();

        let url = client.url("tags").unwrap();
        assert_eq!(url.as_str(), "http://localhost:11434/api/tags");

        let url = client.url("/generate").unwrap();
        assert_eq!(url.as_str(), "http://localhost:11434/api/generate");
    }

    #[test]
    fn test_url_building_under_path_prefix() {
        let client = ClientBuilder::new()
            .base_url("http://proxy.local/ollama")
            .build()
            .unwrap();

        let url = client.url("ps").unwrap();
        assert_eq!(url.as_str(), "http://proxy.local/ollama/api/ps");
    }
}
