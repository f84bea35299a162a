//! Blocking HTTP client for the Ollama model-serving API.
//!
//! This crate provides a typed client for the endpoints used by the
//! `ollama-query` REPL.
//!
//! # Example
//!
//! ```no_run
//! use ollama_query_client::{GenerateRequest, OllamaClient, Result, StreamRecord};
//!
//! # fn example() -> Result<()> {
//! let client = OllamaClient::builder()
//!     .base_url("http://localhost:11434")
//!     .build()?;
//!
//! for model in client.models().list()? {
//!     println!("{}", model.name);
//! }
//!
//! // Stream a completion, printing fragments as they arrive
//! let stream = client
//!     .generate()
//!     .stream(&GenerateRequest::new("llama3.2", "Why is the sky blue?"))?;
//! for record in stream {
//!     let record = record?;
//!     print!("{}", record.fragment());
//!     if let Some(context) = record.context() {
//!         println!("\n[context: {} tokens]", context.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Chat**: `POST /api/chat` (streaming)
//! - **Generate**: `POST /api/generate` (streaming, with continuation context)
//! - **Models**: `GET /api/tags`, `GET /api/ps`, `POST /api/show`
//! - **Version**: `GET /api/version`

pub mod api;
pub mod client;
pub mod error;
pub mod stream;
pub mod types;

pub use api::{ChatStream, GenerateStream};
pub use client::{ClientBuilder, DEFAULT_HOST, OllamaClient};
pub use error::{Error, Result};
pub use stream::{RecordStream, StreamRecord};
pub use types::*;
