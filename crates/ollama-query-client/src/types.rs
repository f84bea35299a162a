//! Request and response types for the Ollama API.
//!
//! These types mirror the server's JSON contract. Response types are lenient:
//! fields the server may omit default to empty values.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::stream::StreamRecord;

// ─────────────────────────────────────────────────────────────────────────────
// Chat
// ─────────────────────────────────────────────────────────────────────────────

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the sender (`user`, `assistant`, `system`, ...).
    pub role: String,
    /// Message text.
    #[serde(default)]
    pub content: String,
    /// Base64 images attached to the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl ChatMessage {
    /// Create a text-only message.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
            images: None,
        }
    }
}

/// Request body for `POST /api/chat`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model to chat with.
    pub model: String,
    /// Conversation so far.
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Create a request carrying one message.
    pub fn new(model: impl Into<String>, message: ChatMessage) -> Self {
        Self {
            model: model.into(),
            messages: vec![message],
        }
    }
}

/// One line of a streamed `/api/chat` response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRecord {
    /// Model that produced the record.
    #[serde(default)]
    pub model: String,
    /// Server timestamp.
    #[serde(default)]
    pub created_at: String,
    /// Message fragment.
    #[serde(default)]
    pub message: Option<ChatMessage>,
    /// Completion flag; set on the final record only.
    #[serde(default)]
    pub done: bool,
    /// Reason the model stopped, final record only.
    #[serde(default)]
    pub done_reason: Option<String>,
    /// Continuation token, final record only.
    #[serde(default)]
    pub context: Option<Vec<i64>>,
    /// Timing statistics, final record only.
    #[serde(flatten)]
    pub timings: Timings,
}

impl StreamRecord for ChatRecord {
    fn fragment(&self) -> &str {
        self.message.as_ref().map_or("", |m| m.content.as_str())
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn context(&self) -> Option<&[i64]> {
        self.context.as_deref()
    }

    fn timings(&self) -> &Timings {
        &self.timings
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Generate
// ─────────────────────────────────────────────────────────────────────────────

/// Request body for `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Model to generate with.
    pub model: String,
    /// Prompt text.
    pub prompt: String,
    /// Continuation token from a previous generate call.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<i64>,
}

impl GenerateRequest {
    /// Create a request without a continuation token.
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            context: Vec::new(),
        }
    }

    /// Replay a continuation token.
    pub fn with_context(mut self, context: impl Into<Vec<i64>>) -> Self {
        self.context = context.into();
        self
    }
}

/// One line of a streamed `/api/generate` response.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRecord {
    /// Model that produced the record.
    #[serde(default)]
    pub model: String,
    /// Server timestamp.
    #[serde(default)]
    pub created_at: String,
    /// Response fragment.
    #[serde(default)]
    pub response: String,
    /// Completion flag; set on the final record only.
    #[serde(default)]
    pub done: bool,
    /// Reason the model stopped, final record only.
    #[serde(default)]
    pub done_reason: Option<String>,
    /// Continuation token, final record only.
    #[serde(default)]
    pub context: Option<Vec<i64>>,
    /// Timing statistics, final record only.
    #[serde(flatten)]
    pub timings: Timings,
}

impl StreamRecord for GenerateRecord {
    fn fragment(&self) -> &str {
        &self.response
    }

    fn is_done(&self) -> bool {
        self.done
    }

    fn context(&self) -> Option<&[i64]> {
        self.context.as_deref()
    }

    fn timings(&self) -> &Timings {
        &self.timings
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Timings
// ─────────────────────────────────────────────────────────────────────────────

/// Timing and count statistics carried by a final stream record.
///
/// Durations are in nanoseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Timings {
    #[serde(default)]
    pub total_duration: Option<u64>,
    #[serde(default)]
    pub load_duration: Option<u64>,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub prompt_eval_duration: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
    #[serde(default)]
    pub eval_duration: Option<u64>,
}

impl Timings {
    /// Generated tokens per second, when both count and duration are known.
    pub fn tokens_per_second(&self) -> Option<f64> {
        match (self.eval_count, self.eval_duration) {
            (Some(count), Some(nanos)) if nanos > 0 => Some(count as f64 / secs(nanos)),
            _ => None,
        }
    }

    /// True when the server reported no statistics at all.
    pub fn is_empty(&self) -> bool {
        *self == Timings::default()
    }
}

fn secs(nanos: u64) -> f64 {
    nanos as f64 / 1_000_000_000.0
}

impl fmt::Display for Timings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(count) = self.prompt_eval_count {
            parts.push(format!("prompt {} tokens", count));
        }
        if let Some(count) = self.eval_count {
            let mut part = format!("eval {} tokens", count);
            if let Some(nanos) = self.eval_duration {
                part.push_str(&format!(" in {:.2}s", secs(nanos)));
            }
            if let Some(rate) = self.tokens_per_second() {
                part.push_str(&format!(" ({:.1} tok/s)", rate));
            }
            parts.push(part);
        }
        if let Some(nanos) = self.load_duration {
            parts.push(format!("load {:.2}s", secs(nanos)));
        }
        if let Some(nanos) = self.total_duration {
            parts.push(format!("total {:.2}s", secs(nanos)));
        }
        if parts.is_empty() {
            write!(f, "no statistics reported")
        } else {
            write!(f, "{}", parts.join(", "))
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Models
// ─────────────────────────────────────────────────────────────────────────────

/// Response for `GET /api/tags` and `GET /api/ps`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelsResponse {
    #[serde(default)]
    pub models: Vec<Model>,
}

/// A model entry, either installed (`tags`) or loaded (`ps`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    #[serde(default)]
    pub model: String,
    /// Size on disk in bytes.
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub digest: String,
    #[serde(default)]
    pub details: ModelDetails,
    /// Last modification time (tags only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    /// When the loaded model is unloaded (ps only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    /// Bytes resident in VRAM (ps only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_vram: Option<u64>,
    /// Loaded context window (ps only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
}

impl Model {
    /// Size in mebibytes.
    pub fn size_mb(&self) -> u64 {
        self.size / 1024 / 1024
    }
}

/// Model family and quantization details.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelDetails {
    #[serde(default)]
    pub parent_model: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub families: Option<Vec<String>>,
    #[serde(default)]
    pub parameter_size: String,
    #[serde(default)]
    pub quantization_level: String,
}

/// Request body for `POST /api/show`.
#[derive(Debug, Clone, Serialize)]
pub struct ShowRequest {
    pub model: String,
}

/// Response for `POST /api/show`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShowResponse {
    #[serde(default)]
    pub modelfile: String,
    #[serde(default)]
    pub parameters: String,
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub license: String,
    #[serde(default)]
    pub details: ModelDetails,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub modified_at: Option<String>,
    #[serde(default)]
    pub model_info: HashMap<String, serde_json::Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Version
// ─────────────────────────────────────────────────────────────────────────────

/// Response for `GET /api/version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    pub version: String,
}
