//! API endpoint implementations.

mod chat;
mod generate;
mod models;
mod version;

pub use chat::{ChatApi, ChatStream};
pub use generate::{GenerateApi, GenerateStream};
pub use models::ModelsApi;
pub use version::VersionApi;
