//! Product scene analysis and image synthesis over the Gemini API.
//!
//! Every remote call goes through [`dispatch::Dispatcher`], which retries
//! transient failures with exponential backoff, and through a one-hop
//! premium → standard model fallback.

pub mod catalog;
pub mod client;
pub mod dispatch;
pub mod error;
mod fallback;
mod http_response;
pub mod media;
pub mod studio;
pub mod tiers;

#[cfg(test)]
mod test_support;

pub use scenecraft_types as types;

pub use catalog::ModelCatalog;
pub use client::{sanitize_api_key, Client, ClientBuilder, ClientConfig, HttpOptions};
pub use dispatch::{Backoff, Dispatcher, TokioBackoff};
pub use error::{Error, Result};
pub use studio::{Studio, SynthesisOptions};
pub use tiers::{ModelTiers, Tier};
