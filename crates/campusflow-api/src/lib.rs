//! Async HTTP client for the CampusFlow backend API.
//!
//! The backend owns all of the heavy lifting (entity resolution, anomaly
//! detection, occupancy forecasting); this crate is the typed boundary the
//! rest of the workspace talks through. One method per REST endpoint, JSON
//! in/out, no retries, no schema validation beyond serde's structural
//! decoding.
//!
//! Error bodies are expected to carry a `detail` string (FastAPI
//! convention); [`Error::Api`] surfaces it verbatim when present.

mod client;
mod error;
pub mod types;

pub use client::ApiClient;
pub use error::Error;
