//! Remote catalog API integration
//!
//! - [`client`] - Shared reqwest client and endpoint resolution
//! - [`token`] - Bearer token acquisition ([`TokenProvider`])
//! - [`last_id`] - Highest-record-ID discovery ([`LastIdSource`])
//! - [`models`] - Response payloads

pub mod client;
pub mod last_id;
pub mod models;
pub mod token;

pub use client::CatalogClient;
pub use last_id::{last_id_source, LastIdSource, ScanLastIdSource, UrlLastIdSource};
pub use token::{AccessToken, BasicAuthTokenProvider, TokenProvider};
