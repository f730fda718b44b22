//! External system integrations for catalog-export.
//!
//! - [`catalog`] - The remote catalog's REST API
//!
//! Adapters sit behind traits ([`catalog::TokenProvider`],
//! [`catalog::LastIdSource`]) so the export core can be driven by test doubles.
//!
//! ```rust,no_run
//! use catalog_export::adapters::catalog::{BasicAuthTokenProvider, CatalogClient, TokenProvider};
//! use catalog_export::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("catalog-export.toml")?;
//! let client = CatalogClient::new(&config.catalog)?;
//! let tokens = BasicAuthTokenProvider::new(client, &config.catalog)?;
//! let _token = tokens.acquire().await?;
//! # Ok(())
//! # }
//! ```

pub mod catalog;
