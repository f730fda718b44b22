//! Domain types for catalog-export.
//!
//! The domain layer provides:
//! - **Error types** ([`CatalogError`], [`HardFailure`], [`HardFailureKind`])
//! - **Result type alias** ([`Result`])
//! - **ID ranges** ([`IdRange`]) used for batch bounds
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, CatalogError>`]:
//!
//! ```rust,no_run
//! use catalog_export::domain::{CatalogError, Result};
//!
//! fn example() -> Result<()> {
//!     let _config = catalog_export::config::load_config("catalog-export.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod range;
pub mod result;

pub use errors::{body_snippet, CatalogError, HardFailure, HardFailureKind};
pub use range::IdRange;
pub use result::Result;
