//! Post-export artifact validation
//!
//! Checks that downloaded artifacts are MARC record files and moves anything
//! else out of the way.

pub mod marc;
pub mod report;
pub mod validator;

pub use report::{InvalidFile, ValidFile, ValidationReport};
pub use validator::MarcValidator;
