//! Vendora Core — domain models, error taxonomy, identity and access
//! gate, pricing seam, and repository trait definitions shared across
//! all crates.

pub mod access;
pub mod error;
pub mod identity;
pub mod models;
pub mod pricing;
pub mod repository;

pub use access::{AccessDenied, check_access};
pub use error::{BusinessRule, VendoraError, VendoraResult};
pub use identity::{UserContext, UserType, VerifiedIdentity};
