//! cert-status - status aggregation and rendering for cluster-managed certificates
//!
//! Collects a Certificate, its issuing authority, its Secret and its latest
//! CertificateRequest into one report with per-section error isolation

// Foundational layer
pub mod error;
pub mod types;
pub mod config;
pub mod telemetry;

// Core layer
pub mod crypto;
pub mod resources;

// Application layer
pub mod status;

// Public key types
pub use crate::error::Error;
pub use crate::types::{IssuerKind, Result};
pub use crate::resources::{EventDescriber, TabularEventDescriber};
pub use crate::status::{Report, Section, StatusBuilder};
