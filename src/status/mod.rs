//! Certificate status collection and rendering
//!
//! The caller fetches the Certificate, its issuer, its Secret and its latest
//! CertificateRequest, feeds each lookup result to a [`StatusBuilder`] and
//! renders the sections of the built [`Report`].

pub mod builder;
pub mod report;

// Re-export key types
pub use builder::StatusBuilder;
pub use report::{
    CredentialDetails, CredentialReport, IssuerDetails, IssuerReport, Report, RequestDetails,
    RequestReport, Section,
};
