use std::fmt;
use serde::{Serialize, Deserialize};

/// Project-wide Result type
pub type Result<T> = std::result::Result<T, crate::error::Error>;

/// Kind of the issuing authority referenced by a Certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IssuerKind {
    /// Namespaced issuer
    Issuer,
    /// Cluster-scoped issuer
    ClusterIssuer,
}

impl IssuerKind {
    /// Kind name as it appears in resource references
    pub fn as_str(&self) -> &'static str {
        match self {
            IssuerKind::Issuer => "Issuer",
            IssuerKind::ClusterIssuer => "ClusterIssuer",
        }
    }
}

impl fmt::Display for IssuerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for IssuerKind {
    fn default() -> Self {
        IssuerKind::Issuer
    }
}
