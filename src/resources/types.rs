use chrono::{DateTime, Utc};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use serde::{Serialize, Deserialize};

/// Name of a resource, empty when unset
pub fn resource_name(meta: &ObjectMeta) -> &str {
    meta.name.as_deref().unwrap_or_default()
}

/// Namespace of a resource, empty for cluster-scoped resources
pub fn resource_namespace(meta: &ObjectMeta) -> &str {
    meta.namespace.as_deref().unwrap_or_default()
}

/// Bytes stored under `key` of a Secret's data, if any
pub fn secret_data<'a>(secret: &'a Secret, key: &str) -> Option<&'a [u8]> {
    secret.data.as_ref()?.get(key).map(|bytes| bytes.0.as_slice())
}

/// Typed status tuple reported by a resource
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Condition type, e.g. "Ready"
    #[serde(rename = "type")]
    pub type_: String,
    /// "True", "False" or "Unknown"
    pub status: String,
    /// Machine-readable reason
    #[serde(default)]
    pub reason: String,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
}

impl Condition {
    /// Create a new condition
    pub fn new(type_: &str, status: &str, reason: &str, message: &str) -> Self {
        Self {
            type_: type_.to_string(),
            status: status.to_string(),
            reason: reason.to_string(),
            message: message.to_string(),
        }
    }
}

/// Reference from a Certificate to its issuing authority
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRef {
    pub name: String,
    #[serde(default)]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSpec {
    /// Requested DNS subject alternative names
    #[serde(default)]
    pub dns_names: Vec<String>,
    /// Name of the Secret the signed certificate is stored in
    #[serde(default)]
    pub secret_name: String,
    #[serde(default)]
    pub issuer_ref: IssuerRef,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub not_before: Option<DateTime<Utc>>,
    #[serde(default)]
    pub not_after: Option<DateTime<Utc>>,
    #[serde(default)]
    pub renewal_time: Option<DateTime<Utc>>,
}

/// The primary resource whose status is reported
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: CertificateSpec,
    #[serde(default)]
    pub status: CertificateStatus,
}

/// Status shared by Issuer, ClusterIssuer and CertificateRequest
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionedStatus {
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

/// Namespaced issuing authority
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Issuer {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: ConditionedStatus,
}

/// Cluster-scoped issuing authority
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterIssuer {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: ConditionedStatus,
}

/// Request for a signed certificate
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateRequest {
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub status: ConditionedStatus,
}
