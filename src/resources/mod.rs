pub mod events;
pub mod types;

// Core objects come from the orchestrator's published models
pub use k8s_openapi::api::core::v1::{Event, EventSource, Secret};
pub use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

// Re-export key types
pub use events::{EventDescriber, TabularEventDescriber};
pub use types::{
    resource_name, resource_namespace, secret_data, Certificate, CertificateRequest,
    CertificateSpec, CertificateStatus, ClusterIssuer, Condition, ConditionedStatus, Issuer,
    IssuerRef,
};
