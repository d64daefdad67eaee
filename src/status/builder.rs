use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::config::StatusConfig;
use crate::crypto::x509::decode_certificate;
use crate::error::Error;
use crate::resources::{
    resource_name, resource_namespace, secret_data, Certificate, CertificateRequest,
    ClusterIssuer, Condition, Event, Issuer, Secret,
};
use crate::status::report::{
    CredentialDetails, CredentialReport, IssuerDetails, IssuerReport, Report, RequestDetails,
    RequestReport, Section,
};
use crate::types::{IssuerKind, Result};

/// Accumulates the outcome of the lookups behind a certificate status
///
/// Each `with_*` method only touches its own section, so a failed lookup
/// never clears what another lookup collected. A lookup that returns
/// `Ok(None)` leaves the section as it was.
#[derive(Debug, Clone)]
pub struct StatusBuilder {
    name: String,
    namespace: String,
    creation_time: Option<DateTime<Utc>>,
    conditions: Vec<Condition>,
    dns_names: Vec<String>,
    events: Vec<Event>,
    not_before: Option<DateTime<Utc>>,
    not_after: Option<DateTime<Utc>>,
    renewal_time: Option<DateTime<Utc>>,
    issuer_kind: String,
    issuer: Option<IssuerReport>,
    secret: Option<CredentialReport>,
    request: Option<RequestReport>,
    certificate_key: String,
}

impl StatusBuilder {
    /// Seed a builder from the Certificate with default settings
    pub fn new(cert: &Certificate) -> Self {
        Self::with_config(cert, &StatusConfig::default())
    }

    /// Seed a builder from the Certificate
    pub fn with_config(cert: &Certificate, config: &StatusConfig) -> Self {
        let name = resource_name(&cert.metadata);
        let namespace = resource_namespace(&cert.metadata);
        debug!("Collecting status of Certificate {}/{}", namespace, name);
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            creation_time: cert.metadata.creation_timestamp.as_ref().map(|t| t.0),
            conditions: cert.status.conditions.clone(),
            dns_names: cert.spec.dns_names.clone(),
            events: Vec::new(),
            not_before: cert.status.not_before,
            not_after: cert.status.not_after,
            renewal_time: cert.status.renewal_time,
            issuer_kind: String::new(),
            issuer: None,
            secret: None,
            request: None,
            certificate_key: config.certificate_key.clone(),
        }
    }

    /// Replace the event list
    pub fn with_events(&mut self, events: Vec<Event>) -> &mut Self {
        self.events = events;
        self
    }

    /// Replace the issuer kind
    pub fn with_issuer_kind(&mut self, kind: impl Into<String>) -> &mut Self {
        self.issuer_kind = kind.into();
        self
    }

    /// Record the outcome of looking up a namespaced Issuer
    pub fn with_issuer(&mut self, issuer: Result<Option<&Issuer>>) -> &mut Self {
        let collected = issuer.map(|found| {
            found.map(|issuer| (resource_name(&issuer.metadata), &issuer.status.conditions))
        });
        self.set_issuer(collected, IssuerKind::Issuer)
    }

    /// Record the outcome of looking up a ClusterIssuer
    pub fn with_cluster_issuer(&mut self, issuer: Result<Option<&ClusterIssuer>>) -> &mut Self {
        let collected = issuer.map(|found| {
            found.map(|issuer| (resource_name(&issuer.metadata), &issuer.status.conditions))
        });
        self.set_issuer(collected, IssuerKind::ClusterIssuer)
    }

    fn set_issuer(
        &mut self,
        issuer: Result<Option<(&str, &Vec<Condition>)>>,
        kind: IssuerKind,
    ) -> &mut Self {
        match issuer {
            Err(err) => {
                warn!("Failed to get {}: {}", kind, err);
                self.issuer = Some(Section::Failed(err));
            }
            Ok(None) => {}
            Ok(Some((name, conditions))) => {
                debug!("Collected {} {}", kind, name);
                self.issuer = Some(Section::Collected(IssuerDetails {
                    name: name.to_string(),
                    kind,
                    conditions: conditions.clone(),
                }));
            }
        }
        self
    }

    /// Record the outcome of looking up the Secret and decode its certificate
    pub fn with_secret(&mut self, secret: Result<Option<&Secret>>) -> &mut Self {
        let secret = match secret {
            Err(err) => {
                warn!("Failed to get Secret: {}", err);
                self.secret = Some(Section::Failed(err));
                return self;
            }
            Ok(None) => return self,
            Ok(Some(secret)) => secret,
        };

        let report = self.credential_report(secret);
        let name = resource_name(&secret.metadata);
        if let Some(err) = report.error() {
            warn!("Failed to read certificate from Secret {}: {}", name, err);
        } else {
            debug!("Collected Secret {}", name);
        }
        self.secret = Some(report);
        self
    }

    fn credential_report(&self, secret: &Secret) -> CredentialReport {
        let name = resource_name(&secret.metadata).to_string();
        let data = match secret_data(secret, &self.certificate_key) {
            Some(data) if !data.is_empty() => data,
            _ => {
                return Section::Failed(Error::MissingCertificateData {
                    key: self.certificate_key.clone(),
                    secret: name,
                })
            }
        };

        match decode_certificate(data) {
            Ok(certificate) => Section::Collected(CredentialDetails { name, certificate }),
            Err(err) => Section::Failed(Error::CertificateParse {
                key: self.certificate_key.clone(),
                secret: name,
                reason: err.to_string(),
            }),
        }
    }

    /// Record the outcome of looking up the latest CertificateRequest.
    ///
    /// A found request also replaces the report's event list with `events`.
    pub fn with_certificate_request(
        &mut self,
        request: Result<Option<&CertificateRequest>>,
        events: Vec<Event>,
    ) -> &mut Self {
        match request {
            Err(err) => {
                warn!("Failed to get CertificateRequest: {}", err);
                self.request = Some(Section::Failed(err));
            }
            Ok(None) => {}
            Ok(Some(req)) => {
                let name = resource_name(&req.metadata);
                debug!("Collected CertificateRequest {} with {} events", name, events.len());
                self.events = events.clone();
                self.request = Some(Section::Collected(RequestDetails {
                    name: name.to_string(),
                    namespace: resource_namespace(&req.metadata).to_string(),
                    conditions: req.status.conditions.clone(),
                    events,
                }));
            }
        }
        self
    }

    /// Snapshot the collected state
    pub fn build(&self) -> Report {
        Report {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            creation_time: self.creation_time,
            conditions: self.conditions.clone(),
            dns_names: self.dns_names.clone(),
            events: self.events.clone(),
            not_before: self.not_before,
            not_after: self.not_after,
            renewal_time: self.renewal_time,
            issuer_kind: self.issuer_kind.clone(),
            issuer: self.issuer.clone(),
            secret: self.secret.clone(),
            request: self.request.clone(),
        }
    }
}
