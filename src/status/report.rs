use std::fmt;
use chrono::{DateTime, Utc};
use x509_parser::num_bigint::BigUint;

use crate::crypto::usage::{ext_key_usage_to_string, key_usage_to_string};
use crate::crypto::x509::CertificateInfo;
use crate::error::Error;
use crate::resources::{Condition, Event, EventDescriber};
use crate::types::IssuerKind;

/// Indentation level of the event table inside the request section
pub const EVENT_INDENT_LEVEL: usize = 1;

/// Outcome of one lookup: either the collected details or the error that
/// prevented collecting them
#[derive(Debug, Clone, PartialEq)]
pub enum Section<T> {
    Collected(T),
    Failed(Error),
}

impl<T> Section<T> {
    /// Error of a failed section
    pub fn error(&self) -> Option<&Error> {
        match self {
            Section::Failed(err) => Some(err),
            Section::Collected(_) => None,
        }
    }

    /// Details of a collected section
    pub fn details(&self) -> Option<&T> {
        match self {
            Section::Collected(details) => Some(details),
            Section::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Section::Failed(_))
    }
}

impl<T: fmt::Display> fmt::Display for Section<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Collected(details) => details.fmt(f),
            Section::Failed(err) => write!(f, "{}", err),
        }
    }
}

/// Status of the Issuer or ClusterIssuer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerDetails {
    pub name: String,
    pub kind: IssuerKind,
    pub conditions: Vec<Condition>,
}

/// Status of the Secret and the certificate stored in it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialDetails {
    pub name: String,
    pub certificate: CertificateInfo,
}

/// Status of the latest CertificateRequest
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDetails {
    pub name: String,
    pub namespace: String,
    pub conditions: Vec<Condition>,
    pub events: Vec<Event>,
}

pub type IssuerReport = Section<IssuerDetails>;
pub type CredentialReport = Section<CredentialDetails>;
pub type RequestReport = Section<RequestDetails>;

impl fmt::Display for IssuerDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Issuer:\n  Name: {}\n  Kind: {}\n  Conditions:\n{}",
            self.name,
            self.kind,
            conditions_block(&self.conditions)
        )
    }
}

impl fmt::Display for CredentialDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cert = &self.certificate;
        // Unknown usage codes are reported in place of the usage list
        let ext_key_usages = ext_key_usage_to_string(&cert.ext_key_usage)
            .unwrap_or_else(|err| err.to_string());

        writeln!(f, "Secret:")?;
        writeln!(f, "  Name: {}", self.name)?;
        writeln!(f, "  Issuer Country: {}", cert.issuer_country.join(", "))?;
        writeln!(f, "  Issuer Organisation: {}", cert.issuer_organisation.join(", "))?;
        writeln!(f, "  Issuer Common Name: {}", cert.issuer_common_name)?;
        writeln!(f, "  Key Usage: {}", key_usage_to_string(cert.key_usage))?;
        writeln!(f, "  Extended Key Usages: {}", ext_key_usages)?;
        writeln!(f, "  Public Key Algorithm: {}", cert.public_key_algorithm)?;
        writeln!(f, "  Signature Algorithm: {}", cert.signature_algorithm)?;
        writeln!(f, "  Subject Key ID: {}", hex::encode(&cert.subject_key_id))?;
        writeln!(f, "  Authority Key ID: {}", hex::encode(&cert.authority_key_id))?;
        writeln!(f, "  Serial Number: {}", serial_hex(&cert.serial_number))
    }
}

impl RequestDetails {
    /// Render the request followed by its event history
    pub fn render(&self, describer: &dyn EventDescriber) -> String {
        let mut out = format!(
            "CertificateRequest:\n  Name: {}\n  Namespace: {}\n  Conditions:\n{}",
            self.name,
            self.namespace,
            conditions_block(&self.conditions)
        );
        out.push_str(&describer.describe_events(&self.events, EVENT_INDENT_LEVEL));
        out
    }
}

impl Section<RequestDetails> {
    /// Render the section, or the lookup error when it failed
    pub fn render(&self, describer: &dyn EventDescriber) -> String {
        match self {
            Section::Collected(details) => details.render(describer),
            Section::Failed(err) => err.to_string(),
        }
    }
}

/// One line per condition, or a placeholder line when there are none
pub fn conditions_block(conditions: &[Condition]) -> String {
    if conditions.is_empty() {
        return "    No Conditions set\n".to_string();
    }
    conditions
        .iter()
        .map(|con| {
            format!(
                "    {}: {}, Reason: {}, Message: {}\n",
                con.type_, con.status, con.reason, con.message
            )
        })
        .collect()
}

/// Lowercase hex of the big-endian magnitude; zero renders empty
fn serial_hex(serial: &BigUint) -> String {
    if serial.bits() == 0 {
        return String::new();
    }
    hex::encode(serial.to_bytes_be())
}

/// Immutable snapshot of everything collected about one Certificate
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub(crate) name: String,
    pub(crate) namespace: String,
    pub(crate) creation_time: Option<DateTime<Utc>>,
    pub(crate) conditions: Vec<Condition>,
    pub(crate) dns_names: Vec<String>,
    pub(crate) events: Vec<Event>,
    pub(crate) not_before: Option<DateTime<Utc>>,
    pub(crate) not_after: Option<DateTime<Utc>>,
    pub(crate) renewal_time: Option<DateTime<Utc>>,
    pub(crate) issuer_kind: String,
    pub(crate) issuer: Option<IssuerReport>,
    pub(crate) secret: Option<CredentialReport>,
    pub(crate) request: Option<RequestReport>,
}

impl Report {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn creation_time(&self) -> Option<DateTime<Utc>> {
        self.creation_time
    }

    /// Conditions of the Certificate, in the order the resource lists them
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn dns_names(&self) -> &[String] {
        &self.dns_names
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn not_before(&self) -> Option<DateTime<Utc>> {
        self.not_before
    }

    pub fn not_after(&self) -> Option<DateTime<Utc>> {
        self.not_after
    }

    pub fn renewal_time(&self) -> Option<DateTime<Utc>> {
        self.renewal_time
    }

    /// Kind named by the Certificate's issuer reference
    pub fn issuer_kind(&self) -> &str {
        &self.issuer_kind
    }

    pub fn issuer(&self) -> Option<&IssuerReport> {
        self.issuer.as_ref()
    }

    pub fn secret(&self) -> Option<&CredentialReport> {
        self.secret.as_ref()
    }

    pub fn request(&self) -> Option<&RequestReport> {
        self.request.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::x509::{PublicKeyAlgorithm, SignatureAlgorithm};
    use crate::resources::events::MockEventDescriber;

    fn certificate_info() -> CertificateInfo {
        CertificateInfo {
            issuer_country: vec!["GB".to_string(), "US".to_string()],
            issuer_organisation: vec!["Example Org".to_string()],
            issuer_common_name: "Example CA".to_string(),
            key_usage: 1 | 4,
            ext_key_usage: vec![1, 2],
            public_key_algorithm: PublicKeyAlgorithm::Rsa,
            signature_algorithm: SignatureAlgorithm::Sha256WithRsa,
            subject_key_id: vec![0xab, 0x01],
            authority_key_id: vec![0xcd, 0xef],
            serial_number: BigUint::from(255u32),
        }
    }

    #[test]
    fn test_issuer_without_conditions() {
        let issuer = IssuerDetails {
            name: "ca-issuer".to_string(),
            kind: IssuerKind::ClusterIssuer,
            conditions: vec![],
        };
        assert_eq!(
            issuer.to_string(),
            "Issuer:\n  Name: ca-issuer\n  Kind: ClusterIssuer\n  Conditions:\n    No Conditions set\n"
        );
    }

    #[test]
    fn test_issuer_with_conditions() {
        let issuer = IssuerDetails {
            name: "ca-issuer".to_string(),
            kind: IssuerKind::Issuer,
            conditions: vec![
                Condition::new("Ready", "True", "Issued", "Certificate issued"),
                Condition::new("Ready", "False", "Pending", "Waiting"),
            ],
        };
        let out = issuer.to_string();
        assert!(out.contains("    Ready: True, Reason: Issued, Message: Certificate issued\n"));
        assert!(out.ends_with("    Ready: False, Reason: Pending, Message: Waiting\n"));
        assert!(!out.contains("No Conditions set"));
    }

    #[test]
    fn test_conditions_block_one_line_each() {
        let conditions = vec![
            Condition::new("Ready", "True", "Issued", "Certificate issued"),
            Condition::new("Issuing", "False", "", ""),
        ];
        assert_eq!(
            conditions_block(&conditions),
            "    Ready: True, Reason: Issued, Message: Certificate issued\n    Issuing: False, Reason: , Message: \n"
        );
        assert_eq!(conditions_block(&[]), "    No Conditions set\n");
    }

    #[test]
    fn test_failed_section_renders_error_only() {
        let report: IssuerReport = Section::Failed(Error::from("issuer lookup timed out"));
        assert_eq!(report.to_string(), "issuer lookup timed out");
        assert!(report.details().is_none());
        assert!(report.is_failed());
    }

    #[test]
    fn test_credential_rendering() {
        let secret = CredentialDetails {
            name: "example-tls".to_string(),
            certificate: certificate_info(),
        };
        let expected = "Secret:\n\
                        \x20 Name: example-tls\n\
                        \x20 Issuer Country: GB, US\n\
                        \x20 Issuer Organisation: Example Org\n\
                        \x20 Issuer Common Name: Example CA\n\
                        \x20 Key Usage: Digital Signature, Key Encipherment\n\
                        \x20 Extended Key Usages: Server Authentication, Client Authentication\n\
                        \x20 Public Key Algorithm: RSA\n\
                        \x20 Signature Algorithm: SHA256-RSA\n\
                        \x20 Subject Key ID: ab01\n\
                        \x20 Authority Key ID: cdef\n\
                        \x20 Serial Number: ff\n";
        assert_eq!(Section::Collected(secret).to_string(), expected);
    }

    #[test]
    fn test_credential_rendering_substitutes_usage_error() {
        let mut certificate = certificate_info();
        certificate.ext_key_usage = vec![1, 42];
        certificate.serial_number = BigUint::from(0u32);
        let out = CredentialDetails {
            name: "example-tls".to_string(),
            certificate,
        }
        .to_string();
        assert!(out.contains(
            "  Extended Key Usages: error when converting Extended Usages to string: \
             encountered unknown Extended Usage with code 42\n"
        ));
        assert!(out.ends_with("  Serial Number: \n"));
    }

    #[test]
    fn test_request_rendering_appends_events() {
        let request = RequestDetails {
            name: "example-1".to_string(),
            namespace: "default".to_string(),
            conditions: vec![],
            events: vec![Event {
                reason: Some("Issued".to_string()),
                ..Default::default()
            }],
        };

        let mut describer = MockEventDescriber::new();
        describer
            .expect_describe_events()
            .withf(|events: &[Event], indent: &usize| events.len() == 1 && *indent == EVENT_INDENT_LEVEL)
            .times(1)
            .returning(|_, _| "  Events:\t<stub>\n".to_string());

        let out = Section::Collected(request).render(&describer);
        assert_eq!(
            out,
            "CertificateRequest:\n  Name: example-1\n  Namespace: default\n  Conditions:\n    No Conditions set\n  Events:\t<stub>\n"
        );
    }

    #[test]
    fn test_failed_request_skips_describer() {
        let mut describer = MockEventDescriber::new();
        describer.expect_describe_events().never();

        let report: RequestReport = Section::Failed(Error::from(
            "certificaterequests.cert-manager.io \"example-1\" not found",
        ));
        assert_eq!(
            report.render(&describer),
            "certificaterequests.cert-manager.io \"example-1\" not found"
        );
    }
}
