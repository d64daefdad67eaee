use std::fmt;
use tracing::trace;
use x509_parser::der_parser::asn1_rs::{Any, Class, ParseResult, Tag};
use x509_parser::der_parser::oid::Oid;
use x509_parser::extensions::{KeyUsage, ParsedExtension};
use x509_parser::num_bigint::BigUint;
use x509_parser::pem::parse_x509_pem;
use x509_parser::prelude::*;

use crate::error::Error;
use crate::types::Result;

const PEM_PREFIX: &[u8] = b"-----BEGIN";
const CERTIFICATE_LABEL: &str = "CERTIFICATE";

/// Algorithm of the certificate's subject public key. Unrecognized
/// algorithms display as `0`, like an unknown Go `x509.PublicKeyAlgorithm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKeyAlgorithm {
    Rsa,
    Dsa,
    Ecdsa,
    Ed25519,
    Unknown,
}

impl PublicKeyAlgorithm {
    fn from_oid(oid: &str) -> Self {
        match oid {
            "1.2.840.113549.1.1.1" => PublicKeyAlgorithm::Rsa,
            "1.2.840.10040.4.1" => PublicKeyAlgorithm::Dsa,
            "1.2.840.10045.2.1" => PublicKeyAlgorithm::Ecdsa,
            "1.3.101.112" => PublicKeyAlgorithm::Ed25519,
            _ => PublicKeyAlgorithm::Unknown,
        }
    }
}

impl fmt::Display for PublicKeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PublicKeyAlgorithm::Rsa => "RSA",
            PublicKeyAlgorithm::Dsa => "DSA",
            PublicKeyAlgorithm::Ecdsa => "ECDSA",
            PublicKeyAlgorithm::Ed25519 => "Ed25519",
            PublicKeyAlgorithm::Unknown => "0",
        };
        f.write_str(name)
    }
}

/// Algorithm the issuer used to sign the certificate, named the way Go's
/// `x509.SignatureAlgorithm` prints it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    Md2WithRsa,
    Md5WithRsa,
    Sha1WithRsa,
    Sha256WithRsa,
    Sha384WithRsa,
    Sha512WithRsa,
    Sha256WithRsaPss,
    Sha384WithRsaPss,
    Sha512WithRsaPss,
    DsaWithSha1,
    DsaWithSha256,
    EcdsaWithSha1,
    EcdsaWithSha256,
    EcdsaWithSha384,
    EcdsaWithSha512,
    Ed25519,
    Unknown,
}

impl SignatureAlgorithm {
    /// RSASSA-PSS is resolved through the hash named in its parameters
    fn from_identifier(id: &AlgorithmIdentifier) -> Self {
        let oid = id.algorithm.to_id_string();
        if oid != RSASSA_PSS_OID {
            return Self::from_oid(&oid);
        }
        match id.parameters.as_ref().and_then(pss_hash_oid).as_deref() {
            Some("2.16.840.1.101.3.4.2.1") => SignatureAlgorithm::Sha256WithRsaPss,
            Some("2.16.840.1.101.3.4.2.2") => SignatureAlgorithm::Sha384WithRsaPss,
            Some("2.16.840.1.101.3.4.2.3") => SignatureAlgorithm::Sha512WithRsaPss,
            _ => SignatureAlgorithm::Unknown,
        }
    }

    fn from_oid(oid: &str) -> Self {
        match oid {
            "1.2.840.113549.1.1.2" => SignatureAlgorithm::Md2WithRsa,
            "1.2.840.113549.1.1.4" => SignatureAlgorithm::Md5WithRsa,
            "1.2.840.113549.1.1.5" => SignatureAlgorithm::Sha1WithRsa,
            "1.2.840.113549.1.1.11" => SignatureAlgorithm::Sha256WithRsa,
            "1.2.840.113549.1.1.12" => SignatureAlgorithm::Sha384WithRsa,
            "1.2.840.113549.1.1.13" => SignatureAlgorithm::Sha512WithRsa,
            "1.2.840.10040.4.3" => SignatureAlgorithm::DsaWithSha1,
            "2.16.840.1.101.3.4.3.2" => SignatureAlgorithm::DsaWithSha256,
            "1.2.840.10045.4.1" => SignatureAlgorithm::EcdsaWithSha1,
            "1.2.840.10045.4.3.2" => SignatureAlgorithm::EcdsaWithSha256,
            "1.2.840.10045.4.3.3" => SignatureAlgorithm::EcdsaWithSha384,
            "1.2.840.10045.4.3.4" => SignatureAlgorithm::EcdsaWithSha512,
            "1.3.101.112" => SignatureAlgorithm::Ed25519,
            _ => SignatureAlgorithm::Unknown,
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignatureAlgorithm::Md2WithRsa => "MD2-RSA",
            SignatureAlgorithm::Md5WithRsa => "MD5-RSA",
            SignatureAlgorithm::Sha1WithRsa => "SHA1-RSA",
            SignatureAlgorithm::Sha256WithRsa => "SHA256-RSA",
            SignatureAlgorithm::Sha384WithRsa => "SHA384-RSA",
            SignatureAlgorithm::Sha512WithRsa => "SHA512-RSA",
            SignatureAlgorithm::Sha256WithRsaPss => "SHA256-RSAPSS",
            SignatureAlgorithm::Sha384WithRsaPss => "SHA384-RSAPSS",
            SignatureAlgorithm::Sha512WithRsaPss => "SHA512-RSAPSS",
            SignatureAlgorithm::DsaWithSha1 => "DSA-SHA1",
            SignatureAlgorithm::DsaWithSha256 => "DSA-SHA256",
            SignatureAlgorithm::EcdsaWithSha1 => "ECDSA-SHA1",
            SignatureAlgorithm::EcdsaWithSha256 => "ECDSA-SHA256",
            SignatureAlgorithm::EcdsaWithSha384 => "ECDSA-SHA384",
            SignatureAlgorithm::EcdsaWithSha512 => "ECDSA-SHA512",
            SignatureAlgorithm::Ed25519 => "Ed25519",
            SignatureAlgorithm::Unknown => "0",
        };
        f.write_str(name)
    }
}

const RSASSA_PSS_OID: &str = "1.2.840.113549.1.1.10";

/// Hash algorithm OID of RSASSA-PSS parameters; absent means the SHA-1 default
fn pss_hash_oid(params: &Any) -> Option<String> {
    let parsed: ParseResult<Any> = Any::from_der(params.data);
    let (_, hash) = parsed.ok()?;
    if hash.header.class() != Class::ContextSpecific || hash.header.tag() != Tag(0) {
        return None;
    }
    let (_, alg) = AlgorithmIdentifier::from_der(hash.data).ok()?;
    Some(alg.algorithm.to_id_string())
}

/// Extended key usage OIDs keyed to their usage code
const EXT_KEY_USAGE_OIDS: [(&str, i32); 14] = [
    ("2.5.29.37.0", 0),
    ("1.3.6.1.5.5.7.3.1", 1),
    ("1.3.6.1.5.5.7.3.2", 2),
    ("1.3.6.1.5.5.7.3.3", 3),
    ("1.3.6.1.5.5.7.3.4", 4),
    ("1.3.6.1.5.5.7.3.5", 5),
    ("1.3.6.1.5.5.7.3.6", 6),
    ("1.3.6.1.5.5.7.3.7", 7),
    ("1.3.6.1.5.5.7.3.8", 8),
    ("1.3.6.1.5.5.7.3.9", 9),
    ("1.3.6.1.4.1.311.10.3.3", 10),
    ("2.16.840.1.113730.4.1", 11),
    ("1.3.6.1.4.1.311.2.1.22", 12),
    ("1.3.6.1.4.1.311.61.1.1", 13),
];

/// Fields of a decoded X.509 certificate shown in the credential report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateInfo {
    pub issuer_country: Vec<String>,
    pub issuer_organisation: Vec<String>,
    pub issuer_common_name: String,
    /// Bit 0 is Digital Signature, bit 8 is Decipher Only
    pub key_usage: u32,
    /// Extended key usage codes, see [`crate::crypto::usage::EXT_KEY_USAGES`]
    pub ext_key_usage: Vec<i32>,
    pub public_key_algorithm: PublicKeyAlgorithm,
    pub signature_algorithm: SignatureAlgorithm,
    pub subject_key_id: Vec<u8>,
    pub authority_key_id: Vec<u8>,
    pub serial_number: BigUint,
}

/// Decode a PEM or DER encoded certificate
pub fn decode_certificate(data: &[u8]) -> Result<CertificateInfo> {
    let trimmed = trim_leading_whitespace(data);
    if !trimmed.starts_with(PEM_PREFIX) {
        return decode_der(data);
    }

    let (_, pem) = parse_x509_pem(trimmed)
        .map_err(|e| Error::Certificate(format!("error decoding certificate PEM block: {}", e)))?;
    if pem.label != CERTIFICATE_LABEL {
        return Err(Error::Certificate(format!(
            "unexpected PEM block type {:?}, expected {:?}",
            pem.label, CERTIFICATE_LABEL
        )));
    }
    trace!("Decoded PEM block of {} bytes", pem.contents.len());
    decode_der(&pem.contents)
}

fn trim_leading_whitespace(data: &[u8]) -> &[u8] {
    let start = data
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(data.len());
    &data[start..]
}

fn decode_der(der: &[u8]) -> Result<CertificateInfo> {
    let (_, cert) = X509Certificate::from_der(der)
        .map_err(|e| Error::Certificate(format!("error parsing x509 certificate: {}", e)))?;

    let issuer = cert.issuer();
    let issuer_country = attribute_values(issuer.iter_country());
    let issuer_organisation = attribute_values(issuer.iter_organization());
    let issuer_common_name = attribute_values(issuer.iter_common_name())
        .pop()
        .unwrap_or_default();

    let mut info = CertificateInfo {
        issuer_country,
        issuer_organisation,
        issuer_common_name,
        key_usage: 0,
        ext_key_usage: Vec::new(),
        public_key_algorithm: PublicKeyAlgorithm::from_oid(
            &cert.public_key().algorithm.algorithm.to_id_string(),
        ),
        signature_algorithm: SignatureAlgorithm::from_identifier(&cert.signature_algorithm),
        subject_key_id: Vec::new(),
        authority_key_id: Vec::new(),
        serial_number: cert.tbs_certificate.serial.clone(),
    };

    for ext in cert.extensions() {
        match ext.parsed_extension() {
            ParsedExtension::KeyUsage(usage) => info.key_usage = key_usage_bits(usage),
            ParsedExtension::ExtendedKeyUsage(_) => {
                info.ext_key_usage = ext_key_usage_codes(ext.value)?;
            }
            ParsedExtension::SubjectKeyIdentifier(id) => info.subject_key_id = id.0.to_vec(),
            ParsedExtension::AuthorityKeyIdentifier(aki) => {
                if let Some(id) = &aki.key_identifier {
                    info.authority_key_id = id.0.to_vec();
                }
            }
            _ => {}
        }
    }

    Ok(info)
}

fn attribute_values<'a, 'b: 'a>(
    values: impl Iterator<Item = &'a AttributeTypeAndValue<'b>>,
) -> Vec<String> {
    values
        .filter_map(|attr| attr.as_str().ok())
        .map(str::to_string)
        .collect()
}

fn key_usage_bits(usage: &KeyUsage) -> u32 {
    [
        usage.digital_signature(),
        usage.non_repudiation(),
        usage.key_encipherment(),
        usage.data_encipherment(),
        usage.key_agreement(),
        usage.key_cert_sign(),
        usage.crl_sign(),
        usage.encipher_only(),
        usage.decipher_only(),
    ]
    .iter()
    .enumerate()
    .filter(|(_, set)| **set)
    .fold(0, |bits, (bit, _)| bits | (1 << bit))
}

/// Codes of the usages listed in a raw ExtendedKeyUsage value, in extension order
fn ext_key_usage_codes(value: &[u8]) -> Result<Vec<i32>> {
    let parsed: ParseResult<Vec<Oid>> = <Vec<Oid>>::from_der(value);
    let (_, oids) = parsed
        .map_err(|e| Error::Certificate(format!("error parsing extended key usage: {}", e)))?;

    let mut codes = Vec::with_capacity(oids.len());
    for oid in &oids {
        let id = oid.to_id_string();
        match EXT_KEY_USAGE_OIDS.iter().find(|(known, _)| *known == id) {
            Some((_, code)) => codes.push(*code),
            None => trace!("Skipping unknown extended key usage {}", id),
        }
    }
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::usage::ext_key_usage_to_string;
    use rcgen::{
        CertificateParams, DnType, ExtendedKeyUsagePurpose, KeyPair, KeyUsagePurpose, SerialNumber,
    };

    fn generate_test_cert() -> rcgen::Certificate {
        let mut params = CertificateParams::default();
        params.distinguished_name.push(DnType::CountryName, "GB");
        params.distinguished_name.push(DnType::OrganizationName, "Example Org");
        params.distinguished_name.push(DnType::CommonName, "Example CA");
        params.serial_number = Some(SerialNumber::from(255u64));
        params.key_usages = vec![
            KeyUsagePurpose::DigitalSignature,
            KeyUsagePurpose::KeyEncipherment,
        ];
        params.extended_key_usages = vec![
            ExtendedKeyUsagePurpose::ClientAuth,
            ExtendedKeyUsagePurpose::ServerAuth,
        ];

        let key_pair = KeyPair::generate().unwrap();
        params.self_signed(&key_pair).unwrap()
    }

    #[test]
    fn test_decode_der_certificate() {
        let cert = generate_test_cert();
        let info = decode_certificate(cert.der().as_ref()).unwrap();

        assert_eq!(info.issuer_country, vec!["GB"]);
        assert_eq!(info.issuer_organisation, vec!["Example Org"]);
        assert_eq!(info.issuer_common_name, "Example CA");
        assert_eq!(info.key_usage, 1 | 4);
        assert_eq!(info.ext_key_usage, vec![2, 1]);
        assert_eq!(info.public_key_algorithm, PublicKeyAlgorithm::Ecdsa);
        assert_eq!(info.signature_algorithm, SignatureAlgorithm::EcdsaWithSha256);
        assert_eq!(info.serial_number, BigUint::from(255u32));
    }

    #[test]
    fn test_decode_pem_certificate() {
        let cert = generate_test_cert();
        let pem = format!("\n{}", cert.pem());
        let info = decode_certificate(pem.as_bytes()).unwrap();
        assert_eq!(info.issuer_common_name, "Example CA");
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_certificate(b"definitely not a certificate").unwrap_err();
        assert!(matches!(err, Error::Certificate(_)));
    }

    #[test]
    fn test_decode_rejects_non_certificate_pem() {
        let key_pair = KeyPair::generate().unwrap();
        let err = decode_certificate(key_pair.serialize_pem().as_bytes()).unwrap_err();
        assert!(err.to_string().contains("unexpected PEM block type"));
    }

    #[test]
    fn test_ext_key_usage_keeps_extension_order() {
        let cert = generate_test_cert();
        let info = decode_certificate(cert.der().as_ref()).unwrap();
        assert_eq!(
            ext_key_usage_to_string(&info.ext_key_usage).unwrap(),
            "Client Authentication, Server Authentication"
        );
    }

    #[test]
    fn test_ext_key_usage_codes_keep_duplicates_and_skip_unknown() {
        let value = [
            0x30, 0x22,
            0x06, 0x08, 0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x02,
            0x06, 0x08, 0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x01,
            0x06, 0x02, 0x2a, 0x03,
            0x06, 0x08, 0x2b, 0x06, 0x01, 0x05, 0x05, 0x07, 0x03, 0x02,
        ];
        assert_eq!(ext_key_usage_codes(&value).unwrap(), vec![2, 1, 2]);
        assert!(ext_key_usage_codes(&[0x30, 0x03, 0x06]).is_err());
    }

    #[test]
    fn test_algorithm_names() {
        assert_eq!(PublicKeyAlgorithm::Rsa.to_string(), "RSA");
        assert_eq!(PublicKeyAlgorithm::Unknown.to_string(), "0");
        assert_eq!(SignatureAlgorithm::Sha256WithRsa.to_string(), "SHA256-RSA");
        assert_eq!(SignatureAlgorithm::from_oid("1.2.3"), SignatureAlgorithm::Unknown);
        assert_eq!(SignatureAlgorithm::Unknown.to_string(), "0");
    }

    #[test]
    fn test_rsa_pss_named_by_hash() {
        // AlgorithmIdentifier { rsassa-pss, { [0] sha256 } }
        let der = [
            0x30, 0x1e,
            0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x0a,
            0x30, 0x11, 0xa0, 0x0f,
            0x30, 0x0d,
            0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01,
            0x05, 0x00,
        ];
        let (_, id) = AlgorithmIdentifier::from_der(&der).unwrap();
        let algorithm = SignatureAlgorithm::from_identifier(&id);
        assert_eq!(algorithm, SignatureAlgorithm::Sha256WithRsaPss);
        assert_eq!(algorithm.to_string(), "SHA256-RSAPSS");

        // Default parameters hash with SHA-1, which has no name
        let (_, id) = AlgorithmIdentifier::from_der(&[
            0x30, 0x0d,
            0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x0a,
            0x30, 0x00,
        ])
        .unwrap();
        assert_eq!(SignatureAlgorithm::from_identifier(&id), SignatureAlgorithm::Unknown);
    }
}
