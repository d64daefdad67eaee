pub mod usage;
pub mod x509;

// Re-export key types
pub use usage::{ext_key_usage_to_string, key_usage_to_labels, key_usage_to_string};
pub use x509::{decode_certificate, CertificateInfo, PublicKeyAlgorithm, SignatureAlgorithm};
