use thiserror::Error;

/// Generic error type
///
/// Errors are stored inside built reports, so every variant is cheap to
/// clone and compare.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Lookup failure reported by the caller's resource fetcher
    #[error("{0}")]
    Lookup(String),

    /// The Secret does not carry any certificate bytes
    #[error("error: '{key}' of Secret {secret:?} is not set")]
    MissingCertificateData { key: String, secret: String },

    /// The certificate bytes in the Secret could not be decoded
    #[error("error when parsing '{key}' of Secret {secret:?}: {reason}")]
    CertificateParse {
        key: String,
        secret: String,
        reason: String,
    },

    /// Certificate decoding error
    #[error("Certificate error: {0}")]
    Certificate(String),

    /// Extended key usage code outside the known table
    #[error("error when converting Extended Usages to string: encountered unknown Extended Usage with code {0}")]
    UnknownExtKeyUsage(i32),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<&str> for Error {
    fn from(err: &str) -> Self {
        Error::Lookup(err.to_string())
    }
}

impl From<String> for Error {
    fn from(err: String) -> Self {
        Error::Lookup(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_error_is_verbatim() {
        let err = Error::from("issuers.cert-manager.io \"ca\" not found");
        assert_eq!(err.to_string(), "issuers.cert-manager.io \"ca\" not found");
    }

    #[test]
    fn test_missing_certificate_data_message() {
        let err = Error::MissingCertificateData {
            key: "tls.crt".to_string(),
            secret: "example-tls".to_string(),
        };
        assert_eq!(err.to_string(), "error: 'tls.crt' of Secret \"example-tls\" is not set");
    }
}
