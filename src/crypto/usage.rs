use crate::error::Error;
use crate::types::Result;

/// Bits covered by the key usage table
const KEY_USAGE_MASK: u32 = 0x1ff;

/// Key usage flag values, largest first, with their labels
const KEY_USAGES: [(u32, &str); 9] = [
    (256, "Decipher Only"),
    (128, "Encipher Only"),
    (64, "CRL Sign"),
    (32, "Cert Sign"),
    (16, "Key Agreement"),
    (8, "Data Encipherment"),
    (4, "Key Encipherment"),
    (2, "Content Commitment"),
    (1, "Digital Signature"),
];

/// Extended key usage labels indexed by usage code
pub const EXT_KEY_USAGES: [&str; 14] = [
    "Any",
    "Server Authentication",
    "Client Authentication",
    "Code Signing",
    "Email Protection",
    "IPSEC End System",
    "IPSEC Tunnel",
    "IPSEC User",
    "Time Stamping",
    "OCSP Signing",
    "Microsoft Server Gated Crypto",
    "Netscape Server Gated Crypto",
    "Microsoft Commercial Code Signing",
    "Microsoft Kernel Code Signing",
];

/// Decode a key usage bit-set into labels, lowest bit first.
///
/// Bits above `Decipher Only` are ignored.
pub fn key_usage_to_labels(bits: u32) -> Vec<&'static str> {
    let mut remaining = bits & KEY_USAGE_MASK;
    let mut labels = Vec::new();
    for (value, label) in KEY_USAGES {
        if remaining >= value {
            remaining -= value;
            labels.push(label);
        }
        if remaining == 0 {
            break;
        }
    }
    labels.reverse();
    labels
}

/// Comma-joined form of [`key_usage_to_labels`]
pub fn key_usage_to_string(bits: u32) -> String {
    key_usage_to_labels(bits).join(", ")
}

/// Decode extended key usage codes into a comma-joined label list.
///
/// Fails on the first code outside the known table.
pub fn ext_key_usage_to_string(codes: &[i32]) -> Result<String> {
    let labels = codes
        .iter()
        .map(|&code| {
            usize::try_from(code)
                .ok()
                .and_then(|idx| EXT_KEY_USAGES.get(idx).copied())
                .ok_or(Error::UnknownExtKeyUsage(code))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(labels.join(", "))
}
