//! # itemid
//!
//! Codec and verification tools for the compact identifiers a mail server
//! hands out for items, folders and conversations.
//!
//! On the wire an identifier is a base64 string. Decoded, its first byte is a
//! compression tag (`0` stored raw, `1` run-length encoded) and the rest is
//! the payload.
//!
//! ## Features
//!
//! - **RLE Codec**: bit-exact `compress`/`decompress` for identifier payloads,
//!   including the fall back to the raw input when compression does not pay
//! - **Tag Selection**: stores a payload compressed only when that is strictly
//!   shorter
//! - **Round-trip Verification**: checks identifiers observed from a live
//!   server against the codec, one at a time or in parallel batches
//! - **Layout Parsing**: reads storage type, moniker, store id, folder id and
//!   attachment ids out of a decoded payload
//!
//! ## Quick Start
//!
//! ```rust
//! use itemid::{decode_id, encode_id, CompressionTag};
//!
//! let payload = [0x41u8; 5];
//! let (id, tag) = encode_id(&payload);
//! assert_eq!(tag, CompressionTag::RunLengthEncoded);
//!
//! let decoded = decode_id(&id).unwrap();
//! assert_eq!(decoded, payload.to_vec());
//! ```
//!
//! ### Checking observed identifiers
//!
//! ```rust
//! use itemid::{verify_id, encode_id};
//!
//! let (id, _) = encode_id(&[0u8; 24]);
//! assert!(verify_id(&id).unwrap());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod layout;
pub mod selector;
pub mod source;
pub mod transforms;
pub mod verify;

// Re-export commonly used types for convenience
pub use config::{CompressionTag, VerifyConfig, DEFAULT_MAX_LENGTH};
pub use error::{ItemIdError, Result};
pub use layout::{parse_item_id, IdBody, IdProcessingInstruction, IdStorageType, ItemIdLayout, ParsedItemId};
pub use selector::{decode_identifier, encode_identifier, DecodedIdentifier, EncodedIdentifier};
pub use source::{collect_identifiers, IdentifierSource, LineSource};
pub use transforms::rle::{compress, decompress};
pub use verify::{verify_batch, verify_encoded, verify_round_trip, BatchStats, IdReport, Verdict};

/// Encode a raw payload as a base64 identifier
///
/// The payload is run-length encoded when that makes it shorter, and stored
/// as-is otherwise. The chosen tag is returned alongside the identifier.
///
/// # Example
///
/// ```rust
/// use itemid::{encode_id, CompressionTag};
///
/// let (id, tag) = encode_id(&[1, 2, 3]);
/// assert_eq!(tag, CompressionTag::Uncompressed);
/// assert_eq!(id, "AAECAw==");
/// ```
pub fn encode_id(payload: &[u8]) -> (String, CompressionTag) {
    let encoded = encode_identifier(payload);
    (transforms::framing::encode(&encoded.bytes), encoded.tag)
}

/// Decode a base64 identifier to its payload
///
/// Uses [`DEFAULT_MAX_LENGTH`] as the bound on the decompressed size. Use
/// [`decode_identifier`] directly for a different bound.
///
/// # Example
///
/// ```rust
/// use itemid::decode_id;
///
/// assert_eq!(decode_id("AUFBAw==").unwrap(), vec![0x41; 5]);
/// ```
pub fn decode_id(id: &str) -> Result<Vec<u8>> {
    let bytes = transforms::framing::decode(id)?;
    Ok(decode_identifier(&bytes, DEFAULT_MAX_LENGTH)?.payload)
}

/// Check that a base64 identifier is exactly what this codec would produce
///
/// Returns `Ok(false)` when the identifier decodes but does not round-trip,
/// and an error when the codec rejects it outright.
pub fn verify_id(id: &str) -> Result<bool> {
    Ok(verify_encoded(id, DEFAULT_MAX_LENGTH)?.passed())
}

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get library version information
pub fn version_info() -> VersionInfo {
    VersionInfo {
        version: VERSION,
        authors: AUTHORS,
        description: DESCRIPTION,
    }
}

#[derive(Debug, Clone)]
pub struct VersionInfo {
    pub version: &'static str,
    pub authors: &'static str,
    pub description: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_id() {
        let payload = b"mailbox-guid-0000000000000000";
        let (id, tag) = encode_id(payload);
        assert_eq!(tag, CompressionTag::RunLengthEncoded);
        assert_eq!(decode_id(&id).unwrap(), payload.to_vec());
    }

    #[test]
    fn test_decode_known_ids() {
        assert_eq!(decode_id("AUFBAw==").unwrap(), vec![0x41; 5]);
        assert_eq!(decode_id("AAECAw==").unwrap(), vec![1, 2, 3]);
        assert!(decode_id("AQUF").unwrap_err().is_invalid_identifier());
    }

    #[test]
    fn test_verify_id() {
        assert!(verify_id("AUFBAw==").unwrap());
        // [0, 7, 7, 7, 7, 7, 7] should have been stored compressed
        assert!(!verify_id("AAcHBwcHBw==").unwrap());
        assert!(verify_id("AQUF").is_err());
    }

    #[test]
    fn test_version_info() {
        let info = version_info();
        assert!(!info.version.is_empty());
        assert!(!info.description.is_empty());
    }
}
