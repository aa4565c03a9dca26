//! Base64 framing for identifiers on the wire.
//!
//! Identifiers are exchanged as standard (padded) base64 strings. Nothing
//! else about the wire format is interpreted here.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::{ItemIdError, Result};

pub fn decode(id: &str) -> Result<Vec<u8>> {
    let bytes = BASE64.decode(id.trim())?;
    if bytes.is_empty() {
        return Err(ItemIdError::InvalidIdentifier("Identifier is empty".to_string()));
    }
    Ok(bytes)
}

pub fn encode(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}
