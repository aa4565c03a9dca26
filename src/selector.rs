use crate::config::CompressionTag;
use crate::error::{ItemIdError, Result};
use crate::transforms::rle;

/// An identifier in byte form, tag byte included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedIdentifier {
    pub bytes: Vec<u8>,
    pub tag: CompressionTag,
}

impl EncodedIdentifier {
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// A payload recovered from an identifier, along with the tag it was stored under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedIdentifier {
    pub tag: CompressionTag,
    pub payload: Vec<u8>,
}

/// Pick the stored representation for a raw payload.
///
/// The RLE form is used only when it is strictly shorter than the raw form
/// with its tag byte; otherwise the payload is stored behind tag 0.
pub fn encode_identifier(raw_payload: &[u8]) -> EncodedIdentifier {
    let mut stored = Vec::with_capacity(raw_payload.len() + 1);
    stored.push(CompressionTag::Uncompressed.as_byte());
    stored.extend_from_slice(raw_payload);

    let compressed = rle::compress(&stored, CompressionTag::RunLengthEncoded.as_byte());

    if compressed.len() < stored.len() {
        log::debug!(
            "Storing {}-byte payload RLE-compressed in {} bytes",
            raw_payload.len(),
            compressed.len()
        );
        EncodedIdentifier { bytes: compressed, tag: CompressionTag::RunLengthEncoded }
    } else {
        log::debug!("Storing {}-byte payload uncompressed", raw_payload.len());
        EncodedIdentifier { bytes: stored, tag: CompressionTag::Uncompressed }
    }
}

/// Strip the tag byte and undo whatever compression it names.
pub fn decode_identifier(bytes: &[u8], max_length: usize) -> Result<DecodedIdentifier> {
    let (&tag_byte, rest) = bytes
        .split_first()
        .ok_or_else(|| ItemIdError::InvalidIdentifier("Identifier is empty".to_string()))?;

    let tag = CompressionTag::try_from(tag_byte)?;
    let payload = match tag {
        CompressionTag::Uncompressed => {
            if rest.len() > max_length {
                return Err(ItemIdError::InvalidIdentifier(format!(
                    "Identifier length {} exceeds the maximum of {}",
                    rest.len(),
                    max_length
                )));
            }
            rest.to_vec()
        }
        CompressionTag::RunLengthEncoded => rle::decompress(bytes, max_length).map_err(|e| {
            log::warn!("Rejected compressed identifier: {}", e);
            e
        })?,
    };

    Ok(DecodedIdentifier { tag, payload })
}
