//! Run-length encoding for identifier payloads.
//! Format: bytes that do not repeat are written directly; a run of two or
//! more equal bytes is written as [BYTE][BYTE][COUNT], where COUNT is the run
//! length minus two. Byte 0 of both the input and the output is reserved for
//! the compression tag and is never transformed.

use crate::error::{ItemIdError, Result};

/// Longest run a single fold can describe: the count byte plus the two
/// literal repeats that precede it.
pub const MAX_RUN: usize = u8::MAX as usize + 2;

/// Compress `input[1..]`, writing `compressor_tag` at output position 0.
///
/// The output is bounded to `input.len()` bytes. As soon as a write fills
/// that bound the partial encoding is discarded and a copy of `input` is
/// returned unchanged, so the result is never longer than the input and is
/// strictly shorter exactly when compression paid off.
pub fn compress(input: &[u8], compressor_tag: u8) -> Vec<u8> {
    if input.is_empty() {
        return Vec::new();
    }

    let limit = input.len();
    let mut out = Vec::with_capacity(limit);

    if !push(&mut out, compressor_tag, limit) {
        return input.to_vec();
    }

    let mut run_start = 1;
    while run_start < limit {
        let byte = input[run_start];
        if !push(&mut out, byte, limit) {
            return input.to_vec();
        }

        let max_run = MAX_RUN.min(limit - run_start);
        let mut run_length = 1;
        while run_length < max_run && input[run_start + run_length] == byte {
            run_length += 1;
        }

        if run_length > 1
            && (!push(&mut out, byte, limit) || !push(&mut out, (run_length - 2) as u8, limit))
        {
            return input.to_vec();
        }

        run_start += run_length;
    }

    out
}

// False once the output has grown as long as the input.
fn push(out: &mut Vec<u8>, byte: u8, limit: usize) -> bool {
    out.push(byte);
    out.len() < limit
}

/// Decompress `input[1..]`, returning the payload without the tag byte.
///
/// Fails with `InvalidIdentifier` when a repeated pair has no count byte
/// after it, or when the output would grow past `max_length`.
pub fn decompress(input: &[u8], max_length: usize) -> Result<Vec<u8>> {
    // A compressed stream is not necessarily shorter than its expansion
    // ("xx\0" expands to "xx"), so both bounds are considered here.
    let mut out = Vec::with_capacity(input.len().min(max_length));

    let mut i = 1;
    while i < input.len() {
        let byte = input[i];
        if i == input.len() - 1 || byte != input[i + 1] {
            out.push(byte);
            i += 1;
        } else {
            if i == input.len() - 2 {
                return Err(ItemIdError::InvalidIdentifier(
                    "Repeated byte at end of compressed identifier has no run length".to_string(),
                ));
            }

            let run = input[i + 2] as usize + 2;
            if out.len() + run > max_length {
                return Err(exceeds(out.len() + run, max_length));
            }
            out.resize(out.len() + run, byte);
            i += 3;
        }

        if out.len() > max_length {
            return Err(exceeds(out.len(), max_length));
        }
    }

    Ok(out)
}

fn exceeds(length: usize, max_length: usize) -> ItemIdError {
    ItemIdError::InvalidIdentifier(format!(
        "Decompressed identifier length {} exceeds the maximum of {}",
        length, max_length
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rle_run_of_five() {
        let input = [0, 0x41, 0x41, 0x41, 0x41, 0x41];
        assert_eq!(compress(&input, 1), vec![1, 0x41, 0x41, 0x03]);
    }

    #[test]
    fn test_rle_decompress_run_of_five() {
        let decoded = decompress(&[1, 0x41, 0x41, 0x03], 10).unwrap();
        assert_eq!(decoded, vec![0x41; 5]);
    }

    #[test]
    fn test_rle_no_repeats_falls_back() {
        // Writing the last literal fills the buffer, so the input comes back.
        let input = [0, 0x01, 0x02, 0x03];
        let compressed = compress(&input, 1);
        assert_eq!(compressed, input.to_vec());
        assert_eq!(compressed[0], 0);
    }

    #[test]
    fn test_rle_tag_only() {
        assert_eq!(compress(&[0], 1), vec![0]);
        assert_eq!(compress(&[], 1), Vec::<u8>::new());
    }

    #[test]
    fn test_rle_fallback_fires_mid_stream() {
        // The trailing pair would be folded as [7, 7, 0], which is one byte
        // longer than its source. The fold itself fills the buffer.
        let input = [0, 0x09, 0x09, 0x09, 0x09, 0x01, 0x02, 0x07, 0x07];
        assert_eq!(compress(&input, 1), input.to_vec());

        // The same prefix on its own shrinks.
        let prefix = [0, 0x09, 0x09, 0x09, 0x09, 0x01, 0x02];
        assert_eq!(compress(&prefix, 1), vec![1, 0x09, 0x09, 0x02, 0x01, 0x02]);
    }

    #[test]
    fn test_rle_pair_is_not_a_gain() {
        let input = [0, 0x05, 0x05];
        assert_eq!(compress(&input, 1), input.to_vec());
    }

    #[test]
    fn test_rle_long_run_splits() {
        let mut input = vec![0];
        input.extend(vec![0xAB; 300]);

        let compressed = compress(&input, 1);
        // 257 in the first fold, 43 in the second.
        assert_eq!(compressed, vec![1, 0xAB, 0xAB, 255, 0xAB, 0xAB, 41]);
        assert_eq!(decompress(&compressed, 300).unwrap(), input[1..].to_vec());
    }

    #[test]
    fn test_rle_run_of_258_leaves_literal() {
        let mut input = vec![0];
        input.extend(vec![0x11; 258]);
        input.push(0x22);

        let compressed = compress(&input, 1);
        assert_eq!(compressed, vec![1, 0x11, 0x11, 255, 0x11, 0x22]);
        assert_eq!(decompress(&compressed, 383).unwrap(), input[1..].to_vec());
    }

    #[test]
    fn test_rle_missing_run_length() {
        let err = decompress(&[1, 0x05, 0x05], 10).unwrap_err();
        assert!(err.is_invalid_identifier());
    }

    #[test]
    fn test_rle_exceeds_max_length() {
        let err = decompress(&[1, 0x41, 0x41, 0x03], 4).unwrap_err();
        assert!(err.is_invalid_identifier());
    }

    #[test]
    fn test_rle_exceeds_max_length_with_literals() {
        let err = decompress(&[0, 1, 2, 3, 4, 5], 4).unwrap_err();
        assert!(err.is_invalid_identifier());
        assert_eq!(decompress(&[0, 1, 2, 3, 4], 4).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_rle_zero_count_fold_expands_to_pair() {
        assert_eq!(decompress(&[1, 0x08, 0x08, 0x00], 10).unwrap(), vec![0x08, 0x08]);
    }

    #[test]
    fn test_rle_decompress_ignores_tag() {
        assert_eq!(decompress(&[0x7F], 10).unwrap(), Vec::<u8>::new());
        assert_eq!(decompress(&[], 10).unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_rle_mixed_round_trip() {
        let input = vec![0, 3, 3, 3, 3, 3, 3, 1, 2, 0, 0, 0, 0, 9, 4, 4, 4, 4, 4];
        let compressed = compress(&input, 1);
        assert_eq!(compressed[0], 1);
        assert!(compressed.len() < input.len());
        assert_eq!(decompress(&compressed, 383).unwrap(), input[1..].to_vec());
    }
}
