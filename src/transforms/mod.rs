pub mod framing;
pub mod rle;

pub use framing::{decode as base64_decode, encode as base64_encode};
pub use rle::{compress as rle_compress, decompress as rle_decompress, MAX_RUN};
