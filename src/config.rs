use crate::error::ItemIdError;
use std::fmt;
use std::str::FromStr;

/// Upper bound on a decompressed identifier payload.
///
/// Identifiers are carried as at most 512 base64 characters, i.e. 384 bytes
/// once decoded, one of which is the compression tag.
pub const DEFAULT_MAX_LENGTH: usize = 383;

/// First byte of an identifier's byte form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompressionTag {
    Uncompressed = 0,
    RunLengthEncoded = 1,
}

impl CompressionTag {
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for CompressionTag {
    type Error = ItemIdError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(CompressionTag::Uncompressed),
            1 => Ok(CompressionTag::RunLengthEncoded),
            other => Err(ItemIdError::InvalidIdentifier(format!(
                "Unknown compression tag: {}",
                other
            ))),
        }
    }
}

impl FromStr for CompressionTag {
    type Err = ItemIdError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "uncompressed" | "none" | "0" => Ok(CompressionTag::Uncompressed),
            "rle" | "compressed" | "1" => Ok(CompressionTag::RunLengthEncoded),
            _ => Err(ItemIdError::ConfigError(format!("Invalid compression tag: {}", s))),
        }
    }
}

impl fmt::Display for CompressionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionTag::Uncompressed => write!(f, "uncompressed"),
            CompressionTag::RunLengthEncoded => write!(f, "rle"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VerifyConfig {
    pub max_length: usize,
    pub threads: usize,
    pub show_progress: bool,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            threads: num_cpus::get(),
            show_progress: true,
        }
    }
}

impl VerifyConfig {
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn validate(&self) -> Result<(), ItemIdError> {
        if self.threads == 0 {
            return Err(ItemIdError::ConfigError("Thread count must be at least 1".to_string()));
        }
        if self.max_length == 0 {
            return Err(ItemIdError::ConfigError("Maximum length must be at least 1".to_string()));
        }
        Ok(())
    }
}
