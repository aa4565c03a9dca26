use thiserror::Error;

#[derive(Error, Debug)]
pub enum ItemIdError {
	#[error("Invalid identifier: {0}")]
	InvalidIdentifier(String),

	#[error("Invalid base64 framing: {0}")]
	Base64(#[from] base64::DecodeError),

	#[error("I/O error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Encoding failed: {0}")]
	Encoding(String),

	#[error("Configuration error: {0}")]
	ConfigError(String),

	#[error("Verification failed: {0}")]
	VerificationFailed(String),
}

impl ItemIdError {
	/// True when the codec itself rejected the bytes, as opposed to a
	/// framing, I/O or comparison problem.
	pub fn is_invalid_identifier(&self) -> bool {
		matches!(self, ItemIdError::InvalidIdentifier(_))
	}
}

pub type Result<T> = std::result::Result<T, ItemIdError>;
