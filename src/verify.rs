use crate::config::{CompressionTag, VerifyConfig};
use crate::error::{ItemIdError, Result};
use crate::transforms::{framing, rle};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

/// Outcome of checking one observed identifier against the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
	/// The identifier is exactly what this codec would have produced.
	Reproduced,
	/// Recompressing the decompressed payload gave different bytes.
	Mismatch { expected: Vec<u8>, actual: Vec<u8> },
	/// Stored raw although the RLE form would have been shorter.
	ShouldHaveCompressed { stored_len: usize, compressed_len: usize },
	/// Bytes matched but the base64 text did not.
	FramingMismatch { expected: String, actual: String },
}

impl Verdict {
	pub fn passed(&self) -> bool {
		matches!(self, Verdict::Reproduced)
	}

	pub fn describe(&self) -> String {
		match self {
			Verdict::Reproduced => "round trip reproduced the identifier".to_string(),
			Verdict::Mismatch { expected, actual } => format!(
				"recompressed identifier differs: expected {} bytes, got {} bytes",
				expected.len(),
				actual.len()
			),
			Verdict::ShouldHaveCompressed { stored_len, compressed_len } => format!(
				"identifier stored uncompressed in {} bytes but compresses to {}",
				stored_len, compressed_len
			),
			Verdict::FramingMismatch { expected, actual } => {
				format!("base64 framing differs: expected {}, got {}", expected, actual)
			}
		}
	}
}

/// Check an identifier in byte form (tag byte included).
///
/// Compressed identifiers must survive decompress then recompress unchanged.
/// Uncompressed identifiers must not have a strictly shorter RLE form.
pub fn verify_round_trip(identifier: &[u8], max_length: usize) -> Result<Verdict> {
	let tag_byte = *identifier
		.first()
		.ok_or_else(|| ItemIdError::InvalidIdentifier("Identifier is empty".to_string()))?;

	match CompressionTag::try_from(tag_byte)? {
		CompressionTag::RunLengthEncoded => {
			let payload = rle::decompress(identifier, max_length)?;

			let mut slot = Vec::with_capacity(payload.len() + 1);
			slot.push(CompressionTag::Uncompressed.as_byte());
			slot.extend_from_slice(&payload);
			let recompressed = rle::compress(&slot, CompressionTag::RunLengthEncoded.as_byte());

			if recompressed == identifier {
				Ok(Verdict::Reproduced)
			} else {
				Ok(Verdict::Mismatch { expected: identifier.to_vec(), actual: recompressed })
			}
		}
		CompressionTag::Uncompressed => {
			let compressed = rle::compress(identifier, CompressionTag::RunLengthEncoded.as_byte());
			if compressed.len() < identifier.len() {
				Ok(Verdict::ShouldHaveCompressed {
					stored_len: identifier.len(),
					compressed_len: compressed.len(),
				})
			} else {
				Ok(Verdict::Reproduced)
			}
		}
	}
}

/// Check a base64 identifier, including that re-framing gives back the same text.
pub fn verify_encoded(id: &str, max_length: usize) -> Result<Verdict> {
	let id = id.trim();
	let bytes = framing::decode(id)?;

	let verdict = verify_round_trip(&bytes, max_length)?;
	if !verdict.passed() {
		return Ok(verdict);
	}

	let reframed = framing::encode(&bytes);
	if reframed != id {
		return Ok(Verdict::FramingMismatch { expected: id.to_string(), actual: reframed });
	}
	Ok(Verdict::Reproduced)
}

/// Result of verifying one identifier in a batch.
#[derive(Debug)]
pub struct IdReport {
	pub index: usize,
	pub id: String,
	pub tag: Option<CompressionTag>,
	pub outcome: Result<Verdict>,
}

impl IdReport {
	pub fn passed(&self) -> bool {
		matches!(&self.outcome, Ok(v) if v.passed())
	}
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchStats {
	pub total: usize,
	pub passed: usize,
	pub failed: usize,
	pub rejected: usize,
	pub compressed: usize,
	pub uncompressed: usize,
}

impl BatchStats {
	fn add(&mut self, report: &IdReport) {
		self.total += 1;
		match &report.outcome {
			Ok(v) if v.passed() => self.passed += 1,
			Ok(_) => self.failed += 1,
			Err(_) => self.rejected += 1,
		}
		match report.tag {
			Some(CompressionTag::RunLengthEncoded) => self.compressed += 1,
			Some(CompressionTag::Uncompressed) => self.uncompressed += 1,
			None => {}
		}
	}

	pub fn all_passed(&self) -> bool {
		self.passed == self.total
	}
}

/// Verify many base64 identifiers in parallel.
///
/// `on_report` sees every report as soon as it is produced, from whichever
/// worker produced it. The returned reports are in input order.
pub fn verify_batch<F>(ids: &[String], config: &VerifyConfig, on_report: F) -> Result<(BatchStats, Vec<IdReport>)>
where
	F: Fn(&IdReport) + Sync,
{
	config.validate()?;

	let pool = rayon::ThreadPoolBuilder::new()
		.num_threads(config.threads)
		.build()
		.map_err(|e| ItemIdError::ConfigError(e.to_string()))?;

	let pb = if config.show_progress {
		let pb = ProgressBar::new(ids.len() as u64);
		if let Ok(style) = ProgressStyle::default_bar()
			.template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] Ids {pos}/{len} ({eta})")
		{
			pb.set_style(style.progress_chars("#>-"));
		}
		pb
	} else {
		ProgressBar::hidden()
	};

	let reports: Vec<IdReport> = pool.install(|| {
		ids.par_iter()
			.enumerate()
			.map(|(index, id)| {
				let report = check_one(index, id, config.max_length);
				on_report(&report);
				pb.inc(1);
				report
			})
			.collect()
	});

	pb.finish_with_message("Verification finished");

	let mut stats = BatchStats::default();
	for report in &reports {
		stats.add(report);
	}
	log::info!(
		"Verified {} identifiers: {} passed, {} failed, {} rejected",
		stats.total,
		stats.passed,
		stats.failed,
		stats.rejected
	);

	Ok((stats, reports))
}

fn check_one(index: usize, id: &str, max_length: usize) -> IdReport {
	let tag = framing::decode(id)
		.ok()
		.and_then(|bytes| CompressionTag::try_from(bytes[0]).ok());

	let outcome = verify_encoded(id, max_length);
	match &outcome {
		Ok(v) if !v.passed() => log::warn!("Identifier #{} failed: {}", index, v.describe()),
		Err(e) => log::warn!("Identifier #{} rejected: {}", index, e),
		_ => log::debug!("Identifier #{} reproduced", index),
	}

	IdReport { index, id: id.to_string(), tag, outcome }
}
