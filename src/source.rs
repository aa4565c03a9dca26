use crate::error::Result;
use std::io::BufRead;

/// Something that hands out base64 identifiers observed from a live system.
pub trait IdentifierSource {
    fn next_identifier(&mut self) -> Result<Option<String>>;
}

/// Reads one identifier per line. Blank lines and lines starting with `#`
/// are skipped.
pub struct LineSource<R> {
    reader: R,
    line: String,
}

impl<R: BufRead> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line: String::new() }
    }
}

impl<R: BufRead> IdentifierSource for LineSource<R> {
    fn next_identifier(&mut self) -> Result<Option<String>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            let trimmed = self.line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            return Ok(Some(trimmed.to_string()));
        }
    }
}

pub fn collect_identifiers<S: IdentifierSource + ?Sized>(source: &mut S) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    while let Some(id) = source.next_identifier()? {
        ids.push(id);
    }
    log::debug!("Collected {} identifiers", ids.len());
    Ok(ids)
}
