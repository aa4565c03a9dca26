//! Layout of a decoded identifier payload.
//!
//! After the compression tag has been stripped, every identifier starts with
//! a storage-type byte which decides how the rest is laid out. All lengths
//! are little-endian 16-bit values.
//!
//! ```text
//! mailbox kinds    [u16 moniker len][moniker][u8 instruction][u16 store id len][store id]
//! PublicFolder     [u16 store id len][store id]
//! AD object        [u16 store id len][store id]
//! PublicFolderItem [u8 instruction][u16 store id len][store id][u16 folder id len][folder id]
//! ```
//!
//! Any body may be followed by `[u8 count]` and `count` length-prefixed
//! attachment ids.

use crate::config::{CompressionTag, DEFAULT_MAX_LENGTH};
use crate::error::{ItemIdError, Result};
use crate::selector::{decode_identifier, encode_identifier, EncodedIdentifier};
use crate::transforms::framing;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fmt;
use std::io::{Cursor, Read, Write};

/// Which store an identifier points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IdStorageType {
	/// Item or folder in a mailbox, keyed by primary SMTP address.
	MailboxItemSmtpAddressBased = 0,
	PublicFolder = 1,
	PublicFolderItem = 2,
	/// Item or folder in a mailbox, keyed by mailbox GUID.
	MailboxItemMailboxGuidBased = 3,
	ConversationIdMailboxGuidBased = 4,
	/// Active Directory object, keyed by objectGuid.
	ActiveDirectoryObject = 5,
}

impl IdStorageType {
	pub const ALL: [IdStorageType; 6] = [
		IdStorageType::MailboxItemSmtpAddressBased,
		IdStorageType::PublicFolder,
		IdStorageType::PublicFolderItem,
		IdStorageType::MailboxItemMailboxGuidBased,
		IdStorageType::ConversationIdMailboxGuidBased,
		IdStorageType::ActiveDirectoryObject,
	];

	pub fn is_mailbox(self) -> bool {
		matches!(
			self,
			IdStorageType::MailboxItemSmtpAddressBased
				| IdStorageType::MailboxItemMailboxGuidBased
				| IdStorageType::ConversationIdMailboxGuidBased
		)
	}
}

impl TryFrom<u8> for IdStorageType {
	type Error = ItemIdError;

	fn try_from(value: u8) -> Result<Self> {
		IdStorageType::ALL
			.iter()
			.copied()
			.find(|t| *t as u8 == value)
			.ok_or_else(|| ItemIdError::InvalidIdentifier(format!("Undefined id storage type: {}", value)))
	}
}

impl fmt::Display for IdStorageType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(self, f)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IdProcessingInstruction {
	Normal = 0,
	Recurrence = 1,
	Series = 2,
}

impl TryFrom<u8> for IdProcessingInstruction {
	type Error = ItemIdError;

	fn try_from(value: u8) -> Result<Self> {
		match value {
			0 => Ok(IdProcessingInstruction::Normal),
			1 => Ok(IdProcessingInstruction::Recurrence),
			2 => Ok(IdProcessingInstruction::Series),
			other => Err(ItemIdError::InvalidIdentifier(format!(
				"Undefined id processing instruction: {}",
				other
			))),
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdBody {
	Mailbox { moniker: Vec<u8>, instruction: IdProcessingInstruction, store_id: Vec<u8> },
	Store { store_id: Vec<u8> },
	PublicFolderItem { instruction: IdProcessingInstruction, store_id: Vec<u8>, folder_id: Vec<u8> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemIdLayout {
	pub storage_type: IdStorageType,
	pub body: IdBody,
	pub attachment_ids: Vec<Vec<u8>>,
}

impl ItemIdLayout {
	/// Parse a payload that has already had its compression tag removed.
	pub fn parse(payload: &[u8]) -> Result<Self> {
		let mut reader = Cursor::new(payload);
		let layout = read_layout(&mut reader).map_err(truncated)?;

		let consumed = reader.position() as usize;
		if consumed != payload.len() {
			return Err(ItemIdError::InvalidIdentifier(format!(
				"{} bytes left after parsing identifier",
				payload.len() - consumed
			)));
		}
		layout.check_body()?;
		Ok(layout)
	}

	pub fn to_payload(&self) -> Result<Vec<u8>> {
		self.check_body()?;
		let mut out = Vec::new();
		out.write_u8(self.storage_type as u8)?;

		match &self.body {
			IdBody::Mailbox { moniker, instruction, store_id } => {
				write_field(&mut out, moniker)?;
				out.write_u8(*instruction as u8)?;
				write_field(&mut out, store_id)?;
			}
			IdBody::Store { store_id } => write_field(&mut out, store_id)?,
			IdBody::PublicFolderItem { instruction, store_id, folder_id } => {
				out.write_u8(*instruction as u8)?;
				write_field(&mut out, store_id)?;
				write_field(&mut out, folder_id)?;
			}
		}

		if !self.attachment_ids.is_empty() {
			let count = u8::try_from(self.attachment_ids.len()).map_err(|_| {
				ItemIdError::Encoding(format!("Too many attachment ids: {}", self.attachment_ids.len()))
			})?;
			out.write_u8(count)?;
			for id in &self.attachment_ids {
				write_field(&mut out, id)?;
			}
		}
		Ok(out)
	}

	/// Serialize, pick a compression tag and frame as base64.
	pub fn to_identifier(&self) -> Result<String> {
		let EncodedIdentifier { bytes, .. } = encode_identifier(&self.to_payload()?);
		Ok(framing::encode(&bytes))
	}

	pub fn instruction(&self) -> Option<IdProcessingInstruction> {
		match &self.body {
			IdBody::Mailbox { instruction, .. } | IdBody::PublicFolderItem { instruction, .. } => Some(*instruction),
			IdBody::Store { .. } => None,
		}
	}

	pub fn store_id(&self) -> &[u8] {
		match &self.body {
			IdBody::Mailbox { store_id, .. }
			| IdBody::Store { store_id }
			| IdBody::PublicFolderItem { store_id, .. } => store_id,
		}
	}

	pub fn folder_id(&self) -> Option<&[u8]> {
		match &self.body {
			IdBody::PublicFolderItem { folder_id, .. } => Some(folder_id),
			_ => None,
		}
	}

	/// Mailbox GUID or SMTP address, for mailbox-backed identifiers.
	pub fn moniker_str(&self) -> Option<&str> {
		match &self.body {
			IdBody::Mailbox { moniker, .. } => std::str::from_utf8(moniker).ok(),
			_ => None,
		}
	}

	fn check_body(&self) -> Result<()> {
		let consistent = match self.body {
			IdBody::Mailbox { .. } => self.storage_type.is_mailbox(),
			IdBody::Store { .. } => matches!(
				self.storage_type,
				IdStorageType::PublicFolder | IdStorageType::ActiveDirectoryObject
			),
			IdBody::PublicFolderItem { .. } => self.storage_type == IdStorageType::PublicFolderItem,
		};
		if consistent {
			Ok(())
		} else {
			Err(ItemIdError::Encoding(format!("Body does not match storage type {}", self.storage_type)))
		}
	}
}

/// A fully decoded identifier as observed on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedItemId {
	pub compression: CompressionTag,
	pub layout: ItemIdLayout,
}

/// Decode a base64 identifier and parse its layout.
pub fn parse_item_id(id: &str, max_length: usize) -> Result<ParsedItemId> {
	let bytes = framing::decode(id)?;
	let decoded = decode_identifier(&bytes, max_length)?;
	let layout = ItemIdLayout::parse(&decoded.payload)?;
	Ok(ParsedItemId { compression: decoded.tag, layout })
}

impl std::str::FromStr for ParsedItemId {
	type Err = ItemIdError;
	fn from_str(s: &str) -> Result<Self> {
		parse_item_id(s, DEFAULT_MAX_LENGTH)
	}
}

fn read_layout<R: Read>(reader: &mut R) -> Result<ItemIdLayout> {
	let storage_type = IdStorageType::try_from(reader.read_u8()?)?;

	let body = match storage_type {
		IdStorageType::MailboxItemSmtpAddressBased
		| IdStorageType::MailboxItemMailboxGuidBased
		| IdStorageType::ConversationIdMailboxGuidBased => {
			let moniker = read_field(reader)?;
			let instruction = IdProcessingInstruction::try_from(reader.read_u8()?)?;
			let store_id = read_field(reader)?;
			IdBody::Mailbox { moniker, instruction, store_id }
		}
		IdStorageType::PublicFolder | IdStorageType::ActiveDirectoryObject => {
			IdBody::Store { store_id: read_field(reader)? }
		}
		IdStorageType::PublicFolderItem => {
			let instruction = IdProcessingInstruction::try_from(reader.read_u8()?)?;
			let store_id = read_field(reader)?;
			let folder_id = read_field(reader)?;
			IdBody::PublicFolderItem { instruction, store_id, folder_id }
		}
	};

	let mut attachment_ids = Vec::new();
	match reader.read_u8() {
		Ok(count) => {
			for _ in 0..count {
				attachment_ids.push(read_field(reader)?);
			}
		}
		Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {}
		Err(e) => return Err(e.into()),
	}

	Ok(ItemIdLayout { storage_type, body, attachment_ids })
}

fn read_field<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
	let len = reader.read_u16::<LittleEndian>()?;
	let mut data = vec![0; len as usize];
	reader.read_exact(&mut data)?;
	Ok(data)
}

fn write_field<W: Write>(writer: &mut W, data: &[u8]) -> Result<()> {
	let len = u16::try_from(data.len())
		.map_err(|_| ItemIdError::Encoding(format!("Field of {} bytes is too long", data.len())))?;
	writer.write_u16::<LittleEndian>(len)?;
	writer.write_all(data)?;
	Ok(())
}

fn truncated(e: ItemIdError) -> ItemIdError {
	match e {
		ItemIdError::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
			ItemIdError::InvalidIdentifier("Identifier ends in the middle of a field".to_string())
		}
		other => other,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn mailbox_layout() -> ItemIdLayout {
		ItemIdLayout {
			storage_type: IdStorageType::MailboxItemMailboxGuidBased,
			body: IdBody::Mailbox {
				moniker: b"2b7e1a6c-5c0e-4b7d-9f3a-000000000000".to_vec(),
				instruction: IdProcessingInstruction::Normal,
				store_id: vec![0, 0, 0, 0, 0, 0, 0, 0, 0x12, 0x34, 0, 0, 0, 0, 0, 0, 0, 0, 0x56],
			},
			attachment_ids: Vec::new(),
		}
	}

	#[test]
	fn test_parse_mailbox_payload() {
		let payload = [3, 2, 0, b'a', b'b', 1, 3, 0, 9, 8, 7];
		let layout = ItemIdLayout::parse(&payload).unwrap();

		assert_eq!(layout.storage_type, IdStorageType::MailboxItemMailboxGuidBased);
		assert_eq!(layout.moniker_str(), Some("ab"));
		assert_eq!(layout.instruction(), Some(IdProcessingInstruction::Recurrence));
		assert_eq!(layout.store_id(), &[9, 8, 7]);
		assert!(layout.attachment_ids.is_empty());
	}

	#[test]
	fn test_parse_public_folder_item_with_attachments() {
		let payload = [2, 0, 1, 0, 0xAA, 2, 0, 0xBB, 0xCC, 2, 1, 0, 0x01, 2, 0, 0x02, 0x03];
		let layout = ItemIdLayout::parse(&payload).unwrap();

		assert_eq!(layout.storage_type, IdStorageType::PublicFolderItem);
		assert_eq!(layout.instruction(), Some(IdProcessingInstruction::Normal));
		assert_eq!(layout.store_id(), &[0xAA]);
		assert_eq!(layout.folder_id(), Some(&[0xBB, 0xCC][..]));
		assert_eq!(layout.attachment_ids, vec![vec![0x01], vec![0x02, 0x03]]);
	}

	#[test]
	fn test_parse_store_payload() {
		let layout = ItemIdLayout::parse(&[5, 1, 0, 0x42]).unwrap();
		assert_eq!(layout.storage_type, IdStorageType::ActiveDirectoryObject);
		assert_eq!(layout.instruction(), None);
		assert_eq!(layout.moniker_str(), None);
		assert_eq!(layout.store_id(), &[0x42]);
	}

	#[test]
	fn test_parse_rejects_malformed() {
		// undefined storage type
		assert!(ItemIdLayout::parse(&[9, 0, 0]).unwrap_err().is_invalid_identifier());
		// undefined processing instruction
		assert!(ItemIdLayout::parse(&[2, 7, 0, 0, 0, 0]).unwrap_err().is_invalid_identifier());
		// truncated store id
		assert!(ItemIdLayout::parse(&[1, 4, 0, 1, 2]).unwrap_err().is_invalid_identifier());
		// trailing bytes after attachments
		assert!(ItemIdLayout::parse(&[1, 0, 0, 0, 0xFF]).unwrap_err().is_invalid_identifier());
		assert!(ItemIdLayout::parse(&[]).unwrap_err().is_invalid_identifier());
	}

	#[test]
	fn test_payload_round_trip() {
		let mut layout = mailbox_layout();
		layout.attachment_ids.push(vec![1, 2, 3]);
		let payload = layout.to_payload().unwrap();
		assert_eq!(ItemIdLayout::parse(&payload).unwrap(), layout);
	}

	#[test]
	fn test_identifier_round_trip_through_compression() {
		let layout = mailbox_layout();
		let id = layout.to_identifier().unwrap();
		let parsed = parse_item_id(&id, DEFAULT_MAX_LENGTH).unwrap();

		// The zero-filled store id makes the compressed form smaller.
		assert_eq!(parsed.compression, CompressionTag::RunLengthEncoded);
		assert_eq!(parsed.layout, layout);
		assert_eq!(id.parse::<ParsedItemId>().unwrap(), parsed);
	}

	#[test]
	fn test_mismatched_body_is_rejected() {
		let layout = ItemIdLayout {
			storage_type: IdStorageType::PublicFolder,
			body: IdBody::PublicFolderItem {
				instruction: IdProcessingInstruction::Normal,
				store_id: vec![1],
				folder_id: vec![2],
			},
			attachment_ids: Vec::new(),
		};
		assert!(matches!(layout.to_payload(), Err(ItemIdError::Encoding(_))));
	}

	#[test]
	fn test_storage_type_registry() {
		for t in IdStorageType::ALL {
			assert_eq!(IdStorageType::try_from(t as u8).unwrap(), t);
		}
		assert!(IdStorageType::try_from(6).is_err());
	}
}
