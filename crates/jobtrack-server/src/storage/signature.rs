//! Magic-byte checks for uploaded files
//!
//! An extension is only checked when at least one signature is registered
//! for it. Text-like formats have no reliable signature and always pass.

use std::io::{self, Read, Seek, SeekFrom};
use thiserror::Error;

/// Number of leading bytes inspected.
pub const HEADER_LEN: usize = 16;

/// A byte sequence expected at a fixed offset
#[derive(Debug, Clone, Copy)]
pub struct Signature {
    pub magic: &'static [u8],
    pub offset: usize,
}

impl Signature {
    const fn at_start(magic: &'static [u8]) -> Self {
        Self { magic, offset: 0 }
    }

    fn matches(&self, header: &[u8]) -> bool {
        header
            .get(self.offset..self.offset + self.magic.len())
            .is_some_and(|window| window == self.magic)
    }
}

const PDF: &[Signature] = &[Signature::at_start(b"%PDF")];
const PNG: &[Signature] = &[Signature::at_start(b"\x89PNG\r\n\x1a\n")];
const JPEG: &[Signature] = &[Signature::at_start(b"\xFF\xD8\xFF")];
const GIF: &[Signature] = &[Signature::at_start(b"GIF87a"), Signature::at_start(b"GIF89a")];
const ZIP: &[Signature] = &[Signature::at_start(b"PK\x03\x04")];
const OLE2: &[Signature] = &[Signature::at_start(b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1")];

/// Extension (lowercase, with dot) to accepted signatures
static SIGNATURES: &[(&str, &[Signature])] = &[
    (".pdf", PDF),
    (".png", PNG),
    (".jpg", JPEG),
    (".jpeg", JPEG),
    (".gif", GIF),
    (".docx", ZIP),
    (".xlsx", ZIP),
    (".pptx", ZIP),
    (".zip", ZIP),
    (".doc", OLE2),
    (".xls", OLE2),
    (".ppt", OLE2),
    (".txt", &[]),
    (".md", &[]),
    (".csv", &[]),
];

/// Registered signatures for an extension (empty when none apply)
pub fn signatures_for(extension: &str) -> &'static [Signature] {
    let extension = extension.to_lowercase();
    let extension = if extension.starts_with('.') { extension } else { format!(".{extension}") };

    SIGNATURES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, signatures)| *signatures)
        .unwrap_or(&[])
}

/// Leading bytes do not match the claimed extension
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("File content does not match the {extension} extension (expected one of: {expected}).")]
pub struct SignatureMismatch {
    pub extension: String,
    pub expected: String,
}

/// Check leading bytes against the signatures registered for `extension`
pub fn check_signature(header: &[u8], extension: &str) -> Result<(), SignatureMismatch> {
    let signatures = signatures_for(extension);
    if signatures.is_empty() || signatures.iter().any(|sig| sig.matches(header)) {
        return Ok(());
    }

    let expected = signatures
        .iter()
        .map(|sig| describe(sig.magic))
        .collect::<Vec<_>>()
        .join(", ");

    Err(SignatureMismatch {
        extension: extension.to_lowercase(),
        expected,
    })
}

/// Probe a seekable stream without disturbing it
///
/// Reads at most [`HEADER_LEN`] bytes from the current position and seeks back
/// to that position before returning, whatever the outcome of the check.
pub fn check_stream<R: Read + Seek>(
    reader: &mut R,
    extension: &str,
) -> io::Result<Result<(), SignatureMismatch>> {
    let start = reader.stream_position()?;

    let mut header = Vec::with_capacity(HEADER_LEN);
    let read = reader.by_ref().take(HEADER_LEN as u64).read_to_end(&mut header);
    reader.seek(SeekFrom::Start(start))?;
    read?;

    Ok(check_signature(&header, extension))
}

fn describe(magic: &[u8]) -> String {
    if magic.iter().all(|b| b.is_ascii_graphic()) {
        String::from_utf8_lossy(magic).into_owned()
    } else {
        magic
            .iter()
            .map(|b| format!("{b:02X}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
