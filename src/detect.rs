//! PDF header validation performed before a document is opened.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Validate that `path` names a readable PDF file and return its header version.
///
/// A missing or unreadable file is reported as [`Error::DocumentUnavailable`];
/// a file that exists but does not start with a PDF header is
/// [`Error::UnknownFormat`] or [`Error::UnsupportedVersion`].
pub fn check_pdf_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| unavailable(path, e))?;

    let mut header = [0u8; 16];
    let mut filled = 0;
    while filled < header.len() {
        match file.read(&mut header[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(unavailable(path, e)),
        }
    }

    pdf_version(&header[..filled])
}

/// Read the version from the first bytes of a PDF file.
pub fn pdf_version(data: &[u8]) -> Result<String> {
    let rest = data.strip_prefix(PDF_MAGIC).ok_or(Error::UnknownFormat)?;
    let version = rest.get(..VERSION_LEN).ok_or(Error::UnknownFormat)?;
    let version = String::from_utf8_lossy(version).to_string();

    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(version)
}

fn unavailable(path: &Path, err: io::Error) -> Error {
    Error::DocumentUnavailable(format!("{}: {}", path.display(), err))
}

/// Versions look like "1.4" or "2.0".
fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}
