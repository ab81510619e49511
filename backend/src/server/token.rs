//! Firestore bearer token loading and fingerprinting.
//!
//! The token is read once at startup through `cap_std` and held in
//! [`Zeroizing`] storage. Only a truncated SHA-256 fingerprint is ever
//! logged, so operators can tell which token is active without exposing it.

use std::ffi::OsString;
use std::io;
use std::path::Path;

use cap_std::{ambient_authority, fs::Dir};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Length of the fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Read the token at `path`, trimming surrounding whitespace.
///
/// # Errors
/// Returns [`io::Error`] when the file cannot be read, is not UTF-8 or holds
/// only whitespace.
pub(crate) fn read_token(path: &Path) -> io::Result<Zeroizing<String>> {
    let (parent, file_name) = parent_and_file_name(path)?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
    let raw = Zeroizing::new(directory.read_to_string(Path::new(&file_name))?);
    let token = raw.trim();
    if token.is_empty() {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "token file is empty"));
    }
    Ok(Zeroizing::new(token.to_owned()))
}

/// Truncated SHA-256 fingerprint of `token` as 16 lowercase hex characters.
pub(crate) fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(digest.get(..FINGERPRINT_BYTES).unwrap_or_default())
}

fn parent_and_file_name(path: &Path) -> io::Result<(&Path, OsString)> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "token path must name a file"))?;
    Ok((parent, file_name.to_os_string()))
}
