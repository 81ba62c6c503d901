//! Streaming checksum computation
//!
//! Digests files in fixed-size chunks so multi-gigabyte images never have to
//! fit in memory. Supports digesting only a byte-prefix of a file, which is
//! how upstream distributors publish checksums for very large images.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha224, Sha256, Sha384, Sha512};

use crate::error::ChecksumError;

enum Hasher {
    Sha224(Sha224),
    Sha256(Sha256),
    Sha384(Sha384),
    Sha512(Sha512),
}

impl Hasher {
    fn new(algorithm: &str) -> Option<Self> {
        match algorithm.to_ascii_lowercase().as_str() {
            "sha224" => Some(Self::Sha224(Sha224::new())),
            "sha256" => Some(Self::Sha256(Sha256::new())),
            "sha384" => Some(Self::Sha384(Sha384::new())),
            "sha512" => Some(Self::Sha512(Sha512::new())),
            _ => None,
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            Self::Sha224(h) => h.update(data),
            Self::Sha256(h) => h.update(data),
            Self::Sha384(h) => h.update(data),
            Self::Sha512(h) => h.update(data),
        }
    }

    fn finalize(self) -> String {
        match self {
            Self::Sha224(h) => hex::encode(h.finalize()),
            Self::Sha256(h) => hex::encode(h.finalize()),
            Self::Sha384(h) => hex::encode(h.finalize()),
            Self::Sha512(h) => hex::encode(h.finalize()),
        }
    }
}

/// Compute the lowercase hex digest of a file.
///
/// Reads sequentially in chunks of `buffer_size` bytes. When `read_bytes` is
/// set, at most that many bytes are digested: the effective buffer shrinks
/// to the limit up front, and the final chunk shrinks so the total consumed
/// never exceeds it.
pub fn compute_checksum(
    path: &Path,
    algorithm: &str,
    buffer_size: usize,
    read_bytes: Option<u64>,
) -> Result<String, ChecksumError> {
    let mut hasher =
        Hasher::new(algorithm).ok_or_else(|| ChecksumError::UnsupportedAlgorithm {
            algorithm: algorithm.to_string(),
        })?;

    let mut file = File::open(path).map_err(|e| ChecksumError::Io {
        path: path.to_path_buf(),
        error: e.to_string(),
    })?;

    let mut remaining = read_bytes;
    let effective = match read_bytes {
        Some(limit) => buffer_size.min(usize::try_from(limit).unwrap_or(buffer_size)),
        None => buffer_size,
    };
    let mut chunk = vec![0u8; effective.max(1)];

    loop {
        let want = match remaining {
            Some(rem) => usize::try_from(u64::min(chunk.len() as u64, rem)).unwrap_or(0),
            None => chunk.len(),
        };
        if want == 0 {
            break;
        }

        let read = file
            .read(&mut chunk[..want])
            .map_err(|e| ChecksumError::Io {
                path: path.to_path_buf(),
                error: e.to_string(),
            })?;
        if read == 0 {
            break;
        }

        hasher.update(&chunk[..read]);
        if let Some(rem) = remaining.as_mut() {
            *rem -= read as u64;
        }
    }

    Ok(hasher.finalize())
}
