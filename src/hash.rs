//! BLAKE3 content fingerprints for staged files

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use blake3::Hasher;

use crate::error::{self, Result};

/// Optional prefix accepted on manifest hashes
pub const HASH_PREFIX: &str = "blake3:";

/// Hash a byte slice, returning lowercase hex
pub fn hash_bytes(content: &[u8]) -> String {
    blake3::hash(content).to_hex().to_string()
}

/// Hash a file's content, returning lowercase hex
pub fn hash_file(path: &Path) -> Result<String> {
    let file = File::open(path).map_err(|e| error::fs::read_failed(path, e))?;

    let mut reader = BufReader::new(file);
    let mut hasher = Hasher::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader
            .read(&mut buffer)
            .map_err(|e| error::fs::read_failed(path, e))?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

/// Verify a hash matches the expected value
pub fn verify_hash(expected: &str, actual: &str) -> bool {
    let normalize = |h: &str| h.strip_prefix(HASH_PREFIX).unwrap_or(h).to_ascii_lowercase();
    normalize(expected) == normalize(actual)
}
