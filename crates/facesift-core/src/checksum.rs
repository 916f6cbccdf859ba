//! BLAKE3 file hashing for verifying downloaded model files.

use blake3::Hasher as Blake3Hasher;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Hash file contents with BLAKE3, streaming in 64KB chunks.
pub fn content_hash(path: &Path) -> std::io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Blake3Hasher::new();

    let mut buffer = [0u8; 65536];
    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_matches_in_memory_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"hello facesift").unwrap();

        let expected = blake3::hash(b"hello facesift").to_hex().to_string();
        assert_eq!(content_hash(&path).unwrap(), expected);
    }

    #[test]
    fn test_content_hash_missing_file() {
        assert!(content_hash(Path::new("/nonexistent/model.onnx")).is_err());
    }
}
