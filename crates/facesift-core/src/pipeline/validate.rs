//! Cheap checks before a full decode.

use std::io::Read;
use std::path::Path;

use crate::config::LimitsConfig;
use crate::error::PipelineError;

/// Rejects files that are missing, oversized, or not images by signature.
pub struct Validator {
    limits: LimitsConfig,
}

impl Validator {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    /// Checks:
    /// - File exists
    /// - File size is within limits
    /// - Header carries a known image signature
    pub fn validate(&self, path: &Path) -> Result<(), PipelineError> {
        let metadata = std::fs::metadata(path)
            .map_err(|_| PipelineError::FileNotFound(path.to_path_buf()))?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        let mut header = [0u8; 12];
        let bytes_read = std::fs::File::open(path)
            .and_then(|mut f| f.read(&mut header))
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot read file: {e}"),
            })?;

        if !has_image_signature(&header[..bytes_read]) {
            return Err(PipelineError::Decode {
                path: path.to_path_buf(),
                message: "Unrecognized image format (invalid magic bytes)".to_string(),
            });
        }

        Ok(())
    }
}

/// Whether the leading bytes match a supported image format.
fn has_image_signature(header: &[u8]) -> bool {
    if header.len() < 4 {
        return false;
    }

    let riff_webp = header.starts_with(b"RIFF") && (header.len() < 12 || &header[8..12] == b"WEBP");
    // HEIF family: ftyp box at offset 4
    let ftyp = header.len() >= 8 && &header[4..8] == b"ftyp";

    header.starts_with(&[0xFF, 0xD8, 0xFF])
        || header.starts_with(&[0x89, b'P', b'N', b'G'])
        || header.starts_with(b"GIF8")
        || header.starts_with(b"BM")
        || header.starts_with(&[b'I', b'I', 0x2A, 0x00])
        || header.starts_with(&[b'M', b'M', 0x00, 0x2A])
        || riff_webp
        || ftyp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signatures_accepted() {
        assert!(has_image_signature(&[0xFF, 0xD8, 0xFF, 0xE0, 0, 0]));
        assert!(has_image_signature(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A]));
        assert!(has_image_signature(b"GIF89a"));
        assert!(has_image_signature(b"BM\0\0\0\0"));
        assert!(has_image_signature(b"RIFF\0\0\0\0WEBP"));
        assert!(has_image_signature(&[b'I', b'I', 0x2A, 0x00]));
        assert!(has_image_signature(&[b'M', b'M', 0x00, 0x2A]));
    }

    #[test]
    fn test_signatures_rejected() {
        assert!(!has_image_signature(&[0, 0, 0, 0, 0, 0, 0, 0]));
        assert!(!has_image_signature(b"RIFF\0\0\0\0WAVE"));
        // Bare byte-order marks without the TIFF version
        assert!(!has_image_signature(&[b'I', b'I', 0x00, 0x00]));
        assert!(!has_image_signature(b"BM"));
    }

    #[test]
    fn test_validate_missing_file() {
        let v = Validator::new(LimitsConfig::default());
        let err = v.validate(Path::new("/nonexistent/a.jpg")).unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound(_)));
    }

    #[test]
    fn test_validate_garbage_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.jpg");
        std::fs::write(&path, b"definitely not an image").unwrap();

        let v = Validator::new(LimitsConfig::default());
        assert!(matches!(
            v.validate(&path).unwrap_err(),
            PipelineError::Decode { .. }
        ));
    }
}
