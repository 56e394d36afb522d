//! Content-based MIME type detection

use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bytes inspected when deciding between text and binary
const TEXT_PROBE_LEN: usize = 8192;

pub const MIME_EMPTY: &str = "inode/x-empty";
pub const MIME_TEXT: &str = "text/plain";
pub const MIME_BINARY: &str = "application/octet-stream";

/// Best-effort MIME type of a file, from its content rather than its name
///
/// Known magic numbers win; otherwise the leading bytes decide between
/// `text/plain` and `application/octet-stream`.
pub fn sniff_mime(path: &Path) -> std::io::Result<String> {
    if let Some(kind) = infer::get_from_path(path)? {
        return Ok(kind.mime_type().to_string());
    }

    let mut probe = Vec::with_capacity(TEXT_PROBE_LEN);
    File::open(path)?
        .take(TEXT_PROBE_LEN as u64)
        .read_to_end(&mut probe)?;

    Ok(classify_unknown(&probe).to_string())
}

fn classify_unknown(probe: &[u8]) -> &'static str {
    if probe.is_empty() {
        return MIME_EMPTY;
    }
    if probe.contains(&0) {
        return MIME_BINARY;
    }
    match std::str::from_utf8(probe) {
        Ok(_) => MIME_TEXT,
        // a multi-byte sequence cut at the probe boundary is still text
        Err(e) if e.error_len().is_none() => MIME_TEXT,
        Err(_) => MIME_BINARY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_tiff_detected_by_magic_not_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(&dir, "capture.dat", b"II*\x00\x08\x00\x00\x00rest");
        assert_eq!(sniff_mime(&path).unwrap(), "image/tiff");
    }

    #[test]
    fn test_text_and_binary_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let text = write(&dir, "scan.tif", b"time,velocity\n0.0,1.5\n");
        let binary = write(&dir, "scan.txt", &[0x01, 0x00, 0xfe, 0x7f]);
        let empty = write(&dir, "empty.bin", b"");

        assert_eq!(sniff_mime(&text).unwrap(), MIME_TEXT);
        assert_eq!(sniff_mime(&binary).unwrap(), MIME_BINARY);
        assert_eq!(sniff_mime(&empty).unwrap(), MIME_EMPTY);
    }

    #[test]
    fn test_truncated_utf8_counts_as_text() {
        let mut probe = "µm".repeat(10).into_bytes();
        probe.pop();
        assert_eq!(classify_unknown(&probe), MIME_TEXT);
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(sniff_mime(Path::new("/nonexistent/file.dat")).is_err());
    }
}
