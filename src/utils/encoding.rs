//! Text decoding for repository files of unknown encoding.
//!
//! Strategy:
//! - BOM detection (UTF-8, UTF-16 LE/BE)
//! - strict UTF-8 fast path
//! - chardetng guess for everything else, decoded with replacement characters

use anyhow::{Context, Result};
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub const DEFAULT_SAMPLE_SIZE: usize = 8192;

/// Pick the encoding of a byte buffer.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if bytes.starts_with(&[0xef, 0xbb, 0xbf]) {
        return UTF_8;
    }
    if bytes.starts_with(&[0xff, 0xfe]) {
        return UTF_16LE;
    }
    if bytes.starts_with(&[0xfe, 0xff]) {
        return UTF_16BE;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    let sample = &bytes[..bytes.len().min(DEFAULT_SAMPLE_SIZE)];
    detector.feed(sample, sample.len() == bytes.len());
    detector.guess(None, true)
}

/// Decode bytes to text, stripping any BOM. Invalid sequences become U+FFFD.
pub fn decode_text(bytes: &[u8]) -> String {
    let encoding = detect_encoding(bytes);
    let (decoded, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::trace!(encoding = encoding.name(), "decoded with replacement characters");
    }
    decoded.into_owned()
}

/// Read a whole file as text with encoding detection.
pub fn read_file_safe(path: &Path) -> Result<String> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(decode_text(&bytes))
}

/// Detect if a file is binary (not text).
///
/// A null byte in the leading sample, or fewer than 70% printable bytes.
/// Unreadable files count as binary.
pub fn is_binary_file(path: &Path, sample_size: usize) -> bool {
    is_binary_file_impl(path, sample_size).unwrap_or(true)
}

fn is_binary_file_impl(path: &Path, sample_size: usize) -> Result<bool> {
    let mut file = File::open(path)?;
    let mut sample = vec![0u8; sample_size];
    let bytes_read = file.read(&mut sample)?;
    sample.truncate(bytes_read);

    if sample.is_empty() {
        return Ok(false);
    }
    if sample.starts_with(&[0xff, 0xfe]) || sample.starts_with(&[0xfe, 0xff]) {
        return Ok(false);
    }
    if sample.contains(&0) {
        return Ok(true);
    }
    if std::str::from_utf8(&sample).is_ok() {
        return Ok(false);
    }

    let printable_count = sample
        .iter()
        .filter(|&&b| (32..=126).contains(&b) || b == 9 || b == 10 || b == 13)
        .count();

    Ok((printable_count as f64 / sample.len() as f64) < 0.70)
}

/// First `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_with(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_read_utf8() {
        let file = temp_with("Test content 🚀".as_bytes());
        assert_eq!(read_file_safe(file.path()).unwrap(), "Test content 🚀");
    }

    #[test]
    fn test_read_strips_utf8_bom() {
        let file = temp_with(&[0xef, 0xbb, 0xbf, b'H', b'i']);
        assert_eq!(read_file_safe(file.path()).unwrap(), "Hi");
    }

    #[test]
    fn test_read_utf16le() {
        let file = temp_with(&[0xff, 0xfe, b'o', 0, b'k', 0]);
        assert_eq!(read_file_safe(file.path()).unwrap(), "ok");
    }

    #[test]
    fn test_read_latin1_falls_back_to_detection() {
        let file = temp_with(b"caf\xe9 cr\xe8me");
        let text = read_file_safe(file.path()).unwrap();
        assert!(text.starts_with("caf"));
        assert!(!text.contains('\u{fffd}'), "legacy encoding should decode cleanly: {text}");
    }

    #[test]
    fn test_is_binary_null_byte() {
        let file = temp_with(&[0x00, 0x01, 0x02]);
        assert!(is_binary_file(file.path(), DEFAULT_SAMPLE_SIZE));
    }

    #[test]
    fn test_is_not_binary_text() {
        let file = temp_with("Normal text file ✓".as_bytes());
        assert!(!is_binary_file(file.path(), DEFAULT_SAMPLE_SIZE));
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}
