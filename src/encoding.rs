//! Character encoding support for RIS input.
//!
//! RIS has no in-band encoding declaration. Files exported by reference
//! managers are usually UTF-8, often with a byte-order mark, but older
//! exports use a Windows code page. [`InputEncoding`] decodes raw input lines
//! to UTF-8 with [`encoding_rs`]; output is always written as UTF-8.
//!
//! A leading byte-order mark must be removed before the tag grammar is
//! applied, otherwise the first `TY` line would not be recognized. A BOM
//! also overrides the configured encoding for the whole stream.
//!
//! Input is split into lines on the `\n` byte before decoding, so only
//! ASCII-compatible encodings are accepted. UTF-16 input, by label or by
//! BOM, is rejected with [`RisError::EncodingError`].

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};

use crate::error::{Result, RisError};

/// Character encoding of an input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputEncoding(&'static Encoding);

impl Default for InputEncoding {
    fn default() -> Self {
        InputEncoding(UTF_8)
    }
}

impl InputEncoding {
    /// UTF-8 input.
    #[must_use]
    pub fn utf8() -> Self {
        InputEncoding::default()
    }

    /// Look up an encoding by WHATWG label, e.g. `utf-8`, `latin1`,
    /// `windows-1252`.
    ///
    /// # Errors
    ///
    /// Returns `RisError::EncodingError` if the label is unknown or names an
    /// encoding that is not ASCII-compatible.
    pub fn for_label(label: &str) -> Result<Self> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| RisError::EncodingError(format!("Unknown encoding label: {label}")))?;
        Self::line_oriented(encoding)
    }

    fn line_oriented(encoding: &'static Encoding) -> Result<Self> {
        if encoding.is_ascii_compatible() {
            Ok(InputEncoding(encoding))
        } else {
            Err(RisError::EncodingError(format!(
                "{} input is not supported, convert it to UTF-8 first",
                encoding.name()
            )))
        }
    }

    /// Encoding announced by a byte-order mark at the start of `bytes`,
    /// with the length of the mark.
    ///
    /// # Errors
    ///
    /// Returns `RisError::EncodingError` for a UTF-16 BOM.
    pub fn sniff_bom(bytes: &[u8]) -> Result<Option<(Self, usize)>> {
        match Encoding::for_bom(bytes) {
            Some((encoding, len)) => Ok(Some((Self::line_oriented(encoding)?, len))),
            None => Ok(None),
        }
    }

    /// Canonical name of the encoding.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.0.name()
    }

    /// Decode one raw line, BOM already removed.
    ///
    /// Returns the decoded text and whether malformed sequences were replaced.
    #[must_use]
    pub fn decode_line<'a>(&self, bytes: &'a [u8]) -> (Cow<'a, str>, bool) {
        self.0.decode_without_bom_handling(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sniff_utf8_bom() {
        let (enc, len) = InputEncoding::sniff_bom(b"\xEF\xBB\xBFTY  - JOUR\n").unwrap().unwrap();
        assert_eq!(enc, InputEncoding::utf8());
        assert_eq!(len, 3);
        assert!(InputEncoding::sniff_bom(b"TY  - JOUR\n").unwrap().is_none());
    }

    #[test]
    fn test_utf16_bom_rejected() {
        assert!(matches!(
            InputEncoding::sniff_bom(b"\xFF\xFET\0Y\0"),
            Err(RisError::EncodingError(_))
        ));
        assert!(matches!(
            InputEncoding::sniff_bom(b"\xFE\xFF\0T\0Y"),
            Err(RisError::EncodingError(_))
        ));
    }

    #[test]
    fn test_bom_not_stripped_by_decode() {
        let enc = InputEncoding::utf8();
        let (text, _) = enc.decode_line(b"\xEF\xBB\xBFx\n");
        assert_eq!(text, "\u{FEFF}x\n");
    }

    #[test]
    fn test_windows_1252() {
        let enc = InputEncoding::for_label("windows-1252").unwrap();
        let (text, errors) = enc.decode_line(b"AU  - M\xfcller\n");
        assert_eq!(text, "AU  - Müller\n");
        assert!(!errors);
    }

    #[test]
    fn test_invalid_utf8_replaced() {
        let enc = InputEncoding::utf8();
        let (text, errors) = enc.decode_line(b"AU  - M\xfcller\n");
        assert!(errors);
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_unknown_label() {
        assert!(matches!(
            InputEncoding::for_label("klingon"),
            Err(RisError::EncodingError(_))
        ));
        assert_eq!(InputEncoding::for_label("latin1").unwrap().name(), "windows-1252");
    }

    #[test]
    fn test_utf16_label_rejected() {
        for label in ["utf-16le", "utf-16be", "utf-16"] {
            assert!(matches!(
                InputEncoding::for_label(label),
                Err(RisError::EncodingError(_))
            ));
        }
    }
}
