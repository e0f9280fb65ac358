//! Deterministic, reversible text ↔ fixed-width vector codec.
//!
//! The encryption capability operates on fixed-length real vectors, so
//! arbitrary entity text is packed into `[0,1]` slots byte-by-byte.
//! Zero is reserved for padding: a true NUL byte is indistinguishable
//! from padding and will not survive a round trip. Accepted as a
//! lossy-at-the-margins property of the byte packing.
//!
//! The codec is a strategy behind [`TextCodec`], independent of the
//! encryption backend; alternate packings (e.g. integer CRT) can be
//! substituted without touching the redaction engine.

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// How a vector's slots map back to text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodingScheme {
    /// UTF-8 bytes normalized by 255. Primary scheme.
    Utf8Bytes,
    /// Printable ASCII (0x20..=0x7E) normalized by 127. Fallback; any
    /// non-printable slot is dropped.
    AsciiPrintable,
}

/// Text ↔ vector strategy consumed by the redaction engine.
pub trait TextCodec: Send + Sync {
    /// The scheme recorded in mapping entries for vectors this codec
    /// produces.
    fn scheme(&self) -> EncodingScheme;

    /// Encode text into exactly `max_length` slots in `[0,1]`,
    /// truncating longer inputs and right-padding with 0.0.
    fn encode(&self, text: &str, max_length: usize) -> Vec<f64>;

    /// Decode a vector back to text under `scheme`, trimming to
    /// `original_chars` characters. Never returns more characters than
    /// were originally encoded.
    fn decode(
        &self,
        vector: &[f64],
        original_chars: usize,
        scheme: EncodingScheme,
    ) -> Result<String, CodecError>;
}

/// Byte-packing codec: UTF-8 bytes / 255, ASCII printable fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteVectorCodec;

impl ByteVectorCodec {
    pub fn new() -> Self {
        Self
    }
}

impl TextCodec for ByteVectorCodec {
    fn scheme(&self) -> EncodingScheme {
        EncodingScheme::Utf8Bytes
    }

    fn encode(&self, text: &str, max_length: usize) -> Vec<f64> {
        let mut vector: Vec<f64> = text
            .as_bytes()
            .iter()
            .take(max_length)
            .map(|&byte| byte as f64 / 255.0)
            .collect();
        vector.resize(max_length, 0.0);
        vector
    }

    fn decode(
        &self,
        vector: &[f64],
        original_chars: usize,
        scheme: EncodingScheme,
    ) -> Result<String, CodecError> {
        let text = match scheme {
            EncodingScheme::Utf8Bytes => {
                decode_utf8(vector).unwrap_or_else(|| decode_ascii(vector))
            }
            EncodingScheme::AsciiPrintable => decode_ascii(vector),
        };

        if text.is_empty() && original_chars > 0 {
            return Err(CodecError::EmptyDecode {
                expected_chars: original_chars,
            });
        }

        Ok(text.chars().take(original_chars).collect())
    }
}

/// Reassemble UTF-8 bytes from non-padding slots. `None` when the byte
/// sequence is not valid UTF-8 (numeric noise can corrupt multibyte
/// sequences), which triggers the ASCII fallback.
fn decode_utf8(vector: &[f64]) -> Option<String> {
    let bytes: Vec<u8> = vector
        .iter()
        .filter(|&&val| val > 0.0)
        .map(|&val| (val * 255.0).round().clamp(0.0, 255.0) as u8)
        .collect();

    String::from_utf8(bytes).ok()
}

/// ASCII-safe fallback: invert every slot, keep printable characters,
/// drop everything else. Length trimming is the caller's job — trimming
/// slots here would let a noise slot eat legitimate trailing characters.
fn decode_ascii(vector: &[f64]) -> String {
    vector
        .iter()
        .filter(|&&val| val > 0.0)
        .filter_map(|&val| {
            let code = (val * 127.0).round().clamp(0.0, 255.0) as u32;
            (0x20..=0x7E).contains(&code).then(|| code as u8 as char)
        })
        .collect()
}
