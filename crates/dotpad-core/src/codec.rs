use crate::{Error, Result};

/// Reversible text ⇄ URL-safe text transform used by share links.
pub trait CompressionCodec {
    fn compress(&self, text: &str) -> Result<String>;
    fn decompress(&self, encoded: &str) -> Result<String>;
}

/// LZ-string codec using the `EncodedURIComponent` alphabet, so links stay compatible with the
/// browser playground.
#[derive(Debug, Clone, Default)]
pub struct LzStringCodec {
    max_encoded_len: Option<usize>,
}

impl LzStringCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects share payloads longer than `max` characters (browsers and chat clients truncate
    /// very long URLs).
    pub fn with_max_encoded_len(mut self, max: usize) -> Self {
        self.max_encoded_len = Some(max);
        self
    }
}

impl CompressionCodec for LzStringCodec {
    fn compress(&self, text: &str) -> Result<String> {
        let encoded = lz_str::compress_to_encoded_uri_component(text);
        if let Some(max) = self.max_encoded_len {
            if encoded.len() > max {
                return Err(Error::Compress {
                    detail: format!("compressed payload is {} bytes (limit {max})", encoded.len()),
                });
            }
        }
        Ok(encoded)
    }

    fn decompress(&self, encoded: &str) -> Result<String> {
        // A space is read back as `+`, undoing form decoding of the query string.
        let wide = lz_str::decompress_from_encoded_uri_component(encoded).ok_or(Error::Decompress)?;
        String::from_utf16(&wide).map_err(|_| Error::Decompress)
    }
}
