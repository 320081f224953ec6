//! The compression boundary around script bodies.
//!
//! Script bodies are stored zlib-compressed inside the bundle. Inflating
//! normalizes line endings by dropping carriage returns, matching how the
//! engine hands script text to its interpreter.

use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::Result;

/// Compress a script body. An empty body still produces a short, non-empty
/// stream, which is what marks spacer rows in a bundle.
pub fn deflate(body: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::best());
    encoder.write_all(body)?;
    Ok(encoder.finish()?)
}

/// Decompress a script body into UTF-8 text with carriage returns removed.
pub fn inflate(compressed: &[u8]) -> Result<String> {
    let mut decoder = ZlibDecoder::new(compressed);
    let mut bytes = Vec::new();
    decoder.read_to_end(&mut bytes)?;

    let mut text = String::from_utf8(bytes)?;
    text.retain(|c| c != '\r');
    Ok(text)
}
