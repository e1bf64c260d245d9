//! Decoding text artifacts of unknown encoding

use std::path::Path;

use encoding_rs::Encoding;

use crate::error::{ReconcileError, ReconcileResult};

/// Encodings tried in order after BOM sniffing.
///
/// windows-1252 also covers ISO-8859-1 and accepts any byte sequence.
const FALLBACKS: [&Encoding; 3] = [
    encoding_rs::UTF_8,
    encoding_rs::WINDOWS_1252,
    encoding_rs::UTF_16LE,
];

/// Decode bytes with the first encoding that accepts them
pub fn decode_text(bytes: &[u8]) -> Option<(String, &'static Encoding)> {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let text = encoding.decode_without_bom_handling_and_without_replacement(&bytes[bom_len..])?;
        return Some((text.into_owned(), encoding));
    }

    FALLBACKS.iter().find_map(|encoding| {
        encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| (text.into_owned(), *encoding))
    })
}

/// Read a text file, returning its contents and the encoding's name
pub fn read_text<P: AsRef<Path>>(path: P) -> ReconcileResult<(String, &'static str)> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let (text, encoding) =
        decode_text(&bytes).ok_or_else(|| ReconcileError::Encoding(path.to_path_buf()))?;
    tracing::debug!(path = %path.display(), encoding = encoding.name(), "decoded text file");
    Ok((text, encoding.name()))
}
