//! Payload fragments: how locked bytes are laid out on the ledger.
//!
//! ```text
//! locked bytes ──base27──▶ SYMBOLS ──+marker──▶ SYMBOLSM ──split/pad──▶ [SYMB] [OLSM9999]
//! ```
//!
//! The terminal marker is a single non-filler symbol. The receiver strips
//! trailing filler from the last fragment and then exactly one marker, which
//! keeps encoded content that itself ends in `9` intact.

use crate::error::{CoreError, Result};
use crate::symbols::{decode_base27, encode_base27, random_marker, FILLER};

/// Fixed width of one ledger payload fragment, in symbols.
pub const DEFAULT_FRAGMENT_WIDTH: usize = 2187;

/// Encode locked bytes with a random terminal marker.
pub fn encode_payload(locked: &[u8]) -> String {
    let mut payload = encode_base27(locked);
    payload.push(random_marker());
    payload
}

/// Encode locked bytes with a specific terminal marker.
pub fn encode_payload_with_marker(locked: &[u8], marker: char) -> Result<String> {
    if !marker.is_ascii_uppercase() {
        return Err(CoreError::InvalidArgument(format!(
            "terminal marker must be in A..=Z, got {:?}",
            marker
        )));
    }
    let mut payload = encode_base27(locked);
    payload.push(marker);
    Ok(payload)
}

/// Split a payload into fixed-width fragments, padding the last with filler.
pub fn split_fragments(payload: &str, width: usize) -> Result<Vec<String>> {
    if width == 0 {
        return Err(CoreError::InvalidArgument("fragment width must be non-zero".into()));
    }
    if !payload.is_ascii() {
        return Err(CoreError::InvalidArgument("payload must be ASCII symbols".into()));
    }

    let fragments = payload
        .as_bytes()
        .chunks(width)
        .map(|chunk| {
            let mut fragment = String::with_capacity(width);
            // Chunks of an ASCII string are valid UTF-8.
            fragment.extend(chunk.iter().map(|&b| b as char));
            fragment.extend(std::iter::repeat(FILLER).take(width - chunk.len()));
            fragment
        })
        .collect();

    Ok(fragments)
}

/// Reassemble ordered fragments into locked bytes.
pub fn reassemble<S: AsRef<str>>(fragments: &[S]) -> Result<Vec<u8>> {
    let Some((last, init)) = fragments.split_last() else {
        return Err(CoreError::Decode("bundle has no fragments".into()));
    };

    let mut symbols = String::new();
    for fragment in init {
        symbols.push_str(fragment.as_ref());
    }

    let content = last.as_ref().trim_end_matches(FILLER);
    let mut chars = content.chars();
    if chars.next_back().is_none() {
        return Err(CoreError::Decode("last fragment has no terminal marker".into()));
    }
    symbols.push_str(chars.as_str());

    decode_base27(&symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_fragment_padding() {
        let payload = encode_payload_with_marker(b"hello", 'Q').unwrap();
        assert_eq!(payload, "BPXJGSTTHQ");

        let fragments = split_fragments(&payload, 16).unwrap();
        assert_eq!(fragments, vec!["BPXJGSTTHQ999999".to_string()]);
        assert_eq!(reassemble(&fragments).unwrap(), b"hello");
    }

    #[test]
    fn test_multi_fragment_reassembly() {
        let locked: Vec<u8> = (1..=200).collect();
        let payload = encode_payload(&locked);
        let fragments = split_fragments(&payload, 27).unwrap();

        assert!(fragments.len() > 1);
        assert!(fragments.iter().all(|f| f.len() == 27));
        assert_eq!(reassemble(&fragments).unwrap(), locked);
    }

    #[test]
    fn test_trailing_filler_in_content_survives() {
        // 26 encodes to the single symbol "9".
        let payload = encode_payload_with_marker(&[26], 'A').unwrap();
        assert_eq!(payload, "9A");

        let fragments = split_fragments(&payload, 8).unwrap();
        assert_eq!(fragments[0], "9A999999");
        assert_eq!(reassemble(&fragments).unwrap(), vec![26]);
    }

    #[test]
    fn test_exact_width_needs_no_padding() {
        let fragments = split_fragments("ABCDEF", 3).unwrap();
        assert_eq!(fragments, vec!["ABC".to_string(), "DEF".to_string()]);
    }

    #[test]
    fn test_reassemble_rejects_missing_marker() {
        assert!(reassemble(&["999999"]).is_err());
        assert!(reassemble::<&str>(&[]).is_err());
    }

    #[test]
    fn test_invalid_marker_and_width() {
        assert!(encode_payload_with_marker(b"x", '9').is_err());
        assert!(encode_payload_with_marker(b"x", 'a').is_err());
        assert!(split_fragments("ABC", 0).is_err());
    }

    #[test]
    fn test_default_width_is_one_fragment_for_short_messages() {
        let payload = encode_payload(&[0x42; 100]);
        let fragments = split_fragments(&payload, DEFAULT_FRAGMENT_WIDTH).unwrap();
        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].len(), DEFAULT_FRAGMENT_WIDTH);
    }
}
