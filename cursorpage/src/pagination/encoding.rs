//! Text-safe transport encoding for cursor payloads.

use base64::Engine;
use base64::alphabet::URL_SAFE;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

/// URL-safe alphabet (`-_` instead of `+/`). Emits no padding, and accepts
/// tokens with or without it so that clients re-padding a token still work.
const CURSOR_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode a JSON payload as URL-safe base64.
pub(super) fn base64url_encode(input: &str) -> String {
    CURSOR_ENGINE.encode(input.as_bytes())
}

/// Decode URL-safe base64 into a UTF-8 string.
///
/// Returns `None` for invalid alphabet, bad length or non-UTF-8 payloads.
pub(super) fn base64url_decode(input: &str) -> Option<String> {
    let bytes = CURSOR_ENGINE.decode(input.as_bytes()).ok()?;
    String::from_utf8(bytes).ok()
}
