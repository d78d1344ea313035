//! Cursor token encoding/decoding.

use std::fmt::Display;

use miniserde::json::{self, Value};
use miniserde::Serialize;

use crate::constants::MAX_CURSOR_LENGTH;

use super::encoding::{base64url_decode, base64url_encode};
use super::position::{CursorPosition, CursorTimestamp};

/// JSON key holding the timestamp half of a cursor.
const KEY_CREATED_AT: &str = "createdAt";

/// JSON key holding the id half of a cursor.
const KEY_ID: &str = "id";

/// Wire shape of a cursor token before base64.
#[derive(Serialize)]
struct CursorPayload {
    #[serde(rename = "createdAt")]
    created_at: String,
    id: String,
}

/// Encode a position into an opaque, URL-safe cursor token.
///
/// Native timestamps are normalised to ISO-8601 UTC first. The inputs are not
/// validated here; a token built from a malformed id or timestamp is rejected
/// when it comes back through [`decode_cursor`].
///
/// ```
/// use cursorpage::{decode_cursor, encode_cursor};
///
/// let token = encode_cursor("2026-02-15T10:00:00.000Z", "123e4567-e89b-12d3-a456-426614174000");
/// let position = decode_cursor(&token).unwrap();
/// assert_eq!(position.created_at(), "2026-02-15T10:00:00.000Z");
/// ```
#[must_use]
pub fn encode_cursor(created_at: impl CursorTimestamp, id: impl Display) -> String {
    let payload = CursorPayload {
        created_at: created_at.to_cursor_timestamp(),
        id: id.to_string(),
    };
    base64url_encode(&json::to_string(&payload))
}

/// Decode a cursor token, reporting any failure as `None`.
///
/// Every rejection is logged at debug level with its reason. The token
/// content is never logged.
#[must_use]
pub fn decode_cursor(token: &str) -> Option<CursorPosition> {
    decode_logged(token).ok()
}

/// [`CursorPosition::decode`], logging the rejection reason on failure.
pub(crate) fn decode_logged(token: &str) -> Result<CursorPosition, CursorError> {
    CursorPosition::decode(token).inspect_err(|err| {
        tracing::debug!(reason = %err, len = token.len(), "rejected pagination cursor");
    })
}

impl CursorPosition {
    /// Encode this position as a cursor token.
    #[must_use]
    pub fn encode(&self) -> String {
        encode_cursor(self.created_at(), self.id())
    }

    /// Decode and validate a cursor token.
    ///
    /// Checks run cheapest first: length, base64, JSON, object shape, id
    /// pattern, then timestamp.
    pub fn decode(token: &str) -> Result<Self, CursorError> {
        if token.len() > MAX_CURSOR_LENGTH {
            return Err(CursorError::TooLong);
        }
        let text = base64url_decode(token).ok_or(CursorError::InvalidEncoding)?;
        let value: Value = json::from_str(&text).map_err(|_| CursorError::InvalidJson)?;

        let Value::Object(object) = value else {
            return Err(CursorError::UnexpectedShape);
        };
        if object.len() != 2 {
            return Err(CursorError::UnexpectedShape);
        }
        let (Some(Value::String(created_at)), Some(Value::String(id))) =
            (object.get(KEY_CREATED_AT), object.get(KEY_ID))
        else {
            return Err(CursorError::UnexpectedShape);
        };

        Self::new(created_at.as_str(), id.as_str())
    }
}

/// Reasons a cursor token is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CursorError {
    /// The token is longer than [`MAX_CURSOR_LENGTH`].
    #[error("cursor exceeds maximum length ({} characters)", MAX_CURSOR_LENGTH)]
    TooLong,
    /// The token is not URL-safe base64 of UTF-8 text.
    #[error("invalid base64 encoding in cursor")]
    InvalidEncoding,
    /// The decoded payload is not JSON.
    #[error("cursor payload is not valid JSON")]
    InvalidJson,
    /// The payload is not an object of exactly `createdAt` and `id` strings.
    #[error("cursor payload must be an object with string fields createdAt and id")]
    UnexpectedShape,
    /// The id is not a UUID v1-v5.
    #[error("cursor id is not a valid UUID")]
    InvalidId,
    /// The timestamp is not an ISO-8601 date-time.
    #[error("cursor createdAt is not a valid ISO-8601 date-time")]
    InvalidTimestamp,
}

impl CursorError {
    /// The token was refused before decoding.
    #[must_use]
    pub const fn is_limit_error(&self) -> bool {
        matches!(self, Self::TooLong)
    }

    /// The token could not be decoded into a `{createdAt, id}` object.
    #[must_use]
    pub const fn is_format_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidEncoding | Self::InvalidJson | Self::UnexpectedShape
        )
    }

    /// The object decoded but one of its values is malformed.
    #[must_use]
    pub const fn is_content_error(&self) -> bool {
        matches!(self, Self::InvalidId | Self::InvalidTimestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const ID: &str = "123e4567-e89b-12d3-a456-426614174000";

    fn raw_token(json: &str) -> String {
        base64url_encode(json)
    }

    #[test]
    fn test_roundtrip_preserves_text() {
        let position = CursorPosition::new("2026-02-15T10:00:00.000Z", ID).unwrap();
        let decoded = CursorPosition::decode(&position.encode()).unwrap();
        assert_eq!(decoded, position);
        assert_eq!(decoded.created_at(), "2026-02-15T10:00:00.000Z");
        assert_eq!(decoded.id(), ID);
    }

    #[test]
    fn test_encode_native_timestamp() {
        let dt = Utc.with_ymd_and_hms(2026, 2, 15, 10, 0, 0).unwrap();
        let token = encode_cursor(dt, ID);
        let decoded = decode_cursor(&token).unwrap();
        assert_eq!(decoded.created_at(), "2026-02-15T10:00:00.000Z");
        assert_eq!(decoded.instant(), dt);
    }

    #[test]
    fn test_payload_is_compact_json() {
        let token = encode_cursor("2026-01-01T00:00:00Z", ID);
        let json = base64url_decode(&token).unwrap();
        assert_eq!(
            json,
            r#"{"createdAt":"2026-01-01T00:00:00Z","id":"123e4567-e89b-12d3-a456-426614174000"}"#
        );
    }

    #[test]
    fn test_realistic_token_well_under_limit() {
        let token = encode_cursor("2026-02-15T10:00:00.000+05:30", ID);
        assert!(token.len() < MAX_CURSOR_LENGTH / 3);
    }

    #[test]
    fn test_decode_not_base64() {
        assert_eq!(
            CursorPosition::decode("not-base64!!!"),
            Err(CursorError::InvalidEncoding)
        );
        assert!(decode_cursor("not-base64!!!").is_none());
    }

    #[test]
    fn test_decode_length_guard() {
        let oversized = "A".repeat(MAX_CURSOR_LENGTH + 1);
        assert_eq!(CursorPosition::decode(&oversized), Err(CursorError::TooLong));

        // At the limit the length check passes and decoding proceeds
        let at_limit = "A".repeat(MAX_CURSOR_LENGTH);
        assert_ne!(CursorPosition::decode(&at_limit), Err(CursorError::TooLong));
    }

    #[test]
    fn test_decode_length_guard_applies_to_valid_payloads() {
        // A structurally valid payload padded past the limit with whitespace
        let padding = " ".repeat(MAX_CURSOR_LENGTH);
        let json = format!(r#"{{"createdAt":"2026-01-01T00:00:00Z","id":"{ID}"}}{padding}"#);
        let token = raw_token(&json);
        assert!(token.len() > MAX_CURSOR_LENGTH);
        assert_eq!(CursorPosition::decode(&token), Err(CursorError::TooLong));
    }

    #[test]
    fn test_decode_not_json() {
        assert_eq!(
            CursorPosition::decode(&raw_token("createdAt=2026")),
            Err(CursorError::InvalidJson)
        );
    }

    #[test]
    fn test_decode_shape_rejections() {
        let cases = [
            r#"["2026-01-01T00:00:00Z","123e4567-e89b-12d3-a456-426614174000"]"#,
            r#""2026-01-01T00:00:00Z""#,
            r#"{"createdAt":"2026-01-01T00:00:00Z"}"#,
            r#"{"id":"123e4567-e89b-12d3-a456-426614174000"}"#,
            r#"{"createdAt":"2026-01-01T00:00:00Z","id":"123e4567-e89b-12d3-a456-426614174000","tenant":"x"}"#,
            r#"{"createdAt":"2026-01-01T00:00:00Z","uuid":"123e4567-e89b-12d3-a456-426614174000"}"#,
            r#"{"createdAt":1767225600,"id":"123e4567-e89b-12d3-a456-426614174000"}"#,
            r#"{"createdAt":"2026-01-01T00:00:00Z","id":42}"#,
            r#"{"createdAt":null,"id":"123e4567-e89b-12d3-a456-426614174000"}"#,
            "{}",
        ];
        for json in cases {
            assert_eq!(
                CursorPosition::decode(&raw_token(json)),
                Err(CursorError::UnexpectedShape),
                "{json}"
            );
        }
    }

    #[test]
    fn test_decode_rejects_non_uuid_id() {
        let cases = [
            "42",
            "123e4567-e89b-12d3-a456-42661417400",
            "123e4567-e89b-02d3-a456-426614174000",
            "1' OR '1'='1",
            "",
        ];
        for id in cases {
            let token = encode_cursor("2026-01-01T00:00:00Z", id);
            assert_eq!(
                CursorPosition::decode(&token),
                Err(CursorError::InvalidId),
                "{id}"
            );
        }
    }

    #[test]
    fn test_decode_rejects_bad_timestamp() {
        let cases = ["2026-01-01", "yesterday", "2026-02-30T00:00:00Z", "2026-01-01 00:00:00"];
        for created_at in cases {
            let token = encode_cursor(created_at, ID);
            assert_eq!(
                CursorPosition::decode(&token),
                Err(CursorError::InvalidTimestamp),
                "{created_at}"
            );
        }
    }

    #[test]
    fn test_truncated_token_rejected() {
        let token = encode_cursor("2026-02-15T10:00:00.000Z", ID);
        for cut in 1..token.len() {
            let truncated = &token[..token.len() - cut];
            assert!(decode_cursor(truncated).is_none(), "cut {cut}");
        }
    }

    #[test]
    fn test_error_classification() {
        assert!(CursorError::TooLong.is_limit_error());
        assert!(CursorError::InvalidEncoding.is_format_error());
        assert!(CursorError::InvalidJson.is_format_error());
        assert!(CursorError::UnexpectedShape.is_format_error());
        assert!(CursorError::InvalidId.is_content_error());
        assert!(CursorError::InvalidTimestamp.is_content_error());
        assert!(!CursorError::InvalidId.is_format_error());
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            CursorError::TooLong.to_string(),
            "cursor exceeds maximum length (500 characters)"
        );
        assert_eq!(
            CursorError::InvalidEncoding.to_string(),
            "invalid base64 encoding in cursor"
        );
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_rejection_is_logged_without_token() {
        assert!(decode_cursor("bm90LWpzb24").is_none());
        assert!(logs_contain("rejected pagination cursor"));
        assert!(logs_contain("not valid JSON"));
        assert!(!logs_contain("bm90LWpzb24"));
    }
}
