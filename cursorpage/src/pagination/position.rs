//! Cursor positions and the validation rules for their two fields.

use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, SecondsFormat, Utc};
use regex::Regex;

use super::cursor::CursorError;

/// RFC 4122 UUID, versions 1 through 5, hyphenated, either case.
static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .unwrap_or_else(|e| unreachable!("static UUID pattern: {e}"))
});

/// ISO-8601 date-time prefix: `YYYY-MM-DDTHH:MM:SS`.
static ISO_DATETIME_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}")
        .unwrap_or_else(|e| unreachable!("static date-time pattern: {e}"))
});

/// Whether `id` is a canonical UUID v1-v5.
#[must_use]
pub fn is_valid_cursor_id(id: &str) -> bool {
    UUID_PATTERN.is_match(id)
}

/// Parse a cursor timestamp into an instant.
///
/// Requires the ISO-8601 prefix, then either a full RFC 3339 value or a
/// naive `YYYY-MM-DDTHH:MM:SS[.fff]` read as UTC.
#[must_use]
pub fn parse_cursor_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if !ISO_DATETIME_PREFIX.is_match(value) {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Values usable as the timestamp half of a cursor.
///
/// Native timestamps are normalised to UTC with all nine fractional digits
/// (`2026-02-15T10:00:00.123456789Z`), so no precision is lost and texts of
/// equal width sort in time order. Strings pass through untouched; they are
/// validated when the token comes back.
pub trait CursorTimestamp {
    /// The ISO-8601 text stored in the cursor.
    fn to_cursor_timestamp(&self) -> String;
}

impl CursorTimestamp for DateTime<Utc> {
    fn to_cursor_timestamp(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::Nanos, true)
    }
}

impl CursorTimestamp for DateTime<FixedOffset> {
    fn to_cursor_timestamp(&self) -> String {
        self.with_timezone(&Utc).to_cursor_timestamp()
    }
}

impl CursorTimestamp for NaiveDateTime {
    fn to_cursor_timestamp(&self) -> String {
        self.and_utc().to_cursor_timestamp()
    }
}

impl CursorTimestamp for str {
    fn to_cursor_timestamp(&self) -> String {
        self.to_string()
    }
}

impl CursorTimestamp for String {
    fn to_cursor_timestamp(&self) -> String {
        self.clone()
    }
}

impl<T: CursorTimestamp + ?Sized> CursorTimestamp for &T {
    fn to_cursor_timestamp(&self) -> String {
        (**self).to_cursor_timestamp()
    }
}

/// A validated `(created_at, id)` position in a keyset traversal.
///
/// Holds the exact text carried by the token, so decoding an encoded
/// position yields an equal value. The parsed instant is kept alongside for
/// in-memory comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CursorPosition {
    created_at: String,
    id: String,
    instant: DateTime<Utc>,
}

impl CursorPosition {
    /// Validate and build a position from its text form.
    pub fn new(created_at: impl Into<String>, id: impl Into<String>) -> Result<Self, CursorError> {
        let created_at = created_at.into();
        let id = id.into();

        if !is_valid_cursor_id(&id) {
            return Err(CursorError::InvalidId);
        }
        let instant = parse_cursor_timestamp(&created_at).ok_or(CursorError::InvalidTimestamp)?;

        Ok(Self {
            created_at,
            id,
            instant,
        })
    }

    /// Build a position from any timestamp type and id.
    pub fn from_parts(
        created_at: impl CursorTimestamp,
        id: impl std::fmt::Display,
    ) -> Result<Self, CursorError> {
        Self::new(created_at.to_cursor_timestamp(), id.to_string())
    }

    /// Timestamp text exactly as carried by the cursor.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Id text exactly as carried by the cursor.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The timestamp as a UTC instant.
    #[inline]
    #[must_use]
    pub const fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    /// Order a row against this position under the `(created_at, id)` key.
    ///
    /// Ids compare as lowercase hex text, which matches UUID byte order.
    #[must_use]
    pub fn compare_row(&self, created_at: &DateTime<Utc>, id: &str) -> Ordering {
        created_at
            .cmp(&self.instant)
            .then_with(|| cmp_ignore_ascii_case(id, &self.id))
    }
}

fn cmp_ignore_ascii_case(a: &str, b: &str) -> Ordering {
    a.bytes()
        .map(|c| c.to_ascii_lowercase())
        .cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
}
