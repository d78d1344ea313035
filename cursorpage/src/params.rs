//! Pagination request parameters: `cursor`, `pageSize`, `sortOrder`.
//!
//! Validation here is about request shape only. The cursor is carried as an
//! opaque string and checked later by the codec; `pageSize` and `sortOrder`
//! fail fast with a [`ParamError`] before any storage access.
//!
//! ```
//! use cursorpage::{FromQuery, PageRequest, SortOrder, parse_query_string};
//!
//! let params = parse_query_string("pageSize=50&sortOrder=asc").unwrap();
//! let request = PageRequest::from_query(&params).unwrap();
//! assert_eq!(request.page_size(), 50);
//! assert_eq!(request.sort_order(), SortOrder::Asc);
//! assert!(request.cursor().is_none());
//!
//! let params = parse_query_string("pageSize=101").unwrap();
//! assert!(PageRequest::from_query(&params).is_err());
//! ```

use miniserde::json::{self, Number, Value};

use crate::config::PageLimits;
use crate::constants::{MAX_URL_DECODED_LEN, PARAM_CURSOR, PARAM_PAGE_SIZE, PARAM_SORT_ORDER};
use crate::pagination::SortOrder;

/// Accepted `sortOrder` values, for error messages.
const SORT_ORDER_CHOICES: &str = "asc, desc";

/// Error returned when pagination parameters are invalid.
///
/// Always a client error: the request should be answered with a 400-class
/// status and no query should run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum ParamError {
    /// The value is not a whole number.
    #[error("{field} must be an integer, got '{value}'")]
    NotAnInteger {
        /// The parameter name.
        field: &'static str,
        /// The rejected input.
        value: String,
    },

    /// The value is below the allowed minimum.
    #[error("{field} must be at least {min}")]
    BelowMinimum {
        /// The parameter name.
        field: &'static str,
        /// Smallest accepted value.
        min: u32,
    },

    /// The value is above the allowed maximum.
    #[error("{field} must be at most {max}")]
    AboveMaximum {
        /// The parameter name.
        field: &'static str,
        /// Largest accepted value.
        max: u32,
    },

    /// The value is not one of the accepted choices.
    #[error("{field} must be one of: {allowed}, got '{value}'")]
    InvalidChoice {
        /// The parameter name.
        field: &'static str,
        /// The rejected input.
        value: String,
        /// Accepted values, comma separated.
        allowed: &'static str,
    },

    /// A JSON field has the wrong type.
    #[error("{field} must be {expected}")]
    TypeMismatch {
        /// The parameter name, or `body` for the document itself.
        field: &'static str,
        /// Expected JSON type.
        expected: &'static str,
    },

    /// The request body is not JSON.
    #[error("request body is not valid JSON")]
    InvalidJson,

    /// A query string decodes past [`MAX_URL_DECODED_LEN`].
    #[error("query string exceeds {} bytes", MAX_URL_DECODED_LEN)]
    QueryTooLong,
}

impl ParamError {
    /// The parameter this error is about.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NotAnInteger { field, .. }
            | Self::BelowMinimum { field, .. }
            | Self::AboveMaximum { field, .. }
            | Self::InvalidChoice { field, .. }
            | Self::TypeMismatch { field, .. } => *field,
            Self::InvalidJson | Self::QueryTooLong => "body",
        }
    }

    /// Short name of the violated constraint.
    #[must_use]
    pub const fn constraint(&self) -> &'static str {
        match self {
            Self::NotAnInteger { .. } => "integer",
            Self::BelowMinimum { .. } => "min",
            Self::AboveMaximum { .. } => "max",
            Self::InvalidChoice { .. } => "enum",
            Self::TypeMismatch { .. } => "type",
            Self::InvalidJson => "json",
            Self::QueryTooLong => "length",
        }
    }
}

/// Types that can be built from decoded query parameters.
pub trait FromQuery: Sized {
    /// Parse this type from query parameters.
    fn from_query(params: &[(String, String)]) -> Result<Self, ParamError>;
}

/// A validated pagination request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    cursor: Option<String>,
    page_size: u32,
    sort_order: SortOrder,
}

impl PageRequest {
    /// Validate an explicit request.
    pub fn new(
        cursor: Option<String>,
        page_size: u32,
        sort_order: SortOrder,
        limits: &PageLimits,
    ) -> Result<Self, ParamError> {
        Ok(Self {
            cursor: cursor.filter(|c| !c.is_empty()),
            page_size: check_page_size(i128::from(page_size), limits)?,
            sort_order,
        })
    }

    /// The first page with default size and order.
    #[must_use]
    pub fn first_page(limits: &PageLimits) -> Self {
        Self {
            cursor: None,
            page_size: limits.default_page_size(),
            sort_order: SortOrder::default(),
        }
    }

    /// Parse query parameters with explicit limits.
    ///
    /// Unknown keys are ignored. When a key repeats, the last value wins.
    pub fn from_query_with(
        params: &[(String, String)],
        limits: &PageLimits,
    ) -> Result<Self, ParamError> {
        let last = |name: &str| {
            params
                .iter()
                .rev()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        };

        let page_size = match last(PARAM_PAGE_SIZE) {
            Some(raw) => coerce_page_size(raw, limits)?,
            None => limits.default_page_size(),
        };
        let sort_order = match last(PARAM_SORT_ORDER) {
            Some(raw) => parse_sort_order(raw)?,
            None => SortOrder::default(),
        };
        let cursor = last(PARAM_CURSOR)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(Self {
            cursor,
            page_size,
            sort_order,
        })
    }

    /// Parse a JSON object body with default limits.
    pub fn from_json(body: &str) -> Result<Self, ParamError> {
        Self::from_json_with(body, &PageLimits::default())
    }

    /// Parse a JSON object body with explicit limits.
    ///
    /// `pageSize` may be a number or a numeric string. `null` counts as
    /// absent for every field.
    pub fn from_json_with(body: &str, limits: &PageLimits) -> Result<Self, ParamError> {
        let value: Value = json::from_str(body).map_err(|_| ParamError::InvalidJson)?;
        let Value::Object(object) = value else {
            return Err(ParamError::TypeMismatch {
                field: "body",
                expected: "an object",
            });
        };

        let cursor = match object.get(PARAM_CURSOR) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()).filter(|c| !c.is_empty()),
            Some(_) => {
                return Err(ParamError::TypeMismatch {
                    field: PARAM_CURSOR,
                    expected: "a string",
                });
            },
        };

        let page_size = match object.get(PARAM_PAGE_SIZE) {
            None | Some(Value::Null) => limits.default_page_size(),
            Some(Value::String(s)) => coerce_page_size(s, limits)?,
            Some(Value::Number(n)) => coerce_json_number(n, limits)?,
            Some(_) => {
                return Err(ParamError::TypeMismatch {
                    field: PARAM_PAGE_SIZE,
                    expected: "an integer",
                });
            },
        };

        let sort_order = match object.get(PARAM_SORT_ORDER) {
            None | Some(Value::Null) => SortOrder::default(),
            Some(Value::String(s)) => parse_sort_order(s)?,
            Some(_) => {
                return Err(ParamError::TypeMismatch {
                    field: PARAM_SORT_ORDER,
                    expected: "a string",
                });
            },
        };

        Ok(Self {
            cursor,
            page_size,
            sort_order,
        })
    }

    /// The raw cursor token, if one was supplied.
    #[inline]
    #[must_use]
    pub fn cursor(&self) -> Option<&str> {
        self.cursor.as_deref()
    }

    /// Validated page size.
    #[inline]
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Requested traversal direction.
    #[inline]
    #[must_use]
    pub const fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// The same request continued at `cursor`.
    #[must_use]
    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into()).filter(|c| !c.is_empty());
        self
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first_page(&PageLimits::default())
    }
}

impl FromQuery for PageRequest {
    fn from_query(params: &[(String, String)]) -> Result<Self, ParamError> {
        Self::from_query_with(params, &PageLimits::default())
    }
}

fn parse_sort_order(raw: &str) -> Result<SortOrder, ParamError> {
    SortOrder::parse(raw.trim()).ok_or_else(|| ParamError::InvalidChoice {
        field: PARAM_SORT_ORDER,
        value: raw.to_string(),
        allowed: SORT_ORDER_CHOICES,
    })
}

/// Coerce textual input to a page size.
///
/// Surrounding whitespace is ignored and an empty value reads as `0`. Any
/// finite number without a fractional part is accepted before the range
/// check, so `"20.0"` and `"1e1"` are valid.
fn coerce_page_size(raw: &str, limits: &PageLimits) -> Result<u32, ParamError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return check_page_size(0, limits);
    }
    let not_an_integer = || ParamError::NotAnInteger {
        field: PARAM_PAGE_SIZE,
        value: raw.to_string(),
    };
    let number: f64 = trimmed.parse().map_err(|_| not_an_integer())?;
    whole_number(number)
        .ok_or_else(not_an_integer)
        .and_then(|n| check_page_size(n, limits))
}

fn coerce_json_number(number: &Number, limits: &PageLimits) -> Result<u32, ParamError> {
    match *number {
        Number::U64(n) => check_page_size(i128::from(n), limits),
        Number::I64(n) => check_page_size(i128::from(n), limits),
        Number::F64(f) => whole_number(f)
            .ok_or_else(|| ParamError::NotAnInteger {
                field: PARAM_PAGE_SIZE,
                value: f.to_string(),
            })
            .and_then(|n| check_page_size(n, limits)),
    }
}

/// Whole finite values, saturated into `i128`.
#[allow(clippy::cast_possible_truncation)]
fn whole_number(value: f64) -> Option<i128> {
    (value.is_finite() && value.fract() == 0.0).then(|| value as i128)
}

fn check_page_size(value: i128, limits: &PageLimits) -> Result<u32, ParamError> {
    let min = limits.min_page_size();
    let max = limits.max_page_size();
    if value < i128::from(min) {
        return Err(ParamError::BelowMinimum {
            field: PARAM_PAGE_SIZE,
            min,
        });
    }
    if value > i128::from(max) {
        return Err(ParamError::AboveMaximum {
            field: PARAM_PAGE_SIZE,
            max,
        });
    }
    u32::try_from(value).map_err(|_| ParamError::AboveMaximum {
        field: PARAM_PAGE_SIZE,
        max,
    })
}

/// Split a raw query string into decoded key/value pairs.
///
/// A leading `?` is ignored, empty segments are skipped and a key without
/// `=` gets an empty value.
pub fn parse_query_string(query: &str) -> Result<Vec<(String, String)>, ParamError> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
            Ok((url_decode(key)?, url_decode(value)?))
        })
        .collect()
}

/// Decode `%XX` escapes and `+` as space.
///
/// Malformed escapes are kept verbatim and invalid UTF-8 is replaced rather
/// than rejected.
pub fn url_decode(s: &str) -> Result<String, ParamError> {
    let mut bytes = Vec::with_capacity(s.len());
    let mut input = s.bytes();

    while let Some(b) = input.next() {
        if bytes.len() >= MAX_URL_DECODED_LEN {
            return Err(ParamError::QueryTooLong);
        }
        match b {
            b'%' => {
                let hi = input.next();
                let lo = input.next();
                match (hi.and_then(hex_value), lo.and_then(hex_value)) {
                    (Some(h), Some(l)) => bytes.push((h << 4) | l),
                    _ => {
                        bytes.push(b'%');
                        bytes.extend(hi);
                        bytes.extend(lo);
                    },
                }
            },
            b'+' => bytes.push(b' '),
            _ => bytes.push(b),
        }
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
