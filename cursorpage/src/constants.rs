//! Centralized limits for cursor pagination.
//!
//! Page size bounds can be narrowed at runtime through [`PageLimits`](crate::PageLimits);
//! the values here are the hard bounds and defaults.

// ============================================================================
// CURSOR LIMITS
// ============================================================================

/// Maximum accepted cursor token length.
///
/// Checked before any decoding work. Tokens produced by this crate for a
/// UUID id and an ISO-8601 timestamp are around 110 characters.
pub const MAX_CURSOR_LENGTH: usize = 500;

// ============================================================================
// PAGE SIZE LIMITS
// ============================================================================

/// Smallest page a caller may request.
pub const MIN_PAGE_SIZE: u32 = 1;

/// Page size used when the request does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page a caller may request.
pub const MAX_PAGE_SIZE: u32 = 100;

// ============================================================================
// REQUEST PARSING LIMITS
// ============================================================================

/// Maximum decoded URL length (64KB).
/// Prevents DoS via extremely long encoded query strings.
pub const MAX_URL_DECODED_LEN: usize = 65536;

// ============================================================================
// ENVIRONMENT VARIABLES
// ============================================================================

/// Overrides [`DEFAULT_PAGE_SIZE`].
pub const ENV_DEFAULT_PAGE_SIZE: &str = "CURSORPAGE_DEFAULT_PAGE_SIZE";

/// Lowers [`MAX_PAGE_SIZE`].
pub const ENV_MAX_PAGE_SIZE: &str = "CURSORPAGE_MAX_PAGE_SIZE";

// ============================================================================
// QUERY PARAMETER NAMES
// ============================================================================

/// Query/body key carrying the cursor token.
pub const PARAM_CURSOR: &str = "cursor";

/// Query/body key carrying the page size.
pub const PARAM_PAGE_SIZE: &str = "pageSize";

/// Query/body key carrying the sort order.
pub const PARAM_SORT_ORDER: &str = "sortOrder";
