// =============================================================================
// CRATE-LEVEL QUALITY LINTS (following Tokio/Serde standards)
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(unreachable_pub)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION
// =============================================================================
#![allow(clippy::doc_markdown)] // Column names in docs
#![allow(clippy::module_name_repetitions)] // Type names matching module - acceptable
#![allow(clippy::return_self_not_must_use)] // Builder methods return Self
#![allow(clippy::must_use_candidate)] // Fluent API doesn't need must_use everywhere
#![allow(clippy::format_push_string)] // String building style preference
#![allow(clippy::cast_possible_truncation)] // Page sizes are bounded u32

//! # cursorpage - Keyset pagination with opaque cursors
//!
//! Stable pagination over collections ordered by `(created_at, id)`. Each
//! page carries an opaque, URL-safe `nextCursor`; the next request hands it
//! back and receives the rows strictly past it. Rows inserted meanwhile never
//! shift the window, so nothing is skipped or repeated.
//!
//! Four pieces:
//!
//! - **Cursor codec**: [`encode_cursor`] / [`decode_cursor`], base64url over
//!   a `{"createdAt", "id"}` JSON object, validated on the way in.
//! - **Predicate builder**: [`KeysetCondition`] turns a position and a
//!   [`SortOrder`] into a seek condition for the query builder.
//! - **Page assembler**: [`Page`] trims a `pageSize + 1` fetch and derives
//!   the next cursor from the last row kept.
//! - **Parameter contract**: [`PageRequest`] validates `cursor`, `pageSize`
//!   and `sortOrder` from a query string or a JSON body.
//!
//! [`PagePlan`] ties them together for one request.
//!
//! ## Quick Start
//!
//! ```
//! use cursorpage::prelude::*;
//!
//! let query = parse_query_string("pageSize=2&sortOrder=desc").unwrap();
//! let plan = PagePlan::from_query(
//!     &query,
//!     &PageLimits::default(),
//!     KeysetColumns::default(),
//!     InvalidCursor::Reject,
//! )
//! .unwrap();
//!
//! let sql = postgres("orders")
//!     .fields(&["id", "created_at", "total_cents"])
//!     .filter("status", Operator::Eq, "paid")
//!     .paginate(&plan)
//!     .build();
//! assert_eq!(
//!     sql.sql,
//!     "SELECT id, created_at, total_cents FROM orders WHERE status = $1 \
//!      ORDER BY created_at DESC, id DESC LIMIT 3"
//! );
//!
//! // Rows as the database returned them
//! let rows = vec![
//!     ("2026-01-03T00:00:00.000Z", "aaaaaaaa-aaaa-4aaa-8aaa-000000000001"),
//!     ("2026-01-02T00:00:00.000Z", "aaaaaaaa-aaaa-4aaa-8aaa-000000000002"),
//!     ("2026-01-01T00:00:00.000Z", "aaaaaaaa-aaaa-4aaa-8aaa-000000000003"),
//! ];
//! let page = plan.assemble(rows, |r| r.0, |r| r.1);
//! assert_eq!(page.items().len(), 2);
//! assert!(page.has_next_page());
//! ```
//!
//! ## Deriving `CursorItem`
//!
//! With the default `derive` feature, structs with `created_at` and `id`
//! fields (or fields marked `#[cursor(created_at)]` / `#[cursor(id)]`) can
//! derive [`CursorItem`] and be assembled without accessor closures.
//!
//! ## Configuration
//!
//! [`PageLimits`] holds the default and maximum page size. It can be read
//! from `CURSORPAGE_DEFAULT_PAGE_SIZE` and `CURSORPAGE_MAX_PAGE_SIZE`; out of
//! range values fall back to the built-in defaults.
//!
//! ## Logging
//!
//! Rejected cursors are logged through `tracing` at debug level with the
//! reason and token length, never the token. Planning, SQL building and page
//! assembly emit trace events.

mod builder;
mod config;
pub mod constants;
mod dialect;
mod pagination;
mod params;
mod plan;
mod validate;

pub use builder::{
    CompoundFilter, Filter, FilterExpr, LogicalOp, Operator, QueryBuilder, QueryResult, SortDir,
    SortField, Value, and, not, or, simple,
};
pub use config::PageLimits;
pub use dialect::{Dialect, Postgres, Sqlite};
pub use pagination::{
    CursorError, CursorItem, CursorPosition, CursorTimestamp, KeysetCondition, Page, SortOrder,
    decode_cursor, encode_cursor, is_valid_cursor_id, parse_cursor_timestamp,
};
pub use params::{FromQuery, PageRequest, ParamError, parse_query_string, url_decode};
pub use plan::{InvalidCursor, KeysetColumns, PageError, PagePlan};
pub use validate::{
    IdentifierError, assert_valid_sql_identifier, is_valid_sql_identifier, validate_sql_identifier,
};

/// Derive [`CursorItem`] from a struct's `created_at` and `id` fields.
#[cfg(feature = "derive")]
pub use cursorpage_macros::CursorItem;

/// Re-export miniserde's json module for serialising pages.
///
/// ```
/// use cursorpage::{Page, json};
///
/// let page: Page<String> = Page::empty();
/// assert_eq!(json::to_string(&page), r#"{"items":[],"nextCursor":null,"hasNextPage":false}"#);
/// ```
pub use miniserde::json;

/// Build a query for Postgres.
///
/// Convenience function that creates a `QueryBuilder` with Postgres dialect.
#[must_use]
pub fn postgres(table: &str) -> QueryBuilder<Postgres> {
    QueryBuilder::new(Postgres, table)
}

/// Build a query for `SQLite`.
///
/// Convenience function that creates a `QueryBuilder` with `SQLite` dialect.
#[must_use]
pub fn sqlite(table: &str) -> QueryBuilder<Sqlite> {
    QueryBuilder::new(Sqlite, table)
}

/// Prelude module for convenient imports.
///
/// ```
/// use cursorpage::prelude::*;
/// let result = sqlite("orders").fields(&["id"]).build();
/// assert_eq!(result.sql, "SELECT id FROM orders");
/// ```
pub mod prelude {
    pub use crate::{
        CursorError, CursorItem, CursorPosition, CursorTimestamp, Dialect, FilterExpr, FromQuery,
        InvalidCursor, KeysetColumns, KeysetCondition, Operator, Page, PageError, PageLimits,
        PagePlan, PageRequest, ParamError, Postgres, QueryBuilder, QueryResult, SortDir,
        SortOrder, Sqlite, Value, and, decode_cursor, encode_cursor, not, or, parse_query_string,
        postgres, simple, sqlite,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use static_assertions::assert_impl_all;

    assert_impl_all!(CursorPosition: Send, Sync, Clone);
    assert_impl_all!(CursorError: Send, Sync, Copy, std::error::Error);
    assert_impl_all!(ParamError: Send, Sync, std::error::Error);
    assert_impl_all!(PageError: Send, Sync, std::error::Error);
    assert_impl_all!(PagePlan: Send, Sync, Clone);
    assert_impl_all!(PageRequest: Send, Sync, Default);
    assert_impl_all!(Page<String>: Send, Sync, Default);
    assert_impl_all!(KeysetCondition: Send, Sync);
    assert_impl_all!(QueryBuilder<Postgres>: Send, Sync);

    const ID_A: &str = "aaaaaaaa-aaaa-4aaa-8aaa-00000000000a";
    const ID_B: &str = "aaaaaaaa-aaaa-4aaa-8aaa-00000000000b";

    #[test]
    fn test_first_page_request_end_to_end() {
        let plan = PagePlan::new(
            &PageRequest::default(),
            KeysetColumns::default(),
            InvalidCursor::Reject,
        )
        .unwrap();
        let result = postgres("orders").paginate(&plan).build();
        assert_eq!(
            result.sql,
            "SELECT * FROM orders ORDER BY created_at DESC, id DESC LIMIT 21"
        );
        assert!(result.params.is_empty());
    }

    #[test]
    fn test_cursor_from_page_drives_next_query() {
        let rows = vec![
            ("2026-01-02T00:00:00.000Z", ID_B),
            ("2026-01-02T00:00:00.000Z", ID_A),
        ];
        let page = Page::from_lookahead(rows, 1, |r| r.0, |r| r.1);
        let token = page.next_cursor().unwrap();

        let query = vec![("cursor".to_string(), token.to_string())];
        let plan = PagePlan::from_query(
            &query,
            &PageLimits::default(),
            KeysetColumns::default(),
            InvalidCursor::Reject,
        )
        .unwrap();
        let result = sqlite("orders").paginate(&plan).build();
        assert_eq!(
            result.params,
            vec![
                Value::String("2026-01-02T00:00:00.000Z".into()),
                Value::String("2026-01-02T00:00:00.000Z".into()),
                Value::String(ID_B.into()),
            ]
        );
    }

    #[test]
    fn test_tampered_cursor_is_reported() {
        let query = vec![("cursor".to_string(), "eyJpZCI6MX0".to_string())];
        let err = PagePlan::from_query(
            &query,
            &PageLimits::default(),
            KeysetColumns::default(),
            InvalidCursor::Reject,
        )
        .unwrap_err();
        assert_eq!(err, PageError::Cursor(CursorError::UnexpectedShape));
    }
}
