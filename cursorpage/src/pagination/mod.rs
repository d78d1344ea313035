//! Cursor pagination over the `(created_at, id)` composite key.
//!
//! | Piece                | Input                          | Output                   |
//! |----------------------|--------------------------------|--------------------------|
//! | [`encode_cursor`]    | timestamp + id                 | opaque URL-safe token    |
//! | [`decode_cursor`]    | token                          | [`CursorPosition`] / None|
//! | [`KeysetCondition`]  | position + [`SortOrder`]       | seek [`FilterExpr`]      |
//! | [`Page`]             | `page_size + 1` ordered rows   | items + next cursor      |
//!
//! Rows are totally ordered by `created_at` with `id` as tie-breaker, so
//! concurrent inserts never shift or duplicate rows already returned.
//!
//! ```
//! use chrono::{DateTime, Utc};
//! use cursorpage::{KeysetCondition, Page, SortOrder, decode_cursor};
//!
//! let at = |s: &str| s.parse::<DateTime<Utc>>().unwrap();
//! let rows = vec![
//!     (at("2026-01-03T00:00:00Z"), "aaaaaaaa-aaaa-4aaa-8aaa-000000000001"),
//!     (at("2026-01-02T00:00:00Z"), "aaaaaaaa-aaaa-4aaa-8aaa-000000000002"),
//!     (at("2026-01-01T00:00:00Z"), "aaaaaaaa-aaaa-4aaa-8aaa-000000000003"),
//! ];
//!
//! // First page: no condition, fetch 2 + 1
//! let first = Page::from_lookahead(rows.clone(), 2, |r| r.0, |r| r.1);
//! let position = decode_cursor(first.next_cursor().unwrap()).unwrap();
//! assert_eq!(position.created_at(), "2026-01-02T00:00:00.000000000Z");
//!
//! // Second page: seek past the cursor
//! let seek = KeysetCondition::new("created_at", "id", position, SortOrder::Desc);
//! let rest: Vec<_> = rows.into_iter().filter(|r| seek.admits(&r.0, r.1)).collect();
//! let second = Page::from_lookahead(rest, 2, |r| r.0, |r| r.1);
//! assert_eq!(second.items().len(), 1);
//! assert!(!second.has_next_page());
//! ```
//!
//! [`FilterExpr`]: crate::FilterExpr

mod cursor;
mod encoding;
mod item;
mod keyset;
mod page;
mod position;

pub(crate) use cursor::decode_logged;
pub use cursor::{CursorError, decode_cursor, encode_cursor};
pub use item::CursorItem;
pub use keyset::{KeysetCondition, SortOrder};
pub use page::Page;
pub use position::{CursorPosition, CursorTimestamp, is_valid_cursor_id, parse_cursor_timestamp};
