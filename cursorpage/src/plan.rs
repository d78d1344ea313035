//! Request-to-query planning.
//!
//! A [`PagePlan`] runs everything that happens before the storage call:
//! parameter validation, cursor decoding and seek-condition construction. It
//! then assembles the fetched rows into a [`Page`] with the same page size
//! and ordering, so the two ends of a request cannot disagree.

use std::fmt::Display;

use chrono::{DateTime, Utc};

use crate::builder::{FilterExpr, SortField};
use crate::config::PageLimits;
use crate::pagination::{
    CursorError, CursorItem, CursorTimestamp, KeysetCondition, Page, SortOrder, decode_logged,
    parse_cursor_timestamp,
};
use crate::params::{PageRequest, ParamError};
use crate::validate::{IdentifierError, validate_sql_identifier};

/// Column names of the composite `(created_at, id)` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeysetColumns {
    created_at: String,
    id: String,
}

impl KeysetColumns {
    /// Use custom column names.
    pub fn new(created_at: impl Into<String>, id: impl Into<String>) -> Result<Self, IdentifierError> {
        let created_at = created_at.into();
        let id = id.into();
        validate_sql_identifier(&created_at)?;
        validate_sql_identifier(&id)?;
        Ok(Self { created_at, id })
    }

    /// Timestamp column.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    /// Tie-breaker column.
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl Default for KeysetColumns {
    fn default() -> Self {
        Self {
            created_at: "created_at".to_string(),
            id: "id".to_string(),
        }
    }
}

/// What to do when the request carries a cursor that does not decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InvalidCursor {
    /// Serve the first page as if no cursor was sent.
    #[default]
    Restart,
    /// Fail the request with [`PageError::Cursor`].
    Reject,
}

/// Errors from planning a page request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum PageError {
    /// `pageSize` or `sortOrder` failed validation.
    #[error(transparent)]
    Params(#[from] ParamError),
    /// The cursor was rejected under [`InvalidCursor::Reject`].
    #[error("invalid cursor: {0}")]
    Cursor(#[from] CursorError),
}

impl PageError {
    /// Whether the caller sent bad input. Always true today; kept so handlers
    /// can map errors without matching on variants.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self, Self::Params(_) | Self::Cursor(_))
    }
}

/// A validated, decoded page request ready to run against storage.
///
/// ```
/// use cursorpage::{InvalidCursor, KeysetColumns, PagePlan, PageRequest, sqlite};
///
/// let request = PageRequest::default();
/// let plan = PagePlan::new(&request, KeysetColumns::default(), InvalidCursor::Reject).unwrap();
///
/// let query = sqlite("orders").fields(&["id", "created_at"]).paginate(&plan).build();
/// assert_eq!(
///     query.sql,
///     "SELECT id, created_at FROM orders ORDER BY created_at DESC, id DESC LIMIT 21"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagePlan {
    columns: KeysetColumns,
    page_size: u32,
    order: SortOrder,
    seek: Option<KeysetCondition>,
}

impl PagePlan {
    /// Decode the request cursor and build the seek condition.
    pub fn new(
        request: &PageRequest,
        columns: KeysetColumns,
        on_invalid: InvalidCursor,
    ) -> Result<Self, PageError> {
        let order = request.sort_order();
        let position = match request.cursor() {
            None => None,
            Some(token) => match decode_logged(token) {
                Ok(position) => Some(position),
                Err(err) => match on_invalid {
                    InvalidCursor::Reject => return Err(err.into()),
                    InvalidCursor::Restart => {
                        tracing::debug!("restarting from the first page");
                        None
                    },
                },
            },
        };

        let seek = position
            .map(|position| KeysetCondition::new(&*columns.created_at, &*columns.id, position, order));

        tracing::trace!(
            page_size = request.page_size(),
            order = %order,
            seek = seek.is_some(),
            "planned page"
        );

        Ok(Self {
            columns,
            page_size: request.page_size(),
            order,
            seek,
        })
    }

    /// Validate query parameters and plan in one step.
    pub fn from_query(
        params: &[(String, String)],
        limits: &PageLimits,
        columns: KeysetColumns,
        on_invalid: InvalidCursor,
    ) -> Result<Self, PageError> {
        let request = PageRequest::from_query_with(params, limits)?;
        Self::new(&request, columns, on_invalid)
    }

    /// Key columns.
    #[inline]
    #[must_use]
    pub const fn columns(&self) -> &KeysetColumns {
        &self.columns
    }

    /// Rows per page.
    #[inline]
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Traversal direction.
    #[inline]
    #[must_use]
    pub const fn order(&self) -> SortOrder {
        self.order
    }

    /// Seek condition, absent on the first page.
    #[inline]
    #[must_use]
    pub const fn seek(&self) -> Option<&KeysetCondition> {
        self.seek.as_ref()
    }

    /// Whether this plan starts a traversal.
    #[inline]
    #[must_use]
    pub const fn is_first_page(&self) -> bool {
        self.seek.is_none()
    }

    /// Seek condition as a filter, to AND with other filters.
    #[must_use]
    pub fn seek_filter(&self) -> Option<FilterExpr> {
        self.seek.as_ref().map(KeysetCondition::to_filter_expr)
    }

    /// `ORDER BY` for both key columns in the traversal direction.
    #[must_use]
    pub fn sort_fields(&self) -> Vec<SortField> {
        let dir = self.order.sort_dir();
        vec![
            SortField::new(&*self.columns.created_at, dir),
            SortField::new(&*self.columns.id, dir),
        ]
    }

    /// Rows to fetch: one more than the page size.
    #[inline]
    #[must_use]
    pub const fn fetch_limit(&self) -> u32 {
        self.page_size.saturating_add(1)
    }

    /// Assemble fetched rows, read with [`PagePlan::fetch_limit`] and
    /// [`PagePlan::sort_fields`], into a page.
    pub fn assemble<T, C, I>(
        &self,
        rows: Vec<T>,
        created_at: impl Fn(&T) -> C,
        id: impl Fn(&T) -> I,
    ) -> Page<T>
    where
        C: CursorTimestamp,
        I: Display,
    {
        Page::from_lookahead(rows, self.page_size as usize, created_at, id)
    }

    /// [`PagePlan::assemble`] for items that know their own position.
    pub fn assemble_items<T: CursorItem>(&self, rows: Vec<T>) -> Page<T> {
        Page::from_items(rows, self.page_size as usize)
    }

    /// Run the plan over an in-memory collection.
    ///
    /// Sorts by the composite key, applies the seek condition and assembles
    /// the page. Items whose timestamp does not parse are skipped.
    pub fn paginate_in_memory<T: CursorItem>(&self, items: impl IntoIterator<Item = T>) -> Page<T> {
        let mut keyed: Vec<(DateTime<Utc>, String, T)> = items
            .into_iter()
            .filter_map(|item| {
                let created_at = parse_cursor_timestamp(&item.cursor_created_at())?;
                let id = item.cursor_id().to_ascii_lowercase();
                Some((created_at, id, item))
            })
            .filter(|(created_at, id, _)| {
                self.seek
                    .as_ref()
                    .is_none_or(|seek| seek.admits(created_at, id))
            })
            .collect();

        keyed.sort_by(|a, b| {
            let ordering = a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1));
            match self.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        keyed.truncate(self.fetch_limit() as usize);

        self.assemble_items(keyed.into_iter().map(|(_, _, item)| item).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagination::{decode_cursor, encode_cursor};

    const ID_2: &str = "aaaaaaaa-aaaa-4aaa-8aaa-000000000002";

    fn request_with(cursor: &str) -> PageRequest {
        PageRequest::default().with_cursor(cursor)
    }

    #[test]
    fn test_first_page_has_no_seek() {
        let plan =
            PagePlan::new(&PageRequest::default(), KeysetColumns::default(), InvalidCursor::Reject)
                .unwrap();
        assert!(plan.is_first_page());
        assert!(plan.seek_filter().is_none());
        assert_eq!(plan.fetch_limit(), 21);
        assert_eq!(plan.order(), SortOrder::Desc);
    }

    #[test]
    fn test_valid_cursor_builds_seek() {
        let token = encode_cursor("2026-01-02T00:00:00Z", ID_2);
        let plan = PagePlan::new(
            &request_with(&token),
            KeysetColumns::default(),
            InvalidCursor::Reject,
        )
        .unwrap();
        let seek = plan.seek().unwrap();
        assert_eq!(seek.position().id(), ID_2);
        assert_eq!(seek.order(), SortOrder::Desc);
    }

    #[test]
    fn test_invalid_cursor_policies() {
        let request = request_with("not-base64!!!");

        let plan = PagePlan::new(&request, KeysetColumns::default(), InvalidCursor::Restart).unwrap();
        assert!(plan.is_first_page());

        let err = PagePlan::new(&request, KeysetColumns::default(), InvalidCursor::Reject)
            .unwrap_err();
        assert_eq!(err, PageError::Cursor(CursorError::InvalidEncoding));
        assert!(err.is_client_error());
        assert_eq!(err.to_string(), "invalid cursor: invalid base64 encoding in cursor");
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_restart_is_logged() {
        let request = request_with("bm90LWpzb24");
        let _ = PagePlan::new(&request, KeysetColumns::default(), InvalidCursor::Restart);
        assert!(logs_contain("rejected pagination cursor"));
        assert!(logs_contain("restarting from the first page"));
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_reject_logs_the_same_event() {
        let request = request_with("bm90LWpzb24");
        let err = PagePlan::new(&request, KeysetColumns::default(), InvalidCursor::Reject)
            .unwrap_err();
        assert_eq!(err, PageError::Cursor(CursorError::InvalidJson));
        assert!(logs_contain("rejected pagination cursor"));
        assert!(logs_contain("reason=cursor payload is not valid JSON"));
        assert!(logs_contain("len=11"));
        assert!(!logs_contain("bm90LWpzb24"));
        assert!(!logs_contain("restarting"));
    }

    #[test]
    fn test_sub_millisecond_rows_resume_exactly() {
        use chrono::{Duration, TimeZone};

        let base = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let ids = [
            "aaaaaaaa-aaaa-4aaa-8aaa-000000000001",
            "aaaaaaaa-aaaa-4aaa-8aaa-000000000002",
        ];
        // Both rows fall inside the same millisecond
        let rows = vec![
            (base + Duration::microseconds(123_100), ids[0]),
            (base + Duration::microseconds(123_456), ids[1]),
        ];

        for order in [SortOrder::Asc, SortOrder::Desc] {
            let mut sorted = rows.clone();
            if order == SortOrder::Desc {
                sorted.reverse();
            }
            let first = Page::from_lookahead(sorted.clone(), 1, |r| r.0, |r| r.1);
            let position = decode_cursor(first.next_cursor().unwrap()).unwrap();
            assert_eq!(position.instant(), sorted[0].0);

            let seek = KeysetCondition::new("created_at", "id", position, order);
            assert!(!seek.admits(&sorted[0].0, sorted[0].1), "{order}: served row repeated");
            assert!(seek.admits(&sorted[1].0, sorted[1].1), "{order}: unseen row skipped");
        }
    }

    #[test]
    fn test_from_query_validates_params_first() {
        let params = vec![
            ("pageSize".to_string(), "0".to_string()),
            ("cursor".to_string(), "garbage".to_string()),
        ];
        let err = PagePlan::from_query(
            &params,
            &PageLimits::default(),
            KeysetColumns::default(),
            InvalidCursor::Reject,
        )
        .unwrap_err();
        assert!(matches!(err, PageError::Params(ParamError::BelowMinimum { .. })));
    }

    #[test]
    fn test_custom_columns() {
        let columns = KeysetColumns::new("inserted_at", "uuid").unwrap();
        let plan = PagePlan::new(&PageRequest::default(), columns, InvalidCursor::Reject).unwrap();
        let fields: Vec<_> = plan.sort_fields().into_iter().map(|s| s.field).collect();
        assert_eq!(fields, ["inserted_at", "uuid"]);

        assert!(KeysetColumns::new("created at", "id").is_err());
        assert!(KeysetColumns::new("created_at", "").is_err());
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        created_at: String,
        id: String,
    }

    impl CursorItem for Note {
        fn cursor_created_at(&self) -> String {
            self.created_at.clone()
        }

        fn cursor_id(&self) -> String {
            self.id.clone()
        }
    }

    fn notes() -> Vec<Note> {
        // Two rows share a timestamp; unsorted on purpose
        [
            ("2026-01-01T00:00:00Z", "aaaaaaaa-aaaa-4aaa-8aaa-000000000003"),
            ("2026-01-03T00:00:00Z", "aaaaaaaa-aaaa-4aaa-8aaa-000000000001"),
            ("2026-01-02T00:00:00Z", "aaaaaaaa-aaaa-4aaa-8aaa-00000000000b"),
            ("2026-01-02T00:00:00Z", "aaaaaaaa-aaaa-4aaa-8aaa-00000000000a"),
        ]
        .into_iter()
        .map(|(c, i)| Note {
            created_at: c.to_string(),
            id: i.to_string(),
        })
        .collect()
    }

    #[test]
    fn test_in_memory_traversal_desc() {
        let limits = PageLimits::default();
        let mut request = PageRequest::new(None, 2, SortOrder::Desc, &limits).unwrap();
        let mut seen = Vec::new();
        loop {
            let plan = PagePlan::new(&request, KeysetColumns::default(), InvalidCursor::Reject)
                .unwrap();
            let page = plan.paginate_in_memory(notes());
            seen.extend(page.items().iter().map(|n| n.id.clone()));
            match page.next_cursor() {
                Some(cursor) => request = request.with_cursor(cursor),
                None => break,
            }
        }
        assert_eq!(
            seen,
            [
                "aaaaaaaa-aaaa-4aaa-8aaa-000000000001",
                "aaaaaaaa-aaaa-4aaa-8aaa-00000000000b",
                "aaaaaaaa-aaaa-4aaa-8aaa-00000000000a",
                "aaaaaaaa-aaaa-4aaa-8aaa-000000000003",
            ]
        );
    }

    #[test]
    fn test_in_memory_asc_cursor_points_at_last_item() {
        let limits = PageLimits::default();
        let request = PageRequest::new(None, 3, SortOrder::Asc, &limits).unwrap();
        let plan = PagePlan::new(&request, KeysetColumns::default(), InvalidCursor::Reject).unwrap();
        let page = plan.paginate_in_memory(notes());
        assert!(page.has_next_page());
        let position = decode_cursor(page.next_cursor().unwrap()).unwrap();
        assert_eq!(position.id(), "aaaaaaaa-aaaa-4aaa-8aaa-00000000000b");
    }
}
