//! Page assembly from a lookahead fetch.

use std::borrow::Cow;
use std::fmt::Display;

use miniserde::Serialize;
use miniserde::ser::{Fragment, Map};

use super::cursor::encode_cursor;
use super::item::CursorItem;
use super::position::CursorTimestamp;

/// One page of results.
///
/// `next_cursor` is present exactly when `has_next_page` is true. Serialises
/// as `{"items": [...], "nextCursor": "..." | null, "hasNextPage": bool}`.
///
/// ```
/// use cursorpage::Page;
///
/// // Fetched page_size + 1 rows
/// let rows = vec![
///     ("2026-01-03T00:00:00Z", "aaaaaaaa-aaaa-4aaa-8aaa-000000000001"),
///     ("2026-01-02T00:00:00Z", "aaaaaaaa-aaaa-4aaa-8aaa-000000000002"),
///     ("2026-01-01T00:00:00Z", "aaaaaaaa-aaaa-4aaa-8aaa-000000000003"),
/// ];
/// let page = Page::from_lookahead(rows, 2, |r| r.0, |r| r.1);
///
/// assert_eq!(page.items().len(), 2);
/// assert!(page.has_next_page());
/// assert!(page.next_cursor().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct Page<T> {
    items: Vec<T>,
    next_cursor: Option<String>,
    has_next_page: bool,
}

impl<T> Page<T> {
    /// A page with no items and no continuation.
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            next_cursor: None,
            has_next_page: false,
        }
    }

    /// Assemble a page from rows fetched with a limit of `page_size + 1`.
    ///
    /// `results` must already be ordered by `(created_at, id)` in the
    /// traversal direction. The row past `page_size`, if any, only signals
    /// that another page exists and is dropped. The next cursor is taken from
    /// the last row kept.
    ///
    /// With `page_size == 0` nothing is kept, so no cursor can be derived and
    /// the page reports no continuation.
    pub fn from_lookahead<C, I>(
        mut results: Vec<T>,
        page_size: usize,
        created_at: impl Fn(&T) -> C,
        id: impl Fn(&T) -> I,
    ) -> Self
    where
        C: CursorTimestamp,
        I: Display,
    {
        let next_cursor = if results.len() > page_size {
            results.truncate(page_size);
            results.last().map(|last| encode_cursor(created_at(last), id(last)))
        } else {
            None
        };
        let has_next_page = next_cursor.is_some();

        tracing::trace!(items = results.len(), has_next_page, "assembled page");

        Self {
            items: results,
            next_cursor,
            has_next_page,
        }
    }

    /// Items on this page, in traversal order.
    #[inline]
    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Token for the following page.
    #[inline]
    #[must_use]
    pub fn next_cursor(&self) -> Option<&str> {
        self.next_cursor.as_deref()
    }

    /// Whether another page follows.
    #[inline]
    #[must_use]
    pub const fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    /// Take the items, discarding the continuation.
    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Split into `(items, next_cursor)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, Option<String>) {
        (self.items, self.next_cursor)
    }

    /// Convert the items, keeping the continuation.
    ///
    /// The cursor was already derived from the original items, so the target
    /// type does not need to carry a position.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
            has_next_page: self.has_next_page,
        }
    }
}

impl<T: CursorItem> Page<T> {
    /// [`Page::from_lookahead`] for items that know their own position.
    pub fn from_items(results: Vec<T>, page_size: usize) -> Self {
        Self::from_lookahead(
            results,
            page_size,
            T::cursor_created_at,
            T::cursor_id,
        )
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn begin(&self) -> Fragment<'_> {
        Fragment::Map(Box::new(PageFields {
            page: self,
            state: 0,
        }))
    }
}

struct PageFields<'a, T> {
    page: &'a Page<T>,
    state: u8,
}

impl<T: Serialize> Map for PageFields<'_, T> {
    fn next(&mut self) -> Option<(Cow<'_, str>, &dyn Serialize)> {
        let state = self.state;
        self.state = self.state.saturating_add(1);
        match state {
            0 => Some((Cow::Borrowed("items"), &self.page.items)),
            1 => Some((Cow::Borrowed("nextCursor"), &self.page.next_cursor)),
            2 => Some((Cow::Borrowed("hasNextPage"), &self.page.has_next_page)),
            _ => None,
        }
    }
}
