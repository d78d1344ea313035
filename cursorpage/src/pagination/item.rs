//! Item shapes the page assembler can read a cursor from.

use super::cursor::encode_cursor;

/// An item carrying its own `(created_at, id)` position.
///
/// Usually derived:
///
/// ```
/// use cursorpage::CursorItem;
///
/// #[derive(CursorItem)]
/// struct Order {
///     id: String,
///     created_at: String,
///     total_cents: i64,
/// }
///
/// let order = Order {
///     id: "123e4567-e89b-12d3-a456-426614174000".into(),
///     created_at: "2026-02-15T10:00:00.000Z".into(),
///     total_cents: 1299,
/// };
/// assert_eq!(order.cursor_id(), "123e4567-e89b-12d3-a456-426614174000");
/// ```
pub trait CursorItem {
    /// ISO-8601 timestamp text for the cursor.
    fn cursor_created_at(&self) -> String;

    /// Id text for the cursor.
    fn cursor_id(&self) -> String;

    /// Cursor token pointing at this item.
    fn cursor(&self) -> String {
        encode_cursor(self.cursor_created_at(), self.cursor_id())
    }
}

impl<T: CursorItem + ?Sized> CursorItem for &T {
    fn cursor_created_at(&self) -> String {
        (**self).cursor_created_at()
    }

    fn cursor_id(&self) -> String {
        (**self).cursor_id()
    }
}

impl<T: CursorItem + ?Sized> CursorItem for Box<T> {
    fn cursor_created_at(&self) -> String {
        (**self).cursor_created_at()
    }

    fn cursor_id(&self) -> String {
        (**self).cursor_id()
    }
}
