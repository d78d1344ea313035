// =============================================================================
// CRATE-LEVEL QUALITY LINTS (following Tokio/Serde standards)
// =============================================================================
#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
// =============================================================================
// CLIPPY CONFIGURATION FOR PROC-MACRO CRATES
// =============================================================================
#![allow(clippy::doc_markdown)] // Code in docs
#![allow(clippy::missing_errors_doc)] // # Errors sections - doc-heavy

//! Derive macros for `cursorpage`.

use proc_macro::TokenStream;

mod derive;

/// Derive `CursorItem` for a struct.
///
/// The cursor is read from the fields named `created_at` and `id`. Other
/// fields can be chosen with `#[cursor(created_at)]` and `#[cursor(id)]`.
///
/// The timestamp field must implement `CursorTimestamp` (`DateTime<Utc>`,
/// `DateTime<FixedOffset>`, `NaiveDateTime` or `String`); the id field must
/// implement `Display`.
///
/// ```ignore
/// #[derive(CursorItem)]
/// struct Event {
///     #[cursor(id)]
///     event_id: Uuid,
///     #[cursor(created_at)]
///     occurred_at: DateTime<Utc>,
///     kind: String,
/// }
/// ```
#[proc_macro_derive(CursorItem, attributes(cursor))]
pub fn derive_cursor_item(input: TokenStream) -> TokenStream {
    derive::derive_cursor_item_impl(input)
}
