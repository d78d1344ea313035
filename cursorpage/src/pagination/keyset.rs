//! Keyset seek condition over the `(created_at, id)` composite key.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::builder::{FilterExpr, Operator, SortDir, and, or, simple};

use super::item::CursorItem;
use super::position::{CursorPosition, parse_cursor_timestamp};

/// Traversal direction over the composite key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// Oldest first; pages continue with rows after the cursor.
    Asc,
    /// Newest first; pages continue with rows before the cursor.
    #[default]
    Desc,
}

impl SortOrder {
    /// Parse the request form, `asc` or `desc`. Case-sensitive.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    /// Request form of this order.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// The opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// `ORDER BY` direction applied to both key columns.
    #[must_use]
    pub const fn sort_dir(self) -> SortDir {
        match self {
            Self::Asc => SortDir::Asc,
            Self::Desc => SortDir::Desc,
        }
    }

    /// Strict comparison selecting rows past the cursor.
    #[must_use]
    pub const fn seek_operator(self) -> Operator {
        match self {
            Self::Asc => Operator::Gt,
            Self::Desc => Operator::Lt,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seek condition selecting rows strictly past a cursor position.
///
/// For `desc`:
///
/// ```text
/// created_at < $1 OR (created_at = $2 AND id < $3)
/// ```
///
/// and the same with `>` for `asc`. Both halves compare against the cursor
/// values, so the condition matches an index on `(created_at, id)` read in
/// the same direction. See <https://use-the-index-luke.com/no-offset>.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeysetCondition {
    created_at_field: String,
    id_field: String,
    position: CursorPosition,
    order: SortOrder,
}

impl KeysetCondition {
    /// Create a seek condition for the given key columns.
    ///
    /// # Panics
    ///
    /// Panics if either column name is not a valid SQL identifier.
    pub fn new(
        created_at_field: impl Into<String>,
        id_field: impl Into<String>,
        position: CursorPosition,
        order: SortOrder,
    ) -> Self {
        let created_at_field = created_at_field.into();
        let id_field = id_field.into();
        crate::validate::assert_valid_sql_identifier(&created_at_field, "keyset column");
        crate::validate::assert_valid_sql_identifier(&id_field, "keyset column");
        Self {
            created_at_field,
            id_field,
            position,
            order,
        }
    }

    /// The position this condition seeks past.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> &CursorPosition {
        &self.position
    }

    /// Traversal direction.
    #[inline]
    #[must_use]
    pub const fn order(&self) -> SortOrder {
        self.order
    }

    /// Convert to a filter expression for the query builder.
    ///
    /// Values are bound exactly as the cursor carries them.
    #[must_use]
    pub fn to_filter_expr(&self) -> FilterExpr {
        let op = self.order.seek_operator();
        let created_at = self.position.created_at();
        let id = self.position.id();

        or(vec![
            simple(&*self.created_at_field, op, created_at),
            and(vec![
                simple(&*self.created_at_field, Operator::Eq, created_at),
                simple(&*self.id_field, op, id),
            ]),
        ])
    }

    /// Evaluate the condition for one row in memory.
    ///
    /// Timestamps compare as instants and ids as lowercase UUID text.
    #[must_use]
    pub fn admits(&self, created_at: &DateTime<Utc>, id: &str) -> bool {
        let ordering = self.position.compare_row(created_at, id);
        match self.order {
            SortOrder::Asc => ordering.is_gt(),
            SortOrder::Desc => ordering.is_lt(),
        }
    }

    /// Evaluate the condition for an item. Items whose timestamp does not
    /// parse are never admitted.
    #[must_use]
    pub fn admits_item<T: CursorItem + ?Sized>(&self, item: &T) -> bool {
        parse_cursor_timestamp(&item.cursor_created_at())
            .is_some_and(|created_at| self.admits(&created_at, &item.cursor_id()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{CompoundFilter, Filter, LogicalOp, Value};
    use chrono::TimeZone;

    const ID_1: &str = "aaaaaaaa-aaaa-4aaa-8aaa-000000000001";
    const ID_2: &str = "aaaaaaaa-aaaa-4aaa-8aaa-000000000002";
    const ID_3: &str = "aaaaaaaa-aaaa-4aaa-8aaa-000000000003";

    fn position() -> CursorPosition {
        CursorPosition::new("2026-01-02T00:00:00Z", ID_2).unwrap()
    }

    fn seek(field: &str, op: Operator, value: &str) -> FilterExpr {
        FilterExpr::Simple(Filter {
            field: field.to_string(),
            op,
            value: Value::String(value.to_string()),
        })
    }

    #[test]
    fn test_desc_condition_shape() {
        let condition = KeysetCondition::new("created_at", "id", position(), SortOrder::Desc);
        let expected = FilterExpr::Compound(CompoundFilter {
            op: LogicalOp::Or,
            filters: vec![
                seek("created_at", Operator::Lt, "2026-01-02T00:00:00Z"),
                FilterExpr::Compound(CompoundFilter {
                    op: LogicalOp::And,
                    filters: vec![
                        seek("created_at", Operator::Eq, "2026-01-02T00:00:00Z"),
                        seek("id", Operator::Lt, ID_2),
                    ],
                }),
            ],
        });
        assert_eq!(condition.to_filter_expr(), expected);
    }

    #[test]
    fn test_asc_condition_uses_greater_than() {
        let condition = KeysetCondition::new("inserted_at", "uuid", position(), SortOrder::Asc);
        let FilterExpr::Compound(outer) = condition.to_filter_expr() else {
            panic!("expected OR compound");
        };
        assert_eq!(outer.op, LogicalOp::Or);
        let Some(FilterExpr::Simple(first)) = outer.filters.first() else {
            panic!("expected simple first branch");
        };
        assert_eq!(first.field, "inserted_at");
        assert_eq!(first.op, Operator::Gt);
        let Some(FilterExpr::Compound(tie)) = outer.filters.get(1) else {
            panic!("expected AND tie-break branch");
        };
        assert_eq!(
            tie.filters.get(1),
            Some(&seek("uuid", Operator::Gt, ID_2))
        );
    }

    #[test]
    fn test_admits_desc() {
        let condition = KeysetCondition::new("created_at", "id", position(), SortOrder::Desc);
        let earlier = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let same = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 1, 3, 0, 0, 0).unwrap();

        assert!(condition.admits(&earlier, ID_3));
        assert!(condition.admits(&same, ID_1));
        assert!(!condition.admits(&same, ID_2));
        assert!(!condition.admits(&same, ID_3));
        assert!(!condition.admits(&later, ID_1));
    }

    #[test]
    fn test_admits_asc_is_mirror() {
        let condition = KeysetCondition::new("created_at", "id", position(), SortOrder::Asc);
        let same = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        assert!(condition.admits(&same, ID_3));
        assert!(!condition.admits(&same, ID_2));
        assert!(!condition.admits(&same, ID_1));
    }

    #[test]
    fn test_admits_compares_instants_not_text() {
        // Same instant written with an offset
        let position = CursorPosition::new("2026-01-02T02:00:00+02:00", ID_2).unwrap();
        let condition = KeysetCondition::new("created_at", "id", position, SortOrder::Desc);
        let same = Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap();
        assert!(condition.admits(&same, ID_1));
        assert!(!condition.admits(&same, ID_3));
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("asc"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("desc"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("DESC"), None);
        assert_eq!(SortOrder::parse(""), None);
        assert_eq!(SortOrder::default(), SortOrder::Desc);
        assert_eq!(SortOrder::Asc.reverse(), SortOrder::Desc);
        assert_eq!(SortOrder::Desc.to_string(), "desc");
    }

    #[test]
    #[should_panic(expected = "Invalid SQL keyset column name")]
    fn test_rejects_bad_column() {
        let _ = KeysetCondition::new("created_at; --", "id", position(), SortOrder::Desc);
    }
}
