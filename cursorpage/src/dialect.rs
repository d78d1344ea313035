//! SQL dialects for Postgres and `SQLite`.
//!
//! The seek predicate itself is plain comparison SQL shared by both; the
//! dialects only differ in placeholders and list parameters.

use crate::Value;

/// SQL dialect trait for database-specific syntax.
pub trait Dialect: Clone + Copy {
    /// Short name used in log events.
    fn name(&self) -> &'static str;

    /// Format a parameter placeholder (e.g., `$1` for Postgres, `?1` for `SQLite`).
    fn param(&self, idx: usize) -> String;

    /// Format an IN clause, returning the SQL fragment and the parameters it binds.
    fn in_clause(&self, field: &str, values: &[Value], start_idx: usize) -> (String, Vec<Value>);

    /// Format a NOT IN clause.
    fn not_in_clause(
        &self,
        field: &str,
        values: &[Value],
        start_idx: usize,
    ) -> (String, Vec<Value>);
}

/// Postgres dialect.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct Postgres;

impl Dialect for Postgres {
    #[inline]
    fn name(&self) -> &'static str {
        "postgres"
    }

    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("${idx}")
    }

    fn in_clause(&self, field: &str, values: &[Value], start_idx: usize) -> (String, Vec<Value>) {
        // One array parameter regardless of list length
        (
            format!("{field} = ANY(${start_idx})"),
            vec![Value::Array(values.to_vec())],
        )
    }

    fn not_in_clause(
        &self,
        field: &str,
        values: &[Value],
        start_idx: usize,
    ) -> (String, Vec<Value>) {
        (
            format!("{field} != ALL(${start_idx})"),
            vec![Value::Array(values.to_vec())],
        )
    }
}

/// `SQLite` dialect.
#[derive(Debug, Clone, Copy, Default)]
#[non_exhaustive]
pub struct Sqlite;

impl Sqlite {
    fn placeholders(len: usize, start_idx: usize) -> String {
        (start_idx..start_idx + len)
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Dialect for Sqlite {
    #[inline]
    fn name(&self) -> &'static str {
        "sqlite"
    }

    #[inline]
    fn param(&self, idx: usize) -> String {
        format!("?{idx}")
    }

    fn in_clause(&self, field: &str, values: &[Value], start_idx: usize) -> (String, Vec<Value>) {
        // No array binding: one placeholder per element
        (
            format!("{field} IN ({})", Self::placeholders(values.len(), start_idx)),
            values.to_vec(),
        )
    }

    fn not_in_clause(
        &self,
        field: &str,
        values: &[Value],
        start_idx: usize,
    ) -> (String, Vec<Value>) {
        (
            format!(
                "{field} NOT IN ({})",
                Self::placeholders(values.len(), start_idx)
            ),
            values.to_vec(),
        )
    }
}
