//! SELECT query builder.

use crate::dialect::Dialect;
use crate::plan::PagePlan;
use crate::validate::assert_valid_sql_identifier;

use super::filter::SqlWriter;
use super::types::{Filter, FilterExpr, Operator, QueryResult, SortDir, SortField, Value};

/// SQL query builder with dialect support.
#[derive(Debug)]
pub struct QueryBuilder<D: Dialect> {
    dialect: D,
    table: String,
    fields: Vec<String>,
    filters: Vec<FilterExpr>,
    sorts: Vec<SortField>,
    limit: Option<u32>,
}

impl<D: Dialect> QueryBuilder<D> {
    /// Create a new query builder for the given table.
    ///
    /// # Panics
    ///
    /// Panics if the table name is not a valid SQL identifier.
    pub fn new(dialect: D, table: impl Into<String>) -> Self {
        let table = table.into();
        assert_valid_sql_identifier(&table, "table");
        Self {
            dialect,
            table,
            fields: Vec::new(),
            filters: Vec::new(),
            sorts: Vec::new(),
            limit: None,
        }
    }

    /// Set the fields to SELECT.
    ///
    /// # Panics
    ///
    /// Panics if any field name is not a valid SQL identifier.
    pub fn fields(mut self, fields: &[&str]) -> Self {
        for field in fields {
            assert_valid_sql_identifier(field, "field");
        }
        self.fields = fields.iter().map(|s| (*s).to_string()).collect();
        self
    }

    /// Add a filter condition.
    ///
    /// # Panics
    ///
    /// Panics if the field name is not a valid SQL identifier.
    pub fn filter(mut self, field: impl Into<String>, op: Operator, value: impl Into<Value>) -> Self {
        let field = field.into();
        assert_valid_sql_identifier(&field, "filter field");
        self.filters.push(FilterExpr::Simple(Filter {
            field,
            op,
            value: value.into(),
        }));
        self
    }

    /// Add a filter expression. All filters are combined with AND.
    pub fn filter_expr(mut self, expr: FilterExpr) -> Self {
        self.filters.push(expr);
        self
    }

    /// Add a sort field.
    ///
    /// # Panics
    ///
    /// Panics if the field name is not a valid SQL identifier.
    pub fn sort(mut self, field: impl Into<String>, dir: SortDir) -> Self {
        self.sorts.push(SortField::new(field, dir));
        self
    }

    /// Add multiple sort fields.
    pub fn sorts(mut self, sorts: &[SortField]) -> Self {
        self.sorts.extend(sorts.iter().cloned());
        self
    }

    /// Set LIMIT.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Apply a page plan.
    ///
    /// Adds the seek condition, replaces the sort with the composite key in
    /// the plan's direction and fetches one row past the page size.
    pub fn paginate(mut self, plan: &PagePlan) -> Self {
        if let Some(seek) = plan.seek_filter() {
            self.filters.push(seek);
        }
        self.sorts = plan.sort_fields();
        self.limit = Some(plan.fetch_limit());
        self
    }

    /// Build the SQL query.
    pub fn build(self) -> QueryResult {
        let columns = if self.fields.is_empty() {
            "*".to_string()
        } else {
            self.fields.join(", ")
        };
        let mut sql = format!("SELECT {columns} FROM {}", self.table);

        let mut writer = SqlWriter::new(&self.dialect);
        let conditions: Vec<String> = self.filters.iter().map(|f| writer.render(f)).collect();
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }

        if !self.sorts.is_empty() {
            let order: Vec<String> = self
                .sorts
                .iter()
                .map(|s| format!("{} {}", s.field, s.dir.as_sql()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let params = writer.into_params();
        tracing::trace!(
            dialect = self.dialect.name(),
            table = %self.table,
            params = params.len(),
            "built select"
        );
        QueryResult { sql, params }
    }
}
