//! Rendering of filter expressions into parameterised SQL.

use super::types::{CompoundFilter, Filter, FilterExpr, LogicalOp, Operator, Value};
use crate::dialect::Dialect;

/// Accumulates bound parameters while rendering conditions.
///
/// Placeholders are numbered from the current parameter count, so several
/// expressions rendered through the same writer share one numbering.
pub(super) struct SqlWriter<'d, D: Dialect> {
    dialect: &'d D,
    params: Vec<Value>,
}

impl<'d, D: Dialect> SqlWriter<'d, D> {
    pub(super) const fn new(dialect: &'d D) -> Self {
        Self {
            dialect,
            params: Vec::new(),
        }
    }

    pub(super) fn into_params(self) -> Vec<Value> {
        self.params
    }

    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        self.dialect.param(self.params.len())
    }

    pub(super) fn render(&mut self, expr: &FilterExpr) -> String {
        match expr {
            FilterExpr::Simple(filter) => self.render_condition(filter),
            FilterExpr::Compound(compound) => self.render_compound(compound),
        }
    }

    fn render_compound(&mut self, compound: &CompoundFilter) -> String {
        let parts: Vec<String> = compound.filters.iter().map(|f| self.render(f)).collect();

        match compound.op {
            LogicalOp::Not => {
                let inner = parts.into_iter().next().unwrap_or_else(|| "1=1".to_string());
                format!("NOT ({inner})")
            },
            LogicalOp::And | LogicalOp::Or => {
                let (joiner, identity) = if compound.op == LogicalOp::And {
                    (" AND ", "1=1")
                } else {
                    (" OR ", "1=0")
                };
                match parts.len() {
                    0 => identity.to_string(),
                    1 => parts.into_iter().collect(),
                    _ => format!("({})", parts.join(joiner)),
                }
            },
        }
    }

    fn render_condition(&mut self, filter: &Filter) -> String {
        let field = &filter.field;

        match (filter.op, &filter.value) {
            (Operator::Eq, Value::Null) => format!("{field} IS NULL"),
            (Operator::Ne, Value::Null) => format!("{field} IS NOT NULL"),
            (Operator::In, Value::Array(values)) => {
                let (sql, params) = self.dialect.in_clause(field, values, self.params.len() + 1);
                self.params.extend(params);
                sql
            },
            (Operator::NotIn, Value::Array(values)) => {
                let (sql, params) =
                    self.dialect
                        .not_in_clause(field, values, self.params.len() + 1);
                self.params.extend(params);
                sql
            },
            // IN with a scalar degrades to equality
            (Operator::In, value) => {
                let placeholder = self.bind(value.clone());
                format!("{field} = {placeholder}")
            },
            (Operator::NotIn, value) => {
                let placeholder = self.bind(value.clone());
                format!("{field} != {placeholder}")
            },
            (op, value) => {
                let op_sql = op.as_sql().unwrap_or("=");
                let placeholder = self.bind(value.clone());
                format!("{field} {op_sql} {placeholder}")
            },
        }
    }
}
