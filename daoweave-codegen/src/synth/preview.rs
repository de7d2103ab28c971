use std::collections::BTreeMap;

use daoweave_core::{DaoResult, SqlBuilder, SqlValue, Statement};

use super::plan::{Condition, StatementPlan, ValueExpr};

/// Field values keyed by field name. Missing fields read as null.
pub type FieldValues = BTreeMap<String, SqlValue>;

/// The statement the generated provider function would return for `values`.
///
/// UPDATE plans read both their SET and WHERE clauses from `values`; use
/// [`preview_update`] to supply them separately.
pub fn preview(plan: &StatementPlan, values: &FieldValues) -> DaoResult<Statement> {
    evaluate(plan, values, values)
}

pub fn preview_update(
    plan: &StatementPlan,
    set: &FieldValues,
    con: &FieldValues,
) -> DaoResult<Statement> {
    evaluate(plan, set, con)
}

fn read(values: &FieldValues, field: &str) -> SqlValue {
    values.get(field).cloned().unwrap_or(SqlValue::Null)
}

fn present(values: &FieldValues, field: &str) -> Option<SqlValue> {
    let value = read(values, field);
    value.is_present().then_some(value)
}

fn evaluate(plan: &StatementPlan, set: &FieldValues, con: &FieldValues) -> DaoResult<Statement> {
    let mut sql = SqlBuilder::new(plan.operation, plan.table.as_str());

    for assignment in &plan.assignments {
        let template = assignment.value.template();
        match &assignment.value {
            ValueExpr::Sequence(_) => {
                sql.value_raw(&assignment.column, &template);
            }
            ValueExpr::Param | ValueExpr::Converted { .. } => {
                if let Some(value) = present(set, &assignment.field) {
                    sql.value_param(&assignment.column, &template, value);
                }
            }
        }
    }

    for condition in &plan.conditions {
        match condition {
            Condition::Raw { predicate, .. } => {
                sql.where_raw(predicate);
            }
            Condition::Like {
                column,
                field,
                operator,
            } => {
                sql.where_like(column, operator, read(con, field));
            }
            Condition::Compare {
                column,
                field,
                operator,
            } => {
                sql.where_param(column, operator, "?", read(con, field));
            }
            Condition::Equals {
                column,
                field,
                value,
            } => {
                if let Some(bound) = present(con, field) {
                    sql.where_param(column, "=", &value.template(), bound);
                }
            }
        }
    }

    for term in &plan.order_by {
        sql.order_by(&term.column, term.descending);
    }

    sql.build()
}
