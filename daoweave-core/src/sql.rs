//! Statement assembly for generated providers.
//!
//! A provider creates one [`SqlBuilder`] per call, feeds it the clauses its
//! plan selected for the current entity values and finishes with
//! [`SqlBuilder::build`]. Placeholders are positional (`?`); the values are
//! collected in text order next to the rendered SQL.

use std::fmt::{self, Write};

use crate::error::{DaoError, DaoResult};
use crate::value::SqlValue;

const PLACEHOLDER: char = '?';

/// The database operation a contract method performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Insert,
    Delete,
    Update,
    Select,
    SelectOne,
}

impl Operation {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Delete => "DELETE",
            Self::Update => "UPDATE",
            Self::Select => "SELECT",
            Self::SelectOne => "SELECT_ONE",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendered SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    operation: Operation,
    text: String,
    params: Vec<SqlValue>,
}

impl Statement {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        (self.text, self.params)
    }

    /// Parameters formatted for log output.
    pub fn format_params_for_log(&self) -> String {
        self.params
            .iter()
            .map(SqlValue::to_log_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Links a mapper accessor to the provider function that assembles its
/// statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapperBinding {
    pub method: &'static str,
    pub provider: &'static str,
    pub operation: Operation,
}

/// Builder for one INSERT, DELETE, UPDATE or SELECT statement.
#[derive(Debug, Clone)]
pub struct SqlBuilder {
    operation: Operation,
    table: String,
    // INSERT columns/values or UPDATE assignments
    columns: Vec<String>,
    values: Vec<String>,
    value_params: Vec<SqlValue>,
    conditions: Vec<String>,
    condition_params: Vec<SqlValue>,
    order_by: Vec<String>,
}

impl SqlBuilder {
    pub fn new(operation: Operation, table: impl Into<String>) -> Self {
        Self {
            operation,
            table: table.into(),
            columns: Vec::new(),
            values: Vec::new(),
            value_params: Vec::new(),
            conditions: Vec::new(),
            condition_params: Vec::new(),
            order_by: Vec::new(),
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Column written with a raw SQL expression, e.g. `MOVIE_SEQ.NEXTVAL`.
    pub fn value_raw(&mut self, column: &str, expr: &str) -> &mut Self {
        self.columns.push(column.to_owned());
        self.values.push(expr.to_owned());
        self
    }

    /// Column written through `template`, whose single `?` receives `value`.
    ///
    /// Used for both INSERT values and UPDATE assignments.
    pub fn value_param(
        &mut self,
        column: &str,
        template: &str,
        value: impl Into<SqlValue>,
    ) -> &mut Self {
        debug_assert!(template.contains(PLACEHOLDER));
        self.columns.push(column.to_owned());
        self.values.push(template.to_owned());
        self.value_params.push(value.into());
        self
    }

    /// Raw predicate, wrapped in parentheses.
    pub fn where_raw(&mut self, predicate: &str) -> &mut Self {
        self.conditions.push(format!("({})", predicate.trim()));
        self
    }

    /// `column <operator> template`, the template's `?` receiving `value`.
    pub fn where_param(
        &mut self,
        column: &str,
        operator: &str,
        template: &str,
        value: impl Into<SqlValue>,
    ) -> &mut Self {
        debug_assert!(template.contains(PLACEHOLDER));
        self.conditions
            .push(format!("{} {} {}", column, operator.trim(), template));
        self.condition_params.push(value.into());
        self
    }

    /// `column <operator> '%value%'` with the value inlined.
    pub fn where_like(
        &mut self,
        column: &str,
        operator: &str,
        value: impl Into<SqlValue>,
    ) -> &mut Self {
        let value = value.into();
        self.conditions.push(format!(
            "{} {} '%{}%'",
            column,
            operator.trim(),
            value.like_fragment()
        ));
        self
    }

    pub fn order_by(&mut self, column: &str, descending: bool) -> &mut Self {
        if descending {
            self.order_by.push(format!("{} DESC", column));
        } else {
            self.order_by.push(column.to_owned());
        }
        self
    }

    /// Render the statement.
    ///
    /// An INSERT without columns or an UPDATE without assignments cannot be
    /// executed and yields [`DaoError::EmptyStatement`].
    pub fn build(self) -> DaoResult<Statement> {
        let mut text = String::with_capacity(64);
        let mut params = Vec::with_capacity(self.value_params.len() + self.condition_params.len());

        match self.operation {
            Operation::Insert => {
                if self.columns.is_empty() {
                    return Err(self.empty());
                }
                let _ = write!(
                    text,
                    "INSERT INTO {} ({}) VALUES ({})",
                    self.table,
                    self.columns.join(", "),
                    self.values.join(", ")
                );
                params.extend(self.value_params);
                return Ok(Statement {
                    operation: self.operation,
                    text,
                    params,
                });
            }
            Operation::Update => {
                if self.columns.is_empty() {
                    return Err(self.empty());
                }
                let assignments = self
                    .columns
                    .iter()
                    .zip(&self.values)
                    .map(|(column, value)| format!("{} = {}", column, value))
                    .collect::<Vec<_>>();
                let _ = write!(text, "UPDATE {} SET {}", self.table, assignments.join(", "));
                params.extend(self.value_params);
            }
            Operation::Delete => {
                let _ = write!(text, "DELETE FROM {}", self.table);
            }
            Operation::Select | Operation::SelectOne => {
                let _ = write!(text, "SELECT * FROM {}", self.table);
            }
        }

        if !self.conditions.is_empty() {
            text.push_str(" WHERE ");
            text.push_str(&self.conditions.join(" AND "));
            params.extend(self.condition_params);
        }

        if !self.order_by.is_empty() {
            text.push_str(" ORDER BY ");
            text.push_str(&self.order_by.join(", "));
        }

        Ok(Statement {
            operation: self.operation,
            text,
            params,
        })
    }

    fn empty(&self) -> DaoError {
        DaoError::EmptyStatement {
            operation: self.operation,
            table: self.table.clone(),
        }
    }
}
