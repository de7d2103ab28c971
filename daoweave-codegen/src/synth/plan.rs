use std::collections::HashMap;

use daoweave_core::Operation;

use crate::error::GenError;
use crate::model::{
    Capability, ClassifiedMethod, DateConversion, EntityDescriptor, FieldDescriptor, FieldKind,
    FilterConfig, OrderConfig,
};
use crate::naming::column_name;

const OTHER_SEPARATOR: &str = "->";
const COMPARE_SEPARATOR: char = ':';
const LIKE: &str = "LIKE";

/// Statement shape of one contract method, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementPlan {
    pub method: String,
    pub operation: Operation,
    pub table: String,
    /// INSERT values or UPDATE assignments.
    pub assignments: Vec<Assignment>,
    pub conditions: Vec<Condition>,
    pub order_by: Vec<OrderTerm>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: String,
    pub field: String,
    pub value: ValueExpr,
}

/// How a field value reaches the statement.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueExpr {
    /// Bound as-is; present-guarded.
    Param,
    /// Bound inside `function(?, 'pattern')`; present-guarded.
    Converted { function: String, pattern: String },
    /// `<sequence>.NEXTVAL`, unconditional.
    Sequence(String),
}

impl ValueExpr {
    /// SQL text standing in for the value.
    pub fn template(&self) -> String {
        match self {
            Self::Param => "?".to_owned(),
            Self::Converted { function, pattern } => format!("{}(?, '{}')", function, pattern),
            Self::Sequence(sequence) => format!("{}.NEXTVAL", sequence),
        }
    }

    fn for_field(field: &FieldDescriptor) -> Self {
        match (&field.kind, &field.date) {
            (FieldKind::String, Some(DateConversion { function, pattern })) => Self::Converted {
                function: function.clone(),
                pattern: pattern.clone(),
            },
            _ => Self::Param,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `other` override, emitted verbatim in parentheses.
    Raw { column: String, predicate: String },
    /// `COLUMN LIKE '%value%'`, unguarded.
    Like {
        column: String,
        field: String,
        operator: String,
    },
    /// `COLUMN <op> ?`, unguarded.
    Compare {
        column: String,
        field: String,
        operator: String,
    },
    /// Present-guarded equality.
    Equals {
        column: String,
        field: String,
        value: ValueExpr,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderTerm {
    pub column: String,
    pub descending: bool,
}

/// Field with its derived column.
struct Column<'a> {
    name: String,
    field: &'a FieldDescriptor,
}

struct Schema<'a> {
    entity: &'a EntityDescriptor,
    table: &'a str,
    columns: Vec<Column<'a>>,
}

impl<'a> Schema<'a> {
    fn new(entity: &'a EntityDescriptor) -> Result<Self, GenError> {
        let table = entity
            .table
            .as_deref()
            .filter(|table| !table.trim().is_empty())
            .ok_or_else(|| GenError::MissingTableMarker {
                entity: entity.name.clone(),
            })?;
        let columns = entity
            .fields
            .iter()
            .map(|field| Column {
                name: column_name(&field.name, entity.no_case_conversion),
                field,
            })
            .collect();
        Ok(Self {
            entity,
            table,
            columns,
        })
    }

    /// Column matching a configuration key, compared case-insensitively.
    fn resolve(&self, method: &str, key: &str) -> Result<&Column<'a>, GenError> {
        self.columns
            .iter()
            .find(|column| column.name.eq_ignore_ascii_case(key))
            .ok_or_else(|| GenError::SchemaMismatch {
                entity: self.entity.name.clone(),
                method: method.to_owned(),
                column: key.to_owned(),
            })
    }
}

/// Overrides keyed by upper-cased column.
struct Filters {
    other: HashMap<String, String>,
    compare: HashMap<String, String>,
}

impl Filters {
    fn parse(schema: &Schema<'_>, method: &str, config: &FilterConfig) -> Result<Self, GenError> {
        let mut other = HashMap::with_capacity(config.other.len());
        for entry in &config.other {
            let (column, predicate) = entry.split_once(OTHER_SEPARATOR).ok_or_else(|| {
                invalid(method, "other", entry, "expected `COLUMN -> predicate`")
            })?;
            if predicate.trim().is_empty() {
                return Err(invalid(method, "other", entry, "predicate is empty"));
            }
            let column = config_column(schema, method, "other", entry, column)?;
            other.insert(column, predicate.trim().to_owned());
        }

        let mut compare = HashMap::with_capacity(config.compare.len());
        for entry in &config.compare {
            let (column, operator) = entry.split_once(COMPARE_SEPARATOR).ok_or_else(|| {
                invalid(method, "compare", entry, "expected `COLUMN : operator`")
            })?;
            if operator.trim().is_empty() {
                return Err(invalid(method, "compare", entry, "operator is empty"));
            }
            let column = config_column(schema, method, "compare", entry, column)?;
            compare.insert(column, operator.trim().to_owned());
        }

        Ok(Self { other, compare })
    }
}

fn config_column(
    schema: &Schema<'_>,
    method: &str,
    key: &'static str,
    entry: &str,
    column: &str,
) -> Result<String, GenError> {
    let column = column.trim().to_ascii_uppercase();
    if column.is_empty() {
        return Err(invalid(method, key, entry, "column is empty"));
    }
    schema.resolve(method, &column)?;
    Ok(column)
}

fn invalid(method: &str, key: &'static str, entry: &str, reason: &'static str) -> GenError {
    GenError::InvalidConfig {
        method: method.to_owned(),
        key,
        entry: entry.to_owned(),
        reason,
    }
}

/// Plans every classified method of a contract against its entity.
pub fn plan_methods(
    entity: &EntityDescriptor,
    methods: &[ClassifiedMethod],
) -> Result<Vec<StatementPlan>, GenError> {
    let schema = Schema::new(entity)?;
    methods
        .iter()
        .map(|method| plan_method(&schema, method))
        .collect()
}

/// Plans a single method.
pub fn plan_statement(
    entity: &EntityDescriptor,
    method: &ClassifiedMethod,
) -> Result<StatementPlan, GenError> {
    plan_method(&Schema::new(entity)?, method)
}

fn plan_method(schema: &Schema<'_>, method: &ClassifiedMethod) -> Result<StatementPlan, GenError> {
    let mut plan = StatementPlan {
        method: method.name.clone(),
        operation: method.capability.operation(),
        table: schema.table.to_owned(),
        assignments: Vec::new(),
        conditions: Vec::new(),
        order_by: Vec::new(),
    };

    match &method.capability {
        Capability::Insert { id_seq } => {
            plan.assignments = insert_values(schema, *id_seq);
        }
        Capability::Update { filter } => {
            plan.assignments = insert_values(schema, false);
            plan.conditions = where_conditions(schema, &method.name, filter)?;
        }
        Capability::Delete { filter } | Capability::SelectOne { filter } => {
            plan.conditions = where_conditions(schema, &method.name, filter)?;
        }
        Capability::Select { filter, order } => {
            plan.conditions = where_conditions(schema, &method.name, filter)?;
            plan.order_by = order_terms(schema, &method.name, order)?;
        }
    }
    Ok(plan)
}

fn insert_values(schema: &Schema<'_>, id_seq: bool) -> Vec<Assignment> {
    schema
        .columns
        .iter()
        .map(|column| {
            let value = match &column.field.id_seq {
                Some(sequence) if id_seq => ValueExpr::Sequence(sequence.clone()),
                _ => ValueExpr::for_field(column.field),
            };
            Assignment {
                column: column.name.clone(),
                field: column.field.name.clone(),
                value,
            }
        })
        .collect()
}

fn where_conditions(
    schema: &Schema<'_>,
    method: &str,
    config: &FilterConfig,
) -> Result<Vec<Condition>, GenError> {
    let filters = Filters::parse(schema, method, config)?;
    let conditions = schema
        .columns
        .iter()
        .map(|column| {
            let key = column.name.to_ascii_uppercase();
            if let Some(predicate) = filters.other.get(&key) {
                return Condition::Raw {
                    column: column.name.clone(),
                    predicate: predicate.clone(),
                };
            }
            if let Some(operator) = filters.compare.get(&key) {
                return if operator.eq_ignore_ascii_case(LIKE) {
                    Condition::Like {
                        column: column.name.clone(),
                        field: column.field.name.clone(),
                        operator: operator.clone(),
                    }
                } else {
                    Condition::Compare {
                        column: column.name.clone(),
                        field: column.field.name.clone(),
                        operator: operator.clone(),
                    }
                };
            }
            Condition::Equals {
                column: column.name.clone(),
                field: column.field.name.clone(),
                value: ValueExpr::for_field(column.field),
            }
        })
        .collect();
    Ok(conditions)
}

fn order_terms(
    schema: &Schema<'_>,
    method: &str,
    order: &OrderConfig,
) -> Result<Vec<OrderTerm>, GenError> {
    let (columns, descending) = if order.order_by.is_empty() {
        (&order.order_desc_by, true)
    } else {
        (&order.order_by, false)
    };
    columns
        .iter()
        .map(|key| {
            let column = schema.resolve(method, key.trim())?;
            Ok(OrderTerm {
                column: column.name.clone(),
                descending,
            })
        })
        .collect()
}
