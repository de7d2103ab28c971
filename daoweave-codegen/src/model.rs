//! Read-only descriptors produced at the start of a build.

use std::collections::BTreeSet;

use daoweave_core::Operation;
use serde::Serialize;

/// Default function used to convert a string field into a SQL date.
pub const DEFAULT_DATE_FUNCTION: &str = "STR_TO_DATE";
/// Default pattern passed to the date-conversion function.
pub const DEFAULT_DATE_PATTERN: &str = "%Y-%m-%d %H:%i:%s";

/// Methods every contract inherits from `Dao<E>`, with their default markers.
pub fn base_methods() -> Vec<MethodDescriptor> {
    vec![
        MethodDescriptor::new("insert", 1, Capability::Insert { id_seq: false }),
        MethodDescriptor::new("delete", 1, Capability::Delete { filter: FilterConfig::default() }),
        MethodDescriptor::new("update", 2, Capability::Update { filter: FilterConfig::default() }),
        MethodDescriptor::new(
            "select_one",
            1,
            Capability::SelectOne { filter: FilterConfig::default() },
        ),
        MethodDescriptor::new(
            "select",
            1,
            Capability::Select {
                filter: FilterConfig::default(),
                order: OrderConfig::default(),
            },
        ),
    ]
}

/// A type path as written in a supertrait list, e.g. `Dao<Movie>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeRef {
    pub name: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContractDescriptor {
    pub name: String,
    /// Module declaring the trait, e.g. `crate::dao::movie_dao`.
    pub module_path: String,
    /// Module of the directory holding the trait, e.g. `crate::dao`.
    pub package: String,
    pub supertraits: Vec<TypeRef>,
    /// Module receiving the mapper and provider artifacts.
    pub output: Option<String>,
    pub methods: Vec<MethodDescriptor>,
}

impl ContractDescriptor {
    /// `crate::dao::movie_dao::MovieDao`
    pub fn type_path(&self) -> String {
        format!("{}::{}", self.module_path, self.name)
    }

    /// Base method names followed by declared method names.
    pub fn method_names(&self) -> BTreeSet<String> {
        base_methods()
            .into_iter()
            .map(|method| method.name)
            .chain(self.methods.iter().map(|method| method.name.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodDescriptor {
    pub name: String,
    /// Declared parameters, receiver excluded.
    pub params: usize,
    pub markers: Vec<Capability>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>, params: usize, marker: Capability) -> Self {
        Self {
            name: name.into(),
            params,
            markers: vec![marker],
        }
    }
}

/// `other` and `compare` entries of a marker, kept as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct FilterConfig {
    /// `"<COLUMN> -> <predicate>"`
    pub other: Vec<String>,
    /// `"<COLUMN> : <operator>"`
    pub compare: Vec<String>,
}

impl FilterConfig {
    pub fn is_empty(&self) -> bool {
        self.other.is_empty() && self.compare.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct OrderConfig {
    pub order_by: Vec<String>,
    pub order_desc_by: Vec<String>,
}

/// Operation marker attached to a contract method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Capability {
    Insert { id_seq: bool },
    Delete { filter: FilterConfig },
    Update { filter: FilterConfig },
    Select { filter: FilterConfig, order: OrderConfig },
    SelectOne { filter: FilterConfig },
}

impl Capability {
    pub fn operation(&self) -> Operation {
        match self {
            Self::Insert { .. } => Operation::Insert,
            Self::Delete { .. } => Operation::Delete,
            Self::Update { .. } => Operation::Update,
            Self::Select { .. } => Operation::Select,
            Self::SelectOne { .. } => Operation::SelectOne,
        }
    }

    /// Attribute name of the marker.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "auto_insert",
            Self::Delete { .. } => "auto_delete",
            Self::Update { .. } => "auto_update",
            Self::Select { .. } => "auto_select",
            Self::SelectOne { .. } => "auto_select_one",
        }
    }

    /// Parameters the marked method must declare.
    pub fn arity(&self) -> usize {
        match self {
            Self::Update { .. } => 2,
            _ => 1,
        }
    }

    pub fn filter(&self) -> Option<&FilterConfig> {
        match self {
            Self::Insert { .. } => None,
            Self::Delete { filter }
            | Self::Update { filter }
            | Self::Select { filter, .. }
            | Self::SelectOne { filter } => Some(filter),
        }
    }
}

/// A method with exactly one validated marker.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedMethod {
    pub name: String,
    pub capability: Capability,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDescriptor {
    pub name: String,
    pub module_path: String,
    pub table: Option<String>,
    pub no_case_conversion: bool,
    /// Declaration order.
    pub fields: Vec<FieldDescriptor>,
}

impl EntityDescriptor {
    pub fn type_path(&self) -> String {
        format!("{}::{}", self.module_path, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub kind: FieldKind,
    pub date: Option<DateConversion>,
    pub id_seq: Option<String>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            date: None,
            id_seq: None,
        }
    }

    pub fn with_date(mut self, date: DateConversion) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_id_seq(mut self, sequence: impl Into<String>) -> Self {
        self.id_seq = Some(sequence.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    String,
    Integer,
    Long,
    Double,
    Date,
}

impl FieldKind {
    /// Classifies a Rust type name; `None` for unsupported types.
    pub fn from_type_name(name: &str) -> Option<Self> {
        match name {
            "String" => Some(Self::String),
            "i8" | "i16" | "i32" | "u8" | "u16" => Some(Self::Integer),
            "i64" | "u32" => Some(Self::Long),
            "f32" | "f64" => Some(Self::Double),
            "NaiveDateTime" | "NaiveDate" | "DateTime" => Some(Self::Date),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateConversion {
    pub function: String,
    pub pattern: String,
}

impl Default for DateConversion {
    fn default() -> Self {
        Self {
            function: DEFAULT_DATE_FUNCTION.to_owned(),
            pattern: DEFAULT_DATE_PATTERN.to_owned(),
        }
    }
}

/// A type with hand-written trait implementations found in the source tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ExistingImpl {
    pub self_ty: String,
    /// Union of method names over all trait impl blocks of the type.
    pub methods: BTreeSet<String>,
}

/// Everything the locator found in one source tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SourceIndex {
    pub contracts: Vec<ContractDescriptor>,
    pub entities: Vec<EntityDescriptor>,
    pub existing: Vec<ExistingImpl>,
}

impl SourceIndex {
    pub fn entity(&self, name: &str) -> Option<&EntityDescriptor> {
        self.entities.iter().find(|entity| entity.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_methods_follow_dao_order() {
        let names = base_methods()
            .into_iter()
            .map(|method| method.name)
            .collect::<Vec<_>>();
        assert_eq!(names, ["insert", "delete", "update", "select_one", "select"]);
    }

    #[test]
    fn only_update_takes_two_parameters() {
        for method in base_methods() {
            let capability = &method.markers[0];
            assert_eq!(capability.arity(), method.params, "{}", method.name);
        }
    }

    #[test]
    fn method_names_union_base_and_declared() {
        let contract = ContractDescriptor {
            name: "MovieDao".to_owned(),
            module_path: "crate::dao".to_owned(),
            package: "crate".to_owned(),
            supertraits: Vec::new(),
            output: None,
            methods: vec![MethodDescriptor::new(
                "select_by_lasts_limits",
                1,
                Capability::Select {
                    filter: FilterConfig::default(),
                    order: OrderConfig::default(),
                },
            )],
        };
        let names = contract.method_names();
        assert_eq!(names.len(), 6);
        assert!(names.contains("select_by_lasts_limits"));
    }

    #[test]
    fn field_kinds_cover_supported_types() {
        assert_eq!(FieldKind::from_type_name("u32"), Some(FieldKind::Long));
        assert_eq!(FieldKind::from_type_name("NaiveDate"), Some(FieldKind::Date));
        assert_eq!(FieldKind::from_type_name("bool"), None);
    }
}
