use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// A value bound to a statement placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Int(i32),
    Long(i64),
    Double(f64),
    Date(NaiveDateTime),
}

impl SqlValue {
    /// A value is present when it is not null and, for text, not empty.
    pub fn is_present(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Text(text) => !text.is_empty(),
            _ => true,
        }
    }

    /// Text spliced between the `%` wildcards of a pattern-match predicate.
    ///
    /// Null renders as nothing; single quotes are doubled so the value cannot
    /// close the surrounding literal.
    pub fn like_fragment(&self) -> String {
        self.to_log_string_inner(false).replace('\'', "''")
    }

    pub(crate) fn to_log_string(&self) -> String {
        self.to_log_string_inner(true)
    }

    fn to_log_string_inner(&self, null_keyword: bool) -> String {
        match self {
            Self::Null if null_keyword => "NULL".to_owned(),
            Self::Null => String::new(),
            Self::Text(v) => v.clone(),
            Self::Int(v) => v.to_string(),
            Self::Long(v) => v.to_string(),
            Self::Double(v) => v.to_string(),
            Self::Date(v) => v.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

macro_rules! sql_value_from {
    ($variant:ident: $($ty:ty),+ $(,)?) => {
        $(
            impl From<$ty> for SqlValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(value.into())
                }
            }
        )+
    };
}

sql_value_from!(Int: i8, i16, i32, u8, u16);
sql_value_from!(Long: i64, u32);
sql_value_from!(Double: f32, f64);
sql_value_from!(Text: String, &str);

impl From<NaiveDateTime> for SqlValue {
    fn from(value: NaiveDateTime) -> Self {
        Self::Date(value)
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value.and_time(chrono::NaiveTime::MIN))
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Date(value.naive_utc())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// Read access to an entity field as a bindable value.
///
/// Generated providers call [`FieldValue::present`] for null-guarded clauses
/// and [`FieldValue::to_sql`] where no guard applies.
pub trait FieldValue {
    fn to_sql(&self) -> SqlValue;

    /// `Some` when the value is non-null (and non-empty for strings).
    fn present(&self) -> Option<SqlValue> {
        let value = self.to_sql();
        value.is_present().then_some(value)
    }
}

macro_rules! field_value_copy {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn to_sql(&self) -> SqlValue {
                    SqlValue::from(*self)
                }
            }
        )+
    };
}

field_value_copy!(i8, i16, i32, u8, u16, i64, u32, f32, f64, NaiveDateTime, NaiveDate, DateTime<Utc>);

impl FieldValue for String {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Text(self.clone())
    }
}

impl FieldValue for &str {
    fn to_sql(&self) -> SqlValue {
        SqlValue::Text((*self).to_owned())
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn to_sql(&self) -> SqlValue {
        match self {
            Some(value) => value.to_sql(),
            None => SqlValue::Null,
        }
    }
}
