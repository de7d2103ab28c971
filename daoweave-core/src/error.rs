use crate::sql::Operation;

/// Runtime error raised by generated data-access code.
#[derive(Debug)]
pub enum DaoError {
    /// Underlying sqlx error.
    Sqlx(sqlx::Error),
    /// The statement had nothing to write: an INSERT without columns or an
    /// UPDATE without a SET clause.
    EmptyStatement {
        /// Statement kind.
        operation: Operation,
        /// Target table.
        table: String,
    },
    /// Generic message error.
    Message(String),
}

impl std::fmt::Display for DaoError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlx(err) => write!(f, "sqlx error: {}", err),
            Self::EmptyStatement { operation, table } => write!(
                f,
                "{} on {} has no column to write (every value was null or empty)",
                operation, table
            ),
            Self::Message(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for DaoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sqlx(err) => Some(err),
            _ => None,
        }
    }
}

impl From<sqlx::Error> for DaoError {
    fn from(err: sqlx::Error) -> Self {
        Self::Sqlx(err)
    }
}

/// Result alias for generated data-access calls.
pub type DaoResult<T> = Result<T, DaoError>;
