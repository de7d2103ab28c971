use std::future::Future;

use sqlx::Database;

use crate::error::DaoResult;
use crate::sql::Statement;
#[cfg(any(feature = "sqlite", feature = "mysql"))]
use crate::value::SqlValue;

/// Row type of the database behind a session.
pub type SessionRow<S> = <<S as SqlSession>::Database as Database>::Row;

/// Executes statements produced by generated providers.
///
/// Generated mappers own one session and never touch sqlx directly, so tests
/// can substitute a recording implementation.
pub trait SqlSession: Send + Sync {
    type Database: Database;

    /// Runs a write statement and returns the number of affected rows.
    fn execute(&self, statement: Statement) -> impl Future<Output = DaoResult<u64>> + Send;

    fn fetch_all<T>(&self, statement: Statement) -> impl Future<Output = DaoResult<Vec<T>>> + Send
    where
        T: for<'r> sqlx::FromRow<'r, SessionRow<Self>> + Send + Unpin;

    fn fetch_optional<T>(
        &self,
        statement: Statement,
    ) -> impl Future<Output = DaoResult<Option<T>>> + Send
    where
        T: for<'r> sqlx::FromRow<'r, SessionRow<Self>> + Send + Unpin;
}

#[cfg(any(feature = "sqlite", feature = "mysql"))]
#[inline(always)]
fn bind_query<'q, DB>(
    query: sqlx::query::Query<'q, DB, <DB as Database>::Arguments<'q>>,
    value: SqlValue,
) -> sqlx::query::Query<'q, DB, <DB as Database>::Arguments<'q>>
where
    DB: Database,
    String: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    i32: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    i64: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    f64: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    chrono::NaiveDateTime: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    Option<String>: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
{
    match value {
        SqlValue::Text(v) => query.bind(v),
        SqlValue::Int(v) => query.bind(v),
        SqlValue::Long(v) => query.bind(v),
        SqlValue::Double(v) => query.bind(v),
        SqlValue::Date(v) => query.bind(v),
        SqlValue::Null => query.bind(Option::<String>::None),
    }
}

#[cfg(any(feature = "sqlite", feature = "mysql"))]
#[inline(always)]
fn bind_query_as<'q, DB, T>(
    query: sqlx::query::QueryAs<'q, DB, T, <DB as Database>::Arguments<'q>>,
    value: SqlValue,
) -> sqlx::query::QueryAs<'q, DB, T, <DB as Database>::Arguments<'q>>
where
    DB: Database,
    String: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    i32: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    i64: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    f64: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    chrono::NaiveDateTime: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    Option<String>: sqlx::Encode<'q, DB> + sqlx::Type<DB>,
{
    match value {
        SqlValue::Text(v) => query.bind(v),
        SqlValue::Int(v) => query.bind(v),
        SqlValue::Long(v) => query.bind(v),
        SqlValue::Double(v) => query.bind(v),
        SqlValue::Date(v) => query.bind(v),
        SqlValue::Null => query.bind(Option::<String>::None),
    }
}

macro_rules! impl_pool_session {
    ($db:ty, $label:literal) => {
        impl SqlSession for sqlx::Pool<$db> {
            type Database = $db;

            async fn execute(&self, statement: Statement) -> DaoResult<u64> {
                #[cfg(debug_assertions)]
                tracing::debug!(
                    backend = $label,
                    operation = %statement.operation(),
                    sql = %statement.text(),
                    params = %statement.format_params_for_log(),
                    "daoweave execute"
                );
                let (sql, params) = statement.into_parts();
                let result = params
                    .into_iter()
                    .fold(sqlx::query::<$db>(&sql), bind_query)
                    .execute(self)
                    .await?;
                Ok(result.rows_affected())
            }

            async fn fetch_all<T>(&self, statement: Statement) -> DaoResult<Vec<T>>
            where
                T: for<'r> sqlx::FromRow<'r, SessionRow<Self>> + Send + Unpin,
            {
                #[cfg(debug_assertions)]
                tracing::debug!(
                    backend = $label,
                    operation = %statement.operation(),
                    sql = %statement.text(),
                    params = %statement.format_params_for_log(),
                    "daoweave fetch_all"
                );
                let (sql, params) = statement.into_parts();
                let rows = params
                    .into_iter()
                    .fold(sqlx::query_as::<$db, T>(&sql), bind_query_as)
                    .fetch_all(self)
                    .await?;
                Ok(rows)
            }

            async fn fetch_optional<T>(&self, statement: Statement) -> DaoResult<Option<T>>
            where
                T: for<'r> sqlx::FromRow<'r, SessionRow<Self>> + Send + Unpin,
            {
                #[cfg(debug_assertions)]
                tracing::debug!(
                    backend = $label,
                    operation = %statement.operation(),
                    sql = %statement.text(),
                    params = %statement.format_params_for_log(),
                    "daoweave fetch_optional"
                );
                let (sql, params) = statement.into_parts();
                let row = params
                    .into_iter()
                    .fold(sqlx::query_as::<$db, T>(&sql), bind_query_as)
                    .fetch_optional(self)
                    .await?;
                Ok(row)
            }
        }
    };
}

#[cfg(feature = "sqlite")]
impl_pool_session!(sqlx::Sqlite, "sqlite");

#[cfg(feature = "mysql")]
impl_pool_session!(sqlx::MySql, "mysql");
