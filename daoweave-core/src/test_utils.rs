use std::sync::Mutex;

use crate::error::DaoResult;
use crate::session::{SessionRow, SqlSession};
use crate::sql::Statement;

/// Session that records every statement instead of running it.
///
/// Writes report `affected` rows; reads return nothing.
#[derive(Debug)]
pub struct RecordingSession {
    statements: Mutex<Vec<Statement>>,
    affected: u64,
}

impl Default for RecordingSession {
    fn default() -> Self {
        Self::new(1)
    }
}

impl RecordingSession {
    pub fn new(affected: u64) -> Self {
        Self {
            statements: Mutex::new(Vec::new()),
            affected,
        }
    }

    /// Statements seen so far, oldest first.
    pub fn statements(&self) -> Vec<Statement> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<Statement> {
        self.lock().last().cloned()
    }

    fn record(&self, statement: Statement) {
        self.lock().push(statement);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Statement>> {
        self.statements
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl SqlSession for RecordingSession {
    type Database = sqlx::Sqlite;

    async fn execute(&self, statement: Statement) -> DaoResult<u64> {
        self.record(statement);
        Ok(self.affected)
    }

    async fn fetch_all<T>(&self, statement: Statement) -> DaoResult<Vec<T>>
    where
        T: for<'r> sqlx::FromRow<'r, SessionRow<Self>> + Send + Unpin,
    {
        self.record(statement);
        Ok(Vec::new())
    }

    async fn fetch_optional<T>(&self, statement: Statement) -> DaoResult<Option<T>>
    where
        T: for<'r> sqlx::FromRow<'r, SessionRow<Self>> + Send + Unpin,
    {
        self.record(statement);
        Ok(None)
    }
}

/// In-memory SQLite pool with a single connection.
pub async fn sqlite_memory_pool() -> Result<sqlx::SqlitePool, sqlx::Error> {
    sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
}
