use std::future::Future;

use sqlx::{Column, Row};

use crate::error::DaoResult;

/// Schema facts about an entity, implemented by `#[derive(Entity)]`.
pub trait Entity: Send + Sync + Sized {
    /// Table named by the `#[table(..)]` marker.
    const TABLE: &'static str;
    /// Mapped columns in field declaration order.
    const COLUMNS: &'static [&'static str];
}

/// Position of `column` in `row`, used by the `FromRow` impl that
/// `#[derive(Entity)]` emits.
///
/// An exact name match wins; otherwise the first ASCII case-insensitive match
/// is taken, so `ID` reads from a column declared as `id` and the reverse.
pub fn column_index<R: Row>(row: &R, column: &str) -> Result<usize, sqlx::Error> {
    let columns = row.columns();
    columns
        .iter()
        .position(|c| c.name() == column)
        .or_else(|| {
            columns
                .iter()
                .position(|c| c.name().eq_ignore_ascii_case(column))
        })
        .ok_or_else(|| sqlx::Error::ColumnNotFound(column.to_owned()))
}

/// Base data-access contract.
///
/// Every contract trait names its entity through this supertrait and inherits
/// the five operations below; the generator implements them alongside the
/// contract's own methods.
pub trait Dao<E>: Send + Sync {
    /// Insert the present fields of `entity`.
    fn insert(&self, entity: &E) -> impl Future<Output = DaoResult<u64>> + Send;

    /// Delete rows matching the present fields of `entity`.
    fn delete(&self, entity: &E) -> impl Future<Output = DaoResult<u64>> + Send;

    /// Write the present fields of `set` to the rows matching `con`.
    fn update(&self, set: &E, con: &E) -> impl Future<Output = DaoResult<u64>> + Send;

    fn select_one(&self, entity: &E) -> impl Future<Output = DaoResult<Option<E>>> + Send;

    fn select(&self, entity: &E) -> impl Future<Output = DaoResult<Vec<E>>> + Send;
}
