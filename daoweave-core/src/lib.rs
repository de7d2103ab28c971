//! Runtime support for code generated by daoweave.
//!
//! Generated providers assemble [`Statement`]s with [`SqlBuilder`], generated
//! mappers run them through a [`SqlSession`], and generated implementations
//! expose both the base [`Dao`] operations and the contract's own methods.

pub use sqlx;
pub use tracing;

pub mod dao;
pub mod error;
pub mod session;
pub mod sql;
#[cfg(feature = "sqlite")]
pub mod test_utils;
pub mod value;

pub use dao::{Dao, Entity, column_index};
pub use error::{DaoError, DaoResult};
pub use session::{SessionRow, SqlSession};
pub use sql::{MapperBinding, Operation, SqlBuilder, Statement};
pub use value::{FieldValue, SqlValue};

pub mod prelude {
    pub use crate::{Dao, DaoError, DaoResult, Entity, FieldValue, SqlSession};
}
