//! # daoweave
//!
//! Declare a data-access contract as a trait, mark each method with the
//! operation it performs, and let `daoweave generate` write the
//! implementation: a provider that assembles the SQL, a mapper that runs it
//! through a [`SqlSession`], and a forwarding `<Entity>ProxyImpl` that
//! implements both [`Dao`] and your contract.
//!
//! `#[derive(Entity)]` also implements `sqlx::FromRow`, reading each field
//! from its derived column (`start_time` from `START_TIME`), so entities must
//! not derive `FromRow` themselves.
//!
//! ```rust,ignore
//! use daoweave::prelude::*;
//!
//! #[derive(Debug, Default, Entity)]
//! #[table("MOVIE")]
//! pub struct Movie {
//!     #[id(seq = "MOVIE_SEQ")]
//!     pub id: Option<i32>,
//!     pub name: Option<String>,
//!     pub lasts: Option<i64>,
//! }
//!
//! #[dao_proxy(output = "crate::mapper")]
//! pub trait MovieDao: Dao<Movie> {
//!     #[auto_select(other = ["LASTS -> LASTS = 90 OR LASTS = 80"])]
//!     fn select_by_lasts_limits(&self, movie: &Movie)
//!         -> impl Future<Output = DaoResult<Vec<Movie>>> + Send;
//!
//!     #[auto_update(compare = "NAME:LIKE")]
//!     fn update_by_name(&self, set: &Movie, con: &Movie)
//!         -> impl Future<Output = DaoResult<u64>> + Send;
//! }
//!
//! // After `daoweave generate --src src`:
//! # async fn example(pool: daoweave::sqlx::SqlitePool) -> DaoResult<()> {
//! let dao = crate::dao::proxy::movie_proxy_impl::MovieProxyImpl::new(pool);
//! let long = dao.select_by_lasts_limits(&Movie::default()).await?;
//! # Ok(())
//! # }
//! ```

pub use daoweave_core::*;
pub use daoweave_macros::{Entity, dao_proxy};

pub mod prelude {
    pub use daoweave_core::prelude::*;

    pub use crate::{Entity, dao_proxy};
}
