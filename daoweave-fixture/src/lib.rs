//! A movie schema wired to the code `daoweave-codegen` generates for it.
//!
//! `build.rs` runs the generator over this crate's `src/` and writes the
//! Provider, Mapper and Impl files into `OUT_DIR`; the modules below include
//! them where the generator's module paths expect them.

pub mod dao;
pub mod entity;
pub mod mapper;
pub mod proxy;

pub use dao::MovieDao;
pub use entity::Movie;
pub use proxy::movie_proxy_impl::MovieProxyImpl;
