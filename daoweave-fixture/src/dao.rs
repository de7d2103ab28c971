use daoweave::prelude::*;

use crate::entity::Movie;

#[dao_proxy(output = "crate::mapper")]
pub trait MovieDao: Dao<Movie> {
    #[auto_select(other = ["LASTS -> LASTS = 90 OR LASTS = 80"])]
    fn select_by_lasts_limits(&self, movie: &Movie)
    -> impl Future<Output = DaoResult<Vec<Movie>>> + Send;

    #[auto_update(compare = "NAME:LIKE")]
    fn update_by_name(&self, set: &Movie, con: &Movie)
    -> impl Future<Output = DaoResult<u64>> + Send;

    #[auto_insert(id_seq)]
    fn insert_with_seq(&self, movie: &Movie) -> impl Future<Output = DaoResult<u64>> + Send;

    #[auto_select(compare = "LASTS : >", order_desc_by = ["LASTS", "ID"])]
    fn select_longer_than(&self, movie: &Movie)
    -> impl Future<Output = DaoResult<Vec<Movie>>> + Send;

    #[auto_select_one(compare = "TYPE:LIKE")]
    fn select_one_by_type(&self, movie: &Movie)
    -> impl Future<Output = DaoResult<Option<Movie>>> + Send;

    fn describe(&self) -> &'static str {
        "movies"
    }
}
