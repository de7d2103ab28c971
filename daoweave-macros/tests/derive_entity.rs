use daoweave::prelude::*;

#[derive(Debug, Default, Entity)]
#[table("MOVIE")]
struct Movie {
    #[id(seq = "MOVIE_SEQ")]
    id: Option<i32>,
    #[sql_date(pattern = "%Y-%m-%d")]
    start_time: Option<String>,
    #[dao(ignore)]
    #[allow(dead_code)]
    cache: Option<String>,
    #[allow(dead_code)]
    tags: Vec<String>,
}

#[derive(Debug, Default, Entity)]
#[table(name = "ACTOR")]
#[non_camel_case]
#[allow(non_snake_case)]
struct Actor {
    actorId: Option<i64>,
    fullName: Option<String>,
}

#[dao_proxy(output = "crate::mapper")]
#[allow(dead_code)]
trait MovieDao: Dao<Movie> {
    #[auto_select(compare = "START_TIME : >", order_desc_by = ["START_TIME", "ID"])]
    fn select_recent(&self, movie: &Movie) -> impl Future<Output = DaoResult<Vec<Movie>>> + Send;

    #[auto_insert(id_seq)]
    fn insert_with_seq(&self, movie: &Movie) -> impl Future<Output = DaoResult<u64>> + Send;
}

#[test]
fn derive_entity_maps_supported_fields() {
    assert_eq!(<Movie as Entity>::TABLE, "MOVIE");
    assert_eq!(<Movie as Entity>::COLUMNS, ["ID", "START_TIME"]);
    let movie = Movie::default();
    assert!(movie.id.is_none() && movie.start_time.is_none());
}

#[test]
fn non_camel_case_entity_keeps_field_names() {
    assert_eq!(<Actor as Entity>::TABLE, "ACTOR");
    assert_eq!(<Actor as Entity>::COLUMNS, ["actorId", "fullName"]);
    let actor = Actor::default();
    assert!(actor.actorId.is_none() && actor.fullName.is_none());
}
