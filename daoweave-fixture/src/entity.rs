use daoweave::Entity;

#[derive(Debug, Clone, Default, PartialEq, Entity)]
#[table("MOVIE")]
pub struct Movie {
    #[id(seq = "MOVIE_SEQ")]
    pub id: Option<i32>,
    pub name: Option<String>,
    pub lasts: Option<i64>,
    pub r#type: Option<String>,
    #[dao(ignore)]
    pub note: Option<String>,
}
