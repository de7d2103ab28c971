use daoweave::prelude::*;
use daoweave::test_utils::{RecordingSession, sqlite_memory_pool};
use daoweave::{DaoError, Operation, SqlValue};
use daoweave_fixture::mapper::movie_proxy_mapper::MovieProxyMapper;
use daoweave_fixture::mapper::provider::movie_proxy_provider::MovieProxyProvider;
use daoweave_fixture::{Movie, MovieDao, MovieProxyImpl};

fn movie(id: i32, name: &str, lasts: i64, kind: &str) -> Movie {
    Movie {
        id: Some(id),
        name: Some(name.to_owned()),
        lasts: Some(lasts),
        r#type: Some(kind.to_owned()),
        note: None,
    }
}

async fn seeded_dao() -> MovieProxyImpl<sqlx::SqlitePool> {
    let pool = sqlite_memory_pool().await.unwrap();
    // Columns carry the names the generator derives for `Movie`.
    sqlx::query("CREATE TABLE MOVIE (ID INTEGER PRIMARY KEY, NAME TEXT, LASTS INTEGER, TYPE TEXT)")
        .execute(&pool)
        .await
        .unwrap();
    let dao = MovieProxyImpl::new(pool);
    for movie in [
        movie(1, "Heat", 170, "crime"),
        movie(2, "Alien", 117, "horror"),
        movie(3, "Short", 90, "drama"),
        movie(4, "Shorter", 80, "drama"),
    ] {
        assert_eq!(dao.insert(&movie).await.unwrap(), 1);
    }
    dao
}

#[tokio::test]
async fn select_one_maps_upper_case_columns() {
    let dao = seeded_dao().await;

    let heat = dao
        .select_one(&Movie {
            id: Some(1),
            ..Movie::default()
        })
        .await
        .unwrap();
    assert_eq!(heat, Some(movie(1, "Heat", 170, "crime")));

    let missing = dao
        .select_one(&Movie {
            id: Some(99),
            ..Movie::default()
        })
        .await
        .unwrap();
    assert_eq!(missing, None);
}

#[tokio::test]
async fn base_operations_round_trip() {
    let dao = seeded_dao().await;

    let updated = dao
        .update(
            &Movie {
                lasts: Some(171),
                ..Movie::default()
            },
            &Movie {
                name: Some("Heat".to_owned()),
                ..Movie::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated, 1);

    let deleted = dao
        .delete(&Movie {
            id: Some(2),
            ..Movie::default()
        })
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    let all = dao.select(&Movie::default()).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].lasts, Some(171));
    assert!(all.iter().all(|m| m.note.is_none()));
}

#[tokio::test]
async fn other_override_replaces_the_lasts_condition() {
    let dao = seeded_dao().await;

    let limited = dao
        .select_by_lasts_limits(&Movie {
            lasts: Some(170),
            ..Movie::default()
        })
        .await
        .unwrap();
    let names = limited.into_iter().filter_map(|m| m.name).collect::<Vec<_>>();
    assert_eq!(names, ["Short", "Shorter"]);

    let statement = MovieProxyProvider::select_by_lasts_limits(&Movie {
        lasts: Some(170),
        ..Movie::default()
    })
    .unwrap();
    assert_eq!(
        statement.text(),
        "SELECT * FROM MOVIE WHERE (LASTS = 90 OR LASTS = 80)"
    );
    assert!(statement.params().is_empty());
}

#[tokio::test]
async fn update_by_name_matches_with_like() {
    let dao = seeded_dao().await;

    let renamed = dao
        .update_by_name(
            &Movie {
                lasts: Some(60),
                ..Movie::default()
            },
            &Movie {
                name: Some("Short".to_owned()),
                ..Movie::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed, 2);

    let shortened = dao
        .select(&Movie {
            lasts: Some(60),
            ..Movie::default()
        })
        .await
        .unwrap();
    assert_eq!(shortened.len(), 2);
}

#[tokio::test]
async fn compare_and_descending_order_run_on_sqlite() {
    let dao = seeded_dao().await;

    let longer = dao
        .select_longer_than(&Movie {
            lasts: Some(85),
            ..Movie::default()
        })
        .await
        .unwrap();
    let ids = longer.into_iter().filter_map(|m| m.id).collect::<Vec<_>>();
    assert_eq!(ids, [1, 2, 3]);

    let crime = dao
        .select_one_by_type(&Movie {
            r#type: Some("ime".to_owned()),
            ..Movie::default()
        })
        .await
        .unwrap();
    assert_eq!(crime.and_then(|m| m.name).as_deref(), Some("Heat"));
    assert_eq!(dao.describe(), "movies");
}

#[tokio::test]
async fn generated_statements_reach_the_session() {
    let dao = MovieProxyImpl::new(RecordingSession::default());

    dao.update_by_name(
        &Movie {
            name: Some("Alien".to_owned()),
            lasts: Some(117),
            ..Movie::default()
        },
        &Movie {
            name: Some("Ali".to_owned()),
            ..Movie::default()
        },
    )
    .await
    .unwrap();
    dao.insert_with_seq(&Movie {
        id: Some(5),
        name: Some("Ronin".to_owned()),
        ..Movie::default()
    })
    .await
    .unwrap();
    dao.select_longer_than(&Movie::default()).await.unwrap();

    let statements = dao.mapper().session().statements();
    let texts = statements.iter().map(|s| s.text()).collect::<Vec<_>>();
    assert_eq!(
        texts,
        [
            "UPDATE MOVIE SET NAME = ?, LASTS = ? WHERE NAME LIKE '%Ali%'",
            "INSERT INTO MOVIE (ID, NAME) VALUES (MOVIE_SEQ.NEXTVAL, ?)",
            "SELECT * FROM MOVIE WHERE LASTS > ? ORDER BY LASTS DESC, ID DESC",
        ]
    );
    assert_eq!(statements[0].operation(), Operation::Update);
    assert_eq!(statements[1].params(), &[SqlValue::Text("Ronin".to_owned())]);
    assert_eq!(statements[2].params(), &[SqlValue::Null]);

    let empty = dao.update(&Movie::default(), &Movie::default()).await;
    assert!(matches!(empty, Err(DaoError::EmptyStatement { .. })));
    assert_eq!(dao.mapper().session().statements().len(), 3);
}

#[test]
fn mapper_bindings_cover_base_and_contract_methods() {
    let methods = MovieProxyMapper::<RecordingSession>::BINDINGS
        .iter()
        .map(|binding| binding.method)
        .collect::<Vec<_>>();
    assert_eq!(
        methods,
        [
            "insert",
            "delete",
            "update",
            "select_one",
            "select",
            "select_by_lasts_limits",
            "update_by_name",
            "insert_with_seq",
            "select_longer_than",
            "select_one_by_type",
        ]
    );
    let binding = &MovieProxyMapper::<RecordingSession>::BINDINGS[5];
    assert_eq!(binding.provider, "MovieProxyProvider::select_by_lasts_limits");
    assert_eq!(binding.operation, Operation::Select);
}
