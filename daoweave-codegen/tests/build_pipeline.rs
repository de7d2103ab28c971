use std::{
    fs,
    path::{Path, PathBuf},
    sync::atomic::{AtomicUsize, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

use daoweave_codegen::{
    BuildConfig, BuildOrchestrator, ContractLocator, FileSink, GenError, MemorySink,
};

static TEMP_DIR_COUNTER: AtomicUsize = AtomicUsize::new(0);

fn make_temp_dir() -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let counter = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
    let dir = std::env::temp_dir().join(format!("daoweave_build_test_{}_{}", nanos, counter));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn write(root: &Path, rel: &str, source: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, source).unwrap();
}

const ENTITIES: &str = r#"
use daoweave::Entity;

#[derive(Debug, Default, Entity)]
#[table("MOVIE")]
pub struct Movie {
    #[id(seq = "MOVIE_SEQ")]
    pub id: Option<i32>,
    pub name: Option<String>,
    pub lasts: Option<i64>,
}

#[derive(Debug, Default, Entity)]
#[table("ACTOR")]
pub struct Actor {
    pub id: Option<i32>,
    pub name: Option<String>,
}
"#;

const MOVIE_DAO: &str = r#"
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
}
"#;

fn movie_project() -> PathBuf {
    let root = make_temp_dir();
    let src = root.join("src");
    write(&src, "lib.rs", "pub mod dao;\npub mod entity;\npub mod mapper;\n");
    write(&src, "entity.rs", ENTITIES);
    write(&src, "dao/mod.rs", "pub mod movie_dao;\npub mod proxy;\n");
    write(&src, "dao/movie_dao.rs", MOVIE_DAO);
    root
}

#[tokio::test]
async fn generates_three_files_per_contract() {
    let root = movie_project();
    let src = root.join("src");
    let orchestrator = BuildOrchestrator::new(BuildConfig::new(&src), FileSink);

    let report = orchestrator.run().await.unwrap();
    assert_eq!(report.generated, ["MovieDao"]);
    assert_eq!(report.tasks, 1);

    let provider = fs::read_to_string(src.join("mapper/provider/movie_proxy_provider.rs")).unwrap();
    assert!(provider.contains("pub fn select_by_lasts_limits"));
    let mapper = fs::read_to_string(src.join("mapper/movie_proxy_mapper.rs")).unwrap();
    assert!(mapper.contains("pub struct MovieProxyMapper"));
    let implementation = fs::read_to_string(src.join("dao/proxy/movie_proxy_impl.rs")).unwrap();
    assert!(implementation.contains("impl<S> crate::dao::movie_dao::MovieDao for MovieProxyImpl<S>"));

    // Generated files are not scanned again, so a rerun rebuilds the same set.
    let again = orchestrator.run().await.unwrap();
    assert_eq!(again.generated, ["MovieDao"]);
    assert!(again.excluded.is_empty());

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn hand_written_implementation_excludes_contract() {
    let root = movie_project();
    let src = root.join("src");
    write(
        &src,
        "dao/manual.rs",
        r#"
        pub struct ManualMovieDao;
        impl Dao<Movie> for ManualMovieDao {
            fn insert(&self, var: &Movie) {}
            fn delete(&self, var: &Movie) {}
            fn update(&self, set: &Movie, con: &Movie) {}
            fn select_one(&self, var: &Movie) {}
            fn select(&self, var: &Movie) {}
        }
        impl MovieDao for ManualMovieDao {
            fn select_by_lasts_limits(&self, movie: &Movie) {}
            fn update_by_name(&self, set: &Movie, con: &Movie) {}
        }
        "#,
    );

    let orchestrator = BuildOrchestrator::new(BuildConfig::new(&src), MemorySink::new());
    let report = orchestrator.run().await.unwrap();
    assert_eq!(report.excluded, ["MovieDao"]);
    assert!(report.generated.is_empty());
    assert!(orchestrator.sink().artifacts().is_empty());

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn contract_without_output_is_skipped() {
    let root = movie_project();
    let src = root.join("src");
    write(
        &src,
        "dao/actor_dao.rs",
        r#"
        use crate::entity::Actor;

        #[dao_proxy]
        pub trait ActorDao: Dao<Actor> {}
        "#,
    );

    let orchestrator = BuildOrchestrator::new(BuildConfig::new(&src), MemorySink::new());
    let report = orchestrator.run().await.unwrap();
    assert_eq!(report.skipped, ["ActorDao"]);
    assert_eq!(report.generated, ["MovieDao"]);
    assert_eq!(
        orchestrator.sink().type_names(),
        ["MovieProxyProvider", "MovieProxyMapper", "MovieProxyImpl"]
    );

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn arity_error_fails_the_batch_without_retracting_earlier_work() {
    let root = movie_project();
    let src = root.join("src");
    write(
        &src,
        "dao/actor_dao.rs",
        r#"
        use crate::entity::Actor;

        #[dao_proxy(output = "crate::mapper")]
        pub trait ActorDao: Dao<Actor> {}
        "#,
    );
    write(
        &src,
        "dao/broken_dao.rs",
        r#"
        use crate::entity::Movie;

        #[dao_proxy(output = "crate::mapper")]
        pub trait BrokenDao: Dao<Movie> {
            #[auto_update]
            fn update_everything(&self, set: &Movie)
                -> impl Future<Output = DaoResult<u64>> + Send;
        }
        "#,
    );

    // One worker processes actor_dao, broken_dao, movie_dao in path order.
    let config = BuildConfig::new(&src).with_workers(1);
    let orchestrator = BuildOrchestrator::new(config, MemorySink::new());
    let err = orchestrator.run().await.unwrap_err();
    match err {
        GenError::MethodArity {
            contract,
            method,
            expected,
            found,
            ..
        } => {
            assert_eq!(contract, "BrokenDao");
            assert_eq!(method, "update_everything");
            assert_eq!((expected, found), (2, 1));
        }
        other => panic!("unexpected error {:?}", other),
    }
    assert_eq!(
        orchestrator.sink().type_names(),
        ["ActorProxyProvider", "ActorProxyMapper", "ActorProxyImpl"]
    );

    let _ = fs::remove_dir_all(root);
}

#[tokio::test]
async fn missing_table_marker_is_fatal() {
    let root = make_temp_dir();
    let src = root.join("src");
    write(
        &src,
        "lib.rs",
        r#"
        #[derive(Entity)]
        pub struct Untabled {
            pub id: Option<i32>,
        }

        #[dao_proxy(output = "crate::mapper")]
        pub trait UntabledDao: Dao<Untabled> {}
        "#,
    );

    let orchestrator = BuildOrchestrator::new(BuildConfig::new(&src), MemorySink::new());
    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(err, GenError::MissingTableMarker { ref entity } if entity == "Untabled"));

    let _ = fs::remove_dir_all(root);
}

#[test]
fn run_blocking_uses_its_own_runtime() {
    let root = movie_project();
    let src = root.join("src");
    let orchestrator = BuildOrchestrator::new(BuildConfig::new(&src), MemorySink::new());
    let report = orchestrator.run_blocking().unwrap();
    assert_eq!(report.generated, ["MovieDao"]);
    let _ = fs::remove_dir_all(root);
}

#[test]
fn locator_reports_module_paths() {
    let root = movie_project();
    let index = ContractLocator::new(root.join("src")).locate().unwrap();
    assert_eq!(index.contracts.len(), 1);
    let contract = &index.contracts[0];
    assert_eq!(contract.module_path, "crate::dao::movie_dao");
    assert_eq!(contract.package, "crate::dao");
    assert_eq!(contract.output.as_deref(), Some("crate::mapper"));
    let movie = index.entity("Movie").unwrap();
    assert_eq!(movie.type_path(), "crate::entity::Movie");
    let _ = fs::remove_dir_all(root);
}
