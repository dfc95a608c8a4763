use crate::app_env::test::TEST_DB_URL;
use crate::db;
use dotenv::dotenv;
use lazy_static::lazy_static;
use rand::{Rng, thread_rng};
use sqlx::{Connection, PgConnection, PgPool, Row};
use std::env;
use std::future::Future;
use tokio::runtime::Runtime;
use tokio::sync::OnceCell;

lazy_static! {
    static ref TOKIO_RT: Runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Tokio runtime failed to initialize");
}

const TEST_DB_PREFIX: &str = "todo_test_db_";

/// Set once the leftovers from earlier runs have been dropped. Every test waits on it before
/// creating its own database.
static STALE_DBS_SWEPT: OnceCell<()> = OnceCell::const_new();

/// Name prefix shared by every database created by this test process
fn run_prefix() -> String {
    format!("{TEST_DB_PREFIX}{}_", std::process::id())
}

/// Whether [db_name] is a test database left over from some other run
fn is_stale_test_db(db_name: &str, current_run_prefix: &str) -> bool {
    db_name.starts_with(TEST_DB_PREFIX) && !db_name.starts_with(current_run_prefix)
}

struct TestDatabase {
    name: String,
}

impl TestDatabase {
    /// Drops databases left behind by earlier test runs which did not clean up after themselves.
    /// Databases belonging to this run are never touched.
    async fn clear_old_dbs(base_url: &str) {
        let current_run_prefix = run_prefix();
        let mut conn = match PgConnection::connect(base_url).await {
            Ok(conn) => conn,
            Err(error) => {
                println!("Warning: could not connect to clear old test databases. Error: {error}");
                return;
            }
        };

        let old_dbs = sqlx::query(
            "SELECT datname FROM pg_catalog.pg_database WHERE datname LIKE 'todo_test_db_%'",
        )
        .fetch_all(&mut conn)
        .await;
        let old_dbs = match old_dbs {
            Ok(rows) => rows
                .into_iter()
                .map(|row| row.get::<String, _>(0))
                .filter(|db_name| is_stale_test_db(db_name, &current_run_prefix))
                .collect::<Vec<_>>(),
            Err(error) => {
                println!("Warning: failed to list old test databases. Error: {error}");
                return;
            }
        };

        for old_db in old_dbs {
            let result = sqlx::query(&format!("DROP DATABASE IF EXISTS {old_db}"))
                .execute(&mut conn)
                .await;
            if result.is_err() {
                println!("Warning: failed to drop old test database {old_db}, you may need to do it manually.");
            }
        }
        let _ = conn.close().await;
    }

    async fn create(conn: &mut PgConnection) -> Result<Self, sqlx::Error> {
        let db_id: u32 = thread_rng().gen_range(10_000..99_999);
        let name = format!("{}{db_id}", run_prefix());

        sqlx::query(&format!("CREATE DATABASE {name}"))
            .execute(&mut *conn)
            .await?;

        Ok(Self { name })
    }

    async fn destroy(self, conn: &mut PgConnection) {
        let result = sqlx::query(&format!("DROP DATABASE IF EXISTS {} WITH (FORCE)", self.name))
            .execute(&mut *conn)
            .await;
        if let Err(error) = result {
            println!(
                "Warning: failed to drop test database {}, it will be cleared on the next run. Error: {error}",
                self.name
            );
        }
    }
}

/// Creates a throwaway database with the TODO table in it, hands a pool for it to [test_fn], and
/// drops the database afterwards.
///
/// Expects that the TEST_DB_URL environment variable is populated with a postgres connection string
/// that has no database name in the path
pub fn prepare_db_and_test<F, R>(test_fn: F)
where
    R: Future<Output = ()>,
    F: FnOnce(PgPool) -> R,
{
    if dotenv().is_err() {
        println!("Test is running without .env file.");
    }

    TOKIO_RT.block_on(async move {
        let base_url = env::var(TEST_DB_URL).unwrap_or_else(|_| {
            panic!("You must provide the {TEST_DB_URL} environment variable as the base postgres connection string")
        });

        let mut admin_conn = PgConnection::connect(&base_url)
            .await
            .expect("Could not create initial connection to provision database");
        STALE_DBS_SWEPT
            .get_or_init(|| TestDatabase::clear_old_dbs(&base_url))
            .await;
        let test_db = TestDatabase::create(&mut admin_conn)
            .await
            .unwrap_or_else(|err| panic!("Failed to create test database: {err}"));

        let pool = db::connect_sqlx(&format!("{base_url}/{}", test_db.name), 5)
            .await
            .expect("Could not connect to the test database");
        sqlx::query(db::TODOS_TABLE_DDL)
            .execute(&pool)
            .await
            .expect("Could not create the TODO table");

        test_fn(pool.clone()).await;

        pool.close().await;
        test_db.destroy(&mut admin_conn).await;
        let _ = admin_conn.close().await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_other_runs_databases_are_stale() {
        let current_run_prefix = format!("{TEST_DB_PREFIX}4242_");

        assert!(is_stale_test_db("todo_test_db_17_55555", &current_run_prefix));
        assert!(!is_stale_test_db("todo_test_db_4242_12345", &current_run_prefix));
        assert!(!is_stale_test_db("postgres", &current_run_prefix));
    }

    #[test]
    fn databases_from_this_run_share_its_prefix() {
        let current_run_prefix = run_prefix();
        let db_name = format!("{current_run_prefix}12345");

        assert!(!is_stale_test_db(&db_name, &current_run_prefix));
    }
}
