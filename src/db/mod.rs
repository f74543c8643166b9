pub mod repository;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::config::AppConfig;

pub use repository::{CursoStore, SqliteCursoStore};

/// Opens the pool described by `config`, creating the database file if needed.
pub async fn connect(config: &AppConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// A migrated in-memory database for tests. A single connection that never
/// expires keeps the database alive for the lifetime of the pool.
pub async fn connect_in_memory() -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

/// Errors meaning the store could not be reached at all, as opposed to a
/// query that reached it and failed.
pub fn is_connection_failure(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueKey {
    NumeroMatricula,
    NumeroCurso,
}

/// Which business key a failed write collided with, if the failure was a
/// unique constraint violation on one of them.
pub fn violated_unique_key(err: &sqlx::Error) -> Option<UniqueKey> {
    let db_err = err.as_database_error()?;
    if !db_err.is_unique_violation() {
        return None;
    }

    // SQLite reports "UNIQUE constraint failed: cursos.<column>"
    let message = db_err.message();
    if message.contains("numero_matricula") {
        Some(UniqueKey::NumeroMatricula)
    } else if message.contains("numero_curso") {
        Some(UniqueKey::NumeroCurso)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_failures() {
        assert!(is_connection_failure(&sqlx::Error::PoolTimedOut));
        assert!(is_connection_failure(&sqlx::Error::PoolClosed));
        assert!(!is_connection_failure(&sqlx::Error::RowNotFound));
    }

    #[tokio::test]
    async fn test_unique_violation_is_classified() {
        let pool = connect_in_memory().await.expect("Failed to create test db");

        let insert = "INSERT INTO cursos (id, nome, numero_matricula, numero_curso, data_inscricao) VALUES (?, ?, ?, ?, ?)";
        sqlx::query(insert)
            .bind(uuid::Uuid::new_v4())
            .bind("X")
            .bind("123")
            .bind("A1")
            .bind(chrono::Utc::now())
            .execute(&pool)
            .await
            .expect("first insert");

        let err = sqlx::query(insert)
            .bind(uuid::Uuid::new_v4())
            .bind("Y")
            .bind("123")
            .bind("B2")
            .bind(chrono::Utc::now())
            .execute(&pool)
            .await
            .unwrap_err();
        assert_eq!(violated_unique_key(&err), Some(UniqueKey::NumeroMatricula));

        let err = sqlx::query(insert)
            .bind(uuid::Uuid::new_v4())
            .bind("Z")
            .bind("456")
            .bind("A1")
            .bind(chrono::Utc::now())
            .execute(&pool)
            .await
            .unwrap_err();
        assert_eq!(violated_unique_key(&err), Some(UniqueKey::NumeroCurso));
    }
}
