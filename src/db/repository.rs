use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::Curso;
use crate::pagination::{Page, PageRequest};

#[async_trait]
pub trait CursoStore: Send + Sync {
    async fn exists_by_numero_matricula(&self, numero_matricula: &str)
    -> Result<bool, sqlx::Error>;
    async fn exists_by_numero_curso(&self, numero_curso: &str) -> Result<bool, sqlx::Error>;
    // insert, or overwrite the row with the same id
    async fn save(&self, curso: &Curso) -> Result<Curso, sqlx::Error>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Curso>, sqlx::Error>;
    async fn find_all(&self, request: &PageRequest) -> Result<Page<Curso>, sqlx::Error>;
    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error>;
    async fn ping(&self) -> Result<(), sqlx::Error>;
}

pub struct SqliteCursoStore {
    db: SqlitePool,
}

impl SqliteCursoStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CursoStore for SqliteCursoStore {
    async fn exists_by_numero_matricula(
        &self,
        numero_matricula: &str,
    ) -> Result<bool, sqlx::Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM cursos WHERE numero_matricula = ?")
                .bind(numero_matricula)
                .fetch_one(&self.db)
                .await?;
        Ok(count > 0)
    }

    async fn exists_by_numero_curso(&self, numero_curso: &str) -> Result<bool, sqlx::Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cursos WHERE numero_curso = ?")
            .bind(numero_curso)
            .fetch_one(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn save(&self, curso: &Curso) -> Result<Curso, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO cursos (id, nome, numero_matricula, numero_curso, data_inscricao)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
                nome = excluded.nome,
                numero_matricula = excluded.numero_matricula,
                numero_curso = excluded.numero_curso,
                data_inscricao = excluded.data_inscricao
            "#,
        )
        .bind(curso.id)
        .bind(&curso.nome)
        .bind(&curso.numero_matricula)
        .bind(&curso.numero_curso)
        .bind(curso.data_inscricao)
        .execute(&self.db)
        .await?;

        self.find_by_id(curso.id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Curso>, sqlx::Error> {
        sqlx::query_as::<_, Curso>(
            "SELECT id, nome, numero_matricula, numero_curso, data_inscricao FROM cursos WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
    }

    async fn find_all(&self, request: &PageRequest) -> Result<Page<Curso>, sqlx::Error> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cursos")
            .fetch_one(&self.db)
            .await?;

        // Columns and directions come from closed enums, never from the request text.
        let order_by = request
            .sort
            .iter()
            .map(|s| format!("{} {}", s.field.column(), s.direction.keyword()))
            .chain(std::iter::once("id ASC".to_string()))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "SELECT id, nome, numero_matricula, numero_curso, data_inscricao FROM cursos ORDER BY {order_by} LIMIT ? OFFSET ?"
        );

        let content = sqlx::query_as::<_, Curso>(&sql)
            .bind(i64::from(request.size))
            .bind(i64::try_from(request.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.db)
            .await?;

        Ok(Page::new(content, request, u64::try_from(total).unwrap_or(0)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cursos WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?
            .rows_affected();

        Ok(result > 0)
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("select 1").execute(&self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::db::connect_in_memory;
    use crate::pagination::{Direction, Sort, SortField};

    async fn setup_test_store() -> SqliteCursoStore {
        let pool = connect_in_memory().await.expect("Failed to create test db");
        SqliteCursoStore::new(pool)
    }

    fn curso(nome: &str, matricula: &str, numero: &str) -> Curso {
        Curso {
            id: Uuid::new_v4(),
            nome: nome.to_string(),
            numero_matricula: matricula.to_string(),
            numero_curso: numero.to_string(),
            data_inscricao: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_save_and_find_by_id() {
        let store = setup_test_store().await;
        let curso = curso("Rust", "123", "A1");

        let saved = store.save(&curso).await.expect("Failed to save");
        assert_eq!(saved, curso);

        let found = store
            .find_by_id(curso.id)
            .await
            .expect("Failed to query")
            .expect("Curso not found");
        assert_eq!(found, curso);
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_row() {
        let store = setup_test_store().await;
        let mut curso = curso("Rust", "123", "A1");
        store.save(&curso).await.expect("Failed to save");

        curso.nome = "Rust avançado".to_string();
        curso.numero_curso = "B2".to_string();
        let saved = store.save(&curso).await.expect("Failed to overwrite");

        assert_eq!(saved.nome, "Rust avançado");
        assert_eq!(saved.numero_curso, "B2");
        let page = store
            .find_all(&PageRequest::default())
            .await
            .expect("Failed to list");
        assert_eq!(page.total_elements, 1);
    }

    #[tokio::test]
    async fn test_exists_checks() {
        let store = setup_test_store().await;
        store
            .save(&curso("Rust", "123", "A1"))
            .await
            .expect("Failed to save");

        assert!(store.exists_by_numero_matricula("123").await.unwrap());
        assert!(!store.exists_by_numero_matricula("999").await.unwrap());
        assert!(store.exists_by_numero_curso("A1").await.unwrap());
        assert!(!store.exists_by_numero_curso("Z9").await.unwrap());
    }

    #[tokio::test]
    async fn test_save_rejects_duplicate_business_key() {
        let store = setup_test_store().await;
        store
            .save(&curso("Rust", "123", "A1"))
            .await
            .expect("Failed to save");

        let err = store.save(&curso("Go", "123", "B2")).await.unwrap_err();
        assert!(
            err.as_database_error()
                .is_some_and(|e| e.is_unique_violation())
        );
    }

    #[tokio::test]
    async fn test_find_all_orders_and_pages() {
        let store = setup_test_store().await;
        let base = Utc::now();
        for i in 0..5 {
            let mut c = curso(&format!("curso {i}"), &format!("m{i}"), &format!("c{i}"));
            c.data_inscricao = base + Duration::seconds(i);
            store.save(&c).await.expect("Failed to save");
        }

        let first = store
            .find_all(&PageRequest {
                page: 0,
                size: 2,
                sort: vec![Sort::default()],
            })
            .await
            .expect("Failed to list");
        assert_eq!(first.total_elements, 5);
        assert_eq!(first.total_pages, 3);
        let names: Vec<&str> = first.content.iter().map(|c| c.nome.as_str()).collect();
        assert_eq!(names, vec!["curso 0", "curso 1"]);

        let last = store
            .find_all(&PageRequest {
                page: 2,
                size: 2,
                sort: vec![Sort::default()],
            })
            .await
            .expect("Failed to list");
        assert_eq!(last.content.len(), 1);
        assert!(last.last);

        let newest_first = store
            .find_all(&PageRequest {
                page: 0,
                size: 10,
                sort: vec![Sort {
                    field: SortField::DataInscricao,
                    direction: Direction::Desc,
                }],
            })
            .await
            .expect("Failed to list");
        assert_eq!(newest_first.content[0].nome, "curso 4");
    }

    #[tokio::test]
    async fn test_find_all_applies_sort_keys_in_order() {
        let store = setup_test_store().await;
        for (nome, numero) in [("b", "c1"), ("a", "c2"), ("a", "c3")] {
            store
                .save(&curso(nome, &format!("m-{numero}"), numero))
                .await
                .expect("Failed to save");
        }

        let page = store
            .find_all(&PageRequest {
                page: 0,
                size: 10,
                sort: vec![
                    Sort {
                        field: SortField::Nome,
                        direction: Direction::Asc,
                    },
                    Sort {
                        field: SortField::NumeroCurso,
                        direction: Direction::Desc,
                    },
                ],
            })
            .await
            .expect("Failed to list");

        let numeros: Vec<&str> = page.content.iter().map(|c| c.numero_curso.as_str()).collect();
        assert_eq!(numeros, vec!["c3", "c2", "c1"]);
    }

    #[tokio::test]
    async fn test_find_all_empty() {
        let store = setup_test_store().await;
        let page = store
            .find_all(&PageRequest::default())
            .await
            .expect("Failed to list");
        assert!(page.empty);
        assert_eq!(page.total_elements, 0);
    }

    #[tokio::test]
    async fn test_delete() {
        let store = setup_test_store().await;
        let curso = curso("Rust", "123", "A1");
        store.save(&curso).await.expect("Failed to save");

        assert!(store.delete(curso.id).await.expect("Failed to delete"));
        assert!(store.find_by_id(curso.id).await.unwrap().is_none());
        assert!(!store.delete(curso.id).await.expect("Failed to delete"));
    }
}
