use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::db::{CursoStore, UniqueKey, violated_unique_key};
use crate::error::AppError;
use crate::models::Curso;
use crate::pagination::{Page, PageRequest};

pub const MATRICULA_EM_USO: &str = "O número de matricula do curso já esta em uso!";
pub const NUMERO_CURSO_EM_USO: &str = "O número do curso já esta em uso!";

/// Store unique violations surface from `save` as a conflict.
pub struct CursoService {
    store: Arc<dyn CursoStore>,
}

impl CursoService {
    pub fn new(store: Arc<dyn CursoStore>) -> Self {
        Self { store }
    }

    pub async fn exists_by_numero_matricula(&self, numero_matricula: &str) -> Result<bool, AppError> {
        Ok(self.store.exists_by_numero_matricula(numero_matricula).await?)
    }

    pub async fn exists_by_numero_curso(&self, numero_curso: &str) -> Result<bool, AppError> {
        Ok(self.store.exists_by_numero_curso(numero_curso).await?)
    }

    pub async fn save(&self, curso: Curso) -> Result<Curso, AppError> {
        self.store.save(&curso).await.map_err(|err| match violated_unique_key(&err) {
            Some(key) => {
                warn!(id = %curso.id, ?key, "write rejected by unique constraint");
                AppError::Conflict(conflict_message(key).to_string())
            }
            None => AppError::Database(err),
        })
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Curso>, AppError> {
        Ok(self.store.find_by_id(id).await?)
    }

    pub async fn find_all(&self, request: PageRequest) -> Result<Page<Curso>, AppError> {
        Ok(self.store.find_all(&request).await?)
    }

    /// Returns `false` when the row was already gone.
    pub async fn delete(&self, curso: &Curso) -> Result<bool, AppError> {
        Ok(self.store.delete(curso.id).await?)
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        Ok(self.store.ping().await?)
    }
}

pub fn conflict_message(key: UniqueKey) -> &'static str {
    match key {
        UniqueKey::NumeroMatricula => MATRICULA_EM_USO,
        UniqueKey::NumeroCurso => NUMERO_CURSO_EM_USO,
    }
}
