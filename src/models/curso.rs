use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Curso {
    pub id: Uuid,
    pub nome: String,
    pub numero_matricula: String,
    pub numero_curso: String,
    pub data_inscricao: DateTime<Utc>,
}

impl Curso {
    pub fn new(input: CursoInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            nome: input.nome,
            numero_matricula: input.numero_matricula,
            numero_curso: input.numero_curso,
            data_inscricao: Utc::now(),
        }
    }

    // id and data_inscricao are never taken from input
    pub fn replaced_with(&self, input: CursoInput) -> Self {
        Self {
            id: self.id,
            nome: input.nome,
            numero_matricula: input.numero_matricula,
            numero_curso: input.numero_curso,
            data_inscricao: self.data_inscricao,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursoInput {
    pub nome: String,
    pub numero_matricula: String,
    pub numero_curso: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl CursoInput {
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let required = [
            ("nome", &self.nome),
            ("numeroMatricula", &self.numero_matricula),
            ("numeroCurso", &self.numero_curso),
        ];

        let errors: Vec<FieldError> = required
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| FieldError {
                field,
                message: "must not be blank",
            })
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
