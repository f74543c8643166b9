pub mod curso_service;

pub use curso_service::{CursoService, MATRICULA_EM_USO, NUMERO_CURSO_EM_USO};
