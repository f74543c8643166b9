pub mod curso;

pub use curso::{Curso, CursoInput, FieldError};
