use std::sync::Arc;

use crate::services::CursoService;

#[derive(Clone)]
pub struct AppState {
    pub cursos: Arc<CursoService>,
}

impl AppState {
    pub fn new(cursos: CursoService) -> Self {
        Self {
            cursos: Arc::new(cursos),
        }
    }
}
