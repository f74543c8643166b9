use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::{Query, QueryRejection};
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::db::is_connection_failure;
use crate::error::AppError;
use crate::models::{Curso, CursoInput};
use crate::pagination::{Page, PageParams, PageRequest};
use crate::services::{MATRICULA_EM_USO, NUMERO_CURSO_EM_USO};
use crate::state::AppState;

pub const CURSO_NAO_ENCONTRADO: &str = "Curso não encontrado!";
pub const CURSO_EXCLUIDO: &str = "Curso excluído com sucesso!";
pub const TENTE_MAIS_TARDE: &str = "Erro momentâneo, por favor tente mais tarde...";

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/cursos", get(list_cursos).post(create_curso))
        .route(
            "/cursos/{id}",
            get(get_curso).put(update_curso).delete(delete_curso),
        )
}

async fn create_curso(
    State(state): State<AppState>,
    payload: Result<Json<CursoInput>, JsonRejection>,
) -> Result<(StatusCode, Json<Curso>), AppError> {
    let Json(input) = payload?;
    input.validate()?;
    info!(
        numero_matricula = %input.numero_matricula,
        numero_curso = %input.numero_curso,
        "saving new curso"
    );

    if state
        .cursos
        .exists_by_numero_matricula(&input.numero_matricula)
        .await?
    {
        warn!(
            numero_matricula = %input.numero_matricula,
            "curso not saved, enrollment number already in use"
        );
        return Err(AppError::Conflict(MATRICULA_EM_USO.to_string()));
    }

    if state.cursos.exists_by_numero_curso(&input.numero_curso).await? {
        warn!(
            numero_curso = %input.numero_curso,
            "curso not saved, course number already in use"
        );
        return Err(AppError::Conflict(NUMERO_CURSO_EM_USO.to_string()));
    }

    let saved = state.cursos.save(Curso::new(input)).await?;
    info!(id = %saved.id, "curso saved");
    Ok((StatusCode::CREATED, Json(saved)))
}

async fn list_cursos(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Page<Curso>>, AppError> {
    let Query(params) = params?;
    let request = PageRequest::try_from(params)?;
    info!(page = request.page, size = request.size, "listing cursos");

    let page = state
        .cursos
        .find_all(request)
        .await
        .map_err(|err| match err {
            AppError::Database(e) if is_connection_failure(&e) => {
                error!(error = %e, "record store unreachable while listing cursos");
                AppError::Unavailable(TENTE_MAIS_TARDE.to_string())
            }
            other => other,
        })?;

    Ok(Json(page))
}

async fn get_curso(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Curso>, AppError> {
    let Path(id) = id?;
    let curso = find_existing(&state, id).await?;
    Ok(Json(curso))
}

async fn delete_curso(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>, AppError> {
    let Path(id) = id?;
    let curso = find_existing(&state, id).await?;
    if !state.cursos.delete(&curso).await? {
        info!(%id, "curso removed by another request before delete");
        return Err(not_found());
    }
    info!(%id, "curso deleted");

    Ok(Json(MessageResponse {
        message: CURSO_EXCLUIDO.to_string(),
    }))
}

async fn update_curso(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CursoInput>, JsonRejection>,
) -> Result<Json<Curso>, AppError> {
    let Path(id) = id?;
    let existing = find_existing(&state, id).await?;

    let Json(input) = payload?;
    input.validate()?;

    // id and dataInscricao always come from the stored record
    let updated = state.cursos.save(existing.replaced_with(input)).await?;
    info!(%id, "curso updated");
    Ok(Json(updated))
}

async fn find_existing(state: &AppState, id: Uuid) -> Result<Curso, AppError> {
    match state.cursos.find_by_id(id).await? {
        Some(curso) => Ok(curso),
        None => {
            info!(%id, "curso not found");
            Err(not_found())
        }
    }
}

fn not_found() -> AppError {
    AppError::NotFound(CURSO_NAO_ENCONTRADO.to_string())
}
