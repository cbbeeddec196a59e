// src/web/student_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::student::Student,
    services::{authz, student_service},
    state::AppState,
    web::mw_auth::CurrentUser,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

// GET /api/students?q=
pub async fn handle_list_students(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Student>>> {
    // Últimas fichas actualizadas, filtradas por nombre o documento
    let students = student_service::find_recent_students(&state.db_pool, state.config.fetch_limit)
        .await?
        .into_iter()
        .filter(|s| student_service::matches_search(s, &query.q))
        .collect();
    Ok(Json(students))
}

// POST /api/students
pub async fn handle_save_student(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(student): Json<Student>,
) -> AppResult<Json<Student>> {
    let mut student = student;

    // ¿Ficha existente o nueva?
    let existing = match student.id.trim() {
        "" => None,
        id => student_service::find_student_by_id(&state.db_pool, id).await?,
    };

    match existing {
        // Editar exige ser director del curso o administrador
        Some(existing) => {
            if !authz::can_edit_student(&user, &existing) {
                tracing::warn!("'{}' no puede editar al estudiante '{}'.", user.username, existing.id);
                return Err(AppError::Forbidden(
                    "Sólo el director de grupo o un administrador puede editar esta ficha.".to_string(),
                ));
            }
        }
        // Crear: el docente con curso asignado sólo registra en su curso
        None => {
            if let Some(course_id) = authz::course_for_new_student(&user) {
                if student.course_id != course_id {
                    tracing::debug!(
                        "'{}' registra estudiante: curso '{}' reemplazado por '{}'.",
                        user.username,
                        student.course_id,
                        course_id
                    );
                    student.course_id = course_id.to_string();
                }
            }
        }
    }

    let saved = student_service::save_student(&state.db_pool, student).await?;
    Ok(Json(saved))
}

// DELETE /api/students/{id}
pub async fn handle_delete_student(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(student_id): Path<String>,
) -> AppResult<Json<Value>> {
    // 1. Buscar la ficha
    let student = student_service::find_student_by_id(&state.db_pool, &student_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Estudiante '{}' no encontrado.", student_id)))?;

    // 2. Permisos
    if !authz::can_delete_student(&user, &student) {
        tracing::warn!("'{}' no puede borrar al estudiante '{}'.", user.username, student_id);
        return Err(AppError::Forbidden(
            "Sólo el director de grupo o un administrador puede borrar esta ficha.".to_string(),
        ));
    }

    // 3. Borrado; según el modo también se van sus incidencias
    let removed = student_service::delete_student(&state.db_pool, &student_id, state.config.delete_mode).await?;
    Ok(Json(json!({ "success": true, "removedIncidents": removed })))
}
