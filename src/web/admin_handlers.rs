// src/web/admin_handlers.rs
//! Mantenimiento de usuarios y catálogos (sólo administradores).
use crate::{
    error::{AppError, AppResult},
    models::{
        course::{Course, FaultType, GroupAssignmentPayload},
        teacher::Teacher,
        user::{User, UserPayload},
    },
    services::{catalog_service, incident_service, user_service},
    state::AppState,
    web::mw_auth::CurrentUser,
};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde_json::{json, Value};

fn deleted() -> Json<Value> {
    Json(json!({ "success": true }))
}

// --- Usuarios ---

pub async fn handle_save_user(
    State(state): State<AppState>,
    Json(payload): Json<UserPayload>,
) -> AppResult<Json<User>> {
    // Sin contraseña: se conserva la actual, o "123" si el usuario es nuevo
    let user = user_service::save_user(&state.db_pool, payload, state.config.bcrypt_cost).await?;
    Ok(Json(user))
}

pub async fn handle_delete_user(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Value>> {
    // El administrador no puede dejarse sin acceso
    if current.id == user_id {
        return Err(AppError::Validation(
            "No puede borrar su propia cuenta.".to_string(),
        ));
    }
    user_service::delete_user(&state.db_pool, &user_id).await?;
    Ok(deleted())
}

// --- Docentes ---

pub async fn handle_save_teacher(
    State(state): State<AppState>,
    Json(teacher): Json<Teacher>,
) -> AppResult<Json<Teacher>> {
    Ok(Json(catalog_service::save_teacher(&state.db_pool, teacher).await?))
}

pub async fn handle_delete_teacher(
    State(state): State<AppState>,
    Path(teacher_id): Path<String>,
) -> AppResult<Json<Value>> {
    catalog_service::delete_teacher(&state.db_pool, &teacher_id).await?;
    Ok(deleted())
}

// --- Cursos ---

pub async fn handle_save_course(
    State(state): State<AppState>,
    Json(course): Json<Course>,
) -> AppResult<Json<Course>> {
    Ok(Json(catalog_service::save_course(&state.db_pool, course).await?))
}

pub async fn handle_delete_course(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> AppResult<Json<Value>> {
    catalog_service::delete_course(&state.db_pool, &course_id).await?;
    Ok(deleted())
}

// --- Tipos de falta ---

pub async fn handle_save_fault_type(
    State(state): State<AppState>,
    Json(fault): Json<FaultType>,
) -> AppResult<Json<FaultType>> {
    Ok(Json(catalog_service::save_fault_type(&state.db_pool, fault).await?))
}

pub async fn handle_delete_fault_type(
    State(state): State<AppState>,
    Path(fault_type_id): Path<String>,
) -> AppResult<Json<Value>> {
    catalog_service::delete_fault_type(&state.db_pool, &fault_type_id).await?;
    Ok(deleted())
}

// --- Directores de grupo ---

pub async fn handle_save_group_assignment(
    State(state): State<AppState>,
    Json(payload): Json<GroupAssignmentPayload>,
) -> AppResult<Json<Value>> {
    // Un director por curso: reasignar reemplaza al anterior
    catalog_service::save_group_assignment(&state.db_pool, &payload.course_id, &payload.teacher_id).await?;
    Ok(Json(json!({ "success": true })))
}

pub async fn handle_delete_group_assignment(
    State(state): State<AppState>,
    Path(course_id): Path<String>,
) -> AppResult<Json<Value>> {
    catalog_service::delete_group_assignment(&state.db_pool, &course_id).await?;
    Ok(deleted())
}

// --- Historial ---

pub async fn handle_clear_incidents(
    State(state): State<AppState>,
    Extension(CurrentUser(current)): Extension<CurrentUser>,
) -> AppResult<Json<Value>> {
    tracing::warn!("'{}' solicitó vaciar el historial de incidencias.", current.username);
    let removed = incident_service::clear_all_incidents(&state.db_pool).await?;
    Ok(Json(json!({ "success": true, "removed": removed })))
}
