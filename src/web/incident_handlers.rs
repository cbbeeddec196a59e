// src/web/incident_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::incident::Incident,
    services::{authz, incident_service, student_service},
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
#[serde(rename_all = "camelCase")]
pub struct IncidentQuery {
    #[serde(default)]
    pub q: String,
    pub student_id: Option<String>,
}

// GET /api/incidents?q=&studentId=
pub async fn handle_list_incidents(
    State(state): State<AppState>,
    Query(query): Query<IncidentQuery>,
) -> AppResult<Json<Vec<Incident>>> {
    // Con studentId: historial completo del estudiante; sin él, las más recientes
    let incidents = match query.student_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(student_id) => incident_service::find_incidents_by_student(&state.db_pool, student_id).await?,
        None => incident_service::find_recent_incidents(&state.db_pool, state.config.fetch_limit).await?,
    };

    // Filtro por nombre del estudiante
    Ok(Json(
        incidents
            .into_iter()
            .filter(|i| incident_service::matches_search(i, &query.q))
            .collect(),
    ))
}

// POST /api/incidents
pub async fn handle_save_incident(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(incident): Json<Incident>,
) -> AppResult<Json<Incident>> {
    // Registrar es libre; modificar una incidencia existente exige el mismo permiso que borrarla
    let incident_id = incident.id.trim();
    if !incident_id.is_empty() {
        if let Some(existing) = incident_service::find_incident_by_id(&state.db_pool, incident_id).await? {
            let student = student_service::find_student_by_id(&state.db_pool, &existing.student_id).await?;
            if !authz::can_edit_incident(&user, &existing, student.as_ref()) {
                tracing::warn!("'{}' no puede modificar la incidencia '{}'.", user.username, existing.id);
                return Err(AppError::Forbidden(
                    "Sólo el director de grupo o un administrador puede modificar esta incidencia.".to_string(),
                ));
            }
        }
    }

    // El autor lo fija el servicio a partir de la sesión
    let saved = incident_service::save_incident(&state.db_pool, incident, &user).await?;
    Ok(Json(saved))
}

// DELETE /api/incidents/{id}
pub async fn handle_delete_incident(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(incident_id): Path<String>,
) -> AppResult<Json<Value>> {
    // 1. La incidencia y, si aún existe, la ficha a la que apunta
    let incident = incident_service::find_incident_by_id(&state.db_pool, &incident_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Incidencia '{}' no encontrada.", incident_id)))?;
    let student = student_service::find_student_by_id(&state.db_pool, &incident.student_id).await?;

    // 2. Permisos: director del curso o administrador (huérfanas sólo administrador)
    if !authz::can_delete_incident(&user, &incident, student.as_ref()) {
        tracing::warn!("'{}' no puede borrar la incidencia '{}'.", user.username, incident_id);
        return Err(AppError::Forbidden(
            "Sólo el director de grupo o un administrador puede borrar esta incidencia.".to_string(),
        ));
    }

    // 3. Borrado
    incident_service::delete_incident(&state.db_pool, &incident_id).await?;
    Ok(Json(json!({ "success": true })))
}
