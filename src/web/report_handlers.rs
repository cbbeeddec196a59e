// src/web/report_handlers.rs
use crate::{
    error::{AppError, AppResult},
    report::{self, Document},
    services::{catalog_service, incident_service, student_service},
    state::AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

// Descarga como archivo; el nombre puede llevar tildes
fn attachment(document: &Document) -> AppResult<Response> {
    let html = document.render()?;
    let disposition = format!(
        "attachment; filename*=UTF-8''{}",
        urlencoding::encode(&document.file_name)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        html,
    )
        .into_response())
}

// GET /api/reports/incidents?start=YYYY-MM-DD&end=YYYY-MM-DD
pub async fn handle_date_range_report(
    State(state): State<AppState>,
    Query(range): Query<RangeQuery>,
) -> AppResult<Response> {
    // Rango con ambos extremos incluidos; vacío o invertido responde 400
    let incidents = incident_service::find_incidents_in_range(&state.db_pool, range.start, range.end).await?;
    let today = chrono::Local::now().date_naive();
    let document = report::date_range_report(&incidents, range.start, range.end, today)?;
    attachment(&document)
}

// GET /api/reports/students/{id}
pub async fn handle_student_record(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> AppResult<Response> {
    // 1. Ficha, historial y nombre del curso
    let student = student_service::find_student_by_id(&state.db_pool, &student_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Estudiante '{}' no encontrado.", student_id)))?;
    let incidents = incident_service::find_incidents_by_student(&state.db_pool, &student.id).await?;
    let course_name = catalog_service::find_course_by_id(&state.db_pool, &student.course_id)
        .await?
        .map(|c| c.name)
        .unwrap_or_default();

    // 2. Documento paginado y descarga
    tracing::info!("Generando ficha integral de '{}'", student.full_name());
    let document = report::student_record(&student, &incidents, &course_name);
    attachment(&document)
}
