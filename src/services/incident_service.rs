// src/services/incident_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        id_or_new,
        incident::{Incident, IncidentRecord},
        user::User,
    },
    services::{catalog_service, student_service},
};
use chrono::NaiveDate;
use sqlx::SqlitePool;

const INCIDENT_COLUMNS: &str = r#"
    id, student_id, student_name, course_name, type, fault_type_id, date, follow_up,
    period, observation, evidence_base64, registered_by_teacher_id, registered_by_teacher_name
"#;

fn sql_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn into_domain(records: Vec<IncidentRecord>) -> Vec<Incident> {
    records.into_iter().map(IncidentRecord::into_domain).collect()
}

pub async fn find_incident_by_id(db_pool: &SqlitePool, incident_id: &str) -> AppResult<Option<Incident>> {
    let record = sqlx::query_as::<_, IncidentRecord>(&format!(
        "SELECT {} FROM incidents WHERE id = ?",
        INCIDENT_COLUMNS
    ))
    .bind(incident_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(record.map(IncidentRecord::into_domain))
}

/// Incidencias más recientes primero.
pub async fn find_recent_incidents(db_pool: &SqlitePool, limit: i64) -> AppResult<Vec<Incident>> {
    let sql = format!("SELECT {} FROM incidents ORDER BY date DESC, id ASC LIMIT ?", INCIDENT_COLUMNS);
    let records = sqlx::query_as::<_, IncidentRecord>(&sql)
        .bind(limit)
        .fetch_all(db_pool)
        .await?;
    Ok(into_domain(records))
}

/// Historial de un estudiante, en orden cronológico.
pub async fn find_incidents_by_student(db_pool: &SqlitePool, student_id: &str) -> AppResult<Vec<Incident>> {
    let sql = format!(
        "SELECT {} FROM incidents WHERE student_id = ? ORDER BY date ASC, id ASC",
        INCIDENT_COLUMNS
    );
    let records = sqlx::query_as::<_, IncidentRecord>(&sql)
        .bind(student_id)
        .fetch_all(db_pool)
        .await?;
    Ok(into_domain(records))
}

/// Incidencias entre `start` y `end`, ambas fechas incluidas.
pub async fn find_incidents_in_range(
    db_pool: &SqlitePool,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<Incident>> {
    let sql = format!(
        "SELECT {} FROM incidents WHERE date BETWEEN ? AND ? ORDER BY date ASC, id ASC",
        INCIDENT_COLUMNS
    );
    let records = sqlx::query_as::<_, IncidentRecord>(&sql)
        .bind(sql_date(start))
        .bind(sql_date(end))
        .fetch_all(db_pool)
        .await?;
    Ok(into_domain(records))
}

/// Búsqueda por nombre del estudiante (sin distinguir mayúsculas).
pub fn matches_search(incident: &Incident, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty() || incident.student_name.to_lowercase().contains(&term)
}

/// Registra o actualiza una incidencia.
///
/// Completa el nombre y curso del estudiante a partir de la ficha cuando el
/// cliente no los envía. El docente que registra nunca viene del cliente: en
/// una incidencia nueva es el usuario de la sesión y al actualizar se conserva
/// el del primer registro.
pub async fn save_incident(db_pool: &SqlitePool, incident: Incident, author: &User) -> AppResult<Incident> {
    let mut incident = incident;
    incident.normalize();
    incident.validate().map_err(AppError::Validation)?;
    incident.id = id_or_new(&incident.id);

    // Autor: el guardado, o el de la sesión si la incidencia es nueva
    match find_incident_by_id(db_pool, &incident.id).await? {
        Some(existing) => {
            incident.registered_by_teacher_id = existing.registered_by_teacher_id;
            incident.registered_by_teacher_name = existing.registered_by_teacher_name;
        }
        None => {
            incident.registered_by_teacher_id = author.id.clone();
            incident.registered_by_teacher_name = author.name.clone();
        }
    }

    // Copias del nombre y curso del estudiante
    if incident.student_name.trim().is_empty() || incident.course_name.trim().is_empty() {
        if let Some(student) = student_service::find_student_by_id(db_pool, &incident.student_id).await? {
            if incident.student_name.trim().is_empty() {
                incident.student_name = student.full_name();
            }
            if incident.course_name.trim().is_empty() {
                if let Some(course) = catalog_service::find_course_by_id(db_pool, &student.course_id).await? {
                    incident.course_name = course.name;
                }
            }
        }
    }

    tracing::info!(
        "Guardando incidencia {} ({}) del estudiante {}",
        incident.id,
        incident.kind.as_str(),
        incident.student_id
    );
    sqlx::query(
        r#"
        INSERT INTO incidents (
            id, student_id, student_name, course_name, type, fault_type_id, date, follow_up,
            period, observation, evidence_base64, registered_by_teacher_id, registered_by_teacher_name
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            student_id = excluded.student_id,
            student_name = excluded.student_name,
            course_name = excluded.course_name,
            type = excluded.type,
            fault_type_id = excluded.fault_type_id,
            date = excluded.date,
            follow_up = excluded.follow_up,
            period = excluded.period,
            observation = excluded.observation,
            evidence_base64 = excluded.evidence_base64,
            registered_by_teacher_id = excluded.registered_by_teacher_id,
            registered_by_teacher_name = excluded.registered_by_teacher_name
        "#,
    )
    .bind(&incident.id)
    .bind(&incident.student_id)
    .bind(&incident.student_name)
    .bind(&incident.course_name)
    .bind(incident.kind.as_str())
    .bind(&incident.fault_type_id)
    .bind(sql_date(incident.date))
    .bind(incident.follow_up as i64)
    .bind(incident.period.number().to_string())
    .bind(&incident.observation)
    .bind(&incident.evidence_base64)
    .bind(&incident.registered_by_teacher_id)
    .bind(&incident.registered_by_teacher_name)
    .execute(db_pool)
    .await?;

    Ok(incident)
}

pub async fn delete_incident(db_pool: &SqlitePool, incident_id: &str) -> AppResult<()> {
    let rows_affected = sqlx::query("DELETE FROM incidents WHERE id = ?")
        .bind(incident_id)
        .execute(db_pool)
        .await?
        .rows_affected();
    if rows_affected == 0 {
        tracing::warn!("No se pudo borrar: incidencia '{}' no existe.", incident_id);
        return Err(AppError::NotFound(format!("Incidencia '{}' no encontrada.", incident_id)));
    }
    tracing::info!("✅ Incidencia '{}' borrada.", incident_id);
    Ok(())
}

/// Vacía el historial completo. Devuelve cuántas incidencias se borraron.
pub async fn clear_all_incidents(db_pool: &SqlitePool) -> AppResult<u64> {
    let removed = sqlx::query("DELETE FROM incidents")
        .execute(db_pool)
        .await?
        .rows_affected();
    tracing::warn!("⚠️ Historial de incidencias vaciado ({} registros).", removed);
    Ok(removed)
}
