// src/services/student_service.rs
use crate::{
    config::StudentDeleteMode,
    error::{AppError, AppResult},
    models::{
        id_or_new,
        student::{now_timestamp, Student, StudentRecord},
    },
    services::user_service,
};
use sqlx::SqlitePool;

const STUDENT_COLUMNS: &str = r#"
    id, document_id, document_type, course_id, photo_base64, first_name, last_name,
    birth_date, student_phone, student_address, guardian_name, guardian_phone,
    guardian_relationship, sibling_count, eps, rh_factor, medical_conditions,
    medical_formulation, failed_years, previous_school, transfer_reason,
    history_observations, favorite_subjects, difficult_subjects,
    free_time_activities, life_project, director_id, last_updated
"#;

pub async fn find_student_by_id(db_pool: &SqlitePool, student_id: &str) -> AppResult<Option<Student>> {
    let record = sqlx::query_as::<_, StudentRecord>(&format!(
        "SELECT {} FROM students WHERE id = ?",
        STUDENT_COLUMNS
    ))
    .bind(student_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(record.map(StudentRecord::into_domain))
}

/// Estudiantes más recientes primero.
pub async fn find_recent_students(db_pool: &SqlitePool, limit: i64) -> AppResult<Vec<Student>> {
    let students = sqlx::query_as::<_, StudentRecord>(&format!(
        "SELECT {} FROM students ORDER BY last_updated DESC LIMIT ?",
        STUDENT_COLUMNS
    ))
    .bind(limit)
    .fetch_all(db_pool)
    .await?
    .into_iter()
    .map(StudentRecord::into_domain)
    .collect();
    Ok(students)
}

/// Filtro por nombre completo (sin distinguir mayúsculas) o por documento.
pub fn matches_search(student: &Student, term: &str) -> bool {
    let term = term.trim();
    if term.is_empty() {
        return true;
    }
    student.full_name().to_lowercase().contains(&term.to_lowercase())
        || student.document_id.contains(term)
}

/// Guarda la ficha completa (upsert por id).
///
/// El director de grupo se resuelve a partir del curso y `last_updated` se
/// renueva en cada guardado.
pub async fn save_student(db_pool: &SqlitePool, student: Student) -> AppResult<Student> {
    student.validate().map_err(AppError::Validation)?;

    // 1. Normaliza id, documento y valores por defecto
    let mut student = student;
    student.id = id_or_new(&student.id);
    student.document_id = student.document_id.trim().to_string();
    if student.document_type.trim().is_empty() {
        student.document_type = crate::models::student::DEFAULT_DOCUMENT_TYPE.to_string();
    }
    if student.rh_factor.trim().is_empty() {
        student.rh_factor = crate::models::student::DEFAULT_RH_FACTOR.to_string();
    }
    // 2. Director de grupo del curso, si lo hay
    if let Some(director) = user_service::find_director_for_course(db_pool, &student.course_id).await? {
        tracing::debug!("Director '{}' asignado al estudiante {}", director.id, student.id);
        student.director_id = director.id;
    }
    student.last_updated = now_timestamp();

    // 3. Upsert de todas las columnas; documento repetido responde 409
    tracing::info!("Guardando estudiante {} ({})", student.full_name(), student.id);
    sqlx::query(
        r#"
        INSERT INTO students (
            id, document_id, document_type, course_id, photo_base64, first_name, last_name,
            birth_date, student_phone, student_address, guardian_name, guardian_phone,
            guardian_relationship, sibling_count, eps, rh_factor, medical_conditions,
            medical_formulation, failed_years, previous_school, transfer_reason,
            history_observations, favorite_subjects, difficult_subjects,
            free_time_activities, life_project, director_id, last_updated
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET
            document_id = excluded.document_id,
            document_type = excluded.document_type,
            course_id = excluded.course_id,
            photo_base64 = excluded.photo_base64,
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            birth_date = excluded.birth_date,
            student_phone = excluded.student_phone,
            student_address = excluded.student_address,
            guardian_name = excluded.guardian_name,
            guardian_phone = excluded.guardian_phone,
            guardian_relationship = excluded.guardian_relationship,
            sibling_count = excluded.sibling_count,
            eps = excluded.eps,
            rh_factor = excluded.rh_factor,
            medical_conditions = excluded.medical_conditions,
            medical_formulation = excluded.medical_formulation,
            failed_years = excluded.failed_years,
            previous_school = excluded.previous_school,
            transfer_reason = excluded.transfer_reason,
            history_observations = excluded.history_observations,
            favorite_subjects = excluded.favorite_subjects,
            difficult_subjects = excluded.difficult_subjects,
            free_time_activities = excluded.free_time_activities,
            life_project = excluded.life_project,
            director_id = excluded.director_id,
            last_updated = excluded.last_updated
        "#,
    )
    .bind(&student.id)
    .bind(&student.document_id)
    .bind(&student.document_type)
    .bind(&student.course_id)
    .bind(student.photo_base64.as_deref().unwrap_or(""))
    .bind(&student.first_name)
    .bind(&student.last_name)
    .bind(&student.birth_date)
    .bind(&student.student_phone)
    .bind(&student.student_address)
    .bind(&student.guardian_name)
    .bind(&student.guardian_phone)
    .bind(&student.guardian_relationship)
    .bind(student.sibling_count)
    .bind(&student.eps)
    .bind(&student.rh_factor)
    .bind(&student.medical_conditions)
    .bind(&student.medical_formulation)
    .bind(&student.failed_years)
    .bind(&student.previous_school)
    .bind(&student.transfer_reason)
    .bind(&student.history_observations)
    .bind(&student.favorite_subjects)
    .bind(&student.difficult_subjects)
    .bind(&student.free_time_activities)
    .bind(&student.life_project)
    .bind(&student.director_id)
    .bind(&student.last_updated)
    .execute(db_pool)
    .await
    .map_err(|e| AppError::from_write(e, "Ya existe un estudiante con ese documento."))?;

    Ok(student)
}

/// Borra al estudiante. En modo estricto borra también su historial de
/// incidencias en la misma transacción; devuelve cuántas se borraron.
pub async fn delete_student(
    db_pool: &SqlitePool,
    student_id: &str,
    mode: StudentDeleteMode,
) -> AppResult<u64> {
    let mut tx = db_pool.begin().await?;

    // 1. Historial del estudiante, sólo en modo estricto
    let removed_incidents = match mode {
        StudentDeleteMode::Strict => sqlx::query("DELETE FROM incidents WHERE student_id = ?")
            .bind(student_id)
            .execute(&mut *tx)
            .await?
            .rows_affected(),
        StudentDeleteMode::Lenient => 0,
    };

    // 2. La ficha
    let rows_affected = sqlx::query("DELETE FROM students WHERE id = ?")
        .bind(student_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    // Nada que borrar: se deshace también el paso 1
    if rows_affected == 0 {
        tx.rollback().await?;
        tracing::warn!("No se pudo borrar: estudiante '{}' no existe.", student_id);
        return Err(AppError::NotFound(format!("Estudiante '{}' no encontrado.", student_id)));
    }

    tx.commit().await?;
    tracing::info!(
        "✅ Estudiante '{}' borrado ({} incidencias eliminadas).",
        student_id,
        removed_incidents
    );
    Ok(removed_incidents)
}
