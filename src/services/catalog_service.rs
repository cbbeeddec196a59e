// src/services/catalog_service.rs
//! Docentes, cursos, tipos de falta y directores de grupo.
use crate::{
    error::{AppError, AppResult},
    models::{
        course::{
            Course, CourseRecord, FaultType, FaultTypeRecord, GroupAssignment,
            GroupAssignmentRecord,
        },
        id_or_new,
        teacher::{Teacher, TeacherRecord},
    },
};
use sqlx::SqlitePool;

// Borra por id en la tabla indicada; NotFound si no había nada
async fn delete_by_key(
    db_pool: &SqlitePool,
    table: &'static str,
    key_column: &'static str,
    key: &str,
    what: &str,
) -> AppResult<()> {
    let rows_affected = sqlx::query(&format!("DELETE FROM {} WHERE {} = ?", table, key_column))
        .bind(key)
        .execute(db_pool)
        .await?
        .rows_affected();
    if rows_affected == 0 {
        tracing::warn!("No se pudo borrar {} '{}': no existe.", what, key);
        return Err(AppError::NotFound(format!("{} '{}' no encontrado.", what, key)));
    }
    tracing::info!("✅ {} '{}' borrado.", what, key);
    Ok(())
}

// --- Docentes ---

pub async fn find_all_teachers(db_pool: &SqlitePool) -> AppResult<Vec<Teacher>> {
    Ok(sqlx::query_as::<_, TeacherRecord>("SELECT id, name, document_id FROM teachers ORDER BY name ASC")
        .fetch_all(db_pool)
        .await?
        .into_iter()
        .map(TeacherRecord::into_domain)
        .collect())
}

pub async fn save_teacher(db_pool: &SqlitePool, teacher: Teacher) -> AppResult<Teacher> {
    if teacher.name.trim().is_empty() {
        return Err(AppError::Validation("El nombre del docente es obligatorio.".to_string()));
    }
    let teacher = Teacher {
        id: id_or_new(&teacher.id),
        name: teacher.name.trim().to_string(),
        document_id: teacher.document_id.trim().to_string(),
    };
    // Documento vacío se guarda como NULL para no chocar con el UNIQUE
    let document = (!teacher.document_id.is_empty()).then_some(teacher.document_id.as_str());

    sqlx::query(
        r#"
        INSERT INTO teachers (id, name, document_id) VALUES (?, ?, ?)
        ON CONFLICT(id) DO UPDATE SET name = excluded.name, document_id = excluded.document_id
        "#,
    )
    .bind(&teacher.id)
    .bind(&teacher.name)
    .bind(document)
    .execute(db_pool)
    .await
    .map_err(|e| AppError::from_write(e, "Ya existe un docente con ese documento."))?;

    tracing::info!("Docente '{}' guardado.", teacher.id);
    Ok(teacher)
}

pub async fn delete_teacher(db_pool: &SqlitePool, teacher_id: &str) -> AppResult<()> {
    delete_by_key(db_pool, "teachers", "id", teacher_id, "Docente").await
}

// --- Cursos ---

pub async fn find_all_courses(db_pool: &SqlitePool) -> AppResult<Vec<Course>> {
    Ok(sqlx::query_as::<_, CourseRecord>("SELECT id, name FROM courses ORDER BY name ASC")
        .fetch_all(db_pool)
        .await?
        .into_iter()
        .map(CourseRecord::into_domain)
        .collect())
}

pub async fn find_course_by_id(db_pool: &SqlitePool, course_id: &str) -> AppResult<Option<Course>> {
    Ok(sqlx::query_as::<_, CourseRecord>("SELECT id, name FROM courses WHERE id = ?")
        .bind(course_id)
        .fetch_optional(db_pool)
        .await?
        .map(CourseRecord::into_domain))
}

pub async fn save_course(db_pool: &SqlitePool, course: Course) -> AppResult<Course> {
    let name = course.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("El nombre del curso es obligatorio.".to_string()));
    }
    let course = Course { id: id_or_new(&course.id), name };
    sqlx::query(
        "INSERT INTO courses (id, name) VALUES (?, ?) ON CONFLICT(id) DO UPDATE SET name = excluded.name",
    )
    .bind(&course.id)
    .bind(&course.name)
    .execute(db_pool)
    .await
    .map_err(|e| AppError::from_write(e, "Ya existe un curso con ese nombre."))?;

    tracing::info!("Curso '{}' guardado.", course.name);
    Ok(course)
}

pub async fn delete_course(db_pool: &SqlitePool, course_id: &str) -> AppResult<()> {
    delete_by_key(db_pool, "courses", "id", course_id, "Curso").await
}

// --- Tipos de falta ---

pub async fn find_all_fault_types(db_pool: &SqlitePool) -> AppResult<Vec<FaultType>> {
    Ok(sqlx::query_as::<_, FaultTypeRecord>("SELECT id, type FROM fault_types ORDER BY id ASC")
        .fetch_all(db_pool)
        .await?
        .into_iter()
        .map(FaultTypeRecord::into_domain)
        .collect())
}

pub async fn save_fault_type(db_pool: &SqlitePool, fault: FaultType) -> AppResult<FaultType> {
    let label = fault.label.trim().to_string();
    if label.is_empty() {
        return Err(AppError::Validation("El tipo de falta es obligatorio.".to_string()));
    }
    let fault = FaultType { id: id_or_new(&fault.id), label };
    sqlx::query(
        "INSERT INTO fault_types (id, type) VALUES (?, ?) ON CONFLICT(id) DO UPDATE SET type = excluded.type",
    )
    .bind(&fault.id)
    .bind(&fault.label)
    .execute(db_pool)
    .await?;
    Ok(fault)
}

pub async fn delete_fault_type(db_pool: &SqlitePool, fault_type_id: &str) -> AppResult<()> {
    delete_by_key(db_pool, "fault_types", "id", fault_type_id, "Tipo de falta").await
}

// --- Directores de grupo ---

pub async fn find_all_group_assignments(db_pool: &SqlitePool) -> AppResult<Vec<GroupAssignment>> {
    Ok(sqlx::query_as::<_, GroupAssignmentRecord>(
        r#"
        SELECT gd.course_id, gd.teacher_id, t.name AS teacher_name, c.name AS course_name
        FROM group_directors gd
        JOIN teachers t ON gd.teacher_id = t.id
        JOIN courses c ON gd.course_id = c.id
        ORDER BY c.name ASC
        "#,
    )
    .fetch_all(db_pool)
    .await?
    .into_iter()
    .map(GroupAssignmentRecord::into_domain)
    .collect())
}

/// Asigna (o reasigna) el director de un curso.
pub async fn save_group_assignment(
    db_pool: &SqlitePool,
    course_id: &str,
    teacher_id: &str,
) -> AppResult<()> {
    if course_id.trim().is_empty() || teacher_id.trim().is_empty() {
        return Err(AppError::Validation("Curso y docente son obligatorios.".to_string()));
    }
    sqlx::query(
        r#"
        INSERT INTO group_directors (course_id, teacher_id) VALUES (?, ?)
        ON CONFLICT(course_id) DO UPDATE SET teacher_id = excluded.teacher_id
        "#,
    )
    .bind(course_id)
    .bind(teacher_id)
    .execute(db_pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            AppError::Validation("El curso o el docente no existen.".to_string())
        }
        _ => AppError::SqlxError(e),
    })?;
    tracing::info!("Curso '{}' asignado al docente '{}'.", course_id, teacher_id);
    Ok(())
}

pub async fn delete_group_assignment(db_pool: &SqlitePool, course_id: &str) -> AppResult<()> {
    delete_by_key(db_pool, "group_directors", "course_id", course_id, "Asignación").await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db,
        services::{auth_service::MIN_BCRYPT_COST, schema_service},
    };

    async fn seeded_pool() -> SqlitePool {
        let pool = db::connect_in_memory().await.unwrap();
        schema_service::setup(&pool, MIN_BCRYPT_COST).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn course_upsert_renames_in_place() {
        let pool = seeded_pool().await;
        save_course(&pool, Course { id: "c1".into(), name: "1001A".into() }).await.unwrap();
        let courses = find_all_courses(&pool).await.unwrap();
        assert_eq!(courses.len(), 4);
        assert!(courses.iter().any(|c| c.id == "c1" && c.name == "1001A"));

        let dup = save_course(&pool, Course { id: "".into(), name: "1002".into() }).await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn group_assignment_joins_names_and_reassigns() {
        let pool = seeded_pool().await;
        save_group_assignment(&pool, "c1", "t1").await.unwrap();
        save_group_assignment(&pool, "c1", "t2").await.unwrap();

        let assignments = find_all_group_assignments(&pool).await.unwrap();
        assert_eq!(assignments.len(), 1);
        assert_eq!(assignments[0].teacher_name, "María Rodríguez");
        assert_eq!(assignments[0].course_name, "1001");

        let missing = save_group_assignment(&pool, "c1", "t99").await;
        assert!(matches!(missing, Err(AppError::Validation(_))));

        delete_group_assignment(&pool, "c1").await.unwrap();
        assert!(matches!(
            delete_group_assignment(&pool, "c1").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn teachers_without_document_do_not_collide() {
        let pool = seeded_pool().await;
        for name in ["Ana", "Luis"] {
            save_teacher(&pool, Teacher { id: String::new(), name: name.into(), document_id: String::new() })
                .await
                .unwrap();
        }
        assert_eq!(find_all_teachers(&pool).await.unwrap().len(), 5);

        let fault = save_fault_type(&pool, FaultType { id: "f5".into(), label: "Tipo IV".into() })
            .await
            .unwrap();
        assert_eq!(fault.label, "Tipo IV");
        delete_fault_type(&pool, "f5").await.unwrap();
        assert_eq!(find_all_fault_types(&pool).await.unwrap().len(), 4);
    }
}
