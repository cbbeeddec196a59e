// src/services/data_service.rs
use crate::{
    error::AppResult,
    models::snapshot::{AllData, DashboardStats},
    services::{catalog_service, incident_service, student_service, user_service},
};
use sqlx::SqlitePool;

/// Lee todas las colecciones a la vez. Estudiantes e incidencias se limitan
/// a las `limit` más recientes.
pub async fn get_all_data(db_pool: &SqlitePool, limit: i64) -> AppResult<AllData> {
    tracing::debug!("Cargando datos completos (límite {})", limit);
    // Consultas en paralelo sobre el pool; el primer error cancela el resto
    let (users, teachers, courses, fault_types, group_assignments, students, incidents) = tokio::try_join!(
        user_service::find_all_users(db_pool),
        catalog_service::find_all_teachers(db_pool),
        catalog_service::find_all_courses(db_pool),
        catalog_service::find_all_fault_types(db_pool),
        catalog_service::find_all_group_assignments(db_pool),
        student_service::find_recent_students(db_pool, limit),
        incident_service::find_recent_incidents(db_pool, limit),
    )?;

    Ok(AllData {
        users,
        teachers,
        courses,
        fault_types,
        students,
        incidents,
        group_assignments,
    })
}

pub async fn dashboard(db_pool: &SqlitePool, limit: i64) -> AppResult<DashboardStats> {
    // Mismo corte que devuelve /api/data
    let data = get_all_data(db_pool, limit).await?;
    Ok(DashboardStats::from_data(&data))
}
