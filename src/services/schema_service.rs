// src/services/schema_service.rs
use crate::{error::AppResult, services::auth_service};
use sqlx::SqlitePool;

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT UNIQUE,
        password_hash TEXT,
        role TEXT,
        name TEXT,
        course_id TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS teachers (
        id TEXT PRIMARY KEY,
        name TEXT,
        document_id TEXT UNIQUE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS courses (
        id TEXT PRIMARY KEY,
        name TEXT UNIQUE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS fault_types (
        id TEXT PRIMARY KEY,
        type TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS group_directors (
        course_id TEXT PRIMARY KEY,
        teacher_id TEXT,
        FOREIGN KEY(course_id) REFERENCES courses(id) ON DELETE CASCADE,
        FOREIGN KEY(teacher_id) REFERENCES teachers(id) ON DELETE CASCADE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS students (
        id TEXT PRIMARY KEY, document_id TEXT UNIQUE, document_type TEXT, course_id TEXT,
        photo_base64 TEXT, first_name TEXT, last_name TEXT, birth_date TEXT,
        student_phone TEXT, student_address TEXT, guardian_name TEXT, guardian_phone TEXT,
        guardian_relationship TEXT, sibling_count INTEGER, eps TEXT, rh_factor TEXT,
        medical_conditions TEXT, medical_formulation TEXT, failed_years TEXT,
        previous_school TEXT, transfer_reason TEXT, history_observations TEXT,
        favorite_subjects TEXT, difficult_subjects TEXT, free_time_activities TEXT,
        life_project TEXT, director_id TEXT, last_updated TEXT
    )"#,
    // student_id sin FOREIGN KEY: las incidencias huérfanas se toleran
    r#"CREATE TABLE IF NOT EXISTS incidents (
        id TEXT PRIMARY KEY, student_id TEXT, student_name TEXT, course_name TEXT,
        type TEXT, fault_type_id TEXT, date TEXT, follow_up INTEGER, period TEXT,
        observation TEXT, evidence_base64 TEXT, registered_by_teacher_id TEXT,
        registered_by_teacher_name TEXT
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_students_last_updated ON students(last_updated)",
    "CREATE INDEX IF NOT EXISTS idx_incidents_date ON incidents(date)",
    "CREATE INDEX IF NOT EXISTS idx_incidents_student ON incidents(student_id)",
];

const SEED_ADMIN_ID: &str = "u1";
const SEED_ADMIN_USERNAME: &str = "admin";
const SEED_ADMIN_PASSWORD: &str = "1122";
const SEED_ADMIN_NAME: &str = "Administrador General";

const SEED_TEACHERS: &[(&str, &str, &str)] = &[
    ("t1", "Juan Pérez", "1010"),
    ("t2", "María Rodríguez", "2020"),
    ("t3", "Andrés Mendoza", "3030"),
];

const SEED_COURSES: &[(&str, &str)] = &[("c1", "1001"), ("c2", "1002"), ("c3", "1101"), ("c4", "1102")];

const SEED_FAULT_TYPES: &[(&str, &str)] = &[
    ("f1", "Falta Tipo I"),
    ("f2", "Falta Tipo II"),
    ("f3", "Falta Tipo III"),
    ("f4", "Observación"),
];

/// ¿Existe ya la tabla de usuarios?
pub async fn is_initialized(db_pool: &SqlitePool) -> AppResult<bool> {
    let found: Option<String> = sqlx::query_scalar(
        "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'users'",
    )
    .fetch_optional(db_pool)
    .await?;
    Ok(found.is_some())
}

/// Crea las tablas y los datos semilla. Se puede ejecutar cuantas veces se quiera.
pub async fn setup(db_pool: &SqlitePool, bcrypt_cost: u32) -> AppResult<String> {
    tracing::info!("Sincronizando esquema de la base de datos...");

    // 1. Tablas
    let mut tx = db_pool.begin().await?;
    for statement in SCHEMA {
        sqlx::query(statement).execute(&mut *tx).await?;
    }

    // 2. Catálogos iniciales; INSERT OR IGNORE no pisa lo ya editado
    for &(id, name, document) in SEED_TEACHERS {
        sqlx::query("INSERT OR IGNORE INTO teachers (id, name, document_id) VALUES (?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(document)
            .execute(&mut *tx)
            .await?;
    }
    for &(id, name) in SEED_COURSES {
        sqlx::query("INSERT OR IGNORE INTO courses (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(&mut *tx)
            .await?;
    }
    for &(id, label) in SEED_FAULT_TYPES {
        sqlx::query("INSERT OR IGNORE INTO fault_types (id, type) VALUES (?, ?)")
            .bind(id)
            .bind(label)
            .execute(&mut *tx)
            .await?;
    }

    // El hash sólo se calcula si el administrador aún no existe
    let admin_exists: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?")
        .bind(SEED_ADMIN_ID)
        .fetch_one(&mut *tx)
        .await?;
    tx.commit().await?;

    if admin_exists == 0 {
        let hash = auth_service::hash_password(SEED_ADMIN_PASSWORD, bcrypt_cost).await?;
        sqlx::query(
            "INSERT OR IGNORE INTO users (id, username, password_hash, role, name) VALUES (?, ?, ?, 'ADMIN', ?)",
        )
        .bind(SEED_ADMIN_ID)
        .bind(SEED_ADMIN_USERNAME)
        .bind(hash)
        .bind(SEED_ADMIN_NAME)
        .execute(db_pool)
        .await?;
        tracing::info!("Usuario administrador inicial creado.");
    }

    tracing::info!("✅ Esquema sincronizado.");
    Ok("Tablas e índices sincronizados correctamente, incluyendo docentes.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    #[tokio::test]
    async fn setup_is_idempotent() {
        let pool = db::connect_in_memory().await.unwrap();
        assert!(!is_initialized(&pool).await.unwrap());

        setup(&pool, auth_service::MIN_BCRYPT_COST).await.unwrap();
        setup(&pool, auth_service::MIN_BCRYPT_COST).await.unwrap();
        assert!(is_initialized(&pool).await.unwrap());

        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&pool).await.unwrap();
        let courses: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses").fetch_one(&pool).await.unwrap();
        let faults: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM fault_types").fetch_one(&pool).await.unwrap();
        let teachers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM teachers").fetch_one(&pool).await.unwrap();
        assert_eq!((users, teachers, courses, faults), (1, 3, 4, 4));
    }

    #[tokio::test]
    async fn seeded_admin_password_is_hashed() {
        let pool = db::connect_in_memory().await.unwrap();
        setup(&pool, auth_service::MIN_BCRYPT_COST).await.unwrap();
        let hash: String = sqlx::query_scalar("SELECT password_hash FROM users WHERE username = 'admin'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_ne!(hash, "1122");
        assert!(bcrypt::verify("1122", &hash).unwrap());
    }
}
