// src/services/user_service.rs
use crate::{
    error::{AppError, AppResult},
    models::{
        id_or_new, non_blank,
        user::{Role, User, UserPayload, UserRecord},
    },
    services::auth_service,
};
use sqlx::SqlitePool;

/// Contraseña asignada a un usuario nuevo creado sin contraseña.
pub const DEFAULT_NEW_USER_PASSWORD: &str = "123";

const USER_COLUMNS: &str = "id, username, role, name, course_id";

/// Busca un usuario por su id.
pub async fn find_user_by_id(db_pool: &SqlitePool, user_id: &str) -> AppResult<Option<User>> {
    tracing::debug!("Buscando usuario por id: {}", user_id);
    let record = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {} FROM users WHERE id = ?",
        USER_COLUMNS
    ))
    .bind(user_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(record.map(UserRecord::into_domain))
}

/// Todos los usuarios, sin contraseñas.
pub async fn find_all_users(db_pool: &SqlitePool) -> AppResult<Vec<User>> {
    let users = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {} FROM users ORDER BY name ASC",
        USER_COLUMNS
    ))
    .fetch_all(db_pool)
    .await?
    .into_iter()
    .map(UserRecord::into_domain)
    .collect::<Vec<_>>();
    tracing::debug!("Encontrados {} usuarios.", users.len());
    Ok(users)
}

/// Docente director de grupo del curso, si hay alguno.
pub async fn find_director_for_course(
    db_pool: &SqlitePool,
    course_id: &str,
) -> AppResult<Option<User>> {
    if course_id.trim().is_empty() {
        return Ok(None);
    }
    let record = sqlx::query_as::<_, UserRecord>(&format!(
        "SELECT {} FROM users WHERE role = 'TEACHER' AND course_id = ? ORDER BY id LIMIT 1",
        USER_COLUMNS
    ))
    .bind(course_id)
    .fetch_optional(db_pool)
    .await?;
    Ok(record.map(UserRecord::into_domain))
}

/// Crea o actualiza un usuario (upsert por id).
///
/// En una edición sin contraseña se conserva el hash actual.
pub async fn save_user(db_pool: &SqlitePool, payload: UserPayload, bcrypt_cost: u32) -> AppResult<User> {
    let username = payload.username.trim().to_string();
    let name = payload.name.trim().to_string();
    if username.is_empty() || name.is_empty() {
        return Err(AppError::Validation(
            "Nombre y usuario son obligatorios.".to_string(),
        ));
    }

    let id = id_or_new(&payload.id);
    // Sólo un docente puede ser director de grupo
    let course_id = match payload.role {
        Role::Teacher => non_blank(payload.course_id),
        Role::Admin => None,
    };

    let new_password = non_blank(payload.password);
    let replace_password = new_password.is_some();
    let raw_password = new_password.unwrap_or_else(|| DEFAULT_NEW_USER_PASSWORD.to_string());
    let password_hash = auth_service::hash_password(&raw_password, bcrypt_cost).await?;

    tracing::info!("Guardando usuario '{}' ({})", username, id);
    sqlx::query(
        r#"
        INSERT INTO users (id, username, password_hash, role, name, course_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(id) DO UPDATE SET
            username = excluded.username,
            role = excluded.role,
            name = excluded.name,
            course_id = excluded.course_id,
            password_hash = CASE WHEN ?7 THEN excluded.password_hash ELSE users.password_hash END
        "#,
    )
    .bind(&id)
    .bind(&username)
    .bind(&password_hash)
    .bind(payload.role.as_str())
    .bind(&name)
    .bind(&course_id)
    .bind(replace_password)
    .execute(db_pool)
    .await
    .map_err(|e| AppError::from_write(e, "El nombre de usuario ya existe."))?;

    Ok(User {
        id,
        username,
        role: payload.role,
        name,
        course_id,
    })
}

pub async fn delete_user(db_pool: &SqlitePool, user_id: &str) -> AppResult<()> {
    let rows_affected = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(db_pool)
        .await?
        .rows_affected();

    if rows_affected == 0 {
        tracing::warn!("No se pudo borrar: usuario '{}' no existe.", user_id);
        return Err(AppError::NotFound(format!("Usuario '{}' no encontrado.", user_id)));
    }
    tracing::info!("✅ Usuario '{}' borrado.", user_id);
    Ok(())
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

    fn teacher_payload(id: &str, username: &str, password: Option<&str>) -> UserPayload {
        UserPayload {
            id: id.to_string(),
            username: username.to_string(),
            password: password.map(str::to_string),
            role: Role::Teacher,
            name: "María Rodríguez".to_string(),
            course_id: Some("c2".to_string()),
        }
    }

    #[tokio::test]
    async fn edit_without_password_keeps_the_old_one() {
        let pool = seeded_pool().await;
        save_user(&pool, teacher_payload("u2", "maria", Some("clave")), MIN_BCRYPT_COST)
            .await
            .unwrap();
        let mut edit = teacher_payload("u2", "maria.r", None);
        edit.name = "María R.".to_string();
        save_user(&pool, edit, MIN_BCRYPT_COST).await.unwrap();

        let logged = auth_service::login(&pool, "maria.r", "clave", None).await.unwrap();
        assert_eq!(logged.map(|u| u.name), Some("María R.".to_string()));
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&pool).await.unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn new_user_without_password_gets_default() {
        let pool = seeded_pool().await;
        let saved = save_user(&pool, teacher_payload("", "nuevo", None), MIN_BCRYPT_COST)
            .await
            .unwrap();
        assert!(!saved.id.is_empty());
        let logged = auth_service::login(&pool, "nuevo", DEFAULT_NEW_USER_PASSWORD, None)
            .await
            .unwrap();
        assert!(logged.is_some());
    }

    #[tokio::test]
    async fn duplicate_username_is_a_conflict() {
        let pool = seeded_pool().await;
        let err = save_user(&pool, teacher_payload("u9", "admin", None), MIN_BCRYPT_COST)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn admin_never_keeps_a_course_and_director_lookup_works() {
        let pool = seeded_pool().await;
        let mut admin = teacher_payload("u3", "jefe", None);
        admin.role = Role::Admin;
        let saved = save_user(&pool, admin, MIN_BCRYPT_COST).await.unwrap();
        assert!(saved.course_id.is_none());

        save_user(&pool, teacher_payload("u2", "maria", None), MIN_BCRYPT_COST)
            .await
            .unwrap();
        let director = find_director_for_course(&pool, "c2").await.unwrap();
        assert_eq!(director.map(|u| u.id), Some("u2".to_string()));
        assert!(find_director_for_course(&pool, "c1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_missing_user_is_not_found() {
        let pool = seeded_pool().await;
        assert!(matches!(delete_user(&pool, "zz").await, Err(AppError::NotFound(_))));
        delete_user(&pool, "u1").await.unwrap();
        assert!(find_user_by_id(&pool, "u1").await.unwrap().is_none());
    }
}
