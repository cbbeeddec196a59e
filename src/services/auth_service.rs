// src/services/auth_service.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{CredentialsRecord, User},
};
use sqlx::SqlitePool;

/// Costo mínimo que acepta bcrypt (útil en tests).
pub const MIN_BCRYPT_COST: u32 = 4;

/// Verifica si la contraseña coincide con el hash guardado.
pub async fn verify_password(password: &str, stored_hash: &str) -> AppResult<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Verificando hash bcrypt...");
        bcrypt::verify(&password, &stored_hash)
    })
    .await
    .map_err(|e| {
        tracing::error!("Error en la tarea spawn_blocking (verify_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Error bcrypt al verificar contraseña: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Genera un hash bcrypt.
pub async fn hash_password(password: &str, cost: u32) -> AppResult<String> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || {
        tracing::debug!("Generando hash bcrypt...");
        bcrypt::hash(&password, cost)
    })
    .await
    .map_err(|e| {
        tracing::error!("Error en la tarea spawn_blocking (hash_password): {:?}", e);
        AppError::InternalServerError
    })?
    .map_err(|e| {
        tracing::error!("Error bcrypt al generar hash: {:?}", e);
        AppError::PasswordHashingError
    })
}

/// Valida usuario y contraseña.
///
/// Acepta la contraseña guardada o, si está configurada, la contraseña
/// maestra heredada, que abre cualquier cuenta existente.
pub async fn login(
    db_pool: &SqlitePool,
    username: &str,
    password: &str,
    master_password: Option<&str>,
) -> AppResult<Option<User>> {
    let record = sqlx::query_as::<_, CredentialsRecord>(
        "SELECT id, username, role, name, course_id, password_hash FROM users WHERE username = ?",
    )
    .bind(username.trim())
    .fetch_optional(db_pool)
    .await?;

    let Some(record) = record else {
        tracing::debug!("Usuario '{}' no encontrado.", username);
        return Ok(None);
    };
    let (user, stored_hash) = record.split();

    // FIXME: contraseña maestra heredada; se mantiene hasta aclarar si debe existir
    if let Some(master) = master_password {
        if !master.is_empty() && password == master {
            tracing::warn!("⚠️ Acceso de '{}' con la contraseña maestra.", user.username);
            return Ok(Some(user));
        }
    }

    let Some(stored_hash) = stored_hash.filter(|h| !h.is_empty()) else {
        tracing::warn!("Usuario '{}' sin contraseña guardada.", user.username);
        return Ok(None);
    };

    if verify_password(password, &stored_hash).await? {
        Ok(Some(user))
    } else {
        tracing::debug!("Contraseña incorrecta para '{}'.", user.username);
        Ok(None)
    }
}
