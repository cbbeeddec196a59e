// src/web/auth_handlers.rs
use crate::{
    error::{AppError, AppResult},
    models::user::{LoginForm, User},
    services::{auth_service, schema_service},
    state::AppState,
    web::mw_auth::{CurrentUser, SESSION_USER_KEY},
};
use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};
use tower_sessions::Session;

// POST /api/auth
pub async fn handle_login(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<LoginForm>,
) -> AppResult<Json<User>> {
    tracing::info!("Intento de inicio de sesión para '{}'", form.username);

    // 1. Sin tablas no hay usuarios contra los que comparar
    if !schema_service::is_initialized(&state.db_pool).await? {
        tracing::warn!("Inicio de sesión rechazado: esquema aún no creado.");
        return Err(AppError::SystemInitializing);
    }

    // 2. Verifica la contraseña (bcrypt o contraseña maestra)
    let user = auth_service::login(
        &state.db_pool,
        &form.username,
        &form.password,
        state.config.master_password.as_deref(),
    )
    .await?
    .ok_or_else(|| {
        tracing::warn!("Credenciales inválidas para '{}'", form.username);
        AppError::InvalidCredentials
    })?;

    // 3. Nuevo id de sesión antes de guardar el usuario
    session
        .cycle_id()
        .await
        .map_err(|e| AppError::SessionError(format!("No se pudo renovar la sesión: {}", e)))?;
    session
        .insert(SESSION_USER_KEY, &user.id)
        .await
        .map_err(|e| AppError::SessionError(format!("No se pudo guardar la sesión: {}", e)))?;

    tracing::info!("✅ Sesión iniciada para '{}' ({})", user.username, user.role.as_str());
    Ok(Json(user))
}

// POST /api/auth/logout
pub async fn handle_logout(session: Session) -> AppResult<Json<Value>> {
    // Sólo para el log
    let user_id: Option<String> = session.get(SESSION_USER_KEY).await.ok().flatten();

    // Borra la sesión del almacén e invalida la cookie
    session
        .delete()
        .await
        .map_err(|e| AppError::SessionError(format!("No se pudo cerrar la sesión: {}", e)))?;

    match user_id {
        Some(id) => tracing::info!("🚪 Usuario '{}' cerró sesión.", id),
        None => tracing::info!("🚪 Sesión anónima cerrada."),
    }
    Ok(Json(json!({ "success": true })))
}

// GET /api/auth/me
pub async fn handle_me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<User> {
    Json(user)
}
