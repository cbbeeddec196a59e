// src/web/mw_auth.rs
use crate::{
    error::AppError,
    models::user::User,
    services::{schema_service, user_service},
    state::AppState,
};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tower_sessions::Session;

pub const SESSION_USER_KEY: &str = "user_id";

/// Usuario de la sesión, disponible en las extensiones de la petición.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Exige sesión iniciada y carga al usuario.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user_id = session
        .get::<String>(SESSION_USER_KEY)
        .await
        .map_err(|e| {
            tracing::error!("Autenticación MW: error al leer la sesión: {:?}", e);
            AppError::SessionError(format!("Error al verificar la sesión: {}", e))
        })?
        .ok_or_else(|| {
            tracing::debug!("Autenticación MW: petición sin sesión.");
            AppError::Unauthorized
        })?;

    let found = match user_service::find_user_by_id(&state.db_pool, &user_id).await {
        Ok(found) => found,
        Err(e) => {
            // Sin tablas todavía: el cliente debe reintentar, no volver a iniciar sesión
            if !schema_service::is_initialized(&state.db_pool).await.unwrap_or(true) {
                return Err(AppError::SystemInitializing);
            }
            return Err(e);
        }
    };

    // La cuenta pudo haberse borrado con la sesión abierta
    let Some(user) = found else {
        tracing::warn!("Autenticación MW: usuario '{}' de la sesión ya no existe.", user_id);
        session.flush().await.map_err(|e| AppError::SessionError(e.to_string()))?;
        return Err(AppError::Unauthorized);
    };

    tracing::debug!("Autenticación MW: '{}' autenticado.", user.username);
    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
