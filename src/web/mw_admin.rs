// src/web/mw_admin.rs
use crate::{error::AppError, web::mw_auth::CurrentUser};
use axum::{extract::Request, middleware::Next, response::Response, Extension};

/// Sólo administradores. Debe ir después de `require_auth`.
pub async fn require_admin(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !user.is_admin() {
        tracing::warn!("Admin MW: acceso denegado para '{}'.", user.username);
        return Err(AppError::Forbidden(
            "Sólo un administrador puede realizar esta acción.".to_string(),
        ));
    }
    tracing::debug!("Admin MW: acceso concedido para '{}'.", user.username);
    Ok(next.run(request).await)
}
