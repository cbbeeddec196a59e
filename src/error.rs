// src/error.rs
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Error en la base de datos: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Error de configuración: {0}")]
    ConfigError(#[from] ConfigError),

    #[error("Error al procesar la contraseña")]
    PasswordHashingError,

    #[error("Credenciales inválidas")]
    InvalidCredentials,

    #[error("Error en la sesión: {0}")]
    SessionError(String),

    // Tablas aún no creadas
    #[error("El sistema se está inicializando")]
    SystemInitializing,

    #[error("Datos inválidos: {0}")]
    Validation(String),

    #[error("Conflicto: {0}")]
    Conflict(String),

    #[error("No encontrado: {0}")]
    NotFound(String),

    #[error("Sesión requerida")]
    Unauthorized,

    #[error("Acción no permitida: {0}")]
    Forbidden(String),

    #[error("Error interno inesperado")]
    InternalServerError,
}

impl AppError {
    /// Convierte una violación de UNIQUE en `Conflict`; el resto queda como error de base de datos.
    pub fn from_write(err: sqlx::Error, conflict_message: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(conflict_message.to_string())
            }
            _ => AppError::SqlxError(err),
        }
    }
}

// Convierte AppError en una respuesta HTTP con cuerpo JSON
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        tracing::error!("Error procesado: {:?}", self);

        let (status, user_message) = match &self {
            AppError::SqlxError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error al acceder a los datos.".to_string(),
            ),
            AppError::ConfigError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error de configuración.".to_string(),
            ),
            AppError::PasswordHashingError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error al procesar credenciales.".to_string(),
            ),
            // Mensaje genérico, no revela si el usuario existe
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Credenciales inválidas".to_string())
            }
            AppError::SessionError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Error en la gestión de la sesión.".to_string(),
            ),
            AppError::SystemInitializing => (
                StatusCode::SERVICE_UNAVAILABLE,
                "El sistema se está inicializando. Por favor, espere unos segundos.".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "Debe iniciar sesión.".to_string())
            }
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Ocurrió un error inesperado.".to_string(),
            ),
        };

        (status, Json(json!({ "error": user_message }))).into_response()
    }
}

// Tipo Result estándar de la aplicación
pub type AppResult<T = ()> = Result<T, AppError>;
