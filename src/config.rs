// src/config.rs
//! Configuración de la aplicación, leída de variables de entorno al arrancar.
//!
//! El `.env` de desarrollo lo carga `main` con `dotenvy` antes de leerla.

use std::net::SocketAddr;

/// Fallos al leer la configuración.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Falta la variable de entorno {0}")]
    MissingVar(String),
    #[error("Valor inválido para la variable de entorno {0}: {1}")]
    InvalidValue(String, String),
}

/// Qué hacer con las incidencias de un estudiante al borrarlo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentDeleteMode {
    /// Borra también las incidencias del estudiante (esquema estricto).
    Strict,
    /// Deja las incidencias huérfanas (esquema permisivo).
    Lenient,
}

impl std::str::FromStr for StudentDeleteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" | "cascade" => Ok(Self::Strict),
            "lenient" | "orphan" => Ok(Self::Lenient),
            other => Err(format!("'{}' no es 'strict' ni 'lenient'", other)),
        }
    }
}

pub const DEFAULT_MASTER_PASSWORD: &str = "1122";
pub const DEFAULT_FETCH_LIMIT: i64 = 200;
pub const MAX_FETCH_LIMIT: i64 = 500;
/// Fotos y evidencias viajan en base64 dentro del JSON.
pub const DEFAULT_MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    /// Contraseña universal heredada del sistema anterior. `None` la desactiva.
    pub master_password: Option<String>,
    /// Tope de filas por colección en la lectura completa.
    pub fetch_limit: i64,
    pub delete_mode: StudentDeleteMode,
    pub bcrypt_cost: u32,
    pub session_secure: bool,
    /// Tamaño máximo del cuerpo al guardar fichas e incidencias.
    pub max_body_bytes: usize,
}

impl Config {
    /// Configuración con los valores por defecto para una URL de base de datos.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            database_url: database_url.into(),
            master_password: Some(DEFAULT_MASTER_PASSWORD.to_string()),
            fetch_limit: DEFAULT_FETCH_LIMIT,
            delete_mode: StudentDeleteMode::Strict,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            session_secure: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Lee la configuración del entorno.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
        let mut config = Config::new(database_url);

        if let Ok(raw) = std::env::var("BIND_ADDRESS") {
            config.bind_address = raw.parse::<SocketAddr>().map_err(|e| {
                ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
            })?;
        }

        // Vacío desactiva la contraseña maestra
        if let Ok(raw) = std::env::var("MASTER_PASSWORD") {
            config.master_password = if raw.is_empty() { None } else { Some(raw) };
        }

        if let Ok(raw) = std::env::var("FETCH_LIMIT") {
            let limit = raw.trim().parse::<i64>().map_err(|e| {
                ConfigError::InvalidValue("FETCH_LIMIT".to_string(), e.to_string())
            })?;
            config.fetch_limit = limit.clamp(1, MAX_FETCH_LIMIT);
        }

        if let Ok(raw) = std::env::var("STUDENT_DELETE_MODE") {
            config.delete_mode = raw
                .parse()
                .map_err(|e| ConfigError::InvalidValue("STUDENT_DELETE_MODE".to_string(), e))?;
        }

        if let Ok(raw) = std::env::var("BCRYPT_COST") {
            config.bcrypt_cost = raw.trim().parse::<u32>().map_err(|e| {
                ConfigError::InvalidValue("BCRYPT_COST".to_string(), e.to_string())
            })?;
        }

        if let Ok(raw) = std::env::var("SESSION_SECURE") {
            config.session_secure = matches!(raw.trim(), "1" | "true" | "TRUE" | "yes");
        }

        if let Ok(raw) = std::env::var("MAX_BODY_BYTES") {
            config.max_body_bytes = raw.trim().parse::<usize>().map_err(|e| {
                ConfigError::InvalidValue("MAX_BODY_BYTES".to_string(), e.to_string())
            })?;
        }

        Ok(config)
    }
}
