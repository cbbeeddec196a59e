// src/models/mod.rs
pub mod course;
pub mod incident;
pub mod snapshot;
pub mod student;
pub mod teacher;
pub mod user;

/// Texto opcional de la base: NULL y cadenas en blanco quedan como `None`.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Texto de la base con valor por defecto cuando es NULL o vacío.
pub(crate) fn text_or(value: Option<String>, default: &str) -> String {
    non_blank(value).unwrap_or_else(|| default.to_string())
}

/// Id nuevo cuando el cliente no envía uno.
pub(crate) fn id_or_new(id: &str) -> String {
    let id = id.trim();
    if id.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        id.to_string()
    }
}
