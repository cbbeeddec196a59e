// src/models/user.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::non_blank;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Teacher => "TEACHER",
        }
    }

    // Cualquier valor desconocido se trata como docente (el rol con menos permisos)
    pub fn from_db(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("ADMIN") {
            Role::Admin
        } else {
            Role::Teacher
        }
    }
}

/// Usuario tal como se expone: nunca lleva la contraseña.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub name: String,
    /// Curso del que el docente es director de grupo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_id: Option<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Docente director del curso indicado.
    pub fn directs_course(&self, course_id: &str) -> bool {
        self.role == Role::Teacher
            && !course_id.is_empty()
            && self.course_id.as_deref() == Some(course_id)
    }
}

// Fila de la tabla `users` sin el hash
#[derive(Debug, Clone, FromRow)]
pub struct UserRecord {
    pub id: String,
    pub username: Option<String>,
    pub role: Option<String>,
    pub name: Option<String>,
    pub course_id: Option<String>,
}

impl UserRecord {
    pub fn into_domain(self) -> User {
        User {
            id: self.id,
            username: self.username.unwrap_or_default(),
            role: Role::from_db(self.role.as_deref().unwrap_or_default()),
            name: self.name.unwrap_or_default(),
            course_id: non_blank(self.course_id),
        }
    }
}

// Fila usada sólo para verificar el login
#[derive(Debug, Clone, FromRow)]
pub struct CredentialsRecord {
    pub id: String,
    pub username: Option<String>,
    pub role: Option<String>,
    pub name: Option<String>,
    pub course_id: Option<String>,
    pub password_hash: Option<String>,
}

impl CredentialsRecord {
    /// Separa el hash del usuario público.
    pub fn split(self) -> (User, Option<String>) {
        let hash = self.password_hash;
        let user = UserRecord {
            id: self.id,
            username: self.username,
            role: self.role,
            name: self.name,
            course_id: self.course_id,
        }
        .into_domain();
        (user, hash)
    }
}

/// Cuerpo de `POST /api/admin/users`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    #[serde(default)]
    pub id: String,
    pub username: String,
    /// Vacío o ausente en una edición conserva la contraseña actual.
    #[serde(default)]
    pub password: Option<String>,
    pub role: Role,
    pub name: String,
    #[serde(default)]
    pub course_id: Option<String>,
}

// Formulario de login (JSON)
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}
