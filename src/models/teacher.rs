// src/models/teacher.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, rename = "document_id", alias = "documentId")]
    pub document_id: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct TeacherRecord {
    pub id: String,
    pub name: Option<String>,
    pub document_id: Option<String>,
}

impl TeacherRecord {
    pub fn into_domain(self) -> Teacher {
        Teacher {
            id: self.id,
            name: self.name.unwrap_or_default(),
            document_id: self.document_id.unwrap_or_default(),
        }
    }
}
