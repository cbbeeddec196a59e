// src/models/course.rs
//! Cursos, tipos de falta y asignaciones de director de grupo.
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct CourseRecord {
    pub id: String,
    pub name: Option<String>,
}

impl CourseRecord {
    pub fn into_domain(self) -> Course {
        Course {
            id: self.id,
            name: self.name.unwrap_or_default(),
        }
    }
}

/// Categoría de una falta disciplinaria ("Falta Tipo I", "Observación", ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaultType {
    #[serde(default)]
    pub id: String,
    #[serde(rename = "type")]
    pub label: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct FaultTypeRecord {
    pub id: String,
    #[sqlx(rename = "type")]
    pub label: Option<String>,
}

impl FaultTypeRecord {
    pub fn into_domain(self) -> FaultType {
        FaultType {
            id: self.id,
            label: self.label.unwrap_or_default(),
        }
    }
}

/// Director de grupo de un curso, con los nombres ya resueltos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAssignment {
    pub course_id: String,
    pub teacher_id: String,
    #[serde(default)]
    pub teacher_name: String,
    #[serde(default)]
    pub course_name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct GroupAssignmentRecord {
    pub course_id: String,
    pub teacher_id: Option<String>,
    pub teacher_name: Option<String>,
    pub course_name: Option<String>,
}

impl GroupAssignmentRecord {
    pub fn into_domain(self) -> GroupAssignment {
        GroupAssignment {
            course_id: self.course_id,
            teacher_id: self.teacher_id.unwrap_or_default(),
            teacher_name: self.teacher_name.unwrap_or_default(),
            course_name: self.course_name.unwrap_or_default(),
        }
    }
}

// Cuerpo de `POST /api/admin/group-assignments`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupAssignmentPayload {
    pub course_id: String,
    pub teacher_id: String,
}
