// src/models/student.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::{non_blank, text_or};

pub const DEFAULT_DOCUMENT_TYPE: &str = "TI";
pub const DEFAULT_RH_FACTOR: &str = "O+";
pub const DOCUMENT_TYPES: &[&str] = &["TI", "RC", "CC", "CE", "PEP"];
pub const RH_FACTORS: &[&str] = &["O+", "O-", "A+", "A-", "B+", "B-", "AB+", "AB-"];

/// Ficha integral del estudiante.
///
/// Todos los campos de texto admiten vacío; el cliente puede omitir cualquiera
/// y recibe el valor por defecto.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Student {
    pub id: String,
    // Identificación
    pub document_id: String,
    pub document_type: String,
    pub course_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_base64: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    // Contacto y acudiente
    pub student_phone: String,
    pub student_address: String,
    pub guardian_name: String,
    pub guardian_phone: String,
    pub guardian_relationship: String,
    pub sibling_count: i64,
    // Salud
    pub eps: String,
    pub rh_factor: String,
    pub medical_conditions: String,
    pub medical_formulation: String,
    // Antecedentes académicos
    pub failed_years: String,
    pub previous_school: String,
    pub transfer_reason: String,
    pub history_observations: String,
    // Intereses
    pub favorite_subjects: String,
    pub difficult_subjects: String,
    pub free_time_activities: String,
    pub life_project: String,
    pub director_id: String,
    /// Lo asigna el servidor en cada guardado.
    pub last_updated: String,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }

    /// Comprueba los campos obligatorios del formulario.
    pub fn validate(&self) -> Result<(), String> {
        if self.document_id.trim().is_empty() {
            return Err("El documento del estudiante es obligatorio.".to_string());
        }
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Err("Nombres y apellidos son obligatorios.".to_string());
        }
        if self.sibling_count < 0 {
            return Err("El número de hermanos no puede ser negativo.".to_string());
        }
        if !self.document_type.is_empty() && !DOCUMENT_TYPES.contains(&self.document_type.as_str()) {
            return Err(format!("Tipo de documento desconocido: {}", self.document_type));
        }
        if !self.rh_factor.is_empty() && !RH_FACTORS.contains(&self.rh_factor.as_str()) {
            return Err(format!("Factor RH desconocido: {}", self.rh_factor));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct StudentRecord {
    pub id: String,
    pub document_id: Option<String>,
    pub document_type: Option<String>,
    pub course_id: Option<String>,
    pub photo_base64: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
    pub student_phone: Option<String>,
    pub student_address: Option<String>,
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub guardian_relationship: Option<String>,
    pub sibling_count: Option<i64>,
    pub eps: Option<String>,
    pub rh_factor: Option<String>,
    pub medical_conditions: Option<String>,
    pub medical_formulation: Option<String>,
    pub failed_years: Option<String>,
    pub previous_school: Option<String>,
    pub transfer_reason: Option<String>,
    pub history_observations: Option<String>,
    pub favorite_subjects: Option<String>,
    pub difficult_subjects: Option<String>,
    pub free_time_activities: Option<String>,
    pub life_project: Option<String>,
    pub director_id: Option<String>,
    pub last_updated: Option<String>,
}

impl StudentRecord {
    pub fn into_domain(self) -> Student {
        Student {
            id: self.id,
            document_id: self.document_id.unwrap_or_default(),
            document_type: text_or(self.document_type, DEFAULT_DOCUMENT_TYPE),
            course_id: self.course_id.unwrap_or_default(),
            photo_base64: non_blank(self.photo_base64),
            first_name: self.first_name.unwrap_or_default(),
            last_name: self.last_name.unwrap_or_default(),
            birth_date: self.birth_date.unwrap_or_default(),
            student_phone: self.student_phone.unwrap_or_default(),
            student_address: self.student_address.unwrap_or_default(),
            guardian_name: self.guardian_name.unwrap_or_default(),
            guardian_phone: self.guardian_phone.unwrap_or_default(),
            guardian_relationship: self.guardian_relationship.unwrap_or_default(),
            sibling_count: self.sibling_count.unwrap_or(0).max(0),
            eps: self.eps.unwrap_or_default(),
            rh_factor: text_or(self.rh_factor, DEFAULT_RH_FACTOR),
            medical_conditions: self.medical_conditions.unwrap_or_default(),
            medical_formulation: self.medical_formulation.unwrap_or_default(),
            failed_years: self.failed_years.unwrap_or_default(),
            previous_school: self.previous_school.unwrap_or_default(),
            transfer_reason: self.transfer_reason.unwrap_or_default(),
            history_observations: self.history_observations.unwrap_or_default(),
            favorite_subjects: self.favorite_subjects.unwrap_or_default(),
            difficult_subjects: self.difficult_subjects.unwrap_or_default(),
            free_time_activities: self.free_time_activities.unwrap_or_default(),
            life_project: self.life_project.unwrap_or_default(),
            director_id: self.director_id.unwrap_or_default(),
            last_updated: non_blank(self.last_updated).unwrap_or_else(now_timestamp),
        }
    }
}

/// Marca de tiempo con el formato que escribe SQLite (`YYYY-MM-DD HH:MM:SS`).
pub fn now_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
