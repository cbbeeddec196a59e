// src/models/incident.rs
use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use sqlx::FromRow;

use super::{non_blank, text_or};

pub const UNKNOWN_STUDENT_NAME: &str = "Estudiante desconocido";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentType {
    Disciplinaria,
    #[serde(rename = "Académica", alias = "Academica")]
    Academica,
}

impl IncidentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentType::Disciplinaria => "Disciplinaria",
            IncidentType::Academica => "Académica",
        }
    }

    pub fn from_db(value: &str) -> Self {
        match value.trim() {
            "Académica" | "Academica" => IncidentType::Academica,
            _ => IncidentType::Disciplinaria,
        }
    }
}

/// Periodo académico, de 1 a 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period(u8);

impl Period {
    pub const ALL: [Period; 4] = [Period(1), Period(2), Period(3), Period(4)];

    pub fn new(number: u8) -> Option<Self> {
        (1..=4).contains(&number).then_some(Period(number))
    }

    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse::<u8>().ok().and_then(Period::new)
    }

    pub fn number(self) -> u8 {
        self.0
    }

    /// Etiqueta corta usada en los reportes ("P1".."P4").
    pub fn label(self) -> String {
        format!("P{}", self.0)
    }
}

impl Default for Period {
    fn default() -> Self {
        Period(1)
    }
}

// En JSON viaja como texto: "1".."4"
impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u64),
        }

        let parsed = match Raw::deserialize(deserializer)? {
            Raw::Text(text) => Period::parse(&text),
            Raw::Number(n) => u8::try_from(n).ok().and_then(Period::new),
        };
        parsed.ok_or_else(|| de::Error::custom("el periodo debe estar entre 1 y 4"))
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Novedad registrada en el observador.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    #[serde(default)]
    pub id: String,
    pub student_id: String,
    // Copia del nombre y curso al momento del registro
    #[serde(default)]
    pub student_name: String,
    #[serde(default)]
    pub course_name: String,
    #[serde(rename = "type")]
    pub kind: IncidentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fault_type_id: Option<String>,
    #[serde(default = "today")]
    pub date: NaiveDate,
    // El cliente usa `follow_up` tal cual
    #[serde(default, rename = "follow_up", alias = "followUp")]
    pub follow_up: bool,
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub observation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evidence_base64: Option<String>,
    #[serde(default)]
    pub registered_by_teacher_id: String,
    #[serde(default)]
    pub registered_by_teacher_name: String,
}

impl Incident {
    /// Sólo las disciplinarias llevan tipo de falta, y como mucho uno.
    pub fn normalize(&mut self) {
        self.fault_type_id = match self.kind {
            IncidentType::Disciplinaria => non_blank(self.fault_type_id.take()),
            IncidentType::Academica => None,
        };
        self.evidence_base64 = non_blank(self.evidence_base64.take());
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.student_id.trim().is_empty() {
            return Err("La incidencia debe indicar el estudiante.".to_string());
        }
        if self.observation.trim().is_empty() {
            return Err("La observación es obligatoria.".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct IncidentRecord {
    pub id: String,
    pub student_id: Option<String>,
    pub student_name: Option<String>,
    pub course_name: Option<String>,
    #[sqlx(rename = "type")]
    pub kind: Option<String>,
    pub fault_type_id: Option<String>,
    pub date: Option<String>,
    pub follow_up: Option<i64>,
    pub period: Option<String>,
    pub observation: Option<String>,
    pub evidence_base64: Option<String>,
    pub registered_by_teacher_id: Option<String>,
    pub registered_by_teacher_name: Option<String>,
}

impl IncidentRecord {
    pub fn into_domain(self) -> Incident {
        let kind = IncidentType::from_db(self.kind.as_deref().unwrap_or_default());
        let date = self
            .date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
            .unwrap_or_else(today);
        let period = self
            .period
            .as_deref()
            .and_then(Period::parse)
            .unwrap_or_default();

        let mut incident = Incident {
            id: self.id,
            student_id: self.student_id.unwrap_or_default(),
            student_name: text_or(self.student_name, UNKNOWN_STUDENT_NAME),
            course_name: self.course_name.unwrap_or_default(),
            kind,
            fault_type_id: self.fault_type_id,
            date,
            follow_up: self.follow_up.unwrap_or(0) != 0,
            period,
            observation: self.observation.unwrap_or_default(),
            evidence_base64: self.evidence_base64,
            registered_by_teacher_id: self.registered_by_teacher_id.unwrap_or_default(),
            registered_by_teacher_name: self.registered_by_teacher_name.unwrap_or_default(),
        };
        incident.normalize();
        incident
    }
}
