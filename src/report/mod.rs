// src/report/mod.rs
//! Ficha integral del estudiante y reporte consolidado por fechas.
pub mod layout;

use crate::{
    error::{AppError, AppResult},
    models::{incident::Incident, student::Student},
    templates::ReportPage,
};
use askama::Template;
use chrono::NaiveDate;
use self::layout::{Column, Layout, Page, NARROW_FIELD_MM, WIDE_FIELD_MM};

pub const INSTITUTION_NAME: &str = "Institución Educativa la Pascuala";
const OBSERVATION_PREVIEW_CHARS: usize = 100;

/// Documento listo para imprimir.
#[derive(Debug, Clone)]
pub struct Document {
    pub title: String,
    pub file_name: String,
    pub pages: Vec<Page>,
}

impl Document {
    pub fn render(&self) -> AppResult<String> {
        ReportPage { document: self }.render().map_err(|e| {
            tracing::error!("Error al renderizar el reporte '{}': {:?}", self.file_name, e);
            AppError::InternalServerError
        })
    }
}

/// Filtro por fechas con ambos extremos incluidos.
pub fn incidents_in_range(incidents: &[Incident], start: NaiveDate, end: NaiveDate) -> Vec<&Incident> {
    incidents
        .iter()
        .filter(|i| i.date >= start && i.date <= end)
        .collect()
}

fn preview(observation: &str) -> String {
    if observation.chars().count() > OBSERVATION_PREVIEW_CHARS {
        let cut: String = observation.chars().take(OBSERVATION_PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        observation.to_string()
    }
}

// Sólo caracteres seguros en el nombre del archivo
fn file_part(value: &str) -> String {
    value
        .trim()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

pub fn student_record(student: &Student, incidents: &[Incident], course_name: &str) -> Document {
    // Sin logo el encabezado arranca 10 mm más abajo
    let mut doc = Layout::new(25.0);
    doc.subtitle(INSTITUTION_NAME, 8.0);
    doc.title("FICHA INTEGRAL DEL OBSERVADOR", 12.0);

    doc.section("1. IDENTIFICACIÓN Y DATOS FAMILIARES");
    let document = format!("{} {}", student.document_type, student.document_id);
    let siblings = student.sibling_count.to_string();
    for (label, value) in [
        ("Nombres", student.first_name.as_str()),
        ("Apellidos", student.last_name.as_str()),
        ("Documento", document.as_str()),
        ("Fecha Nacimiento", student.birth_date.as_str()),
        ("Curso Actual", course_name),
        ("Dirección", student.student_address.as_str()),
        ("Teléfono Estudiante", student.student_phone.as_str()),
        ("Acudiente Principal", student.guardian_name.as_str()),
        ("Parentesco", student.guardian_relationship.as_str()),
        ("Teléfono Acudiente", student.guardian_phone.as_str()),
        ("Número de Hermanos", siblings.as_str()),
    ] {
        doc.field(label, value, NARROW_FIELD_MM);
    }
    doc.gap(5.0);

    doc.section("2. SALUD Y EMERGENCIA");
    doc.field("EPS", &student.eps, NARROW_FIELD_MM);
    doc.field("Factor RH", &student.rh_factor, NARROW_FIELD_MM);
    doc.field("Condiciones Médicas", &student.medical_conditions, WIDE_FIELD_MM);
    doc.field("Formulación Médica", &student.medical_formulation, WIDE_FIELD_MM);
    doc.gap(5.0);

    doc.section("3. ANTECEDENTES Y CRITERIOS ACADÉMICOS");
    doc.field("Colegio Anterior", &student.previous_school, NARROW_FIELD_MM);
    doc.field("Años Reprobados", &student.failed_years, NARROW_FIELD_MM);
    doc.field("Motivo Traslado", &student.transfer_reason, WIDE_FIELD_MM);
    doc.field("Observaciones Históricas", &student.history_observations, WIDE_FIELD_MM);
    doc.gap(5.0);

    doc.section("4. INTERESES Y PROYECTO DE VIDA");
    doc.field("Materias Favoritas", &student.favorite_subjects, WIDE_FIELD_MM);
    doc.field("Dificultades", &student.difficult_subjects, WIDE_FIELD_MM);
    doc.field("Tiempo Libre", &student.free_time_activities, WIDE_FIELD_MM);
    doc.field("Proyecto de Vida", &student.life_project, WIDE_FIELD_MM);
    doc.gap(10.0);

    // El título de la tabla no debe quedar solo al final de la página
    doc.ensure_space(30.0);
    doc.section("5. SEGUIMIENTO DISCIPLINARIO Y ACADÉMICO");
    let columns = [
        Column { label: "Fecha", width_mm: 22.0 },
        Column { label: "Tipo", width_mm: 22.0 },
        Column { label: "Periodo", width_mm: 16.0 },
        Column { label: "Docente", width_mm: 40.0 },
        Column { label: "Observación", width_mm: 70.0 },
    ];
    let rows: Vec<Vec<String>> = incidents
        .iter()
        .map(|i| {
            vec![
                i.date.format("%Y-%m-%d").to_string(),
                i.kind.as_str().to_string(),
                i.period.label(),
                i.registered_by_teacher_name.clone(),
                i.observation.clone(),
            ]
        })
        .collect();
    doc.table(&columns, &rows);

    Document {
        title: format!("Ficha integral - {}", student.full_name()),
        file_name: format!(
            "Ficha_Integral_{}_{}.html",
            file_part(&student.last_name),
            file_part(&student.first_name)
        ),
        pages: doc.finish(),
    }
}

/// Reporte consolidado de novedades entre dos fechas (incluidas).
pub fn date_range_report(
    incidents: &[Incident],
    start: NaiveDate,
    end: NaiveDate,
    generated_on: NaiveDate,
) -> AppResult<Document> {
    if start > end {
        return Err(AppError::Validation(
            "La fecha inicial no puede ser posterior a la final.".to_string(),
        ));
    }
    let selected = incidents_in_range(incidents, start, end);
    if selected.is_empty() {
        return Err(AppError::Validation(
            "No hay incidencias en el rango de fechas seleccionado.".to_string(),
        ));
    }

    let mut doc = Layout::new(20.0);
    doc.subtitle(INSTITUTION_NAME, 8.0);
    doc.title("REPORTE CONSOLIDADO DE NOVEDADES", 7.0);

    let columns = [
        Column { label: "Curso", width_mm: 18.0 },
        Column { label: "Estudiante", width_mm: 35.0 },
        Column { label: "Fecha", width_mm: 20.0 },
        Column { label: "Tipo", width_mm: 22.0 },
        Column { label: "Docente", width_mm: 30.0 },
        Column { label: "Observación", width_mm: 45.0 },
    ];
    let rows: Vec<Vec<String>> = selected
        .iter()
        .map(|i| {
            vec![
                i.course_name.clone(),
                i.student_name.clone(),
                i.date.format("%Y-%m-%d").to_string(),
                i.kind.as_str().to_string(),
                i.registered_by_teacher_name.clone(),
                preview(&i.observation),
            ]
        })
        .collect();
    doc.table(&columns, &rows);

    tracing::info!(
        "Reporte de novedades {} a {}: {} incidencias.",
        start,
        end,
        selected.len()
    );
    Ok(Document {
        title: format!("Reporte de novedades {} a {}", start, end),
        file_name: format!("Reporte_Novedades_{}.html", generated_on.format("%Y-%m-%d")),
        pages: doc.finish(),
    })
}
