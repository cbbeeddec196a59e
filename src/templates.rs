// src/templates.rs
use crate::report::{layout::Block, Document};
use askama::Template;

/// Documento imprimible (ficha integral o reporte por fechas).
#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportPage<'a> {
    pub document: &'a Document,
}

