// src/models/snapshot.rs
use serde::Serialize;

use super::{
    course::{Course, FaultType, GroupAssignment},
    incident::{Incident, IncidentType, Period},
    student::Student,
    teacher::Teacher,
    user::User,
};

/// Resultado de la lectura completa (`GET /api/data`).
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllData {
    pub users: Vec<User>,
    pub teachers: Vec<Teacher>,
    pub courses: Vec<Course>,
    pub fault_types: Vec<FaultType>,
    pub students: Vec<Student>,
    pub incidents: Vec<Incident>,
    pub group_assignments: Vec<GroupAssignment>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedCount {
    pub name: String,
    pub count: usize,
}

/// Cifras del tablero principal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_students: usize,
    pub total_incidents: usize,
    pub disciplinary_incidents: usize,
    pub academic_incidents: usize,
    pub students_per_course: Vec<NamedCount>,
    pub incidents_by_period: Vec<NamedCount>,
}

impl DashboardStats {
    pub fn from_data(data: &AllData) -> Self {
        let disciplinary_incidents = data
            .incidents
            .iter()
            .filter(|i| i.kind == IncidentType::Disciplinaria)
            .count();
        let academic_incidents = data
            .incidents
            .iter()
            .filter(|i| i.kind == IncidentType::Academica)
            .count();

        let students_per_course = data
            .courses
            .iter()
            .map(|c| NamedCount {
                name: c.name.clone(),
                count: data.students.iter().filter(|s| s.course_id == c.id).count(),
            })
            .collect();

        let incidents_by_period = Period::ALL
            .iter()
            .map(|p| NamedCount {
                name: p.label(),
                count: data.incidents.iter().filter(|i| i.period == *p).count(),
            })
            .collect();

        DashboardStats {
            total_students: data.students.len(),
            total_incidents: data.incidents.len(),
            disciplinary_incidents,
            academic_incidents,
            students_per_course,
            incidents_by_period,
        }
    }
}
