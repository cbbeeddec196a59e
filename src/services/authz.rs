// src/services/authz.rs
//! Reglas de permisos sobre fichas e incidencias.
use crate::models::{incident::Incident, student::Student, user::User};

/// ADMIN, o el docente director del curso del estudiante.
pub fn can_delete_student(user: &User, student: &Student) -> bool {
    user.is_admin() || user.directs_course(&student.course_id)
}

pub fn can_edit_student(user: &User, student: &Student) -> bool {
    can_delete_student(user, student)
}

/// Curso al que queda fijada una ficha nueva: el docente con curso asignado
/// sólo crea estudiantes en su propio curso.
pub fn course_for_new_student(user: &User) -> Option<&str> {
    if user.is_admin() {
        return None;
    }
    user.course_id.as_deref().map(str::trim).filter(|c| !c.is_empty())
}

/// `student` es la ficha a la que apunta la incidencia; si ya no existe
/// sólo un administrador puede borrarla.
pub fn can_delete_incident(user: &User, incident: &Incident, student: Option<&Student>) -> bool {
    if user.is_admin() {
        return true;
    }
    match student {
        Some(student) if student.id == incident.student_id => user.directs_course(&student.course_id),
        _ => false,
    }
}

/// Modificar una incidencia ya registrada pide lo mismo que borrarla.
pub fn can_edit_incident(user: &User, incident: &Incident, student: Option<&Student>) -> bool {
    can_delete_incident(user, incident, student)
}
