// src/web/routes.rs
use crate::{
    state::AppState,
    web::{
        admin_handlers, auth_handlers, incident_handlers, mw_admin, mw_auth, report_handlers,
        student_handlers, system_handlers,
    },
};
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post},
    Router,
};

pub fn create_router(app_state: AppState) -> Router {
    // Fichas e incidencias llevan foto o evidencia en base64
    let upload_limit = DefaultBodyLimit::max(app_state.config.max_body_bytes);

    // --- Rutas públicas ---
    let public_routes = Router::new()
        .route("/status", get(system_handlers::handle_status))
        .route("/setup", post(system_handlers::handle_setup))
        .route("/auth", post(auth_handlers::handle_login))
        .route("/auth/logout", post(auth_handlers::handle_logout));

    // --- Rutas de administración ---
    // require_auth se aplica en el router padre
    let admin_routes = Router::new()
        .route("/users", post(admin_handlers::handle_save_user))
        .route("/users/{id}", delete(admin_handlers::handle_delete_user))
        .route("/teachers", post(admin_handlers::handle_save_teacher))
        .route("/teachers/{id}", delete(admin_handlers::handle_delete_teacher))
        .route("/courses", post(admin_handlers::handle_save_course))
        .route("/courses/{id}", delete(admin_handlers::handle_delete_course))
        .route("/fault-types", post(admin_handlers::handle_save_fault_type))
        .route("/fault-types/{id}", delete(admin_handlers::handle_delete_fault_type))
        .route("/group-assignments", post(admin_handlers::handle_save_group_assignment))
        .route("/group-assignments/{id}", delete(admin_handlers::handle_delete_group_assignment))
        .route("/incidents", delete(admin_handlers::handle_clear_incidents))
        .route_layer(middleware::from_fn(mw_admin::require_admin));

    let report_routes = Router::new()
        .route("/incidents", get(report_handlers::handle_date_range_report))
        .route("/students/{id}", get(report_handlers::handle_student_record));

    // --- Rutas con sesión ---
    let authenticated_routes = Router::new()
        .route("/auth/me", get(auth_handlers::handle_me))
        .route("/data", get(system_handlers::handle_get_all_data))
        .route("/dashboard", get(system_handlers::handle_dashboard))
        .route(
            "/students",
            get(student_handlers::handle_list_students)
                .post(student_handlers::handle_save_student)
                .layer(upload_limit),
        )
        .route("/students/{id}", delete(student_handlers::handle_delete_student))
        .route(
            "/incidents",
            get(incident_handlers::handle_list_incidents)
                .post(incident_handlers::handle_save_incident)
                .layer(upload_limit),
        )
        .route("/incidents/{id}", delete(incident_handlers::handle_delete_incident))
        .nest("/reports", report_routes)
        .nest("/admin", admin_routes)
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            mw_auth::require_auth,
        ));

    let api = Router::new().merge(public_routes).merge(authenticated_routes);

    Router::new().nest("/api", api).with_state(app_state)
}
