// tests/api.rs
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use observador::{
    config::{Config, StudentDeleteMode},
    db,
    services::{auth_service::MIN_BCRYPT_COST, schema_service},
    state::AppState,
    web::routes::create_router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;
use tower_sessions::{MemoryStore, SessionManagerLayer};

fn router(pool: SqlitePool, delete_mode: StudentDeleteMode) -> Router {
    let mut config = Config::new("sqlite::memory:");
    config.bcrypt_cost = MIN_BCRYPT_COST;
    config.delete_mode = delete_mode;
    create_router(AppState::new(pool, config))
        .layer(SessionManagerLayer::new(MemoryStore::default()).with_secure(false))
}

async fn seeded_app(delete_mode: StudentDeleteMode) -> Router {
    let pool = db::connect_in_memory().await.unwrap();
    schema_service::setup(&pool, MIN_BCRYPT_COST).await.unwrap();
    router(pool, delete_mode)
}

fn request(method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Inicia sesión y devuelve la cookie para las peticiones siguientes.
async fn login(app: &Router, username: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(request(
            "POST",
            "/api/auth",
            None,
            Some(json!({ "username": username, "password": password })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK, "login de {} falló", username);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("la respuesta debe abrir sesión")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

async fn create_teacher(app: &Router, admin: &str, username: &str, course_id: &str) {
    let (status, _) = send(
        app,
        request(
            "POST",
            "/api/admin/users",
            Some(admin),
            Some(json!({
                "username": username,
                "password": "clave",
                "role": "TEACHER",
                "name": "Juan Pérez",
                "courseId": course_id
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

async fn create_student(app: &Router, cookie: &str, id: &str, document: &str, course_id: &str) {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/students",
            Some(cookie),
            Some(json!({
                "id": id,
                "documentId": document,
                "courseId": course_id,
                "firstName": "Carlos",
                "lastName": "Gomez"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
}

async fn create_incident(app: &Router, cookie: &str, student_id: &str, date: &str) -> String {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/api/incidents",
            Some(cookie),
            Some(json!({
                "studentId": student_id,
                "type": "Disciplinaria",
                "faultTypeId": "f1",
                "date": date,
                "period": "1",
                "observation": "Llegada tarde"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn status_is_public_and_data_requires_session() {
    let app = seeded_app(StudentDeleteMode::Strict).await;

    let (status, body) = send(&app, request("GET", "/api/status", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "active");

    let (status, body) = send(&app, request("GET", "/api/data", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn login_rejects_bad_credentials_and_loads_data() {
    let app = seeded_app(StudentDeleteMode::Strict).await;

    let (status, body) = send(
        &app,
        request("POST", "/api/auth", None, Some(json!({ "username": "admin", "password": "x" }))),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Credenciales inválidas");

    let cookie = login(&app, "admin", "1122").await;
    let (status, me) = send(&app, request("GET", "/api/auth/me", Some(&cookie), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "ADMIN");

    let (status, data) = send(&app, request("GET", "/api/data", Some(&cookie), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(data["status"], "connected");
    assert_eq!(data["courses"].as_array().unwrap().len(), 4);
    assert_eq!(data["faultTypes"].as_array().unwrap().len(), 4);

    let (status, _) = send(&app, request("POST", "/api/auth/logout", Some(&cookie), None)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, request("GET", "/api/auth/me", Some(&cookie), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_before_setup_reports_initializing() {
    let pool = db::connect_in_memory().await.unwrap();
    let app = router(pool, StudentDeleteMode::Strict);

    let (status, body) = send(
        &app,
        request("POST", "/api/auth", None, Some(json!({ "username": "admin", "password": "1122" }))),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().starts_with("El sistema se está inicializando"));

    let (status, _) = send(&app, request("POST", "/api/setup", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    login(&app, "admin", "1122").await;
}

#[tokio::test]
async fn master_password_opens_teacher_account() {
    let app = seeded_app(StudentDeleteMode::Strict).await;
    let admin = login(&app, "admin", "1122").await;
    create_teacher(&app, &admin, "docente1", "c1").await;

    let teacher = login(&app, "docente1", "1122").await;
    let (_, me) = send(&app, request("GET", "/api/auth/me", Some(&teacher), None)).await;
    assert_eq!(me["username"], "docente1");
    assert_eq!(me["courseId"], "c1");
}

#[tokio::test]
async fn admin_routes_are_forbidden_for_teachers() {
    let app = seeded_app(StudentDeleteMode::Strict).await;
    let admin = login(&app, "admin", "1122").await;
    create_teacher(&app, &admin, "docente1", "c1").await;
    let teacher = login(&app, "docente1", "clave").await;

    let (status, _) = send(
        &app,
        request("POST", "/api/admin/courses", Some(&teacher), Some(json!({ "name": "1201" }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, course) = send(
        &app,
        request("POST", "/api/admin/courses", Some(&admin), Some(json!({ "name": "1201" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!course["id"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn only_the_group_director_deletes_a_student() {
    let app = seeded_app(StudentDeleteMode::Strict).await;
    let admin = login(&app, "admin", "1122").await;
    create_teacher(&app, &admin, "docente1", "c1").await;
    let teacher = login(&app, "docente1", "clave").await;

    create_student(&app, &teacher, "s1", "111", "c1").await;
    create_student(&app, &admin, "s2", "222", "c2").await;
    create_incident(&app, &teacher, "s1", "2024-03-10").await;

    let (status, _) = send(&app, request("DELETE", "/api/students/s2", Some(&teacher), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, request("DELETE", "/api/students/s1", Some(&teacher), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removedIncidents"], 1);

    let (_, incidents) = send(&app, request("GET", "/api/incidents", Some(&admin), None)).await;
    assert!(incidents.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn lenient_delete_keeps_orphans_for_the_admin() {
    let app = seeded_app(StudentDeleteMode::Lenient).await;
    let admin = login(&app, "admin", "1122").await;
    create_teacher(&app, &admin, "docente1", "c1").await;
    let teacher = login(&app, "docente1", "clave").await;

    create_student(&app, &teacher, "s1", "111", "c1").await;
    let incident_id = create_incident(&app, &teacher, "s1", "2024-03-10").await;
    let (status, _) = send(&app, request("DELETE", "/api/students/s1", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);

    // huérfana: el director ya no puede borrarla, el administrador sí
    let uri = format!("/api/incidents/{}", incident_id);
    let (status, _) = send(&app, request("DELETE", &uri, Some(&teacher), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, request("DELETE", &uri, Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn saving_a_student_twice_keeps_one_record() {
    let app = seeded_app(StudentDeleteMode::Strict).await;
    let admin = login(&app, "admin", "1122").await;
    create_student(&app, &admin, "s1", "111", "c1").await;
    create_student(&app, &admin, "s1", "111", "c2").await;

    let (_, students) = send(&app, request("GET", "/api/students?q=carlos", Some(&admin), None)).await;
    let students = students.as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["courseId"], "c2");

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/students",
            Some(&admin),
            Some(json!({ "id": "s9", "documentId": "111", "firstName": "Otro", "lastName": "Más" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn date_range_report_is_an_attachment() {
    let app = seeded_app(StudentDeleteMode::Strict).await;
    let admin = login(&app, "admin", "1122").await;

    let (status, body) = send(
        &app,
        request("GET", "/api/reports/incidents?start=2024-03-01&end=2024-03-31", Some(&admin), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("No hay incidencias en el rango"));

    create_student(&app, &admin, "s1", "111", "c1").await;
    create_incident(&app, &admin, "s1", "2024-03-31").await;

    let response = app
        .clone()
        .oneshot(request(
            "GET",
            "/api/reports/incidents?start=2024-03-01&end=2024-03-31",
            Some(&admin),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains("Reporte_Novedades_"));
    let html = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let html = String::from_utf8(html.to_vec()).unwrap();
    assert!(html.contains("Carlos Gomez"));
}

#[tokio::test]
async fn student_record_download_uses_the_student_name() {
    let app = seeded_app(StudentDeleteMode::Strict).await;
    let admin = login(&app, "admin", "1122").await;
    create_student(&app, &admin, "s1", "111", "c1").await;

    let response = app
        .clone()
        .oneshot(request("GET", "/api/reports/students/s1", Some(&admin), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.contains("Ficha_Integral_Gomez_Carlos.html"));

    let (status, _) = send(&app, request("GET", "/api/reports/students/nadie", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn dashboard_counts_by_type_and_period() {
    let app = seeded_app(StudentDeleteMode::Strict).await;
    let admin = login(&app, "admin", "1122").await;
    create_student(&app, &admin, "s1", "111", "c1").await;
    create_incident(&app, &admin, "s1", "2024-03-10").await;

    let (status, stats) = send(&app, request("GET", "/api/dashboard", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalStudents"], 1);
    assert_eq!(stats["disciplinaryIncidents"], 1);
    assert_eq!(stats["incidentsByPeriod"][0]["name"], "P1");
    assert_eq!(stats["incidentsByPeriod"][0]["count"], 1);
}

#[tokio::test]
async fn admin_clears_the_incident_history() {
    let app = seeded_app(StudentDeleteMode::Strict).await;
    let admin = login(&app, "admin", "1122").await;
    create_student(&app, &admin, "s1", "111", "c1").await;
    create_incident(&app, &admin, "s1", "2024-03-10").await;
    create_incident(&app, &admin, "s1", "2024-03-11").await;

    let (status, body) = send(&app, request("DELETE", "/api/admin/incidents", Some(&admin), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["removed"], 2);
}

#[tokio::test]
async fn only_the_director_overwrites_an_incident_and_the_author_stays() {
    let app = seeded_app(StudentDeleteMode::Strict).await;
    let admin = login(&app, "admin", "1122").await;
    create_teacher(&app, &admin, "docente1", "c1").await;
    create_teacher(&app, &admin, "docente2", "c2").await;
    let director = login(&app, "docente1", "clave").await;
    let outsider = login(&app, "docente2", "clave").await;

    create_student(&app, &director, "s1", "111", "c1").await;
    let incident_id = create_incident(&app, &director, "s1", "2024-03-10").await;

    let overwrite = |observation: &str| {
        json!({
            "id": incident_id,
            "studentId": "s1",
            "type": "Disciplinaria",
            "faultTypeId": "f1",
            "date": "2024-03-10",
            "period": "1",
            "observation": observation,
            "registeredByTeacherId": "u1",
            "registeredByTeacherName": "Administrador General"
        })
    };

    let (status, _) = send(&app, request("POST", "/api/incidents", Some(&outsider), Some(overwrite("borrado")))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, saved) = send(&app, request("POST", "/api/incidents", Some(&director), Some(overwrite("Corregida")))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["registeredByTeacherName"], "Juan Pérez");

    let (_, incidents) = send(&app, request("GET", "/api/incidents?studentId=s1", Some(&admin), None)).await;
    let incidents = incidents.as_array().unwrap();
    assert_eq!(incidents.len(), 1);
    assert_eq!(incidents[0]["observation"], "Corregida");
    assert_ne!(incidents[0]["registeredByTeacherId"], "u1");
}

#[tokio::test]
async fn teacher_registers_new_students_in_their_own_course() {
    let app = seeded_app(StudentDeleteMode::Strict).await;
    let admin = login(&app, "admin", "1122").await;
    create_teacher(&app, &admin, "docente1", "c1").await;
    let teacher = login(&app, "docente1", "clave").await;

    let (status, saved) = send(
        &app,
        request(
            "POST",
            "/api/students",
            Some(&teacher),
            Some(json!({ "documentId": "333", "courseId": "c3", "firstName": "Ana", "lastName": "Ruiz" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(saved["courseId"], "c1");

    let (_, saved) = send(
        &app,
        request(
            "POST",
            "/api/students",
            Some(&admin),
            Some(json!({ "documentId": "444", "courseId": "c3", "firstName": "Luis", "lastName": "Mora" })),
        ),
    )
    .await;
    assert_eq!(saved["courseId"], "c3");
}

#[tokio::test]
async fn student_photo_larger_than_two_megabytes_is_accepted() {
    let app = seeded_app(StudentDeleteMode::Strict).await;
    let admin = login(&app, "admin", "1122").await;
    let photo = "A".repeat(3 * 1024 * 1024);

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/api/students",
            Some(&admin),
            Some(json!({
                "id": "s1",
                "documentId": "111",
                "courseId": "c1",
                "firstName": "Carlos",
                "lastName": "Gomez",
                "photoBase64": photo
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["photoBase64"].as_str().unwrap().len(), 3 * 1024 * 1024);
}
