// src/web/system_handlers.rs
use crate::{
    error::AppResult,
    models::snapshot::{AllData, DashboardStats},
    services::{data_service, schema_service},
    state::AppState,
};
use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Serialize)]
pub struct DataResponse {
    pub status: &'static str,
    #[serde(flatten)]
    pub data: Option<AllData>,
}

// GET /api/status
pub async fn handle_status() -> Json<Value> {
    Json(json!({ "status": "active" }))
}

// POST /api/setup
// Se puede repetir: crea lo que falta y no toca lo existente
pub async fn handle_setup(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let message = schema_service::setup(&state.db_pool, state.config.bcrypt_cost).await?;
    Ok(Json(json!({ "success": true, "message": message })))
}

// GET /api/data
pub async fn handle_get_all_data(State(state): State<AppState>) -> AppResult<Json<DataResponse>> {
    // El cliente reintenta mientras el esquema no exista
    if !schema_service::is_initialized(&state.db_pool).await? {
        return Ok(Json(DataResponse { status: "initializing", data: None }));
    }
    let data = data_service::get_all_data(&state.db_pool, state.config.fetch_limit).await?;
    Ok(Json(DataResponse { status: "connected", data: Some(data) }))
}

// GET /api/dashboard
pub async fn handle_dashboard(State(state): State<AppState>) -> AppResult<Json<DashboardStats>> {
    let stats = data_service::dashboard(&state.db_pool, state.config.fetch_limit).await?;
    Ok(Json(stats))
}
