// src/services/mod.rs
pub mod auth_service;
pub mod authz;
pub mod catalog_service;
pub mod data_service;
pub mod incident_service;
pub mod schema_service;
pub mod student_service;
pub mod user_service;
