// src/main.rs
use axum::serve;
use observador::{config::Config, db, services::schema_service, state::AppState, web};
use std::env;
use time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tower_sessions::{ExpiredDeletion, Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Logging ---
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            env::var("RUST_LOG")
                .unwrap_or_else(|_| "observador=debug,tower_http=info,sqlx=warn,tower_sessions=info".into())
                .into()
        }))
        .with(fmt::layer())
        .init();

    tracing::info!("🚀 Iniciando el observador escolar...");

    let config = Config::from_env().map_err(|e| anyhow::anyhow!("Configuración inválida: {}", e))?;

    // --- Base de datos ---
    let db_pool = match db::create_db_pool(&config).await {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("❌ Fallo crítico al abrir la base de datos: {}", e);
            return Err(anyhow::anyhow!("No se pudo conectar a la base de datos: {}", e));
        }
    };

    // Si falla, el sistema responde "inicializando" y se puede reintentar con POST /api/setup
    match schema_service::setup(&db_pool, config.bcrypt_cost).await {
        Ok(message) => tracing::info!("{}", message),
        Err(e) => tracing::error!("❌ No se pudo preparar el esquema: {}", e),
    }

    // --- Sesiones ---
    let session_store = SqliteStore::new(db_pool.clone())
        .with_table_name("sessions")
        .map_err(|e| anyhow::anyhow!("No se pudo crear el almacén de sesiones: {}", e))?;
    session_store
        .migrate()
        .await
        .map_err(|e| anyhow::anyhow!("No se pudo migrar la tabla de sesiones: {}", e))?;

    let cleanup_store = session_store.clone();
    tokio::spawn(async move {
        if let Err(e) = cleanup_store
            .continuously_delete_expired(tokio::time::Duration::from_secs(60 * 60))
            .await
        {
            tracing::error!("Error en la limpieza de sesiones: {:?}", e);
        }
    });
    tracing::info!("🧹 Limpieza periódica de sesiones iniciada.");

    let session_layer = SessionManagerLayer::new(session_store)
        .with_secure(config.session_secure)
        .with_http_only(true)
        .with_expiry(Expiry::OnInactivity(Duration::days(1)));

    // --- Estado y listener ---
    let bind_address = config.bind_address;
    let app_state = AppState::new(db_pool, config);

    tracing::info!("📡 Servidor escuchando en http://{}", bind_address);
    let listener = match TcpListener::bind(bind_address).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("❌ No se pudo abrir {}: {}", bind_address, e);
            return Err(e.into());
        }
    };

    let app = web::routes::create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::very_permissive())
            .layer(session_layer),
    );

    tracing::info!("👂 Servidor listo para aceptar conexiones...");
    if let Err(e) = serve(listener, app.into_make_service()).await {
        tracing::error!("❌ Error fatal en el servidor: {}", e);
        return Err(e.into());
    }

    Ok(())
}
