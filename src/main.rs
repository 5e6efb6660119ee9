use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hiring_pipeline::{
    config::{get_config, init_config, SnapshotBackend},
    database::{
        pool::create_pool,
        slot::{FileSlot, MemorySlot, PgSlot, SnapshotSlot},
    },
    error::Error,
    middleware::{auth::AuthKeys, cors::cors_layer, rate_limit::RequestBudget},
    routes,
    services::{ai_service::OpenAiService, candidate_store::CandidateStore},
    AppState,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("hiring_pipeline=info,tower_http=info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    init_config()?;
    let config = get_config().ok_or_else(|| Error::Config("Configuration is not initialized".into()))?;

    let slot: Arc<dyn SnapshotSlot> = match &config.snapshot_backend {
        SnapshotBackend::File(dir) => {
            info!("Persisting candidates under {}", dir.display());
            Arc::new(FileSlot::new(dir.clone()))
        }
        SnapshotBackend::Postgres(url) => {
            info!("Persisting candidates in Postgres");
            Arc::new(PgSlot::new(create_pool(url).await?))
        }
        SnapshotBackend::Memory => {
            tracing::warn!("Using in-memory snapshot slot; candidates are lost on restart");
            Arc::new(MemorySlot::new())
        }
    };

    let store = Arc::new(CandidateStore::new(slot, config.snapshot_key.clone()));
    {
        let store = store.clone();
        tokio::spawn(async move { store.load().await });
    }

    let http_client = reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    let ai_service = Arc::new(OpenAiService::new(
        config.openai_api_key.clone(),
        &config.openai_base_url,
        config.openai_model.clone(),
        config.openai_audio_model.clone(),
        Duration::from_secs(config.ai_timeout_secs),
        http_client,
    ));

    let app_state = AppState::new(store, ai_service);
    let app = routes::app_router(
        app_state,
        AuthKeys::new(&config.jwt_secret),
        RequestBudget::per_second(config.api_rps),
    )
    .layer(cors_layer(&config.cors_allowed_origins))
    .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
