use std::net::SocketAddr;
use std::sync::Arc;
use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{CorsLayer, Any};
use tower_http::trace::{self, TraceLayer};
use tracing::{Level, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::services::ConsultationService;
use appointment_cell::AppointmentState;
use pet_cell::services::PetService;
use shared_config::AppConfig;
use shared_database::SupabaseClient;

/// Loads the stored totals into the live counters. A store that is not
/// reachable yet only costs accurate numbers, so failures are logged.
async fn seed_counters(config: &AppConfig, state: &AppointmentState) {
    let token = config.supabase_anon_key.as_str();
    let consultations = ConsultationService::new(Arc::new(SupabaseClient::new(config)));

    let pets = PetService::new(config).count(token).await;
    let booked = consultations.list_all(token).await;

    match (pets, booked) {
        (Ok(pets), Ok(booked)) => {
            state.counters.seed_from_calendar(pets, &booked);
            info!("Counters seeded: {} pets, {} consultations", pets, booked.len());
        }
        (Err(e), _) => warn!("Could not seed pet counter: {}", e),
        (_, Err(e)) => warn!("Could not seed consultation counter: {}", e),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Veterinary Clinic API server");

    let config = Arc::new(AppConfig::from_env());
    if !config.is_configured() {
        warn!("Store credentials are incomplete; requests to the store will fail");
    }

    let appointments = Arc::new(AppointmentState::new(config.clone()));
    if config.is_configured() {
        seed_counters(&config, &appointments).await;
    }

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router::create_router(config.clone(), appointments)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new()
                    .level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new()
                    .level(Level::INFO)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
