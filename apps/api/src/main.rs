use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use appointment_cell::services::notifications::LoggingNotificationHook;
use appointment_cell::store::InMemoryAppointmentStore;
use appointment_cell::AppointmentState;
use schedule_cell::services::availability::AvailabilityService;
use schedule_cell::store::InMemoryScheduleStore;
use schedule_cell::ScheduleState;
use shared_config::AppConfig;

#[tokio::main]
async fn main() {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting clinic scheduling API server");

    // Load configuration
    let config = AppConfig::from_env();

    // Set up CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Wire the engine: stores and the notification hook are injected here,
    // never reached for globally.
    let schedule_store = Arc::new(InMemoryScheduleStore::new());
    let appointment_store = Arc::new(InMemoryAppointmentStore::new());
    let availability = Arc::new(AvailabilityService::new(schedule_store));
    let notifier = Arc::new(LoggingNotificationHook);

    let schedule_state = Arc::new(ScheduleState {
        availability: Arc::clone(&availability),
    });
    let appointment_state = Arc::new(AppointmentState::new(
        appointment_store,
        availability,
        notifier,
        &config,
    ));

    // Build the application router
    let app = router::create_router(schedule_state, appointment_state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    // Run the server
    let addr = SocketAddr::from((
        config
            .bind_host
            .parse::<std::net::IpAddr>()
            .unwrap_or_else(|_| [0, 0, 0, 0].into()),
        config.bind_port,
    ));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await.expect("failed to bind");
    axum::serve(listener, app).await.expect("server error");
}
