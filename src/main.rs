use std::sync::Arc;

use itinerary::config::AppConfig;
use itinerary::error::AppError;
use itinerary::routes::create_router;
use itinerary::services::{
    clock::{Clock, FixedClock, SystemClock},
    source::HttpSource,
};
use itinerary::state::AppState;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = AppConfig::from_env()?;
    let clock: Arc<dyn Clock> = match config.today_override {
        Some(date) => {
            info!(%date, "using fixed date for today");
            Arc::new(FixedClock(date))
        }
        None => Arc::new(SystemClock),
    };
    let source = HttpSource::new(config.data_base_url.clone());

    let state = AppState::new(config.clone(), Arc::new(source), clock);
    let app = create_router(state.clone());

    let listener = TcpListener::bind(config.listen_addr).await?;
    info!("listening on {}", listener.local_addr()?);
    info!(
        "loading trip data from {} (serving {} at /data)",
        config.data_base_url,
        config.data_dir.display()
    );

    // The default data origin is this server, so load once it accepts connections.
    tokio::spawn(async move { state.load().await });

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,itinerary=debug".into());

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
