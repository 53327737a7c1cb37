use estate_store::config::AppConfig;
use estate_store::handlers::{router, AppState};
use estate_store::Store;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let config = AppConfig::load()?;
    log::info!("Loaded config: {:?}", config);

    let store = Store::open(&config.database_url, config.pool_size)?;

    let addr = config.bind_address();
    log::info!("Starting server on {}", addr);

    let app = router(AppState::new(store));
    axum::serve(tokio::net::TcpListener::bind(&addr).await?, app.into_make_service()).await?;

    Ok(())
}
