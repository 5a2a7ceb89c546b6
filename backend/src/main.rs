use std::sync::Arc;
use backend::{
    chat::MattermostClient,
    config::{Config, StoreMode},
    registration::register_commands,
    routes::AppState,
    store::{DatabaseStore, MemoryStore, PollStore},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

type BoxError = Box<dyn std::error::Error>;

async fn open_store(config: &Config) -> Result<PollStore, BoxError> {
    match (config.mode, &config.database) {
        (StoreMode::Memory, _) => Ok(PollStore::Memory(MemoryStore::new())),
        (StoreMode::Database, Some(settings)) => Ok(PollStore::Database(DatabaseStore::connect(settings).await?)),
        (StoreMode::Database, None) => Err("database mode requires DATABASE_URL".into()),
    }
}

#[rocket::main]
async fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("🚀 Starting poll bot");

    let config = Config::from_env()?;
    let store = open_store(&config).await?;
    info!("Using {} store", store.backend_name());
    let chat = Arc::new(MattermostClient::new(&config.server_url, &config.bot_token)?);

    match register_commands(chat.as_ref(), &store, &config).await {
        Ok(created) if created.is_empty() => info!("📋 All commands already registered"),
        Ok(created) => info!("📋 Registered {} commands", created.len()),
        Err(e) => {
            error!("Command registration failed: {}", e);
            return Err(e.into());
        }
    }

    let figment = rocket::Config::figment()
        .merge(("address", config.listen.ip()))
        .merge(("port", config.listen.port()));

    info!("Bot is listening on {}", config.listen);
    backend::mount(rocket::custom(figment), AppState::new(store, chat))
        .launch()
        .await?;

    Ok(())
}
