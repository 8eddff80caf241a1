use dotenvy::dotenv;
use prodtrack::{
    bot::{self, BotData},
    config::{self, users::admin_seed_from_env},
    core::{calendar, users},
    errors::{Error, Result},
    store::{DbStore, MirroredStore},
    sync::RemoteMirror,
};
use std::{env, sync::Arc};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file, non-fatal since env vars can be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the application settings
    let settings = config::settings::load_app_settings()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;
    info!(
        "Settings loaded for '{}' ({} configured off-days)",
        settings.organization.name,
        settings.off_days.len()
    );

    // 4. Open the database and make sure the tables exist
    let db = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    config::database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    // 5. Wrap the store with the remote mirror when one is configured
    let mirror = settings
        .sync
        .url
        .as_deref()
        .map(RemoteMirror::new)
        .transpose()?;
    let store = MirroredStore::new(DbStore::new(db), mirror);
    if store.is_mirrored() && settings.sync.pull_on_start {
        store.pull_all().await?;
    }

    // 6. Seed the holiday calendar and the first admin
    let added = calendar::seed_off_days(&store, &settings.off_days).await?;
    if added > 0 {
        info!("Seeded {added} off-days from configuration");
    }
    match admin_seed_from_env() {
        Some(seed) => {
            users::seed_admin(&store, seed).await?;
        }
        None => {
            if users::list_users(&store).await?.is_empty() {
                warn!("No staff accounts exist and PRODTRACK_ADMIN_USERNAME is not set");
            }
        }
    }

    // 7. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(store, Arc::new(settings))).await
}
