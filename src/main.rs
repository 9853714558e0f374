use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use filevault::{
    AppState, BlobStore, Config, Database, SqlSessionStore, ThumbnailQueue, WebServer,
};

#[tokio::main]
async fn main() {
    // Load configuration
    let mut config = match Config::load("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    if let Err(e) = filevault::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        filevault::logging::init_console_only(&config.logging.level);
    }

    info!("filevault starting");

    if let Err(e) = run(config).await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> filevault::Result<()> {
    let db = Database::open(&config.database.path).await?;

    let blobs = BlobStore::new(&config.storage.folder_path);
    blobs.ensure_root().await?;
    info!("Storing content under {:?}", blobs.root());

    let sessions = SqlSessionStore::new(
        db.pool().clone(),
        Duration::from_secs(config.sessions.cache_ttl_secs),
    );

    let (thumbnails, receiver) = ThumbnailQueue::bounded(
        config.thumbnails.queue_capacity,
        config.thumbnails.max_attempts,
    );
    let receiver = receiver.with_sizes(config.thumbnails.sizes.clone());
    info!(
        max_attempts = receiver.max_attempts(),
        "Spooling thumbnail jobs to {:?}", config.thumbnails.spool_path
    );
    let spool_path = config.thumbnails.spool_path.clone();
    let spool = tokio::spawn(async move { receiver.spool(spool_path).await });

    let state = AppState::new(db.clone(), blobs, Arc::new(sessions), thumbnails);
    let server = WebServer::new(&config.server, &config.storage, state)?;
    info!("Server configured on {}", server.addr());

    // The server owns the last queue producer; the spool drains once it stops.
    let served = server.run().await;

    match spool.await {
        Ok(Ok(jobs)) => info!(jobs, "Thumbnail jobs spooled"),
        Ok(Err(e)) => warn!("Thumbnail spool failed: {}", e),
        Err(e) => warn!("Thumbnail spool task panicked: {}", e),
    }

    db.close().await;
    served?;
    Ok(())
}
