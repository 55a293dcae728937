mod core;
mod features;
mod modules;
mod shared;

use crate::core::config::{Config, StorageBackend};
use crate::core::database;
use crate::core::router::{build_router, AppServices};
use crate::features::auth::JwtValidator;
use crate::features::brands::BrandService;
use crate::features::categories::CategoryService;
use crate::features::products::ProductService;
use crate::modules::catalog::{
    seed_demo_catalog, CatalogStore, MemoryCatalogStore, PgCatalogStore,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );

    tracing::info!("Configuration loaded successfully");

    let store = create_store(&config).await?;

    if config.catalog.seed_demo_data {
        let seeded = seed_demo_catalog(
            store.as_ref(),
            config.catalog.default_low_stock_threshold,
        )
        .await
        .map_err(|e| anyhow::anyhow!("Demo seed failed: {}", e))?;
        if seeded {
            tracing::info!("Demo catalog seeded");
        }
    }

    // Initialize auth
    let jwt_validator = Arc::new(JwtValidator::new(&config.auth));
    tracing::info!("Auth configuration initialized");

    let services = AppServices {
        categories: Arc::new(CategoryService::new(Arc::clone(&store))),
        brands: Arc::new(BrandService::new(Arc::clone(&store))),
        products: Arc::new(ProductService::new(
            Arc::clone(&store),
            config.catalog.default_low_stock_threshold,
        )),
    };
    tracing::info!("Catalog services initialized");

    let app = build_router(&config.app, &config.swagger, services, jwt_validator);

    // Start server
    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}

/// Open the configured catalog store, running migrations for Postgres
async fn create_store(config: &Config) -> anyhow::Result<Arc<dyn CatalogStore>> {
    match config.catalog.storage {
        StorageBackend::Postgres => {
            let db_config = config
                .database
                .as_ref()
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set for postgres storage"))?;

            let pool = database::create_pool(db_config).await?;
            tracing::info!("Database connection pool created");

            tracing::info!("Running database migrations...");
            database::run_migrations(&pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
            tracing::info!("Database migrations completed successfully");

            Ok(Arc::new(PgCatalogStore::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory catalog store; data is lost on restart");
            Ok(Arc::new(MemoryCatalogStore::new()))
        }
    }
}
