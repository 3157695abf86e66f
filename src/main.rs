use std::{future::IntoFuture, process, sync::Arc};

use postcache::{
    application::{
        error::AppError,
        posts::{ListingConfig, PostService},
        store::PostStore,
    },
    cache::{CacheConfig, CachedPostStore},
    config,
    infra::{
        db::PostgresPostStore,
        error::InfraError,
        http::{self, HttpState},
        memory::InMemoryPostStore,
        telemetry,
    },
};
use sqlx::PgPool;
use tokio::sync::watch;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    let database_url = settings
        .database
        .url
        .as_deref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))?;

    connect_database(database_url, settings.database.max_connections.get()).await?;
    info!(target = "postcache::migrate", "Migrations applied");
    Ok(())
}

async fn connect_database(url: &str, max_connections: u32) -> Result<PgPool, AppError> {
    let pool = PostgresPostStore::connect(url, max_connections)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresPostStore::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    Ok(pool)
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let (backend, db): (Arc<dyn PostStore>, Option<Arc<PostgresPostStore>>) =
        match settings.database.url.as_deref() {
            Some(url) => {
                let pool = connect_database(url, settings.database.max_connections.get()).await?;
                let store = Arc::new(PostgresPostStore::new(pool));
                (store.clone(), Some(store))
            }
            None => {
                warn!(
                    target = "postcache::serve",
                    "No database url configured; posts are kept in memory"
                );
                (Arc::new(InMemoryPostStore::new()), None)
            }
        };

    let cache_config = CacheConfig::from(&settings.cache);
    let cached = Arc::new(CachedPostStore::new(&cache_config, backend));
    let posts = Arc::new(PostService::new(
        cached.clone(),
        ListingConfig::from(&settings.listing),
    ));

    info!(
        target = "postcache::serve",
        point_capacity = cache_config.point_capacity,
        query_capacity = cache_config.query_capacity,
        scan_ttl_secs = cache_config.scan_ttl_secs,
        key_query_ttl_secs = cache_config.key_query_ttl_secs,
        "Caches ready"
    );

    let result = serve_http(&settings, HttpState { posts, db }).await;
    cached.clear();
    result
}

async fn serve_http(settings: &config::Settings, state: HttpState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(target = "postcache::serve", addr = %settings.server.addr, "Listening");

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let mut drain_rx = stop_tx.subscribe();
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = stop_tx.send(true);
    });

    let server = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = stop_rx.wait_for(|stop| *stop).await;
        })
        .into_future();
    let grace = settings.server.graceful_shutdown;
    let deadline = async move {
        let _ = drain_rx.wait_for(|stop| *stop).await;
        tokio::time::sleep(grace).await;
    };

    tokio::select! {
        result = server => result.map_err(|err| AppError::from(InfraError::from(err))),
        () = deadline => {
            warn!(
                target = "postcache::serve",
                grace_secs = grace.as_secs(),
                "Connections still open after grace period; exiting"
            );
            Ok(())
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!(target = "postcache::serve", "Shutdown requested");
}
