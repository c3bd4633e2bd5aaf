//! Service entry point: configuration, client construction, consumer and
//! scheduler startup, HTTP serving, and graceful shutdown.

mod api;
mod context;
mod events;
mod middleware;
mod scheduler;
mod services;

use std::sync::Arc;
use std::time::Duration;

use clipstats_cache::{RedisStatsCache, StatsCache};
use clipstats_events::{AmqpPublisher, ConsumerOptions, EventSink};
use clipstats_peers::{CampaignServiceClient, ClipServiceClient};
use clipstats_platforms::AdapterRegistry;
use lapin::{Connection, ConnectionProperties};
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use crate::api::{build_app, AppState};
use crate::context::AppContext;
use crate::events::EventHandlers;
use crate::middleware::AuthState;
use crate::services::{CampaignCacheService, RankingsEngine, StatsCollector};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = clipstats_core::load_app_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!(?config, "starting statistics service");

    // Postgres
    let pool = clipstats_db::connect_pool(
        &config.database_url,
        clipstats_db::PoolConfig::from_app_config(&config),
    )
    .await?;
    clipstats_db::run_migrations(&pool).await?;

    // Redis stats cache
    let cache: Arc<dyn StatsCache> = Arc::new(RedisStatsCache::connect(&config.redis_url).await?);

    // Event bus
    let amqp = Connection::connect(&config.rabbitmq_url, ConnectionProperties::default()).await?;
    let publisher: Arc<dyn EventSink> =
        Arc::new(AmqpPublisher::new(&amqp, &config.event_exchange).await?);

    // Platform adapters and peer clients
    let registry = Arc::new(AdapterRegistry::from_config(&config)?);
    let clip_service = Arc::new(ClipServiceClient::new(
        &config.clip_service_url,
        config.peer_request_timeout_secs,
    )?);
    let campaign_service = Arc::new(CampaignServiceClient::new(
        &config.campaign_service_url,
        config.peer_request_timeout_secs,
    )?);

    // Services
    let collector = Arc::new(StatsCollector::new(
        registry,
        Arc::clone(&cache),
        Arc::clone(&publisher),
        Duration::from_millis(config.batch_inter_request_delay_ms),
    ));
    let rankings = Arc::new(RankingsEngine::new(pool.clone(), Arc::clone(&clip_service)));
    let campaign_cache = Arc::new(CampaignCacheService::new(
        pool.clone(),
        Arc::clone(&campaign_service),
    ));

    let ctx = Arc::new(AppContext {
        pool,
        cache,
        clip_service: Arc::clone(&clip_service),
        collector: Arc::clone(&collector),
        rankings: Arc::clone(&rankings),
        campaign_cache: Arc::clone(&campaign_cache),
    });

    // Event consumer
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handlers = EventHandlers::new(
        Arc::clone(&collector),
        Arc::clone(&clip_service),
        Arc::clone(&campaign_cache),
        publisher,
    );
    let exchange = config.event_exchange.clone();
    let consumer_task = tokio::spawn(async move {
        let handler = move |event| {
            let handlers = handlers.clone();
            async move { handlers.handle(event).await }
        };
        if let Err(e) = clipstats_events::run_consumer(
            &amqp,
            &exchange,
            ConsumerOptions::default(),
            handler,
            shutdown_rx,
        )
        .await
        {
            tracing::error!(error = %e, "event consumer exited with error");
        }
    });

    // Scheduler (handle must stay alive for jobs to keep firing)
    let mut job_scheduler =
        scheduler::build_scheduler(collector, clip_service, rankings).await?;

    // HTTP
    let state = AppState {
        ctx: Arc::clone(&ctx),
    };
    let auth = AuthState::new(&config.jwt_secret);
    let app = build_app(state, auth, &config.allowed_origins);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Orderly teardown: stop the consumer (draining in-flight deliveries),
    // then the scheduler. Client handles close on drop.
    tracing::info!("shutting down");
    shutdown_tx.send(true).ok();
    if let Err(e) = consumer_task.await {
        tracing::warn!(error = %e, "consumer task join failed");
    }
    if let Err(e) = job_scheduler.shutdown().await {
        tracing::warn!(error = %e, "scheduler shutdown failed");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
