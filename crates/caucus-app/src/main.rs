use std::sync::Arc;

use salvo::conn::TcpListener;
use salvo::cors::Cors;
use salvo::http::Method;
use salvo::logging::Logger;
use salvo::{Listener, Router, Service};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt};

use caucus_app::app::api::routes;
use caucus_app::shared::SharedServices;
use caucus_core::config::load_config;
use caucus_db::db::DbProvider;
use caucus_db::db::connection::connect;
use caucus_db::db::migrate::run_migrations;
use caucus_service::auth::{Authenticator, DbAuthenticator};
use caucus_service::mail::{Mailer, OutboxMailer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (filter_layer, filter_handle) = reload::Layer::new(EnvFilter::new("debug"));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Caucus CRM server");

    let config = load_config()?;

    tracing::info!(config = ?config, "Configuration loaded");

    if let Ok(filter) = EnvFilter::try_new(config.logging.level.as_str()) {
        if let Err(e) = filter_handle.modify(|current| *current = filter) {
            tracing::warn!(error = %e, "Failed to update log filter from config");
        }
    } else {
        tracing::warn!(level = %config.logging.level, "Invalid log level in config, keeping debug");
    }

    if config.database.run_migrations {
        run_migrations(&config.database.connection_url()).await?;
    }

    let pool = connect(&config.database).await?;
    let provider: Arc<dyn DbProvider> = Arc::new(pool);

    tracing::info!("Database connection pool created.");

    let authenticator: Arc<dyn Authenticator> =
        Arc::new(DbAuthenticator::new(Arc::clone(&provider), &config.auth));
    let mailer: Arc<dyn Mailer> = Arc::new(OutboxMailer::new(Arc::clone(&provider)));

    let cors = Cors::new()
        .allow_origin(config.server.frontend_origin.as_str())
        .allow_methods(vec![
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers(vec!["authorization", "content-type"])
        .into_handler();

    let bind_addr = config.server.bind_address();
    let acceptor = TcpListener::new(bind_addr.clone()).bind().await;

    let services = SharedServices {
        settings: Arc::new(config),
        db: provider,
        authenticator,
        mailer,
    };
    let router = services.install(Router::new()).push(routes());

    let service = Service::new(router).hoop(Logger::new()).hoop(cors);

    tracing::info!("Server listening on {bind_addr}");

    salvo::Server::new(acceptor).serve(service).await;

    Ok(())
}
