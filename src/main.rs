mod config;
mod db;
mod errors;
mod middleware;
mod models;
mod routes;
mod services;
mod utils;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::services::notifier::{Notifier, SendGridNotifier};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| std::io::Error::other(e.to_string()))?;

    tracing::info!("connecting to database");
    let db = db::establish_connection(&config.database_url)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to connect to database: {}", e)))?;

    db::ensure_schema(&db)
        .await
        .map_err(|e| std::io::Error::other(format!("Failed to create schema: {}", e)))?;
    tracing::info!("database ready");

    if config.email.sendgrid_api_key.is_none() {
        tracing::warn!("SENDGRID_API_KEY not set, emails will not be delivered");
    }
    let notifier: Arc<dyn Notifier> = Arc::new(SendGridNotifier::new(&config.email));

    let bind_addr = config.bind_addr.clone();
    let config = web::Data::new(config);
    let db = web::Data::new(db);
    let notifier = web::Data::from(notifier);

    tracing::info!(address = %bind_addr, "starting server");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .app_data(db.clone())
            .app_data(config.clone())
            .app_data(notifier.clone())
            .configure(routes::configure_routes)
    })
        .bind(bind_addr)?
        .run()
        .await
}
