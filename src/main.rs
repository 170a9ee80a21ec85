//! Book Recommendation Service
//!
//! Port: 8084
//! Serves `POST /recommendations` over an immutable factor model loaded at
//! startup.

use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

use bookrec::config::BookRecConfig;
use bookrec::model_store::ModelStore;
use bookrec::recommender::Recommender;
use bookrec::server::{self, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .json()
        .init();

    dotenvy::dotenv().ok();

    let config = BookRecConfig::load()?;
    config.validate()?;

    info!(
        "Starting Book Recommendation Service on port {}",
        config.server.port
    );

    let store = ModelStore::new(&config.model);
    let (model, catalog) = store
        .load_bundle(config.recommendation.popular_count)
        .context("Failed to load model bundle")?;

    let recommender = Arc::new(Recommender::new(model, catalog));
    let limits = config.recommendation.clone();
    let app_state = web::Data::new(AppState {
        recommender,
        limits,
    });

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Book Recommendation Service listening on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .route("/health", web::get().to(health_check))
            .configure(server::configure)
            .wrap(middleware::Logger::default())
    })
    .workers(config.server.workers.unwrap_or_else(num_cpus::get))
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "bookrec-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
