// src/main.rs
use actix_web::{App, HttpResponse, HttpServer, middleware, web};
use anyhow::Context;
use log::info;
use std::sync::Arc;

mod brief;
mod color;
mod config;
mod errors;
mod handlers;
mod models;
mod schema;
mod services;

use crate::config::Config;
use crate::handlers::{
    catalog, clear_reference_image, create_session, delete_session, generate, get_session,
    reset_brief, set_camera, set_idea, set_ratio, set_reference_data_url, toggle_color,
    toggle_style_tag, upload_reference_image,
};
use crate::services::{
    GeminiService, GenerativeBackend, ImageAnalysisAdapter, ImageProcessor, SessionStore,
};

#[derive(Clone)]
pub struct AppState {
    session_store: Arc<SessionStore>,
    backend: Arc<dyn GenerativeBackend>,
    analysis_adapter: Arc<ImageAnalysisAdapter>,
    image_processor: Arc<ImageProcessor>,
}

impl AppState {
    pub fn new(backend: Arc<dyn GenerativeBackend>, max_image_dimension: u32) -> Self {
        Self {
            session_store: Arc::new(SessionStore::new()),
            analysis_adapter: Arc::new(ImageAnalysisAdapter::new(
                backend.clone(),
                color::SNAP_THRESHOLD,
            )),
            backend,
            image_processor: Arc::new(ImageProcessor::new(max_image_dimension)),
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    info!("Starting Prompt Creator service...");

    let config = Config::from_env().context("failed to load configuration")?;
    let backend = Arc::new(
        GeminiService::new(&config).context("failed to initialise the Gemini client")?,
    );
    info!(
        "Using {} model {} (timeout {:?})",
        backend.name(),
        config.gemini_model,
        config.request_timeout
    );

    let app_state = AppState::new(backend, config.max_image_dimension);

    info!("Starting HTTP server on {}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(middleware::Logger::default())
            .configure(routes)
    })
    .bind(&config.bind_addr)
    .with_context(|| format!("failed to bind {}", config.bind_addr))?
    .run()
    .await?;

    Ok(())
}

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .route("/catalog", web::get().to(catalog))
            .route("/sessions", web::post().to(create_session))
            .route("/sessions/{id}", web::get().to(get_session))
            .route("/sessions/{id}", web::delete().to(delete_session))
            .route("/sessions/{id}/idea", web::put().to(set_idea))
            .route("/sessions/{id}/camera", web::put().to(set_camera))
            .route("/sessions/{id}/ratio", web::put().to(set_ratio))
            .route(
                "/sessions/{id}/style-tags/toggle",
                web::post().to(toggle_style_tag),
            )
            .route("/sessions/{id}/colors/toggle", web::post().to(toggle_color))
            .route("/sessions/{id}/reset", web::post().to(reset_brief))
            .route(
                "/sessions/{id}/reference-image",
                web::post().to(upload_reference_image),
            )
            .route(
                "/sessions/{id}/reference-image",
                web::put().to(set_reference_data_url),
            )
            .route(
                "/sessions/{id}/reference-image",
                web::delete().to(clear_reference_image),
            )
            .route("/sessions/{id}/generate", web::post().to(generate)),
    )
    .route("/health", web::get().to(health_check));
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "prompt-creator",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
