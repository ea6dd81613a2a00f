mod classes;
mod classifier;
mod error;
mod routes;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use classifier::config::ModelManifest;
use classifier::registry::ModelRegistry;
use routes::{UploadLimits, configure_routes};
use std::env;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    if let Ok(current_dir) = env::current_dir() {
        log::info!("Current working directory: {}", current_dir.display());
    }

    let static_dir = if let Ok(manifest_dir) = env::var("CARGO_MANIFEST_DIR") {
        format!("{}/../static", manifest_dir)
    } else {
        "/usr/src/app/static".to_string()
    };

    let manifest = ModelManifest::load().map_err(|e| {
        std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Failed to load model manifest: {e}"),
        )
    })?;
    log::info!(
        "Model menu: {} classifiers, default '{}'",
        manifest.models.len(),
        manifest.default
    );

    let registry = ModelRegistry::new(manifest);
    if let Err(e) = registry.preload_default().await {
        log::error!("Failed to preload default model at startup: {e}");
        return Err(std::io::Error::new(
            std::io::ErrorKind::Other,
            format!("Model loading failed: {e}"),
        ));
    }

    let registry = web::Data::new(registry);
    let limits = web::Data::new(UploadLimits {
        max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
    });

    let port = env::var("PORT").unwrap_or_else(|_| "8081".to_string());
    let bind_address = format!("0.0.0.0:{}", port);
    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allowed_methods(vec!["GET", "POST", "OPTIONS"])
                    .allowed_headers(vec![
                        actix_web::http::header::ACCEPT,
                        actix_web::http::header::CONTENT_TYPE,
                    ])
                    .max_age(3600),
            )
            .app_data(registry.clone())
            .app_data(limits.clone())
            .configure(|cfg| configure_routes(cfg, static_dir.clone()))
    })
    .bind(&bind_address)?
    .run()
    .await
}
