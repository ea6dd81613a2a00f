use actix_files::Files;
use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use futures::{StreamExt, TryStreamExt};
use log::{error, info};
use serde_json::json;
use shared::PredictionResponse;
use std::io::Write;
use uuid::Uuid;

use crate::classes;
use crate::classifier::registry::ModelRegistry;
use crate::error::ApiError;

pub struct UploadLimits {
    pub max_upload_bytes: usize,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig, static_dir: String) {
    configure_api(cfg);
    cfg.service(Files::new("/", static_dir).index_file("index.html"));
}

pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/api/predict").route(web::post().to(handle_predict)))
        .service(web::resource("/api/models").route(web::get().to(list_models)))
        .service(web::resource("/api/classes").route(web::get().to(list_classes)))
        .service(web::resource("/api/health").route(web::get().to(health)));
}

async fn handle_predict(
    registry: web::Data<ModelRegistry>,
    limits: web::Data<UploadLimits>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let request_id = Uuid::new_v4();
    let mut image_data: Vec<u8> = Vec::new();
    let mut model_key: Option<String> = None;

    while let Ok(Some(mut field)) = payload.try_next().await {
        let name = field.name().unwrap_or("").to_string();
        let mut data = Vec::new();
        while let Some(chunk) = field.next().await {
            let bytes = chunk.map_err(|e| ApiError::Upload(e.to_string()))?;
            if data.len() + bytes.len() > limits.max_upload_bytes {
                return Err(ApiError::PayloadTooLarge(limits.max_upload_bytes));
            }
            data.write_all(&bytes)
                .map_err(|e| ApiError::Upload(e.to_string()))?;
        }
        match name.as_str() {
            "image" => image_data = data,
            "model" => {
                let key = String::from_utf8(data)
                    .map_err(|_| ApiError::InvalidField("model".to_string()))?;
                let key = key.trim().to_string();
                if !key.is_empty() {
                    model_key = Some(key);
                }
            }
            _ => {}
        }
    }

    if image_data.is_empty() {
        return Err(ApiError::MissingImage);
    }

    let key = model_key.unwrap_or_else(|| registry.default_key().to_string());
    let classifier = registry.get_or_load(&key).await?;

    info!(
        "[{}] Running '{}' on a {} byte upload",
        request_id,
        key,
        image_data.len()
    );

    let prediction = classifier.predict(&image_data).map_err(|e| {
        error!("[{}] Inference failed: {}", request_id, e);
        ApiError::from(e)
    })?;

    let class_name = classes::class_name(prediction.class_index)
        .ok_or(ApiError::ClassOutOfRange(prediction.class_index))?;
    let (plant, condition) = classes::split_label(class_name);

    let response = PredictionResponse {
        model: key,
        class_name: class_name.to_string(),
        plant,
        condition,
        healthy: classes::is_healthy(class_name),
        confidence: prediction.confidence(),
        probabilities: prediction.probabilities,
    };

    info!(
        "[{}] Predicted '{}' at {:.1}%",
        request_id, response.class_name, response.confidence
    );
    Ok(HttpResponse::Ok().json(response))
}

async fn list_models(registry: web::Data<ModelRegistry>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "default": registry.default_key(),
        "models": registry.menu().await,
    }))
}

async fn list_classes() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "classes": &classes::CLASS_NAMES[..] }))
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}
