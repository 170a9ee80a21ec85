//! HTTP handlers for the recommendation service.

use actix_web::{web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

use crate::config::RecommendationConfig;
use crate::recommender::Recommender;
use crate::types::{RecommendRequest, RecommendResponse};

/// Shared application state. The recommender is read-only, so the workers
/// share one instance without locking.
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub limits: RecommendationConfig,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/recommendations", web::post().to(recommend));
}

async fn recommend(
    data: web::Data<AppState>,
    payload: web::Json<RecommendRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    let top_n = request.top_n.unwrap_or(data.limits.default_top_n);

    if top_n == 0 || top_n > data.limits.max_top_n {
        return HttpResponse::BadRequest().json(json!({
            "error": "top_n out of range",
            "message": format!("top_n must be within 1..={}", data.limits.max_top_n)
        }));
    }

    let recommendations = data.recommender.recommend(request.user_id, top_n);

    HttpResponse::Ok().json(RecommendResponse {
        results: recommendations.books,
        status: recommendations.status,
        generated_at: Utc::now(),
    })
}
