use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};

use crate::api::{handlers, state::AppState};

pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Prediction endpoints
        .route(
            "/api/marksix/enhanced-predict",
            get(handlers::enhanced_predict),
        )
        .route("/api/marksix/case-analysis", get(handlers::case_analysis))
        .route(
            "/api/marksix/gann-square-popular-predict",
            get(handlers::gann_square_popular_predict),
        )
        // Add state and CORS
        .with_state(state)
        .layer(cors)
}
