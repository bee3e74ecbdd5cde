use axum::{middleware, routing::get, Extension, Router};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;
use crate::{auth, controllers};

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(controllers::health))
        .route("/users", get(controllers::list_users).post(controllers::create_user))
        .route(
            "/users/:id",
            get(controllers::get_user)
                .put(controllers::update_user)
                .delete(controllers::delete_user),
        )
        .route(
            "/hidden",
            get(controllers::hidden).route_layer(middleware::from_fn(auth::require_basic_auth)),
        )
        .route("/messages", get(controllers::list_messages).post(controllers::create_message))
        .route("/messages/:id", get(controllers::get_message))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}
