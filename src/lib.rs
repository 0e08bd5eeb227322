pub mod adapters;
pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod services;
pub mod state;

#[cfg(test)]
pub mod testing;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn,
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::warn;

use crate::config::SecurityConfig;
use crate::middleware::{jwt_auth_middleware, require_admin};

pub use crate::state::{AppState, Repositories};

/// The full HTTP surface over `state`.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.api.max_request_size_bytes;
    let cors = cors_layer(&state.config.security);

    Router::new()
        .merge(public_routes())
        .nest("/api/v1", protected_routes(state.clone()).merge(elevated_routes(state.clone())))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/api", get(public::home))
        .route("/api/healthcheck", get(public::healthcheck))
        .route("/api/v1/login", post(public::login))
        .route("/api/v1/register", post(public::register))
}

fn protected_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{contexts, documents, languages, notes, users};

    Router::new()
        .route("/users", patch(users::update_user))
        .route("/users/:id", get(users::get_user).delete(users::delete_user))
        .route("/users/:id/:role", patch(users::set_role))
        .route("/notes", post(notes::create_note).get(notes::list_notes).patch(notes::update_note))
        .route("/notes/:id", get(notes::get_note).delete(notes::delete_note))
        .route("/languages", get(languages::list_languages))
        .route("/languages/:id", get(languages::get_language))
        .route("/documents", post(documents::create_document).get(documents::list_documents))
        .route("/documents/bulk", post(documents::create_documents))
        .route("/documents/:id", get(documents::get_document).delete(documents::delete_document))
        .route(
            "/contexts",
            post(contexts::create_context).get(contexts::list_contexts).patch(contexts::update_context),
        )
        .route("/contexts/:id", get(contexts::get_context).delete(contexts::delete_context))
        .route("/contexts/:id/reset", post(contexts::reset_context))
        .route("/contexts/:id/prompts", get(contexts::list_context_prompts))
        .route("/contexts/:id/messages", post(contexts::send_message))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

fn elevated_routes(state: AppState) -> Router<AppState> {
    use handlers::elevated as admin;

    let routes = Router::new()
        .route("/users", get(admin::list_users))
        .route("/users/:id/makeadmin", patch(admin::make_admin))
        .route("/notes", get(admin::list_notes))
        .route(
            "/languages",
            get(admin::list_languages).post(admin::create_language).patch(admin::update_language),
        )
        .route("/languages/:id", delete(admin::delete_language))
        // Layers run outside-in: authenticate first, then check the role.
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware));

    Router::new().nest("/admin", routes)
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if security.cors_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {}", origin);
                None
            }
        })
        .collect();
    CorsLayer::permissive().allow_origin(origins)
}
