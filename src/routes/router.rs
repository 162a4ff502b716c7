use crate::core::error;
use crate::core::state::AppState;
use crate::routes::{admin, auth, projects};
use crate::utils;
use axum::error_handling::HandleErrorLayer;
use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{self, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::info_span;

const NO_STORE: &str = "no-store, no-cache, must-revalidate, proxy-revalidate";

pub(crate) fn routes(state: AppState) -> Router {
    // /api/admin/...
    let admin_router = Router::new()
        .route(
            "/projects",
            get(admin::list_projects).post(admin::update_project),
        )
        .route("/health", get(admin::health))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            utils::auth::authorize,
        ))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout));

    // /api/...
    let api_router = Router::new()
        .route("/projects", get(projects::get))
        .nest("/admin", admin_router)
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static(NO_STORE),
        ));

    Router::new()
        .route("/", get(|| async { "Hello, World!" }))
        .nest("/api", api_router)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                        let matched_path = request
                            .extensions()
                            .get::<MatchedPath>()
                            .map(MatchedPath::as_str);

                        info_span!(
                            "request",
                            method = ?request.method(),
                            matched_path,
                        )
                    }),
                )
                .layer(HandleErrorLayer::new(error::handle_middleware_errors))
                .buffer(128)
                .rate_limit(20, Duration::from_secs(1))
                .layer(
                    CorsLayer::new()
                        .allow_methods([Method::GET])
                        .allow_origin(cors::Any),
                ),
        )
}
