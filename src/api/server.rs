//! HTTP server and router assembly

use axum::extract::FromRef;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{guard_pages, require_session, AuthGate};
use crate::config::Config;
use crate::error::Result;
use crate::store::Store;

use super::{auth as auth_api, cars, customers, financing, users, ApiResponse};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<Config>,
    pub gate: AuthGate,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>) -> Self {
        let gate = AuthGate::new(&config.auth);
        Self {
            store,
            config: Arc::new(config),
            gate,
        }
    }
}

impl FromRef<AppState> for AuthGate {
    fn from_ref(state: &AppState) -> Self {
        state.gate.clone()
    }
}

/// Run the HTTP server
pub async fn run_server(config: Config, store: Arc<dyn Store>, host: &str, port: u16) -> Result<()> {
    tokio::fs::create_dir_all(config.server.uploads_dir()).await?;

    let state = AppState::new(config, store);

    // Sweep revocation entries for tokens that have expired on their own
    let gate = state.gate.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(600));
        loop {
            interval.tick().await;
            gate.purge_revoked();
        }
    });

    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the router with all routes
pub fn create_router(state: AppState) -> Router {
    let gate = state.gate.clone();

    // The admin account area sits behind the session guard as a whole;
    // its handlers additionally require the admin role.
    let users_api = Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/{id}",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        .route_layer(middleware::from_fn_with_state(
            gate.clone(),
            require_session,
        ));

    Router::new()
        .route("/api/health", get(health))
        // Auth
        .route("/api/auth/login", axum::routing::post(auth_api::login))
        .route(
            "/api/auth/register",
            axum::routing::post(auth_api::register),
        )
        .route("/api/auth/logout", axum::routing::post(auth_api::logout))
        .route("/api/auth/me", get(auth_api::me))
        // Catalog
        .route("/api/cars", get(cars::list_cars).post(cars::create_car))
        .route(
            "/api/cars/{id}",
            get(cars::get_car)
                .put(cars::update_car)
                .delete(cars::delete_car),
        )
        // Customers
        .route(
            "/api/customers",
            get(customers::list_customers).post(customers::create_customer),
        )
        .route(
            "/api/customers/{id}",
            get(customers::get_customer)
                .put(customers::update_customer)
                .delete(customers::delete_customer),
        )
        // Financing partners
        .route(
            "/api/financing",
            get(financing::list_partners).post(financing::create_partner),
        )
        .route(
            "/api/financing/{id}",
            get(financing::get_partner)
                .put(financing::update_partner)
                .delete(financing::delete_partner),
        )
        // Financing proposals
        .route(
            "/api/financing-proposals",
            get(financing::list_proposals).post(financing::create_proposal),
        )
        .route(
            "/api/financing-proposals/{id}",
            get(financing::get_proposal)
                .put(financing::update_proposal)
                .delete(financing::delete_proposal),
        )
        .nest("/api/users", users_api)
        // Static site and uploads; the page guard below covers this too
        .fallback_service(ServeDir::new(&state.config.server.public_dir))
        // Middleware
        .layer(middleware::from_fn_with_state(gate, guard_pages))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(ApiResponse::ok("healthy")))
}
