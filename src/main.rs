//! gymlog server entry point: load configuration, connect the pool, run
//! migrations, seed the default catalog, and serve the API.

mod config;
mod db;
mod error;
mod middleware;
mod models;
mod routes;

use anyhow::Result;
use axum::{
    routing::{get, patch, post},
    Router,
};
use config::Config;
use routes::{auth, AppState, *};
use sqlx::sqlite::SqlitePoolOptions;
use std::path::Path;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gymlog=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Starting gymlog server on {}:{}", config.host, config.port);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;

    db::catalog::seed_defaults(&pool).await?;

    let state = AppState {
        pool: pool.clone(),
        jwt_secret: config.jwt_secret.clone(),
        signup_access_code: config.signup_access_code.clone(),
    };

    let auth_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let api_routes = Router::new()
        .merge(auth_routes)
        .route("/muscle-groups", get(list_muscle_groups).post(create_muscle_group))
        .route(
            "/muscle-groups/{id}",
            patch(update_muscle_group).delete(delete_muscle_group),
        )
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/{id}", patch(update_tag).delete(delete_tag))
        .route("/exercises", get(list_exercises).post(create_exercise))
        .route(
            "/exercises/{id}",
            get(get_exercise).patch(update_exercise).delete(delete_exercise),
        )
        .route("/exercises/{id}/last-completion", get(last_completion))
        .route("/sessions", get(list_sessions).post(create_session))
        .route("/sessions/current", get(current_session))
        .route(
            "/sessions/{id}",
            get(get_session).patch(update_session).delete(delete_session),
        )
        .route("/sessions/{id}/close", post(close_session))
        .route("/sessions/{id}/reopen", post(reopen_session))
        .route("/exercise-completions", post(create_completion))
        .route(
            "/exercise-completions/{id}",
            get(get_completion).patch(update_completion).delete(delete_completion),
        )
        .route("/exercise-completions/{id}/last-values", get(last_values))
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/{id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/locations", get(list_locations).post(create_location))
        .route("/locations/most-recent", get(most_recent_location))
        .route(
            "/locations/{id}",
            get(get_location).patch(update_location).delete(delete_location),
        )
        .route("/health", get(health_check))
        .with_state(state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let frontend_dist = Path::new("../frontend/dist");
    let app = if frontend_dist.exists() {
        tracing::info!("Serving frontend static files from ../frontend/dist");

        let serve_dir = ServeDir::new("../frontend/dist")
            .not_found_service(ServeFile::new("../frontend/dist/index.html"));

        Router::new()
            .nest("/api/v1", api_routes)
            .fallback_service(serve_dir)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    } else {
        tracing::warn!("Frontend dist directory not found, serving API only");

        Router::new()
            .nest("/api/v1", api_routes)
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    };

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
