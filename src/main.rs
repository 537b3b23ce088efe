//! The lodge's chore schedule server

use async_graphql::http::{playground_source, GraphQLPlaygroundConfig};
use async_graphql::{Request, Response};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use lodge::config::Config;
use lodge::error::{LodgeError, LodgeResult};
use lodge::graphql::{build_schema, LodgeSchema};
use lodge::models::user::User;

/// The header the host sets to the username of whoever it logged in.
const REMOTE_USER: &str = "X-Remote-User";

#[derive(Clone)]
struct AppState {
    schema: LodgeSchema,
    pool: SqlitePool,
    api_url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let pool = lodge::db::connect(&config).await?;
    let address = config.address;

    let state = AppState {
        schema: build_schema(pool.clone(), config.clone()),
        pool,
        api_url: config.api_url,
    };
    let app = Router::new()
        .route("/", get(playground).post(query))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(address).await?;
    tracing::info!(%address, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,lodge=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}

async fn query(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<Request>,
) -> LodgeResult<Json<Response>> {
    let mut request = request;
    if let Some(username) = remote_user(&headers)? {
        match User::with_username_opt(username, &state.pool).await? {
            Some(user) => request = request.data(user),
            None => tracing::warn!(username, "no user matches the forwarded username"),
        }
    }

    Ok(Json(state.schema.execute(request).await))
}

async fn playground(State(state): State<AppState>, headers: HeaderMap) -> LodgeResult<Html<String>> {
    let mut config = GraphQLPlaygroundConfig::new(&state.api_url);
    if let Some(username) = remote_user(&headers)? {
        config = config.with_header(REMOTE_USER, username);
    }

    Ok(Html(playground_source(config)))
}

fn remote_user(headers: &HeaderMap) -> LodgeResult<Option<&str>> {
    headers
        .get(REMOTE_USER)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| LodgeError::Invalid(format!("{} must be valid text", REMOTE_USER)))
        })
        .transpose()
}
