use std::collections::HashMap;
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use http::header;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod dataset;

use dataset::{Dataset, YearSpan};

#[derive(Clone)]
struct AppState {
    dataset: Arc<Dataset>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let data_path =
        PathBuf::from(env::var("SERIES_DATA").unwrap_or_else(|_| "data/country-ppp.json".to_string()));
    let addr: SocketAddr = env::var("SERIES_ADDR")
        .unwrap_or_else(|_| "127.0.0.1:7071".to_string())
        .parse()
        .expect("invalid SERIES_ADDR");

    let dataset = match Dataset::load(&data_path).await {
        Ok(dataset) => {
            info!(countries = dataset.len(), "loaded series from {data_path:?}");
            dataset
        }
        Err(err) => {
            error!("series dataset {data_path:?} unavailable: {err}; serving an empty list");
            Dataset::default()
        }
    };

    let state = AppState {
        dataset: Arc::new(dataset),
    };

    info!("series server listening on http://{addr}");
    axum::serve(
        tokio::net::TcpListener::bind(addr).await.expect("bind SERIES_ADDR"),
        app(state),
    )
    .await
    .expect("server error");
}

fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/country-ppp", get(get_country_ppp))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_country_ppp(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let span = YearSpan::from_query(&params);
    info!(
        start = span.start,
        end = span.end,
        "filtering country series"
    );
    Json(state.dataset.filtered(span)).into_response()
}
