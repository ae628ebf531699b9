mod assets;
mod config;
mod graphql;
mod memos;
mod storage;

use std::path::Path;
use std::sync::Arc;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::http::HeaderValue;
use axum::{extract::State, response::Html, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tracing_subscriber::EnvFilter;

use config::{Config, MemoBackend};
use graphql::Schema;
use memos::{GitHubStore, SharedMemoStore};

async fn graphql_handler(State(schema): State<Schema>, req: GraphQLRequest) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

async fn graphiql() -> Html<String> {
    Html(
        async_graphql::http::GraphiQLSource::build()
            .endpoint("/graphql")
            .finish(),
    )
}

/// Build a cache-controlled static file router.
///
/// Takes the directory as an argument so tests can point it at a tempdir.
fn cached_static_router(dir: &Path, cache_header: &'static str) -> Router {
    let layer = SetResponseHeaderLayer::overriding(
        axum::http::header::CACHE_CONTROL,
        HeaderValue::from_static(cache_header),
    );
    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(layer)
}

const CACHE_1DAY: &str = "public, max-age=86400, must-revalidate";
const CACHE_IMMUTABLE: &str = "public, max-age=31536000, immutable";

/// Build the full application router.
fn build_app(
    schema: Schema,
    memo_store: SharedMemoStore,
    assets_dir: &Path,
    dist_dir: &Path,
) -> Router {
    // Static file routers are stateless, merge them before adding app state
    let static_files = Router::new()
        .nest(
            "/static",
            cached_static_router(assets_dir, CACHE_1DAY),
        )
        .nest(
            "/dist",
            cached_static_router(dist_dir, CACHE_IMMUTABLE),
        )
        .nest(
            "/assets",
            cached_static_router(&dist_dir.join("assets"), CACHE_IMMUTABLE),
        );

    Router::new()
        .route("/graphql", get(graphiql).post(graphql_handler))
        .route("/", get(serve_index))
        .with_state(schema)
        .merge(memos::router(memo_store))
        .merge(static_files)
        .layer(CorsLayer::permissive())
}

fn memo_store(config: &Config) -> SharedMemoStore {
    match config.memo_backend {
        MemoBackend::GitHub => {
            if config.github.token.is_none() {
                tracing::warn!("GITHUB_TOKEN not set; memo endpoints will fail");
            }
            Arc::new(GitHubStore::new(config.github.clone()))
        }
        MemoBackend::Redb => {
            if let Some(parent) = config.db_path.parent() {
                std::fs::create_dir_all(parent).expect("Failed to create database directory");
            }
            storage::Storage::open(&config.db_path).expect("Failed to open memo database")
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env();

    let loaded_assets = match assets::Assets::load(&config.assets_dir) {
        Ok(assets) => assets,
        Err(e) => {
            tracing::error!(error = %e, "Catalog unavailable, serving an empty one");
            assets::Assets::empty()
        }
    };
    let schema = graphql::build_schema(Arc::new(loaded_assets));
    let app = build_app(
        schema,
        memo_store(&config),
        &config.assets_dir,
        Path::new("dist"),
    );

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!(port = config.port, backend = ?config.memo_backend, "Server running at http://localhost:{}", config.port);
    tracing::info!("GraphiQL playground at http://localhost:{}/graphql", config.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}

async fn serve_index() -> Html<String> {
    // Try to serve the built frontend, fall back to a simple message
    match std::fs::read_to_string("dist/index.html") {
        Ok(html) => Html(html),
        Err(_) => Html(
            r#"<!DOCTYPE html>
<html>
<head><title>Map Memo Board</title></head>
<body>
<h1>Map Memo Board</h1>
<p>Frontend not built yet. Visit <a href="/graphql">GraphiQL</a> to explore the catalog.</p>
</body>
</html>"#
                .to_string(),
        ),
    }
}
