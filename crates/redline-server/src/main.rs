use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, response::Redirect, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use redline_api::AppStateInner;
use redline_api::archive::ArchivePaths;
use redline_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "redline=debug,redline_api=debug,redline_db=debug,tower_http=debug".into()
            }),
        )
        .init();

    // Config
    let db_path = std::env::var("REDLINE_DB_PATH").unwrap_or_else(|_| "redline.db".into());
    let host = std::env::var("REDLINE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("REDLINE_PORT")
        .unwrap_or_else(|_| "8000".into())
        .parse()?;
    let archive_dir = std::env::var("REDLINE_ARCHIVE_DIR").unwrap_or_else(|_| ".".into());

    // Init database
    let db = Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let state = Arc::new(AppStateInner {
        db,
        archive: ArchivePaths::in_dir(&PathBuf::from(archive_dir)),
    });

    // Routes
    let app = Router::new()
        .route("/", get(home))
        .merge(redline_api::router(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Redline server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn home() -> Redirect {
    Redirect::to("/feedback/")
}
