// SPDX-License-Identifier: Apache-2.0

#![forbid(unsafe_code)]

use civreg_server::{ApiConfig, AppState, build_router};
use civreg_store::{LocalMediaStore, SqliteStore};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.as_str() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

fn env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(default)
}

fn env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_i64(name: &str, default: i64) -> i64 {
    env::var(name)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}

fn env_path(name: &str, default: &str) -> PathBuf {
    PathBuf::from(env::var(name).unwrap_or_else(|_| default.to_string()))
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if env_bool("CIVREG_LOG_JSON", false) {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        let mut sigterm = signal(SignalKind::terminate()).expect("register SIGTERM");
        let mut sigint = signal(SignalKind::interrupt()).expect("register SIGINT");
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    init_tracing();

    let bind_addr = env::var("CIVREG_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let db_path = env_path("CIVREG_DB_PATH", "artifacts/civreg.db");
    let media_root = env_path("CIVREG_MEDIA_ROOT", "artifacts/media");
    let default_cfg = ApiConfig::default();

    let api_cfg = ApiConfig {
        max_upload_bytes: env_usize("CIVREG_MAX_UPLOAD_BYTES", default_cfg.max_upload_bytes),
        default_page_limit: env_u32("CIVREG_DEFAULT_PAGE_SIZE", default_cfg.default_page_limit),
        max_page_limit: env_u32("CIVREG_MAX_PAGE_SIZE", default_cfg.max_page_limit),
        token_secret: env::var("CIVREG_TOKEN_SECRET")
            .unwrap_or_else(|_| default_cfg.token_secret.clone()),
        token_ttl_millis: env_i64("CIVREG_TOKEN_TTL_MILLIS", default_cfg.token_ttl_millis),
        allow_seed: env_bool("CIVREG_ALLOW_SEED", false),
        spool_dir: env_path(
            "CIVREG_SPOOL_DIR",
            &default_cfg.spool_dir.to_string_lossy(),
        ),
    };

    let store = Arc::new(
        SqliteStore::open(&db_path).map_err(|e| format!("failed to open database: {e}"))?,
    );
    let media = Arc::new(LocalMediaStore::new(media_root));
    let state = AppState::from_sqlite(store, media, api_cfg);
    let app = build_router(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| format!("failed to bind {bind_addr}: {e}"))?;
    info!("civreg-server listening on {bind_addr}");
    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .map_err(|e| format!("server failed: {e}"))
}
