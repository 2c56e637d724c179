/*
 * Responsibility
 * - tracing / panic hook の初期化
 * - Config読み込み → 依存生成 (verifier / negotiator / gate / upstream) → Router 組み立て
 * - axum::serve() で起動
 */
use std::{net::SocketAddr, panic, process, sync::Arc};

use anyhow::Result;
use axum::Router;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::gate::Gate;
use crate::services::auth::build_auth_verifier;
use crate::services::locale::PrefixNegotiator;
use crate::services::upstream::Upstream;
use crate::state::AppState;
use crate::{api, middleware};

fn init_tracing() {
    // Prefer RUST_LOG if set; otherwise use a sensible default.
    // Ex:
    // RUST_LOG=info,edge_gate=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash the whole process so we notice immediately
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env()?;
    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting gate in {:?} mode on {} (upstream {})",
        config.app_env,
        config.addr,
        config.upstream_url
    );

    let state = build_state(&config)?;
    let app = build_router(state, &config);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    // ConnectInfo は upstream への X-Forwarded-For に使う
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

pub fn build_state(config: &Config) -> Result<AppState> {
    let verifier = build_auth_verifier(config)?;

    let routes = config.routes.clone();
    let negotiator = Arc::new(PrefixNegotiator::new(
        routes.locales().clone(),
        routes.ignored_prefixes().to_vec(),
    ));

    let gate = Arc::new(Gate::new(
        routes,
        negotiator,
        verifier,
        config.admin_role.clone(),
    ));
    let upstream = Upstream::new(config.upstream_url.clone(), config.body_limit_bytes)?;

    Ok(AppState::new(gate, upstream))
}

pub fn build_router(state: AppState, config: &Config) -> Router {
    let router = api::routes(state.clone()).with_state(state);

    middleware::http::apply(router, config)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
