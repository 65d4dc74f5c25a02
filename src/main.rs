// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 GameBridge Contributors

use std::{env, net::SocketAddr};

use tracing_subscriber::EnvFilter;

use gamebridge_server::api::router;
use gamebridge_server::config::{Config, LOG_FORMAT_ENV};
use gamebridge_server::hmac_auth::RequestAuthenticator;
use gamebridge_server::keystore::KeystoreSigner;
use gamebridge_server::state::AppState;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    let format = env::var(LOG_FORMAT_ENV).unwrap_or_default();
    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() {
    init_tracing();

    let config = Config::from_env().expect("invalid configuration");

    // Unlock the signing key before binding. A server that cannot sign
    // must never accept a validate request.
    let signer = KeystoreSigner::from_file(&config.keystore_path, &config.keystore_passphrase)
        .expect("failed to unlock keystore");
    tracing::info!(address = %signer.address(), "keystore unlocked");

    let authenticator = RequestAuthenticator::new(config.hmac_secret.as_bytes());
    let app = router(AppState::new(signer, authenticator));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .expect("failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("failed to bind");
    tracing::info!(%addr, "gamebridge server listening (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server failed");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install ctrl-c handler");
    tracing::info!("shutdown signal received");
}
