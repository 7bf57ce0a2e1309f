// Copyright 2022 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Wiring [`mas_handlers::AppState`] together and serving it.

use std::{sync::Arc, time::Duration};

use mas_config::Config;
use mas_data_model::ClientMetadata;
use mas_handlers::state::{AppState, Crypto};
use mas_jose::{crypto::CryptoService, keys::KeyManager};
use mas_keystore::{Encrypter, Keystore};
use mas_storage::memory::MemoryStores;
use mas_templates::Templates;
use tower_http::cors::CorsLayer;

/// How often the in-memory stores sweep out expired codes, PAR records,
/// and challenges. Correctness never depends on this running; it only
/// bounds how much dead state accumulates between sweeps.
const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

pub async fn run(config: Config, seed_clients: Vec<ClientMetadata>) -> anyhow::Result<()> {
    let bind_address = config.http.bind_address.clone();
    let port = config.http.port;

    let keystore = Arc::new(Keystore::generate().await?);
    let crypto: Arc<Crypto> = Arc::new(CryptoService::<dyn KeyManager>::new(keystore));
    let stores = Arc::new(MemoryStores::new(seed_clients));
    let templates = Templates::load()?;

    let state = AppState {
        config: Arc::new(config),
        crypto,
        stores: stores.clone(),
        templates,
        cookie_key: Encrypter::generate(),
    };

    spawn_sweeper(stores);

    let app = mas_handlers::router()
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("{bind_address}:{port}").parse()?;
    tracing::info!(%addr, "listening");

    hyper::Server::bind(&addr)
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn spawn_sweeper(stores: Arc<MemoryStores>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            stores.sweep_expired(chrono::Utc::now());
        }
    });
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("failed to install Ctrl+C handler");
    tracing::info!("shutting down");
}
