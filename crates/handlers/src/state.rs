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

//! The shared state every `/authorize`-adjacent handler is built against.

use std::sync::Arc;

use axum::extract::FromRef;
use mas_config::Config;
use mas_jose::{crypto::CryptoService, keys::KeyManager};
use mas_keystore::Encrypter;
use mas_storage::memory::MemoryStores;
use mas_templates::Templates;

pub type Crypto = CryptoService<dyn KeyManager>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub crypto: Arc<Crypto>,
    pub stores: Arc<MemoryStores>,
    pub templates: Templates,
    pub cookie_key: Encrypter,
}

impl FromRef<AppState> for Encrypter {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}

impl FromRef<AppState> for Templates {
    fn from_ref(state: &AppState) -> Self {
        state.templates.clone()
    }
}
