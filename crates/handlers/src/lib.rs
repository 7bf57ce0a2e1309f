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

//! The authorization endpoint and everything it takes to fulfil a
//! request: ingesting and resolving PAR/JAR, validating against a
//! client's registration, resolving the browser session, issuing
//! login/consent challenges, and minting codes or hybrid/implicit
//! tokens.

mod challenge;
mod code;
mod consent;
mod dpop;
mod error;
mod resolve;
mod response;
mod routes;
mod session;
pub mod state;
mod tokens;
mod validate;

use axum::routing::{get, post};
use mas_router::{AUTHORIZATION_PATH, PAR_PATH};

pub use state::AppState;

/// The router this crate contributes to the server: `/authorize` and
/// `/par`. Nest this under whatever else the binary serves (JWKS,
/// discovery, static assets).
#[must_use]
pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route(
            AUTHORIZATION_PATH,
            get(routes::get_authorize).post(routes::post_authorize),
        )
        .route(PAR_PATH, post(routes::par))
}
