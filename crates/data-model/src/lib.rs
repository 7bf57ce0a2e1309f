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

//! The domain entities behind the authorization endpoint: clients,
//! in-flight requests, sessions, consent, challenges, pushed requests,
//! and the codes they eventually produce.

mod challenge;
mod client;
mod code;
mod consent;
mod par;
mod request;
mod session;

pub use challenge::{Challenge, ChallengeKind};
pub use client::{
    AuthorizationSigningPreferences, ClientMetadata, ClientMetadataError, TokenEndpointAuthMethod,
};
pub use code::{generate_code_value, AuthorizationCode};
pub use consent::ConsentRecord;
pub use par::{generate_request_uri, PushedAuthorizationRequest};
pub use request::{AuthorizationRequest, RequestStage};
pub use session::Session;
