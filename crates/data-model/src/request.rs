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

//! The authorization request entity: a validated, in-flight `/authorize`
//! call, from the moment it is resolved (PAR/JAR merged in, parameters
//! checked) to the moment it is fulfilled or abandoned.

use chrono::{DateTime, Utc};
use oauth2_types::{
    pkce::CodeChallenge, prompt::PromptSet, requests::RawAuthorizationRequest,
    response_mode::ResponseMode, response_type::ResponseTypeSet, scope::Scope,
};
use serde::{Deserialize, Serialize};
use ulid::Ulid;
use url::Url;

/// Where an authorization request currently sits in the login/consent
/// hand-off. Each variant is a dead end an expired request can be found
/// in if the user abandons the browser tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStage {
    /// Parsed and validated, no user session resolved yet.
    Pending,
    /// A challenge was issued and is waiting on the user to authenticate.
    AwaitingLogin,
    /// The user is authenticated; waiting on consent.
    AwaitingConsent,
    /// A code (and/or hybrid/implicit artifacts) has been issued.
    Fulfilled,
    /// The user declined, or the request expired before completion.
    Cancelled,
}

/// A fully resolved, validated `/authorize` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub id: Ulid,
    pub client_id: String,
    pub redirect_uri: Url,
    pub response_type: ResponseTypeSet,
    pub response_mode: ResponseMode,
    pub scope: Scope,
    pub state: Option<String>,
    pub nonce: Option<String>,
    pub code_challenge: Option<CodeChallenge>,
    pub prompt: PromptSet,
    pub max_age: Option<i64>,
    pub login_hint: Option<String>,
    pub acr_values: Option<String>,
    pub org_id: Option<String>,
    pub acting_as: Option<String>,
    pub dpop_jkt: Option<String>,
    pub stage: RequestStage,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthorizationRequest {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    #[must_use]
    pub fn requires_pkce(&self, client_is_public: bool) -> bool {
        client_is_public || self.code_challenge.is_some()
    }

    /// Serialize back to the wire shape carried over the internal
    /// login/consent redirect chain, so the UI steps round-trip the
    /// resolved parameters rather than re-deriving them.
    #[must_use]
    pub fn to_raw(&self) -> RawAuthorizationRequest {
        RawAuthorizationRequest {
            response_type: Some(self.response_type.to_string()),
            client_id: Some(self.client_id.clone()),
            redirect_uri: Some(self.redirect_uri.to_string()),
            scope: Some(self.scope.to_string()),
            state: self.state.clone(),
            nonce: self.nonce.clone(),
            code_challenge: self.code_challenge.as_ref().map(|c| c.code_challenge.clone()),
            code_challenge_method: self
                .code_challenge
                .as_ref()
                .map(|c| c.code_challenge_method.to_string()),
            response_mode: Some(self.response_mode.to_string()),
            prompt: Some(self.prompt.to_string()),
            max_age: self.max_age,
            login_hint: self.login_hint.clone(),
            acr_values: self.acr_values.clone(),
            org_id: self.org_id.clone(),
            acting_as: self.acting_as.clone(),
            ..RawAuthorizationRequest::default()
        }
    }
}
