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

//! Wire-level shapes for the authorization request and response.
//!
//! [`RawAuthorizationRequest`] is deliberately untyped in most fields: it is
//! the thing `serde_urlencoded` / `serde_json` deserializes directly from
//! the query string, the form body, or a JAR token's claims, before the
//! validator gives each field real meaning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every parameter this authorization server recognizes on `/authorize`,
/// in a PAR push, or inside a JAR request object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawAuthorizationRequest {
    pub response_type: Option<String>,
    pub client_id: Option<String>,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub nonce: Option<String>,
    pub code_challenge: Option<String>,
    pub code_challenge_method: Option<String>,
    pub claims: Option<Value>,
    pub response_mode: Option<String>,
    pub prompt: Option<String>,
    pub max_age: Option<i64>,
    pub id_token_hint: Option<String>,
    pub acr_values: Option<String>,
    pub display: Option<String>,
    pub ui_locales: Option<String>,
    pub login_hint: Option<String>,

    /// RFC 9126.
    pub request_uri: Option<String>,
    /// RFC 9101.
    pub request: Option<String>,
    /// RFC 9449: the JWK thumbprint of the DPoP key the resulting code
    /// should be bound to, when the client pre-binds at the authorization
    /// endpoint rather than only at the token endpoint.
    pub dpop_jkt: Option<String>,

    /// Vendor extension: the organization this authorization is scoped to.
    pub org_id: Option<String>,
    /// Vendor extension: an actor the resulting token acts on behalf of.
    pub acting_as: Option<String>,

    // Continuation fields, only ever set on the internal redirect back from
    // the UI, never accepted verbatim from an external client.
    #[serde(rename = "_confirmed")]
    pub confirmed: Option<bool>,
    #[serde(rename = "_auth_time")]
    pub auth_time: Option<i64>,
    #[serde(rename = "_session_user_id")]
    pub session_user_id: Option<String>,
    #[serde(rename = "_consent_confirmed")]
    pub consent_confirmed: Option<bool>,
}

impl RawAuthorizationRequest {
    /// Overlay `other` on top of `self`, field by field, with `other`
    /// taking precedence whenever it is `Some`. Used both for PAR merge
    /// (draft overwritten by the pushed record) and JAR merge (draft
    /// overridden by verified claims).
    #[must_use]
    pub fn merged_with(self, other: Self) -> Self {
        macro_rules! pick {
            ($field:ident) => {
                other.$field.or(self.$field)
            };
        }

        Self {
            response_type: pick!(response_type),
            client_id: pick!(client_id),
            redirect_uri: pick!(redirect_uri),
            scope: pick!(scope),
            state: pick!(state),
            nonce: pick!(nonce),
            code_challenge: pick!(code_challenge),
            code_challenge_method: pick!(code_challenge_method),
            claims: pick!(claims),
            response_mode: pick!(response_mode),
            prompt: pick!(prompt),
            max_age: pick!(max_age),
            id_token_hint: pick!(id_token_hint),
            acr_values: pick!(acr_values),
            display: pick!(display),
            ui_locales: pick!(ui_locales),
            login_hint: pick!(login_hint),
            request_uri: pick!(request_uri),
            request: pick!(request),
            dpop_jkt: pick!(dpop_jkt),
            org_id: pick!(org_id),
            acting_as: pick!(acting_as),
            confirmed: pick!(confirmed),
            auth_time: pick!(auth_time),
            session_user_id: pick!(session_user_id),
            consent_confirmed: pick!(consent_confirmed),
        }
    }
}

/// A `claims` request object's `userinfo` or `id_token` member: a map from
/// claim name to its (possibly absent) requirement object.
pub type ClaimsMember = BTreeMap<String, Option<Value>>;

/// The parsed `claims` parameter (OIDC Core §5.5).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimsRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo: Option<ClaimsMember>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<ClaimsMember>,
}

/// The minted access token response fragment embedded in a hybrid/implicit
/// authorization response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessTokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: i64,
}

impl AccessTokenResponse {
    #[must_use]
    pub fn new(access_token: String, expires_in: i64) -> Self {
        Self {
            access_token,
            token_type: "Bearer",
            expires_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_prefers_other_field_by_field() {
        let draft = RawAuthorizationRequest {
            client_id: Some("draft-client".to_owned()),
            state: Some("draft-state".to_owned()),
            ..Default::default()
        };
        let jar = RawAuthorizationRequest {
            client_id: Some("jar-client".to_owned()),
            nonce: Some("n1".to_owned()),
            ..Default::default()
        };
        let merged = draft.merged_with(jar);
        assert_eq!(merged.client_id.as_deref(), Some("jar-client"));
        assert_eq!(merged.state.as_deref(), Some("draft-state"));
        assert_eq!(merged.nonce.as_deref(), Some("n1"));
    }

    #[test]
    fn claims_request_parses_nested_object() {
        let raw = serde_json::json!({
            "userinfo": {"email": null, "email_verified": {"essential": true}},
            "id_token": {"acr": {"essential": true, "value": "urn:mace:incommon:iap:silver"}}
        });
        let parsed: ClaimsRequest = serde_json::from_value(raw).unwrap();
        assert!(parsed.userinfo.unwrap().contains_key("email"));
        assert!(parsed.id_token.unwrap().contains_key("acr"));
    }
}
