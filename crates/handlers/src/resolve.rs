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

//! Resolving the draft query-string request into its final shape: pulling
//! in a pushed request by `request_uri` (RFC 9126), or verifying and
//! merging a JWT-Secured Authorization Request (RFC 9101).

use chrono::Utc;
use mas_data_model::ClientMetadata;
use mas_jose::crypto::CryptoService;
use mas_storage::{memory::MemoryStores, StorageError};
use oauth2_types::requests::RawAuthorizationRequest;
use thiserror::Error;

use crate::state::Crypto;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("request_uri has expired or was already used")]
    ParNotFound,

    #[error("request_uri scheme is not supported by this server")]
    RequestUriNotSupported,

    #[error("request object is malformed")]
    MalformedRequestObject,

    #[error("request object uses alg=none, which this server does not accept")]
    NoneAlgorithmRejected,

    #[error(transparent)]
    Crypto(#[from] mas_jose::crypto::CryptoError),
}

/// If `draft.request_uri` is set, consume the matching PAR record and
/// overlay it; RFC 9126's `urn:ietf:params:oauth:request_uri:` scheme is
/// the only one this server redeems. The HTTPS scheme from RFC 9101 is
/// recognized but rejected with `request_uri_not_supported`, since no
/// outbound HTTP client is wired into this server.
pub async fn resolve_request_uri(
    stores: &MemoryStores,
    draft: RawAuthorizationRequest,
) -> Result<RawAuthorizationRequest, ResolveError> {
    let Some(request_uri) = draft.request_uri.clone() else {
        return Ok(draft);
    };

    if !request_uri.starts_with("urn:ietf:params:oauth:request_uri:") {
        return Err(ResolveError::RequestUriNotSupported);
    }

    let par = stores
        .par
        .consume(&request_uri, Utc::now())
        .await
        .map_err(|err| match err {
            StorageError::NotFound | StorageError::AlreadyConsumed | StorageError::Expired => {
                ResolveError::ParNotFound
            }
        })?;

    Ok(draft.merged_with(par.params))
}

/// If `draft.request` is set, verify the JAR object (JWS, optionally
/// nested in a JWE) and overlay its claims on top of the draft.
pub async fn resolve_request_object(
    crypto: &Crypto,
    client: &ClientMetadata,
    allow_none_algorithm: bool,
    draft: RawAuthorizationRequest,
) -> Result<RawAuthorizationRequest, ResolveError> {
    let Some(request) = draft.request.clone() else {
        return Ok(draft);
    };

    let compact = decrypt_if_needed(crypto, &request).await?;
    let claims = verify_request_object(crypto, client, allow_none_algorithm, &compact)?;

    Ok(draft.merged_with(claims))
}

async fn decrypt_if_needed(crypto: &Crypto, token: &str) -> Result<String, ResolveError> {
    // A JWE compact serialization has five dot-separated segments; a JWS
    // has three.
    if token.split('.').count() == 5 {
        let plaintext = crypto.decrypt_jwe(token).await?;
        String::from_utf8(plaintext).map_err(|_| ResolveError::MalformedRequestObject)
    } else {
        Ok(token.to_owned())
    }
}

fn verify_request_object(
    crypto: &Crypto,
    client: &ClientMetadata,
    allow_none_algorithm: bool,
    token: &str,
) -> Result<RawAuthorizationRequest, ResolveError> {
    let header = mas_jose::jwt::peek_raw_header(token)
        .map_err(|_| ResolveError::MalformedRequestObject)?;

    if mas_jose::jwt::is_alg_none(&header) {
        if !allow_none_algorithm {
            return Err(ResolveError::NoneAlgorithmRejected);
        }
        return parse_unverified_claims(token);
    }

    let jwks = client
        .jwks
        .as_ref()
        .ok_or(ResolveError::MalformedRequestObject)?;

    let typed_header =
        mas_jose::jwt::peek_header_typed(token).map_err(|_| ResolveError::MalformedRequestObject)?;

    Ok(CryptoService::<dyn mas_jose::keys::KeyManager>::verify_against_jwks(
        jwks,
        typed_header.alg,
        typed_header.kid.as_deref(),
        token,
    )?)
}

fn parse_unverified_claims(token: &str) -> Result<RawAuthorizationRequest, ResolveError> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or(ResolveError::MalformedRequestObject)?;
    let bytes = data_encoding::BASE64URL_NOPAD
        .decode(payload.as_bytes())
        .map_err(|_| ResolveError::MalformedRequestObject)?;
    serde_json::from_slice(&bytes).map_err(|_| ResolveError::MalformedRequestObject)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use mas_data_model::PushedAuthorizationRequest;

    use super::*;

    fn unsigned_jwt(claims: &serde_json::Value) -> String {
        let header = serde_json::json!({ "alg": "none" });
        let encode = |v: &serde_json::Value| {
            data_encoding::BASE64URL_NOPAD.encode(serde_json::to_vec(v).unwrap().as_slice())
        };
        format!("{}.{}.", encode(&header), encode(claims))
    }

    #[tokio::test]
    async fn unknown_request_uri_is_rejected() {
        let stores = MemoryStores::new(Vec::new());
        let draft = RawAuthorizationRequest {
            request_uri: Some("urn:ietf:params:oauth:request_uri:missing".to_owned()),
            ..Default::default()
        };

        let err = resolve_request_uri(&stores, draft).await.unwrap_err();
        assert!(matches!(err, ResolveError::ParNotFound));
    }

    #[tokio::test]
    async fn https_request_uri_scheme_is_unsupported() {
        let stores = MemoryStores::new(Vec::new());
        let draft = RawAuthorizationRequest {
            request_uri: Some("https://client.example/request.jwt".to_owned()),
            ..Default::default()
        };

        let err = resolve_request_uri(&stores, draft).await.unwrap_err();
        assert!(matches!(err, ResolveError::RequestUriNotSupported));
    }

    #[tokio::test]
    async fn pushed_request_is_consumed_and_merged_in() {
        let stores = MemoryStores::new(Vec::new());
        let now = Utc::now();
        stores
            .par
            .insert(PushedAuthorizationRequest {
                request_uri: "urn:ietf:params:oauth:request_uri:abc".to_owned(),
                client_id: "client1".to_owned(),
                params: RawAuthorizationRequest {
                    client_id: Some("client1".to_owned()),
                    scope: Some("openid".to_owned()),
                    ..Default::default()
                },
                created_at: now,
                expires_at: now + Duration::seconds(60),
            })
            .await
            .unwrap();

        let draft = RawAuthorizationRequest {
            request_uri: Some("urn:ietf:params:oauth:request_uri:abc".to_owned()),
            ..Default::default()
        };

        let resolved = resolve_request_uri(&stores, draft).await.unwrap();
        assert_eq!(resolved.client_id.as_deref(), Some("client1"));
        assert_eq!(resolved.scope.as_deref(), Some("openid"));

        // A second redemption attempt fails: PAR records are single-use.
        let replay = RawAuthorizationRequest {
            request_uri: Some("urn:ietf:params:oauth:request_uri:abc".to_owned()),
            ..Default::default()
        };
        assert!(matches!(
            resolve_request_uri(&stores, replay).await.unwrap_err(),
            ResolveError::ParNotFound
        ));
    }

    #[test]
    fn unsigned_request_object_is_rejected_by_default() {
        let claims = serde_json::json!({ "scope": "openid" });
        let token = unsigned_jwt(&claims);
        let header = mas_jose::jwt::peek_raw_header(&token).unwrap();
        assert!(mas_jose::jwt::is_alg_none(&header));

        let err = verify_request_object(
            &CryptoService::<dyn mas_jose::keys::KeyManager>::new(std::sync::Arc::new(
                NoKeys,
            )),
            &no_jwks_client(),
            false,
            &token,
        )
        .unwrap_err();
        assert!(matches!(err, ResolveError::NoneAlgorithmRejected));
    }

    #[test]
    fn unsigned_request_object_is_accepted_when_allowed() {
        let claims = serde_json::json!({ "scope": "openid", "state": "xyz" });
        let token = unsigned_jwt(&claims);

        let resolved = verify_request_object(
            &CryptoService::<dyn mas_jose::keys::KeyManager>::new(std::sync::Arc::new(
                NoKeys,
            )),
            &no_jwks_client(),
            true,
            &token,
        )
        .unwrap();
        assert_eq!(resolved.scope.as_deref(), Some("openid"));
        assert_eq!(resolved.state.as_deref(), Some("xyz"));
    }

    struct NoKeys;

    #[async_trait::async_trait]
    impl mas_jose::keys::KeyManager for NoKeys {
        async fn active_with_private(&self) -> Result<mas_jose::keys::ActiveKey, mas_jose::keys::KeyError> {
            Err(mas_jose::keys::KeyError::Unavailable)
        }

        async fn rotate(&self) -> Result<mas_jose::keys::ActiveKey, mas_jose::keys::KeyError> {
            Err(mas_jose::keys::KeyError::Unavailable)
        }

        async fn jwks(&self) -> jsonwebtoken::jwk::JwkSet {
            jsonwebtoken::jwk::JwkSet { keys: Vec::new() }
        }
    }

    fn no_jwks_client() -> ClientMetadata {
        ClientMetadata {
            client_id: "client1".to_owned(),
            redirect_uris: vec!["https://app.example/callback".parse().unwrap()],
            response_types: vec!["code".parse().unwrap()],
            token_endpoint_auth_method: mas_data_model::TokenEndpointAuthMethod::ClientSecretBasic,
            default_max_age: None,
            require_auth_time: false,
            require_pushed_authorization_requests: false,
            request_object_signing_alg: None,
            jwks: None,
            jarm: Default::default(),
        }
    }
}
