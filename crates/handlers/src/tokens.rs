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

//! Minting the `id_token` and `access_token` artifacts an implicit or
//! hybrid response hands back directly in the authorization response,
//! rather than leaving them for the token endpoint.

use chrono::{DateTime, Utc};
use mas_jose::crypto::{CryptoError, CryptoService};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::state::Crypto;

#[derive(Serialize)]
#[cfg_attr(test, derive(Deserialize))]
struct IdTokenClaims {
    iss: String,
    sub: String,
    aud: String,
    exp: i64,
    iat: i64,
    auth_time: i64,
    nonce: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    c_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    at_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    acr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sid: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(test, derive(Deserialize))]
struct AccessTokenClaims {
    iss: String,
    sub: String,
    aud: String,
    client_id: String,
    scope: String,
    jti: String,
    exp: i64,
    iat: i64,
}

/// Default lifetime of a hybrid/implicit `access_token` minted directly
/// from the authorization endpoint.
pub const ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;

/// Mint a signed `access_token` for the implicit/hybrid `token` response
/// type: a JWT carrying the same issuer/subject/audience/scope a token
/// endpoint response would, so resource servers can verify it the same
/// way regardless of which flow produced it.
pub async fn mint_access_token(
    crypto: &Crypto,
    issuer: &str,
    subject: &str,
    client_id: &str,
    scope: &oauth2_types::scope::Scope,
) -> Result<String, CryptoError> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    let claims = AccessTokenClaims {
        iss: issuer.to_owned(),
        sub: subject.to_owned(),
        aud: issuer.to_owned(),
        client_id: client_id.to_owned(),
        scope: scope.to_string(),
        jti: mas_data_model::generate_code_value(&mut rng),
        exp: (now + chrono::Duration::seconds(ACCESS_TOKEN_TTL_SECONDS)).timestamp(),
        iat: now.timestamp(),
    };

    let (jwt, _kid) = crypto.sign(&claims).await?;
    Ok(jwt)
}

#[allow(clippy::too_many_arguments)]
pub async fn mint_id_token(
    crypto: &Crypto,
    issuer: &str,
    subject: &str,
    client_id: &str,
    auth_time: DateTime<Utc>,
    nonce: Option<String>,
    acr: Option<String>,
    code: Option<&str>,
    access_token: Option<&str>,
    sid: Option<String>,
    ttl: chrono::Duration,
) -> Result<String, CryptoError> {
    let now = Utc::now();
    let claims = IdTokenClaims {
        iss: issuer.to_owned(),
        sub: subject.to_owned(),
        aud: client_id.to_owned(),
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
        auth_time: auth_time.timestamp(),
        nonce,
        c_hash: code.map(CryptoService::<dyn mas_jose::keys::KeyManager>::c_hash),
        at_hash: access_token.map(CryptoService::<dyn mas_jose::keys::KeyManager>::at_hash),
        acr,
        sid,
    };

    let (jwt, _kid) = crypto.sign(&claims).await?;
    Ok(jwt)
}

/// Flatten the hybrid/implicit artifacts into the same param map the
/// authorization response delivers, alongside `code`/`state`.
#[must_use]
pub fn artifacts_as_params(
    id_token: Option<String>,
    access_token: Option<String>,
    expires_in: Option<i64>,
) -> Map<String, Value> {
    let mut map = Map::new();
    if let Some(id_token) = id_token {
        map.insert("id_token".to_owned(), Value::String(id_token));
    }
    if let Some(access_token) = access_token {
        map.insert("access_token".to_owned(), Value::String(access_token));
        map.insert("token_type".to_owned(), Value::String("Bearer".to_owned()));
        if let Some(expires_in) = expires_in {
            map.insert("expires_in".to_owned(), Value::from(expires_in));
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use mas_jose::keys::KeyManager;
    use mas_keystore::Keystore;

    use super::*;

    #[tokio::test]
    async fn minted_id_token_carries_the_expected_claims() {
        let keystore: Arc<Keystore> = Arc::new(Keystore::generate().await.unwrap());
        let crypto = CryptoService::<dyn KeyManager>::new(keystore);

        let auth_time = Utc::now() - chrono::Duration::seconds(5);
        let jwt = mint_id_token(
            &crypto,
            "https://auth.example.com",
            "user1",
            "client1",
            auth_time,
            Some("my-nonce".to_owned()),
            None,
            Some("the-code"),
            Some("the-access-token"),
            Some("session1".to_owned()),
            chrono::Duration::minutes(5),
        )
        .await
        .unwrap();

        let claims: IdTokenClaims = crypto.verify_own(&jwt).await.unwrap();
        assert_eq!(claims.iss, "https://auth.example.com");
        assert_eq!(claims.sub, "user1");
        assert_eq!(claims.aud, "client1");
        assert_eq!(claims.nonce.as_deref(), Some("my-nonce"));
        assert!(claims.c_hash.is_some());
        assert!(claims.at_hash.is_some());
        assert_eq!(claims.sid.as_deref(), Some("session1"));
    }

    #[tokio::test]
    async fn minted_access_token_is_a_signed_jwt() {
        let keystore: Arc<Keystore> = Arc::new(Keystore::generate().await.unwrap());
        let crypto = CryptoService::<dyn KeyManager>::new(keystore);
        let scope: oauth2_types::scope::Scope = "openid profile".parse().unwrap();

        let token = mint_access_token(&crypto, "https://auth.example.com", "user1", "client1", &scope)
            .await
            .unwrap();

        let claims: AccessTokenClaims = crypto.verify_own(&token).await.unwrap();
        assert_eq!(claims.sub, "user1");
        assert_eq!(claims.client_id, "client1");
        assert_eq!(claims.aud, "https://auth.example.com");
        assert_eq!(claims.exp - claims.iat, ACCESS_TOKEN_TTL_SECONDS);
    }

    #[test]
    fn artifacts_as_params_includes_bearer_token_type() {
        let map = artifacts_as_params(
            Some("id-token-jwt".to_owned()),
            Some("access-token-value".to_owned()),
            Some(300),
        );
        assert_eq!(map.get("token_type").and_then(Value::as_str), Some("Bearer"));
        assert_eq!(map.get("expires_in").and_then(Value::as_i64), Some(300));
    }
}
