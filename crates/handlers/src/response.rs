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

//! Turning a resolved set of response parameters into the wire format the
//! client actually sees: a query redirect, a fragment redirect, an
//! auto-submitting form, or any of those wrapped as a JARM JWT.

use std::collections::BTreeMap;

use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::{Duration, Utc};
use mas_data_model::ClientMetadata;
use mas_iana::jose::{JsonWebEncryptionAlg, JsonWebEncryptionEnc};
use mas_jose::{
    crypto::{CryptoError, CryptoService},
    jwk::{self, JwkLookupError},
};
use oauth2_types::response_mode::{ResponseMode, ResponseModeBase};
use rand::Rng;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::state::AppState;

/// JARM response JWTs are short-lived; 10 minutes is generous for the
/// browser redirect round-trip they're meant to survive.
const JARM_TTL_SECONDS: i64 = 600;

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),
    #[error(transparent)]
    Template(#[from] mas_templates::TemplateError),
    #[error(transparent)]
    JwkLookup(#[from] JwkLookupError),
    #[error("params did not serialize to a JSON object")]
    NotAnObject,
}

fn to_param_map<T: Serialize>(params: &T) -> Result<BTreeMap<String, String>, DeliveryError> {
    let value = serde_json::to_value(params).map_err(|_| DeliveryError::NotAnObject)?;
    let Value::Object(map) = value else {
        return Err(DeliveryError::NotAnObject);
    };

    Ok(map
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let s = match v {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (k, s)
        })
        .collect())
}

/// Deliver `params` to `redirect_uri` under `mode`, wrapping in a JARM JWT
/// first when `mode` calls for it.
pub async fn deliver<T: Serialize>(
    state: &AppState,
    client: &ClientMetadata,
    redirect_uri: &Url,
    mode: ResponseMode,
    params: &T,
) -> Result<Response, DeliveryError> {
    let mut map = to_param_map(params)?;

    if mode.is_jarm() {
        let mut envelope = serde_json::Map::new();
        for (k, v) in &map {
            envelope.insert(k.clone(), Value::String(v.clone()));
        }
        envelope.insert(
            "iss".to_owned(),
            Value::String(state.config.authorization_endpoint.issuer_url.to_string()),
        );
        envelope.insert("aud".to_owned(), Value::String(client.client_id.clone()));
        let now = Utc::now();
        envelope.insert("exp".to_owned(), Value::from((now + Duration::seconds(JARM_TTL_SECONDS)).timestamp()));
        envelope.insert("iat".to_owned(), Value::from(now.timestamp()));

        let (jwt, _kid) = state.crypto.sign(&Value::Object(envelope)).await?;
        let response = if client.jarm.wants_encryption() {
            encrypt_jarm_response(client, &jwt)?
        } else {
            jwt
        };

        map = BTreeMap::new();
        map.insert("response".to_owned(), response);
    }

    Ok(match mode.base() {
        ResponseModeBase::Query => {
            let mut url = redirect_uri.clone();
            {
                let mut pairs = url.query_pairs_mut();
                for (k, v) in &map {
                    pairs.append_pair(k, v);
                }
            }
            Redirect::to(url.as_str()).into_response()
        }
        ResponseModeBase::Fragment => {
            let mut url = redirect_uri.clone();
            url.set_query(None);
            let fragment = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(&map)
                .finish();
            url.set_fragment(Some(&fragment));
            Redirect::to(url.as_str()).into_response()
        }
        ResponseModeBase::FormPost => {
            let nonce = rand::thread_rng().gen::<u64>().to_string();
            let body = state
                .templates
                .render_form_post(redirect_uri.as_str(), &map, &nonce)?;
            Html(body).into_response()
        }
    })
}

/// Nest a signed JARM response JWT inside a JWE for the client's
/// published encryption key, per the `authorization_encrypted_response_*`
/// registration the client validated at registration time.
fn encrypt_jarm_response(client: &ClientMetadata, jws: &str) -> Result<String, DeliveryError> {
    let jwks = client.jwks.as_ref().ok_or(JwkLookupError::NoEncryptionKey)?;
    let encryption_key = jwk::select_encryption_key(jwks)?;
    let public_key = jwk::rsa_public_key_from_jwk(encryption_key)?;

    let alg = client
        .jarm
        .authorization_encrypted_response_alg
        .clone()
        .unwrap_or(JsonWebEncryptionAlg::RsaOaep256);
    let enc = client
        .jarm
        .authorization_encrypted_response_enc
        .clone()
        .unwrap_or(JsonWebEncryptionEnc::A256Gcm);

    Ok(CryptoService::<dyn mas_jose::keys::KeyManager>::encrypt_jwe_compact(
        jws,
        encryption_key.common.key_id.as_deref(),
        alg,
        enc,
        &public_key,
    )?)
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::jwk::{AlgorithmParameters, CommonParameters, Jwk, JwkSet, PublicKeyUse, RSAKeyParameters, RSAKeyType};
    use mas_data_model::{AuthorizationSigningPreferences, TokenEndpointAuthMethod};
    use rsa::{traits::PublicKeyParts, RsaPrivateKey};

    use super::*;

    fn encryption_client(jwks: Option<JwkSet>, jarm: AuthorizationSigningPreferences) -> ClientMetadata {
        ClientMetadata {
            client_id: "client1".to_owned(),
            redirect_uris: vec![Url::parse("https://app.example/cb").unwrap()],
            response_types: vec!["code".parse().unwrap()],
            token_endpoint_auth_method: TokenEndpointAuthMethod::None,
            default_max_age: None,
            require_auth_time: false,
            require_pushed_authorization_requests: false,
            request_object_signing_alg: None,
            jwks,
            jarm,
        }
    }

    fn enc_jwk() -> Jwk {
        let private = RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap();
        let public = private.to_public_key();
        Jwk {
            common: CommonParameters {
                public_key_use: Some(PublicKeyUse::Encryption),
                key_id: Some("enc1".to_owned()),
                ..Default::default()
            },
            algorithm: AlgorithmParameters::RSA(RSAKeyParameters {
                key_type: RSAKeyType::RSA,
                n: data_encoding::BASE64URL_NOPAD.encode(&public.n().to_bytes_be()),
                e: data_encoding::BASE64URL_NOPAD.encode(&public.e().to_bytes_be()),
            }),
        }
    }

    #[test]
    fn encrypts_against_the_clients_published_key() {
        let jarm = AuthorizationSigningPreferences {
            authorization_signed_response_alg: Some(mas_iana::jose::JsonWebSignatureAlg::Rs256),
            authorization_encrypted_response_alg: Some(JsonWebEncryptionAlg::RsaOaep256),
            authorization_encrypted_response_enc: Some(JsonWebEncryptionEnc::A256Gcm),
        };
        let client = encryption_client(Some(JwkSet { keys: vec![enc_jwk()] }), jarm);

        let jwe = encrypt_jarm_response(&client, "header.payload.signature").unwrap();
        assert_eq!(jwe.split('.').count(), 5);
    }

    #[test]
    fn missing_encryption_key_fails() {
        let jarm = AuthorizationSigningPreferences {
            authorization_signed_response_alg: Some(mas_iana::jose::JsonWebSignatureAlg::Rs256),
            authorization_encrypted_response_alg: Some(JsonWebEncryptionAlg::RsaOaep256),
            authorization_encrypted_response_enc: Some(JsonWebEncryptionEnc::A256Gcm),
        };
        let client = encryption_client(None, jarm);
        assert!(encrypt_jarm_response(&client, "header.payload.signature").is_err());
    }
}
