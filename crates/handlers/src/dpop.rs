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

//! RFC 9449 DPoP proof verification: checking the `DPoP` request header
//! against the request it rode in on, then thumbprinting the proof's
//! embedded key so the issued code can be bound to it.

use axum::http::{HeaderMap, Method};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::jwk::Jwk;
use mas_jose::{crypto, jwk, jwt};
use mas_storage::{memory::MemoryStores, traits::DPoPReplayStore};
use serde::Deserialize;

const DPOP_HEADER: &str = "dpop";
const IAT_SKEW_SECONDS: i64 = 60;

#[derive(Deserialize)]
struct DpopProofClaims {
    htm: String,
    htu: String,
    iat: i64,
    jti: String,
}

/// Validate the `DPoP` header, if present, against this request's method
/// and URL: signature, `htm`, `htu`, `iat` freshness, and `jti` replay.
/// On success, returns the RFC 7638 thumbprint of the proof's embedded
/// key, to bind into the code this request goes on to issue.
///
/// A missing or invalid proof is never a request failure; the caller
/// just issues the code unbound.
pub async fn resolve_jkt(stores: &MemoryStores, headers: &HeaderMap, method: &Method, htu: &str) -> Option<String> {
    let token = headers.get(DPOP_HEADER)?.to_str().ok()?;

    let raw_header = jwt::peek_raw_header(token).ok()?;
    if raw_header.get("typ").and_then(|v| v.as_str()) != Some("dpop+jwt") {
        return None;
    }

    let typed_header = jwt::peek_header_typed(token).ok()?;
    let jwk_value = raw_header.get("jwk")?.clone();
    let proof_jwk: Jwk = serde_json::from_value(jwk_value).ok()?;

    let decoding_key = crypto::decoding_key_from_jwk(&proof_jwk).ok()?;
    let claims: DpopProofClaims = jwt::verify(typed_header.alg, &decoding_key, token).ok()?;

    if !claims.htm.eq_ignore_ascii_case(method.as_str()) {
        return None;
    }
    if claims.htu != htu {
        return None;
    }

    let now = Utc::now();
    let iat = naive_utc_from_timestamp(claims.iat)?;
    let skew = now.signed_duration_since(iat);
    if skew > Duration::seconds(IAT_SKEW_SECONDS) || skew < -Duration::seconds(IAT_SKEW_SECONDS) {
        return None;
    }

    let expires_at = now + Duration::seconds(IAT_SKEW_SECONDS);
    if !stores.dpop_replay.observe(&claims.jti, expires_at).await {
        return None;
    }

    Some(jwk::thumbprint(&proof_jwk))
}

fn naive_utc_from_timestamp(seconds: i64) -> Option<DateTime<Utc>> {
    let naive = chrono::NaiveDateTime::from_timestamp_opt(seconds, 0)?;
    Some(DateTime::from_utc(naive, Utc))
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{EncodingKey, Header};
    use rsa::{pkcs1::EncodeRsaPrivateKey, traits::PublicKeyParts, RsaPrivateKey};

    use super::*;

    fn proof_jwt(private: &RsaPrivateKey, htm: &str, htu: &str, iat: i64, jti: &str) -> String {
        let public = private.to_public_key();
        let jwk = serde_json::json!({
            "kty": "RSA",
            "n": data_encoding::BASE64URL_NOPAD.encode(&public.n().to_bytes_be()),
            "e": data_encoding::BASE64URL_NOPAD.encode(&public.e().to_bytes_be()),
        });

        let mut header = Header::new(jsonwebtoken::Algorithm::RS256);
        header.typ = Some("dpop+jwt".to_owned());
        header.jwk = serde_json::from_value(jwk).ok();

        let claims = serde_json::json!({ "htm": htm, "htu": htu, "iat": iat, "jti": jti });
        let pem = private.to_pkcs1_pem(rsa::pkcs8::LineEnding::LF).unwrap();
        let encoding_key = EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap();
        jsonwebtoken::encode(&header, &claims, &encoding_key).unwrap()
    }

    fn key() -> RsaPrivateKey {
        RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap()
    }

    #[tokio::test]
    async fn valid_proof_yields_a_thumbprint() {
        let private = key();
        let stores = MemoryStores::new(Vec::new());
        let now = Utc::now().timestamp();
        let token = proof_jwt(&private, "POST", "https://auth.example.com/authorize", now, "jti-1");

        let mut headers = HeaderMap::new();
        headers.insert(DPOP_HEADER, token.parse().unwrap());

        let jkt = resolve_jkt(
            &stores,
            &headers,
            &Method::POST,
            "https://auth.example.com/authorize",
        )
        .await;
        assert!(jkt.is_some());
    }

    #[tokio::test]
    async fn mismatched_method_is_rejected() {
        let private = key();
        let stores = MemoryStores::new(Vec::new());
        let now = Utc::now().timestamp();
        let token = proof_jwt(&private, "GET", "https://auth.example.com/authorize", now, "jti-2");

        let mut headers = HeaderMap::new();
        headers.insert(DPOP_HEADER, token.parse().unwrap());

        let jkt = resolve_jkt(
            &stores,
            &headers,
            &Method::POST,
            "https://auth.example.com/authorize",
        )
        .await;
        assert!(jkt.is_none());
    }

    #[tokio::test]
    async fn replayed_jti_is_rejected_on_second_use() {
        let private = key();
        let stores = MemoryStores::new(Vec::new());
        let now = Utc::now().timestamp();
        let htu = "https://auth.example.com/authorize";

        let first = proof_jwt(&private, "GET", htu, now, "jti-3");
        let mut headers = HeaderMap::new();
        headers.insert(DPOP_HEADER, first.parse().unwrap());
        assert!(resolve_jkt(&stores, &headers, &Method::GET, htu).await.is_some());

        let second = proof_jwt(&private, "GET", htu, now, "jti-3");
        let mut headers = HeaderMap::new();
        headers.insert(DPOP_HEADER, second.parse().unwrap());
        assert!(resolve_jkt(&stores, &headers, &Method::GET, htu).await.is_none());
    }

    #[tokio::test]
    async fn stale_iat_is_rejected() {
        let private = key();
        let stores = MemoryStores::new(Vec::new());
        let htu = "https://auth.example.com/authorize";
        let stale_iat = (Utc::now() - Duration::seconds(IAT_SKEW_SECONDS * 10)).timestamp();
        let token = proof_jwt(&private, "GET", htu, stale_iat, "jti-4");

        let mut headers = HeaderMap::new();
        headers.insert(DPOP_HEADER, token.parse().unwrap());
        assert!(resolve_jkt(&stores, &headers, &Method::GET, htu).await.is_none());
    }

    #[tokio::test]
    async fn absent_header_yields_no_binding() {
        let stores = MemoryStores::new(Vec::new());
        let headers = HeaderMap::new();
        assert!(resolve_jkt(&stores, &headers, &Method::GET, "https://auth.example.com/authorize")
            .await
            .is_none());
    }
}
