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

//! Compact JWS encode/decode, thin wrappers around `jsonwebtoken` so the
//! rest of the crate only ever talks in [`JsonWebSignatureAlg`].

use data_encoding::BASE64URL_NOPAD;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use mas_iana::jose::JsonWebSignatureAlg;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::jwa::{to_backend_algorithm, UnsupportedAlgorithm};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error(transparent)]
    UnsupportedAlgorithm(#[from] UnsupportedAlgorithm),

    #[error("failed to encode JWT: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),

    #[error("failed to verify JWT: {0}")]
    Verify(#[source] jsonwebtoken::errors::Error),

    #[error("alg=none is not permitted")]
    NoneAlgorithmRejected,

    #[error("malformed JWT header")]
    MalformedHeader,
}

/// Sign `claims` as a compact JWS with the given key, embedding `kid` in
/// the header.
pub fn sign<T: Serialize>(
    alg: JsonWebSignatureAlg,
    kid: &str,
    encoding_key: &EncodingKey,
    claims: &T,
) -> Result<String, JwtError> {
    let backend_alg = to_backend_algorithm(alg)?;
    let mut header = Header::new(backend_alg);
    header.kid = Some(kid.to_owned());
    encode(&header, claims, encoding_key).map_err(JwtError::Encode)
}

/// Verify a compact JWS against a known algorithm and decoding key,
/// without validating `exp`/`nbf`/audience (callers do that with the
/// domain-specific checks the spec calls for).
pub fn verify<T: DeserializeOwned>(
    alg: JsonWebSignatureAlg,
    decoding_key: &DecodingKey,
    token: &str,
) -> Result<T, JwtError> {
    if alg == JsonWebSignatureAlg::None {
        return Err(JwtError::NoneAlgorithmRejected);
    }
    let backend_alg = to_backend_algorithm(alg)?;
    let mut validation = Validation::new(backend_alg);
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<T>(token, decoding_key, &validation).map_err(JwtError::Verify)?;
    Ok(data.claims)
}

/// Read a JWS header as a raw JSON value, without asking `jsonwebtoken` to
/// parse `alg` into its [`Algorithm`][jsonwebtoken::Algorithm] enum first.
/// `jsonwebtoken` has no `none` variant, so this is the only way to detect
/// (and, if configured, accept) an unsigned request object.
pub fn peek_raw_header(token: &str) -> Result<Value, JwtError> {
    let part = token.split('.').next().ok_or(JwtError::MalformedHeader)?;
    let bytes = BASE64URL_NOPAD
        .decode(part.as_bytes())
        .map_err(|_| JwtError::MalformedHeader)?;
    serde_json::from_slice(&bytes).map_err(|_| JwtError::MalformedHeader)
}

/// Whether a raw header names the `none` algorithm.
#[must_use]
pub fn is_alg_none(header: &Value) -> bool {
    header.get("alg").and_then(Value::as_str) == Some("none")
}

/// A JWS header with `alg`/`kid` pulled out as typed fields, for callers
/// that already know the token is signed (never `none`).
pub struct TokenHeader {
    pub alg: JsonWebSignatureAlg,
    pub kid: Option<String>,
}

/// Like [`peek_raw_header`], but parses `alg` into [`JsonWebSignatureAlg`]
/// and rejects `none` up front.
pub fn peek_header_typed(token: &str) -> Result<TokenHeader, JwtError> {
    let raw = peek_raw_header(token)?;
    if is_alg_none(&raw) {
        return Err(JwtError::NoneAlgorithmRejected);
    }
    let alg_str = raw
        .get("alg")
        .and_then(Value::as_str)
        .ok_or(JwtError::MalformedHeader)?;
    let alg: JsonWebSignatureAlg = alg_str.parse().map_err(|_| JwtError::MalformedHeader)?;
    let kid = raw
        .get("kid")
        .and_then(Value::as_str)
        .map(str::to_owned);
    Ok(TokenHeader { alg, kid })
}
