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

//! The signing key material this authorization server holds, and the
//! trait its key manager client implements. `mas-keystore` provides the
//! cached, rotation-aware implementation; this crate only needs to know
//! the shape.

use async_trait::async_trait;
use jsonwebtoken::{jwk::JwkSet, EncodingKey};
use mas_iana::jose::JsonWebSignatureAlg;
use rsa::pkcs8::DecodePrivateKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KeyError {
    #[error("no active signing key available")]
    Unavailable,

    #[error("stored key material is not valid PEM/PKCS8: {0}")]
    InvalidPem(#[source] rsa::pkcs8::Error),

    #[error(transparent)]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// The current active signing key: the `kid` it is published under, the
/// algorithm it signs with, and the private key material needed both to
/// sign JWTs and, when the key is RSA, to unwrap JWE content keys.
#[derive(Clone)]
pub struct ActiveKey {
    pub kid: String,
    pub alg: JsonWebSignatureAlg,
    pub private_pem: String,
    pub public_jwk: jsonwebtoken::jwk::Jwk,
}

impl ActiveKey {
    pub fn encoding_key(&self) -> Result<EncodingKey, KeyError> {
        Ok(match self.alg {
            JsonWebSignatureAlg::Es256 | JsonWebSignatureAlg::Es384 => {
                EncodingKey::from_ec_pem(self.private_pem.as_bytes())?
            }
            _ => EncodingKey::from_rsa_pem(self.private_pem.as_bytes())?,
        })
    }

    pub fn rsa_private_key(&self) -> Result<rsa::RsaPrivateKey, KeyError> {
        rsa::RsaPrivateKey::from_pkcs8_pem(&self.private_pem).map_err(KeyError::InvalidPem)
    }
}

/// Acquires the current active signing key and can rotate it on demand.
/// `mas-keystore`'s implementation caches the result for a short interval:
/// the worst race just means an extra, content-identical key load.
#[async_trait]
pub trait KeyManager: Send + Sync {
    async fn active_with_private(&self) -> Result<ActiveKey, KeyError>;
    async fn rotate(&self) -> Result<ActiveKey, KeyError>;
    async fn jwks(&self) -> JwkSet;
}
