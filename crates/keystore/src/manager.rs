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

//! The in-memory signing [`KeyManager`]: holds the active RSA key pair,
//! generates a fresh one on first use, and keeps retired public keys
//! around long enough for in-flight tokens to still verify after a
//! rotation.

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::jwk::{
    AlgorithmParameters, CommonParameters, Jwk, JwkSet, PublicKeyUse, RSAKeyParameters, RSAKeyType,
};
use mas_iana::jose::JsonWebSignatureAlg;
use mas_jose::keys::{ActiveKey, KeyError, KeyManager};
use rsa::{
    pkcs8::{EncodePrivateKey, LineEnding},
    traits::PublicKeyParts,
    RsaPrivateKey,
};
use tokio::sync::RwLock;
use tracing::info;
use ulid::Ulid;

const RSA_KEY_BITS: usize = 2048;

struct Inner {
    active: ActiveKey,
    retired_public: Vec<Jwk>,
}

/// Generates and rotates the authorization server's own signing key.
/// Signing always uses the currently active key; the published JWKS also
/// carries the public half of retired keys so tokens signed just before a
/// rotation still verify.
pub struct Keystore {
    inner: RwLock<Inner>,
}

impl Keystore {
    /// Build a keystore with a freshly generated signing key.
    pub async fn generate() -> Result<Self, KeyError> {
        let active = generate_rsa_key().await?;
        Ok(Self {
            inner: RwLock::new(Inner {
                active,
                retired_public: Vec::new(),
            }),
        })
    }

    /// Wrap a caller-provided key, e.g. one loaded from configuration at
    /// startup rather than generated.
    #[must_use]
    pub fn from_active_key(active: ActiveKey) -> Self {
        Self {
            inner: RwLock::new(Inner {
                active,
                retired_public: Vec::new(),
            }),
        }
    }
}

#[async_trait]
impl KeyManager for Keystore {
    async fn active_with_private(&self) -> Result<ActiveKey, KeyError> {
        Ok(self.inner.read().await.active.clone())
    }

    async fn rotate(&self) -> Result<ActiveKey, KeyError> {
        let fresh = generate_rsa_key().await?;
        let mut guard = self.inner.write().await;
        let retired = std::mem::replace(&mut guard.active, fresh.clone());
        guard.retired_public.push(retired.public_jwk);
        info!(kid = %fresh.kid, "rotated signing key");
        Ok(fresh)
    }

    async fn jwks(&self) -> JwkSet {
        let guard = self.inner.read().await;
        let mut keys = Vec::with_capacity(1 + guard.retired_public.len());
        keys.push(guard.active.public_jwk.clone());
        keys.extend(guard.retired_public.iter().cloned());
        JwkSet { keys }
    }
}

async fn generate_rsa_key() -> Result<ActiveKey, KeyError> {
    tokio::task::spawn_blocking(move || {
        let mut rng = rand::thread_rng();
        let private = RsaPrivateKey::new(&mut rng, RSA_KEY_BITS).map_err(|_| KeyError::Unavailable)?;
        let pem = private
            .to_pkcs8_pem(LineEnding::LF)
            .map_err(|_| KeyError::Unavailable)?
            .to_string();
        let kid = Ulid::new().to_string();
        let public_jwk = rsa_public_jwk(&private, &kid);

        Ok(ActiveKey {
            kid,
            alg: JsonWebSignatureAlg::Rs256,
            private_pem: pem,
            public_jwk,
        })
    })
    .await
    .map_err(|_| KeyError::Unavailable)?
}

fn rsa_public_jwk(private: &RsaPrivateKey, kid: &str) -> Jwk {
    let public = private.to_public_key();
    Jwk {
        common: CommonParameters {
            public_key_use: Some(PublicKeyUse::Signature),
            key_id: Some(kid.to_owned()),
            ..Default::default()
        },
        algorithm: AlgorithmParameters::RSA(RSAKeyParameters {
            key_type: RSAKeyType::RSA,
            n: data_encoding::BASE64URL_NOPAD.encode(&public.n().to_bytes_be()),
            e: data_encoding::BASE64URL_NOPAD.encode(&public.e().to_bytes_be()),
        }),
    }
}

#[must_use]
pub fn shared(keystore: Keystore) -> Arc<Keystore> {
    Arc::new(keystore)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn generates_and_exposes_a_key() {
        let store = Keystore::generate().await.unwrap();
        let key = store.active_with_private().await.unwrap();
        assert_eq!(key.alg, JsonWebSignatureAlg::Rs256);

        let jwks = store.jwks().await;
        assert_eq!(jwks.keys.len(), 1);
        assert_eq!(jwks.keys[0].common.key_id.as_deref(), Some(key.kid.as_str()));
    }

    #[tokio::test]
    async fn rotation_keeps_previous_public_key_around() {
        let store = Keystore::generate().await.unwrap();
        let first = store.active_with_private().await.unwrap();

        let second = store.rotate().await.unwrap();
        assert_ne!(first.kid, second.kid);

        let jwks = store.jwks().await;
        let kids: Vec<_> = jwks
            .keys
            .iter()
            .filter_map(|k| k.common.key_id.clone())
            .collect();
        assert!(kids.contains(&first.kid));
        assert!(kids.contains(&second.kid));

        let active_now = store.active_with_private().await.unwrap();
        assert_eq!(active_now.kid, second.kid);
    }
}
