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

//! The authorization code handed back to the client, and everything the
//! token endpoint later needs to redeem it exactly once.

use chrono::{DateTime, Utc};
use oauth2_types::{pkce::CodeChallenge, scope::Scope};
use serde::{Deserialize, Serialize};
use ulid::Ulid;
use url::Url;

/// A single-use authorization code bound to the request that minted it.
/// The store is responsible for the single-use guarantee; this struct is
/// just the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationCode {
    pub code: String,
    pub request_id: Ulid,
    pub client_id: String,
    pub user_id: String,
    pub session_id: Ulid,
    pub redirect_uri: Url,
    pub scope: Scope,
    pub nonce: Option<String>,
    pub auth_time: DateTime<Utc>,
    pub code_challenge: Option<CodeChallenge>,
    /// RFC 9449 `jkt`: the JWK thumbprint of the DPoP key this code is
    /// bound to, if the authorization request carried a DPoP proof.
    pub dpop_jkt: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl AuthorizationCode {
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Generate a fresh, high-entropy code value. 32 bytes of randomness,
/// base64url-encoded, matches the token endpoint's expectations for
/// `code` length and alphabet.
#[must_use]
pub fn generate_code_value(rng: &mut impl rand::RngCore) -> String {
    let mut bytes = [0u8; 32];
    rng.fill_bytes(&mut bytes);
    data_encoding::BASE64URL_NOPAD.encode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn generated_codes_are_unique_and_url_safe() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(1);
        let a = generate_code_value(&mut rng);
        let b = generate_code_value(&mut rng);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }
}
